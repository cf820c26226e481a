use crate::i18n::Language;

/// All localized user-facing strings for a language
///
/// Only messages produced by this service live here; article and page copy
/// comes from the CMS.
#[derive(Debug, Clone)]
pub struct LanguageStrings {
    /// Site name shown in page views
    pub site_name: &'static str,

    // ==================== Newsletter Messages ====================
    /// Shown when the subscription was accepted
    pub newsletter_success: &'static str,

    /// Shown when the address is already on the list
    pub newsletter_already_subscribed: &'static str,

    /// Shown when the address does not look like an email
    pub newsletter_invalid_email: &'static str,

    /// Shown when the provider refused or could not be reached
    pub newsletter_failed: &'static str,

    /// Shown when the newsletter integration is not configured
    pub newsletter_unavailable: &'static str,

    // ==================== Page Messages ====================
    /// Body of 404 responses
    pub not_found: &'static str,

    /// Body of 502 responses when the CMS fails
    pub content_unavailable: &'static str,
}

impl LanguageStrings {
    /// Strings for `language`.
    pub fn for_language(language: Language) -> &'static LanguageStrings {
        match language.code() {
            "ar" => &ARABIC_STRINGS,
            "ru" => &RUSSIAN_STRINGS,
            _ => &ENGLISH_STRINGS,
        }
    }
}

// ==================== English Strings ====================

pub const ENGLISH_STRINGS: LanguageStrings = LanguageStrings {
    site_name: "Qahwa World",

    newsletter_success: "Thank you for subscribing! Check your inbox for our next issue.",
    newsletter_already_subscribed: "You're already subscribed to our newsletter.",
    newsletter_invalid_email: "Please enter a valid email address.",
    newsletter_failed: "We couldn't complete your subscription. Please try again later.",
    newsletter_unavailable: "Newsletter subscriptions are temporarily unavailable.",

    not_found: "The page you are looking for could not be found.",
    content_unavailable: "Content is temporarily unavailable. Please try again shortly.",
};

// ==================== Arabic Strings ====================

pub const ARABIC_STRINGS: LanguageStrings = LanguageStrings {
    site_name: "عالم القهوة",

    newsletter_success: "شكراً لاشتراكك! تفقد بريدك الوارد لعددنا القادم.",
    newsletter_already_subscribed: "أنت مشترك بالفعل في نشرتنا الإخبارية.",
    newsletter_invalid_email: "يرجى إدخال بريد إلكتروني صالح.",
    newsletter_failed: "تعذر إتمام اشتراكك. يرجى المحاولة لاحقاً.",
    newsletter_unavailable: "الاشتراك في النشرة الإخبارية غير متاح مؤقتاً.",

    not_found: "تعذر العثور على الصفحة التي تبحث عنها.",
    content_unavailable: "المحتوى غير متاح مؤقتاً. يرجى المحاولة بعد قليل.",
};

// ==================== Russian Strings ====================

pub const RUSSIAN_STRINGS: LanguageStrings = LanguageStrings {
    site_name: "Мир Кофе",

    newsletter_success: "Спасибо за подписку! Следите за следующим выпуском в своей почте.",
    newsletter_already_subscribed: "Вы уже подписаны на нашу рассылку.",
    newsletter_invalid_email: "Пожалуйста, введите корректный адрес электронной почты.",
    newsletter_failed: "Не удалось оформить подписку. Пожалуйста, попробуйте позже.",
    newsletter_unavailable: "Подписка на рассылку временно недоступна.",

    not_found: "Страница, которую вы ищете, не найдена.",
    content_unavailable: "Контент временно недоступен. Пожалуйста, попробуйте чуть позже.",
};
