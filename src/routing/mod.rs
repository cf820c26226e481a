//! Locale-aware routing.
//!
//! - `locale`: resolve the language of a path and localize canonical paths
//! - `alternates`: per-language paths for articles, categories and
//!   untranslated routes
//! - `redirect`: edge rule canonicalizing default-locale prefixes

pub mod alternates;
pub mod locale;
pub mod redirect;

pub use alternates::{
    build_alternate_paths, build_article_alternates, build_category_alternates,
    build_static_alternates, AlternatePathMap, AlternateSource, ArticleTranslation,
    CategoryTranslation, LanguageRef, SlugTranslation, TranslationRecord,
};
pub use locale::{localize, resolve_locale, strip_locale_prefix, ResolvedLocale};
pub use redirect::{edge_redirect, EdgeDecision, EdgeRedirectRule};
