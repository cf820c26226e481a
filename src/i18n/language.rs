//! Language type: validated handle onto a registry entry.

use crate::i18n::{Direction, LanguageConfig, LanguageRegistry};
use serde::{Serialize, Serializer};

/// A validated language.
///
/// Only codes present in the registry can be turned into a `Language`, so
/// every value maps to a supported locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    /// Lowercase ISO 639-1 code (e.g., "en", "ar")
    code: &'static str,
}

impl Language {
    pub const ENGLISH: Language = Language { code: "en" };
    pub const ARABIC: Language = Language { code: "ar" };
    pub const RUSSIAN: Language = Language { code: "ru" };

    /// Parse a language code coming from content data.
    ///
    /// Matching is case-insensitive (the CMS reports codes such as `"EN"`).
    /// Unknown codes yield `None`.
    pub fn parse(code: &str) -> Option<Language> {
        let lowered = code.trim().to_ascii_lowercase();
        LanguageRegistry::get()
            .get_by_code(&lowered)
            .map(|config| Language { code: config.code })
    }

    /// The default language, served without a path prefix.
    pub fn default_language() -> Language {
        Language {
            code: LanguageRegistry::get().default_language().code,
        }
    }

    /// Every supported language, default first.
    pub fn all() -> impl Iterator<Item = Language> {
        LanguageRegistry::get()
            .list_all()
            .iter()
            .map(|config| Language { code: config.code })
    }

    /// Languages whose paths carry a locale prefix.
    pub fn prefixed() -> impl Iterator<Item = Language> {
        LanguageRegistry::get()
            .prefixed()
            .map(|config| Language { code: config.code })
    }

    /// Lowercase language code, as used in paths and map keys.
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Upper-case code, as the CMS language filter enum expects.
    pub fn graphql_code(&self) -> String {
        self.code.to_ascii_uppercase()
    }

    /// Get the full language configuration from the registry.
    ///
    /// # Panics
    /// Panics if the code is missing from the registry, which cannot happen
    /// for values built through `parse` or the constants.
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .expect("Language code should always be valid")
    }

    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    pub fn direction(&self) -> Direction {
        self.config().direction
    }

    /// `true` for the default (unprefixed) language.
    pub fn is_default(&self) -> bool {
        self.config().is_default
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::default_language()
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code)
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code)
    }
}
