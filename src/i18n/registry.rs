//! Language registry: Single source of truth for all supported languages.
//!
//! The site serves a closed set of languages. The registry is built once on
//! first access (`OnceLock`) and is immutable thereafter.

use std::sync::OnceLock;

use serde::Serialize;

/// Text direction of a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ltr,
    Rtl,
}

/// Configuration for a supported language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-1 language code, lowercase (e.g., "en", "ar")
    pub code: &'static str,

    /// English name of the language (e.g., "Arabic")
    pub name: &'static str,

    /// Native name of the language (e.g., "العربية")
    pub native_name: &'static str,

    /// Script direction
    pub direction: Direction,

    /// Whether this is the default language. Default-language paths carry no
    /// locale prefix. Exactly one entry must be the default.
    pub is_default: bool,
}

/// Global language registry singleton.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its lowercase code.
    ///
    /// Lookup is exact; callers holding backend data lowercase first.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// All languages in registry order (default first).
    pub fn list_all(&self) -> &[LanguageConfig] {
        &self.languages
    }

    /// Languages whose paths carry a locale prefix.
    pub fn prefixed(&self) -> impl Iterator<Item = &LanguageConfig> {
        self.languages.iter().filter(|lang| !lang.is_default)
    }

    /// The default (unprefixed) language.
    ///
    /// # Panics
    /// Panics if the built-in table does not have exactly one default entry.
    pub fn default_language(&self) -> &LanguageConfig {
        let mut defaults = self.languages.iter().filter(|lang| lang.is_default);

        match (defaults.next(), defaults.next()) {
            (Some(lang), None) => lang,
            (None, _) => panic!("No default language found in registry"),
            (Some(_), Some(_)) => panic!("Multiple default languages found in registry"),
        }
    }
}

fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "en",
            name: "English",
            native_name: "English",
            direction: Direction::Ltr,
            is_default: true,
        },
        LanguageConfig {
            code: "ar",
            name: "Arabic",
            native_name: "العربية",
            direction: Direction::Rtl,
            is_default: false,
        },
        LanguageConfig {
            code: "ru",
            name: "Russian",
            native_name: "Русский",
            direction: Direction::Ltr,
            is_default: false,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_get_returns_singleton() {
        let registry1 = LanguageRegistry::get();
        let registry2 = LanguageRegistry::get();
        assert!(std::ptr::eq(registry1, registry2));
    }

    #[test]
    fn test_get_by_code_arabic() {
        let config = LanguageRegistry::get()
            .get_by_code("ar")
            .expect("arabic is registered");
        assert_eq!(config.name, "Arabic");
        assert_eq!(config.direction, Direction::Rtl);
        assert!(!config.is_default);
    }

    #[test]
    fn test_get_by_code_is_exact() {
        let registry = LanguageRegistry::get();
        assert!(registry.get_by_code("AR").is_none());
        assert!(registry.get_by_code("fr").is_none());
        assert!(registry.get_by_code("").is_none());
    }

    #[test]
    fn test_default_language_is_english() {
        let default = LanguageRegistry::get().default_language();
        assert_eq!(default.code, "en");
        assert_eq!(default.direction, Direction::Ltr);
    }

    #[test]
    fn test_prefixed_excludes_default() {
        let codes: Vec<_> = LanguageRegistry::get().prefixed().map(|l| l.code).collect();
        assert_eq!(codes, vec!["ar", "ru"]);
    }

    #[test]
    fn test_list_all_order() {
        let codes: Vec<_> = LanguageRegistry::get()
            .list_all()
            .iter()
            .map(|l| l.code)
            .collect();
        assert_eq!(codes, vec!["en", "ar", "ru"]);
    }

    #[test]
    fn test_direction_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Direction::Rtl).unwrap(), "\"rtl\"");
    }
}
