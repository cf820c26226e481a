//! Locale resolution and path localization.
//!
//! Locale prefixes are matched on whole path segments only: `/ar` and
//! `/ar/...` are Arabic, while `/article` or `/arabic-news` stay in the
//! default language.

use serde::Serialize;

use crate::i18n::{Direction, Language};

/// Language and text direction of a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedLocale {
    pub language: Language,
    pub direction: Direction,
}

impl ResolvedLocale {
    fn of(language: Language) -> Self {
        Self {
            language,
            direction: language.direction(),
        }
    }
}

/// `true` when `path` is exactly `/{code}` or starts with `/{code}/`.
pub(crate) fn has_locale_segment(path: &str, code: &str) -> bool {
    match path.strip_prefix('/').and_then(|rest| rest.strip_prefix(code)) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

fn prefixed_language(path: &str) -> Option<Language> {
    Language::prefixed().find(|language| has_locale_segment(path, language.code()))
}

/// Determine the active language and direction for a request path.
pub fn resolve_locale(path: &str) -> ResolvedLocale {
    ResolvedLocale::of(prefixed_language(path).unwrap_or_else(Language::default_language))
}

/// Split a request path into its language and canonical path.
///
/// `/ar` becomes `(ar, "/")` and `/ru/news` becomes `(ru, "/news")`.
/// Paths without a recognized prefix are returned as-is in the default
/// language (an empty path is treated as `/`).
pub fn strip_locale_prefix(path: &str) -> (Language, String) {
    match prefixed_language(path) {
        Some(language) => {
            let rest = &path[language.code().len() + 1..];
            let canonical = if rest.is_empty() { "/" } else { rest };
            (language, canonical.to_string())
        }
        None if path.is_empty() => (Language::default_language(), "/".to_string()),
        None => (Language::default_language(), path.to_string()),
    }
}

/// Produce the path for `language` from a canonical (unprefixed) path.
///
/// The default language gets the path unchanged. Paths already carrying the
/// target prefix are returned as-is, so the function is idempotent.
pub fn localize(canonical_path: &str, language: Language) -> String {
    let code = language.code();

    if language.is_default() || has_locale_segment(canonical_path, code) {
        return canonical_path.to_string();
    }

    match canonical_path {
        "" | "/" => format!("/{}", code),
        path if path.starts_with('/') => format!("/{}{}", code, path),
        path => format!("/{}/{}", code, path),
    }
}
