//! Per-language alternate paths for content entities.
//!
//! The CMS reports slug translations in two shapes: articles carry
//! `{ slug, language: { code } }` while categories carry
//! `{ slug, languageCode }`. Both are normalized through
//! [`TranslationRecord`] before any path is built, and records whose code is
//! not a supported language are dropped.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::i18n::Language;
use crate::routing::locale::localize;

/// Language code (lowercase) to fully localized path.
pub type AlternatePathMap = BTreeMap<&'static str, String>;

/// Language reference nested in article translations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageRef {
    #[serde(default)]
    pub code: String,
}

/// Article translation as returned by the CMS.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleTranslation {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub language: LanguageRef,
}

impl ArticleTranslation {
    pub fn new(slug: &str, code: &str) -> Self {
        Self {
            slug: slug.to_string(),
            language: LanguageRef {
                code: code.to_string(),
            },
        }
    }
}

/// Category translation as returned by the CMS.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTranslation {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub language_code: String,
}

impl CategoryTranslation {
    pub fn new(slug: &str, code: &str) -> Self {
        Self {
            slug: slug.to_string(),
            language_code: code.to_string(),
        }
    }
}

/// A translation whose language has been validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugTranslation {
    pub language: Language,
    pub slug: String,
}

/// Common view over the two upstream translation shapes.
pub trait TranslationRecord {
    fn raw_language_code(&self) -> &str;
    fn raw_slug(&self) -> &str;

    /// Validate the record. Unknown language codes and blank slugs yield
    /// `None` so that schema drift never produces a broken link.
    fn normalize(&self) -> Option<SlugTranslation> {
        let slug = self.raw_slug().trim();
        if slug.is_empty() {
            return None;
        }
        match Language::parse(self.raw_language_code()) {
            Some(language) => Some(SlugTranslation {
                language,
                slug: slug.to_string(),
            }),
            None => {
                debug!(
                    code = self.raw_language_code(),
                    "Ignoring translation with unsupported language"
                );
                None
            }
        }
    }
}

impl TranslationRecord for ArticleTranslation {
    fn raw_language_code(&self) -> &str {
        &self.language.code
    }

    fn raw_slug(&self) -> &str {
        &self.slug
    }
}

impl TranslationRecord for CategoryTranslation {
    fn raw_language_code(&self) -> &str {
        &self.language_code
    }

    fn raw_slug(&self) -> &str {
        &self.slug
    }
}

/// Slug lookup keyed by language. Later records overwrite earlier ones.
fn slug_lookup<T: TranslationRecord>(translations: &[T]) -> HashMap<Language, String> {
    translations
        .iter()
        .filter_map(TranslationRecord::normalize)
        .map(|t| (t.language, t.slug))
        .collect()
}

/// Entity whose alternate paths should be computed.
#[derive(Debug, Clone, Copy)]
pub enum AlternateSource<'a> {
    Article {
        translations: &'a [ArticleTranslation],
        category_slug: &'a str,
        category_translations: &'a [CategoryTranslation],
    },
    Category {
        slug: &'a str,
        translations: &'a [CategoryTranslation],
    },
    /// Untranslated routes (home, tags, authors, static pages).
    Static { canonical_path: &'a str },
}

pub fn build_alternate_paths(source: AlternateSource<'_>) -> AlternatePathMap {
    match source {
        AlternateSource::Article {
            translations,
            category_slug,
            category_translations,
        } => build_article_alternates(translations, category_slug, category_translations),
        AlternateSource::Category { slug, translations } => {
            build_category_alternates(slug, translations)
        }
        AlternateSource::Static { canonical_path } => build_static_alternates(canonical_path),
    }
}

/// Alternate paths for an article.
///
/// Only languages the article is translated into get an entry. The category
/// segment uses the category's slug for that language, falling back to
/// `current_category_slug` when the category has no such translation.
pub fn build_article_alternates(
    translations: &[ArticleTranslation],
    current_category_slug: &str,
    category_translations: &[CategoryTranslation],
) -> AlternatePathMap {
    let category_slugs = slug_lookup(category_translations);
    let default = Language::default_language();
    let mut paths = AlternatePathMap::new();

    for translation in translations.iter().filter_map(TranslationRecord::normalize) {
        let language = translation.language;
        let category_slug = category_slugs
            .get(&language)
            .or_else(|| {
                if language == default {
                    category_slugs.get(&default)
                } else {
                    None
                }
            })
            .map(String::as_str)
            .unwrap_or(current_category_slug);

        let path = if language.is_default() {
            format!("/{}/{}", category_slug, translation.slug)
        } else {
            format!("/{}/{}/{}", language.code(), category_slug, translation.slug)
        };
        paths.insert(language.code(), path);
    }

    paths
}

/// Alternate paths for a category.
///
/// Every supported language gets an entry. Missing translations fall back to
/// the default-language slug, which itself falls back to `current_slug`.
pub fn build_category_alternates(
    current_slug: &str,
    translations: &[CategoryTranslation],
) -> AlternatePathMap {
    let slugs = slug_lookup(translations);
    let default = Language::default_language();
    let default_slug = slugs
        .get(&default)
        .map(String::as_str)
        .unwrap_or(current_slug);

    Language::all()
        .map(|language| {
            let path = if language.is_default() {
                format!("/{}", default_slug)
            } else {
                let slug = slugs
                    .get(&language)
                    .map(String::as_str)
                    .unwrap_or(default_slug);
                format!("/{}/{}", language.code(), slug)
            };
            (language.code(), path)
        })
        .collect()
}

/// Alternate paths for a route whose path is the same in every language.
pub fn build_static_alternates(canonical_path: &str) -> AlternatePathMap {
    Language::all()
        .map(|language| (language.code(), localize(canonical_path, language)))
        .collect()
}
