//! Per-request render state.
//!
//! Each page request owns a [`RenderContext`]. Alternate paths computed for
//! the entity are published into the context's [`AlternateSlot`] and read by
//! the language switcher; the returned [`AlternateGuard`] clears the slot
//! when dropped so nothing leaks into a later render.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::i18n::Language;
use crate::routing::{
    localize, resolve_locale, strip_locale_prefix, AlternatePathMap, ResolvedLocale,
};

/// Holder for the alternate paths of the entity being rendered.
#[derive(Debug, Clone, Default)]
pub struct AlternateSlot {
    inner: Arc<Mutex<Published>>,
}

#[derive(Debug, Default)]
struct Published {
    generation: u64,
    paths: Option<AlternatePathMap>,
}

impl AlternateSlot {
    /// Publish `paths`, replacing anything published before.
    ///
    /// Only the guard of the latest publication clears the slot; dropping
    /// an older guard leaves the newer map in place.
    #[must_use = "dropping the guard immediately clears the published paths"]
    pub fn publish(&self, paths: AlternatePathMap) -> AlternateGuard {
        let mut published = self.lock();
        published.generation += 1;
        published.paths = Some(paths);
        AlternateGuard {
            slot: self.clone(),
            generation: published.generation,
        }
    }

    /// Currently published paths, if any.
    pub fn current(&self) -> Option<AlternatePathMap> {
        self.lock().paths.clone()
    }

    fn clear(&self, generation: u64) {
        let mut published = self.lock();
        if published.generation == generation {
            published.paths = None;
        }
    }

    fn lock(&self) -> MutexGuard<'_, Published> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clears the owning slot on drop, unless a later publication replaced it.
#[derive(Debug)]
pub struct AlternateGuard {
    slot: AlternateSlot,
    generation: u64,
}

impl Drop for AlternateGuard {
    fn drop(&mut self) {
        self.slot.clear(self.generation);
    }
}

/// Entry of the language switcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitcherLink {
    pub language: Language,
    pub label: &'static str,
    pub href: String,
    pub active: bool,
}

/// State owned by one page render.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub locale: ResolvedLocale,
    /// Request path as received (possibly prefixed).
    pub path: String,
    /// Request path with its locale prefix removed.
    pub canonical_path: String,
    alternates: AlternateSlot,
}

impl RenderContext {
    pub fn for_path(path: &str) -> Self {
        let (_, canonical_path) = strip_locale_prefix(path);
        Self {
            locale: resolve_locale(path),
            path: path.to_string(),
            canonical_path,
            alternates: AlternateSlot::default(),
        }
    }

    pub fn language(&self) -> Language {
        self.locale.language
    }

    pub fn alternates(&self) -> &AlternateSlot {
        &self.alternates
    }

    /// Links for the language switcher.
    ///
    /// With published alternates only the languages present in the map are
    /// offered (an empty map offers nothing). Without a publication every
    /// language links to the localized canonical path.
    pub fn switcher_links(&self) -> Vec<SwitcherLink> {
        let published = self.alternates.current();

        Language::all()
            .filter_map(|language| {
                let href = match &published {
                    Some(paths) => paths.get(language.code())?.clone(),
                    None => localize(&self.canonical_path, language),
                };
                Some(SwitcherLink {
                    language,
                    label: language.native_name(),
                    href,
                    active: language == self.language(),
                })
            })
            .collect()
    }
}
