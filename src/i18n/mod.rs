//! Internationalization (i18n) module for multi-language support.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for the supported languages, their
//!   text direction and which one is the unprefixed default
//! - `language`: Type-safe `Language` handle validated against the registry
//! - `strings`: Localized messages produced by the service itself
//!
//! # Example
//!
//! ```rust,ignore
//! use crate::i18n::{Direction, Language};
//!
//! let arabic = Language::parse("AR").unwrap();
//! assert_eq!(arabic.direction(), Direction::Rtl);
//! ```

mod language;
mod registry;
mod strings;

pub use language::Language;
pub use registry::{Direction, LanguageConfig, LanguageRegistry};
pub use strings::LanguageStrings;
