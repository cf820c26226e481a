//! Qahwa World site service.
//!
//! Locale-aware routing (`routing`), per-request render state (`render`),
//! the CMS client (`cms`), page assembly (`pages`), newsletter signups
//! (`newsletter`), sitemap generation (`sitemap`) and the HTTP surface
//! (`server`).

pub mod cms;
pub mod config;
pub mod i18n;
pub mod newsletter;
pub mod pages;
pub mod render;
pub mod retry;
pub mod routing;
pub mod server;
pub mod sitemap;
