//! Localization API for hierarchical CMS pages.
//!
//! The crate projects a page's localized variants (one per culture) and their
//! modules into an editable [`localization::PagesView`], and reconciles an
//! edited view back onto the page and module stores. Stores, permissions,
//! locales and notification delivery are collaborators expressed as traits in
//! [`store`]; [`memory::MemoryPortal`] implements all of them over a JSON
//! snapshot.

pub mod config;
pub mod i18n;
pub mod localization;
pub mod memory;
pub mod model;
pub mod notify;
pub mod service;
pub mod store;
