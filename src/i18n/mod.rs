//! User-facing strings for the localization API.
//!
//! Strings are grouped per UI language in [`MessageStrings`] and looked up
//! either by field or by their resource key (`MakeNeutral.ErrorMessage`,
//! `NewContentMessage.Body`, ...). Notifications sent to translators are
//! rendered in the language of the page being translated.

mod strings;

pub use strings::{render, MessageStrings, ENGLISH_STRINGS, SPANISH_STRINGS};
