//! Collaborator interfaces the localization layer works against.
//!
//! Persistence, permission evaluation, locale configuration, versioning and
//! notification delivery all live outside this crate. Every lookup reports a
//! missing record through an explicit [`StoreError`] variant;
//! [`OptionalExtension::optional`] turns those into `Ok(None)` where absence
//! is an expected outcome.

use crate::model::{Locale, Module, Page, User};
use crate::notify::Notification;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Page {0} not found")]
    PageNotFound(i32),

    #[error("Tab module {0} not found")]
    ModuleNotFound(i32),

    #[error("No module with unique id {0}")]
    UniqueIdNotFound(Uuid),

    #[error("Locale '{0}' is not configured for this portal")]
    LocaleNotFound(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        !matches!(self, StoreError::Unavailable(_))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Converts not-found lookups into `None`, keeping real failures as errors.
pub trait OptionalExtension<T> {
    fn optional(self) -> StoreResult<Option<T>>;
}

impl<T> OptionalExtension<T> for StoreResult<T> {
    fn optional(self) -> StoreResult<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

pub trait PageStore {
    fn get(&self, tab_id: i32) -> StoreResult<Page>;

    /// Every page of the portal, soft-deleted ones included.
    fn all_for_portal(&self) -> StoreResult<Vec<Page>>;

    /// Stores a new page, assigning its `tab_id`.
    fn insert(&self, page: Page) -> StoreResult<Page>;

    fn update(&self, page: &Page) -> StoreResult<()>;

    fn set_translation_status(&self, tab_id: i32, translated: bool) -> StoreResult<()>;

    fn publish(&self, tab_id: i32) -> StoreResult<()>;
}

pub trait ModuleStore {
    fn tab_module(&self, tab_module_id: i32) -> StoreResult<Module>;

    /// Tab modules placed on a page, soft-deleted ones included.
    fn modules_for_page(&self, tab_id: i32) -> StoreResult<Vec<Module>>;

    fn by_unique_id(&self, unique_id: Uuid) -> StoreResult<Module>;

    fn module_on_page(&self, module_id: i32, tab_id: i32) -> StoreResult<Module>;

    /// Every placement of a module across pages.
    fn tab_modules_for_module(&self, module_id: i32) -> StoreResult<Vec<Module>>;

    fn update(&self, module: &Module) -> StoreResult<()>;

    /// Splits a shared module into a per-locale copy.
    fn localize(&self, tab_module_id: i32, locale: &Locale) -> StoreResult<Module>;

    /// Re-attaches a localized module to its default-language module.
    fn delocalize(&self, tab_module_id: i32) -> StoreResult<Module>;

    fn copy_module(&self, source: &Module, target: &Page, overwrite: bool) -> StoreResult<Module>;

    fn set_translation_status(&self, tab_module_id: i32, translated: bool) -> StoreResult<()>;

    fn delete(&self, tab_module_id: i32) -> StoreResult<()>;

    fn restore(&self, tab_module_id: i32) -> StoreResult<()>;
}

/// Permissions of the current caller.
pub trait PermissionChecker {
    fn can_view_page(&self, page: &Page) -> bool;
    fn can_admin_page(&self, page: &Page) -> bool;
    fn can_view_module(&self, module: &Module) -> bool;
    fn can_admin_module(&self, module: &Module) -> bool;
}

pub trait LocaleDirectory {
    fn default_locale(&self) -> StoreResult<Locale>;

    /// Enabled locales in display order.
    fn locales(&self) -> StoreResult<Vec<Locale>>;

    fn locale(&self, culture_code: &str) -> StoreResult<Locale>;
}

/// Page versioning and workflow toggles, switched off around module copies.
pub trait WorkflowSettings {
    fn disable_versioning_and_workflow(&self, tab_id: i32) -> StoreResult<()>;
    fn enable_versioning_and_workflow(&self, tab_id: i32) -> StoreResult<()>;
}

pub trait TranslatorDirectory {
    fn translators_for(&self, page: &Page) -> StoreResult<Vec<User>>;
}

pub trait Notifier {
    fn send(&self, notification: &Notification, recipients: &[User]) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_maps_not_found_to_none() {
        let result: StoreResult<i32> = Err(StoreError::PageNotFound(3));
        assert_eq!(result.optional(), Ok(None));

        let result: StoreResult<i32> = Err(StoreError::UniqueIdNotFound(Uuid::nil()));
        assert_eq!(result.optional(), Ok(None));
    }

    #[test]
    fn test_optional_keeps_value() {
        let result: StoreResult<i32> = Ok(5);
        assert_eq!(result.optional(), Ok(Some(5)));
    }

    #[test]
    fn test_optional_keeps_unavailable_error() {
        let result: StoreResult<i32> = Err(StoreError::Unavailable("poisoned".to_string()));
        assert!(result.optional().is_err());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(StoreError::PageNotFound(12).to_string(), "Page 12 not found");
        assert_eq!(
            StoreError::LocaleNotFound("de-DE".to_string()).to_string(),
            "Locale 'de-DE' is not configured for this portal"
        );
    }
}
