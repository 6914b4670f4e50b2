//! Localization reconciler.
//!
//! Builds the per-locale view of a page family ([`Reconciler::tab_localization`]),
//! writes an edited view back ([`Reconciler::save_tab_localization`]) and runs
//! the family-level actions (make neutral, make translatable, add missing
//! languages).
//!
//! # Example
//!
//! ```rust,ignore
//! let reconciler = Reconciler::new(&portal, &portal, &portal, &portal, &portal, &settings);
//! let mut view = reconciler.tab_localization(42)?;
//! view.pages[1].is_translated = true;
//! reconciler.save_tab_localization(&view)?;
//! ```

mod family;
mod locales;
mod projector;
mod view;
mod writer;

pub use projector::page_url;
pub use view::{LocalizedModuleView, LocalizedPageView, ModuleFamilyView, ModuleGrid, PagesView};

use crate::model::PortalSettings;
use crate::store::{
    LocaleDirectory, ModuleStore, PageStore, PermissionChecker, StoreError, WorkflowSettings,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Page {0} has child pages")]
    HasChildPages(i32),

    #[error("Page family of {0} has no default-language page")]
    MissingDefaultPage(i32),
}

/// Coordinates the collaborators for one portal.
///
/// Holds no state of its own; every call reads the stores afresh.
pub struct Reconciler<'a> {
    pages: &'a dyn PageStore,
    modules: &'a dyn ModuleStore,
    permissions: &'a dyn PermissionChecker,
    locales: &'a dyn LocaleDirectory,
    workflow: &'a dyn WorkflowSettings,
    settings: &'a PortalSettings,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        pages: &'a dyn PageStore,
        modules: &'a dyn ModuleStore,
        permissions: &'a dyn PermissionChecker,
        locales: &'a dyn LocaleDirectory,
        workflow: &'a dyn WorkflowSettings,
        settings: &'a PortalSettings,
    ) -> Self {
        Self {
            pages,
            modules,
            permissions,
            locales,
            workflow,
            settings,
        }
    }

    pub fn settings(&self) -> &PortalSettings {
        self.settings
    }

    pub(crate) fn pages(&self) -> &'a dyn PageStore {
        self.pages
    }

    pub(crate) fn modules(&self) -> &'a dyn ModuleStore {
        self.modules
    }

    pub(crate) fn permissions(&self) -> &'a dyn PermissionChecker {
        self.permissions
    }

    pub(crate) fn locales(&self) -> &'a dyn LocaleDirectory {
        self.locales
    }
}
