//! In-memory content repository backed by a JSON snapshot.
//!
//! Implements every collaborator trait of [`crate::store`] so the reconciler
//! can run without a CMS behind it (CLI, tests).

use crate::localization::Reconciler;
use crate::model::{Locale, Module, Page, PortalSettings, User};
use crate::notify::Notification;
use crate::service::PagesService;
use crate::store::{
    LocaleDirectory, ModuleStore, Notifier, PageStore, PermissionChecker, StoreError, StoreResult,
    TranslatorDirectory, WorkflowSettings,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// Everything the in-memory portal knows, as stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PortalSnapshot {
    pub default_locale: String,
    /// Enabled locales in display order
    pub locales: Vec<Locale>,
    pub pages: Vec<Page>,
    pub modules: Vec<Module>,
    pub denied_view_pages: BTreeSet<i32>,
    pub denied_admin_pages: BTreeSet<i32>,
    /// Tab module ids
    pub denied_view_modules: BTreeSet<i32>,
    pub denied_admin_modules: BTreeSet<i32>,
    /// Translators per culture code
    pub translators: BTreeMap<String, Vec<User>>,
    pub sent_notifications: Vec<SentNotification>,
    /// `(tab_id, enabled)` in call order
    pub workflow_log: Vec<(i32, bool)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentNotification {
    pub notification: Notification,
    pub recipients: Vec<User>,
}

pub struct MemoryPortal {
    state: Mutex<PortalSnapshot>,
}

impl MemoryPortal {
    pub fn new(snapshot: PortalSnapshot) -> Self {
        Self {
            state: Mutex::new(snapshot),
        }
    }

    /// Load a portal from a JSON snapshot file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read portal snapshot at {}", path.display()))?;
        let snapshot: PortalSnapshot =
            serde_json::from_str(&content).context("Failed to parse portal snapshot")?;
        Ok(Self::new(snapshot))
    }

    /// Write the current state back to a JSON snapshot file
    pub fn save(&self, path: &Path) -> Result<()> {
        let snapshot = self.snapshot()?;
        let json = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(path, json)
            .context(format!("Failed to write portal snapshot to {}", path.display()))?;
        Ok(())
    }

    pub fn snapshot(&self) -> StoreResult<PortalSnapshot> {
        Ok(self.state()?.clone())
    }

    /// A reconciler using this portal for every collaborator.
    pub fn reconciler<'a>(&'a self, settings: &'a PortalSettings) -> Reconciler<'a> {
        Reconciler::new(self, self, self, self, self, settings)
    }

    /// A pages service using this portal for every collaborator.
    pub fn service<'a>(&'a self, settings: &'a PortalSettings) -> PagesService<'a> {
        PagesService::new(self.reconciler(settings), self, self)
    }

    fn state(&self) -> StoreResult<MutexGuard<'_, PortalSnapshot>> {
        self.state
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

impl PortalSnapshot {
    fn page_mut(&mut self, tab_id: i32) -> StoreResult<&mut Page> {
        self.pages
            .iter_mut()
            .find(|p| p.tab_id == tab_id)
            .ok_or(StoreError::PageNotFound(tab_id))
    }

    fn module(&self, tab_module_id: i32) -> StoreResult<&Module> {
        self.modules
            .iter()
            .find(|m| m.tab_module_id == tab_module_id)
            .ok_or(StoreError::ModuleNotFound(tab_module_id))
    }

    fn module_mut(&mut self, tab_module_id: i32) -> StoreResult<&mut Module> {
        self.modules
            .iter_mut()
            .find(|m| m.tab_module_id == tab_module_id)
            .ok_or(StoreError::ModuleNotFound(tab_module_id))
    }

    fn next_tab_module_id(&self) -> i32 {
        self.modules.iter().map(|m| m.tab_module_id).max().unwrap_or(0) + 1
    }

    fn next_module_id(&self) -> i32 {
        self.modules.iter().map(|m| m.module_id).max().unwrap_or(0) + 1
    }
}

impl PageStore for MemoryPortal {
    fn get(&self, tab_id: i32) -> StoreResult<Page> {
        self.state()?
            .pages
            .iter()
            .find(|p| p.tab_id == tab_id)
            .cloned()
            .ok_or(StoreError::PageNotFound(tab_id))
    }

    fn all_for_portal(&self) -> StoreResult<Vec<Page>> {
        Ok(self.state()?.pages.clone())
    }

    fn insert(&self, mut page: Page) -> StoreResult<Page> {
        let mut state = self.state()?;
        page.tab_id = state.pages.iter().map(|p| p.tab_id).max().unwrap_or(0) + 1;
        state.pages.push(page.clone());
        Ok(page)
    }

    fn update(&self, page: &Page) -> StoreResult<()> {
        *self.state()?.page_mut(page.tab_id)? = page.clone();
        Ok(())
    }

    fn set_translation_status(&self, tab_id: i32, translated: bool) -> StoreResult<()> {
        self.state()?.page_mut(tab_id)?.is_translated = translated;
        Ok(())
    }

    fn publish(&self, tab_id: i32) -> StoreResult<()> {
        self.state()?.page_mut(tab_id)?.is_published = true;
        Ok(())
    }
}

impl ModuleStore for MemoryPortal {
    fn tab_module(&self, tab_module_id: i32) -> StoreResult<Module> {
        self.state()?.module(tab_module_id).cloned()
    }

    fn modules_for_page(&self, tab_id: i32) -> StoreResult<Vec<Module>> {
        Ok(self
            .state()?
            .modules
            .iter()
            .filter(|m| m.tab_id == tab_id)
            .cloned()
            .collect())
    }

    fn by_unique_id(&self, unique_id: Uuid) -> StoreResult<Module> {
        self.state()?
            .modules
            .iter()
            .find(|m| m.unique_id == unique_id)
            .cloned()
            .ok_or(StoreError::UniqueIdNotFound(unique_id))
    }

    fn module_on_page(&self, module_id: i32, tab_id: i32) -> StoreResult<Module> {
        self.state()?
            .modules
            .iter()
            .find(|m| m.module_id == module_id && m.tab_id == tab_id)
            .cloned()
            .ok_or(StoreError::ModuleNotFound(module_id))
    }

    fn tab_modules_for_module(&self, module_id: i32) -> StoreResult<Vec<Module>> {
        Ok(self
            .state()?
            .modules
            .iter()
            .filter(|m| m.module_id == module_id)
            .cloned()
            .collect())
    }

    fn update(&self, module: &Module) -> StoreResult<()> {
        *self.state()?.module_mut(module.tab_module_id)? = module.clone();
        Ok(())
    }

    fn localize(&self, tab_module_id: i32, locale: &Locale) -> StoreResult<Module> {
        let mut state = self.state()?;
        let module_id = state.next_module_id();
        let module = state.module_mut(tab_module_id)?;
        module.module_id = module_id;
        module.culture_code = locale.culture_code.clone();
        // Default-language modules own their content and are never "localized".
        module.is_localized = module.default_language_guid.is_some();
        Ok(module.clone())
    }

    fn delocalize(&self, tab_module_id: i32) -> StoreResult<Module> {
        let mut state = self.state()?;
        let default = match state.module(tab_module_id)?.default_language_guid {
            Some(guid) => state
                .modules
                .iter()
                .find(|m| m.unique_id == guid)
                .map(|m| (m.module_id, m.localized_version_guid)),
            None => None,
        };
        let module = state.module_mut(tab_module_id)?;
        if let Some((module_id, version)) = default {
            module.module_id = module_id;
            module.localized_version_guid = version;
        }
        module.is_localized = false;
        Ok(module.clone())
    }

    fn copy_module(&self, source: &Module, target: &Page, overwrite: bool) -> StoreResult<Module> {
        let mut state = self.state()?;
        let existing = state
            .modules
            .iter()
            .position(|m| m.tab_id == target.tab_id && m.module_id == source.module_id && !m.is_deleted);

        if let Some(index) = existing {
            if !overwrite {
                return Ok(state.modules[index].clone());
            }
        }

        let copy = Module {
            tab_module_id: match existing {
                Some(index) => state.modules[index].tab_module_id,
                None => state.next_tab_module_id(),
            },
            module_id: source.module_id,
            tab_id: target.tab_id,
            unique_id: Uuid::new_v4(),
            default_language_guid: if target.is_default_language() {
                None
            } else {
                Some(source.family_id())
            },
            localized_version_guid: source.localized_version_guid,
            title: source.title.clone(),
            culture_code: target.culture_code.clone(),
            is_translated: target.is_default_language(),
            is_localized: false,
            is_deleted: false,
        };

        match existing {
            Some(index) => state.modules[index] = copy.clone(),
            None => state.modules.push(copy.clone()),
        }
        Ok(copy)
    }

    fn set_translation_status(&self, tab_module_id: i32, translated: bool) -> StoreResult<()> {
        self.state()?.module_mut(tab_module_id)?.is_translated = translated;
        Ok(())
    }

    fn delete(&self, tab_module_id: i32) -> StoreResult<()> {
        self.state()?.module_mut(tab_module_id)?.is_deleted = true;
        Ok(())
    }

    fn restore(&self, tab_module_id: i32) -> StoreResult<()> {
        self.state()?.module_mut(tab_module_id)?.is_deleted = false;
        Ok(())
    }
}

impl PermissionChecker for MemoryPortal {
    fn can_view_page(&self, page: &Page) -> bool {
        self.state()
            .map(|s| !s.denied_view_pages.contains(&page.tab_id))
            .unwrap_or(false)
    }

    fn can_admin_page(&self, page: &Page) -> bool {
        self.state()
            .map(|s| !s.denied_admin_pages.contains(&page.tab_id))
            .unwrap_or(false)
    }

    fn can_view_module(&self, module: &Module) -> bool {
        self.state()
            .map(|s| !s.denied_view_modules.contains(&module.tab_module_id))
            .unwrap_or(false)
    }

    fn can_admin_module(&self, module: &Module) -> bool {
        self.state()
            .map(|s| !s.denied_admin_modules.contains(&module.tab_module_id))
            .unwrap_or(false)
    }
}

impl LocaleDirectory for MemoryPortal {
    fn default_locale(&self) -> StoreResult<Locale> {
        let state = self.state()?;
        if state.default_locale.is_empty() {
            return Ok(state.locales.first().cloned().unwrap_or_else(Locale::neutral));
        }
        Ok(Locale::new(state.default_locale.as_str()))
    }

    fn locales(&self) -> StoreResult<Vec<Locale>> {
        Ok(self.state()?.locales.clone())
    }

    fn locale(&self, culture_code: &str) -> StoreResult<Locale> {
        self.state()?
            .locales
            .iter()
            .find(|l| l.culture_code == culture_code)
            .cloned()
            .ok_or_else(|| StoreError::LocaleNotFound(culture_code.to_string()))
    }
}

impl WorkflowSettings for MemoryPortal {
    fn disable_versioning_and_workflow(&self, tab_id: i32) -> StoreResult<()> {
        self.state()?.workflow_log.push((tab_id, false));
        Ok(())
    }

    fn enable_versioning_and_workflow(&self, tab_id: i32) -> StoreResult<()> {
        self.state()?.workflow_log.push((tab_id, true));
        Ok(())
    }
}

impl TranslatorDirectory for MemoryPortal {
    fn translators_for(&self, page: &Page) -> StoreResult<Vec<User>> {
        Ok(self
            .state()?
            .translators
            .get(&page.culture_code)
            .cloned()
            .unwrap_or_default())
    }
}

impl Notifier for MemoryPortal {
    fn send(&self, notification: &Notification, recipients: &[User]) -> StoreResult<()> {
        self.state()?.sent_notifications.push(SentNotification {
            notification: notification.clone(),
            recipients: recipients.to_vec(),
        });
        Ok(())
    }
}
