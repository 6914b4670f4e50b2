//! Reconciliation writer: applies an edited [`PagesView`] to the stores.
//!
//! Updates are applied record by record. A failure aborts the remaining steps
//! but leaves earlier updates in place.

use super::view::{LocalizedModuleView, ModuleFamilyView, PagesView};
use super::{ReconcileError, Reconciler};
use crate::model::{Module, Page};
use crate::store::OptionalExtension;
use std::collections::HashSet;
use tracing::{debug, info, warn};

impl<'a> Reconciler<'a> {
    pub fn save_tab_localization(&self, view: &PagesView) -> Result<(), ReconcileError> {
        self.save_page_details(view)?;

        let overrides = self.translation_overrides(view)?;
        for row in view.modules.rows() {
            for (index, slot) in row.modules.iter().enumerate() {
                self.save_module_slot(view, row, index, slot, &overrides)?;
            }
        }

        let to_publish = self.save_page_statuses(view)?;
        for page in &to_publish {
            self.publish_page(page)?;
        }

        self.refresh_translated_status(view)?;

        info!(
            "Saved localization for {} pages ({} published)",
            view.pages.len(),
            to_publish.len()
        );
        Ok(())
    }

    /// Stored page behind a view entry, if both exist.
    fn stored_page(&self, tab_id: Option<i32>) -> Result<Option<Page>, ReconcileError> {
        let Some(tab_id) = tab_id else {
            return Ok(None);
        };
        let page = self.pages.get(tab_id).optional()?;
        if page.is_none() {
            warn!("Page {} in the view no longer exists", tab_id);
        }
        Ok(page)
    }

    fn save_page_details(&self, view: &PagesView) -> Result<(), ReconcileError> {
        for dto in &view.pages {
            let Some(mut page) = self.stored_page(dto.tab_id)? else {
                continue;
            };
            if page.name != dto.tab_name || page.title != dto.title || page.description != dto.description {
                page.name = dto.tab_name.clone();
                page.title = dto.title.clone();
                page.description = dto.description.clone();
                self.pages.update(&page)?;
                debug!("Updated details of page {}", page.tab_id);
            }
        }
        Ok(())
    }

    /// Pages about to become translated; their modules are handled by the
    /// translation cascade instead of per-module edits.
    fn translation_overrides(&self, view: &PagesView) -> Result<HashSet<i32>, ReconcileError> {
        let mut overrides = HashSet::new();
        for dto in &view.pages {
            let Some(page) = self.stored_page(dto.tab_id)? else {
                continue;
            };
            if !page.is_default_language() && dto.is_translated && !page.is_translated {
                overrides.insert(page.tab_id);
            }
        }
        Ok(overrides)
    }

    fn save_module_slot(
        &self,
        view: &PagesView,
        row: &ModuleFamilyView,
        index: usize,
        slot: &LocalizedModuleView,
        overrides: &HashSet<i32>,
    ) -> Result<(), ReconcileError> {
        let stored = match slot.tab_module_id {
            Some(id) => self.modules.tab_module(id).optional()?,
            None => None,
        };

        match stored {
            Some(module) => self.save_module(module, slot, overrides),
            None if slot.copy_module => self.copy_into_slot(view, row, index),
            None => Ok(()),
        }
    }

    fn save_module(
        &self,
        mut module: Module,
        slot: &LocalizedModuleView,
        overrides: &HashSet<i32>,
    ) -> Result<(), ReconcileError> {
        if module.title != slot.module_title {
            module.title = slot.module_title.clone();
            self.modules.update(&module)?;
        }

        if module.default_language_guid.is_some() && module.is_localized != slot.is_localized {
            module = if slot.is_localized {
                let locale = self.locales.locale(&module.culture_code)?;
                self.modules.localize(module.tab_module_id, &locale)?
            } else {
                self.modules.delocalize(module.tab_module_id)?
            };
            debug!(
                "Module {} localized: {}",
                module.tab_module_id, module.is_localized
            );
        }

        if !overrides.contains(&module.tab_id) && module.is_translated != slot.is_translated {
            self.modules
                .set_translation_status(module.tab_module_id, slot.is_translated)?;
        }
        Ok(())
    }

    /// Materializes an empty slot from the first existing module of its row.
    fn copy_into_slot(&self, view: &PagesView, row: &ModuleFamilyView, index: usize) -> Result<(), ReconcileError> {
        let Some(source_id) = row
            .modules
            .iter()
            .filter_map(|m| m.tab_module_id)
            .find(|&id| id > 0)
        else {
            debug!("Nothing to copy for module family {}", row.family_id);
            return Ok(());
        };

        let target_culture = &row.modules[index].culture_code;
        let Some(target_id) = view.page(target_culture).and_then(|p| p.tab_id) else {
            warn!(
                "No {} page to copy module family {} onto",
                target_culture, row.family_id
            );
            return Ok(());
        };

        let source = self.modules.tab_module(source_id)?;
        let target = self.pages.get(target_id)?;

        let copied = match source.default_language_guid {
            None => {
                self.workflow.disable_versioning_and_workflow(target.tab_id)?;
                let copied = self.modules.copy_module(&source, &target, true);
                self.workflow.enable_versioning_and_workflow(target.tab_id)?;
                let copied = copied?;
                let locale = self.locales.locale(&copied.culture_code)?;
                self.modules.localize(copied.tab_module_id, &locale)?
            }
            Some(guid) => {
                let default_module = self.modules.by_unique_id(guid)?;
                self.modules.copy_module(&default_module, &target, true)?
            }
        };
        info!(
            "Copied module {} onto page {} as tab module {}",
            source.tab_module_id, target.tab_id, copied.tab_module_id
        );

        if index == 0 {
            self.link_to_default(view, &copied, source.module_id)?;
        }
        Ok(())
    }

    /// Points the other pages' copies of `module_id` at the new default module.
    fn link_to_default(&self, view: &PagesView, default_module: &Module, module_id: i32) -> Result<(), ReconcileError> {
        let other_pages = view.pages.iter().skip(1).filter_map(|p| p.tab_id);
        for tab_id in other_pages {
            if let Some(mut module) = self.modules.module_on_page(module_id, tab_id).optional()? {
                module.default_language_guid = Some(default_module.unique_id);
                self.modules.update(&module)?;
            }
        }
        Ok(())
    }

    /// Applies translated/published flags of non-default pages and returns
    /// the pages to publish.
    fn save_page_statuses(&self, view: &PagesView) -> Result<Vec<Page>, ReconcileError> {
        let mut to_publish = Vec::new();

        for dto in &view.pages {
            let Some(page) = self.stored_page(dto.tab_id)? else {
                continue;
            };
            if page.is_default_language() {
                continue;
            }

            if page.is_translated != dto.is_translated {
                self.pages
                    .set_translation_status(page.tab_id, dto.is_translated)?;
                if dto.is_translated {
                    self.cascade_translation(&page)?;
                }
            }

            if dto.is_published {
                to_publish.push(page);
            }
        }
        Ok(to_publish)
    }

    /// Marks modules whose content differs from their default module as translated.
    fn cascade_translation(&self, page: &Page) -> Result<(), ReconcileError> {
        for module in self.modules.modules_for_page(page.tab_id)? {
            let Some(guid) = module.default_language_guid else {
                continue;
            };
            let Some(default_module) = self.modules.by_unique_id(guid).optional()? else {
                continue;
            };
            if default_module.localized_version_guid != module.localized_version_guid {
                self.modules
                    .set_translation_status(module.tab_module_id, true)?;
            }
        }
        Ok(())
    }

    fn publish_page(&self, page: &Page) -> Result<(), ReconcileError> {
        for module in self.modules.modules_for_page(page.tab_id)? {
            self.modules
                .set_translation_status(module.tab_module_id, true)?;
        }
        self.pages.set_translation_status(page.tab_id, true)?;
        self.pages.publish(page.tab_id)?;
        info!("Published page {} ({})", page.tab_id, page.culture_code);
        Ok(())
    }

    /// A page whose modules are all translated is itself translated.
    fn refresh_translated_status(&self, view: &PagesView) -> Result<(), ReconcileError> {
        for dto in &view.pages {
            let Some(page) = self.stored_page(dto.tab_id)? else {
                continue;
            };
            if page.is_translated {
                continue;
            }
            let modules = self.modules.modules_for_page(page.tab_id)?;
            if modules.iter().all(|m| m.is_translated) {
                self.pages.set_translation_status(page.tab_id, true)?;
            }
        }
        Ok(())
    }
}
