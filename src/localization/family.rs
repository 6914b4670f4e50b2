//! Family-level localization actions.

use super::locales::{family_of, localizable_pages};
use super::{ReconcileError, Reconciler};
use crate::model::{Locale, Page};
use tracing::{debug, info};
use uuid::Uuid;

impl<'a> Reconciler<'a> {
    /// Variants of the page's family other than the default-language page.
    pub fn localized_variants(&self, tab_id: i32) -> Result<Vec<Page>, ReconcileError> {
        let page = self.pages.get(tab_id)?;
        let pages = localizable_pages(&self.pages.all_for_portal()?, self.settings.admin_tab_id);
        Ok(family_of(&page, &pages)
            .into_iter()
            .filter(|p| !p.is_default_language())
            .collect())
    }

    /// Turns the family into a single locale-neutral page.
    ///
    /// The default-language page and its modules lose their culture, every
    /// other variant is soft-deleted together with its modules. Refused while
    /// any variant still has child pages.
    pub fn make_page_neutral(&self, tab_id: i32) -> Result<(), ReconcileError> {
        let page = self.pages.get(tab_id)?;
        let all = self.pages.all_for_portal()?;
        let family = family_of(&page, &localizable_pages(&all, self.settings.admin_tab_id));

        for member in &family {
            if all
                .iter()
                .any(|p| !p.is_deleted && p.parent_id == Some(member.tab_id))
            {
                return Err(ReconcileError::HasChildPages(member.tab_id));
            }
        }
        if !family.iter().any(Page::is_default_language) {
            return Err(ReconcileError::MissingDefaultPage(tab_id));
        }

        for mut member in family {
            if member.is_default_language() {
                member.culture_code.clear();
                self.pages.update(&member)?;
                for mut module in self.modules.modules_for_page(member.tab_id)? {
                    module.culture_code.clear();
                    module.default_language_guid = None;
                    module.is_localized = false;
                    self.modules.update(&module)?;
                }
            } else {
                member.is_deleted = true;
                self.pages.update(&member)?;
                for module in self.modules.modules_for_page(member.tab_id)? {
                    self.modules.delete(module.tab_module_id)?;
                }
                debug!("Deleted variant {} ({})", member.tab_id, member.culture_code);
            }
        }

        info!("Page {} is now language neutral", tab_id);
        Ok(())
    }

    /// Assigns the portal default culture to a neutral page, then creates its
    /// missing variants.
    pub fn make_page_translatable(&self, tab_id: i32) -> Result<Vec<Page>, ReconcileError> {
        let mut page = self.pages.get(tab_id)?;
        let default_locale = self.locales.default_locale()?;

        if page.is_neutral() {
            page.culture_code = default_locale.culture_code.clone();
            self.pages.update(&page)?;
            for mut module in self.modules.modules_for_page(page.tab_id)? {
                if module.culture_code.is_empty() {
                    module.culture_code = default_locale.culture_code.clone();
                    self.modules.update(&module)?;
                }
            }
            info!("Page {} localized to {}", tab_id, default_locale.culture_code);
        }

        self.add_missing_languages(tab_id)
    }

    /// Creates an untranslated copy of the default-language page for every
    /// enabled locale the family lacks. Returns the created pages.
    pub fn add_missing_languages(&self, tab_id: i32) -> Result<Vec<Page>, ReconcileError> {
        let page = self.pages.get(tab_id)?;
        let pages = localizable_pages(&self.pages.all_for_portal()?, self.settings.admin_tab_id);
        let family = family_of(&page, &pages);

        let portal_locales = self.locales.locales()?;
        if portal_locales.is_empty() || family.iter().all(Page::is_neutral) {
            return Ok(Vec::new());
        }

        let Some(default_page) = family.iter().find(|p| p.is_default_language()) else {
            return Err(ReconcileError::MissingDefaultPage(tab_id));
        };
        let default_modules = self.modules.modules_for_page(default_page.tab_id)?;

        let mut created = Vec::new();
        for locale in &portal_locales {
            if family.iter().any(|p| p.culture_code == locale.culture_code) {
                continue;
            }

            let variant = Page {
                tab_id: 0,
                parent_id: default_page
                    .parent_id
                    .map(|parent| localized_parent(parent, locale, &pages)),
                name: default_page.name.clone(),
                title: default_page.title.clone(),
                description: default_page.description.clone(),
                tab_path: default_page.tab_path.clone(),
                culture_code: locale.culture_code.clone(),
                unique_id: Uuid::new_v4(),
                default_language_guid: Some(default_page.unique_id),
                is_translated: false,
                is_published: false,
                tab_order: default_page.tab_order,
                is_deleted: false,
            };
            let variant = self.pages.insert(variant)?;

            for module in default_modules.iter().filter(|m| !m.is_deleted) {
                self.modules.copy_module(module, &variant, false)?;
            }

            info!(
                "Added {} variant {} of page {}",
                locale.culture_code, variant.tab_id, default_page.tab_id
            );
            created.push(variant);
        }
        Ok(created)
    }
}

/// The parent's variant in `locale`, or the parent itself when it has none.
fn localized_parent(parent_id: i32, locale: &Locale, pages: &[Page]) -> i32 {
    let Some(parent) = pages.iter().find(|p| p.tab_id == parent_id) else {
        return parent_id;
    };
    let family_id = parent.family_id();
    pages
        .iter()
        .find(|p| p.family_id() == family_id && p.culture_code == locale.culture_code)
        .map_or(parent_id, |p| p.tab_id)
}
