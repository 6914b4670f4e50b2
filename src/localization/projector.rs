//! Page/module tree projector.

use super::locales::{build_locale_set, family_of, has_missing_languages, localizable_pages};
use super::view::{LocalizedModuleView, PagesView};
use super::{ReconcileError, Reconciler};
use crate::model::{path_segments, Module, Page, PATH_SEPARATOR};
use crate::store::OptionalExtension;
use std::collections::HashSet;
use tracing::{debug, info, warn};

impl<'a> Reconciler<'a> {
    /// Builds the localization view of the family `tab_id` belongs to.
    pub fn tab_localization(&self, tab_id: i32) -> Result<PagesView, ReconcileError> {
        let current = self.pages.get(tab_id)?;
        let pages = localizable_pages(&self.pages.all_for_portal()?, self.settings.admin_tab_id);
        let family = family_of(&current, &pages);

        let portal_locales = self.locales.locales()?;
        let default_locale = self.locales.default_locale()?;
        let locales = build_locale_set(&family, &portal_locales, &default_locale, self.permissions);

        let mut view = PagesView::new(locales);
        view.has_missing_languages = has_missing_languages(&family, &portal_locales);

        let members: Vec<&Page> = family
            .iter()
            .filter(|p| view.has_locale(&p.culture_code))
            .collect();

        for page in members {
            if !self.permissions.can_view_page(page) {
                // Stops the whole pass, later variants stay unpopulated.
                warn!(
                    "No view permission on page {} ({}), dropping locale and stopping",
                    page.tab_id, page.culture_code
                );
                view.remove_locale(&page.culture_code);
                break;
            }
            self.project_page(&mut view, page, &pages)?;
        }

        info!(
            "Projected page {} across {} locales ({} module families, errors: {})",
            tab_id,
            view.locales.len(),
            view.modules.len(),
            view.error_exists
        );
        Ok(view)
    }

    fn project_page(&self, view: &mut PagesView, page: &Page, pages: &[Page]) -> Result<(), ReconcileError> {
        let has_children = pages.iter().any(|p| p.parent_id == Some(page.tab_id));
        let position = position_label(page, pages);
        let url = page_url(&self.settings.site_url, page);

        if let Some(dto) = view.page_mut(&page.culture_code) {
            dto.tab_id = Some(page.tab_id);
            dto.tab_name = page.name.clone();
            dto.title = page.title.clone();
            dto.description = page.description.clone();
            dto.path = parent_path(&page.tab_path);
            dto.has_children = has_children;
            dto.can_admin_page = self.permissions.can_admin_page(page);
            dto.can_view_page = self.permissions.can_view_page(page);
            dto.page_url = url;
            dto.position = position;
            dto.default_language_guid = page.default_language_guid;
            dto.is_translated = page.is_translated;
            dto.is_published = page.is_published;
        }

        for module in self.modules.modules_for_page(page.tab_id)? {
            self.project_module(view, page, &module)?;
        }
        Ok(())
    }

    fn project_module(&self, view: &mut PagesView, page: &Page, module: &Module) -> Result<(), ReconcileError> {
        let family_id = module.family_id();

        let slot = view.module_slot(family_id, &page.culture_code);
        if slot.is_populated() {
            slot.error_duplicate_module = true;
            view.error_exists = true;
            debug!(
                "Duplicate module {} for family {} in {}",
                module.tab_module_id, family_id, page.culture_code
            );
            return Ok(());
        }

        let projected = self.localized_module(page, module)?;
        view.error_exists |= projected.has_error();
        *view.module_slot(family_id, &page.culture_code) = projected;
        Ok(())
    }

    fn localized_module(&self, page: &Page, module: &Module) -> Result<LocalizedModuleView, ReconcileError> {
        let mut default_module_id = None;
        let mut default_tab_name = None;
        let mut error_default_on_other_tab = false;

        if let Some(guid) = module.default_language_guid {
            match self.modules.by_unique_id(guid).optional()? {
                Some(default_module) => {
                    default_module_id = Some(default_module.module_id);
                    let holder = self.pages.get(default_module.tab_id).optional()?;
                    let on_default_page = holder
                        .as_ref()
                        .map_or(false, |p| Some(p.unique_id) == page.default_language_guid);
                    if !on_default_page {
                        error_default_on_other_tab = true;
                        default_tab_name = holder.map(|p| p.name);
                    }
                }
                None => error_default_on_other_tab = true,
            }
        }

        let placements: HashSet<i32> = self
            .modules
            .tab_modules_for_module(module.module_id)?
            .iter()
            .filter(|m| !m.is_deleted && m.culture_code == module.culture_code)
            .map(|m| m.tab_id)
            .collect();

        Ok(LocalizedModuleView {
            culture_code: page.culture_code.clone(),
            tab_id: Some(page.tab_id),
            tab_module_id: Some(module.tab_module_id),
            module_id: Some(module.module_id),
            module_title: module.title.clone(),
            default_language_guid: module.default_language_guid,
            default_module_id,
            default_tab_name,
            can_admin_module: self.permissions.can_admin_module(module),
            can_view_module: self.permissions.can_view_module(module),
            is_deleted: module.is_deleted,
            is_translated: module.is_translated,
            is_localized: module.is_localized,
            is_shared: placements.len() > 1,
            copy_module: false,
            error_duplicate_module: false,
            error_default_on_other_tab,
            error_culture_of_module_not_culture_of_tab: module.culture_code != page.culture_code,
        })
    }
}

/// Position such as `1.3.2`: 1-based rank among same-culture siblings
/// (ordered by `tab_order`), prefixed by each ancestor's own rank.
pub(crate) fn position_label(page: &Page, pages: &[Page]) -> String {
    let mut ranks = vec![sibling_rank(page, pages)];
    let mut seen = HashSet::from([page.tab_id]);
    let mut parent_id = page.parent_id;

    while let Some(id) = parent_id {
        if !seen.insert(id) {
            break;
        }
        let Some(parent) = pages.iter().find(|p| p.tab_id == id) else {
            break;
        };
        ranks.push(sibling_rank(parent, pages));
        parent_id = parent.parent_id;
    }

    ranks
        .iter()
        .rev()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(".")
}

fn sibling_rank(page: &Page, pages: &[Page]) -> usize {
    let mut siblings: Vec<&Page> = pages
        .iter()
        .filter(|p| p.parent_id == page.parent_id && p.culture_code == page.culture_code)
        .collect();
    siblings.sort_by_key(|p| p.tab_order);
    siblings
        .iter()
        .position(|p| p.tab_id == page.tab_id)
        .map_or(0, |i| i + 1)
}

/// Path of the page's parent, segments joined by `/`.
pub(crate) fn parent_path(tab_path: &str) -> String {
    let parent = tab_path
        .rfind(PATH_SEPARATOR)
        .map_or("", |end| &tab_path[..end]);
    path_segments(parent).collect::<Vec<_>>().join("/")
}

/// Canonical URL of a page: site root, culture prefix, then the page path.
pub fn page_url(site_url: &str, page: &Page) -> String {
    let mut url = site_url.trim_end_matches('/').to_string();
    if !page.culture_code.is_empty() {
        url.push('/');
        url.push_str(&page.culture_code);
    }
    for segment in path_segments(&page.tab_path) {
        url.push('/');
        url.push_str(segment);
    }
    url
}
