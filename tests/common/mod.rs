//! Shared fixtures for integration tests.

#![allow(dead_code)]

use tab_localization::memory::PortalSnapshot;
use tab_localization::model::{Locale, Module, Page};
use uuid::Uuid;

/// A page in `culture`; a variant of `default` when one is given.
pub fn page(tab_id: i32, parent_id: Option<i32>, culture: &str, default: Option<&Page>) -> Page {
    let name = format!("Page{}", tab_id);
    let tab_path = match default {
        Some(d) => d.tab_path.clone(),
        None => format!("//{}", name),
    };
    Page {
        tab_id,
        parent_id,
        name,
        title: String::new(),
        description: String::new(),
        tab_path,
        culture_code: culture.to_string(),
        unique_id: Uuid::new_v4(),
        default_language_guid: default.map(|d| d.unique_id),
        is_translated: default.is_none(),
        is_published: default.is_none(),
        tab_order: tab_id,
        is_deleted: false,
    }
}

/// A module placed on `page`; shares the default module's instance and
/// content version when `default` is given.
pub fn module(tab_module_id: i32, module_id: i32, page: &Page, default: Option<&Module>) -> Module {
    Module {
        tab_module_id,
        module_id: default.map_or(module_id, |d| d.module_id),
        tab_id: page.tab_id,
        unique_id: Uuid::new_v4(),
        default_language_guid: default.map(|d| d.unique_id),
        localized_version_guid: default.map_or_else(Uuid::new_v4, |d| d.localized_version_guid),
        title: format!("Module{}", tab_module_id),
        culture_code: page.culture_code.clone(),
        is_translated: default.is_none(),
        is_localized: false,
        is_deleted: false,
    }
}

pub fn snapshot(locales: &[&str], pages: Vec<Page>, modules: Vec<Module>) -> PortalSnapshot {
    PortalSnapshot {
        default_locale: locales.first().copied().unwrap_or_default().to_string(),
        locales: locales.iter().map(|code| Locale::new(*code)).collect(),
        pages,
        modules,
        ..PortalSnapshot::default()
    }
}

/// An en-US page 1 with a French variant 2, one module each (tab modules 10
/// and 11, sharing module instance 100). The variant is neither translated
/// nor published.
pub fn about_page() -> PortalSnapshot {
    let en = page(1, None, "en-US", None);
    let fr = page(2, None, "fr-FR", Some(&en));
    let text = module(10, 100, &en, None);
    let text_fr = module(11, 0, &fr, Some(&text));
    snapshot(&["en-US", "fr-FR"], vec![en, fr], vec![text, text_fr])
}
