//! Editable projection of a page family across its locales.

use crate::model::Locale;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A page family projected per locale, together with its module grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagesView {
    pub locales: Vec<Locale>,
    /// One entry per locale, in locale order
    pub pages: Vec<LocalizedPageView>,
    pub modules: ModuleGrid,
    pub has_missing_languages: bool,
    /// Set when any data-consistency flag was raised; never cleared
    pub error_exists: bool,
}

impl PagesView {
    pub fn new(locales: Vec<Locale>) -> Self {
        let pages = locales
            .iter()
            .map(|locale| LocalizedPageView::new(&locale.culture_code))
            .collect();
        Self {
            locales,
            pages,
            ..Self::default()
        }
    }

    pub fn has_locale(&self, culture_code: &str) -> bool {
        self.locales.iter().any(|l| l.culture_code == culture_code)
    }

    pub fn page(&self, culture_code: &str) -> Option<&LocalizedPageView> {
        self.pages.iter().find(|p| p.culture_code == culture_code)
    }

    pub fn page_mut(&mut self, culture_code: &str) -> Option<&mut LocalizedPageView> {
        self.pages.iter_mut().find(|p| p.culture_code == culture_code)
    }

    /// Drops a locale together with its page view and module slots.
    pub fn remove_locale(&mut self, culture_code: &str) {
        self.locales.retain(|l| l.culture_code != culture_code);
        self.pages.retain(|p| p.culture_code != culture_code);
        self.modules.remove_culture(culture_code);
    }

    /// The slot for a module family in a locale, created on first use.
    pub fn module_slot(&mut self, family_id: Uuid, culture_code: &str) -> &mut LocalizedModuleView {
        self.modules.slot_mut(family_id, culture_code, &self.locales)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedPageView {
    pub culture_code: String,
    /// `None` when the family has no page in this locale
    pub tab_id: Option<i32>,
    pub tab_name: String,
    pub title: String,
    pub description: String,
    pub path: String,
    pub has_children: bool,
    pub can_admin_page: bool,
    pub can_view_page: bool,
    pub page_url: String,
    /// Hierarchical position such as `1.3.2`
    pub position: String,
    pub default_language_guid: Option<Uuid>,
    pub is_translated: bool,
    pub is_published: bool,
}

impl LocalizedPageView {
    pub fn new(culture_code: &str) -> Self {
        Self {
            culture_code: culture_code.to_string(),
            ..Self::default()
        }
    }
}

/// All localized variants of one module family, one slot per locale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleFamilyView {
    pub family_id: Uuid,
    pub modules: Vec<LocalizedModuleView>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocalizedModuleView {
    pub culture_code: String,
    pub tab_id: Option<i32>,
    pub tab_module_id: Option<i32>,
    pub module_id: Option<i32>,
    pub module_title: String,
    pub default_language_guid: Option<Uuid>,
    pub default_module_id: Option<i32>,
    /// Name of the page holding the default module when it is not this page's default page
    pub default_tab_name: Option<String>,
    pub can_admin_module: bool,
    pub can_view_module: bool,
    pub is_deleted: bool,
    pub is_translated: bool,
    pub is_localized: bool,
    pub is_shared: bool,
    /// Request flag: materialize this slot from the first existing module of the row
    pub copy_module: bool,
    pub error_duplicate_module: bool,
    pub error_default_on_other_tab: bool,
    pub error_culture_of_module_not_culture_of_tab: bool,
}

impl LocalizedModuleView {
    pub fn new(culture_code: &str) -> Self {
        Self {
            culture_code: culture_code.to_string(),
            ..Self::default()
        }
    }

    pub fn is_populated(&self) -> bool {
        self.tab_module_id.is_some()
    }

    pub fn has_error(&self) -> bool {
        self.error_duplicate_module
            || self.error_default_on_other_tab
            || self.error_culture_of_module_not_culture_of_tab
    }
}

/// Module slots keyed by (module family, locale), rows kept in discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleGrid {
    rows: Vec<ModuleFamilyView>,
    index: HashMap<Uuid, usize>,
}

impl ModuleGrid {
    pub fn rows(&self) -> &[ModuleFamilyView] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, family_id: Uuid) -> Option<&ModuleFamilyView> {
        self.index.get(&family_id).map(|&i| &self.rows[i])
    }

    pub fn slot(&self, family_id: Uuid, culture_code: &str) -> Option<&LocalizedModuleView> {
        self.row(family_id)?
            .modules
            .iter()
            .find(|m| m.culture_code == culture_code)
    }

    /// Mutable access for callers editing the grid before it is written back.
    pub fn slot_edit(&mut self, family_id: Uuid, culture_code: &str) -> Option<&mut LocalizedModuleView> {
        let &row = self.index.get(&family_id)?;
        self.rows[row]
            .modules
            .iter_mut()
            .find(|m| m.culture_code == culture_code)
    }

    fn slot_mut(&mut self, family_id: Uuid, culture_code: &str, locales: &[Locale]) -> &mut LocalizedModuleView {
        let row = match self.index.get(&family_id) {
            Some(&row) => row,
            None => {
                self.rows.push(ModuleFamilyView {
                    family_id,
                    modules: locales
                        .iter()
                        .map(|l| LocalizedModuleView::new(&l.culture_code))
                        .collect(),
                });
                self.index.insert(family_id, self.rows.len() - 1);
                self.rows.len() - 1
            }
        };

        let modules = &mut self.rows[row].modules;
        let slot = match modules.iter().position(|m| m.culture_code == culture_code) {
            Some(slot) => slot,
            None => {
                modules.push(LocalizedModuleView::new(culture_code));
                modules.len() - 1
            }
        };
        &mut modules[slot]
    }

    fn remove_culture(&mut self, culture_code: &str) {
        for row in &mut self.rows {
            row.modules.retain(|m| m.culture_code != culture_code);
        }
    }
}

impl From<Vec<ModuleFamilyView>> for ModuleGrid {
    fn from(rows: Vec<ModuleFamilyView>) -> Self {
        let index = rows
            .iter()
            .enumerate()
            .map(|(i, row)| (row.family_id, i))
            .collect();
        Self { rows, index }
    }
}

impl Serialize for ModuleGrid {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.rows.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ModuleGrid {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<ModuleFamilyView>::deserialize(deserializer).map(ModuleGrid::from)
    }
}
