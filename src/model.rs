use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Separator used in stored page paths (`//Home//About`).
pub const PATH_SEPARATOR: &str = "//";

/// A node in the portal's page hierarchy (a "tab").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub tab_id: i32,
    #[serde(default)]
    pub parent_id: Option<i32>,
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Full path in `//Parent//Child` form
    pub tab_path: String,
    /// Empty for locale-neutral pages
    #[serde(default)]
    pub culture_code: String,
    pub unique_id: Uuid,
    /// Unique id of the default-language page; `None` when this page is the default
    #[serde(default)]
    pub default_language_guid: Option<Uuid>,
    #[serde(default)]
    pub is_translated: bool,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub tab_order: i32,
    #[serde(default)]
    pub is_deleted: bool,
}

impl Page {
    /// Default-language pages carry no reference to another page.
    pub fn is_default_language(&self) -> bool {
        self.default_language_guid.is_none()
    }

    pub fn is_neutral(&self) -> bool {
        self.culture_code.is_empty()
    }

    /// Identifier shared by every localized variant of this page.
    pub fn family_id(&self) -> Uuid {
        self.default_language_guid.unwrap_or(self.unique_id)
    }
}

/// An instance of a content module placed on a specific page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub tab_module_id: i32,
    /// Shared by every page showing the same module content
    pub module_id: i32,
    pub tab_id: i32,
    pub unique_id: Uuid,
    #[serde(default)]
    pub default_language_guid: Option<Uuid>,
    /// Changes whenever the module content changes
    pub localized_version_guid: Uuid,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub culture_code: String,
    #[serde(default)]
    pub is_translated: bool,
    /// True once split into a per-locale copy instead of sharing the default module
    #[serde(default)]
    pub is_localized: bool,
    #[serde(default)]
    pub is_deleted: bool,
}

impl Module {
    /// Identifier shared by every localized variant of this module.
    pub fn family_id(&self) -> Uuid {
        self.default_language_guid.unwrap_or(self.unique_id)
    }
}

/// A portal locale. The empty culture code denotes "locale-neutral".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Locale {
    pub culture_code: String,
}

impl Locale {
    pub fn new(culture_code: impl Into<String>) -> Self {
        Self {
            culture_code: culture_code.into(),
        }
    }

    pub fn neutral() -> Self {
        Self::new("")
    }

    pub fn is_neutral(&self) -> bool {
        self.culture_code.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: i32,
    pub display_name: String,
}

/// Portal-wide settings the reconciler needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalSettings {
    pub portal_id: i32,
    /// Root of the administrative subtree, hidden from localization
    pub admin_tab_id: Option<i32>,
    pub administrator_id: i32,
    pub site_url: String,
}

impl Default for PortalSettings {
    fn default() -> Self {
        Self {
            portal_id: 0,
            admin_tab_id: None,
            administrator_id: 1,
            site_url: "http://localhost".to_string(),
        }
    }
}

/// Splits a stored `//A//B` path into its non-empty segments.
pub fn path_segments(tab_path: &str) -> impl Iterator<Item = &str> {
    tab_path.split(PATH_SEPARATOR).filter(|s| !s.is_empty())
}
