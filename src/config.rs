use crate::model::PortalSettings;
use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    // Portal
    pub portal_id: i32,
    pub admin_tab_id: Option<i32>,
    pub administrator_id: i32,
    pub site_url: String,

    // Storage
    pub snapshot_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            portal_id: std::env::var("PORTAL_ID")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            admin_tab_id: match std::env::var("ADMIN_TAB_ID") {
                Ok(v) if !v.trim().is_empty() => Some(
                    v.trim()
                        .parse()
                        .context("ADMIN_TAB_ID must be a page id")?,
                ),
                _ => None,
            },
            administrator_id: std::env::var("ADMINISTRATOR_ID")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
            site_url: std::env::var("SITE_URL")
                .unwrap_or_else(|_| "http://localhost".to_string()),

            snapshot_path: std::env::var("SNAPSHOT_PATH")
                .unwrap_or_else(|_| "data/portal.json".to_string())
                .into(),
        })
    }

    pub fn portal_settings(&self) -> PortalSettings {
        PortalSettings {
            portal_id: self.portal_id,
            admin_tab_id: self.admin_tab_id,
            administrator_id: self.administrator_id,
            site_url: self.site_url.clone(),
        }
    }
}
