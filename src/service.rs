//! Pages localization service.
//!
//! Wraps the [`Reconciler`] with request validation, permission checks and
//! translator notifications, and maps failures onto HTTP-style status
//! classes. Every failure is logged before it is returned.

use crate::i18n::MessageStrings;
use crate::localization::{page_url, PagesView, ReconcileError, Reconciler};
use crate::model::{Module, Page, User};
use crate::notify::translation_submitted;
use crate::store::{Notifier, OptionalExtension, StoreError, TranslatorDirectory};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::Forbidden(_) => 403,
            ServiceError::Internal(_) => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::Forbidden(_) => "forbidden",
            ServiceError::Internal(_) => "internal_error",
        }
    }
}

impl From<ReconcileError> for ServiceError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::Store(e) => e.into(),
            e @ (ReconcileError::HasChildPages(_) | ReconcileError::MissingDefaultPage(_)) => {
                ServiceError::BadRequest(e.to_string())
            }
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

/// Outcome of an action endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ActionResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }
}

pub struct PagesService<'a> {
    reconciler: Reconciler<'a>,
    translators: &'a dyn TranslatorDirectory,
    notifier: &'a dyn Notifier,
}

impl<'a> PagesService<'a> {
    pub fn new(
        reconciler: Reconciler<'a>,
        translators: &'a dyn TranslatorDirectory,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self {
            reconciler,
            translators,
            notifier,
        }
    }

    pub fn tab_localization(&self, tab_id: i32) -> Result<PagesView, ServiceError> {
        logged("tab_localization", || {
            let page = self.page(tab_id)?;
            Ok(self.reconciler.tab_localization(page.tab_id)?)
        })
    }

    pub fn update_tab_localization(&self, view: &PagesView) -> Result<ActionResult, ServiceError> {
        logged("update_tab_localization", || {
            self.reconciler.save_tab_localization(view)?;
            Ok(ActionResult::ok())
        })
    }

    pub fn make_page_neutral(&self, tab_id: i32) -> Result<ActionResult, ServiceError> {
        logged("make_page_neutral", || {
            let page = self.page(tab_id)?;
            self.require_admin(&page)?;
            self.reconciler
                .make_page_neutral(page.tab_id)
                .map_err(|e| match e {
                    ReconcileError::HasChildPages(_) => {
                        ServiceError::BadRequest(self.message("MakeNeutral.ErrorMessage"))
                    }
                    other => other.into(),
                })?;
            Ok(ActionResult::ok())
        })
    }

    pub fn make_page_translatable(&self, tab_id: i32) -> Result<ActionResult, ServiceError> {
        logged("make_page_translatable", || {
            let page = self.page(tab_id)?;
            self.require_admin(&page)?;
            let created = self.reconciler.make_page_translatable(page.tab_id)?;
            debug!("Created {} variants of page {}", created.len(), page.tab_id);
            Ok(ActionResult::ok())
        })
    }

    pub fn add_missing_languages(&self, tab_id: i32) -> Result<ActionResult, ServiceError> {
        logged("add_missing_languages", || {
            let page = self.page(tab_id)?;
            self.require_admin(&page)?;
            let created = self.reconciler.add_missing_languages(page.tab_id)?;
            debug!("Created {} variants of page {}", created.len(), page.tab_id);
            Ok(ActionResult::ok())
        })
    }

    /// Notifies the translators of every localized variant that the page has
    /// new content. The portal administrator is never notified.
    pub fn notify_translators(&self, tab_id: i32, comment: &str) -> Result<ActionResult, ServiceError> {
        logged("notify_translators", || {
            let page = self.page(tab_id)?;
            let settings = self.reconciler.settings();

            let mut notified = 0;
            for variant in self.reconciler.localized_variants(page.tab_id)? {
                let recipients: Vec<User> = self
                    .translators
                    .translators_for(&variant)?
                    .into_iter()
                    .filter(|u| u.user_id != settings.administrator_id)
                    .collect();
                if recipients.is_empty() {
                    debug!("No translators for {} page {}", variant.culture_code, variant.tab_id);
                    continue;
                }

                let url = page_url(&settings.site_url, &variant);
                let notification =
                    translation_submitted(&variant, &url, comment, settings.administrator_id);
                self.notifier.send(&notification, &recipients)?;
                notified += recipients.len();
            }

            info!("Notified {} translators about page {}", notified, page.tab_id);
            Ok(ActionResult::with_message(self.message("TranslationMessageConfirmMessage.Text")))
        })
    }

    pub fn restore_module(&self, tab_module_id: i32) -> Result<ActionResult, ServiceError> {
        logged("restore_module", || {
            let module = self.tab_module(tab_module_id)?;
            self.reconciler.modules().restore(module.tab_module_id)?;
            info!("Restored tab module {}", module.tab_module_id);
            Ok(ActionResult::ok())
        })
    }

    pub fn delete_module(&self, tab_module_id: i32) -> Result<ActionResult, ServiceError> {
        logged("delete_module", || {
            let module = self.tab_module(tab_module_id)?;
            self.reconciler.modules().delete(module.tab_module_id)?;
            info!("Deleted tab module {}", module.tab_module_id);
            Ok(ActionResult::ok())
        })
    }

    fn page(&self, tab_id: i32) -> Result<Page, ServiceError> {
        self.reconciler
            .pages()
            .get(tab_id)
            .optional()?
            .filter(|p| !p.is_deleted)
            .ok_or_else(|| ServiceError::BadRequest(self.message("InvalidTab")))
    }

    fn tab_module(&self, tab_module_id: i32) -> Result<Module, ServiceError> {
        let module = self
            .reconciler
            .modules()
            .tab_module(tab_module_id)
            .optional()?
            .ok_or_else(|| ServiceError::BadRequest(self.message("InvalidTabModule")))?;
        if !self.reconciler.permissions().can_admin_module(&module) {
            return Err(ServiceError::Forbidden(format!(
                "No edit permission on tab module {}",
                tab_module_id
            )));
        }
        Ok(module)
    }

    fn require_admin(&self, page: &Page) -> Result<(), ServiceError> {
        if self.reconciler.permissions().can_admin_page(page) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(format!(
                "No edit permission on page {}",
                page.tab_id
            )))
        }
    }

    /// Resource string in the portal's default language, or the key itself
    /// when the table has no entry for it.
    fn message(&self, key: &str) -> String {
        self.strings()
            .get(key)
            .map_or_else(|| key.to_string(), str::to_string)
    }

    fn strings(&self) -> &'static MessageStrings {
        let culture = self
            .reconciler
            .locales()
            .default_locale()
            .map(|l| l.culture_code)
            .unwrap_or_default();
        MessageStrings::for_culture(&culture)
    }
}

fn logged<T>(operation: &str, f: impl FnOnce() -> Result<T, ServiceError>) -> Result<T, ServiceError> {
    f().map_err(|e| {
        error!("{} failed ({}): {}", operation, e.status_code(), e);
        e
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryPortal, PortalSnapshot};
    use crate::model::{Locale, PortalSettings};
    use crate::notify::TRANSLATION_SUBMITTED;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn page(tab_id: i32, culture: &str, default: Option<Uuid>) -> Page {
        Page {
            tab_id,
            parent_id: None,
            name: format!("P{}", tab_id),
            title: String::new(),
            description: String::new(),
            tab_path: format!("//P{}", tab_id),
            culture_code: culture.to_string(),
            unique_id: Uuid::new_v4(),
            default_language_guid: default,
            is_translated: true,
            is_published: true,
            tab_order: tab_id,
            is_deleted: false,
        }
    }

    fn module(tab_module_id: i32, tab_id: i32, culture: &str) -> Module {
        Module {
            tab_module_id,
            module_id: tab_module_id * 10,
            tab_id,
            unique_id: Uuid::new_v4(),
            default_language_guid: None,
            localized_version_guid: Uuid::new_v4(),
            title: "Text".to_string(),
            culture_code: culture.to_string(),
            is_translated: true,
            is_localized: false,
            is_deleted: false,
        }
    }

    fn user(user_id: i32, name: &str) -> User {
        User {
            user_id,
            display_name: name.to_string(),
        }
    }

    fn snapshot() -> PortalSnapshot {
        let en = page(1, "en-US", None);
        let fr = page(2, "fr-FR", Some(en.unique_id));
        let mut translators = BTreeMap::new();
        translators.insert(
            "fr-FR".to_string(),
            vec![user(1, "Administrator"), user(7, "Marie")],
        );

        PortalSnapshot {
            default_locale: "en-US".to_string(),
            locales: vec![Locale::new("en-US"), Locale::new("fr-FR")],
            pages: vec![en, fr],
            modules: vec![module(10, 1, "en-US")],
            translators,
            ..PortalSnapshot::default()
        }
    }

    fn service<'a>(portal: &'a MemoryPortal, settings: &'a PortalSettings) -> PagesService<'a> {
        portal.service(settings)
    }

    // ==================== Error Mapping Tests ====================

    #[test]
    fn test_status_codes() {
        assert_eq!(ServiceError::BadRequest("x".into()).status_code(), 400);
        assert_eq!(ServiceError::Forbidden("x".into()).status_code(), 403);
        assert_eq!(ServiceError::Internal("x".into()).status_code(), 500);
        assert_eq!(ServiceError::Forbidden("x".into()).error_code(), "forbidden");
    }

    #[test]
    fn test_store_failure_is_internal() {
        let err: ServiceError = ReconcileError::Store(StoreError::Unavailable("down".into())).into();
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_action_result_serialization() {
        let json = serde_json::to_string(&ActionResult::ok()).expect("serialize");
        assert_eq!(json, r#"{"success":true}"#);
        let json = serde_json::to_string(&ActionResult::with_message("done")).expect("serialize");
        assert_eq!(json, r#"{"success":true,"message":"done"}"#);
    }

    // ==================== Request Validation Tests ====================

    #[test]
    fn test_unknown_tab_is_bad_request() {
        let portal = MemoryPortal::new(snapshot());
        let settings = PortalSettings::default();
        let err = service(&portal, &settings).tab_localization(99).unwrap_err();

        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_string(), "InvalidTab");
    }

    #[test]
    fn test_unknown_module_is_bad_request() {
        let portal = MemoryPortal::new(snapshot());
        let settings = PortalSettings::default();
        let err = service(&portal, &settings).delete_module(99).unwrap_err();

        assert_eq!(err.to_string(), "InvalidTabModule");
    }

    #[test]
    fn test_make_neutral_requires_edit_permission() {
        let mut snapshot = snapshot();
        snapshot.denied_admin_pages.insert(1);
        let portal = MemoryPortal::new(snapshot);
        let settings = PortalSettings::default();

        let err = service(&portal, &settings).make_page_neutral(1).unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[test]
    fn test_make_neutral_with_children_uses_message() {
        let mut snapshot = snapshot();
        let mut child = page(3, "en-US", None);
        child.parent_id = Some(1);
        snapshot.pages.push(child);
        let portal = MemoryPortal::new(snapshot);
        let settings = PortalSettings::default();

        let err = service(&portal, &settings).make_page_neutral(1).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_string(), crate::i18n::ENGLISH_STRINGS.make_neutral_error);
    }

    #[test]
    fn test_messages_follow_default_locale() {
        let mut snapshot = snapshot();
        snapshot.default_locale = "es-ES".to_string();
        let mut child = page(3, "en-US", None);
        child.parent_id = Some(1);
        snapshot.pages.push(child);
        let portal = MemoryPortal::new(snapshot);
        let settings = PortalSettings::default();

        let err = service(&portal, &settings).make_page_neutral(1).unwrap_err();
        assert_eq!(err.to_string(), crate::i18n::SPANISH_STRINGS.make_neutral_error);
    }

    // ==================== Module Action Tests ====================

    #[test]
    fn test_delete_then_restore_module() {
        let portal = MemoryPortal::new(snapshot());
        let settings = PortalSettings::default();
        let service = service(&portal, &settings);

        assert_eq!(service.delete_module(10).expect("delete"), ActionResult::ok());
        assert!(portal.snapshot().expect("snapshot").modules[0].is_deleted);

        service.restore_module(10).expect("restore");
        assert!(!portal.snapshot().expect("snapshot").modules[0].is_deleted);
    }

    // ==================== Notification Tests ====================

    #[test]
    fn test_notify_translators_skips_administrator() {
        let portal = MemoryPortal::new(snapshot());
        let settings = PortalSettings::default();

        let result = service(&portal, &settings)
            .notify_translators(1, "Please review")
            .expect("notify");

        assert_eq!(
            result.message.as_deref(),
            Some(crate::i18n::ENGLISH_STRINGS.translation_confirm)
        );
        let sent = portal.snapshot().expect("snapshot").sent_notifications;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipients, vec![user(7, "Marie")]);
        assert_eq!(sent[0].notification.notification_type, TRANSLATION_SUBMITTED);
        assert_eq!(sent[0].notification.sender_user_id, 1);
        assert!(sent[0].notification.body.contains("http://localhost/fr-FR/P2"));
        assert!(sent[0].notification.body.contains("Please review"));
    }

    #[test]
    fn test_notify_without_translators_sends_nothing() {
        let mut snapshot = snapshot();
        snapshot.translators.clear();
        let portal = MemoryPortal::new(snapshot);
        let settings = PortalSettings::default();

        service(&portal, &settings)
            .notify_translators(1, "")
            .expect("notify");

        assert!(portal.snapshot().expect("snapshot").sent_notifications.is_empty());
    }
}
