//! Translator notifications.
//!
//! Only composition lives here; delivery goes through [`crate::store::Notifier`].

use crate::i18n::{render, MessageStrings};
use crate::model::Page;
use serde::{Deserialize, Serialize};

/// Notification type used when new content is submitted for translation.
pub const TRANSLATION_SUBMITTED: &str = "TranslationSubmitted";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub notification_type: String,
    pub subject: String,
    pub body: String,
    pub include_dismiss_action: bool,
    pub sender_user_id: i32,
}

/// Builds the "translation submitted" notification for a localized page,
/// written in the page's own language.
pub fn translation_submitted(
    page: &Page,
    page_url: &str,
    comment: &str,
    sender_user_id: i32,
) -> Notification {
    let strings = MessageStrings::for_culture(&page.culture_code);
    Notification {
        notification_type: TRANSLATION_SUBMITTED.to_string(),
        subject: strings.new_content_subject.to_string(),
        body: render(
            strings.new_content_body,
            &[("page", page.name.as_str()), ("url", page_url), ("comment", comment)],
        ),
        include_dismiss_action: true,
        sender_user_id,
    }
}
