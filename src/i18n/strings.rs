//! User-facing message resources for the localization API.

/// All user-facing strings for one UI language.
///
/// Templates use `{name}` placeholders filled in by [`render`].
#[derive(Debug, Clone)]
pub struct MessageStrings {
    /// Two-letter language code the strings are written in
    pub language: &'static str,

    // ==================== Action Errors ====================
    /// Shown when a page with child pages is made neutral
    pub make_neutral_error: &'static str,

    /// Shown when an action targets an unknown page
    pub invalid_tab: &'static str,

    /// Shown when an action targets an unknown tab module
    pub invalid_tab_module: &'static str,

    // ==================== Translator Notifications ====================
    /// Confirmation returned after translators were notified
    pub translation_confirm: &'static str,

    /// Subject of the "translation submitted" notification
    pub new_content_subject: &'static str,

    /// Body of the "translation submitted" notification
    /// Placeholders: {page}, {url}, {comment}
    pub new_content_body: &'static str,
}

pub const ENGLISH_STRINGS: MessageStrings = MessageStrings {
    language: "en",
    make_neutral_error: "This page has child pages and cannot be made language neutral.",
    invalid_tab: "InvalidTab",
    invalid_tab_module: "InvalidTabModule",
    translation_confirm: "The translators have been notified.",
    new_content_subject: "New content ready for translation",
    new_content_body: "The page <a href=\"{url}\">{page}</a> has new content to translate.\n\n{comment}",
};

pub const SPANISH_STRINGS: MessageStrings = MessageStrings {
    language: "es",
    make_neutral_error: "Esta página tiene páginas hijas y no puede ser neutral en idioma.",
    invalid_tab: "InvalidTab",
    invalid_tab_module: "InvalidTabModule",
    translation_confirm: "Se ha notificado a los traductores.",
    new_content_subject: "Nuevo contenido listo para traducir",
    new_content_body: "La página <a href=\"{url}\">{page}</a> tiene contenido nuevo para traducir.\n\n{comment}",
};

impl MessageStrings {
    /// Strings for a culture code such as `es-ES`, falling back to English.
    pub fn for_culture(culture_code: &str) -> &'static MessageStrings {
        let language = culture_code.split(['-', '_']).next().unwrap_or_default();
        if language.eq_ignore_ascii_case(SPANISH_STRINGS.language) {
            &SPANISH_STRINGS
        } else {
            &ENGLISH_STRINGS
        }
    }

    /// Looks a string up by its resource key.
    pub fn get(&self, key: &str) -> Option<&'static str> {
        match key {
            "MakeNeutral.ErrorMessage" => Some(self.make_neutral_error),
            "InvalidTab" => Some(self.invalid_tab),
            "InvalidTabModule" => Some(self.invalid_tab_module),
            "TranslationMessageConfirmMessage.Text" => Some(self.translation_confirm),
            "NewContentMessage.Subject" => Some(self.new_content_subject),
            "NewContentMessage.Body" => Some(self.new_content_body),
            _ => None,
        }
    }
}

/// Replaces every `{name}` placeholder with its value.
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    values
        .iter()
        .fold(template.to_string(), |text, (name, value)| {
            text.replace(&format!("{{{}}}", name), value)
        })
}
