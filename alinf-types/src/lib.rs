//! Shared types for the alias inflection engine and the hosts that drive it.

use serde::{Deserialize, Serialize};

// =====================================================
// Run Options
// =====================================================

/// Options for one alias inflection run. Immutable for the duration of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InflectionOptions {
    /// Request plural forms in addition to singular ones
    pub include_plural: bool,
    /// Inflect the note's own name, not only its existing aliases
    pub inflect_filename: bool,
}

impl Default for InflectionOptions {
    fn default() -> Self {
        Self {
            include_plural: true,
            inflect_filename: true,
        }
    }
}

/// Which inflection backend is active.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum InflectorKind {
    /// Morpher.ru declension web service
    Morpher,
    /// OpenAI-compatible chat completions endpoint
    OpenAi,
    /// Offline fixed table, only offered in debug mode
    Stub,
}

impl InflectorKind {
    pub fn display_name(self) -> &'static str {
        match self {
            InflectorKind::Morpher => "Morpher",
            InflectorKind::OpenAi => "OpenAI",
            InflectorKind::Stub => "Stub (debug)",
        }
    }

    pub fn is_debug_only(self) -> bool {
        matches!(self, InflectorKind::Stub)
    }
}

// =====================================================
// Run Outcome
// =====================================================

/// A user-visible notice produced by one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum Notice {
    /// All provider failures of the run, already joined into one message
    InflectorErrors(String),
    AliasesUpdated,
    AlreadyInflected,
    /// Structural failure (missing note, I/O); details go to the log
    Failed,
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Notice::InflectorErrors(msg) => msg.clone(),
            Notice::AliasesUpdated => "Aliases updated".to_string(),
            Notice::AlreadyInflected => "Aliases are already inflected".to_string(),
            Notice::Failed => "Error fetching inflections".to_string(),
        }
    }
}

/// Result of one "add aliases with inflections" operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliasRunReport {
    pub note_name: String,
    pub options: InflectionOptions,
    /// Alias list written to the note
    pub aliases: Vec<String>,
    /// Whether the note's text actually changed
    pub changed: bool,
    pub notices: Vec<Notice>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_inflector_kind_names() {
        assert_eq!(InflectorKind::OpenAi.to_string(), "openai");
        assert_eq!(InflectorKind::from_str("Morpher").unwrap(), InflectorKind::Morpher);
        assert!(InflectorKind::from_str("yandex").is_err());
        assert_eq!(InflectorKind::iter().count(), 3);
    }

    #[test]
    fn test_notice_messages() {
        assert_eq!(Notice::AliasesUpdated.message(), "Aliases updated");
        assert_eq!(Notice::AlreadyInflected.message(), "Aliases are already inflected");
        assert_eq!(Notice::InflectorErrors("a\n\nb".into()).message(), "a\n\nb");
    }

    #[test]
    fn test_default_options() {
        let opts = InflectionOptions::default();
        assert!(opts.include_plural);
        assert!(opts.inflect_filename);
    }
}
