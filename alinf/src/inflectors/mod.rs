//! Inflection providers.
//!
//! An `Inflector` turns one phrase into grammatical forms of it. Providers
//! report a failed lookup as `Err(cause)`; callers go through an
//! `InflectionBatch`, which converts every failure into one log message and
//! an empty result, so a bad phrase never aborts the rest of a run.

pub mod morpher;
pub mod openai;
pub mod stub;

use crate::models::Settings;
use alinf_types::{InflectionOptions, InflectorKind};
use async_trait::async_trait;
use std::collections::HashSet;

pub use morpher::MorpherInflector;
pub use openai::OpenAiInflector;
pub use stub::StubInflector;

/// A source of inflected word forms.
#[async_trait]
pub trait Inflector: Send + Sync {
    fn kind(&self) -> InflectorKind;

    /// Look up the forms of `phrase`. `Err` carries a human-readable cause.
    async fn inflect(&self, phrase: &str, options: &InflectionOptions)
        -> Result<Vec<String>, String>;
}

/// Build the inflector selected in settings.
pub fn create_inflector(settings: &Settings) -> Box<dyn Inflector> {
    let kind = settings.effective_inflector();
    log::info!("[INFLECTOR] Using {} inflector", kind.display_name());
    match kind {
        InflectorKind::Morpher => Box::new(MorpherInflector::from_settings(&settings.morpher)),
        InflectorKind::OpenAi => Box::new(OpenAiInflector::from_settings(&settings.openai)),
        InflectorKind::Stub => Box::new(StubInflector),
    }
}

/// Drop repeated forms, keeping the first occurrence of each.
pub fn dedup_forms<I>(forms: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    forms
        .into_iter()
        .filter(|form| seen.insert(form.clone()))
        .collect()
}

/// Message recorded for a failed lookup.
pub fn failure_message(phrase: &str, cause: &str) -> String {
    format!("Could not get inflections for \"{}\": {}", phrase, cause)
}

/// Error-collecting wrapper around one inflector for the duration of a run.
///
/// The collected messages are handed back to the caller once the run is over
/// instead of living on the inflector itself.
pub struct InflectionBatch<'a> {
    inflector: &'a dyn Inflector,
    errors: Vec<String>,
}

impl<'a> InflectionBatch<'a> {
    pub fn new(inflector: &'a dyn Inflector) -> Self {
        Self {
            inflector,
            errors: Vec::new(),
        }
    }

    /// Deduplicated forms of `phrase`; empty (and one recorded message) on failure.
    pub async fn get_inflections(
        &mut self,
        phrase: &str,
        options: &InflectionOptions,
    ) -> Vec<String> {
        match self.inflector.inflect(phrase, options).await {
            Ok(forms) => {
                let forms = dedup_forms(forms);
                log::debug!(
                    "[INFLECTOR] {} returned {} form(s) for {:?}",
                    self.inflector.kind().display_name(),
                    forms.len(),
                    phrase
                );
                forms
            }
            Err(cause) => {
                let message = failure_message(phrase, &cause);
                log::warn!("[INFLECTOR] {}", message);
                self.errors.push(message);
                Vec::new()
            }
        }
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// End the batch and take its messages.
    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }
}
