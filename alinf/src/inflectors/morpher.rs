//! Morpher.ru declension service.
//!
//! `GET {base}?format=json&s=<phrase>` returns a flat object of case → form,
//! with the plural forms nested under `множественное`. A `message` field
//! means the service refused the phrase.

use super::Inflector;
use crate::http;
use crate::models::settings::MorpherSettings;
use alinf_types::{InflectionOptions, InflectorKind};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::time::Duration;

/// Key holding the plural sub-object
pub const PLURAL_KEY: &str = "множественное";
/// Key holding the service's error text
const ERROR_KEY: &str = "message";

pub struct MorpherInflector {
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl MorpherInflector {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(crate::config::defaults::REQUEST_TIMEOUT_SECS),
            client: http::build_client(),
        }
    }

    pub fn from_settings(settings: &MorpherSettings) -> Self {
        Self::new(&settings.base_url).with_timeout(Duration::from_secs(settings.timeout_secs))
    }

    /// Set the per-request ceiling (builder pattern)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn request_url(&self, phrase: &str) -> String {
        format!(
            "{}?format=json&s={}",
            self.base_url,
            urlencoding::encode(phrase)
        )
    }

    async fn fetch(&self, phrase: &str) -> Result<Value, String> {
        let resp = self
            .client
            .get(self.request_url(phrase))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| http::describe_error(&e, self.timeout))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| http::describe_error(&e, self.timeout))?;

        match serde_json::from_str::<Value>(&body) {
            // Error payloads arrive with non-2xx statuses; let the caller read `message`.
            Ok(json) if json.is_object() => Ok(json),
            _ if !status.is_success() => Err(format!("HTTP {}", status)),
            Ok(_) => Err("Unexpected response shape".to_string()),
            Err(e) => Err(format!("Invalid JSON response: {}", e)),
        }
    }
}

/// Non-empty string values of one level of the response, in document order.
fn string_values(object: &Map<String, Value>) -> impl Iterator<Item = String> + '_ {
    object
        .iter()
        .filter(|(key, _)| key.as_str() != ERROR_KEY)
        .filter_map(|(_, v)| v.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// The service's error text, if the response carries a non-empty one.
fn error_message(object: &Map<String, Value>) -> Option<String> {
    match object.get(ERROR_KEY)? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Pull inflected forms out of a declension response.
pub fn extract_forms(response: &Value, include_plural: bool) -> Result<Vec<String>, String> {
    let object = response
        .as_object()
        .ok_or_else(|| "Unexpected response shape".to_string())?;

    if let Some(message) = error_message(object) {
        return Err(message);
    }

    let mut forms: Vec<String> = string_values(object).collect();
    if include_plural {
        if let Some(Value::Object(plural)) = object.get(PLURAL_KEY) {
            forms.extend(string_values(plural));
        }
    }
    Ok(forms)
}

#[async_trait]
impl Inflector for MorpherInflector {
    fn kind(&self) -> InflectorKind {
        InflectorKind::Morpher
    }

    async fn inflect(
        &self,
        phrase: &str,
        options: &InflectionOptions,
    ) -> Result<Vec<String>, String> {
        let response = self.fetch(phrase).await?;
        extract_forms(&response, options.include_plural)
    }
}
