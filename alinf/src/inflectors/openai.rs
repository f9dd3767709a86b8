//! OpenAI-compatible chat completions inflector.
//!
//! The model is asked to answer with a bare `{"inflections": [...]}` or
//! `{"error": "..."}` object. Replies are not trusted to be clean JSON: the
//! first balanced `{...}` span is cut out of whatever text surrounds it.

use super::Inflector;
use crate::config::defaults;
use crate::http;
use crate::models::settings::OpenAiSettings;
use alinf_types::{InflectionOptions, InflectorKind};
use async_trait::async_trait;
use reqwest::header;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

pub struct OpenAiInflector {
    api_key: String,
    api_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
    client: reqwest::Client,
}

// ── Chat completions wire types ─────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

// ── Reply parsing ───────────────────────────────────

/// Why a model reply produced no forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyError {
    /// The model answered with `{"error": ...}`; shown as-is
    Refused(String),
    /// The reply could not be used
    Malformed(String),
}

impl fmt::Display for ReplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplyError::Refused(reason) => write!(f, "{}", reason),
            ReplyError::Malformed(reason) => write!(f, "Failed to parse inflections: {}", reason),
        }
    }
}

/// Build the instruction sent to the model.
pub fn build_prompt(phrase: &str, include_plural: bool) -> String {
    let plural_instruction = if include_plural {
        "Include both singular and plural forms if applicable."
    } else {
        "Focus only on singular forms."
    };

    format!(
        "You are a Russian language expert. Provide grammatical inflections (different cases) for the Russian word or phrase \"{phrase}\".\n\
         {plural_instruction}\n\
         Return ONLY a JSON object. If the input is a valid Russian word or phrase, return an object with an array of inflections under the key \"inflections\". Do not include the original word.\n\
         If the input is not recognized as Russian or is invalid, return an error object with a \"error\" field explaining why.\n\
         Success format: {{\"inflections\": [\"word1\", \"word2\", \"word3\"]}}\n\
         Error format: {{\"error\": \"Description of why this cannot be inflected\"}}\n\
         Provide at least 2-4 different inflections for valid input."
    )
}

/// Locate the first balanced `{...}` span in `text`.
///
/// Braces inside JSON string literals do not count. Returns `None` when the
/// first `{` is never closed.
pub fn find_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + ch.len_utf8();
                    return Some(&text[start..end]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Truthy check for the `error` field: present, not null, not an empty string.
fn refusal_reason(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Turn a model reply into a deduplicated list of forms.
pub fn parse_inflections(reply: &str) -> Result<Vec<String>, ReplyError> {
    let span = find_json_object(reply)
        .ok_or_else(|| ReplyError::Malformed("No JSON found in response".to_string()))?;

    let parsed: Value = serde_json::from_str(span)
        .map_err(|e| ReplyError::Malformed(format!("Invalid JSON: {}", e)))?;

    if let Some(reason) = refusal_reason(parsed.get("error")) {
        return Err(ReplyError::Refused(reason));
    }

    let items = match parsed.get("inflections") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(_) => {
            return Err(ReplyError::Malformed("Inflections is not an array".to_string()));
        }
    };

    if items.is_empty() {
        return Err(ReplyError::Malformed("No inflections returned".to_string()));
    }

    let forms = super::dedup_forms(
        items
            .iter()
            .filter_map(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.to_string()),
    );

    if forms.is_empty() {
        return Err(ReplyError::Malformed("Only blank inflections returned".to_string()));
    }
    Ok(forms)
}

// ── Client impl ─────────────────────────────────────

impl OpenAiInflector {
    pub fn new(api_key: &str, api_url: &str, model: &str) -> Self {
        Self {
            api_key: api_key.trim().to_string(),
            api_url: api_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            temperature: defaults::OPENAI_TEMPERATURE,
            max_tokens: defaults::OPENAI_MAX_TOKENS,
            timeout: Duration::from_secs(defaults::REQUEST_TIMEOUT_SECS),
            client: http::build_client(),
        }
    }

    pub fn from_settings(settings: &OpenAiSettings) -> Self {
        let mut inflector = Self::new(&settings.api_key, &settings.api_url, &settings.model)
            .with_timeout(Duration::from_secs(settings.timeout_secs));
        inflector.temperature = settings.temperature;
        inflector.max_tokens = settings.max_tokens;
        inflector
    }

    /// Set the per-request ceiling (builder pattern)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_url)
    }

    /// Send the prompt and return the first choice's text ("" when absent).
    async fn complete(&self, prompt: &str) -> Result<String, String> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let mut request = self
            .client
            .post(self.completions_url())
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .timeout(self.timeout);

        // Local compatible servers run without a key
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| http::describe_error(&e, self.timeout))?;

        let status = resp.status();
        if !status.is_success() {
            let error_body: Value = resp.json().await.unwrap_or(Value::Null);
            let detail = error_body
                .pointer("/error/message")
                .and_then(|m| m.as_str())
                .unwrap_or("Unknown error");
            return Err(format!("OpenAI API error {}: {}", status.as_u16(), detail));
        }

        let data: ChatResponse = resp
            .json()
            .await
            .map_err(|e| format!("Invalid API response: {}", e))?;

        Ok(data
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default())
    }
}

#[async_trait]
impl Inflector for OpenAiInflector {
    fn kind(&self) -> InflectorKind {
        InflectorKind::OpenAi
    }

    async fn inflect(
        &self,
        phrase: &str,
        options: &InflectionOptions,
    ) -> Result<Vec<String>, String> {
        let prompt = build_prompt(phrase, options.include_plural);
        let reply = self.complete(&prompt).await?;
        log::debug!("[INFLECTOR] Model reply for {:?}: {}", phrase, reply);
        parse_inflections(&reply).map_err(|e| e.to_string())
    }
}
