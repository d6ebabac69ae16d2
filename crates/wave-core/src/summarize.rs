//! Single-shot AI summarization of a post's content.
//!
//! The flow validates its input, renders the fixed prompt, asks a
//! [`TextGenerator`] for a structured reply shaped like [`SUMMARY_SHAPE`], and
//! validates that reply before handing back a [`SummarizeOutput`].
//!
//! There is no caching and no retry. Every call reaches the backend.

use crate::error::WaveError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Shown in place of a summary when the flow fails.
pub const FALLBACK_SUMMARY: &str = "Failed to generate summary.";

/// Placeholder substituted verbatim with the post content.
pub const PROMPT_PLACEHOLDER: &str = "{{{waveContent}}}";

/// Prompt sent to the model.
pub const PROMPT_TEMPLATE: &str =
    "Summarize the following wave content in a concise manner:\n\n{{{waveContent}}}";

/// One required string field of a structured reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub description: &'static str,
}

/// Shape of a structured model reply: an object of required string fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputShape {
    pub fields: &'static [FieldSpec],
}

/// Reply shape of the summarization call: `{ summary: string }`.
pub const SUMMARY_SHAPE: OutputShape = OutputShape {
    fields: &[FieldSpec {
        name: "summary",
        description: "A concise summary of the wave content.",
    }],
};

impl OutputShape {
    /// OpenAPI-style schema understood by the Generative Language API.
    #[must_use]
    pub fn json_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in self.fields {
            properties.insert(
                field.name.to_string(),
                json!({ "type": "STRING", "description": field.description }),
            );
        }
        let required: Vec<&str> = self.fields.iter().map(|f| f.name).collect();
        json!({
            "type": "OBJECT",
            "properties": properties,
            "required": required,
        })
    }

    /// Check that `value` is an object carrying every field as a string.
    ///
    /// # Errors
    ///
    /// Returns [`WaveError::Validation`] naming the first offending field.
    pub fn validate(&self, value: &Value) -> Result<(), WaveError> {
        let Some(object) = value.as_object() else {
            return Err(WaveError::Validation(
                "structured output must be a JSON object".to_string(),
            ));
        };
        for field in self.fields {
            match object.get(field.name) {
                Some(Value::String(_)) => {}
                Some(_) => {
                    return Err(WaveError::Validation(format!(
                        "field '{}' must be a string",
                        field.name
                    )));
                }
                None => {
                    return Err(WaveError::Validation(format!(
                        "missing required field '{}'",
                        field.name
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Input of the summarization flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizeInput {
    /// The full text to summarize.
    #[serde(rename = "waveContent")]
    pub wave_content: String,
}

impl SummarizeInput {
    #[must_use]
    pub fn new(wave_content: impl Into<String>) -> Self {
        Self {
            wave_content: wave_content.into(),
        }
    }

    /// Validate untyped JSON input (`{ "waveContent": string }`).
    ///
    /// # Errors
    ///
    /// Returns [`WaveError::Validation`] if the field is missing or not a string.
    pub fn from_value(value: &Value) -> Result<Self, WaveError> {
        match value.get("waveContent") {
            Some(Value::String(content)) => Ok(Self::new(content.clone())),
            Some(_) => Err(WaveError::Validation(
                "field 'waveContent' must be a string".to_string(),
            )),
            None => Err(WaveError::Validation(
                "missing required field 'waveContent'".to_string(),
            )),
        }
    }
}

/// Output of the summarization flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizeOutput {
    pub summary: String,
}

/// Substitute `content` into the prompt template.
#[must_use]
pub fn render_prompt(content: &str) -> String {
    PROMPT_TEMPLATE.replace(PROMPT_PLACEHOLDER, content)
}

/// A generative text backend able to answer with structured JSON.
pub trait TextGenerator: Send + Sync {
    /// Submit `prompt` and return the reply parsed as JSON, expected to match `shape`.
    ///
    /// # Errors
    ///
    /// [`WaveError::Generation`] for backend/transport failures,
    /// [`WaveError::Validation`] when the reply is not JSON.
    fn generate_structured(&self, prompt: &str, shape: &OutputShape) -> Result<Value, WaveError>;

    /// Short label for logs.
    fn name(&self) -> &str;
}

/// The summarization flow bound to a backend.
#[derive(Clone)]
pub struct SummarizeFlow {
    generator: Arc<dyn TextGenerator>,
}

impl std::fmt::Debug for SummarizeFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummarizeFlow")
            .field("generator", &self.generator.name())
            .finish()
    }
}

impl SummarizeFlow {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Summarize `input.wave_content`.
    ///
    /// Returns a non-empty summary or fails; the result never lacks the
    /// `summary` field.
    ///
    /// # Errors
    ///
    /// [`WaveError::Generation`] or [`WaveError::Validation`]; both mean
    /// "summarization failed".
    pub fn summarize(&self, input: &SummarizeInput) -> Result<SummarizeOutput, WaveError> {
        let prompt = render_prompt(&input.wave_content);
        let started = Instant::now();
        debug!(
            backend = self.generator.name(),
            prompt_chars = prompt.chars().count(),
            "summarize request"
        );

        let reply = self
            .generator
            .generate_structured(&prompt, &SUMMARY_SHAPE)
            .inspect_err(|err| {
                warn!(
                    backend = self.generator.name(),
                    "summarize failed: {err}"
                );
            })?;

        SUMMARY_SHAPE.validate(&reply)?;
        let output: SummarizeOutput = serde_json::from_value(reply)
            .map_err(|err| WaveError::Validation(err.to_string()))?;
        if output.summary.trim().is_empty() {
            return Err(WaveError::Validation("summary is empty".to_string()));
        }

        info!(
            backend = self.generator.name(),
            elapsed_ms = started.elapsed().as_millis(),
            summary_chars = output.summary.chars().count(),
            "summarize ok"
        );
        Ok(output)
    }
}

/// Google Generative Language (`generateContent`) backend.
#[derive(Debug, Clone)]
pub struct GeminiGenerator {
    agent: ureq::Agent,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiGenerator {
    #[must_use]
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.filter(|key| !key.is_empty()),
        }
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    /// Request body for `prompt`, asking for JSON shaped like `shape`.
    #[must_use]
    pub fn request_body(prompt: &str, shape: &OutputShape) -> Value {
        json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": shape.json_schema(),
            },
        })
    }
}

impl TextGenerator for GeminiGenerator {
    fn generate_structured(&self, prompt: &str, shape: &OutputShape) -> Result<Value, WaveError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(WaveError::Generation(
                "no API key configured for the generative backend".to_string(),
            ));
        };

        let response = self
            .agent
            .post(&self.url())
            .set("x-goog-api-key", api_key)
            .send_json(Self::request_body(prompt, shape))
            .map_err(|err| match err {
                ureq::Error::Status(code, response) => {
                    let detail = response.into_string().unwrap_or_default();
                    WaveError::Generation(format!(
                        "backend returned HTTP {code}: {}",
                        detail.trim()
                    ))
                }
                ureq::Error::Transport(transport) => WaveError::Generation(transport.to_string()),
            })?;

        let body: Value = response
            .into_json()
            .map_err(|err| WaveError::Generation(format!("unreadable backend response: {err}")))?;
        let text = extract_candidate_text(&body)?;
        serde_json::from_str(&text)
            .map_err(|err| WaveError::Validation(format!("model reply is not JSON: {err}")))
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

/// Pull the text of the first candidate out of a `generateContent` response.
///
/// # Errors
///
/// Returns [`WaveError::Generation`] when the response has no candidate text,
/// including the block reason when the prompt was blocked.
pub fn extract_candidate_text(body: &Value) -> Result<String, WaveError> {
    let parts = body
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array);
    let Some(parts) = parts else {
        let reason = body
            .pointer("/promptFeedback/blockReason")
            .and_then(Value::as_str)
            .unwrap_or("no candidates returned");
        return Err(WaveError::Generation(format!("empty model response: {reason}")));
    };

    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();
    if text.is_empty() {
        return Err(WaveError::Generation(
            "model response has no text parts".to_string(),
        ));
    }
    Ok(text)
}
