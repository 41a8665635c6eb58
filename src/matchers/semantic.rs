//! Semantic field matching through an external chat-completion classifier.
//!
//! Pure request/response: the full descriptor list and field set go out as
//! one structured payload, and a control-id → field-name mapping comes
//! back. No local heuristics, no retry — any failure immediately yields
//! "unavailable" and the caller falls back to the rule matcher.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::SemanticConfig;
use crate::credentials::SemanticKey;
use crate::extract::ControlDescriptor;
use crate::fields::{FieldMapping, FieldSet};

use super::{check_http_response, MatchError, Matcher};

/// Instruction given to the classifier.
const SYSTEM_PROMPT: &str = "You are a form-filling assistant. Match form data fields \
to form elements based on semantic meaning, not just exact matches. For each form \
element, find the most appropriate field from the provided form data. Return a \
mapping of element IDs to field names.";

/// Low temperature keeps the mapping as deterministic as the service allows.
const TEMPERATURE: f32 = 0.1;

// ---------------------------------------------------------------------------
// Wire types (pub for integration testing)
// ---------------------------------------------------------------------------

/// Chat completions request body.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    /// Model identifier.
    pub model: String,
    /// System + user messages.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Forces a JSON object response.
    pub response_format: ResponseFormat,
}

/// A message in chat format.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct ChatMessage {
    /// Role (`system` or `user`).
    pub role: String,
    /// Plain text content.
    pub content: String,
}

/// Response format constraint.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct ResponseFormat {
    /// Format type, always `json_object`.
    #[serde(rename = "type")]
    pub kind: String,
}

/// The single structured payload sent as the user message.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct MappingPayload<'a> {
    /// Normalized control descriptors, document order.
    #[serde(rename = "formElements")]
    pub form_elements: &'a [ControlDescriptor],
    /// The caller's field set, insertion order.
    #[serde(rename = "formData")]
    pub form_data: &'a FieldSet,
}

/// Chat completions response body.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    /// Response choices.
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

/// A response choice.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    /// Assistant message for this choice.
    pub message: ChatResponseMessage,
}

/// Assistant message payload.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct ChatResponseMessage {
    /// Text content, expected to be a JSON object.
    pub content: Option<String>,
}

// ---------------------------------------------------------------------------
// Request / response builders (pub for integration testing)
// ---------------------------------------------------------------------------

/// Build the classifier request for the given controls and fields.
///
/// # Errors
///
/// Returns `MatchError::Parse` if the payload cannot be serialized.
#[doc(hidden)]
pub fn build_request(
    model: &str,
    controls: &[ControlDescriptor],
    fields: &FieldSet,
) -> Result<ChatRequest, MatchError> {
    let payload = MappingPayload {
        form_elements: controls,
        form_data: fields,
    };
    let content = serde_json::to_string(&payload).map_err(|e| MatchError::Parse(e.to_string()))?;
    Ok(ChatRequest {
        model: model.to_owned(),
        messages: vec![
            ChatMessage {
                role: "system".to_owned(),
                content: SYSTEM_PROMPT.to_owned(),
            },
            ChatMessage {
                role: "user".to_owned(),
                content,
            },
        ],
        temperature: TEMPERATURE,
        response_format: ResponseFormat {
            kind: "json_object".to_owned(),
        },
    })
}

/// Parse a chat completion body into the nested `fieldMappings` mapping.
///
/// Returns `Ok(None)` when the body parses but carries no usable mapping
/// (no choices, no content, or `fieldMappings` missing or not an object);
/// `Err(Parse)` when the body or the message content is not valid JSON.
/// Non-string values inside `fieldMappings` are skipped, not fatal.
#[doc(hidden)]
pub fn parse_mapping(body: &str) -> Result<Option<FieldMapping>, MatchError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| MatchError::Parse(e.to_string()))?;

    let Some(content) = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
    else {
        return Ok(None);
    };

    let value: Value =
        serde_json::from_str(&content).map_err(|e| MatchError::Parse(e.to_string()))?;
    let Some(raw) = value.get("fieldMappings").and_then(Value::as_object) else {
        return Ok(None);
    };

    let mut mapping = FieldMapping::new();
    for (control_id, field_name) in raw {
        match field_name.as_str() {
            Some(name) => mapping.insert(control_id, name),
            None => debug!(control_id, "skipping non-string field mapping entry"),
        }
    }
    Ok(Some(mapping))
}

// ---------------------------------------------------------------------------
// Matcher
// ---------------------------------------------------------------------------

/// Matcher backed by an external chat-completion classifier.
#[derive(Debug, Clone)]
pub struct SemanticMatcher {
    endpoint: String,
    model: String,
    key: SemanticKey,
    client: reqwest::Client,
}

impl SemanticMatcher {
    /// Create a matcher from semantic config and a resolved API key.
    pub fn new(config: &SemanticConfig, key: SemanticKey) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            key,
            client: reqwest::Client::new(),
        }
    }

    async fn request_mapping(
        &self,
        controls: &[ControlDescriptor],
        fields: &FieldSet,
    ) -> Result<Option<FieldMapping>, MatchError> {
        let request = build_request(&self.model, controls, fields)?;
        let response = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {}", self.key.expose()))
            .json(&request)
            .send()
            .await?;
        let body = check_http_response(response).await?;
        parse_mapping(&body)
    }
}

#[async_trait::async_trait]
impl Matcher for SemanticMatcher {
    async fn resolve(
        &self,
        controls: &[ControlDescriptor],
        fields: &FieldSet,
    ) -> Option<FieldMapping> {
        match self.request_mapping(controls, fields).await {
            Ok(Some(mapping)) => {
                debug!(entries = mapping.len(), "semantic mapping received");
                Some(mapping)
            }
            Ok(None) => {
                warn!("semantic response carried no field mappings");
                None
            }
            Err(error) => {
                warn!(error = %error, "semantic matching unavailable");
                None
            }
        }
    }

    fn strategy(&self) -> &'static str {
        "semantic"
    }
}
