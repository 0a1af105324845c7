//! Google Gemini provider implementation.

use serde::{Deserialize, Serialize};

use super::{ChatRole, GenerateRequest, LlmProvider};
use crate::AiError;

/// Default model for analysis and chat.
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";

/// Default Gemini REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Error message fragments Gemini uses for missing or rejected keys.
const CREDENTIAL_MARKERS: &[&str] = &[
    "API key not valid",
    "API Key must be set",
    "Requested entity was not found",
];

/// Gemini `generateContent` API provider.
pub struct GeminiProvider {
    api_key: Option<String>,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Creates a new Gemini provider.
    ///
    /// A `None` key is accepted; every request then fails with
    /// [`AiError::MissingApiKey`].
    #[must_use]
    pub fn new(api_key: Option<String>, model: String) -> Self {
        Self {
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Overrides the API base URL (proxies, test servers).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

/// Gemini API request body.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiInstruction<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    role: &'static str,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiInstruction<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a serde_json::Value,
}

/// Gemini API response body.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

/// Gemini API error response.
#[derive(Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

const fn wire_role(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "user",
        ChatRole::Assistant => "model",
    }
}

fn build_request(request: &GenerateRequest) -> GeminiRequest<'_> {
    GeminiRequest {
        contents: request
            .messages
            .iter()
            .map(|m| GeminiContent {
                role: wire_role(m.role),
                parts: vec![GeminiPart { text: &m.text }],
            })
            .collect(),
        system_instruction: request
            .system_instruction
            .as_deref()
            .map(|text| GeminiInstruction {
                parts: vec![GeminiPart { text }],
            }),
        generation_config: request
            .response_schema
            .as_ref()
            .map(|schema| GenerationConfig {
                response_mime_type: "application/json",
                response_schema: schema,
            }),
    }
}

/// Concatenates the text parts of the first candidate.
fn extract_text(response: GeminiResponse) -> Result<String, AiError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(AiError::Blocked { reason });
    }

    Ok(response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default())
}

/// Maps a non-success HTTP response to an [`AiError`].
fn classify_error(status: u16, body: &str) -> AiError {
    let message = serde_json::from_str::<GeminiError>(body)
        .map_or_else(|_| format!("HTTP {status}: {body}"), |e| e.error.message);

    let is_credential_error = status == 401
        || status == 403
        || CREDENTIAL_MARKERS
            .iter()
            .any(|marker| message.contains(marker));

    if is_credential_error {
        AiError::Unauthorized { message }
    } else {
        AiError::Provider { status, message }
    }
}

#[async_trait::async_trait]
impl LlmProvider for GeminiProvider {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, AiError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(AiError::MissingApiKey);
        };

        let body = build_request(request);

        log::debug!(
            "Gemini request: model={} messages={} structured={}",
            self.model,
            request.messages.len(),
            request.response_schema.is_some()
        );

        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(classify_error(status.as_u16(), &text));
        }

        let response: GeminiResponse = serde_json::from_str(&text)?;
        extract_text(response)
    }
}
