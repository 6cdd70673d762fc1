use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::model::{GenerativeModel, ModelError, Part};

const API_KEY_HEADER: &str = "x-goog-api-key";

// Same set the official SDKs refuse to read text from
static BLOCKED_FINISH_REASONS: [&str; 3] = ["SAFETY", "RECITATION", "LANGUAGE"];

/// Client for the Gemini `generateContent` REST endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    endpoint: Url,
    model: String,
    api_key: String,
}

impl GeminiClient {
    /// `timeout` bounds each call, `None` leaves calls unbounded.
    pub fn new(
        api_base: &str,
        model: &str,
        api_key: String,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let model = model.strip_prefix("models/").unwrap_or(model).to_string();
        let endpoint = Url::parse(&format!(
            "{}/models/{}:generateContent",
            api_base.trim_end_matches('/'),
            model
        ))?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint,
            model,
            api_key,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    #[tracing::instrument(level = "info", skip_all, fields(parts = parts.len()))]
    async fn generate(&self, parts: Vec<Part>) -> Result<String, ModelError> {
        let request = GenerateContentRequest {
            contents: [Content {
                role: "user",
                parts: parts.iter().map(WirePart::from).collect(),
            }],
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(status, response.text().await.ok());
            return Err(ModelError::Api {
                url: self.endpoint.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        let response: GenerateContentResponse = response.json().await?;
        if let Some(usage) = &response.usage_metadata {
            debug!(
                prompt_tokens = usage.prompt_token_count,
                candidate_tokens = usage.candidates_token_count,
                "Token usage"
            );
        }
        let text = response.into_text()?;
        info!(model = %self.model, chars = text.len(), "Generated content");
        Ok(text)
    }
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<WirePart<'a>>,
}

#[derive(Serialize)]
enum WirePart<'a> {
    #[serde(rename = "text")]
    Text(&'a str),
    #[serde(rename = "inlineData")]
    InlineData {
        #[serde(rename = "mimeType")]
        mime_type: &'a str,
        data: &'a str,
    },
}

impl<'a> From<&'a Part> for WirePart<'a> {
    fn from(part: &'a Part) -> Self {
        match part {
            Part::Text(text) => WirePart::Text(text),
            Part::InlineData { mime_type, data } => WirePart::InlineData { mime_type, data },
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// The API's own error message, else the raw body, else the status reason.
fn error_message(status: StatusCode, body: Option<String>) -> String {
    match body.filter(|body| !body.trim().is_empty()) {
        Some(body) => serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|envelope| envelope.error.message)
            .unwrap_or(body),
        None => status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string(),
    }
}

impl GenerateContentResponse {
    /// Text of the first candidate, all of its text parts joined.
    fn into_text(self) -> Result<String, ModelError> {
        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(match self.prompt_feedback.and_then(|f| f.block_reason) {
                Some(reason) => ModelError::PromptBlocked(reason),
                None => ModelError::NoCandidates,
            });
        };

        if let Some(reason) = candidate
            .finish_reason
            .as_deref()
            .filter(|reason| BLOCKED_FINISH_REASONS.contains(reason))
        {
            return Err(ModelError::CandidateBlocked(reason.to_string()));
        }

        Ok(candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default())
    }
}
