use async_trait::async_trait;
use base64ct::{Base64, Encoding};

pub mod gemini;

/// One ordered piece of model input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    /// Binary media, `data` is already standard base64.
    InlineData { mime_type: String, data: String },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text(text.into())
    }

    pub fn inline_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        Part::InlineData {
            mime_type: mime_type.to_string(),
            data: Base64::encode_string(bytes),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Error fetching from {url}: [{status}] {message}")]
    Api {
        url: String,
        status: u16,
        message: String,
    },
    #[error("Text not available. Response was blocked due to {0}")]
    PromptBlocked(String),
    #[error("Candidate was blocked due to {0}")]
    CandidateBlocked(String),
    #[error("No candidates returned")]
    NoCandidates,
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

/// A generative model that turns text and inline media into text.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(&self, parts: Vec<Part>) -> Result<String, ModelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_bytes_are_standard_base64() {
        let part = Part::inline_bytes("audio/wav", b"RIFF\x00\xff");
        assert_eq!(
            part,
            Part::InlineData {
                mime_type: "audio/wav".into(),
                data: "UklGRgD/".into(),
            }
        );
    }

    #[test]
    fn api_errors_render_status_and_message() {
        let err = ModelError::Api {
            url: "http://model/generate".into(),
            status: 403,
            message: "API key not valid".into(),
        };
        assert_eq!(
            err.to_string(),
            "Error fetching from http://model/generate: [403] API key not valid"
        );
    }
}
