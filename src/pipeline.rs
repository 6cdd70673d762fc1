use serde::Serialize;
use tracing::info;

use crate::model::{GenerativeModel, ModelError, Part};

pub const TRANSCRIBE_PROMPT: &str = "Generate a transcript of the provided audio file.";

pub const SUMMARIZE_PROMPT: &str = "Please create a concise summary and bullet point, just like taking notes, of the following transcript, highlighting the main points and key information:\n\n";

/// Transcript and summary of one recording. Only exists when both model calls succeeded.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Notes {
    pub transcript: String,
    pub summary: String,
}

/// Transcribes `audio`, then summarizes the transcript. The calls run strictly in order.
pub async fn take_notes(
    model: &dyn GenerativeModel,
    audio: &[u8],
    mime_type: &str,
) -> Result<Notes, ModelError> {
    info!("Sending audio to model for transcription...");
    let transcript = model
        .generate(vec![
            Part::text(TRANSCRIBE_PROMPT),
            Part::inline_bytes(mime_type, audio),
        ])
        .await?;
    info!("Transcription generated");

    info!("Generating summary from transcript...");
    let summary = model
        .generate(vec![Part::Text(format!("{SUMMARIZE_PROMPT}{transcript}"))])
        .await?;
    info!("Summary generated");

    Ok(Notes {
        transcript,
        summary,
    })
}
