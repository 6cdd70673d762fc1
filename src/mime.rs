use std::path::Path;

/// Used when the extension is missing or not in [`AUDIO_MIME_TYPES`]. The bytes are never sniffed.
pub const FALLBACK_AUDIO_MIME_TYPE: &str = "audio/mpeg";

static AUDIO_MIME_TYPES: [(&str, &str); 6] = [
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("m4a", "audio/mp4"),
    ("aac", "audio/aac"),
    ("ogg", "audio/ogg"),
    ("flac", "audio/flac"),
];

/// Resolves the MIME type sent to the model from the uploaded file's name.
pub fn audio_mime_type(file_name: &str) -> &'static str {
    let Some(extension) = Path::new(file_name).extension().and_then(|ext| ext.to_str()) else {
        return FALLBACK_AUDIO_MIME_TYPE;
    };
    let extension = extension.to_lowercase();

    AUDIO_MIME_TYPES
        .iter()
        .find(|(known, _)| *known == extension)
        .map_or(FALLBACK_AUDIO_MIME_TYPE, |&(_, mime)| mime)
}
