use std::path::{Path, PathBuf};

use axum::extract::multipart::Field;
use axum::http::StatusCode;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error};

use crate::error::{ApiError, ApiResult};
use crate::mime::audio_mime_type;

const STAGING_PREFIX: &str = "rec_note-";

/// A file on disk that is removed when the value is dropped.
///
/// Removal failures are only logged, they never reach the caller.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        // Blocking unlink of one small file, also runs when dropped outside a runtime
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed staged upload"),
            Err(err) => error!(path = %self.path.display(), "Error deleting uploaded file: {err}"),
        }
    }
}

/// An uploaded audio file staged on disk for the duration of one request.
#[derive(Debug)]
pub struct UploadedAudio {
    pub file_name: String,
    pub size: usize,
    pub mime_type: &'static str,
    file: StagedFile,
}

impl UploadedAudio {
    /// Streams a multipart field into a fresh file inside `dir`.
    ///
    /// Fails with 413 once more than `max_bytes` have been received. The partially
    /// written file is removed on every error path.
    pub async fn stage(mut field: Field<'_>, dir: &Path, max_bytes: usize) -> ApiResult<Self> {
        let file_name = field.file_name().unwrap_or_default().to_string();
        let (file, path) = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempfile_in(dir)
            .and_then(|file| file.keep().map_err(|err| err.error))
            .map_err(|err| anyhow::anyhow!("Failed to stage upload: {err}"))?;

        let mut upload = UploadedAudio {
            mime_type: audio_mime_type(&file_name),
            file_name,
            size: 0,
            file: StagedFile { path },
        };
        let mut file = tokio::fs::File::from_std(file);

        while let Some(chunk) = field.chunk().await.map_err(ApiError::from_multipart)? {
            upload.size += chunk.len();
            if upload.size > max_bytes {
                crate::bail_api!(StatusCode::PAYLOAD_TOO_LARGE, "File too large");
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        debug!(
            file_name = %upload.file_name,
            size = upload.size,
            path = %upload.path().display(),
            "Staged upload"
        );
        Ok(upload)
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub async fn read(&self) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(self.path()).await
    }
}
