//! Upload receiver: writes one audio file under the upload directory.

use std::path::{Path, PathBuf};

use checkin_storage::AudioRecord;
use time::OffsetDateTime;

use crate::error::LifecycleError;

/// Used when the client sent no filename for the audio part.
pub const FALLBACK_FILENAME: &str = "audio";

/// Used when the client declared no content type for the audio part.
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// An audio file as received from the client, before it touches disk.
#[derive(Debug, Clone, Default)]
pub struct AudioUpload {
    pub original_name: Option<String>,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl AudioUpload {
    pub fn original_name(&self) -> &str {
        self.original_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(FALLBACK_FILENAME)
    }

    pub fn mime_type(&self) -> &str {
        self.mime_type
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(FALLBACK_MIME_TYPE)
    }
}

/// Replace every character outside `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `<unix millis>_<sanitized name>`.
pub fn stored_filename(received_at: OffsetDateTime, original_name: &str) -> String {
    let millis = received_at.unix_timestamp_nanos() / 1_000_000;
    format!("{}_{}", millis, sanitize_filename(original_name))
}

/// Directory that receives uploaded audio.
#[derive(Debug, Clone)]
pub struct UploadDir {
    root: PathBuf,
}

impl UploadDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Write `upload` to disk and describe where it went.
    ///
    /// The directory is created on first use. No size limit is applied.
    pub async fn store(
        &self,
        upload: &AudioUpload,
        received_at: OffsetDateTime,
    ) -> Result<AudioRecord, LifecycleError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| LifecycleError::Upload {
                path: self.root.display().to_string(),
                source,
            })?;

        let filename = stored_filename(received_at, upload.original_name());
        let local_path = self.root.join(&filename);
        tokio::fs::write(&local_path, &upload.bytes)
            .await
            .map_err(|source| LifecycleError::Upload {
                path: local_path.display().to_string(),
                source,
            })?;

        tracing::debug!(
            path = %local_path.display(),
            bytes = upload.bytes.len(),
            "stored upload"
        );

        Ok(AudioRecord {
            filename,
            original_name: upload.original_name().to_string(),
            mime_type: upload.mime_type().to_string(),
            local_path: local_path.display().to_string(),
        })
    }

    /// Remove a stored file that no entry will reference.
    ///
    /// Failure is only logged; the file is left for manual cleanup.
    pub async fn discard(&self, local_path: &str) {
        if let Err(e) = tokio::fs::remove_file(local_path).await {
            tracing::warn!(path = %local_path, error = %e, "orphaned upload left on disk");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn sanitize_replaces_everything_outside_the_safe_set() {
        assert_eq!(sanitize_filename("park.wav"), "park.wav");
        assert_eq!(sanitize_filename("my voice (1).m4a"), "my_voice__1_.m4a");
        assert_eq!(sanitize_filename("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_filename("媽媽.wav"), "__.wav");
        assert_eq!(sanitize_filename("a-b_c.D9"), "a-b_c.D9");
    }

    #[test]
    fn stored_filename_prefixes_receipt_millis() {
        let at = datetime!(2026-10-19 08:30:00.125 UTC);
        assert_eq!(stored_filename(at, "sick mom.wav"), "1792398600125_sick_mom.wav");
    }

    #[test]
    fn missing_metadata_falls_back() {
        let upload = AudioUpload::default();
        assert_eq!(upload.original_name(), FALLBACK_FILENAME);
        assert_eq!(upload.mime_type(), FALLBACK_MIME_TYPE);
    }

    #[tokio::test]
    async fn store_writes_bytes_and_records_paths() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadDir::new(dir.path().join("uploads"));
        let upload = AudioUpload {
            original_name: Some("park walk.wav".to_string()),
            mime_type: Some("audio/wav".to_string()),
            bytes: b"RIFF....WAVE".to_vec(),
        };
        let at = datetime!(2026-10-19 08:30:00.125 UTC);

        let audio = uploads.store(&upload, at).await.unwrap();
        assert_eq!(audio.filename, "1792398600125_park_walk.wav");
        assert_eq!(audio.original_name, "park walk.wav");
        assert_eq!(audio.mime_type, "audio/wav");
        assert_eq!(std::fs::read(&audio.local_path).unwrap(), b"RIFF....WAVE");
        assert!(audio.local_path.ends_with("uploads/1792398600125_park_walk.wav"));
    }

    #[tokio::test]
    async fn discard_removes_the_stored_file() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadDir::new(dir.path().join("uploads"));
        let audio = uploads
            .store(&AudioUpload::default(), datetime!(2026-10-19 08:30:00.125 UTC))
            .await
            .unwrap();
        assert_eq!(uploads.path(), dir.path().join("uploads"));

        uploads.discard(&audio.local_path).await;
        assert!(!std::path::Path::new(&audio.local_path).exists());
        // A second discard only logs.
        uploads.discard(&audio.local_path).await;
    }
}
