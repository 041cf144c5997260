use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Lifecycle state of a check-in entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryStatus {
    Uploaded,
    Processing,
    Ready,
    Failed,
    Replied,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Uploaded => "UPLOADED",
            EntryStatus::Processing => "PROCESSING",
            EntryStatus::Ready => "READY",
            EntryStatus::Failed => "FAILED",
            EntryStatus::Replied => "REPLIED",
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Where the uploaded audio for an entry lives. Written once at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioRecord {
    /// Name of the file inside the upload directory.
    pub filename: String,
    pub original_name: String,
    pub mime_type: String,
    /// Upload directory joined with `filename`, relative to the working directory.
    pub local_path: String,
}

/// Analyzer output. Empty until an entry has been processed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Analysis {
    pub summary3: Vec<String>,
    pub emotion: Option<String>,
    pub quick_replies: Vec<String>,
}

/// A family member's reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReplyRecord {
    pub text: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub sent_at: Option<OffsetDateTime>,
}

/// Notification pushed back to the check-in author when a reply lands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationRecord {
    pub text: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub sent_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryMeta {
    pub demo_mode: bool,
    pub processing_ms: Option<u64>,
}

impl Default for EntryMeta {
    fn default() -> Self {
        Self {
            demo_mode: true,
            processing_ms: None,
        }
    }
}

/// One voice check-in and everything derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,
    /// ISO 8601 / RFC 3339 timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub status: EntryStatus,
    pub audio: AudioRecord,
    pub transcript: Option<String>,
    #[serde(default)]
    pub ai: Analysis,
    #[serde(default)]
    pub reply: ReplyRecord,
    #[serde(default)]
    pub notification: NotificationRecord,
    #[serde(default)]
    pub meta: EntryMeta,
}

impl Entry {
    /// A freshly uploaded entry: status `UPLOADED`, nothing analyzed or replied yet.
    pub fn new(
        id: String,
        created_at: OffsetDateTime,
        audio: AudioRecord,
        demo_mode: bool,
    ) -> Self {
        Self {
            id,
            created_at,
            status: EntryStatus::Uploaded,
            audio,
            transcript: None,
            ai: Analysis::default(),
            reply: ReplyRecord::default(),
            notification: NotificationRecord::default(),
            meta: EntryMeta {
                demo_mode,
                processing_ms: None,
            },
        }
    }
}
