//! Entry lifecycle: create, process, get, reply.
//!
//! ```text
//! UPLOADED ──process──▶ PROCESSING ──demo──▶ READY
//!                                    └─real─▶ FAILED   (not implemented)
//! any state ──reply──▶ REPLIED   (kept through later processing)
//! ```
//!
//! Every mutation is written through the store before the operation returns.

use std::sync::Arc;
use std::time::Instant;

use checkin_storage::{Analysis, Entry, EntryMeta, EntryStatus, EntryStore, NotificationRecord};
use serde::Serialize;
use time::OffsetDateTime;

use crate::analyzer;
use crate::demo_mode::DemoMode;
use crate::error::LifecycleError;
use crate::id::generate_entry_id;
use crate::locks::EntryLocks;
use crate::upload::{AudioUpload, UploadDir};

/// Text of the notification sent to the check-in author when a reply lands.
pub const REPLY_NOTIFICATION_TEXT: &str = "家人回覆了你的語音留言";

/// Demo mode used at creation when the client did not say.
pub const DEFAULT_DEMO_MODE: bool = true;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedEntry {
    pub id: String,
    pub status: EntryStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedEntry {
    pub id: String,
    pub status: EntryStatus,
    pub ai: Analysis,
    pub meta: EntryMeta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepliedEntry {
    pub id: String,
    pub status: EntryStatus,
    pub notification: NotificationRecord,
}

/// Current UTC time truncated to whole milliseconds.
fn now() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_nanosecond(now.millisecond() as u32 * 1_000_000)
        .unwrap_or(now)
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Owns the entry state machine. The only writer to the store.
pub struct EntryService {
    store: Arc<dyn EntryStore>,
    uploads: UploadDir,
    locks: EntryLocks,
}

impl EntryService {
    pub fn new(store: Arc<dyn EntryStore>, uploads: UploadDir) -> Self {
        Self {
            store,
            uploads,
            locks: EntryLocks::new(),
        }
    }

    pub fn uploads(&self) -> &UploadDir {
        &self.uploads
    }

    /// Store the uploaded audio and record a new `UPLOADED` entry.
    pub async fn create(
        &self,
        upload: Option<AudioUpload>,
        demo_mode: DemoMode,
    ) -> Result<CreatedEntry, LifecycleError> {
        let upload = upload
            .ok_or_else(|| LifecycleError::Validation("missing 'audio' file".to_string()))?;

        let created_at = now();
        let audio = self.uploads.store(&upload, created_at).await?;
        let entry = Entry::new(
            generate_entry_id(created_at),
            created_at,
            audio,
            demo_mode.resolve(DEFAULT_DEMO_MODE),
        );
        let created = CreatedEntry {
            id: entry.id.clone(),
            status: entry.status,
        };

        let local_path = entry.audio.local_path.clone();
        if let Err(e) = self.store.put(entry).await {
            self.uploads.discard(&local_path).await;
            return Err(e.into());
        }

        tracing::info!(
            entry_id = %created.id,
            original_name = %upload.original_name(),
            demo_mode = demo_mode.resolve(DEFAULT_DEMO_MODE),
            "entry created"
        );
        Ok(created)
    }

    /// Run analysis on an entry.
    ///
    /// The entry is persisted as `PROCESSING` before analysis starts. With
    /// demo mode off the entry ends `FAILED` and `NotImplemented` is returned.
    /// A `REPLIED` entry keeps its status; only the analysis is refreshed.
    pub async fn process(
        &self,
        id: &str,
        demo_mode: DemoMode,
    ) -> Result<ProcessedEntry, LifecycleError> {
        let _guard = self.locks.lock(id).await;
        let mut entry = self.store.get(id).await?;
        let started = Instant::now();
        let replied = entry.status == EntryStatus::Replied;
        let settle = |status: EntryStatus| {
            if replied {
                EntryStatus::Replied
            } else {
                status
            }
        };

        entry.status = settle(EntryStatus::Processing);
        self.store.put(entry.clone()).await?;

        if !demo_mode.resolve(entry.meta.demo_mode) {
            entry.status = settle(EntryStatus::Failed);
            entry.meta.processing_ms = Some(elapsed_ms(started));
            self.store.put(entry.clone()).await?;
            tracing::warn!(entry_id = %id, "non-demo processing requested");
            return Err(LifecycleError::NotImplemented {
                id: entry.id,
                status: entry.status,
                message: "real transcription is not implemented; use demo mode".to_string(),
            });
        }

        let result = analyzer::analyze(&entry.audio.original_name);
        entry.transcript = Some(result.transcript.to_string());
        entry.ai = result.to_analysis();
        entry.status = settle(EntryStatus::Ready);
        entry.meta.processing_ms = Some(elapsed_ms(started));
        self.store.put(entry.clone()).await?;

        tracing::info!(
            entry_id = %id,
            variant = ?result.variant,
            processing_ms = ?entry.meta.processing_ms,
            "entry processed"
        );
        Ok(ProcessedEntry {
            id: entry.id,
            status: entry.status,
            ai: entry.ai,
            meta: entry.meta,
        })
    }

    pub async fn get(&self, id: &str) -> Result<Entry, LifecycleError> {
        Ok(self.store.get(id).await?)
    }

    /// All entries, newest first.
    pub async fn list(&self) -> Result<Vec<Entry>, LifecycleError> {
        Ok(self.store.list().await?)
    }

    /// Record a family reply and notify the check-in author.
    pub async fn reply(&self, id: &str, text: &str) -> Result<RepliedEntry, LifecycleError> {
        let _guard = self.locks.lock(id).await;
        let mut entry = self.store.get(id).await?;

        let text = text.trim();
        if text.is_empty() {
            return Err(LifecycleError::Validation(
                "reply 'text' must not be empty".to_string(),
            ));
        }

        let sent_at = now();
        entry.reply.text = Some(text.to_string());
        entry.reply.sent_at = Some(sent_at);
        entry.status = EntryStatus::Replied;
        entry.notification = NotificationRecord {
            text: Some(REPLY_NOTIFICATION_TEXT.to_string()),
            sent_at: Some(sent_at),
        };
        self.store.put(entry.clone()).await?;

        tracing::info!(entry_id = %id, "reply recorded");
        Ok(RepliedEntry {
            id: entry.id,
            status: entry.status,
            notification: entry.notification,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkin_storage::{JsonFileStore, MemoryStore};

    struct Fixture {
        service: EntryService,
        _dir: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let service = EntryService::new(
            Arc::new(MemoryStore::new()),
            UploadDir::new(dir.path().join("uploads")),
        );
        Fixture { service, _dir: dir }
    }

    fn upload(name: &str) -> Option<AudioUpload> {
        Some(AudioUpload {
            original_name: Some(name.to_string()),
            mime_type: Some("audio/wav".to_string()),
            bytes: vec![0, 1, 2, 3],
        })
    }

    #[tokio::test]
    async fn create_records_uploaded_entry() {
        let f = fixture();
        let created = f
            .service
            .create(upload("park.wav"), DemoMode::Unspecified)
            .await
            .unwrap();
        assert_eq!(created.status, EntryStatus::Uploaded);

        let entry = f.service.get(&created.id).await.unwrap();
        assert_eq!(entry.status, EntryStatus::Uploaded);
        assert_eq!(entry.audio.original_name, "park.wav");
        assert!(entry.meta.demo_mode);
        assert!(entry.transcript.is_none());
        assert!(std::path::Path::new(&entry.audio.local_path).exists());
    }

    #[tokio::test]
    async fn create_without_audio_is_a_validation_error() {
        let f = fixture();
        let err = f.service.create(None, DemoMode::Enabled).await.unwrap_err();
        assert!(matches!(err, LifecycleError::Validation(_)));
        assert!(f.service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_honours_explicit_false() {
        let f = fixture();
        let created = f
            .service
            .create(upload("a.wav"), DemoMode::from_form_value(Some("false")))
            .await
            .unwrap();
        assert!(!f.service.get(&created.id).await.unwrap().meta.demo_mode);
    }

    #[tokio::test]
    async fn process_unknown_id_is_not_found_in_both_modes() {
        let f = fixture();
        for mode in [DemoMode::Enabled, DemoMode::Disabled, DemoMode::Unspecified] {
            let err = f.service.process("nope", mode).await.unwrap_err();
            assert!(
                matches!(err, LifecycleError::NotFound { ref id } if id == "nope"),
                "{mode:?}: {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn worried_filename_yields_doctor_visit_summary() {
        let f = fixture();
        let id = f
            .service
            .create(upload("sick_mom.wav"), DemoMode::Unspecified)
            .await
            .unwrap()
            .id;

        let processed = f.service.process(&id, DemoMode::Enabled).await.unwrap();
        assert_eq!(processed.status, EntryStatus::Ready);
        assert_eq!(
            processed.ai.summary3,
            ["今天去看醫生檢查", "血壓偏高有點擔心", "晚上睡得不太好"]
        );
        assert_eq!(processed.ai.emotion.as_deref(), Some("擔心"));
        assert!(processed.meta.processing_ms.is_some());

        let entry = f.service.get(&id).await.unwrap();
        assert_eq!(entry.status, EntryStatus::Ready);
        assert!(entry.transcript.unwrap().contains("醫生"));
    }

    #[tokio::test]
    async fn park_filename_yields_happy_emotion() {
        let f = fixture();
        let id = f
            .service
            .create(upload("park.wav"), DemoMode::Unspecified)
            .await
            .unwrap()
            .id;

        let processed = f.service.process(&id, DemoMode::Unspecified).await.unwrap();
        assert_eq!(processed.ai.emotion.as_deref(), Some("開心"));
        assert_eq!(processed.ai.quick_replies.len(), 3);
    }

    #[tokio::test]
    async fn demo_mode_off_marks_failed_and_leaves_analysis_empty() {
        let f = fixture();
        let id = f
            .service
            .create(upload("sick_mom.wav"), DemoMode::Enabled)
            .await
            .unwrap()
            .id;

        let err = f.service.process(&id, DemoMode::Disabled).await.unwrap_err();
        match err {
            LifecycleError::NotImplemented { status, .. } => {
                assert_eq!(status, EntryStatus::Failed)
            }
            other => panic!("expected NotImplemented, got {other:?}"),
        }

        let entry = f.service.get(&id).await.unwrap();
        assert_eq!(entry.status, EntryStatus::Failed);
        assert!(entry.transcript.is_none());
        assert_eq!(entry.ai, Analysis::default());
        assert!(entry.meta.processing_ms.is_some());
    }

    #[tokio::test]
    async fn stored_demo_mode_applies_when_request_is_silent() {
        let f = fixture();
        let id = f
            .service
            .create(upload("park.wav"), DemoMode::Disabled)
            .await
            .unwrap()
            .id;

        let err = f.service.process(&id, DemoMode::Unspecified).await.unwrap_err();
        assert!(matches!(err, LifecycleError::NotImplemented { .. }));

        // An explicit override still wins over the stored flag.
        let processed = f.service.process(&id, DemoMode::Enabled).await.unwrap();
        assert_eq!(processed.status, EntryStatus::Ready);
    }

    #[tokio::test]
    async fn whitespace_reply_is_rejected() {
        let f = fixture();
        let id = f
            .service
            .create(upload("park.wav"), DemoMode::Unspecified)
            .await
            .unwrap()
            .id;

        let err = f.service.reply(&id, "  \n\t ").await.unwrap_err();
        assert!(matches!(err, LifecycleError::Validation(_)));
        assert_eq!(
            f.service.get(&id).await.unwrap().status,
            EntryStatus::Uploaded
        );
    }

    #[tokio::test]
    async fn reply_to_unknown_id_is_not_found() {
        let f = fixture();
        let err = f.service.reply("nope", "hi").await.unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound { .. }));
    }

    #[tokio::test]
    async fn reply_sets_replied_and_notification() {
        let f = fixture();
        let id = f
            .service
            .create(upload("park.wav"), DemoMode::Unspecified)
            .await
            .unwrap()
            .id;
        f.service.process(&id, DemoMode::Enabled).await.unwrap();

        let replied = f.service.reply(&id, "  好棒，週末見！ ").await.unwrap();
        assert_eq!(replied.status, EntryStatus::Replied);
        assert_eq!(
            replied.notification.text.as_deref(),
            Some(REPLY_NOTIFICATION_TEXT)
        );

        let entry = f.service.get(&id).await.unwrap();
        assert_eq!(entry.reply.text.as_deref(), Some("好棒，週末見！"));
        let reply_at = entry.reply.sent_at.unwrap();
        let notified_at = entry.notification.sent_at.unwrap();
        assert!(notified_at >= reply_at);
        // Analysis survives the reply.
        assert_eq!(entry.ai.emotion.as_deref(), Some("開心"));
    }

    #[tokio::test]
    async fn reply_is_allowed_after_failure() {
        let f = fixture();
        let id = f
            .service
            .create(upload("park.wav"), DemoMode::Disabled)
            .await
            .unwrap()
            .id;
        let _ = f.service.process(&id, DemoMode::Unspecified).await;

        let replied = f.service.reply(&id, "收到").await.unwrap();
        assert_eq!(replied.status, EntryStatus::Replied);
    }

    #[tokio::test]
    async fn processing_a_replied_entry_keeps_it_replied() {
        let f = fixture();
        let id = f
            .service
            .create(upload("park.wav"), DemoMode::Unspecified)
            .await
            .unwrap()
            .id;
        f.service.reply(&id, "hi").await.unwrap();

        let processed = f.service.process(&id, DemoMode::Enabled).await.unwrap();
        assert_eq!(processed.status, EntryStatus::Replied);
        assert_eq!(processed.ai.emotion.as_deref(), Some("開心"));

        let entry = f.service.get(&id).await.unwrap();
        assert_eq!(entry.status, EntryStatus::Replied);
        assert_eq!(entry.reply.text.as_deref(), Some("hi"));
        assert!(entry.transcript.is_some());
        assert!(entry.meta.processing_ms.is_some());
    }

    #[tokio::test]
    async fn failed_processing_of_a_replied_entry_keeps_it_replied() {
        let f = fixture();
        let id = f
            .service
            .create(upload("park.wav"), DemoMode::Unspecified)
            .await
            .unwrap()
            .id;
        f.service.reply(&id, "hi").await.unwrap();

        let err = f.service.process(&id, DemoMode::Disabled).await.unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::NotImplemented {
                status: EntryStatus::Replied,
                ..
            }
        ));
        assert_eq!(
            f.service.get(&id).await.unwrap().status,
            EntryStatus::Replied
        );
    }

    #[tokio::test]
    async fn failed_create_removes_the_stored_audio() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the document should be makes every save fail.
        let data = dir.path().join("entries.json");
        std::fs::create_dir_all(data.join("occupied")).unwrap();
        let uploads_root = dir.path().join("uploads");
        let service = EntryService::new(
            Arc::new(JsonFileStore::open(&data).await),
            UploadDir::new(&uploads_root),
        );

        let err = service
            .create(upload("park.wav"), DemoMode::Unspecified)
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Storage(_)));
        assert_eq!(std::fs::read_dir(&uploads_root).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn entries_survive_a_restart() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data").join("entries.json");
        let uploads = UploadDir::new(dir.path().join("uploads"));

        let (id, before) = {
            let service =
                EntryService::new(Arc::new(JsonFileStore::open(&data).await), uploads.clone());
            let id = service
                .create(upload("sick_mom.wav"), DemoMode::Unspecified)
                .await
                .unwrap()
                .id;
            service.process(&id, DemoMode::Enabled).await.unwrap();
            service.reply(&id, "我明天過去").await.unwrap();
            let before = service.get(&id).await.unwrap();
            (id, before)
        };

        let service = EntryService::new(Arc::new(JsonFileStore::open(&data).await), uploads);
        assert_eq!(service.get(&id).await.unwrap(), before);
    }

    #[tokio::test]
    async fn concurrent_replies_on_one_entry_leave_a_consistent_record() {
        let f = fixture();
        let service = Arc::new(f.service);
        let id = service
            .create(upload("park.wav"), DemoMode::Unspecified)
            .await
            .unwrap()
            .id;

        let mut handles = Vec::new();
        for i in 0..8 {
            let service = service.clone();
            let id = id.clone();
            handles.push(tokio::spawn(async move {
                service.reply(&id, &format!("reply {i}")).await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }

        let entry = service.get(&id).await.unwrap();
        assert_eq!(entry.status, EntryStatus::Replied);
        assert!(entry.reply.text.unwrap().starts_with("reply "));
    }
}
