//! checkin-core: the voice check-in entry lifecycle.
//!
//! - [`EntryService`] -- create, process, get, reply
//! - [`analyzer`] -- canned demo analysis keyed on the upload's filename
//! - [`UploadDir`] -- writes uploaded audio to disk
//! - [`DemoMode`] -- explicit on/off/unspecified demo flag
//! - [`LifecycleError`] -- validation, not-found, not-implemented, storage

pub mod analyzer;
pub mod demo_mode;
pub mod error;
pub mod id;
pub mod lifecycle;
pub mod locks;
pub mod upload;

pub use demo_mode::{DemoMode, ProcessOptions};
pub use error::LifecycleError;
pub use lifecycle::{
    CreatedEntry, EntryService, ProcessedEntry, RepliedEntry, REPLY_NOTIFICATION_TEXT,
};
pub use upload::{sanitize_filename, AudioUpload, UploadDir};
