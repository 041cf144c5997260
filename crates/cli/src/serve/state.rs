//! Application state shared across request handlers.

use checkin_core::EntryService;

pub(crate) struct AppState {
    /// Sole owner of entry mutations.
    pub(crate) service: EntryService,
}
