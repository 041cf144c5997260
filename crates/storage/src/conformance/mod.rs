//! Conformance test suite for `EntryStore` implementations.
//!
//! A backend-agnostic suite that any `EntryStore` can run to verify it
//! behaves like the others. The suite covers:
//!
//! - **Read/write**: put then get, replace in place, unknown ids
//! - **Listing**: newest-first ordering, one record per id
//! - **Concurrency**: parallel puts to distinct ids all land
//!
//! # Usage
//!
//! ```ignore
//! use checkin_storage::conformance::run_conformance_suite;
//!
//! #[tokio::test]
//! async fn my_store_conformance() {
//!     let report = run_conformance_suite(|| async { MyStore::new() }).await;
//!     assert!(report.failed == 0, "{report}");
//! }
//! ```

mod concurrent;
mod crud;
mod listing;

use std::fmt;
use std::future::Future;

use time::OffsetDateTime;

use crate::record::{AudioRecord, Entry};
use crate::EntryStore;

/// Result of a single conformance test.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test category (e.g. "crud", "listing").
    pub category: String,
    pub name: String,
    pub passed: bool,
    /// Error message if the test failed.
    pub message: Option<String>,
}

impl TestResult {
    fn from_result(category: &str, name: &str, result: Result<(), String>) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed: result.is_ok(),
            message: result.err(),
        }
    }
}

/// Aggregated report from a full conformance suite run.
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Conformance: {}/{} passed ({} failed)",
            self.passed, self.total, self.failed
        )?;
        for r in &self.results {
            if !r.passed {
                writeln!(
                    f,
                    "  FAIL [{}/{}]: {}",
                    r.category,
                    r.name,
                    r.message.as_deref().unwrap_or("(no message)")
                )?;
            }
        }
        Ok(())
    }
}

/// Run the full conformance suite against a store.
///
/// The `factory` function is called once per test to create a fresh, empty
/// store, ensuring test isolation.
pub async fn run_conformance_suite<S, F, Fut>(factory: F) -> ConformanceReport
where
    S: EntryStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.extend(crud::run_crud_tests(&factory).await);
    results.extend(listing::run_listing_tests(&factory).await);
    results.extend(concurrent::run_concurrent_tests(&factory).await);

    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();

    ConformanceReport {
        results,
        passed,
        failed: total - passed,
        total,
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// An `UPLOADED` entry created `offset_secs` after a fixed epoch.
fn make_entry(id: &str, offset_secs: i64) -> Entry {
    let created_at = OffsetDateTime::from_unix_timestamp(1_760_000_000 + offset_secs)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH);
    Entry::new(
        id.to_string(),
        created_at,
        AudioRecord {
            filename: format!("{}_{id}.wav", created_at.unix_timestamp() * 1000),
            original_name: format!("{id}.wav"),
            mime_type: "audio/wav".to_string(),
            local_path: format!("uploads/{}_{id}.wav", created_at.unix_timestamp() * 1000),
        },
        true,
    )
}
