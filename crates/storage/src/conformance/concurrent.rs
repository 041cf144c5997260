use std::future::Future;
use std::sync::Arc;

use super::{make_entry, TestResult};
use crate::EntryStore;

/// Number of concurrent tasks to spawn in each test.
const N: usize = 10;

pub(super) async fn run_concurrent_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: EntryStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "concurrent",
            "concurrent_puts_to_distinct_ids_all_land",
            concurrent_puts_to_distinct_ids_all_land(factory).await,
        ),
        TestResult::from_result(
            "concurrent",
            "concurrent_puts_to_same_id_leave_one_record",
            concurrent_puts_to_same_id_leave_one_record(factory).await,
        ),
    ]
}

/// N tasks each put a different entry in parallel. None may be lost.
async fn concurrent_puts_to_distinct_ids_all_land<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: EntryStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = Arc::new(factory().await);

    let mut handles = Vec::new();
    for i in 0..N {
        let s = storage.clone();
        handles.push(tokio::spawn(async move {
            s.put(make_entry(&format!("entry-{i}"), i as i64)).await
        }));
    }
    for h in handles {
        h.await
            .map_err(|e| format!("join: {e}"))?
            .map_err(|e| format!("put: {e}"))?;
    }

    let count = storage.list().await.map_err(|e| e.to_string())?.len();
    if count != N {
        return Err(format!("expected {N} entries, got {count}"));
    }
    for i in 0..N {
        storage
            .get(&format!("entry-{i}"))
            .await
            .map_err(|e| format!("entry-{i}: {e}"))?;
    }
    Ok(())
}

/// N tasks race to write the same id. Last write wins; exactly one record remains.
async fn concurrent_puts_to_same_id_leave_one_record<S, F, Fut>(
    factory: &F,
) -> Result<(), String>
where
    S: EntryStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = Arc::new(factory().await);

    let mut handles = Vec::new();
    for i in 0..N {
        let s = storage.clone();
        handles.push(tokio::spawn(async move {
            let mut entry = make_entry("shared", 0);
            entry.transcript = Some(format!("writer-{i}"));
            s.put(entry).await
        }));
    }
    for h in handles {
        h.await
            .map_err(|e| format!("join: {e}"))?
            .map_err(|e| format!("put: {e}"))?;
    }

    let all = storage.list().await.map_err(|e| e.to_string())?;
    if all.len() != 1 {
        return Err(format!("expected 1 entry, got {}", all.len()));
    }
    match all[0].transcript.as_deref() {
        Some(t) if t.starts_with("writer-") => Ok(()),
        other => Err(format!("unexpected transcript {other:?}")),
    }
}
