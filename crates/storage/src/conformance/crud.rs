use std::future::Future;

use super::{make_entry, TestResult};
use crate::{EntryStatus, EntryStore, StorageError};

pub(super) async fn run_crud_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: EntryStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "crud",
            "put_then_get_returns_same_record",
            put_then_get_returns_same_record(factory).await,
        ),
        TestResult::from_result(
            "crud",
            "put_replaces_existing_record",
            put_replaces_existing_record(factory).await,
        ),
        TestResult::from_result(
            "crud",
            "get_unknown_returns_entry_not_found",
            get_unknown_returns_entry_not_found(factory).await,
        ),
        TestResult::from_result(
            "crud",
            "entries_are_independent",
            entries_are_independent(factory).await,
        ),
    ]
}

async fn put_then_get_returns_same_record<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: EntryStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let entry = make_entry("e-1", 0);
    s.put(entry.clone()).await.map_err(|e| e.to_string())?;

    let got = s.get("e-1").await.map_err(|e| e.to_string())?;
    if got != entry {
        return Err(format!("expected {entry:?}, got {got:?}"));
    }
    Ok(())
}

async fn put_replaces_existing_record<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: EntryStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut entry = make_entry("e-1", 0);
    s.put(entry.clone()).await.map_err(|e| e.to_string())?;

    entry.status = EntryStatus::Ready;
    entry.transcript = Some("hello".to_string());
    s.put(entry).await.map_err(|e| e.to_string())?;

    let got = s.get("e-1").await.map_err(|e| e.to_string())?;
    if got.status != EntryStatus::Ready {
        return Err(format!("expected READY, got {}", got.status));
    }
    if got.transcript.as_deref() != Some("hello") {
        return Err(format!("transcript not replaced: {:?}", got.transcript));
    }
    let count = s.list().await.map_err(|e| e.to_string())?.len();
    if count != 1 {
        return Err(format!("expected 1 entry after replace, got {count}"));
    }
    Ok(())
}

async fn get_unknown_returns_entry_not_found<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: EntryStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s.get("missing").await {
        Err(StorageError::EntryNotFound { id }) if id == "missing" => Ok(()),
        Err(StorageError::EntryNotFound { id }) => {
            Err(format!("EntryNotFound carried wrong id \"{id}\""))
        }
        Err(e) => Err(format!("expected EntryNotFound, got {e}")),
        Ok(entry) => Err(format!("expected EntryNotFound, got {entry:?}")),
    }
}

async fn entries_are_independent<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: EntryStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.put(make_entry("a", 0)).await.map_err(|e| e.to_string())?;
    let mut b = make_entry("b", 1);
    b.status = EntryStatus::Failed;
    s.put(b).await.map_err(|e| e.to_string())?;

    let a = s.get("a").await.map_err(|e| e.to_string())?;
    if a.status != EntryStatus::Uploaded {
        return Err(format!("writing b changed a's status to {}", a.status));
    }
    Ok(())
}
