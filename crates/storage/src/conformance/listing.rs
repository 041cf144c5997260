use std::future::Future;

use super::{make_entry, TestResult};
use crate::EntryStore;

pub(super) async fn run_listing_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: EntryStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "listing",
            "empty_store_lists_nothing",
            empty_store_lists_nothing(factory).await,
        ),
        TestResult::from_result(
            "listing",
            "list_is_newest_first",
            list_is_newest_first(factory).await,
        ),
        TestResult::from_result(
            "listing",
            "same_timestamp_breaks_ties_by_id",
            same_timestamp_breaks_ties_by_id(factory).await,
        ),
    ]
}

async fn empty_store_lists_nothing<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: EntryStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let all = s.list().await.map_err(|e| e.to_string())?;
    if !all.is_empty() {
        return Err(format!("expected empty list, got {} entries", all.len()));
    }
    Ok(())
}

async fn list_is_newest_first<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: EntryStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    for (id, offset) in [("middle", 10), ("oldest", 0), ("newest", 20)] {
        s.put(make_entry(id, offset))
            .await
            .map_err(|e| e.to_string())?;
    }

    let ids: Vec<String> = s
        .list()
        .await
        .map_err(|e| e.to_string())?
        .into_iter()
        .map(|e| e.id)
        .collect();
    if ids != ["newest", "middle", "oldest"] {
        return Err(format!("unexpected order: {ids:?}"));
    }
    Ok(())
}

async fn same_timestamp_breaks_ties_by_id<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: EntryStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.put(make_entry("b", 5)).await.map_err(|e| e.to_string())?;
    s.put(make_entry("a", 5)).await.map_err(|e| e.to_string())?;

    let ids: Vec<String> = s
        .list()
        .await
        .map_err(|e| e.to_string())?
        .into_iter()
        .map(|e| e.id)
        .collect();
    if ids != ["a", "b"] {
        return Err(format!("unexpected order: {ids:?}"));
    }
    Ok(())
}
