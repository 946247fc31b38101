use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use frota_core::EntityKind;

use super::{make_record, TestResult};
use crate::{EntityStore, SubmitIntent};

/// Number of concurrent tasks to spawn in each test.
const N: usize = 10;

pub(super) async fn run_concurrent_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: EntityStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "concurrent",
            "concurrent_creates_get_distinct_ids",
            concurrent_creates_get_distinct_ids(factory).await,
        ),
        TestResult::from_result(
            "concurrent",
            "concurrent_updates_leave_one_entity",
            concurrent_updates_leave_one_entity(factory).await,
        ),
    ]
}

// ── Concurrent create: every task gets its own id ───────────────────────────

async fn concurrent_creates_get_distinct_ids<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: EntityStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = Arc::new(factory().await);

    let mut handles = Vec::new();
    for i in 0..N {
        let s = store.clone();
        handles.push(tokio::spawn(async move {
            s.perform(
                EntityKind::Supplier,
                SubmitIntent::Create,
                &make_record(&format!("supplier {i}")),
            )
            .await
        }));
    }

    let mut ids = HashSet::new();
    for handle in handles {
        let id = handle
            .await
            .map_err(|e| format!("task panicked: {e}"))?
            .map_err(|e| format!("perform failed: {e}"))?;
        if !ids.insert(id.clone()) {
            return Err(format!("id {id} handed out twice"));
        }
    }

    let listed = store
        .list(EntityKind::Supplier)
        .await
        .map_err(|e| format!("list failed: {e}"))?
        .len();
    if listed != N {
        return Err(format!("expected {N} suppliers, listed {listed}"));
    }
    Ok(())
}

// ── Concurrent update: last write wins, nothing duplicated ──────────────────

async fn concurrent_updates_leave_one_entity<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: EntityStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = Arc::new(factory().await);
    let id = store
        .perform(EntityKind::Contract, SubmitIntent::Create, &make_record("v0"))
        .await
        .map_err(|e| format!("create failed: {e}"))?;

    let mut handles = Vec::new();
    for i in 0..N {
        let s = store.clone();
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            s.perform(
                EntityKind::Contract,
                SubmitIntent::Update(id),
                &make_record(&format!("v{}", i + 1)),
            )
            .await
        }));
    }
    for handle in handles {
        handle
            .await
            .map_err(|e| format!("task panicked: {e}"))?
            .map_err(|e| format!("update failed: {e}"))?;
    }

    let listed = store
        .list(EntityKind::Contract)
        .await
        .map_err(|e| format!("list failed: {e}"))?;
    if listed.len() != 1 {
        return Err(format!("expected 1 contract, listed {}", listed.len()));
    }
    let name = listed[0].record.get("name").and_then(|v| v.as_str());
    match name {
        Some(n) if n.starts_with('v') && n != "v0" => Ok(()),
        other => Err(format!("final record not from an update: {other:?}")),
    }
}
