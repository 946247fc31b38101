use std::collections::HashSet;
use std::future::Future;

use frota_core::EntityKind;

use super::{make_record, TestResult};
use crate::{EntityStore, SubmitIntent};

pub(super) async fn run_create_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: EntityStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "create",
            "create_returns_retrievable_id",
            create_returns_retrievable_id(factory).await,
        ),
        TestResult::from_result(
            "create",
            "create_assigns_distinct_ids",
            create_assigns_distinct_ids(factory).await,
        ),
        TestResult::from_result(
            "create",
            "kinds_are_isolated",
            kinds_are_isolated(factory).await,
        ),
        TestResult::from_result(
            "create",
            "list_is_oldest_first",
            list_is_oldest_first(factory).await,
        ),
    ]
}

async fn create_returns_retrievable_id<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: EntityStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    let record = make_record("Locadora Sul");
    let id = store
        .perform(EntityKind::Supplier, SubmitIntent::Create, &record)
        .await
        .map_err(|e| format!("perform failed: {e}"))?;

    let stored = store
        .get(EntityKind::Supplier, &id)
        .await
        .map_err(|e| format!("get failed: {e}"))?;
    if stored.record != record {
        return Err(format!("stored record differs: {:?}", stored.record));
    }
    if stored.id != id || stored.kind != EntityKind::Supplier {
        return Err(format!("wrong identity: {:?}/{}", stored.kind, stored.id));
    }
    if stored.created_at != stored.updated_at {
        return Err("fresh entity has created_at != updated_at".to_string());
    }
    Ok(())
}

async fn create_assigns_distinct_ids<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: EntityStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    let mut seen = HashSet::new();
    for i in 0..5 {
        let id = store
            .perform(
                EntityKind::User,
                SubmitIntent::Create,
                &make_record(&format!("user {i}")),
            )
            .await
            .map_err(|e| format!("perform failed: {e}"))?;
        if !seen.insert(id.clone()) {
            return Err(format!("id {id} handed out twice"));
        }
    }
    Ok(())
}

async fn kinds_are_isolated<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: EntityStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    store
        .perform(EntityKind::Contract, SubmitIntent::Create, &make_record("c"))
        .await
        .map_err(|e| format!("perform failed: {e}"))?;

    let suppliers = store
        .list(EntityKind::Supplier)
        .await
        .map_err(|e| format!("list failed: {e}"))?;
    if !suppliers.is_empty() {
        return Err(format!("expected no suppliers, got {}", suppliers.len()));
    }
    Ok(())
}

async fn list_is_oldest_first<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: EntityStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    let names = ["a", "b", "c"];
    let mut ids = Vec::new();
    for name in names {
        ids.push(
            store
                .perform(EntityKind::AccessLevel, SubmitIntent::Create, &make_record(name))
                .await
                .map_err(|e| format!("perform failed: {e}"))?,
        );
    }

    let listed: Vec<_> = store
        .list(EntityKind::AccessLevel)
        .await
        .map_err(|e| format!("list failed: {e}"))?
        .into_iter()
        .map(|e| e.id)
        .collect();
    if listed != ids {
        return Err(format!("expected {ids:?}, listed {listed:?}"));
    }
    Ok(())
}
