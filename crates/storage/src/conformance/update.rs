use std::future::Future;

use frota_core::EntityKind;

use super::{make_record, TestResult};
use crate::{EntityStore, SubmitIntent};

pub(super) async fn run_update_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: EntityStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "update",
            "update_replaces_record",
            update_replaces_record(factory).await,
        ),
        TestResult::from_result(
            "update",
            "update_returns_same_id",
            update_returns_same_id(factory).await,
        ),
        TestResult::from_result(
            "update",
            "update_does_not_add_entities",
            update_does_not_add_entities(factory).await,
        ),
    ]
}

async fn update_replaces_record<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: EntityStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    let id = store
        .perform(EntityKind::Contract, SubmitIntent::Create, &make_record("before"))
        .await
        .map_err(|e| format!("create failed: {e}"))?;
    let created = store
        .get(EntityKind::Contract, &id)
        .await
        .map_err(|e| format!("get failed: {e}"))?;

    let replacement = make_record("after");
    store
        .perform(
            EntityKind::Contract,
            SubmitIntent::Update(id.clone()),
            &replacement,
        )
        .await
        .map_err(|e| format!("update failed: {e}"))?;

    let updated = store
        .get(EntityKind::Contract, &id)
        .await
        .map_err(|e| format!("get failed: {e}"))?;
    if updated.record != replacement {
        return Err(format!("record not replaced: {:?}", updated.record));
    }
    if updated.created_at != created.created_at {
        return Err(format!(
            "created_at changed from {} to {}",
            created.created_at, updated.created_at
        ));
    }
    Ok(())
}

async fn update_returns_same_id<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: EntityStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    let id = store
        .perform(EntityKind::User, SubmitIntent::Create, &make_record("u"))
        .await
        .map_err(|e| format!("create failed: {e}"))?;
    let returned = store
        .perform(EntityKind::User, SubmitIntent::Update(id.clone()), &make_record("v"))
        .await
        .map_err(|e| format!("update failed: {e}"))?;
    if returned != id {
        return Err(format!("update returned {returned}, expected {id}"));
    }
    Ok(())
}

async fn update_does_not_add_entities<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: EntityStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    let id = store
        .perform(EntityKind::Supplier, SubmitIntent::Create, &make_record("s"))
        .await
        .map_err(|e| format!("create failed: {e}"))?;
    for i in 0..3 {
        store
            .perform(
                EntityKind::Supplier,
                SubmitIntent::Update(id.clone()),
                &make_record(&format!("s{i}")),
            )
            .await
            .map_err(|e| format!("update failed: {e}"))?;
    }
    let count = store
        .list(EntityKind::Supplier)
        .await
        .map_err(|e| format!("list failed: {e}"))?
        .len();
    if count != 1 {
        return Err(format!("expected 1 supplier, found {count}"));
    }
    Ok(())
}
