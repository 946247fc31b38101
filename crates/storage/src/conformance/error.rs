use std::future::Future;

use frota_core::EntityKind;

use super::{make_record, TestResult};
use crate::{EntityId, EntityStore, StorageError, SubmitIntent};

pub(super) async fn run_error_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: EntityStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "error",
            "get_nonexistent",
            get_nonexistent(factory).await,
        ),
        TestResult::from_result(
            "error",
            "get_wrong_kind",
            get_wrong_kind(factory).await,
        ),
        TestResult::from_result(
            "error",
            "update_nonexistent",
            update_nonexistent(factory).await,
        ),
        TestResult::from_result(
            "error",
            "list_empty_kind",
            list_empty_kind(factory).await,
        ),
    ]
}

fn expect_not_found(
    result: Result<impl std::fmt::Debug, StorageError>,
    kind: EntityKind,
    id: &str,
) -> Result<(), String> {
    match result {
        Err(StorageError::NotFound { kind: k, id: i }) if k == kind && i == id => Ok(()),
        Err(StorageError::NotFound { kind: k, id: i }) => {
            Err(format!("NotFound has wrong fields: {k:?}/{i}"))
        }
        Err(other) => Err(format!("expected NotFound, got {other:?}")),
        Ok(v) => Err(format!("expected NotFound, got Ok({v:?})")),
    }
}

async fn get_nonexistent<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: EntityStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    let result = store.get(EntityKind::User, &EntityId::from("42")).await;
    expect_not_found(result, EntityKind::User, "42")
}

async fn get_wrong_kind<S, F, Fut>(factory: &F) -> Result<(), String>
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
    let result = store.get(EntityKind::Contract, &id).await;
    expect_not_found(result, EntityKind::Contract, id.as_str())
}

async fn update_nonexistent<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: EntityStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    let result = store
        .perform(
            EntityKind::Supplier,
            SubmitIntent::Update(EntityId::from("7")),
            &make_record("s"),
        )
        .await;
    expect_not_found(result, EntityKind::Supplier, "7")?;

    let count = store
        .list(EntityKind::Supplier)
        .await
        .map_err(|e| format!("list failed: {e}"))?
        .len();
    if count != 0 {
        return Err(format!("failed update created {count} entities"));
    }
    Ok(())
}

async fn list_empty_kind<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: EntityStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    let listed = store
        .list(EntityKind::AccessLevel)
        .await
        .map_err(|e| format!("list failed: {e}"))?;
    if !listed.is_empty() {
        return Err(format!("fresh store lists {} entities", listed.len()));
    }
    Ok(())
}
