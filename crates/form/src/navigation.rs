use std::sync::Mutex;

use frota_core::EntityKind;
use frota_storage::EntityId;
use serde::Serialize;

/// Receives where the UI should go once a form is done with.
///
/// Calls are fire-and-forget: the form does not wait on or inspect them.
pub trait Navigator: Send + Sync + 'static {
    /// A submission succeeded; typically route to `kind.list_route()`.
    fn on_success(&self, kind: EntityKind, id: &EntityId);

    /// The user left the form without a successful submission.
    fn on_cancel(&self);
}

/// Ignores every navigation request.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn on_success(&self, _kind: EntityKind, _id: &EntityId) {}

    fn on_cancel(&self) {}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NavigationEvent {
    Success {
        kind: EntityKind,
        id: EntityId,
        route: String,
    },
    Cancel,
}

/// Keeps every navigation request in order.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    events: Mutex<Vec<NavigationEvent>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<NavigationEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    fn push(&self, event: NavigationEvent) {
        let mut events = self
            .events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        events.push(event);
    }
}

impl Navigator for RecordingNavigator {
    fn on_success(&self, kind: EntityKind, id: &EntityId) {
        self.push(NavigationEvent::Success {
            kind,
            id: id.clone(),
            route: kind.list_route().to_string(),
        });
    }

    fn on_cancel(&self) {
        self.push(NavigationEvent::Cancel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_success_with_list_route() {
        let nav = RecordingNavigator::new();
        nav.on_success(EntityKind::AccessLevel, &EntityId::from("3"));
        nav.on_cancel();
        assert_eq!(
            nav.events(),
            vec![
                NavigationEvent::Success {
                    kind: EntityKind::AccessLevel,
                    id: EntityId::from("3"),
                    route: "/niveis-acesso".to_string(),
                },
                NavigationEvent::Cancel,
            ]
        );
    }
}
