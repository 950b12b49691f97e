use async_trait::async_trait;

use crate::database::store::EntityStore;
use crate::observer::error::ObserverError;
use crate::observer::event::{DomainEvent, EventKind};

/// Observer rings, executed in ascending order. Both run after the
/// triggering write has been persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ObserverRing {
    Integration = 8,  // External delivery (e-mail), no rows written
    Notification = 9, // In-app notification rows
}

/// A side effect attached to one or more domain events
#[async_trait]
pub trait Observer: Send + Sync {
    /// Observer name for logging and debugging
    fn name(&self) -> &'static str;

    /// Which ring this observer belongs to
    fn ring(&self) -> ObserverRing;

    /// Check if observer applies to this event
    fn applies_to(&self, kind: EventKind) -> bool;

    /// Priority within ring (lower numbers execute first)
    fn priority(&self) -> u8 {
        50
    }

    /// Runs the side effect and returns how many notifications it created.
    async fn execute(&self, event: &DomainEvent, store: &dyn EntityStore) -> Result<usize, ObserverError>;
}
