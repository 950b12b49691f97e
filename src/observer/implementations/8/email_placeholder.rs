// Ring 8: Integration - logs the e-mail a message would trigger; nothing is sent
use async_trait::async_trait;

use crate::database::store::EntityStore;
use crate::observer::error::ObserverError;
use crate::observer::event::{DomainEvent, EventKind};
use crate::observer::traits::{Observer, ObserverRing};

#[derive(Default)]
pub struct EmailPlaceholder;

impl EmailPlaceholder {
    fn subject(sender: &str) -> String {
        format!("New message from {}", sender)
    }
}

#[async_trait]
impl Observer for EmailPlaceholder {
    fn name(&self) -> &'static str {
        "EmailPlaceholder"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Integration
    }

    fn applies_to(&self, kind: EventKind) -> bool {
        kind == EventKind::MessageSent
    }

    async fn execute(&self, event: &DomainEvent, _store: &dyn EntityStore) -> Result<usize, ObserverError> {
        if let DomainEvent::MessageSent { message } = event {
            tracing::info!(
                "E-mail placeholder: to={} subject=\"{}\" contract={}",
                message.receiver,
                Self::subject(&message.sender),
                message.contract
            );
        }
        Ok(0)
    }
}
