// Ring 9: Notification - ping the receiver of a chat message, if they have a profile
use async_trait::async_trait;

use crate::database::models::NewNotification;
use crate::database::store::EntityStore;
use crate::observer::error::ObserverError;
use crate::observer::event::{DomainEvent, EventKind};
use crate::observer::traits::{Observer, ObserverRing};

#[derive(Default)]
pub struct NotifyMessageReceiver;

impl NotifyMessageReceiver {
    pub fn message(sender: &str) -> String {
        format!("💬 New message from {}", sender)
    }

    pub fn link(contract: i64) -> String {
        format!("/chat/{}", contract)
    }
}

#[async_trait]
impl Observer for NotifyMessageReceiver {
    fn name(&self) -> &'static str {
        "NotifyMessageReceiver"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Notification
    }

    fn applies_to(&self, kind: EventKind) -> bool {
        kind == EventKind::MessageSent
    }

    async fn execute(&self, event: &DomainEvent, store: &dyn EntityStore) -> Result<usize, ObserverError> {
        let DomainEvent::MessageSent { message } = event else {
            return Ok(0);
        };

        let Some(receiver) = store.find_profile_by_user_name(&message.receiver).await? else {
            tracing::debug!("No profile named '{}', message #{} not notified", message.receiver, message.id);
            return Ok(0);
        };

        store
            .create_notification(NewNotification::new(
                receiver.id,
                Self::message(&message.sender),
                Self::link(message.contract),
            ))
            .await?;
        Ok(1)
    }
}
