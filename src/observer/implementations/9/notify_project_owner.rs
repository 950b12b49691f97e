// Ring 9: Notification - tell the client a proposal arrived on their project
use async_trait::async_trait;

use crate::database::models::NewNotification;
use crate::database::store::EntityStore;
use crate::observer::error::ObserverError;
use crate::observer::event::{DomainEvent, EventKind};
use crate::observer::traits::{Observer, ObserverRing};

pub const CLIENT_DASHBOARD: &str = "/client-dashboard";

#[derive(Default)]
pub struct NotifyProjectOwner;

impl NotifyProjectOwner {
    pub fn message(freelancer_name: &str, project_title: &str) -> String {
        format!("📨 New proposal received from {} for '{}'", freelancer_name, project_title)
    }
}

#[async_trait]
impl Observer for NotifyProjectOwner {
    fn name(&self) -> &'static str {
        "NotifyProjectOwner"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Notification
    }

    fn applies_to(&self, kind: EventKind) -> bool {
        kind == EventKind::ProposalCreated
    }

    async fn execute(&self, event: &DomainEvent, store: &dyn EntityStore) -> Result<usize, ObserverError> {
        let DomainEvent::ProposalCreated {
            project_owner,
            project_title,
            freelancer_name,
            ..
        } = event
        else {
            return Ok(0);
        };

        store
            .create_notification(NewNotification::new(
                *project_owner,
                Self::message(freelancer_name, project_title),
                CLIENT_DASHBOARD,
            ))
            .await?;
        Ok(1)
    }
}
