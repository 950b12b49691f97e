// Ring 9: Notification - announce a new project to every freelancer
use async_trait::async_trait;

use crate::database::models::{NewNotification, Project, Role};
use crate::database::store::EntityStore;
use crate::observer::error::{DeliveryTally, ObserverError};
use crate::observer::event::{DomainEvent, EventKind};
use crate::observer::traits::{Observer, ObserverRing};

pub const FREELANCER_DASHBOARD: &str = "/freelancer-dashboard";

#[derive(Default)]
pub struct NotifyFreelancers;

impl NotifyFreelancers {
    pub fn message(project: &Project) -> String {
        format!("🆕 New project '{}' has been added!", project.title)
    }
}

#[async_trait]
impl Observer for NotifyFreelancers {
    fn name(&self) -> &'static str {
        "NotifyFreelancers"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Notification
    }

    fn applies_to(&self, kind: EventKind) -> bool {
        kind == EventKind::ProjectCreated
    }

    async fn execute(&self, event: &DomainEvent, store: &dyn EntityStore) -> Result<usize, ObserverError> {
        let DomainEvent::ProjectCreated { project } = event else {
            return Ok(0);
        };

        let freelancers = store.list_profiles(Some(Role::Freelancer)).await?;
        let text = Self::message(project);
        let mut tally = DeliveryTally::default();

        for freelancer in &freelancers {
            let result = store
                .create_notification(NewNotification::new(freelancer.id, text.clone(), FREELANCER_DASHBOARD))
                .await;
            if let Err(e) = &result {
                tracing::warn!("Project #{} notification to profile {} failed: {}", project.id, freelancer.id, e);
            }
            tally.record(result);
        }

        tally.finish()
    }
}
