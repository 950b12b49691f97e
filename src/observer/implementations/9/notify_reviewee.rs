// Ring 9: Notification - tell a profile it was reviewed
use async_trait::async_trait;

use crate::database::models::NewNotification;
use crate::database::store::EntityStore;
use crate::observer::error::ObserverError;
use crate::observer::event::{DomainEvent, EventKind};
use crate::observer::traits::{Observer, ObserverRing};

use super::notify_freelancers::FREELANCER_DASHBOARD;

#[derive(Default)]
pub struct NotifyReviewee;

impl NotifyReviewee {
    pub fn message(rating: i16, reviewer_name: &str, project_title: &str) -> String {
        format!(
            "⭐ You received a {}-star review from {} on '{}'",
            rating, reviewer_name, project_title
        )
    }
}

#[async_trait]
impl Observer for NotifyReviewee {
    fn name(&self) -> &'static str {
        "NotifyReviewee"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Notification
    }

    fn applies_to(&self, kind: EventKind) -> bool {
        kind == EventKind::ReviewCreated
    }

    async fn execute(&self, event: &DomainEvent, store: &dyn EntityStore) -> Result<usize, ObserverError> {
        let DomainEvent::ReviewCreated {
            review,
            reviewer_name,
            project_title,
        } = event
        else {
            return Ok(0);
        };

        store
            .create_notification(NewNotification::new(
                review.reviewee,
                Self::message(review.rating, reviewer_name, project_title),
                FREELANCER_DASHBOARD,
            ))
            .await?;
        Ok(1)
    }
}
