// Notification dispatcher: runs registered observers for a domain event in ring order

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::config::NotificationConfig;
use crate::database::store::EntityStore;
use crate::observer::error::ObserverError;
use crate::observer::event::DomainEvent;
use crate::observer::implementations::register_default_observers;
use crate::observer::traits::{Observer, ObserverRing};

/// Outcome of a dispatch where every applicable observer succeeded
#[derive(Debug, Clone)]
pub struct DispatchReport {
    pub event: &'static str,
    pub observers_run: usize,
    pub delivered: usize,
    pub elapsed: Duration,
}

/// At least one observer failed. Whatever the others delivered stays delivered.
#[derive(Debug, Error)]
#[error("{} observer(s) failed while dispatching {event}", .failures.len())]
pub struct DispatchFailure {
    pub event: &'static str,
    pub delivered: usize,
    pub failures: Vec<(&'static str, ObserverError)>,
}

/// Maps domain events to notification side effects.
///
/// Observers run inline, one after another, ordered by ring then priority.
/// A failing observer never stops the ones after it.
pub struct NotificationDispatcher {
    store: Arc<dyn EntityStore>,
    observers: BTreeMap<ObserverRing, Vec<Box<dyn Observer>>>,
    enabled: bool,
}

impl NotificationDispatcher {
    /// Create a dispatcher with an empty observer registry
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self {
            store,
            observers: BTreeMap::new(),
            enabled: true,
        }
    }

    /// Dispatcher with the marketplace observers registered per `config`
    pub fn with_default_observers(store: Arc<dyn EntityStore>, config: &NotificationConfig) -> Self {
        let mut dispatcher = Self::new(store);
        dispatcher.enabled = config.enabled;
        register_default_observers(&mut dispatcher, config);
        dispatcher
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn register_observer(&mut self, observer: Box<dyn Observer>) {
        let ring = observer.ring();
        let name = observer.name();
        let observers = self.observers.entry(ring).or_default();
        observers.push(observer);
        // Stable sort keeps registration order among equal priorities
        observers.sort_by_key(|o| o.priority());

        tracing::debug!("Registered observer '{}' for ring {:?}", name, ring);
    }

    pub fn observer_count(&self) -> usize {
        self.observers.values().map(Vec::len).sum()
    }

    /// Run every observer that applies to `event`.
    ///
    /// Callers that must not fail because of notifications discard the
    /// result; it has already been logged here.
    pub async fn dispatch(&self, event: &DomainEvent) -> Result<DispatchReport, DispatchFailure> {
        let start_time = Instant::now();
        let name = event.name();

        if !self.enabled {
            tracing::debug!("Notifications disabled, skipping {} #{}", name, event.entity_id());
            return Ok(DispatchReport {
                event: name,
                observers_run: 0,
                delivered: 0,
                elapsed: start_time.elapsed(),
            });
        }

        let kind = event.kind();
        let mut observers_run = 0;
        let mut delivered = 0;
        let mut failures = Vec::new();

        for (ring, observers) in &self.observers {
            for observer in observers {
                if !observer.applies_to(kind) {
                    tracing::trace!("Observer {} skipped - doesn't apply to {}", observer.name(), name);
                    continue;
                }

                observers_run += 1;
                let observer_start = Instant::now();

                match observer.execute(event, self.store.as_ref()).await {
                    Ok(count) => {
                        delivered += count;
                        tracing::debug!(
                            "Observer: {} (ring {:?}) delivered {} in {:?}",
                            observer.name(),
                            ring,
                            count,
                            observer_start.elapsed()
                        );
                    }
                    Err(error) => {
                        delivered += error.delivered();
                        tracing::warn!(
                            "Observer: {} (ring {:?}) failed for {} #{}: {}",
                            observer.name(),
                            ring,
                            name,
                            event.entity_id(),
                            error
                        );
                        failures.push((observer.name(), error));
                    }
                }
            }
        }

        let elapsed = start_time.elapsed();
        if failures.is_empty() {
            tracing::info!(
                "Dispatched {} #{}: {} notification(s) from {} observer(s) in {:?}",
                name,
                event.entity_id(),
                delivered,
                observers_run,
                elapsed
            );
            Ok(DispatchReport {
                event: name,
                observers_run,
                delivered,
                elapsed,
            })
        } else {
            tracing::warn!(
                "Dispatched {} #{} with {} failure(s); {} notification(s) delivered",
                name,
                event.entity_id(),
                failures.len(),
                delivered
            );
            Err(DispatchFailure {
                event: name,
                delivered,
                failures,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::database::models::*;
    use crate::observer::event::EventKind;
    use crate::testing::{notifications_on, profile, project, proposal};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[tokio::test]
    async fn project_created_notifies_every_freelancer() {
        let store = Arc::new(MemoryStore::new());
        let client = profile(&store, "carol", Role::Client).await;
        let f1 = profile(&store, "fred", Role::Freelancer).await;
        let f2 = profile(&store, "fiona", Role::Freelancer).await;
        profile(&store, "nobody", Role::Unset).await;

        let dispatcher = NotificationDispatcher::with_default_observers(store.clone(), &notifications_on());
        let project = project(&store, &client, "Logo design").await;
        let report = dispatcher
            .dispatch(&DomainEvent::ProjectCreated { project })
            .await
            .unwrap();

        assert_eq!(report.delivered, 2);
        for freelancer in [&f1, &f2] {
            let inbox = store.list_notifications(Some(freelancer.id)).await.unwrap();
            assert_eq!(inbox.len(), 1);
            assert_eq!(inbox[0].message, "🆕 New project 'Logo design' has been added!");
            assert_eq!(inbox[0].link, "/freelancer-dashboard");
            assert!(!inbox[0].is_read);
        }
        assert!(store.list_notifications(Some(client.id)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn one_failing_recipient_does_not_stop_the_fan_out() {
        let store = Arc::new(MemoryStore::new());
        let client = profile(&store, "carol", Role::Client).await;
        let f1 = profile(&store, "fred", Role::Freelancer).await;
        let f2 = profile(&store, "fiona", Role::Freelancer).await;
        let f3 = profile(&store, "finn", Role::Freelancer).await;
        store.fail_notifications_for(f2.id).await;

        let dispatcher = NotificationDispatcher::with_default_observers(store.clone(), &notifications_on());
        let project = project(&store, &client, "API").await;
        let failure = dispatcher
            .dispatch(&DomainEvent::ProjectCreated { project })
            .await
            .unwrap_err();

        assert_eq!(failure.delivered, 2);
        assert_eq!(failure.failures.len(), 1);
        assert!(matches!(
            failure.failures[0].1,
            ObserverError::PartialDelivery { delivered: 2, failed: 1, .. }
        ));
        assert_eq!(store.list_notifications(Some(f1.id)).await.unwrap().len(), 1);
        assert!(store.list_notifications(Some(f2.id)).await.unwrap().is_empty());
        assert_eq!(store.list_notifications(Some(f3.id)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn proposal_created_notifies_project_owner() {
        let store = Arc::new(MemoryStore::new());
        let client = profile(&store, "carol", Role::Client).await;
        let freelancer = profile(&store, "fred", Role::Freelancer).await;
        let project = project(&store, &client, "Shop").await;
        let proposal = proposal(&store, &project, &freelancer).await;

        let dispatcher = NotificationDispatcher::with_default_observers(store.clone(), &notifications_on());
        let report = dispatcher
            .dispatch(&DomainEvent::ProposalCreated {
                proposal,
                project_owner: client.id,
                project_title: project.title.clone(),
                freelancer_name: freelancer.user_name.clone(),
            })
            .await
            .unwrap();

        assert_eq!(report.delivered, 1);
        let inbox = store.list_notifications(Some(client.id)).await.unwrap();
        assert_eq!(inbox[0].message, "📨 New proposal received from fred for 'Shop'");
        assert_eq!(inbox[0].link, "/client-dashboard");
    }

    #[tokio::test]
    async fn message_to_unknown_receiver_is_a_silent_no_op() {
        let store = Arc::new(MemoryStore::new());
        let client = profile(&store, "carol", Role::Client).await;
        let freelancer = profile(&store, "fred", Role::Freelancer).await;
        let project = project(&store, &client, "Shop").await;
        let proposal = proposal(&store, &project, &freelancer).await;
        let (contract, _) = store.get_or_create_contract(proposal.id).await.unwrap();
        let message = store
            .create_message(NewMessage {
                sender: "carol".into(),
                receiver: "ghost".into(),
                contract: contract.id,
                content: "hello?".into(),
            })
            .await
            .unwrap();

        let dispatcher = NotificationDispatcher::with_default_observers(store.clone(), &notifications_on());
        let report = dispatcher.dispatch(&DomainEvent::MessageSent { message }).await.unwrap();

        assert_eq!(report.delivered, 0);
        assert!(store.list_notifications(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn review_notifies_reviewee_once() {
        let store = Arc::new(MemoryStore::new());
        let client = profile(&store, "carol", Role::Client).await;
        let freelancer = profile(&store, "fred", Role::Freelancer).await;
        let project = project(&store, &client, "Shop").await;
        let review = store
            .create_review(NewReview {
                reviewer: client.id,
                reviewee: freelancer.id,
                project: project.id,
                rating: 4,
                comment: "Solid".into(),
            })
            .await
            .unwrap();

        let dispatcher = NotificationDispatcher::with_default_observers(store.clone(), &notifications_on());
        dispatcher
            .dispatch(&DomainEvent::ReviewCreated {
                review,
                reviewer_name: client.user_name.clone(),
                project_title: project.title.clone(),
            })
            .await
            .unwrap();

        let all = store.list_notifications(None).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].user, freelancer.id);
        assert_eq!(all[0].message, "⭐ You received a 4-star review from carol on 'Shop'");
    }

    #[tokio::test]
    async fn disabled_dispatcher_creates_nothing() {
        let store = Arc::new(MemoryStore::new());
        let client = profile(&store, "carol", Role::Client).await;
        profile(&store, "fred", Role::Freelancer).await;
        let config = NotificationConfig {
            enabled: false,
            email_placeholder: true,
        };

        let dispatcher = NotificationDispatcher::with_default_observers(store.clone(), &config);
        let project = project(&store, &client, "Quiet").await;
        let report = dispatcher
            .dispatch(&DomainEvent::ProjectCreated { project })
            .await
            .unwrap();

        assert_eq!(report.observers_run, 0);
        assert!(store.list_notifications(None).await.unwrap().is_empty());
    }

    struct Recording {
        name: &'static str,
        ring: ObserverRing,
        priority: u8,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl Observer for Recording {
        fn name(&self) -> &'static str {
            self.name
        }

        fn ring(&self) -> ObserverRing {
            self.ring
        }

        fn applies_to(&self, kind: EventKind) -> bool {
            kind == EventKind::ProjectCreated
        }

        fn priority(&self) -> u8 {
            self.priority
        }

        async fn execute(&self, _event: &DomainEvent, _store: &dyn EntityStore) -> Result<usize, ObserverError> {
            self.log.lock().unwrap().push(self.name);
            Ok(0)
        }
    }

    #[tokio::test]
    async fn observers_run_by_ring_then_priority() {
        let store = Arc::new(MemoryStore::new());
        let owner = profile(&store, "carol", Role::Client).await;
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = NotificationDispatcher::new(store.clone());

        for (name, ring, priority) in [
            ("late", ObserverRing::Notification, 90),
            ("early", ObserverRing::Notification, 10),
            ("integration", ObserverRing::Integration, 99),
        ] {
            dispatcher.register_observer(Box::new(Recording {
                name,
                ring,
                priority,
                log: log.clone(),
            }));
        }

        let project = project(&store, &owner, "Order").await;
        dispatcher
            .dispatch(&DomainEvent::ProjectCreated { project })
            .await
            .unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["integration", "early", "late"]);
    }
}
