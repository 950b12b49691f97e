//! Seeding helpers for unit tests that run against the in-memory store.

use rust_decimal::Decimal;

use crate::config::NotificationConfig;
use crate::database::memory::MemoryStore;
use crate::database::models::*;
use crate::database::store::EntityStore;

/// Notifications on, e-mail placeholder on
pub fn notifications_on() -> NotificationConfig {
    NotificationConfig {
        enabled: true,
        email_placeholder: true,
    }
}

/// A profile named `name` (e-mail `name@example.com`), with `role` assigned
/// unless it is `Unset`.
pub async fn profile(store: &MemoryStore, name: &str, role: Role) -> Profile {
    let created = store
        .create_profile(NewProfile::new(name, format!("{}@example.com", name)))
        .await
        .unwrap();
    if role.is_assigned() {
        store.assign_role(created.id, role).await.unwrap().unwrap()
    } else {
        created
    }
}

pub async fn project(store: &MemoryStore, owner: &Profile, title: &str) -> Project {
    store
        .create_project(NewProject {
            owner: owner.id,
            title: title.into(),
            description: String::new(),
            budget: None,
            duration: None,
            skills_required: Vec::new(),
        })
        .await
        .unwrap()
}

/// A pending proposal priced at 500.00
pub async fn proposal(store: &MemoryStore, project: &Project, freelancer: &Profile) -> Proposal {
    store
        .create_proposal(NewProposal {
            project: project.id,
            freelancer: freelancer.id,
            description: "Hire me".into(),
            price: Some(Decimal::new(50000, 2)),
        })
        .await
        .unwrap()
}
