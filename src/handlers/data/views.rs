// Read views: entities plus the display names clients render next to them
use std::collections::HashMap;

use serde::Serialize;

use crate::database::models::*;
use crate::database::store::{EntityStore, StoreError, StoreResult};
use crate::error::ApiError;

/// Per-request cache of referenced rows, so list views don't refetch the
/// same profile or project for every item.
pub struct Names<'a> {
    store: &'a dyn EntityStore,
    profiles: HashMap<i64, String>,
    projects: HashMap<i64, Project>,
    proposals: HashMap<i64, Proposal>,
}

impl<'a> Names<'a> {
    pub fn new(store: &'a dyn EntityStore) -> Self {
        Self {
            store,
            profiles: HashMap::new(),
            projects: HashMap::new(),
            proposals: HashMap::new(),
        }
    }

    pub async fn profile_name(&mut self, id: i64) -> StoreResult<String> {
        if let Some(name) = self.profiles.get(&id) {
            return Ok(name.clone());
        }
        let name = self.store.get_profile(id).await?.user_name;
        self.profiles.insert(id, name.clone());
        Ok(name)
    }

    pub async fn project(&mut self, id: i64) -> StoreResult<Project> {
        if let Some(project) = self.projects.get(&id) {
            return Ok(project.clone());
        }
        let project = self.store.get_project(id).await?;
        self.projects.insert(id, project.clone());
        Ok(project)
    }

    pub async fn proposal(&mut self, id: i64) -> StoreResult<Proposal> {
        if let Some(proposal) = self.proposals.get(&id) {
            return Ok(proposal.clone());
        }
        let proposal = self.store.get_proposal(id).await?;
        self.proposals.insert(id, proposal.clone());
        Ok(proposal)
    }

    pub async fn proposal_view(&mut self, proposal: Proposal) -> StoreResult<ProposalView> {
        let project_title = self.project(proposal.project).await?.title;
        let freelancer_name = self.profile_name(proposal.freelancer).await?;
        Ok(ProposalView {
            proposal,
            project_title,
            freelancer_name,
        })
    }

    pub async fn contract_view(&mut self, contract: Contract) -> StoreResult<ContractView> {
        let proposal = self.proposal(contract.proposal).await?;
        let project = self.project(proposal.project).await?;
        let freelancer_name = self.profile_name(proposal.freelancer).await?;
        let client_name = self.profile_name(project.owner).await?;
        Ok(ContractView {
            contract,
            project_title: project.title,
            freelancer_name,
            client_name,
        })
    }

    pub async fn review_view(&mut self, review: Review) -> StoreResult<ReviewView> {
        let reviewer_name = self.profile_name(review.reviewer).await?;
        let reviewee_name = self.profile_name(review.reviewee).await?;
        let project_title = self.project(review.project).await?.title;
        Ok(ReviewView {
            review,
            reviewer_name,
            reviewee_name,
            project_title,
        })
    }

    pub async fn notification_view(&mut self, notification: Notification) -> StoreResult<NotificationView> {
        let user_name = self.profile_name(notification.user).await?;
        Ok(NotificationView { notification, user_name })
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileView {
    #[serde(flatten)]
    pub profile: Profile,
    pub skills: Vec<Skill>,
}

#[derive(Debug, Serialize)]
pub struct ProposalView {
    #[serde(flatten)]
    pub proposal: Proposal,
    pub project_title: String,
    pub freelancer_name: String,
}

#[derive(Debug, Serialize)]
pub struct ContractView {
    #[serde(flatten)]
    pub contract: Contract,
    pub project_title: String,
    pub freelancer_name: String,
    pub client_name: String,
}

#[derive(Debug, Serialize)]
pub struct ReviewView {
    #[serde(flatten)]
    pub review: Review,
    pub reviewer_name: String,
    pub reviewee_name: String,
    pub project_title: String,
}

#[derive(Debug, Serialize)]
pub struct NotificationView {
    #[serde(flatten)]
    pub notification: Notification,
    pub user_name: String,
}

/// A create body points at a row that does not exist: 400 naming the field
pub fn reference<T>(result: StoreResult<T>, field: &str) -> Result<T, ApiError> {
    match result {
        Err(StoreError::NotFound(msg)) => Err(ApiError::field_error(field, msg)),
        other => other.map_err(ApiError::from),
    }
}

/// Reject blank strings in required text fields
pub fn non_blank(value: &str, field: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        Err(ApiError::field_error(field, "This field may not be blank."))
    } else {
        Ok(())
    }
}
