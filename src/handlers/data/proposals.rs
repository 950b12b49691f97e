// handlers/data/proposals.rs - /api/proposals handlers
//
// Status changes never touch the store directly; they go through the
// proposal lifecycle so an accepted proposal always has its contract.

use axum::extract::{rejection::{JsonRejection, QueryRejection}, Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::database::models::{NewProposal, ProposalPatch, ProposalStatus};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::observer::DomainEvent;
use crate::services::Transition;

use super::views::{reference, ContractView, Names, ProposalView};

#[derive(Debug, Default, Deserialize)]
pub struct ProposalQuery {
    pub project: Option<i64>,
}

/// Body of the accept and reject actions
#[derive(Debug, Serialize)]
pub struct Decision {
    pub message: String,
    pub proposal: ProposalView,
    pub contract: Option<ContractView>,
}

/// GET /api/proposals[?project=]
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ProposalQuery>, QueryRejection>,
) -> ApiResult<Vec<ProposalView>> {
    let Query(query) = query?;
    let proposals = state.store.list_proposals(query.project).await?;
    let mut names = Names::new(state.store.as_ref());
    let mut views = Vec::with_capacity(proposals.len());
    for proposal in proposals {
        views.push(names.proposal_view(proposal).await?);
    }
    Ok(ApiResponse::success(views))
}

/// POST /api/proposals - persists, then notifies the project owner
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewProposal>, JsonRejection>,
) -> ApiResult<ProposalView> {
    let Json(body) = payload?;
    if body.price.is_some_and(|p| p.is_sign_negative()) {
        return Err(ApiError::field_error("price", "Ensure this value is greater than or equal to 0."));
    }
    let project = reference(state.store.get_project(body.project).await, "project")?;
    let freelancer = reference(state.store.get_profile(body.freelancer).await, "freelancer")?;

    let proposal = state.store.create_proposal(body).await?;
    tracing::info!(
        "Proposal {} submitted by {} for project {}",
        proposal.id,
        freelancer.user_name,
        project.id
    );

    state
        .notify(DomainEvent::ProposalCreated {
            proposal: proposal.clone(),
            project_owner: project.owner,
            project_title: project.title.clone(),
            freelancer_name: freelancer.user_name.clone(),
        })
        .await;

    Ok(ApiResponse::created(ProposalView {
        proposal,
        project_title: project.title,
        freelancer_name: freelancer.user_name,
    }))
}

/// GET /api/proposals/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<ProposalView> {
    let proposal = state.store.get_proposal(id).await?;
    let view = Names::new(state.store.as_ref()).proposal_view(proposal).await?;
    Ok(ApiResponse::success(view))
}

/// PUT/PATCH /api/proposals/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<ProposalPatch>, JsonRejection>,
) -> ApiResult<ProposalView> {
    let Json(patch) = payload?;
    if patch.price.is_some_and(|p| p.is_sign_negative()) {
        return Err(ApiError::field_error("price", "Ensure this value is greater than or equal to 0."));
    }
    let transition = state.lifecycle.update(id, patch).await?;
    let view = Names::new(state.store.as_ref()).proposal_view(transition.proposal).await?;
    Ok(ApiResponse::success(view))
}

/// DELETE /api/proposals/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    state.store.delete_proposal(id).await?;
    Ok(ApiResponse::no_content())
}

/// POST /api/proposals/:id/accept
pub async fn accept(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Decision> {
    let transition = state.lifecycle.accept(id).await?;
    decision(&state, transition).await
}

/// POST /api/proposals/:id/reject
pub async fn reject(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Decision> {
    let transition = state.lifecycle.reject(id).await?;
    decision(&state, transition).await
}

async fn decision(state: &AppState, transition: Transition) -> ApiResult<Decision> {
    let mut names = Names::new(state.store.as_ref());
    let proposal = names.proposal_view(transition.proposal).await?;
    let contract = match transition.contract {
        Some(contract) => Some(names.contract_view(contract).await?),
        None => None,
    };

    let message = match proposal.proposal.status {
        ProposalStatus::Accepted => format!(
            "✅ Proposal from {} accepted for {}",
            proposal.freelancer_name, proposal.project_title
        ),
        _ => format!(
            "❌ Proposal from {} rejected for {}",
            proposal.freelancer_name, proposal.project_title
        ),
    };

    Ok(ApiResponse::success(Decision {
        message,
        proposal,
        contract,
    }))
}
