// handlers/data/contracts.rs - /api/contracts handlers

use axum::extract::{rejection::JsonRejection, Path, State};
use axum::Json;
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::{Contract, ContractPatch, ProposalStatus};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

use super::views::{reference, ContractView, Names};

#[derive(Debug, Deserialize)]
pub struct ContractCreate {
    pub proposal: i64,
    #[serde(flatten)]
    pub fields: ContractPatch,
}

/// The dates the contract ends up with, stored values filled in by the patch,
/// must not run backwards.
fn check_dates(current: Option<&Contract>, patch: &ContractPatch) -> Result<(), ApiError> {
    let start = patch.start_date.or(current.and_then(|c| c.start_date));
    let end = patch.end_date.or(current.and_then(|c| c.end_date));
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(ApiError::field_error("end_date", "End date must not precede start date."));
        }
    }
    Ok(())
}

/// GET /api/contracts
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<ContractView>> {
    let contracts = state.store.list_contracts().await?;
    let mut names = Names::new(state.store.as_ref());
    let mut views = Vec::with_capacity(contracts.len());
    for contract in contracts {
        views.push(names.contract_view(contract).await?);
    }
    Ok(ApiResponse::success(views))
}

/// POST /api/contracts
///
/// Only an accepted proposal can carry a contract, and it carries at most
/// one: an existing contract is returned (200) with the given fields
/// applied instead of a second one being created (201).
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<ContractCreate>, JsonRejection>,
) -> ApiResult<ContractView> {
    let Json(body) = payload?;
    check_dates(None, &body.fields)?;

    let proposal = reference(state.store.get_proposal(body.proposal).await, "proposal")?;
    if proposal.status != ProposalStatus::Accepted {
        return Err(ApiError::field_error(
            "proposal",
            "Proposal must be accepted before a contract is created.",
        ));
    }

    let (mut contract, created) = state.store.get_or_create_contract(proposal.id).await?;
    if !body.fields.is_empty() {
        check_dates(Some(&contract), &body.fields)?;
        contract = state.store.update_contract(contract.id, body.fields).await?;
    }

    let view = Names::new(state.store.as_ref()).contract_view(contract).await?;
    if created {
        Ok(ApiResponse::created(view))
    } else {
        Ok(ApiResponse::success(view))
    }
}

/// GET /api/contracts/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<ContractView> {
    let contract = state.store.get_contract(id).await?;
    let view = Names::new(state.store.as_ref()).contract_view(contract).await?;
    Ok(ApiResponse::success(view))
}

/// PUT/PATCH /api/contracts/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<ContractPatch>, JsonRejection>,
) -> ApiResult<ContractView> {
    let Json(patch) = payload?;
    let current = state.store.get_contract(id).await?;
    check_dates(Some(&current), &patch)?;

    let contract = state.store.update_contract(id, patch).await?;
    let view = Names::new(state.store.as_ref()).contract_view(contract).await?;
    Ok(ApiResponse::success(view))
}

/// DELETE /api/contracts/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    state.store.delete_contract(id).await?;
    Ok(ApiResponse::no_content())
}
