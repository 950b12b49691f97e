use std::sync::Arc;

use thiserror::Error;

use crate::database::models::{Contract, Proposal, ProposalPatch, ProposalStatus};
use crate::database::store::{EntityStore, StoreError};

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Proposal {0} not found")]
    NotFound(i64),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Result of moving a proposal through the lifecycle
#[derive(Debug, Clone)]
pub struct Transition {
    pub proposal: Proposal,
    /// The proposal's contract, if one exists after the transition
    pub contract: Option<Contract>,
    /// True only when this call inserted the contract
    pub contract_created: bool,
}

/// Proposal status machine: pending -> accepted | rejected.
///
/// Every path that leaves a proposal accepted get-or-creates its contract,
/// so a proposal never ends up with two. Existing contract fields are never
/// touched here.
#[derive(Clone)]
pub struct ProposalLifecycle {
    store: Arc<dyn EntityStore>,
}

impl ProposalLifecycle {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn accept(&self, id: i64) -> Result<Transition, LifecycleError> {
        self.update(id, ProposalPatch::status(ProposalStatus::Accepted)).await
    }

    pub async fn reject(&self, id: i64) -> Result<Transition, LifecycleError> {
        self.update(id, ProposalPatch::status(ProposalStatus::Rejected)).await
    }

    /// Generic update path shared by PUT/PATCH and accept/reject
    pub async fn update(&self, id: i64, patch: ProposalPatch) -> Result<Transition, LifecycleError> {
        let current = self.store.get_proposal(id).await.map_err(|e| not_found_as(e, id))?;

        if let Some(next) = patch.status {
            if current.status.reopens(next) {
                tracing::warn!(
                    "Proposal {} moving from {} to {}; existing contract is left as is",
                    id,
                    current.status,
                    next
                );
            }
        }

        let proposal = self
            .store
            .update_proposal(id, patch)
            .await
            .map_err(|e| not_found_as(e, id))?;

        let (contract, contract_created) = if proposal.status == ProposalStatus::Accepted {
            let (contract, created) = self.store.get_or_create_contract(id).await?;
            if created {
                tracing::info!("Contract {} created for accepted proposal {}", contract.id, id);
            }
            (Some(contract), created)
        } else {
            (self.store.find_contract_by_proposal(id).await?, false)
        };

        tracing::debug!("Proposal {} is now {}", id, proposal.status);
        Ok(Transition {
            proposal,
            contract,
            contract_created,
        })
    }
}

fn not_found_as(err: StoreError, id: i64) -> LifecycleError {
    if err.is_not_found() {
        LifecycleError::NotFound(id)
    } else {
        LifecycleError::Store(err)
    }
}
