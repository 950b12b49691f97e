pub mod account_service;
pub mod proposal_lifecycle;

pub use account_service::{AccountError, AccountService};
pub use proposal_lifecycle::{LifecycleError, ProposalLifecycle, Transition};
