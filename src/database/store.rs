use async_trait::async_trait;
use thiserror::Error;

use crate::database::models::*;

/// Errors surfaced by every `EntityStore` implementation
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl StoreError {
    pub fn not_found(entity: &str, id: i64) -> Self {
        StoreError::NotFound(format!("{} {} not found", entity, id))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::Migration(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence boundary for every marketplace entity.
///
/// Lookups by id fail with `StoreError::NotFound`; `find_*` lookups return
/// `Option`. Unique and reference violations surface as `StoreError::Conflict`.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn health_check(&self) -> StoreResult<()>;

    // Accounts
    /// Creates the login account and its profile together; neither exists if this fails.
    async fn create_account(&self, account: NewAccount, profile: NewProfile) -> StoreResult<Profile>;
    async fn find_account(&self, user_name: &str) -> StoreResult<Option<Account>>;

    // Profiles
    async fn create_profile(&self, profile: NewProfile) -> StoreResult<Profile>;
    async fn get_profile(&self, id: i64) -> StoreResult<Profile>;
    async fn find_profile_by_user_name(&self, user_name: &str) -> StoreResult<Option<Profile>>;
    async fn find_profile_by_email(&self, email: &str) -> StoreResult<Option<Profile>>;
    async fn list_profiles(&self, role: Option<Role>) -> StoreResult<Vec<Profile>>;
    async fn update_profile(&self, id: i64, patch: ProfilePatch) -> StoreResult<Profile>;
    /// Sets the role only while it is still unset. `Ok(None)` means a role was
    /// already assigned and nothing changed.
    async fn assign_role(&self, id: i64, role: Role) -> StoreResult<Option<Profile>>;
    async fn delete_profile(&self, id: i64) -> StoreResult<()>;

    // Skills
    async fn create_skill(&self, skill: NewSkill) -> StoreResult<Skill>;
    async fn get_skill(&self, id: i64) -> StoreResult<Skill>;
    async fn list_skills(&self, profile: Option<i64>) -> StoreResult<Vec<Skill>>;
    async fn update_skill(&self, id: i64, patch: SkillPatch) -> StoreResult<Skill>;
    async fn delete_skill(&self, id: i64) -> StoreResult<()>;
    /// Drops every skill of the profile and inserts one per name.
    async fn replace_skills(&self, profile: i64, names: Vec<String>) -> StoreResult<Vec<Skill>>;

    // Projects
    async fn create_project(&self, project: NewProject) -> StoreResult<Project>;
    async fn get_project(&self, id: i64) -> StoreResult<Project>;
    async fn list_projects(&self) -> StoreResult<Vec<Project>>;
    async fn update_project(&self, id: i64, patch: ProjectPatch) -> StoreResult<Project>;
    async fn delete_project(&self, id: i64) -> StoreResult<()>;

    // Proposals
    async fn create_proposal(&self, proposal: NewProposal) -> StoreResult<Proposal>;
    async fn get_proposal(&self, id: i64) -> StoreResult<Proposal>;
    async fn list_proposals(&self, project: Option<i64>) -> StoreResult<Vec<Proposal>>;
    async fn update_proposal(&self, id: i64, patch: ProposalPatch) -> StoreResult<Proposal>;
    async fn delete_proposal(&self, id: i64) -> StoreResult<()>;

    // Contracts
    /// Atomic get-or-create keyed by proposal. The flag is true only when a
    /// new contract row was inserted by this call.
    async fn get_or_create_contract(&self, proposal: i64) -> StoreResult<(Contract, bool)>;
    async fn get_contract(&self, id: i64) -> StoreResult<Contract>;
    async fn find_contract_by_proposal(&self, proposal: i64) -> StoreResult<Option<Contract>>;
    async fn list_contracts(&self) -> StoreResult<Vec<Contract>>;
    async fn update_contract(&self, id: i64, patch: ContractPatch) -> StoreResult<Contract>;
    async fn delete_contract(&self, id: i64) -> StoreResult<()>;

    // Messages
    async fn create_message(&self, message: NewMessage) -> StoreResult<Message>;
    async fn get_message(&self, id: i64) -> StoreResult<Message>;
    /// Oldest first
    async fn list_messages(&self, contract: Option<i64>) -> StoreResult<Vec<Message>>;
    async fn update_message(&self, id: i64, patch: MessagePatch) -> StoreResult<Message>;
    async fn delete_message(&self, id: i64) -> StoreResult<()>;

    // Reviews
    async fn create_review(&self, review: NewReview) -> StoreResult<Review>;
    async fn get_review(&self, id: i64) -> StoreResult<Review>;
    /// Newest first
    async fn list_reviews(&self) -> StoreResult<Vec<Review>>;
    async fn update_review(&self, id: i64, patch: ReviewPatch) -> StoreResult<Review>;
    async fn delete_review(&self, id: i64) -> StoreResult<()>;

    // Notifications
    async fn create_notification(&self, notification: NewNotification) -> StoreResult<Notification>;
    async fn get_notification(&self, id: i64) -> StoreResult<Notification>;
    /// Newest first, optionally only those addressed to one profile
    async fn list_notifications(&self, user: Option<i64>) -> StoreResult<Vec<Notification>>;
    async fn update_notification(&self, id: i64, patch: NotificationPatch) -> StoreResult<Notification>;
    async fn delete_notification(&self, id: i64) -> StoreResult<()>;
}
