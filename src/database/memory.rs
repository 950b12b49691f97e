use std::collections::{BTreeMap, HashMap};
#[cfg(test)]
use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::database::models::*;
use crate::database::store::{EntityStore, StoreError, StoreResult};

#[derive(Default)]
struct Tables {
    next_id: HashMap<&'static str, i64>,
    accounts: HashMap<String, Account>,
    profiles: BTreeMap<i64, Profile>,
    skills: BTreeMap<i64, Skill>,
    projects: BTreeMap<i64, Project>,
    proposals: BTreeMap<i64, Proposal>,
    contracts: BTreeMap<i64, Contract>,
    messages: BTreeMap<i64, Message>,
    reviews: BTreeMap<i64, Review>,
    notifications: BTreeMap<i64, Notification>,
    #[cfg(test)]
    failing_recipients: HashSet<i64>,
}

impl Tables {
    fn allocate(&mut self, table: &'static str) -> i64 {
        let next = self.next_id.entry(table).or_insert(0);
        *next += 1;
        *next
    }

    fn require_profile(&self, id: i64, field: &str) -> StoreResult<()> {
        if self.profiles.contains_key(&id) {
            Ok(())
        } else {
            Err(reference_missing(field, "profile", id))
        }
    }

    fn require_project(&self, id: i64) -> StoreResult<()> {
        if self.projects.contains_key(&id) {
            Ok(())
        } else {
            Err(reference_missing("project", "project", id))
        }
    }

    #[cfg(test)]
    fn rejects_notifications_for(&self, user: i64) -> bool {
        self.failing_recipients.contains(&user)
    }

    #[cfg(not(test))]
    fn rejects_notifications_for(&self, _user: i64) -> bool {
        false
    }

    fn user_name_taken(&self, user_name: &str, except: Option<i64>) -> bool {
        self.profiles
            .values()
            .any(|p| p.user_name == user_name && Some(p.id) != except)
    }

    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.profiles
            .values()
            .any(|p| p.email == email && Some(p.id) != except)
    }

    fn insert_profile(&mut self, profile: NewProfile) -> StoreResult<Profile> {
        if self.user_name_taken(&profile.user_name, None) {
            return Err(StoreError::Conflict(format!("user_name {} already exists", profile.user_name)));
        }
        if self.email_taken(&profile.email, None) {
            return Err(StoreError::Conflict(format!("email {} already exists", profile.email)));
        }

        let id = self.allocate("profiles");
        let created = Profile {
            id,
            user_name: profile.user_name,
            email: profile.email,
            bio: profile.bio,
            portfolio: profile.portfolio,
            hourly_rate: profile.hourly_rate,
            availability: profile.availability,
            role: Role::Unset,
            created_at: Utc::now(),
        };
        self.profiles.insert(id, created.clone());
        Ok(created)
    }

    fn insert_skill(&mut self, profile: i64, name: String, level: Option<String>) -> Skill {
        let id = self.allocate("skills");
        let skill = Skill {
            id,
            profile,
            name,
            level,
        };
        self.skills.insert(id, skill.clone());
        skill
    }
}

fn reference_missing(field: &str, entity: &str, id: i64) -> StoreError {
    StoreError::Conflict(format!("{} references missing {} {}", field, entity, id))
}

fn still_referenced(entity: &str, id: i64, by: &str) -> StoreError {
    StoreError::Conflict(format!("{} {} is still referenced by {}", entity, id, by))
}

/// In-process `EntityStore` with the same uniqueness and reference rules as
/// the Postgres schema. Used for tests and `STORE_BACKEND=memory`.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every notification addressed to `profile` fail to insert
    #[cfg(test)]
    pub(crate) async fn fail_notifications_for(&self, profile: i64) {
        self.tables.write().await.failing_recipients.insert(profile);
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    // ---------------------- ACCOUNTS ----------------------

    async fn create_account(&self, account: NewAccount, profile: NewProfile) -> StoreResult<Profile> {
        let mut tables = self.tables.write().await;

        if tables.accounts.contains_key(&account.user_name) {
            return Err(StoreError::Conflict(format!("account {} already exists", account.user_name)));
        }
        if tables.accounts.values().any(|a| a.email == account.email) {
            return Err(StoreError::Conflict(format!("email {} already exists", account.email)));
        }

        let created = tables.insert_profile(profile)?;
        tables.accounts.insert(
            account.user_name.clone(),
            Account {
                user_name: account.user_name,
                email: account.email,
                password_hash: account.password_hash,
            },
        );
        Ok(created)
    }

    async fn find_account(&self, user_name: &str) -> StoreResult<Option<Account>> {
        Ok(self.tables.read().await.accounts.get(user_name).cloned())
    }

    // ---------------------- PROFILES ----------------------

    async fn create_profile(&self, profile: NewProfile) -> StoreResult<Profile> {
        self.tables.write().await.insert_profile(profile)
    }

    async fn get_profile(&self, id: i64) -> StoreResult<Profile> {
        self.tables
            .read()
            .await
            .profiles
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Profile", id))
    }

    async fn find_profile_by_user_name(&self, user_name: &str) -> StoreResult<Option<Profile>> {
        let tables = self.tables.read().await;
        Ok(tables.profiles.values().find(|p| p.user_name == user_name).cloned())
    }

    async fn find_profile_by_email(&self, email: &str) -> StoreResult<Option<Profile>> {
        let tables = self.tables.read().await;
        Ok(tables.profiles.values().find(|p| p.email == email).cloned())
    }

    async fn list_profiles(&self, role: Option<Role>) -> StoreResult<Vec<Profile>> {
        let tables = self.tables.read().await;
        Ok(tables
            .profiles
            .values()
            .filter(|p| role.map_or(true, |r| p.role == r))
            .cloned()
            .collect())
    }

    async fn update_profile(&self, id: i64, patch: ProfilePatch) -> StoreResult<Profile> {
        let mut tables = self.tables.write().await;

        if let Some(user_name) = &patch.user_name {
            if tables.user_name_taken(user_name, Some(id)) {
                return Err(StoreError::Conflict(format!("user_name {} already exists", user_name)));
            }
        }
        if let Some(email) = &patch.email {
            if tables.email_taken(email, Some(id)) {
                return Err(StoreError::Conflict(format!("email {} already exists", email)));
            }
        }

        let previous_name = tables
            .profiles
            .get(&id)
            .map(|p| p.user_name.clone())
            .ok_or_else(|| StoreError::not_found("Profile", id))?;
        if let Some(user_name) = &patch.user_name {
            if *user_name != previous_name
                && tables.accounts.contains_key(&previous_name)
                && tables.accounts.contains_key(user_name)
            {
                return Err(StoreError::Conflict(format!("account {} already exists", user_name)));
            }
        }
        if let Some(email) = &patch.email {
            let clash = tables
                .accounts
                .iter()
                .any(|(name, a)| *name != previous_name && a.email == *email);
            if clash && tables.accounts.contains_key(&previous_name) {
                return Err(StoreError::Conflict(format!("email {} already exists", email)));
            }
        }

        let profile = tables
            .profiles
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Profile", id))?;
        profile.apply(patch);
        let updated = profile.clone();

        // The login account follows its profile's name and e-mail
        if let Some(mut account) = tables.accounts.remove(&previous_name) {
            account.user_name = updated.user_name.clone();
            account.email = updated.email.clone();
            tables.accounts.insert(account.user_name.clone(), account);
        }
        Ok(updated)
    }

    async fn assign_role(&self, id: i64, role: Role) -> StoreResult<Option<Profile>> {
        let mut tables = self.tables.write().await;
        let profile = tables
            .profiles
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Profile", id))?;

        if profile.role.is_assigned() {
            return Ok(None);
        }
        profile.role = role;
        Ok(Some(profile.clone()))
    }

    async fn delete_profile(&self, id: i64) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.profiles.contains_key(&id) {
            return Err(StoreError::not_found("Profile", id));
        }

        if tables.projects.values().any(|p| p.owner == id) {
            return Err(still_referenced("profile", id, "projects"));
        }
        if tables.proposals.values().any(|p| p.freelancer == id) {
            return Err(still_referenced("profile", id, "proposals"));
        }
        if tables.reviews.values().any(|r| r.reviewer == id || r.reviewee == id) {
            return Err(still_referenced("profile", id, "reviews"));
        }

        tables.skills.retain(|_, s| s.profile != id);
        tables.notifications.retain(|_, n| n.user != id);
        tables.profiles.remove(&id);
        Ok(())
    }

    // ---------------------- SKILLS ----------------------

    async fn create_skill(&self, skill: NewSkill) -> StoreResult<Skill> {
        let mut tables = self.tables.write().await;
        tables.require_profile(skill.profile, "profile")?;
        Ok(tables.insert_skill(skill.profile, skill.name.trim().to_string(), skill.level))
    }

    async fn get_skill(&self, id: i64) -> StoreResult<Skill> {
        self.tables
            .read()
            .await
            .skills
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Skill", id))
    }

    async fn list_skills(&self, profile: Option<i64>) -> StoreResult<Vec<Skill>> {
        let tables = self.tables.read().await;
        Ok(tables
            .skills
            .values()
            .filter(|s| profile.map_or(true, |p| s.profile == p))
            .cloned()
            .collect())
    }

    async fn update_skill(&self, id: i64, patch: SkillPatch) -> StoreResult<Skill> {
        let mut tables = self.tables.write().await;
        let skill = tables
            .skills
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Skill", id))?;
        skill.apply(patch);
        Ok(skill.clone())
    }

    async fn delete_skill(&self, id: i64) -> StoreResult<()> {
        self.tables
            .write()
            .await
            .skills
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("Skill", id))
    }

    async fn replace_skills(&self, profile: i64, names: Vec<String>) -> StoreResult<Vec<Skill>> {
        let mut tables = self.tables.write().await;
        if !tables.profiles.contains_key(&profile) {
            return Err(StoreError::not_found("Profile", profile));
        }

        tables.skills.retain(|_, s| s.profile != profile);
        Ok(skill::clean_skill_names(&names)
            .into_iter()
            .map(|name| tables.insert_skill(profile, name, None))
            .collect())
    }

    // ---------------------- PROJECTS ----------------------

    async fn create_project(&self, project: NewProject) -> StoreResult<Project> {
        let mut tables = self.tables.write().await;
        tables.require_profile(project.owner, "owner")?;

        let id = tables.allocate("projects");
        let created = Project {
            id,
            owner: project.owner,
            title: project.title,
            description: project.description,
            budget: project.budget,
            duration: project.duration,
            skills_required: skill::clean_skill_names(&project.skills_required),
            created_at: Utc::now(),
        };
        tables.projects.insert(id, created.clone());
        Ok(created)
    }

    async fn get_project(&self, id: i64) -> StoreResult<Project> {
        self.tables
            .read()
            .await
            .projects
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Project", id))
    }

    async fn list_projects(&self) -> StoreResult<Vec<Project>> {
        Ok(self.tables.read().await.projects.values().cloned().collect())
    }

    async fn update_project(&self, id: i64, mut patch: ProjectPatch) -> StoreResult<Project> {
        patch.skills_required = patch.skills_required.map(|names| skill::clean_skill_names(&names));

        let mut tables = self.tables.write().await;
        let project = tables
            .projects
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Project", id))?;
        project.apply(patch);
        Ok(project.clone())
    }

    async fn delete_project(&self, id: i64) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.projects.contains_key(&id) {
            return Err(StoreError::not_found("Project", id));
        }
        if tables.proposals.values().any(|p| p.project == id) {
            return Err(still_referenced("project", id, "proposals"));
        }
        if tables.reviews.values().any(|r| r.project == id) {
            return Err(still_referenced("project", id, "reviews"));
        }
        tables.projects.remove(&id);
        Ok(())
    }

    // ---------------------- PROPOSALS ----------------------

    async fn create_proposal(&self, proposal: NewProposal) -> StoreResult<Proposal> {
        let mut tables = self.tables.write().await;
        tables.require_project(proposal.project)?;
        tables.require_profile(proposal.freelancer, "freelancer")?;

        let id = tables.allocate("proposals");
        let created = Proposal {
            id,
            project: proposal.project,
            freelancer: proposal.freelancer,
            description: proposal.description,
            price: proposal.price,
            status: ProposalStatus::Pending,
            created_at: Utc::now(),
        };
        tables.proposals.insert(id, created.clone());
        Ok(created)
    }

    async fn get_proposal(&self, id: i64) -> StoreResult<Proposal> {
        self.tables
            .read()
            .await
            .proposals
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Proposal", id))
    }

    async fn list_proposals(&self, project: Option<i64>) -> StoreResult<Vec<Proposal>> {
        let tables = self.tables.read().await;
        Ok(tables
            .proposals
            .values()
            .filter(|p| project.map_or(true, |id| p.project == id))
            .cloned()
            .collect())
    }

    async fn update_proposal(&self, id: i64, patch: ProposalPatch) -> StoreResult<Proposal> {
        let mut tables = self.tables.write().await;
        let proposal = tables
            .proposals
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Proposal", id))?;
        proposal.apply(patch);
        Ok(proposal.clone())
    }

    async fn delete_proposal(&self, id: i64) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.proposals.contains_key(&id) {
            return Err(StoreError::not_found("Proposal", id));
        }
        if tables.contracts.values().any(|c| c.proposal == id) {
            return Err(still_referenced("proposal", id, "a contract"));
        }
        tables.proposals.remove(&id);
        Ok(())
    }

    // ---------------------- CONTRACTS ----------------------

    async fn get_or_create_contract(&self, proposal: i64) -> StoreResult<(Contract, bool)> {
        let mut tables = self.tables.write().await;
        if !tables.proposals.contains_key(&proposal) {
            return Err(reference_missing("proposal", "proposal", proposal));
        }

        if let Some(existing) = tables.contracts.values().find(|c| c.proposal == proposal) {
            return Ok((existing.clone(), false));
        }

        let id = tables.allocate("contracts");
        let created = Contract {
            id,
            proposal,
            start_date: None,
            end_date: None,
            status: None,
            terms: None,
            created_at: Utc::now(),
        };
        tables.contracts.insert(id, created.clone());
        Ok((created, true))
    }

    async fn get_contract(&self, id: i64) -> StoreResult<Contract> {
        self.tables
            .read()
            .await
            .contracts
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Contract", id))
    }

    async fn find_contract_by_proposal(&self, proposal: i64) -> StoreResult<Option<Contract>> {
        let tables = self.tables.read().await;
        Ok(tables.contracts.values().find(|c| c.proposal == proposal).cloned())
    }

    async fn list_contracts(&self) -> StoreResult<Vec<Contract>> {
        Ok(self.tables.read().await.contracts.values().cloned().collect())
    }

    async fn update_contract(&self, id: i64, patch: ContractPatch) -> StoreResult<Contract> {
        let mut tables = self.tables.write().await;
        let contract = tables
            .contracts
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Contract", id))?;
        contract.apply(patch);
        Ok(contract.clone())
    }

    async fn delete_contract(&self, id: i64) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.contracts.contains_key(&id) {
            return Err(StoreError::not_found("Contract", id));
        }
        if tables.messages.values().any(|m| m.contract == id) {
            return Err(still_referenced("contract", id, "messages"));
        }
        tables.contracts.remove(&id);
        Ok(())
    }

    // ---------------------- MESSAGES ----------------------

    async fn create_message(&self, message: NewMessage) -> StoreResult<Message> {
        let mut tables = self.tables.write().await;
        if !tables.contracts.contains_key(&message.contract) {
            return Err(reference_missing("contract", "contract", message.contract));
        }

        let id = tables.allocate("messages");
        let created = Message {
            id,
            sender: message.sender,
            receiver: message.receiver,
            contract: message.contract,
            content: message.content,
            timestamp: Utc::now(),
        };
        tables.messages.insert(id, created.clone());
        Ok(created)
    }

    async fn get_message(&self, id: i64) -> StoreResult<Message> {
        self.tables
            .read()
            .await
            .messages
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Message", id))
    }

    async fn list_messages(&self, contract: Option<i64>) -> StoreResult<Vec<Message>> {
        let tables = self.tables.read().await;
        let mut messages: Vec<Message> = tables
            .messages
            .values()
            .filter(|m| contract.map_or(true, |id| m.contract == id))
            .cloned()
            .collect();
        messages.sort_by_key(|m| (m.timestamp, m.id));
        Ok(messages)
    }

    async fn update_message(&self, id: i64, patch: MessagePatch) -> StoreResult<Message> {
        let mut tables = self.tables.write().await;
        let message = tables
            .messages
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Message", id))?;
        message.apply(patch);
        Ok(message.clone())
    }

    async fn delete_message(&self, id: i64) -> StoreResult<()> {
        self.tables
            .write()
            .await
            .messages
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("Message", id))
    }

    // ---------------------- REVIEWS ----------------------

    async fn create_review(&self, review: NewReview) -> StoreResult<Review> {
        let mut tables = self.tables.write().await;
        tables.require_profile(review.reviewer, "reviewer")?;
        tables.require_profile(review.reviewee, "reviewee")?;
        tables.require_project(review.project)?;
        if !review.rating_in_range() {
            return Err(StoreError::Conflict(format!("rating {} out of range", review.rating)));
        }

        let id = tables.allocate("reviews");
        let created = Review {
            id,
            reviewer: review.reviewer,
            reviewee: review.reviewee,
            project: review.project,
            rating: review.rating,
            comment: review.comment,
            created_at: Utc::now(),
        };
        tables.reviews.insert(id, created.clone());
        Ok(created)
    }

    async fn get_review(&self, id: i64) -> StoreResult<Review> {
        self.tables
            .read()
            .await
            .reviews
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Review", id))
    }

    async fn list_reviews(&self) -> StoreResult<Vec<Review>> {
        Ok(self.tables.read().await.reviews.values().rev().cloned().collect())
    }

    async fn update_review(&self, id: i64, patch: ReviewPatch) -> StoreResult<Review> {
        if !patch.rating_in_range() {
            return Err(StoreError::Conflict(format!("rating {:?} out of range", patch.rating)));
        }
        let mut tables = self.tables.write().await;
        let review = tables
            .reviews
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Review", id))?;
        review.apply(patch);
        Ok(review.clone())
    }

    async fn delete_review(&self, id: i64) -> StoreResult<()> {
        self.tables
            .write()
            .await
            .reviews
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("Review", id))
    }

    // ---------------------- NOTIFICATIONS ----------------------

    async fn create_notification(&self, notification: NewNotification) -> StoreResult<Notification> {
        let mut tables = self.tables.write().await;
        tables.require_profile(notification.user, "user")?;

        if tables.rejects_notifications_for(notification.user) {
            return Err(StoreError::Conflict(format!(
                "notifications to profile {} are rejected",
                notification.user
            )));
        }

        let id = tables.allocate("notifications");
        let created = Notification {
            id,
            user: notification.user,
            message: notification.message,
            link: notification.link,
            is_read: false,
            created_at: Utc::now(),
        };
        tables.notifications.insert(id, created.clone());
        Ok(created)
    }

    async fn get_notification(&self, id: i64) -> StoreResult<Notification> {
        self.tables
            .read()
            .await
            .notifications
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Notification", id))
    }

    async fn list_notifications(&self, user: Option<i64>) -> StoreResult<Vec<Notification>> {
        let tables = self.tables.read().await;
        let mut notifications: Vec<Notification> = tables
            .notifications
            .values()
            .filter(|n| user.map_or(true, |id| n.user == id))
            .cloned()
            .collect();
        notifications.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(notifications)
    }

    async fn update_notification(&self, id: i64, patch: NotificationPatch) -> StoreResult<Notification> {
        let mut tables = self.tables.write().await;
        let notification = tables
            .notifications
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Notification", id))?;
        if let Some(is_read) = patch.is_read {
            notification.is_read = is_read;
        }
        Ok(notification.clone())
    }

    async fn delete_notification(&self, id: i64) -> StoreResult<()> {
        self.tables
            .write()
            .await
            .notifications
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("Notification", id))
    }
}
