use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseManager;
use crate::database::models::*;
use crate::database::store::{EntityStore, StoreError, StoreResult};

/// `EntityStore` backed by PostgreSQL
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Unique and foreign-key violations become conflicts; anything else stays a driver error.
fn map_write_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        match db.code().as_deref() {
            Some("23505") | Some("23503") => return StoreError::Conflict(db.message().to_string()),
            _ => {}
        }
    }
    StoreError::Sqlx(err)
}

fn expect_deleted(rows: u64, entity: &str, id: i64) -> StoreResult<()> {
    if rows == 0 {
        Err(StoreError::not_found(entity, id))
    } else {
        Ok(())
    }
}

#[async_trait]
impl EntityStore for PgStore {
    async fn health_check(&self) -> StoreResult<()> {
        DatabaseManager::health_check(&self.pool).await
    }

    // ---------------------- ACCOUNTS ----------------------

    async fn create_account(&self, account: NewAccount, profile: NewProfile) -> StoreResult<Profile> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO accounts (user_name, email, password_hash) VALUES ($1, $2, $3)")
            .bind(&account.user_name)
            .bind(&account.email)
            .bind(&account.password_hash)
            .execute(&mut *tx)
            .await
            .map_err(map_write_error)?;

        let created = sqlx::query_as::<_, Profile>(
            "INSERT INTO profiles (user_name, email, bio, portfolio, hourly_rate, availability)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(&profile.user_name)
        .bind(&profile.email)
        .bind(&profile.bio)
        .bind(&profile.portfolio)
        .bind(profile.hourly_rate)
        .bind(&profile.availability)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_write_error)?;

        tx.commit().await?;
        Ok(created)
    }

    async fn find_account(&self, user_name: &str) -> StoreResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE user_name = $1")
            .bind(user_name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    // ---------------------- PROFILES ----------------------

    async fn create_profile(&self, profile: NewProfile) -> StoreResult<Profile> {
        sqlx::query_as::<_, Profile>(
            "INSERT INTO profiles (user_name, email, bio, portfolio, hourly_rate, availability)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(&profile.user_name)
        .bind(&profile.email)
        .bind(&profile.bio)
        .bind(&profile.portfolio)
        .bind(profile.hourly_rate)
        .bind(&profile.availability)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    async fn get_profile(&self, id: i64) -> StoreResult<Profile> {
        sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("Profile", id))
    }

    async fn find_profile_by_user_name(&self, user_name: &str) -> StoreResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_name = $1")
            .bind(user_name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    async fn find_profile_by_email(&self, email: &str) -> StoreResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    async fn list_profiles(&self, role: Option<Role>) -> StoreResult<Vec<Profile>> {
        let profiles = sqlx::query_as::<_, Profile>(
            "SELECT * FROM profiles WHERE ($1::text IS NULL OR role = $1) ORDER BY id",
        )
        .bind(role.map(|r| r.as_str()))
        .fetch_all(&self.pool)
        .await?;
        Ok(profiles)
    }

    async fn update_profile(&self, id: i64, patch: ProfilePatch) -> StoreResult<Profile> {
        let mut tx = self.pool.begin().await?;

        let (previous_name,): (String,) = sqlx::query_as("SELECT user_name FROM profiles WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::not_found("Profile", id))?;

        let updated = sqlx::query_as::<_, Profile>(
            "UPDATE profiles SET
                user_name = COALESCE($2, user_name),
                email = COALESCE($3, email),
                bio = COALESCE($4, bio),
                portfolio = COALESCE($5, portfolio),
                hourly_rate = COALESCE($6, hourly_rate),
                availability = COALESCE($7, availability)
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(patch.user_name)
        .bind(patch.email)
        .bind(patch.bio)
        .bind(patch.portfolio)
        .bind(patch.hourly_rate)
        .bind(patch.availability)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_write_error)?;

        // The login account follows its profile's name and e-mail
        sqlx::query("UPDATE accounts SET user_name = $2, email = $3 WHERE user_name = $1")
            .bind(&previous_name)
            .bind(&updated.user_name)
            .bind(&updated.email)
            .execute(&mut *tx)
            .await
            .map_err(map_write_error)?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn assign_role(&self, id: i64, role: Role) -> StoreResult<Option<Profile>> {
        let updated = sqlx::query_as::<_, Profile>(
            "UPDATE profiles SET role = $2 WHERE id = $1 AND role = 'unset' RETURNING *",
        )
        .bind(id)
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(profile) => Ok(Some(profile)),
            // Either the row is missing or its role was already set
            None => self.get_profile(id).await.map(|_| None),
        }
    }

    async fn delete_profile(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_write_error)?;
        expect_deleted(result.rows_affected(), "Profile", id)
    }

    // ---------------------- SKILLS ----------------------

    async fn create_skill(&self, skill: NewSkill) -> StoreResult<Skill> {
        sqlx::query_as::<_, Skill>(
            "INSERT INTO skills (profile_id, name, level) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(skill.profile)
        .bind(skill.name.trim())
        .bind(skill.level)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    async fn get_skill(&self, id: i64) -> StoreResult<Skill> {
        sqlx::query_as::<_, Skill>("SELECT * FROM skills WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("Skill", id))
    }

    async fn list_skills(&self, profile: Option<i64>) -> StoreResult<Vec<Skill>> {
        let skills = sqlx::query_as::<_, Skill>(
            "SELECT * FROM skills WHERE ($1::bigint IS NULL OR profile_id = $1) ORDER BY id",
        )
        .bind(profile)
        .fetch_all(&self.pool)
        .await?;
        Ok(skills)
    }

    async fn update_skill(&self, id: i64, patch: SkillPatch) -> StoreResult<Skill> {
        sqlx::query_as::<_, Skill>(
            "UPDATE skills SET name = COALESCE($2, name), level = COALESCE($3, level)
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.level)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("Skill", id))
    }

    async fn delete_skill(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM skills WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_deleted(result.rows_affected(), "Skill", id)
    }

    async fn replace_skills(&self, profile: i64, names: Vec<String>) -> StoreResult<Vec<Skill>> {
        self.get_profile(profile).await?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM skills WHERE profile_id = $1")
            .bind(profile)
            .execute(&mut *tx)
            .await?;

        let mut skills = Vec::with_capacity(names.len());
        for name in skill::clean_skill_names(&names) {
            let skill = sqlx::query_as::<_, Skill>(
                "INSERT INTO skills (profile_id, name) VALUES ($1, $2) RETURNING *",
            )
            .bind(profile)
            .bind(name)
            .fetch_one(&mut *tx)
            .await?;
            skills.push(skill);
        }

        tx.commit().await?;
        Ok(skills)
    }

    // ---------------------- PROJECTS ----------------------

    async fn create_project(&self, project: NewProject) -> StoreResult<Project> {
        sqlx::query_as::<_, Project>(
            "INSERT INTO projects (owner_id, title, description, budget, duration, skills_required)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(project.owner)
        .bind(project.title)
        .bind(project.description)
        .bind(project.budget)
        .bind(project.duration)
        .bind(skill::clean_skill_names(&project.skills_required))
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    async fn get_project(&self, id: i64) -> StoreResult<Project> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("Project", id))
    }

    async fn list_projects(&self) -> StoreResult<Vec<Project>> {
        let projects = sqlx::query_as::<_, Project>("SELECT * FROM projects ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(projects)
    }

    async fn update_project(&self, id: i64, patch: ProjectPatch) -> StoreResult<Project> {
        sqlx::query_as::<_, Project>(
            "UPDATE projects SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                budget = COALESCE($4, budget),
                duration = COALESCE($5, duration),
                skills_required = COALESCE($6, skills_required)
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(patch.title)
        .bind(patch.description)
        .bind(patch.budget)
        .bind(patch.duration)
        .bind(patch.skills_required.map(|names| skill::clean_skill_names(&names)))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("Project", id))
    }

    async fn delete_project(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_write_error)?;
        expect_deleted(result.rows_affected(), "Project", id)
    }

    // ---------------------- PROPOSALS ----------------------

    async fn create_proposal(&self, proposal: NewProposal) -> StoreResult<Proposal> {
        sqlx::query_as::<_, Proposal>(
            "INSERT INTO proposals (project_id, freelancer_id, description, price)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(proposal.project)
        .bind(proposal.freelancer)
        .bind(proposal.description)
        .bind(proposal.price)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    async fn get_proposal(&self, id: i64) -> StoreResult<Proposal> {
        sqlx::query_as::<_, Proposal>("SELECT * FROM proposals WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("Proposal", id))
    }

    async fn list_proposals(&self, project: Option<i64>) -> StoreResult<Vec<Proposal>> {
        let proposals = sqlx::query_as::<_, Proposal>(
            "SELECT * FROM proposals WHERE ($1::bigint IS NULL OR project_id = $1) ORDER BY id",
        )
        .bind(project)
        .fetch_all(&self.pool)
        .await?;
        Ok(proposals)
    }

    async fn update_proposal(&self, id: i64, patch: ProposalPatch) -> StoreResult<Proposal> {
        sqlx::query_as::<_, Proposal>(
            "UPDATE proposals SET
                description = COALESCE($2, description),
                price = COALESCE($3, price),
                status = COALESCE($4, status)
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(patch.description)
        .bind(patch.price)
        .bind(patch.status.map(|s| s.as_str()))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("Proposal", id))
    }

    async fn delete_proposal(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM proposals WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_write_error)?;
        expect_deleted(result.rows_affected(), "Proposal", id)
    }

    // ---------------------- CONTRACTS ----------------------

    async fn get_or_create_contract(&self, proposal: i64) -> StoreResult<(Contract, bool)> {
        let inserted = sqlx::query_as::<_, Contract>(
            "INSERT INTO contracts (proposal_id) VALUES ($1)
             ON CONFLICT (proposal_id) DO NOTHING
             RETURNING *",
        )
        .bind(proposal)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;

        if let Some(contract) = inserted {
            return Ok((contract, true));
        }

        let existing = sqlx::query_as::<_, Contract>("SELECT * FROM contracts WHERE proposal_id = $1")
            .bind(proposal)
            .fetch_one(&self.pool)
            .await?;
        Ok((existing, false))
    }

    async fn get_contract(&self, id: i64) -> StoreResult<Contract> {
        sqlx::query_as::<_, Contract>("SELECT * FROM contracts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("Contract", id))
    }

    async fn find_contract_by_proposal(&self, proposal: i64) -> StoreResult<Option<Contract>> {
        let contract = sqlx::query_as::<_, Contract>("SELECT * FROM contracts WHERE proposal_id = $1")
            .bind(proposal)
            .fetch_optional(&self.pool)
            .await?;
        Ok(contract)
    }

    async fn list_contracts(&self) -> StoreResult<Vec<Contract>> {
        let contracts = sqlx::query_as::<_, Contract>("SELECT * FROM contracts ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(contracts)
    }

    async fn update_contract(&self, id: i64, patch: ContractPatch) -> StoreResult<Contract> {
        sqlx::query_as::<_, Contract>(
            "UPDATE contracts SET
                start_date = COALESCE($2, start_date),
                end_date = COALESCE($3, end_date),
                status = COALESCE($4, status),
                terms = COALESCE($5, terms)
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(patch.start_date)
        .bind(patch.end_date)
        .bind(patch.status.map(|s| s.as_str()))
        .bind(patch.terms)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("Contract", id))
    }

    async fn delete_contract(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM contracts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_write_error)?;
        expect_deleted(result.rows_affected(), "Contract", id)
    }

    // ---------------------- MESSAGES ----------------------

    async fn create_message(&self, message: NewMessage) -> StoreResult<Message> {
        sqlx::query_as::<_, Message>(
            "INSERT INTO messages (sender, receiver, contract_id, content)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(message.sender)
        .bind(message.receiver)
        .bind(message.contract)
        .bind(message.content)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    async fn get_message(&self, id: i64) -> StoreResult<Message> {
        sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("Message", id))
    }

    async fn list_messages(&self, contract: Option<i64>) -> StoreResult<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            "SELECT * FROM messages WHERE ($1::bigint IS NULL OR contract_id = $1) ORDER BY timestamp, id",
        )
        .bind(contract)
        .fetch_all(&self.pool)
        .await?;
        Ok(messages)
    }

    async fn update_message(&self, id: i64, patch: MessagePatch) -> StoreResult<Message> {
        sqlx::query_as::<_, Message>(
            "UPDATE messages SET
                sender = COALESCE($2, sender),
                receiver = COALESCE($3, receiver),
                content = COALESCE($4, content)
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(patch.sender)
        .bind(patch.receiver)
        .bind(patch.content)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("Message", id))
    }

    async fn delete_message(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_deleted(result.rows_affected(), "Message", id)
    }

    // ---------------------- REVIEWS ----------------------

    async fn create_review(&self, review: NewReview) -> StoreResult<Review> {
        sqlx::query_as::<_, Review>(
            "INSERT INTO reviews (reviewer_id, reviewee_id, project_id, rating, comment)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(review.reviewer)
        .bind(review.reviewee)
        .bind(review.project)
        .bind(review.rating)
        .bind(review.comment)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    async fn get_review(&self, id: i64) -> StoreResult<Review> {
        sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("Review", id))
    }

    async fn list_reviews(&self) -> StoreResult<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>("SELECT * FROM reviews ORDER BY id DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(reviews)
    }

    async fn update_review(&self, id: i64, patch: ReviewPatch) -> StoreResult<Review> {
        sqlx::query_as::<_, Review>(
            "UPDATE reviews SET
                rating = COALESCE($2, rating),
                comment = COALESCE($3, comment)
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(patch.rating)
        .bind(patch.comment)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or_else(|| StoreError::not_found("Review", id))
    }

    async fn delete_review(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_deleted(result.rows_affected(), "Review", id)
    }

    // ---------------------- NOTIFICATIONS ----------------------

    async fn create_notification(&self, notification: NewNotification) -> StoreResult<Notification> {
        sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (user_id, message, link, is_read)
             VALUES ($1, $2, $3, FALSE)
             RETURNING *",
        )
        .bind(notification.user)
        .bind(notification.message)
        .bind(notification.link)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    async fn get_notification(&self, id: i64) -> StoreResult<Notification> {
        sqlx::query_as::<_, Notification>("SELECT * FROM notifications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("Notification", id))
    }

    async fn list_notifications(&self, user: Option<i64>) -> StoreResult<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE ($1::bigint IS NULL OR user_id = $1)
             ORDER BY created_at DESC, id DESC",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;
        Ok(notifications)
    }

    async fn update_notification(&self, id: i64, patch: NotificationPatch) -> StoreResult<Notification> {
        sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET is_read = COALESCE($2, is_read) WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(patch.is_read)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("Notification", id))
    }

    async fn delete_notification(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_deleted(result.rows_affected(), "Notification", id)
    }
}
