use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::{self, Claims, JwtError, TokenType};
use crate::config::SecurityConfig;
use crate::database::models::{NewAccount, NewProfile, Profile, Role};
use crate::database::store::{EntityStore, StoreError};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("All fields are required")]
    MissingFields,

    #[error("Username and role are required.")]
    MissingRoleFields,

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Profile not found.")]
    ProfileNotFound,

    #[error("Invalid role.")]
    InvalidRole,

    #[error("Role already assigned!")]
    RoleAlreadyAssigned,

    #[error("Token error: {0}")]
    Token(JwtError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Registered {
    pub message: String,
    pub id: i64,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    pub refresh: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AccessToken {
    pub access: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SetRoleRequest {
    pub username: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RoleAssigned {
    pub message: String,
    pub profile: Profile,
}

/// Present and not blank
fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Registration, login, token refresh and one-shot role assignment
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn EntityStore>,
    security: SecurityConfig,
}

impl AccountService {
    pub fn new(store: Arc<dyn EntityStore>, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    pub fn security(&self) -> &SecurityConfig {
        &self.security
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<Registered, AccountError> {
        let (Some(username), Some(email), Some(password)) = (
            required(&request.username),
            required(&request.email),
            request.password.as_deref().filter(|p| !p.is_empty()),
        ) else {
            return Err(AccountError::MissingFields);
        };

        if let Some(taken) = self.already_taken(username, email).await? {
            return Err(taken);
        }

        let account = NewAccount {
            user_name: username.to_string(),
            email: email.to_string(),
            password_hash: auth::hash_password(password),
        };
        let profile = match self.store.create_account(account, NewProfile::new(username, email)).await {
            Ok(profile) => profile,
            // Lost a race with a concurrent sign-up; report which field collided
            Err(StoreError::Conflict(detail)) => {
                tracing::debug!("Registration of '{}' collided: {}", username, detail);
                return Err(match self.already_taken(username, email).await? {
                    Some(taken) => taken,
                    None if detail.contains("email") => AccountError::EmailTaken,
                    None => AccountError::UsernameTaken,
                });
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!("Registered account '{}' with profile {}", profile.user_name, profile.id);
        Ok(Registered {
            message: "User registered successfully ✅".to_string(),
            id: profile.id,
            username: profile.user_name,
            email: profile.email,
        })
    }

    async fn already_taken(&self, username: &str, email: &str) -> Result<Option<AccountError>, AccountError> {
        if self.store.find_account(username).await?.is_some()
            || self.store.find_profile_by_user_name(username).await?.is_some()
        {
            return Ok(Some(AccountError::UsernameTaken));
        }
        if self.store.find_profile_by_email(email).await?.is_some() {
            return Ok(Some(AccountError::EmailTaken));
        }
        Ok(None)
    }

    pub async fn login(&self, request: LoginRequest) -> Result<TokenPair, AccountError> {
        let (Some(username), Some(password)) = (required(&request.username), request.password.as_deref()) else {
            return Err(AccountError::InvalidCredentials);
        };

        let account = self
            .store
            .find_account(username)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;
        if !auth::verify_password(password, &account.password_hash) {
            tracing::debug!("Password mismatch for '{}'", username);
            return Err(AccountError::InvalidCredentials);
        }

        let profile = self
            .store
            .find_profile_by_user_name(username)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        let access = self.issue(&profile, TokenType::Access)?;
        let refresh = self.issue(&profile, TokenType::Refresh)?;
        tracing::info!("Login for '{}'", username);
        Ok(TokenPair { access, refresh })
    }

    pub fn refresh(&self, request: RefreshRequest) -> Result<AccessToken, AccountError> {
        let token = required(&request.refresh).ok_or_else(|| AccountError::InvalidToken("missing refresh token".into()))?;

        let claims = auth::validate_jwt(token, &self.security.jwt_secret, TokenType::Refresh).map_err(|e| match e {
            JwtError::InvalidSecret => AccountError::Token(e),
            other => AccountError::InvalidToken(other.to_string()),
        })?;

        let access = Claims::new(claims.sub, claims.profile_id, TokenType::Access, &self.security);
        let access = auth::generate_jwt(&access, &self.security.jwt_secret).map_err(AccountError::Token)?;
        Ok(AccessToken { access })
    }

    pub async fn set_role(&self, request: SetRoleRequest) -> Result<RoleAssigned, AccountError> {
        let (Some(username), Some(role)) = (required(&request.username), required(&request.role)) else {
            return Err(AccountError::MissingRoleFields);
        };

        let profile = self
            .store
            .find_profile_by_user_name(username)
            .await?
            .ok_or(AccountError::ProfileNotFound)?;
        if profile.role.is_assigned() {
            return Err(AccountError::RoleAlreadyAssigned);
        }

        let role = Role::parse_assignable(role).map_err(|_| AccountError::InvalidRole)?;

        // Conditional update; a concurrent assignment makes this return None
        let profile = self
            .store
            .assign_role(profile.id, role)
            .await?
            .ok_or(AccountError::RoleAlreadyAssigned)?;

        tracing::info!("Profile {} assigned role {}", profile.id, role);
        Ok(RoleAssigned {
            message: format!("Role '{}' saved successfully!", role),
            profile,
        })
    }

    fn issue(&self, profile: &Profile, token_type: TokenType) -> Result<String, AccountError> {
        let claims = Claims::new(profile.user_name.clone(), profile.id, token_type, &self.security);
        auth::generate_jwt(&claims, &self.security.jwt_secret).map_err(AccountError::Token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::memory::MemoryStore;

    fn service() -> (Arc<MemoryStore>, AccountService) {
        let store = Arc::new(MemoryStore::new());
        let service = AccountService::new(store.clone(), AppConfig::development().security);
        (store, service)
    }

    fn register_request(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: Some(username.into()),
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }

    #[tokio::test]
    async fn register_creates_profile_with_unset_role() {
        let (store, service) = service();
        let registered = service
            .register(register_request("ann", "ann@example.com", "pw"))
            .await
            .unwrap();

        assert_eq!(registered.username, "ann");
        let profile = store.get_profile(registered.id).await.unwrap();
        assert_eq!(profile.role, Role::Unset);
        assert_eq!(profile.email, "ann@example.com");
    }

    #[tokio::test]
    async fn register_rejects_missing_and_duplicate_fields() {
        let (_, service) = service();
        assert!(matches!(
            service.register(register_request("ann", "", "pw")).await,
            Err(AccountError::MissingFields)
        ));

        service.register(register_request("ann", "ann@example.com", "pw")).await.unwrap();
        assert!(matches!(
            service.register(register_request("ann", "new@example.com", "pw")).await,
            Err(AccountError::UsernameTaken)
        ));
        assert!(matches!(
            service.register(register_request("bob", "ann@example.com", "pw")).await,
            Err(AccountError::EmailTaken)
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_sign_ups_lose_with_a_client_error() {
        let (store, service) = service();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .register(register_request("ann", &format!("ann{}@example.com", i), "pw"))
                        .await
                })
            })
            .collect();
        let mut winners = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => winners += 1,
                Err(e) => assert!(matches!(e, AccountError::UsernameTaken), "unexpected {:?}", e),
            }
        }
        assert_eq!(winners, 1);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .register(register_request(&format!("bob{}", i), "bob@example.com", "pw"))
                        .await
                })
            })
            .collect();
        let mut winners = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => winners += 1,
                Err(e) => assert!(matches!(e, AccountError::EmailTaken), "unexpected {:?}", e),
            }
        }
        assert_eq!(winners, 1);
        assert_eq!(store.list_profiles(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn store_conflict_on_insert_maps_to_the_taken_field() {
        let (store, service) = service();
        let carol = service
            .register(register_request("carol", "carol@example.com", "pw"))
            .await
            .unwrap();
        // The account outlives its profile, so only the insert sees the e-mail clash
        store.delete_profile(carol.id).await.unwrap();

        let result = service.register(register_request("dave", "carol@example.com", "pw")).await;
        assert!(matches!(result, Err(AccountError::EmailTaken)), "{:?}", result);
        assert!(store.find_profile_by_user_name("dave").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn login_then_refresh() {
        let (_, service) = service();
        service.register(register_request("ann", "ann@example.com", "pw")).await.unwrap();

        let bad = service
            .login(LoginRequest {
                username: Some("ann".into()),
                password: Some("wrong".into()),
            })
            .await;
        assert!(matches!(bad, Err(AccountError::InvalidCredentials)));

        let pair = service
            .login(LoginRequest {
                username: Some("ann".into()),
                password: Some("pw".into()),
            })
            .await
            .unwrap();

        let refreshed = service
            .refresh(RefreshRequest {
                refresh: Some(pair.refresh.clone()),
            })
            .unwrap();
        let claims = auth::validate_jwt(&refreshed.access, &service.security().jwt_secret, TokenType::Access).unwrap();
        assert_eq!(claims.sub, "ann");

        // An access token cannot be used to refresh
        assert!(matches!(
            service.refresh(RefreshRequest { refresh: Some(pair.access) }),
            Err(AccountError::InvalidToken(_))
        ));
    }

    #[tokio::test]
    async fn role_is_assigned_once() {
        let (_, service) = service();
        service.register(register_request("ann", "ann@example.com", "pw")).await.unwrap();

        let set = |role: &str| SetRoleRequest {
            username: Some("ann".into()),
            role: Some(role.into()),
        };

        assert!(matches!(service.set_role(set("admin")).await, Err(AccountError::InvalidRole)));

        let assigned = service.set_role(set("freelancer")).await.unwrap();
        assert_eq!(assigned.profile.role, Role::Freelancer);
        assert_eq!(assigned.message, "Role 'freelancer' saved successfully!");

        assert!(matches!(
            service.set_role(set("client")).await,
            Err(AccountError::RoleAlreadyAssigned)
        ));
    }

    #[tokio::test]
    async fn set_role_validates_inputs() {
        let (_, service) = service();
        assert!(matches!(
            service.set_role(SetRoleRequest::default()).await,
            Err(AccountError::MissingRoleFields)
        ));
        assert!(matches!(
            service
                .set_role(SetRoleRequest {
                    username: Some("ghost".into()),
                    role: Some("client".into()),
                })
                .await,
            Err(AccountError::ProfileNotFound)
        ));
    }
}
