use std::sync::Arc;

use agency_security::{Principal, Role};
use chrono::Utc;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use tracing::instrument;

use super::{ADMIN, ANYONE, ServiceDeps, require_role};
use crate::auth::TokenService;
use crate::auth::password::{hash_password, verify_password};
use crate::domain::error::DomainError;
use crate::domain::models::{AuthSession, LoginRequest, NewUser, User};
use crate::domain::ports::AuditAction;
use crate::infra::storage::entity::user;

const ENTITY: &str = "User";

fn invalid_credentials() -> DomainError {
    DomainError::unauthenticated("Invalid credentials")
}

fn invalid_token() -> DomainError {
    DomainError::unauthenticated("Invalid or expired token")
}

/// Login, registration and token resolution.
pub struct AuthService {
    deps: Arc<ServiceDeps>,
    tokens: TokenService,
}

impl AuthService {
    pub(super) fn new(deps: Arc<ServiceDeps>, tokens: TokenService) -> Self {
        Self { deps, tokens }
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> Result<AuthSession, DomainError> {
        let Some(row) = self.find_by_email(request.email.trim()).await? else {
            tracing::debug!("login for unknown email");
            return Err(invalid_credentials());
        };
        if !verify_password(&request.password, &row.password_hash) {
            tracing::debug!("login with wrong password");
            return Err(invalid_credentials());
        }

        let user = to_user(row)?;
        let token = self.issue(user.user_id)?;
        tracing::info!(user_id = user.user_id, "user logged in");
        Ok(AuthSession { user, token })
    }

    /// Creates a login. Agents must be linked to an agent record; other
    /// roles must not be.
    #[instrument(skip(self, principal, new), fields(user_id = principal.user_id(), email = %new.email))]
    pub async fn register(
        &self,
        principal: &Principal,
        new: NewUser,
    ) -> Result<AuthSession, DomainError> {
        require_role(principal, ADMIN)?;
        let user = self.create_user(new).await?;
        self.deps
            .audit(principal, ENTITY, user.user_id, AuditAction::Insert, &user)
            .await;
        let token = self.issue(user.user_id)?;
        Ok(AuthSession { user, token })
    }

    #[instrument(skip(self, principal), fields(user_id = principal.user_id()))]
    pub async fn me(&self, principal: &Principal) -> Result<User, DomainError> {
        require_role(principal, ANYONE)?;
        let row = user::Entity::find_by_id(principal.user_id())
            .one(self.deps.conn())
            .await?
            .ok_or_else(|| DomainError::not_found(ENTITY, principal.user_id()))?;
        to_user(row)
    }

    /// Resolves a bearer token to the principal of an existing user.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` for a bad or expired token or an unknown user.
    pub async fn authenticate(&self, token: &str) -> Result<Principal, DomainError> {
        let user_id = self.tokens.verify(token).map_err(|e| {
            tracing::debug!("AuthN rejected: {e}");
            invalid_token()
        })?;
        let Some(row) = user::Entity::find_by_id(user_id)
            .one(self.deps.conn())
            .await?
        else {
            tracing::debug!(user_id, "token for unknown user");
            return Err(invalid_token());
        };
        let user = to_user(row)?;
        Ok(Principal::new(user.user_id, user.email, user.role, user.agent_id))
    }

    /// Creates the first admin when no user exists. `None` when users exist.
    ///
    /// # Errors
    ///
    /// Fails on invalid credentials or a storage error.
    pub async fn bootstrap_admin(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        if user::Entity::find().count(self.deps.conn()).await? > 0 {
            return Ok(None);
        }
        let admin = self
            .create_user(NewUser {
                email: email.to_owned(),
                password: password.to_owned(),
                role: Some(Role::Admin),
                agent_id: None,
            })
            .await?;
        tracing::info!(user_id = admin.user_id, email = %admin.email, "created bootstrap admin");
        Ok(Some(admin))
    }

    async fn create_user(&self, new: NewUser) -> Result<User, DomainError> {
        new.validate()?;
        let role = new.role.unwrap_or(Role::Client);
        match (role, new.agent_id) {
            (Role::Agent, None) => {
                return Err(DomainError::validation("agentId", "Agent users need an agentId"));
            }
            (Role::Admin | Role::Client, Some(_)) => {
                return Err(DomainError::validation("agentId", "Only agent users carry an agentId"));
            }
            _ => {}
        }
        let email = new.email.trim().to_owned();
        if self.find_by_email(&email).await?.is_some() {
            return Err(DomainError::validation(
                "email",
                "User with this email already exists",
            ));
        }

        let password_hash =
            hash_password(&new.password).map_err(|e| DomainError::internal(e.to_string()))?;
        let row = user::ActiveModel {
            email: Set(email),
            password_hash: Set(password_hash),
            role: Set(role.as_str().to_owned()),
            agent_id: Set(new.agent_id),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let id = user::Entity::insert(row)
            .exec(self.deps.conn())
            .await?
            .last_insert_id;
        tracing::info!(user_id = id, %role, "created user");

        let row = user::Entity::find_by_id(id)
            .one(self.deps.conn())
            .await?
            .ok_or_else(|| DomainError::not_found(ENTITY, id))?;
        to_user(row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, DomainError> {
        Ok(user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.deps.conn())
            .await?)
    }

    fn issue(&self, user_id: i64) -> Result<String, DomainError> {
        self.tokens.issue(user_id).map_err(|e| {
            tracing::error!(error = %e, "token issuing failed");
            DomainError::internal(e.to_string())
        })
    }
}

fn to_user(row: user::Model) -> Result<User, DomainError> {
    let id = row.id;
    User::try_from(row).map_err(|e| {
        tracing::error!(user_id = id, error = %e, "stored user has an unknown role");
        DomainError::internal(e.to_string())
    })
}
