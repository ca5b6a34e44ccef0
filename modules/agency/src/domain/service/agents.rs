use std::sync::Arc;

use agency_db::secure::FilterSet;
use agency_db::{Page, Paged};
use agency_security::Principal;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, Set};
use tracing::instrument;

use super::{ADMIN, STAFF, ServiceDeps, require_role};
use crate::domain::error::DomainError;
use crate::domain::models::{Agent, AgentPatch, NewAgent};
use crate::domain::ports::AuditAction;
use crate::domain::validate::clean;
use crate::infra::storage::entity::agent;

const ENTITY: &str = "Agent";

pub struct AgentsService {
    deps: Arc<ServiceDeps>,
}

impl AgentsService {
    pub(super) fn new(deps: Arc<ServiceDeps>) -> Self {
        Self { deps }
    }

    #[instrument(skip(self, principal), fields(user_id = principal.user_id()))]
    pub async fn list(
        &self,
        principal: &Principal,
        name: Option<&str>,
        branch_id: Option<i64>,
        page: &Page,
    ) -> Result<Paged<Agent>, DomainError> {
        require_role(principal, STAFF)?;
        let filters = FilterSet::new()
            .contains_ci("name", agent::Column::FullName, name)
            .eq("branchId", agent::Column::BranchId, branch_id);
        let paged = self
            .deps
            .list::<agent::Entity>(principal, &filters, page)
            .await?;
        Ok(paged.map(Agent::from))
    }

    #[instrument(skip(self, principal), fields(user_id = principal.user_id(), agent_id = id))]
    pub async fn get(&self, principal: &Principal, id: i64) -> Result<Agent, DomainError> {
        require_role(principal, STAFF)?;
        let model = self.deps.get::<agent::Entity>(principal, ENTITY, id).await?;
        Ok(model.into())
    }

    #[instrument(skip(self, principal, new), fields(user_id = principal.user_id()))]
    pub async fn create(&self, principal: &Principal, new: NewAgent) -> Result<Agent, DomainError> {
        require_role(principal, ADMIN)?;
        new.validate()?;
        tracing::info!("Creating agent");

        let row = agent::ActiveModel {
            full_name: Set(new.full_name.trim().to_owned()),
            phone: Set(clean(new.phone)),
            email: Set(clean(new.email)),
            hire_date: Set(new.hire_date.unwrap_or_else(|| Utc::now().date_naive())),
            branch_id: Set(new.branch_id),
            ..Default::default()
        };
        let id = agent::Entity::insert(row)
            .exec(self.deps.conn())
            .await?
            .last_insert_id;

        let created: Agent = self.deps.fetch::<agent::Entity>(ENTITY, id).await?.into();
        self.deps
            .audit(principal, ENTITY, id, AuditAction::Insert, &created)
            .await;
        Ok(created)
    }

    #[instrument(skip(self, principal, patch), fields(user_id = principal.user_id(), agent_id = id))]
    pub async fn update(
        &self,
        principal: &Principal,
        id: i64,
        patch: AgentPatch,
    ) -> Result<Agent, DomainError> {
        require_role(principal, ADMIN)?;
        patch.validate()?;

        let mut row = self
            .deps
            .fetch::<agent::Entity>(ENTITY, id)
            .await?
            .into_active_model();
        if let Some(full_name) = patch.full_name {
            row.full_name = Set(full_name.trim().to_owned());
        }
        if patch.phone.is_some() {
            row.phone = Set(clean(patch.phone));
        }
        if patch.email.is_some() {
            row.email = Set(clean(patch.email));
        }
        if let Some(hire_date) = patch.hire_date {
            row.hire_date = Set(hire_date);
        }
        if let Some(branch_id) = patch.branch_id {
            row.branch_id = Set(Some(branch_id));
        }
        let updated: Agent = row.update(self.deps.conn()).await?.into();

        self.deps
            .audit(principal, ENTITY, id, AuditAction::Update, &updated)
            .await;
        Ok(updated)
    }

    #[instrument(skip(self, principal), fields(user_id = principal.user_id(), agent_id = id))]
    pub async fn delete(&self, principal: &Principal, id: i64) -> Result<(), DomainError> {
        require_role(principal, ADMIN)?;
        self.deps
            .delete::<agent::Entity, Agent>(principal, ENTITY, id)
            .await
    }
}
