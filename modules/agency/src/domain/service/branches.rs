use std::sync::Arc;

use agency_db::secure::FilterSet;
use agency_db::{Page, Paged};
use agency_security::Principal;
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, Set};
use tracing::instrument;

use super::{ADMIN, STAFF, ServiceDeps, require_role};
use crate::domain::error::DomainError;
use crate::domain::models::{Branch, BranchPatch, NewBranch};
use crate::domain::ports::AuditAction;
use crate::infra::storage::entity::branch;

const ENTITY: &str = "Branch";

/// Branches: readable by staff, writable by admins.
pub struct BranchesService {
    deps: Arc<ServiceDeps>,
}

impl BranchesService {
    pub(super) fn new(deps: Arc<ServiceDeps>) -> Self {
        Self { deps }
    }

    /// `query` matches the branch name, case-insensitively.
    #[instrument(skip(self, principal), fields(user_id = principal.user_id()))]
    pub async fn list(
        &self,
        principal: &Principal,
        query: Option<&str>,
        page: &Page,
    ) -> Result<Paged<Branch>, DomainError> {
        require_role(principal, STAFF)?;
        let filters = FilterSet::new().contains_ci("query", branch::Column::Name, query);
        let paged = self
            .deps
            .list::<branch::Entity>(principal, &filters, page)
            .await?;
        Ok(paged.map(Branch::from))
    }

    #[instrument(skip(self, principal), fields(user_id = principal.user_id(), branch_id = id))]
    pub async fn get(&self, principal: &Principal, id: i64) -> Result<Branch, DomainError> {
        require_role(principal, STAFF)?;
        let model = self.deps.get::<branch::Entity>(principal, ENTITY, id).await?;
        Ok(model.into())
    }

    #[instrument(skip(self, principal, new), fields(user_id = principal.user_id()))]
    pub async fn create(&self, principal: &Principal, new: NewBranch) -> Result<Branch, DomainError> {
        require_role(principal, ADMIN)?;
        new.validate()?;
        tracing::info!("Creating branch");

        let row = branch::ActiveModel {
            name: Set(new.name.trim().to_owned()),
            ..Default::default()
        };
        let id = branch::Entity::insert(row)
            .exec(self.deps.conn())
            .await?
            .last_insert_id;

        let created: Branch = self.deps.fetch::<branch::Entity>(ENTITY, id).await?.into();
        self.deps
            .audit(principal, ENTITY, id, AuditAction::Insert, &created)
            .await;
        Ok(created)
    }

    #[instrument(skip(self, principal, patch), fields(user_id = principal.user_id(), branch_id = id))]
    pub async fn update(
        &self,
        principal: &Principal,
        id: i64,
        patch: BranchPatch,
    ) -> Result<Branch, DomainError> {
        require_role(principal, ADMIN)?;
        patch.validate()?;

        let mut row = self
            .deps
            .fetch::<branch::Entity>(ENTITY, id)
            .await?
            .into_active_model();
        if let Some(name) = patch.name {
            row.name = Set(name.trim().to_owned());
        }
        let updated: Branch = row.update(self.deps.conn()).await?.into();

        self.deps
            .audit(principal, ENTITY, id, AuditAction::Update, &updated)
            .await;
        Ok(updated)
    }

    #[instrument(skip(self, principal), fields(user_id = principal.user_id(), branch_id = id))]
    pub async fn delete(&self, principal: &Principal, id: i64) -> Result<(), DomainError> {
        require_role(principal, ADMIN)?;
        self.deps
            .delete::<branch::Entity, Branch>(principal, ENTITY, id)
            .await
    }
}
