use std::sync::Arc;

use agency_db::secure::FilterSet;
use agency_db::{Page, Paged};
use agency_security::Principal;
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, Set};
use tracing::instrument;

use super::{ADMIN, ANYONE, ServiceDeps, require_role};
use crate::domain::error::DomainError;
use crate::domain::models::{InsuranceType, InsuranceTypePatch, NewInsuranceType};
use crate::domain::ports::AuditAction;
use crate::domain::validate::clean;
use crate::infra::storage::entity::insurance_type;

const ENTITY: &str = "InsuranceType";

/// Insurance products: readable by everyone, writable by admins.
pub struct InsuranceTypesService {
    deps: Arc<ServiceDeps>,
}

impl InsuranceTypesService {
    pub(super) fn new(deps: Arc<ServiceDeps>) -> Self {
        Self { deps }
    }

    #[instrument(skip(self, principal), fields(user_id = principal.user_id()))]
    pub async fn list(
        &self,
        principal: &Principal,
        name: Option<&str>,
        page: &Page,
    ) -> Result<Paged<InsuranceType>, DomainError> {
        require_role(principal, ANYONE)?;
        let filters = FilterSet::new().contains_ci("name", insurance_type::Column::Name, name);
        let paged = self
            .deps
            .list::<insurance_type::Entity>(principal, &filters, page)
            .await?;
        Ok(paged.map(InsuranceType::from))
    }

    #[instrument(skip(self, principal), fields(user_id = principal.user_id(), insurance_type_id = id))]
    pub async fn get(&self, principal: &Principal, id: i64) -> Result<InsuranceType, DomainError> {
        require_role(principal, ANYONE)?;
        let model = self
            .deps
            .get::<insurance_type::Entity>(principal, ENTITY, id)
            .await?;
        Ok(model.into())
    }

    #[instrument(skip(self, principal, new), fields(user_id = principal.user_id()))]
    pub async fn create(
        &self,
        principal: &Principal,
        new: NewInsuranceType,
    ) -> Result<InsuranceType, DomainError> {
        require_role(principal, ADMIN)?;
        new.validate()?;
        tracing::info!("Creating insurance type");

        let row = insurance_type::ActiveModel {
            name: Set(new.name.trim().to_owned()),
            description: Set(clean(new.description)),
            base_rate: Set(new.base_rate),
            payout_coeff: Set(new.payout_coeff),
            agent_percent_default: Set(new.agent_percent_default),
            ..Default::default()
        };
        let id = insurance_type::Entity::insert(row)
            .exec(self.deps.conn())
            .await?
            .last_insert_id;

        let created: InsuranceType = self
            .deps
            .fetch::<insurance_type::Entity>(ENTITY, id)
            .await?
            .into();
        self.deps
            .audit(principal, ENTITY, id, AuditAction::Insert, &created)
            .await;
        Ok(created)
    }

    /// Existing contracts keep the amounts computed when they were written.
    #[instrument(skip(self, principal, patch), fields(user_id = principal.user_id(), insurance_type_id = id))]
    pub async fn update(
        &self,
        principal: &Principal,
        id: i64,
        patch: InsuranceTypePatch,
    ) -> Result<InsuranceType, DomainError> {
        require_role(principal, ADMIN)?;
        patch.validate()?;

        let mut row = self
            .deps
            .fetch::<insurance_type::Entity>(ENTITY, id)
            .await?
            .into_active_model();
        if let Some(name) = patch.name {
            row.name = Set(name.trim().to_owned());
        }
        if patch.description.is_some() {
            row.description = Set(clean(patch.description));
        }
        if let Some(base_rate) = patch.base_rate {
            row.base_rate = Set(base_rate);
        }
        if let Some(payout_coeff) = patch.payout_coeff {
            row.payout_coeff = Set(payout_coeff);
        }
        if let Some(percent) = patch.agent_percent_default {
            row.agent_percent_default = Set(percent);
        }
        let updated: InsuranceType = row.update(self.deps.conn()).await?.into();

        self.deps
            .audit(principal, ENTITY, id, AuditAction::Update, &updated)
            .await;
        Ok(updated)
    }

    #[instrument(skip(self, principal), fields(user_id = principal.user_id(), insurance_type_id = id))]
    pub async fn delete(&self, principal: &Principal, id: i64) -> Result<(), DomainError> {
        require_role(principal, ADMIN)?;
        self.deps
            .delete::<insurance_type::Entity, InsuranceType>(principal, ENTITY, id)
            .await
    }
}
