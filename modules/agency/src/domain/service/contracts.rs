use std::sync::Arc;

use agency_db::secure::FilterSet;
use agency_db::{Page, Paged};
use agency_security::{Principal, RecordOwner, ResourceKind, Role};
use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel, Set};
use tracing::instrument;

use super::{ADMIN, ANYONE, STAFF, ServiceDeps, acting_agent, require_role};
use crate::domain::error::DomainError;
use crate::domain::models::{Contract, ContractPatch, ContractStatus, NewContract};
use crate::domain::ports::AuditAction;
use crate::domain::validate::check_contract_dates;
use crate::infra::storage::entity::{contract, insurance_type};

const ENTITY: &str = "Contract";

/// Optional contract list filters, applied in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractFilter {
    pub client_id: Option<i64>,
    pub agent_id: Option<i64>,
    pub status: Option<ContractStatus>,
    /// `start_date >= from`.
    pub from: Option<NaiveDate>,
    /// `end_date <= to`.
    pub to: Option<NaiveDate>,
    /// Active and not yet ended on `today`.
    pub active_only: bool,
}

impl ContractFilter {
    pub(super) fn filter_set(&self, today: NaiveDate) -> FilterSet {
        FilterSet::new()
            .eq("clientId", contract::Column::ClientId, self.client_id)
            .eq("agentId", contract::Column::AgentId, self.agent_id)
            .eq("status", contract::Column::Status, self.status)
            .at_least("from", contract::Column::StartDate, self.from)
            .at_most("to", contract::Column::EndDate, self.to)
            .with("activeOnly", self.active_only.then(|| active_on(today)))
    }
}

/// Contracts in force on `day`.
pub(super) fn active_on(day: NaiveDate) -> Condition {
    Condition::all()
        .add(contract::Column::Status.eq(ContractStatus::Active))
        .add(contract::Column::EndDate.gte(day))
}

pub(super) fn contract_owner(m: &contract::Model) -> RecordOwner {
    RecordOwner::new()
        .with_agent(m.agent_id)
        .with_client(m.client_id)
}

pub struct ContractsService {
    deps: Arc<ServiceDeps>,
}

impl ContractsService {
    pub(super) fn new(deps: Arc<ServiceDeps>) -> Self {
        Self { deps }
    }

    #[instrument(skip(self, principal), fields(user_id = principal.user_id()))]
    pub async fn list(
        &self,
        principal: &Principal,
        filter: &ContractFilter,
        page: &Page,
    ) -> Result<Paged<Contract>, DomainError> {
        require_role(principal, ANYONE)?;
        let filters = filter.filter_set(Utc::now().date_naive());
        let paged = self
            .deps
            .list::<contract::Entity>(principal, &filters, page)
            .await?;
        Ok(paged.map(Contract::from))
    }

    #[instrument(skip(self, principal), fields(user_id = principal.user_id(), contract_id = id))]
    pub async fn get(&self, principal: &Principal, id: i64) -> Result<Contract, DomainError> {
        require_role(principal, ANYONE)?;
        let model = self
            .deps
            .get::<contract::Entity>(principal, ENTITY, id)
            .await?;
        Ok(model.into())
    }

    /// Creates a contract. The contribution is `amount × base_rate` of the
    /// insurance type; the agent percent defaults to the type's default.
    #[instrument(
        skip(self, principal, new),
        fields(user_id = principal.user_id(), client_id = new.client_id, agent_id = new.agent_id)
    )]
    pub async fn create(
        &self,
        principal: &Principal,
        new: NewContract,
    ) -> Result<Contract, DomainError> {
        require_role(principal, STAFF)?;
        new.validate()?;
        if principal.role() == Role::Agent && acting_agent(principal)? != new.agent_id {
            return Err(DomainError::forbidden(
                "Cannot create contract for another agent",
            ));
        }
        tracing::info!("Creating contract");

        let ty = self.insurance_type(new.insurance_type_id).await?;
        let row = contract::ActiveModel {
            client_id: Set(new.client_id),
            agent_id: Set(new.agent_id),
            insurance_type_id: Set(new.insurance_type_id),
            start_date: Set(new.start_date),
            end_date: Set(new.end_date),
            insurance_amount: Set(new.insurance_amount),
            contribution_amount: Set(new.insurance_amount * ty.base_rate),
            agent_percent: Set(new.agent_percent.unwrap_or(ty.agent_percent_default)),
            status: Set(new.status.unwrap_or_default()),
            ..Default::default()
        };
        let id = contract::Entity::insert(row)
            .exec(self.deps.conn())
            .await?
            .last_insert_id;

        let created: Contract = self.deps.fetch::<contract::Entity>(ENTITY, id).await?.into();
        self.deps
            .audit(principal, ENTITY, id, AuditAction::Insert, &created)
            .await;
        tracing::info!(contract_id = id, "Created contract");
        Ok(created)
    }

    /// Updates the given fields. An agent may only touch contracts in
    /// their portfolio and may not hand them to another agent.
    #[instrument(skip(self, principal, patch), fields(user_id = principal.user_id(), contract_id = id))]
    pub async fn update(
        &self,
        principal: &Principal,
        id: i64,
        patch: ContractPatch,
    ) -> Result<Contract, DomainError> {
        require_role(principal, STAFF)?;
        patch.validate()?;

        let existing = self.deps.fetch::<contract::Entity>(ENTITY, id).await?;
        self.deps
            .authorize_write(principal, ResourceKind::Contract, ENTITY, &contract_owner(&existing))
            .await?;
        if principal.role() == Role::Agent
            && let Some(agent_id) = patch.agent_id
            && agent_id != existing.agent_id
        {
            return Err(DomainError::forbidden(
                "Cannot reassign contract to another agent",
            ));
        }

        check_contract_dates(
            patch.start_date.unwrap_or(existing.start_date),
            patch.end_date.unwrap_or(existing.end_date),
        )?;

        let reprice = patch.insurance_type_id.is_some() || patch.insurance_amount.is_some();
        let type_id = patch.insurance_type_id.unwrap_or(existing.insurance_type_id);
        let amount = patch.insurance_amount.unwrap_or(existing.insurance_amount);

        let mut row = existing.into_active_model();
        if reprice {
            let ty = self.insurance_type(type_id).await?;
            row.insurance_type_id = Set(type_id);
            row.insurance_amount = Set(amount);
            row.contribution_amount = Set(amount * ty.base_rate);
        }
        if let Some(client_id) = patch.client_id {
            row.client_id = Set(client_id);
        }
        if let Some(agent_id) = patch.agent_id {
            row.agent_id = Set(agent_id);
        }
        if let Some(start) = patch.start_date {
            row.start_date = Set(start);
        }
        if let Some(end) = patch.end_date {
            row.end_date = Set(end);
        }
        if let Some(percent) = patch.agent_percent {
            row.agent_percent = Set(percent);
        }
        if let Some(status) = patch.status {
            row.status = Set(status);
        }
        let updated: Contract = row.update(self.deps.conn()).await?.into();

        self.deps
            .audit(principal, ENTITY, id, AuditAction::Update, &updated)
            .await;
        Ok(updated)
    }

    #[instrument(skip(self, principal), fields(user_id = principal.user_id(), contract_id = id))]
    pub async fn set_status(
        &self,
        principal: &Principal,
        id: i64,
        status: ContractStatus,
    ) -> Result<Contract, DomainError> {
        require_role(principal, STAFF)?;

        let existing = self.deps.fetch::<contract::Entity>(ENTITY, id).await?;
        self.deps
            .authorize_write(principal, ResourceKind::Contract, ENTITY, &contract_owner(&existing))
            .await?;

        let mut row = existing.into_active_model();
        row.status = Set(status);
        let updated: Contract = row.update(self.deps.conn()).await?.into();

        self.deps
            .audit(principal, ENTITY, id, AuditAction::Update, &updated)
            .await;
        tracing::info!("Changed contract status");
        Ok(updated)
    }

    #[instrument(skip(self, principal), fields(user_id = principal.user_id(), contract_id = id))]
    pub async fn delete(&self, principal: &Principal, id: i64) -> Result<(), DomainError> {
        require_role(principal, ADMIN)?;
        self.deps
            .delete::<contract::Entity, Contract>(principal, ENTITY, id)
            .await
    }

    async fn insurance_type(&self, id: i64) -> Result<insurance_type::Model, DomainError> {
        insurance_type::Entity::find_by_id(id)
            .one(self.deps.conn())
            .await?
            .ok_or_else(|| DomainError::validation("insuranceTypeId", "Insurance type not found"))
    }
}
