use std::sync::Arc;

use agency_db::secure::FilterSet;
use agency_db::{Page, Paged};
use agency_security::{Principal, ResourceKind};
use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, Set};
use tracing::instrument;

use super::contracts::contract_owner;
use super::{ADMIN, ANYONE, STAFF, ServiceDeps, require_role};
use crate::domain::error::DomainError;
use crate::domain::models::{CasePatch, InsuranceCase, NewCase};
use crate::domain::ports::AuditAction;
use crate::infra::storage::entity::{contract, insurance_case, insurance_type};

const ENTITY: &str = "InsuranceCase";

/// Optional case list filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseFilter {
    pub contract_id: Option<i64>,
    /// `case_date >= from`.
    pub from: Option<NaiveDate>,
    /// `case_date <= to`.
    pub to: Option<NaiveDate>,
}

impl CaseFilter {
    fn filter_set(&self) -> FilterSet {
        FilterSet::new()
            .eq("contractId", insurance_case::Column::ContractId, self.contract_id)
            .at_least("from", insurance_case::Column::CaseDate, self.from)
            .at_most("to", insurance_case::Column::CaseDate, self.to)
    }
}

/// `insurance_amount × damage_level × payout_coeff`.
fn accrued_payment(contract: &contract::Model, ty: &insurance_type::Model, damage_level: f64) -> f64 {
    contract.insurance_amount * damage_level * ty.payout_coeff
}

pub struct CasesService {
    deps: Arc<ServiceDeps>,
}

impl CasesService {
    pub(super) fn new(deps: Arc<ServiceDeps>) -> Self {
        Self { deps }
    }

    #[instrument(skip(self, principal), fields(user_id = principal.user_id()))]
    pub async fn list(
        &self,
        principal: &Principal,
        filter: &CaseFilter,
        page: &Page,
    ) -> Result<Paged<InsuranceCase>, DomainError> {
        require_role(principal, ANYONE)?;
        let paged = self
            .deps
            .list::<insurance_case::Entity>(principal, &filter.filter_set(), page)
            .await?;
        Ok(paged.map(InsuranceCase::from))
    }

    #[instrument(skip(self, principal), fields(user_id = principal.user_id(), case_id = id))]
    pub async fn get(&self, principal: &Principal, id: i64) -> Result<InsuranceCase, DomainError> {
        require_role(principal, ANYONE)?;
        let model = self
            .deps
            .get::<insurance_case::Entity>(principal, ENTITY, id)
            .await?;
        Ok(model.into())
    }

    /// Registers a case on a contract the caller may act on. The accrued
    /// payment is computed from the contract and dated on the case date.
    #[instrument(
        skip(self, principal, new),
        fields(user_id = principal.user_id(), contract_id = new.contract_id)
    )]
    pub async fn create(
        &self,
        principal: &Principal,
        new: NewCase,
    ) -> Result<InsuranceCase, DomainError> {
        require_role(principal, STAFF)?;
        new.validate()?;
        tracing::info!("Creating insurance case");

        let (contract, ty) = self.writable_contract(principal, new.contract_id).await?;
        let row = insurance_case::ActiveModel {
            contract_id: Set(new.contract_id),
            case_date: Set(new.case_date),
            act_number: Set(new.act_number.trim().to_owned()),
            damage_level: Set(new.damage_level),
            accrued_payment: Set(Some(accrued_payment(&contract, &ty, new.damage_level))),
            accrued_date: Set(Some(new.case_date)),
            payment_date: Set(new.payment_date),
            ..Default::default()
        };
        let id = insurance_case::Entity::insert(row)
            .exec(self.deps.conn())
            .await?
            .last_insert_id;

        let created: InsuranceCase = self
            .deps
            .fetch::<insurance_case::Entity>(ENTITY, id)
            .await?
            .into();
        self.deps
            .audit(principal, ENTITY, id, AuditAction::Insert, &created)
            .await;
        Ok(created)
    }

    #[instrument(skip(self, principal, patch), fields(user_id = principal.user_id(), case_id = id))]
    pub async fn update(
        &self,
        principal: &Principal,
        id: i64,
        patch: CasePatch,
    ) -> Result<InsuranceCase, DomainError> {
        require_role(principal, STAFF)?;
        patch.validate()?;

        let existing = self
            .deps
            .fetch::<insurance_case::Entity>(ENTITY, id)
            .await?;
        // Both the current and the target contract must be writable.
        let (current, _) = self.writable_contract(principal, existing.contract_id).await?;
        let (contract, ty) = match patch.contract_id {
            Some(target) if target != current.id => self.writable_contract(principal, target).await?,
            _ => self.contract_with_type(current).await?,
        };

        let damage_level = patch.damage_level.unwrap_or(existing.damage_level);
        let case_date = patch.case_date.unwrap_or(existing.case_date);
        let reprice = patch.contract_id.is_some()
            || patch.damage_level.is_some()
            || patch.case_date.is_some();

        let mut row = existing.into_active_model();
        row.contract_id = Set(contract.id);
        if let Some(act_number) = patch.act_number {
            row.act_number = Set(act_number.trim().to_owned());
        }
        if let Some(payment_date) = patch.payment_date {
            row.payment_date = Set(Some(payment_date));
        }
        if reprice {
            row.case_date = Set(case_date);
            row.damage_level = Set(damage_level);
            row.accrued_payment = Set(Some(accrued_payment(&contract, &ty, damage_level)));
            row.accrued_date = Set(Some(case_date));
        }
        let updated: InsuranceCase = row.update(self.deps.conn()).await?.into();

        self.deps
            .audit(principal, ENTITY, id, AuditAction::Update, &updated)
            .await;
        Ok(updated)
    }

    #[instrument(skip(self, principal), fields(user_id = principal.user_id(), case_id = id))]
    pub async fn delete(&self, principal: &Principal, id: i64) -> Result<(), DomainError> {
        require_role(principal, ADMIN)?;
        self.deps
            .delete::<insurance_case::Entity, InsuranceCase>(principal, ENTITY, id)
            .await
    }

    /// The contract a case is written against, after the ownership check.
    async fn writable_contract(
        &self,
        principal: &Principal,
        contract_id: i64,
    ) -> Result<(contract::Model, insurance_type::Model), DomainError> {
        let contract = contract::Entity::find_by_id(contract_id)
            .one(self.deps.conn())
            .await?
            .ok_or_else(|| DomainError::validation("contractId", "Contract not found"))?;
        self.deps
            .authorize_write(principal, ResourceKind::Contract, "Contract", &contract_owner(&contract))
            .await?;
        self.contract_with_type(contract).await
    }

    async fn contract_with_type(
        &self,
        contract: contract::Model,
    ) -> Result<(contract::Model, insurance_type::Model), DomainError> {
        let ty = insurance_type::Entity::find_by_id(contract.insurance_type_id)
            .one(self.deps.conn())
            .await?
            .ok_or_else(|| {
                DomainError::internal(format!(
                    "insurance type {} of contract {} is missing",
                    contract.insurance_type_id, contract.id
                ))
            })?;
        Ok((contract, ty))
    }
}
