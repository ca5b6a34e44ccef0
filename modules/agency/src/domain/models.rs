//! Domain models exchanged with the REST layer.
//!
//! Output models serialize in camelCase with the entity id named after the
//! entity (`contractId`, `caseId`, ...). `New*` payloads create records,
//! `*Patch` payloads update only the fields they carry.

use agency_security::Role;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::infra::storage::entity::{
    agent, audit_log, branch, client, contract, insurance_case, insurance_type, user,
};

pub use crate::infra::storage::entity::contract::ContractStatus;

// ── Branch ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub branch_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBranch {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchPatch {
    pub name: Option<String>,
}

impl From<branch::Model> for Branch {
    fn from(m: branch::Model) -> Self {
        Self {
            branch_id: m.id,
            name: m.name,
        }
    }
}

// ── Agent ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub agent_id: i64,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub hire_date: NaiveDate,
    pub branch_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAgent {
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// Defaults to today.
    pub hire_date: Option<NaiveDate>,
    pub branch_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPatch {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub branch_id: Option<i64>,
}

impl From<agent::Model> for Agent {
    fn from(m: agent::Model) -> Self {
        Self {
            agent_id: m.id,
            full_name: m.full_name,
            phone: m.phone,
            email: m.email,
            hire_date: m.hire_date,
            branch_id: m.branch_id,
        }
    }
}

// ── Client ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub client_id: i64,
    pub last_name: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClient {
    pub last_name: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPatch {
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl From<client::Model> for Client {
    fn from(m: client::Model) -> Self {
        Self {
            client_id: m.id,
            last_name: m.last_name,
            first_name: m.first_name,
            middle_name: m.middle_name,
            address: m.address,
            phone: m.phone,
            email: m.email,
        }
    }
}

// ── Insurance type ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceType {
    pub insurance_type_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub base_rate: f64,
    pub payout_coeff: f64,
    pub agent_percent_default: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInsuranceType {
    pub name: String,
    pub description: Option<String>,
    pub base_rate: f64,
    pub payout_coeff: f64,
    pub agent_percent_default: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceTypePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub base_rate: Option<f64>,
    pub payout_coeff: Option<f64>,
    pub agent_percent_default: Option<f64>,
}

impl From<insurance_type::Model> for InsuranceType {
    fn from(m: insurance_type::Model) -> Self {
        Self {
            insurance_type_id: m.id,
            name: m.name,
            description: m.description,
            base_rate: m.base_rate,
            payout_coeff: m.payout_coeff,
            agent_percent_default: m.agent_percent_default,
        }
    }
}

// ── Contract ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub contract_id: i64,
    pub client_id: i64,
    pub agent_id: i64,
    pub insurance_type_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub insurance_amount: f64,
    pub contribution_amount: f64,
    pub agent_percent: f64,
    pub status: ContractStatus,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContract {
    pub client_id: i64,
    pub agent_id: i64,
    pub insurance_type_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub insurance_amount: f64,
    /// Defaults to the insurance type's default percent.
    pub agent_percent: Option<f64>,
    pub status: Option<ContractStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractPatch {
    pub client_id: Option<i64>,
    pub agent_id: Option<i64>,
    pub insurance_type_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub insurance_amount: Option<f64>,
    pub agent_percent: Option<f64>,
    pub status: Option<ContractStatus>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub status: ContractStatus,
}

impl From<contract::Model> for Contract {
    fn from(m: contract::Model) -> Self {
        Self {
            contract_id: m.id,
            client_id: m.client_id,
            agent_id: m.agent_id,
            insurance_type_id: m.insurance_type_id,
            start_date: m.start_date,
            end_date: m.end_date,
            insurance_amount: m.insurance_amount,
            contribution_amount: m.contribution_amount,
            agent_percent: m.agent_percent,
            status: m.status,
        }
    }
}

/// Row of the active-contracts report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveContract {
    #[serde(flatten)]
    pub contract: Contract,
    pub agent_name: Option<String>,
    pub insurance_type_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveContractsReport {
    pub client_id: i64,
    pub data: Vec<ActiveContract>,
}

// ── Insurance case ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceCase {
    pub case_id: i64,
    pub contract_id: i64,
    pub case_date: NaiveDate,
    pub act_number: String,
    pub damage_level: f64,
    pub accrued_payment: Option<f64>,
    pub accrued_date: Option<NaiveDate>,
    pub payment_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCase {
    pub contract_id: i64,
    pub case_date: NaiveDate,
    pub act_number: String,
    pub damage_level: f64,
    pub payment_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CasePatch {
    pub contract_id: Option<i64>,
    pub case_date: Option<NaiveDate>,
    pub act_number: Option<String>,
    pub damage_level: Option<f64>,
    pub payment_date: Option<NaiveDate>,
}

impl From<insurance_case::Model> for InsuranceCase {
    fn from(m: insurance_case::Model) -> Self {
        Self {
            case_id: m.id,
            contract_id: m.contract_id,
            case_date: m.case_date,
            act_number: m.act_number,
            damage_level: m.damage_level,
            accrued_payment: m.accrued_payment,
            accrued_date: m.accrued_date,
            payment_date: m.payment_date,
        }
    }
}

// ── Audit log ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub log_id: i64,
    pub entity: String,
    pub entity_id: i64,
    pub action: String,
    pub changed_by: Option<i64>,
    pub changed_at: DateTime<Utc>,
    pub payload: Option<serde_json::Value>,
}

impl From<audit_log::Model> for AuditEntry {
    fn from(m: audit_log::Model) -> Self {
        Self {
            log_id: m.id,
            entity: m.entity,
            entity_id: m.entity_id,
            action: m.action,
            changed_by: m.changed_by,
            changed_at: m.changed_at,
            payload: m.payload,
        }
    }
}

// ── Users and authentication ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: i64,
    pub email: String,
    pub role: Role,
    pub agent_id: Option<i64>,
}

impl TryFrom<user::Model> for User {
    type Error = agency_security::RoleParseError;

    fn try_from(m: user::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: m.id,
            email: m.email,
            role: m.role.parse()?,
            agent_id: m.agent_id,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub password: String,
    /// Defaults to `Client`.
    pub role: Option<Role>,
    pub agent_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

/// Value lists the UI offers in selectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusOptions {
    pub contract_statuses: Vec<ContractStatus>,
    pub roles: Vec<Role>,
}

impl Default for StatusOptions {
    fn default() -> Self {
        Self {
            contract_statuses: ContractStatus::ALL.to_vec(),
            roles: Role::ALL.to_vec(),
        }
    }
}
