//! Raw query-string parameters.
//!
//! Every value arrives as an optional string and is parsed here, so a bad
//! value yields a `VALIDATION` error naming the parameter instead of an
//! extractor rejection.

use std::str::FromStr;

use serde::Deserialize;

use crate::domain::error::DomainError;
use crate::domain::models::ContractStatus;
use crate::domain::service::{AuditLogFilter, CaseFilter, ClientFilter, ContractFilter};
use crate::domain::validate::{clean, parse_flag, parse_id, parse_opt_date, parse_opt_id};

/// `page` and `limit`. Invalid values fall back to the defaults.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BranchQuery {
    #[serde(flatten)]
    pub paging: PageParams,
    pub query: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentQuery {
    #[serde(flatten)]
    pub paging: PageParams,
    pub name: Option<String>,
    pub branch_id: Option<String>,
}

impl AgentQuery {
    /// # Errors
    ///
    /// `branchId` is not a positive integer.
    pub fn branch_id(&self) -> Result<Option<i64>, DomainError> {
        parse_opt_id(self.branch_id.as_deref(), "branchId")
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NameQuery {
    #[serde(flatten)]
    pub paging: PageParams,
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClientQuery {
    #[serde(flatten)]
    pub paging: PageParams,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl ClientQuery {
    #[must_use]
    pub fn filter(&self) -> ClientFilter {
        ClientFilter {
            name: clean(self.name.clone()),
            phone: clean(self.phone.clone()),
            email: clean(self.email.clone()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractQuery {
    #[serde(flatten)]
    pub paging: PageParams,
    pub client_id: Option<String>,
    pub agent_id: Option<String>,
    pub status: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub active_only: Option<String>,
}

impl ContractQuery {
    /// # Errors
    ///
    /// A parameter is present but malformed.
    pub fn filter(&self) -> Result<ContractFilter, DomainError> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                ContractStatus::from_str(raw)
                    .map_err(|_| DomainError::validation("status", "Invalid contract status"))?,
            ),
        };
        Ok(ContractFilter {
            client_id: parse_opt_id(self.client_id.as_deref(), "clientId")?,
            agent_id: parse_opt_id(self.agent_id.as_deref(), "agentId")?,
            status,
            from: parse_opt_date(self.from.as_deref(), "from")?,
            to: parse_opt_date(self.to.as_deref(), "to")?,
            active_only: parse_flag(self.active_only.as_deref(), "activeOnly")?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientContractsQuery {
    #[serde(flatten)]
    pub paging: PageParams,
    pub active_only: Option<String>,
}

impl ClientContractsQuery {
    /// # Errors
    ///
    /// `activeOnly` is not a boolean.
    pub fn active_only(&self) -> Result<bool, DomainError> {
        parse_flag(self.active_only.as_deref(), "activeOnly")
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseQuery {
    #[serde(flatten)]
    pub paging: PageParams,
    pub contract_id: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl CaseQuery {
    /// # Errors
    ///
    /// A parameter is present but malformed.
    pub fn filter(&self) -> Result<CaseFilter, DomainError> {
        Ok(CaseFilter {
            contract_id: parse_opt_id(self.contract_id.as_deref(), "contractId")?,
            from: parse_opt_date(self.from.as_deref(), "from")?,
            to: parse_opt_date(self.to.as_deref(), "to")?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AuditLogQuery {
    #[serde(flatten)]
    pub paging: PageParams,
    pub entity: Option<String>,
    pub action: Option<String>,
}

impl AuditLogQuery {
    #[must_use]
    pub fn filter(&self) -> AuditLogFilter {
        AuditLogFilter {
            entity: clean(self.entity.clone()),
            action: clean(self.action.clone()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveContractsQuery {
    pub client_id: Option<String>,
}

impl ActiveContractsQuery {
    /// # Errors
    ///
    /// `clientId` is missing or not a positive integer.
    pub fn client_id(&self) -> Result<i64, DomainError> {
        match self.client_id.as_deref() {
            Some(raw) => parse_id(raw, "clientId"),
            None => Err(DomainError::validation("clientId", "clientId is required")),
        }
    }
}
