use std::collections::HashMap;
use std::sync::Arc;

use agency_db::secure::{QueryPlan, build_queries};
use agency_security::{Principal, ResourceKind, Role};
use chrono::Utc;
use sea_orm::{ColumnTrait, ConnectionTrait, QueryFilter, QueryOrder};
use tracing::instrument;

use super::clients::{client_owner, require_own_client};
use super::contracts::ContractFilter;
use super::{ANYONE, ServiceDeps, require_role};
use crate::domain::error::DomainError;
use crate::domain::models::{ActiveContract, ActiveContractsReport, Contract};
use crate::infra::storage::entity::{agent, contract, insurance_type};

pub struct ReportsService {
    deps: Arc<ServiceDeps>,
}

impl ReportsService {
    pub(super) fn new(deps: Arc<ServiceDeps>) -> Self {
        Self { deps }
    }

    /// Contracts of one client that are active and not yet ended, newest
    /// start first. A client may only ask for themselves, an agent only for
    /// a client in their portfolio.
    #[instrument(skip(self, principal), fields(user_id = principal.user_id()))]
    pub async fn active_contracts(
        &self,
        principal: &Principal,
        client_id: i64,
    ) -> Result<ActiveContractsReport, DomainError> {
        require_role(principal, ANYONE)?;
        match principal.role() {
            Role::Client => require_own_client(&self.deps, principal, client_id).await?,
            Role::Agent => {
                let owner = client_owner(&self.deps, client_id).await?;
                self.deps
                    .authorize_write(principal, ResourceKind::Client, "Client", &owner)
                    .await?;
            }
            Role::Admin => {}
        }

        let filter = ContractFilter {
            client_id: Some(client_id),
            active_only: true,
            ..Default::default()
        };
        let scope = self.deps.scope(principal, ResourceKind::Contract).await?;
        let QueryPlan::Select(query) = build_queries::<contract::Entity>(
            &filter.filter_set(Utc::now().date_naive()),
            &scope,
            self.deps.conn().get_database_backend(),
        ) else {
            return Ok(ActiveContractsReport {
                client_id,
                data: Vec::new(),
            });
        };
        let rows = query
            .filtered()
            .order_by_desc(contract::Column::StartDate)
            .order_by_desc(contract::Column::Id)
            .all(self.deps.conn())
            .await?;

        let agent_names = self
            .names::<agent::Entity, _>(rows.iter().map(|c| c.agent_id), |a| (a.id, a.full_name))
            .await?;
        let type_names = self
            .names::<insurance_type::Entity, _>(rows.iter().map(|c| c.insurance_type_id), |t| {
                (t.id, t.name)
            })
            .await?;

        let data = rows
            .into_iter()
            .map(|row| ActiveContract {
                agent_name: agent_names.get(&row.agent_id).cloned(),
                insurance_type_name: type_names.get(&row.insurance_type_id).cloned(),
                contract: Contract::from(row),
            })
            .collect::<Vec<_>>();
        tracing::debug!(rows = data.len(), "built active contracts report");
        Ok(ActiveContractsReport { client_id, data })
    }

    /// Display names of the referenced rows, keyed by id.
    async fn names<E, F>(
        &self,
        ids: impl Iterator<Item = i64>,
        name_of: F,
    ) -> Result<HashMap<i64, String>, DomainError>
    where
        E: agency_db::secure::ScopableEntity,
        F: Fn(E::Model) -> (i64, String),
    {
        let mut ids: Vec<i64> = ids.collect();
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = E::find()
            .filter(E::id_col().is_in(ids))
            .all(self.deps.conn())
            .await?;
        Ok(rows.into_iter().map(name_of).collect())
    }
}
