use std::sync::Arc;

use agency_db::secure::FilterSet;
use agency_db::{Page, Paged};
use agency_security::{Principal, RecordOwner, ResourceKind, Role};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QuerySelect, Set,
};
use tracing::instrument;

use super::contracts::ContractFilter;
use super::{ADMIN, ANYONE, STAFF, ServiceDeps, require_role};
use crate::domain::error::DomainError;
use crate::domain::models::{Client, ClientPatch, Contract, NewClient};
use crate::domain::ports::AuditAction;
use crate::domain::validate::clean;
use crate::infra::storage::entity::{client, contract};

const ENTITY: &str = "Client";

/// Optional client list filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientFilter {
    /// Last or first name, case-insensitive.
    pub name: Option<String>,
    pub phone: Option<String>,
    /// Case-insensitive.
    pub email: Option<String>,
}

impl ClientFilter {
    fn filter_set(&self) -> FilterSet {
        FilterSet::new()
            .any_contains_ci(
                "name",
                &[client::Column::LastName, client::Column::FirstName],
                self.name.as_deref(),
            )
            .contains("phone", client::Column::Phone, self.phone.as_deref())
            .contains_ci("email", client::Column::Email, self.email.as_deref())
    }
}

pub struct ClientsService {
    deps: Arc<ServiceDeps>,
}

impl ClientsService {
    pub(super) fn new(deps: Arc<ServiceDeps>) -> Self {
        Self { deps }
    }

    #[instrument(skip(self, principal), fields(user_id = principal.user_id()))]
    pub async fn list(
        &self,
        principal: &Principal,
        filter: &ClientFilter,
        page: &Page,
    ) -> Result<Paged<Client>, DomainError> {
        require_role(principal, ANYONE)?;
        let paged = self
            .deps
            .list::<client::Entity>(principal, &filter.filter_set(), page)
            .await?;
        Ok(paged.map(Client::from))
    }

    #[instrument(skip(self, principal), fields(user_id = principal.user_id(), client_id = id))]
    pub async fn get(&self, principal: &Principal, id: i64) -> Result<Client, DomainError> {
        require_role(principal, ANYONE)?;
        let model = self.deps.get::<client::Entity>(principal, ENTITY, id).await?;
        Ok(model.into())
    }

    #[instrument(skip(self, principal, new), fields(user_id = principal.user_id()))]
    pub async fn create(&self, principal: &Principal, new: NewClient) -> Result<Client, DomainError> {
        require_role(principal, STAFF)?;
        new.validate()?;
        tracing::info!("Creating client");

        let row = client::ActiveModel {
            last_name: Set(new.last_name.trim().to_owned()),
            first_name: Set(new.first_name.trim().to_owned()),
            middle_name: Set(clean(new.middle_name)),
            address: Set(clean(new.address)),
            phone: Set(clean(new.phone)),
            email: Set(clean(new.email)),
            ..Default::default()
        };
        let id = client::Entity::insert(row)
            .exec(self.deps.conn())
            .await?
            .last_insert_id;

        let created: Client = self.deps.fetch::<client::Entity>(ENTITY, id).await?.into();
        self.deps
            .audit(principal, ENTITY, id, AuditAction::Insert, &created)
            .await;
        Ok(created)
    }

    /// An agent may update only clients in their portfolio.
    #[instrument(skip(self, principal, patch), fields(user_id = principal.user_id(), client_id = id))]
    pub async fn update(
        &self,
        principal: &Principal,
        id: i64,
        patch: ClientPatch,
    ) -> Result<Client, DomainError> {
        require_role(principal, STAFF)?;
        patch.validate()?;

        let existing = self.deps.fetch::<client::Entity>(ENTITY, id).await?;
        let owner = client_owner(&self.deps, id).await?;
        self.deps
            .authorize_write(principal, ResourceKind::Client, ENTITY, &owner)
            .await?;

        let mut row = existing.into_active_model();
        if let Some(last_name) = patch.last_name {
            row.last_name = Set(last_name.trim().to_owned());
        }
        if let Some(first_name) = patch.first_name {
            row.first_name = Set(first_name.trim().to_owned());
        }
        if patch.middle_name.is_some() {
            row.middle_name = Set(clean(patch.middle_name));
        }
        if patch.address.is_some() {
            row.address = Set(clean(patch.address));
        }
        if patch.phone.is_some() {
            row.phone = Set(clean(patch.phone));
        }
        if patch.email.is_some() {
            row.email = Set(clean(patch.email));
        }
        let updated: Client = row.update(self.deps.conn()).await?.into();

        self.deps
            .audit(principal, ENTITY, id, AuditAction::Update, &updated)
            .await;
        Ok(updated)
    }

    #[instrument(skip(self, principal), fields(user_id = principal.user_id(), client_id = id))]
    pub async fn delete(&self, principal: &Principal, id: i64) -> Result<(), DomainError> {
        require_role(principal, ADMIN)?;
        self.deps
            .delete::<client::Entity, Client>(principal, ENTITY, id)
            .await
    }

    /// Contracts of one client. A client may only ask for their own; an
    /// agent sees only the contracts they handle.
    #[instrument(skip(self, principal), fields(user_id = principal.user_id(), client_id = id))]
    pub async fn contracts(
        &self,
        principal: &Principal,
        id: i64,
        active_only: bool,
        page: &Page,
    ) -> Result<Paged<Contract>, DomainError> {
        require_role(principal, ANYONE)?;
        if principal.role() == Role::Client {
            require_own_client(&self.deps, principal, id).await?;
        }

        let filter = ContractFilter {
            client_id: Some(id),
            active_only,
            ..Default::default()
        };
        let filters = filter.filter_set(Utc::now().date_naive());
        let paged = self
            .deps
            .list::<contract::Entity>(principal, &filters, page)
            .await?;
        Ok(paged.map(Contract::from))
    }
}

/// Rejects a client principal asking about another client.
pub(super) async fn require_own_client(
    deps: &ServiceDeps,
    principal: &Principal,
    id: i64,
) -> Result<(), DomainError> {
    let scope = deps.scope(principal, ResourceKind::Client).await?;
    if scope.client_id() == Some(id) {
        Ok(())
    } else {
        Err(DomainError::forbidden("Access denied"))
    }
}

/// The client and every agent holding one of its contracts.
pub(super) async fn client_owner(deps: &ServiceDeps, id: i64) -> Result<RecordOwner, DomainError> {
    let agents: Vec<i64> = contract::Entity::find()
        .select_only()
        .column(contract::Column::AgentId)
        .distinct()
        .filter(contract::Column::ClientId.eq(id))
        .into_tuple()
        .all(deps.conn())
        .await?;
    Ok(RecordOwner::new().with_client(id).with_agents(agents))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn blank_filters_are_skipped() {
        let filter = ClientFilter {
            name: Some(String::new()),
            phone: None,
            email: Some("gmail".to_owned()),
        };
        assert_eq!(filter.filter_set().names(), vec!["email"]);
    }
}
