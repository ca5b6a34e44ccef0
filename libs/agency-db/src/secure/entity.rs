use agency_security::ResourceKind;
use sea_orm::{Condition, EntityTrait, Order, Select};

/// Declarative descriptor of a scoped collection.
///
/// # Example
///
/// ```rust,ignore
/// impl ScopableEntity for contract::Entity {
///     const KIND: ResourceKind = ResourceKind::Contract;
///
///     fn id_col() -> Self::Column {
///         contract::Column::Id
///     }
///
///     fn sort() -> Vec<(Self::Column, Order)> {
///         vec![(contract::Column::Id, Order::Desc)]
///     }
///
///     fn agent_condition(agent_id: i64) -> Option<Condition> {
///         Some(Condition::all().add(contract::Column::AgentId.eq(agent_id)))
///     }
/// }
/// ```
pub trait ScopableEntity: EntityTrait {
    const KIND: ResourceKind;

    /// Primary key column, used for lookups by id.
    fn id_col() -> Self::Column;

    /// Fixed sort order. Not caller-controlled.
    fn sort() -> Vec<(Self::Column, Order)>;

    /// Unconditional base query with every join the filters and owner
    /// conditions need.
    fn base_query() -> Select<Self> {
        Self::find()
    }

    /// Rows in the given agent's portfolio. `None`: the entity has no agent
    /// owner, and an agent scope over it selects nothing.
    fn agent_condition(_agent_id: i64) -> Option<Condition> {
        None
    }

    /// Rows owned by the given client. `None` as for
    /// [`ScopableEntity::agent_condition`].
    fn client_condition(_client_id: i64) -> Option<Condition> {
        None
    }
}
