use agency_security::ScopePredicate;
use sea_orm::Condition;

use crate::secure::ScopableEntity;

/// Compiles a scope into a row condition for `E`.
///
/// # Policy Rules
///
/// | Scope | Result |
/// |-------|--------|
/// | `Unrestricted` | `Some(TRUE)`, no filtering |
/// | `OwnedByAgent(id)` | `Some(E::agent_condition(id))` |
/// | `OwnedByClient(id)` | `Some(E::client_condition(id))` |
/// | `Denied` | `None`: do not query |
///
/// An owner scope over an entity without that kind of owner is treated as
/// denied (fail-closed).
#[must_use]
pub fn build_scope_condition<E: ScopableEntity>(scope: &ScopePredicate) -> Option<Condition> {
    let cond = match scope {
        ScopePredicate::Unrestricted => Some(Condition::all()),
        ScopePredicate::OwnedByAgent(id) => E::agent_condition(*id),
        ScopePredicate::OwnedByClient(id) => E::client_condition(*id),
        ScopePredicate::Denied => return None,
    };
    if cond.is_none() {
        tracing::warn!(kind = %E::KIND, %scope, "entity has no owner column for scope; denying");
    }
    cond
}
