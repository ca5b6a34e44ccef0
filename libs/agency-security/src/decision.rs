//! Single-record access decisions.
//!
//! Used when a record was fetched by id without row-level filtering, or as
//! a re-check after a scoped fetch. Callers decide how a [`AccessDecision::Deny`]
//! surfaces: reads hide the record (not found), writes report forbidden.

use std::fmt;

use crate::principal::Principal;
use crate::scope::ScopePredicate;

/// Owning keys of one concrete record.
///
/// A contract has one agent and one client. A client record may sit in the
/// portfolio of several agents, one per contract, so agents are a set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordOwner {
    agents: Vec<i64>,
    client: Option<i64>,
}

impl RecordOwner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_agent(mut self, agent_id: i64) -> Self {
        if !self.agents.contains(&agent_id) {
            self.agents.push(agent_id);
        }
        self
    }

    #[must_use]
    pub fn with_agents(self, agent_ids: impl IntoIterator<Item = i64>) -> Self {
        agent_ids.into_iter().fold(self, Self::with_agent)
    }

    #[must_use]
    pub fn with_client(mut self, client_id: i64) -> Self {
        self.client = Some(client_id);
        self
    }

    #[must_use]
    pub fn agents(&self) -> &[i64] {
        &self.agents
    }

    #[must_use]
    pub fn client(&self) -> Option<i64> {
        self.client
    }
}

/// Why a record check failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DenyReason {
    /// The record is outside the agent's portfolio.
    NotInPortfolio,
    /// The record belongs to another client.
    NotOwner,
    /// The scope itself denies everything.
    ScopeDenied,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DenyReason::NotInPortfolio => "not in portfolio",
            DenyReason::NotOwner => "access denied",
            DenyReason::ScopeDenied => "no access to this resource",
        })
    }
}

/// Outcome of a single-record check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub enum AccessDecision {
    Allow,
    Deny(DenyReason),
}

impl AccessDecision {
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allow)
    }

    /// Converts into a `Result`, mapping the deny reason through `f`.
    ///
    /// # Errors
    ///
    /// Returns `f(reason)` when the decision is `Deny`.
    pub fn or_else<E>(self, f: impl FnOnce(DenyReason) -> E) -> Result<(), E> {
        match self {
            AccessDecision::Allow => Ok(()),
            AccessDecision::Deny(reason) => Err(f(reason)),
        }
    }
}

impl ScopePredicate {
    /// Evaluates this scope against one record's owning keys.
    pub fn evaluate(&self, owner: &RecordOwner) -> AccessDecision {
        let (owned, reason) = match self {
            ScopePredicate::Unrestricted => return AccessDecision::Allow,
            ScopePredicate::Denied => return AccessDecision::Deny(DenyReason::ScopeDenied),
            ScopePredicate::OwnedByAgent(id) => {
                (owner.agents.contains(id), DenyReason::NotInPortfolio)
            }
            ScopePredicate::OwnedByClient(id) => (owner.client == Some(*id), DenyReason::NotOwner),
        };
        if owned {
            AccessDecision::Allow
        } else {
            AccessDecision::Deny(reason)
        }
    }
}

/// Authorizes `principal` to act on a single record under `scope`.
pub fn authorize_record_access(
    principal: &Principal,
    scope: &ScopePredicate,
    owner: &RecordOwner,
) -> AccessDecision {
    let decision = scope.evaluate(owner);
    if let AccessDecision::Deny(reason) = decision {
        tracing::debug!(
            user_id = principal.user_id(),
            role = %principal.role(),
            %scope,
            %reason,
            "record access denied"
        );
    }
    decision
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn agent() -> Principal {
        Principal::agent(1, "agent@agency.test", 7)
    }

    #[test]
    fn unrestricted_allows_anything() {
        let p = Principal::admin(1, "root@agency.test");
        let d = authorize_record_access(&p, &ScopePredicate::Unrestricted, &RecordOwner::new());
        assert_eq!(d, AccessDecision::Allow);
    }

    #[test]
    fn agent_scope_matches_owning_agent() {
        let owner = RecordOwner::new().with_agent(7).with_client(3);
        let d = authorize_record_access(&agent(), &ScopePredicate::OwnedByAgent(7), &owner);
        assert_eq!(d, AccessDecision::Allow);

        let owner = RecordOwner::new().with_agent(8).with_client(3);
        let d = authorize_record_access(&agent(), &ScopePredicate::OwnedByAgent(7), &owner);
        assert_eq!(d, AccessDecision::Deny(DenyReason::NotInPortfolio));
    }

    #[test]
    fn agent_scope_over_shared_client() {
        let owner = RecordOwner::new().with_agents([4, 7, 4]).with_client(3);
        assert_eq!(owner.agents(), &[4, 7]);
        assert!(ScopePredicate::OwnedByAgent(7).evaluate(&owner).is_allowed());
        assert!(!ScopePredicate::OwnedByAgent(5).evaluate(&owner).is_allowed());
    }

    #[test]
    fn client_scope_matches_owning_client() {
        let p = Principal::client(2, "c@agency.test");
        let owner = RecordOwner::new().with_agent(7).with_client(3);
        assert!(authorize_record_access(&p, &ScopePredicate::OwnedByClient(3), &owner).is_allowed());
        assert_eq!(
            authorize_record_access(&p, &ScopePredicate::OwnedByClient(4), &owner),
            AccessDecision::Deny(DenyReason::NotOwner)
        );
    }

    #[test]
    fn denied_scope_denies_every_record() {
        let owners = [
            RecordOwner::new(),
            RecordOwner::new().with_agent(7),
            RecordOwner::new().with_client(7),
        ];
        for owner in &owners {
            assert_eq!(
                authorize_record_access(&agent(), &ScopePredicate::Denied, owner),
                AccessDecision::Deny(DenyReason::ScopeDenied)
            );
        }
    }

    #[test]
    fn or_else_maps_reason() {
        let r: Result<(), String> =
            AccessDecision::Deny(DenyReason::NotInPortfolio).or_else(|r| r.to_string());
        assert_eq!(r, Err("not in portfolio".to_owned()));
        assert!(AccessDecision::Allow.or_else(|r| r.to_string()).is_ok());
    }
}
