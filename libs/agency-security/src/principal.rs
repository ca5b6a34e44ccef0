use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role of an authenticated caller. A principal has exactly one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Agent,
    Client,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Agent, Role::Client];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Agent => "Agent",
            Role::Client => "Client",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct RoleParseError(pub String);

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| RoleParseError(s.to_owned()))
    }
}

/// The authenticated caller of a single request.
///
/// Rebuilt from a verified credential on every request and dropped with it.
/// An `Agent` is expected to carry an `agent_id`; a `Client` is linked to its
/// client record through `email`. Missing links are not rejected here: the
/// scope resolver turns them into a denied scope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    user_id: i64,
    email: String,
    role: Role,
    agent_id: Option<i64>,
}

impl Principal {
    #[must_use]
    pub fn new(user_id: i64, email: impl Into<String>, role: Role, agent_id: Option<i64>) -> Self {
        Self {
            user_id,
            email: email.into(),
            role,
            agent_id,
        }
    }

    // ── Convenience constructors ────────────────────────────────────

    #[must_use]
    pub fn admin(user_id: i64, email: impl Into<String>) -> Self {
        Self::new(user_id, email, Role::Admin, None)
    }

    #[must_use]
    pub fn agent(user_id: i64, email: impl Into<String>, agent_id: i64) -> Self {
        Self::new(user_id, email, Role::Agent, Some(agent_id))
    }

    #[must_use]
    pub fn client(user_id: i64, email: impl Into<String>) -> Self {
        Self::new(user_id, email, Role::Client, None)
    }

    // ── Accessors ───────────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    #[inline]
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[inline]
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Agent id linked to this principal, only meaningful for `Role::Agent`.
    #[inline]
    #[must_use]
    pub fn agent_id(&self) -> Option<i64> {
        match self.role {
            Role::Agent => self.agent_id,
            Role::Admin | Role::Client => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Coarse endpoint allowlist check.
    #[must_use]
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn agent_id_is_hidden_for_non_agents() {
        let p = Principal::new(1, "a@x.io", Role::Client, Some(9));
        assert_eq!(p.agent_id(), None);

        let p = Principal::agent(2, "b@x.io", 9);
        assert_eq!(p.agent_id(), Some(9));
    }

    #[test]
    fn allowlist() {
        let p = Principal::client(3, "c@x.io");
        assert!(p.has_any_role(&[Role::Admin, Role::Client]));
        assert!(!p.has_any_role(&[Role::Admin, Role::Agent]));
    }

    #[test]
    fn serializes_camel_case() {
        let p = Principal::agent(4, "d@x.io", 7);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["userId"], 4);
        assert_eq!(json["agentId"], 7);
        assert_eq!(json["role"], "Agent");
    }
}
