use std::fmt;

use serde::{Deserialize, Serialize};

/// Which rows of one resource kind a principal may see or act on.
///
/// Exactly one variant applies per request. Variants never combine: a
/// principal has one role, so there is no OR across owners.
///
/// # Examples
///
/// ```
/// use agency_security::ScopePredicate;
///
/// // deny-all (default)
/// let scope = ScopePredicate::default();
/// assert!(scope.is_denied());
///
/// let scope = ScopePredicate::OwnedByAgent(7);
/// assert_eq!(scope.agent_id(), Some(7));
/// assert!(!scope.is_unrestricted());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopePredicate {
    /// No row-level filtering.
    Unrestricted,
    /// Rows whose owning agent is the given agent.
    OwnedByAgent(i64),
    /// Rows whose owning client is the given client.
    OwnedByClient(i64),
    /// Nothing is visible. Queries under this scope are never issued.
    #[default]
    Denied,
}

impl ScopePredicate {
    // ── Constructors ────────────────────────────────────────────────

    /// Agent scope, or `Denied` when the agent link is missing.
    #[must_use]
    pub fn for_agent(agent_id: Option<i64>) -> Self {
        agent_id.map_or(Self::Denied, Self::OwnedByAgent)
    }

    /// Client scope, or `Denied` when no client record was found.
    #[must_use]
    pub fn for_client(client_id: Option<i64>) -> Self {
        client_id.map_or(Self::Denied, Self::OwnedByClient)
    }

    // ── Accessors ───────────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Self::Unrestricted)
    }

    #[inline]
    #[must_use]
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Denied)
    }

    #[inline]
    #[must_use]
    pub fn agent_id(&self) -> Option<i64> {
        match self {
            Self::OwnedByAgent(id) => Some(*id),
            Self::Unrestricted | Self::OwnedByClient(_) | Self::Denied => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn client_id(&self) -> Option<i64> {
        match self {
            Self::OwnedByClient(id) => Some(*id),
            Self::Unrestricted | Self::OwnedByAgent(_) | Self::Denied => None,
        }
    }
}

impl fmt::Display for ScopePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unrestricted => f.write_str("unrestricted"),
            Self::OwnedByAgent(id) => write!(f, "agent:{id}"),
            Self::OwnedByClient(id) => write!(f, "client:{id}"),
            Self::Denied => f.write_str("denied"),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn default_is_denied() {
        assert_eq!(ScopePredicate::default(), ScopePredicate::Denied);
    }

    #[test]
    fn missing_links_deny() {
        assert!(ScopePredicate::for_agent(None).is_denied());
        assert!(ScopePredicate::for_client(None).is_denied());
        assert_eq!(ScopePredicate::for_agent(Some(3)), ScopePredicate::OwnedByAgent(3));
        assert_eq!(ScopePredicate::for_client(Some(5)), ScopePredicate::OwnedByClient(5));
    }

    #[test]
    fn accessors_are_exclusive() {
        let s = ScopePredicate::OwnedByClient(5);
        assert_eq!(s.client_id(), Some(5));
        assert_eq!(s.agent_id(), None);
        assert!(!s.is_unrestricted());
        assert!(!s.is_denied());
    }

    #[test]
    fn display() {
        assert_eq!(ScopePredicate::OwnedByAgent(7).to_string(), "agent:7");
        assert_eq!(ScopePredicate::Denied.to_string(), "denied");
    }
}
