use std::fmt;

use serde::{Deserialize, Serialize};

/// The closed set of collections the access layer knows how to scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Client,
    Agent,
    Branch,
    Contract,
    InsuranceCase,
    InsuranceType,
    AuditLog,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 7] = [
        ResourceKind::Client,
        ResourceKind::Agent,
        ResourceKind::Branch,
        ResourceKind::Contract,
        ResourceKind::InsuranceCase,
        ResourceKind::InsuranceType,
        ResourceKind::AuditLog,
    ];

    /// Kinds whose rows belong to an agent's portfolio or to one client.
    #[must_use]
    pub const fn is_portfolio(self) -> bool {
        matches!(
            self,
            ResourceKind::Client | ResourceKind::Contract | ResourceKind::InsuranceCase
        )
    }

    /// Shared reference data readable by every role.
    #[must_use]
    pub const fn is_reference(self) -> bool {
        matches!(self, ResourceKind::Branch | ResourceKind::InsuranceType)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Client => "Client",
            ResourceKind::Agent => "Agent",
            ResourceKind::Branch => "Branch",
            ResourceKind::Contract => "Contract",
            ResourceKind::InsuranceCase => "InsuranceCase",
            ResourceKind::InsuranceType => "InsuranceType",
            ResourceKind::AuditLog => "AuditLog",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
