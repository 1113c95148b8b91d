// Role-based capability resolution.
//
// Capabilities are coarse and additive: a role maps to a fixed set, with no
// subtraction, per-resource ACLs or inheritance. Resolution is a constant
// table lookup and cannot fail; anything unrecognized lands on the
// least-privilege `AllUsers` role.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// User role as assigned by the backend profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    LabStaff,
    Product,
    Account,
    AllUsers,
}

/// A named permission gating one UI or API action.
///
/// Read-only inventory viewing is ungated and has no capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    CreateChemical,
    EditChemical,
    DeleteChemical,
    CreateFormulation,
    EditFormulation,
    DeleteFormulation,
    ViewProductTable,
    ViewAccountTable,
    ManageAlerts,
    ManageUsers,
    ApproveUsers,
    DeleteUsers,
    ViewLogs,
}

impl Capability {
    /// Get all defined capabilities
    pub fn all() -> &'static [Capability] {
        &[
            Self::CreateChemical,
            Self::EditChemical,
            Self::DeleteChemical,
            Self::CreateFormulation,
            Self::EditFormulation,
            Self::DeleteFormulation,
            Self::ViewProductTable,
            Self::ViewAccountTable,
            Self::ManageAlerts,
            Self::ManageUsers,
            Self::ApproveUsers,
            Self::DeleteUsers,
            Self::ViewLogs,
        ]
    }
}

impl Role {
    /// Parse a role tag from the backend. Unknown values fall back to
    /// `AllUsers` rather than erroring, failing safe toward least privilege.
    pub fn parse(tag: &str) -> Self {
        match tag {
            "admin" => Self::Admin,
            "lab_staff" => Self::LabStaff,
            "product" => Self::Product,
            "account" => Self::Account,
            _ => Self::AllUsers,
        }
    }

    /// Resolve the session role once, from the profile role if present,
    /// otherwise the auth-provider role. Callers must do this at session
    /// start and carry the result; the engine never re-derives the role.
    pub fn from_sources(profile_role: Option<&str>, user_role: Option<&str>) -> Self {
        match profile_role.or(user_role) {
            Some(tag) => Self::parse(tag),
            None => Self::AllUsers,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::LabStaff => "lab_staff",
            Self::Product => "product",
            Self::Account => "account",
            Self::AllUsers => "all_users",
        }
    }

    /// Capabilities granted to this role.
    pub fn capabilities(&self) -> &'static [Capability] {
        match self {
            Self::Admin => &[
                Capability::CreateChemical,
                Capability::EditChemical,
                Capability::DeleteChemical,
                Capability::CreateFormulation,
                Capability::EditFormulation,
                Capability::DeleteFormulation,
                Capability::ViewProductTable,
                Capability::ViewAccountTable,
                Capability::ManageAlerts,
                Capability::ManageUsers,
                Capability::ApproveUsers,
                Capability::DeleteUsers,
                Capability::ViewLogs,
            ],
            Self::LabStaff => &[
                Capability::CreateChemical,
                Capability::EditChemical,
                Capability::CreateFormulation,
                Capability::EditFormulation,
            ],
            Self::Product => &[
                Capability::EditChemical,
                Capability::EditFormulation,
                Capability::ViewProductTable,
                Capability::ManageAlerts,
            ],
            Self::Account => &[
                Capability::EditChemical,
                Capability::EditFormulation,
                Capability::ViewAccountTable,
            ],
            Self::AllUsers => &[],
        }
    }

    /// Check whether this role holds a capability
    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resolve a role to its capability set.
pub fn resolve(role: Role) -> HashSet<Capability> {
    role.capabilities().iter().copied().collect()
}
