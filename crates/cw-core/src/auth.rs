//! Identity and role types for Case Warden.
//!
//! Authentication itself happens outside the core: every engine call arrives
//! with an [`Actor`] that the external identity provider has already
//! authenticated. The core only checks roles and ownership.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Roles recognized by the case lifecycle engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full administrative access, including investigator assignment.
    Admin,
    /// Reviews submitted investigation reports.
    Officer,
    /// Conducts investigations and submits reports.
    Investigator,
    /// A regular user who can report incidents.
    Reporter,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Officer => "officer",
            Role::Investigator => "investigator",
            Role::Reporter => "reporter",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The authenticated caller of an engine operation.
///
/// Carries identity through transitions for role checks and audit logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    /// Unique identifier of the acting user.
    pub id: Uuid,
    /// Human-readable name for audit rows and log lines.
    pub name: String,
    /// The actor's role as supplied by the identity provider.
    pub role: Role,
}

impl Actor {
    pub fn new(id: Uuid, name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            role,
        }
    }

    /// Identity string used in audit entries and tracing fields.
    pub fn audit_identity(&self) -> String {
        format!("{}:{}", self.id, self.name)
    }

    /// Checks membership in a role set.
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }
}

/// A user record as seen through the external identity directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRef {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
    /// Inactive users are skipped for role broadcasts and cannot be assigned.
    pub active: bool,
}

impl UserRef {
    pub fn new(id: Uuid, name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            active: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_strings() {
        assert_eq!(Role::Admin.as_str(), "admin");
        assert_eq!(Role::Investigator.to_string(), "investigator");
    }

    #[test]
    fn actor_role_set() {
        let actor = Actor::new(Uuid::new_v4(), "pat", Role::Officer);
        assert!(actor.has_any_role(&[Role::Admin, Role::Officer]));
        assert!(!actor.has_any_role(&[Role::Reporter]));
    }

    #[test]
    fn audit_identity_contains_name() {
        let actor = Actor::new(Uuid::new_v4(), "pat", Role::Admin);
        assert!(actor.audit_identity().ends_with(":pat"));
    }
}
