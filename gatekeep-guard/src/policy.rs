//! Capabilities and policy decisions
//!
//! Each capability is a single predicate over one actor attribute. Evaluation
//! is pure: no caching, no hierarchy, no side effects.

use crate::actor::Actor;
use crate::errors::DenialError;
use serde::{Deserialize, Serialize};

/// The only role accepted by the login gate
pub const ADMIN_ROLE: &str = "admin";

/// Something an actor must hold before a protected action runs
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// `role` is exactly "admin"; checked at login
    AdminRole,
    /// `is_admin` is set; checked before deleting a record
    AdminFlag,
}

impl Capability {
    /// Decide whether `actor` holds this capability
    pub fn evaluate(&self, actor: &Actor) -> PolicyDecision {
        match self {
            Capability::AdminRole => {
                if actor.role.as_deref() == Some(ADMIN_ROLE) {
                    PolicyDecision::Allowed
                } else {
                    PolicyDecision::Denied(DenialError::strict_policy_violation())
                }
            }
            Capability::AdminFlag => {
                if actor.is_admin {
                    PolicyDecision::Allowed
                } else {
                    PolicyDecision::Denied(DenialError::access_denied())
                }
            }
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::AdminRole => write!(f, "admin_role"),
            Capability::AdminFlag => write!(f, "admin_flag"),
        }
    }
}

impl std::str::FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin_role" => Ok(Capability::AdminRole),
            "admin_flag" => Ok(Capability::AdminFlag),
            _ => Err(format!("Unknown capability: {}", s)),
        }
    }
}

/// Result of evaluating a capability against an actor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyDecision {
    Allowed,
    Denied(DenialError),
}

impl PolicyDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, PolicyDecision::Allowed)
    }

    pub fn into_result(self) -> Result<(), DenialError> {
        match self {
            PolicyDecision::Allowed => Ok(()),
            PolicyDecision::Denied(denial) => Err(denial),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DenialKind;

    fn denial_kind(decision: PolicyDecision) -> Option<DenialKind> {
        decision.into_result().err().map(|d| d.kind)
    }

    #[test]
    fn test_admin_role_is_exact_match() {
        let cap = Capability::AdminRole;
        assert!(cap.evaluate(&Actor::new().with_role("admin")).is_allowed());

        for role in ["user", "Admin", "ADMIN", " admin", "admin ", "superadmin", ""] {
            assert_eq!(
                denial_kind(cap.evaluate(&Actor::new().with_role(role))),
                Some(DenialKind::StrictPolicyViolation),
                "role {:?} must be denied",
                role
            );
        }
    }

    #[test]
    fn test_admin_role_denies_absent_role() {
        assert_eq!(
            denial_kind(Capability::AdminRole.evaluate(&Actor::new())),
            Some(DenialKind::StrictPolicyViolation)
        );
    }

    #[test]
    fn test_admin_role_ignores_admin_flag() {
        let actor = Actor::new().with_role("user").with_admin_flag(true);
        assert!(!Capability::AdminRole.evaluate(&actor).is_allowed());
    }

    #[test]
    fn test_admin_flag_ignores_role() {
        let cap = Capability::AdminFlag;
        assert!(cap.evaluate(&Actor::new().with_admin_flag(true)).is_allowed());
        assert_eq!(
            denial_kind(cap.evaluate(&Actor::new().with_role("admin"))),
            Some(DenialKind::AccessDenied)
        );
    }

    #[test]
    fn test_capability_names() {
        assert_eq!(Capability::AdminRole.to_string(), "admin_role");
        assert_eq!("ADMIN_FLAG".parse::<Capability>(), Ok(Capability::AdminFlag));
        assert!("root".parse::<Capability>().is_err());
    }
}
