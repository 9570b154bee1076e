//! Actor model
//!
//! The identity/session layer owns actors; the guard only reads them.

use serde::{Deserialize, Serialize};

/// The entity whose permissions are being checked.
///
/// `role` and `is_admin` are independent: neither is derived from the other,
/// and each gate reads exactly one of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Actor {
    /// Identifier used for logging only
    pub id: Option<String>,
    /// Role identifier, e.g. "admin" or "user"
    pub role: Option<String>,
    /// Admin flag consulted by the delete gate
    #[serde(alias = "isAdmin")]
    pub is_admin: bool,
}

impl Actor {
    /// An actor with no attributes set
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_admin_flag(mut self, is_admin: bool) -> Self {
        self.is_admin = is_admin;
        self
    }

    /// Load an actor from a JSON document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Get actor display string
    pub fn display_string(&self) -> String {
        let id = self.id.as_deref().unwrap_or("anonymous");
        match &self.role {
            Some(role) => format!("{} ({})", id, role),
            None => format!("{} (no role)", id),
        }
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display_string())
    }
}
