//! Guard error types
//!
//! Denials and store failures are kept apart: a `DenialError` means the
//! protected action never ran, a `StoreError` comes back unchanged from the
//! record store after the guard allowed the call.

use crate::store::RecordId;
use gatekeep_core::{not_found_error, storage_error, ErrorContext, GatekeepError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a gate refused an actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    /// Login attempted by an actor whose role is not "admin"
    StrictPolicyViolation,
    /// Record deletion attempted by an actor without the admin flag
    AccessDenied,
}

impl DenialKind {
    /// Stable machine-readable name
    pub fn as_str(&self) -> &'static str {
        match self {
            DenialKind::StrictPolicyViolation => "strict_policy_violation",
            DenialKind::AccessDenied => "access_denied",
        }
    }

    /// Human-readable prefix used when the denial is displayed
    pub fn label(&self) -> &'static str {
        match self {
            DenialKind::StrictPolicyViolation => "Strict Policy",
            DenialKind::AccessDenied => "Access Denied",
        }
    }
}

impl std::fmt::Display for DenialKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed authorization decision
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{}: {message}", .kind.label())]
pub struct DenialError {
    pub kind: DenialKind,
    pub message: String,
}

impl DenialError {
    pub fn new(kind: DenialKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Login role mismatch
    pub fn strict_policy_violation() -> Self {
        Self::new(DenialKind::StrictPolicyViolation, "Admin access required.")
    }

    /// Missing admin flag on delete
    pub fn access_denied() -> Self {
        Self::new(DenialKind::AccessDenied, "Admins only.")
    }
}

/// Record store result type
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures reported by a record store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record not found: {record_id}")]
    NotFound { record_id: RecordId },

    #[error("Store backend error: {message}")]
    Backend { message: String },

    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn not_found(record_id: &RecordId) -> Self {
        Self::NotFound {
            record_id: record_id.clone(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Outcome of a guarded operation that delegates to the store
#[derive(Debug, Error)]
pub enum GuardError {
    #[error(transparent)]
    Denied(#[from] DenialError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl GuardError {
    /// The denial, if the guard refused the call
    pub fn denial(&self) -> Option<&DenialError> {
        match self {
            GuardError::Denied(denial) => Some(denial),
            GuardError::Store(_) => None,
        }
    }
}

impl From<DenialError> for GatekeepError {
    fn from(denial: DenialError) -> Self {
        GatekeepError::Authorization {
            kind: denial.kind.as_str().to_string(),
            message: denial.message,
            context: ErrorContext::new("guard")
                .with_suggestion("Retry with an actor that holds the required capability"),
        }
    }
}

impl From<StoreError> for GatekeepError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { record_id } => not_found_error!(record_id, "store"),
            StoreError::Io(e) => GatekeepError::Io(e),
            StoreError::Serialization(e) => GatekeepError::Serialization(e),
            other @ StoreError::Backend { .. } => {
                storage_error!(other.to_string(), "store", other)
            }
        }
    }
}

impl From<GuardError> for GatekeepError {
    fn from(error: GuardError) -> Self {
        match error {
            GuardError::Denied(denial) => denial.into(),
            GuardError::Store(store) => store.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denial_messages() {
        let login = DenialError::strict_policy_violation();
        assert_eq!(login.kind, DenialKind::StrictPolicyViolation);
        assert_eq!(login.message, "Admin access required.");
        assert_eq!(login.to_string(), "Strict Policy: Admin access required.");

        let delete = DenialError::access_denied();
        assert_eq!(delete.kind, DenialKind::AccessDenied);
        assert_eq!(delete.message, "Admins only.");
        assert_eq!(delete.to_string(), "Access Denied: Admins only.");
    }

    #[test]
    fn test_denial_converts_to_authorization_error() {
        let error: GatekeepError = GuardError::from(DenialError::access_denied()).into();
        match error {
            GatekeepError::Authorization { kind, message, .. } => {
                assert_eq!(kind, "access_denied");
                assert_eq!(message, "Admins only.");
            }
            other => panic!("Expected Authorization error, got {other:?}"),
        }
    }

    #[test]
    fn test_store_not_found_converts_to_not_found() {
        let error: GatekeepError = StoreError::not_found(&RecordId::from("rec-9")).into();
        assert!(matches!(error, GatekeepError::NotFound { ref resource, .. } if resource == "rec-9"));
    }

    #[test]
    fn test_backend_error_converts_to_storage_with_source() {
        let error: GatekeepError = StoreError::backend("disk on fire").into();
        match error {
            GatekeepError::Storage {
                message,
                source,
                context,
            } => {
                assert_eq!(message, "Store backend error: disk on fire");
                assert!(source.is_some());
                assert_eq!(context.component, "store");
            }
            other => panic!("Expected Storage error, got {other:?}"),
        }
    }
}
