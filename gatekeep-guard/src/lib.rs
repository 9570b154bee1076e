//! gatekeep guard
//!
//! Role-gated authorization for two protected operations:
//! - login, allowed only for actors whose role is "admin"
//! - record deletion, allowed only for actors carrying the admin flag
//!
//! The record store is injected, so any persistence layer (or a test double)
//! can sit behind the delete gate.

pub mod actor;
pub mod errors;
pub mod guard;
pub mod policy;
pub mod reset;
pub mod store;

pub use actor::Actor;
pub use errors::{DenialError, DenialKind, GuardError, StoreError, StoreResult};
pub use guard::AuthorizationGuard;
pub use policy::{Capability, PolicyDecision, ADMIN_ROLE};
pub use reset::{LogNotifier, PasswordResetService, ResetNotifier};
pub use store::{InMemoryRecordStore, JsonFileRecordStore, RecordId, RecordStore};

use gatekeep_core::StoreConfig;
use std::sync::Arc;

/// Build the record store described by `config`.
///
/// A configured `path` selects the JSON file store; otherwise an in-memory
/// store is seeded with `records`.
pub fn store_from_config(config: &StoreConfig) -> Arc<dyn RecordStore> {
    match &config.path {
        Some(path) => Arc::new(JsonFileRecordStore::new(path)),
        None => Arc::new(InMemoryRecordStore::with_records(
            config.records.iter().cloned(),
        )),
    }
}
