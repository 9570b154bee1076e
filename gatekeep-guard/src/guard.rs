//! Authorization Guard
//!
//! Gates are evaluated synchronously before the protected action. A denial
//! returns immediately and the action never starts; there is no retry and no
//! fallback path.

use crate::actor::Actor;
use crate::errors::{DenialError, GuardError};
use crate::policy::Capability;
use crate::store::{RecordId, RecordStore};
use std::sync::Arc;
use tracing::{debug, warn};

/// Role-gated access to protected operations
pub struct AuthorizationGuard {
    store: Arc<dyn RecordStore>,
}

impl AuthorizationGuard {
    /// Create a guard that delegates deletes to `store`
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Check `actor` against a single capability
    pub fn authorize(&self, actor: &Actor, required: Capability) -> Result<(), DenialError> {
        let decision = required.evaluate(actor);

        match decision.into_result() {
            Ok(()) => {
                debug!(actor = %actor, capability = %required, "Authorization granted");
                Ok(())
            }
            Err(denial) => {
                warn!(
                    actor = %actor,
                    capability = %required,
                    kind = %denial.kind,
                    "Authorization denied"
                );
                Err(denial)
            }
        }
    }

    /// Login gate. Only an actor whose role is exactly "admin" may proceed.
    pub fn login(&self, actor: &Actor) -> Result<(), DenialError> {
        self.authorize(actor, Capability::AdminRole)
    }

    /// Delete gate. Requires the admin flag; on success the store's result is
    /// returned unchanged.
    pub async fn delete_record(
        &self,
        record_id: &RecordId,
        actor: &Actor,
    ) -> Result<(), GuardError> {
        self.authorize(actor, Capability::AdminFlag)?;
        self.store.delete(record_id).await?;
        Ok(())
    }
}
