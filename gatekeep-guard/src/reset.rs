//! Password reset requests

use async_trait::async_trait;
use gatekeep_core::{validation_error, ErrorContext, GatekeepError, GatekeepResult, ResetConfig};
use std::sync::Arc;
use tracing::info;

/// Delivers a reset link to the owner of an email address
#[async_trait]
pub trait ResetNotifier: Send + Sync {
    async fn send_reset_link(&self, email: &str, link: &str) -> GatekeepResult<()>;
}

/// Notifier that only writes the link to the log
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl ResetNotifier for LogNotifier {
    async fn send_reset_link(&self, email: &str, link: &str) -> GatekeepResult<()> {
        info!(email = %email, link = %link, "Sending reset link to {}", email);
        Ok(())
    }
}

/// Validates reset requests and hands them to a notifier
pub struct PasswordResetService {
    config: ResetConfig,
    notifier: Arc<dyn ResetNotifier>,
}

impl PasswordResetService {
    pub fn new(config: ResetConfig, notifier: Arc<dyn ResetNotifier>) -> Self {
        Self { config, notifier }
    }

    /// Service that logs links instead of sending them
    pub fn logging(config: ResetConfig) -> Self {
        Self::new(config, Arc::new(LogNotifier))
    }

    /// Start a password reset for `email`.
    ///
    /// The address must be non-empty and contain `@`; otherwise the notifier
    /// is not contacted.
    pub async fn request_reset(&self, email: &str) -> GatekeepResult<()> {
        if email.is_empty() || !email.contains('@') {
            return Err(validation_error!("Invalid email provided.", "email", "reset"));
        }

        let link = self.reset_link(email);
        self.notifier
            .send_reset_link(email, &link)
            .await
            .map_err(|e| GatekeepError::Internal {
                message: format!("Failed to deliver reset link: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("reset").with_operation("send_reset_link"),
            })
    }

    /// Link handed to the notifier for `email`
    pub fn reset_link(&self, email: &str) -> String {
        let base = self.config.link_base_url.trim_end_matches('/');
        format!("{}?email={}", base, urlencoding::encode(email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CapturingNotifier {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl ResetNotifier for CapturingNotifier {
        async fn send_reset_link(&self, email: &str, link: &str) -> GatekeepResult<()> {
            self.sent
                .lock()
                .unwrap()
                .push((email.to_string(), link.to_string()));
            Ok(())
        }
    }

    fn service() -> (PasswordResetService, Arc<CapturingNotifier>) {
        let notifier = Arc::new(CapturingNotifier::default());
        let config = ResetConfig {
            link_base_url: "https://example.com/reset/".to_string(),
        };
        (PasswordResetService::new(config, notifier.clone()), notifier)
    }

    #[tokio::test]
    async fn test_valid_email_sends_link() {
        let (service, notifier) = service();
        service.request_reset("alice@example.com").await.unwrap();

        let sent = notifier.sent.lock().unwrap().clone();
        assert_eq!(
            sent,
            vec![(
                "alice@example.com".to_string(),
                "https://example.com/reset?email=alice%40example.com".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_invalid_emails_are_rejected_before_notifying() {
        let (service, notifier) = service();

        for email in ["", "alice.example.com"] {
            match service.request_reset(email).await {
                Err(GatekeepError::Validation { message, field, .. }) => {
                    assert_eq!(message, "Invalid email provided.");
                    assert_eq!(field.as_deref(), Some("email"));
                }
                other => panic!("Expected validation error for {:?}, got {:?}", email, other),
            }
        }

        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_log_notifier_succeeds() {
        let service = PasswordResetService::logging(ResetConfig::default());
        assert!(service.request_reset("bob@example.com").await.is_ok());
    }
}
