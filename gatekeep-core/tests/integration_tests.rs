//! Integration tests for gatekeep-core infrastructure

use gatekeep_core::{
    config_error, init_logging, not_found_error, storage_error, validation_error, ErrorContext,
    GatekeepConfig, GatekeepError, LogFormat, LoggingConfig,
};

#[test]
fn test_error_handling() {
    let error = storage_error!("Disk full", "test_component");

    match &error {
        GatekeepError::Storage {
            message, context, ..
        } => {
            assert_eq!(message, "Disk full");
            assert_eq!(context.component, "test_component");
            assert!(!context.error_id.is_empty());
        }
        _ => panic!("Expected Storage error"),
    }

    // Should not panic without a subscriber
    error.log();

    let config_error = config_error!("Invalid config", "test");
    assert!(!config_error.is_recoverable());
    assert!(config_error
        .context()
        .unwrap()
        .recovery_suggestions
        .iter()
        .any(|s| s.contains("gatekeep config --init")));

    let io_error = GatekeepError::Io(std::io::Error::new(
        std::io::ErrorKind::Interrupted,
        "interrupted",
    ));
    assert!(io_error.is_recoverable());
    assert!(io_error.context().is_none());
}

#[test]
fn test_denials_are_terminal() {
    let denial = GatekeepError::Authorization {
        kind: "access_denied".to_string(),
        message: "Admins only.".to_string(),
        context: ErrorContext::new("guard").with_operation("delete_record"),
    };

    assert!(denial.is_denial());
    assert!(!denial.is_recoverable());
    assert_eq!(
        denial.to_string(),
        "Authorization denied (access_denied): Admins only."
    );
}

#[test]
fn test_validation_and_not_found_macros() {
    let error = validation_error!("Invalid email provided.", "email", "reset");
    match &error {
        GatekeepError::Validation { message, field, .. } => {
            assert_eq!(message, "Invalid email provided.");
            assert_eq!(field.as_deref(), Some("email"));
        }
        _ => panic!("Expected Validation error"),
    }

    let error = not_found_error!("rec-9", "store");
    assert_eq!(error.to_string(), "Resource not found: rec-9");
}

#[test]
fn test_logging_initialization() {
    let config = LoggingConfig {
        level: "debug".to_string(),
        format: LogFormat::Compact,
        include_location: false,
        include_thread: false,
        log_to_file: false,
        log_file_path: None,
        filter_directives: vec!["gatekeep_core=debug".to_string()],
    };

    // A subscriber can be installed only once per process, so a second call must fail cleanly
    let _ = init_logging(&config);
    let second = init_logging(&config);
    assert!(matches!(second, Err(GatekeepError::Internal { .. })));
}

#[test]
fn test_config_file_roundtrip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gatekeep.toml");

    std::fs::write(
        &path,
        r#"
[logging]
level = "warn"
format = "json"

[store]
path = "records.json"

[reset]
link_base_url = "https://example.com/reset"
"#,
    )
    .unwrap();

    let config = GatekeepConfig::from_file(&path).unwrap();
    assert_eq!(config.logging.level, "warn");
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.store.path.as_deref(), Some("records.json"));
    assert!(config.validate().is_ok());
}

#[test]
fn test_missing_config_file_is_config_error() {
    let result = GatekeepConfig::from_file("/definitely/not/here/gatekeep.toml");
    assert!(matches!(result, Err(GatekeepError::Config { .. })));
}
