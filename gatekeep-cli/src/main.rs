//! gatekeep CLI - exercise the authorization guard from the command line

use clap::{Parser, Subcommand};
use gatekeep_core::{
    candidate_config_paths, config_error, default_config_path, init_logging,
    log_operation_error, log_operation_start, log_operation_success, ErrorContext,
    GatekeepConfig, GatekeepError, GatekeepResult,
};
use gatekeep_guard::{store_from_config, Actor, AuthorizationGuard, PasswordResetService, RecordId};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "gatekeep")]
#[command(about = "Role-gated login and record deletion")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Attributes describing who is acting
#[derive(clap::Args, Debug, Default)]
struct ActorArgs {
    /// Actor identifier (used in logs)
    #[arg(long)]
    id: Option<String>,

    /// Actor role, e.g. admin or user
    #[arg(long)]
    role: Option<String>,

    /// Set the actor's admin flag
    #[arg(long)]
    admin: bool,

    /// Read the actor from a JSON file instead of flags
    #[arg(long, conflicts_with_all = ["id", "role", "admin"])]
    actor: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check whether an actor may log in
    Login {
        #[command(flatten)]
        actor: ActorArgs,
    },

    /// Delete a record on behalf of an actor
    Delete {
        /// Record identifier
        record_id: String,

        #[command(flatten)]
        actor: ActorArgs,
    },

    /// List records in the configured store
    List,

    /// Request a password reset link
    ResetPassword {
        /// Email address the link is sent to
        email: String,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Initialize default configuration
        #[arg(long)]
        init: bool,

        /// Validate current configuration
        #[arg(long)]
        validate: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.log();
            eprintln!("error: {}", e);
            ExitCode::from(exit_status(&e))
        }
    }
}

/// Denials exit with 2 so scripts can tell them apart from other failures
fn exit_status(error: &GatekeepError) -> u8 {
    if error.is_denial() {
        2
    } else {
        1
    }
}

async fn run(cli: Cli) -> GatekeepResult<()> {
    // `config --init` may target a file that does not exist yet
    let config = match (&cli.command, cli.config.as_deref()) {
        (Commands::Config { init: true, .. }, Some(path)) if !path.exists() => {
            GatekeepConfig::default()
        }
        (_, path) => load_config(path)?,
    };

    let logging = if cli.verbose {
        config.logging.clone().verbose()
    } else {
        config.logging.clone()
    };
    init_logging(&logging)?;

    info!("Starting gatekeep v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Login { actor } => handle_login(&actor, &config).await,
        Commands::Delete { record_id, actor } => {
            handle_delete(record_id, &actor, &config).await
        }
        Commands::List => handle_list(&config).await,
        Commands::ResetPassword { email } => handle_reset_password(&email, &config).await,
        Commands::Config {
            show,
            init,
            validate,
        } => handle_config(cli.config.as_deref(), &config, show, init, validate),
    }
}

fn load_config(config_path: Option<&Path>) -> GatekeepResult<GatekeepConfig> {
    if let Some(path) = config_path {
        return GatekeepConfig::from_file(path);
    }

    match candidate_config_paths().into_iter().find(|p| p.exists()) {
        Some(path) => GatekeepConfig::from_file(path),
        None => Ok(GatekeepConfig::default()),
    }
}

fn resolve_actor(args: &ActorArgs) -> GatekeepResult<Actor> {
    if let Some(path) = &args.actor {
        let json = std::fs::read_to_string(path)?;
        return Actor::from_json(&json).map_err(GatekeepError::from);
    }

    let mut actor = Actor::new().with_admin_flag(args.admin);
    if let Some(id) = &args.id {
        actor = actor.with_id(id.clone());
    }
    if let Some(role) = &args.role {
        actor = actor.with_role(role.clone());
    }
    Ok(actor)
}

async fn handle_login(args: &ActorArgs, config: &GatekeepConfig) -> GatekeepResult<()> {
    let actor = resolve_actor(args)?;
    log_operation_start!("login", actor = %actor);

    // The guard already logged the denial
    let guard = AuthorizationGuard::new(store_from_config(&config.store));
    guard.login(&actor).map_err(GatekeepError::from)?;

    println!("Login permitted for {}", actor);
    log_operation_success!("login", actor = %actor);
    Ok(())
}

async fn handle_delete(
    record_id: String,
    args: &ActorArgs,
    config: &GatekeepConfig,
) -> GatekeepResult<()> {
    let actor = resolve_actor(args)?;
    let record_id = RecordId::from(record_id);
    log_operation_start!("delete_record", record_id = %record_id, actor = %actor);

    let guard = AuthorizationGuard::new(store_from_config(&config.store));
    guard
        .delete_record(&record_id, &actor)
        .await
        .map_err(|e| {
            if e.denial().is_none() {
                log_operation_error!("delete_record", e, record_id = %record_id);
            }
            GatekeepError::from(e)
        })?;

    println!("Deleted record {}", record_id);
    log_operation_success!("delete_record", record_id = %record_id);
    Ok(())
}

async fn handle_list(config: &GatekeepConfig) -> GatekeepResult<()> {
    let store = store_from_config(&config.store);
    let records = store.list().await?;

    if records.is_empty() {
        println!("No records");
    }
    for record in records {
        println!("{}", record);
    }
    Ok(())
}

async fn handle_reset_password(email: &str, config: &GatekeepConfig) -> GatekeepResult<()> {
    log_operation_start!("reset_password");

    let service = PasswordResetService::logging(config.reset.clone());
    service.request_reset(email).await?;

    println!("Reset link sent to {}", email);
    log_operation_success!("reset_password");
    Ok(())
}

fn handle_config(
    explicit_path: Option<&Path>,
    config: &GatekeepConfig,
    show: bool,
    init: bool,
    validate: bool,
) -> GatekeepResult<()> {
    if init {
        let path = match explicit_path {
            Some(path) => path.to_path_buf(),
            None => default_config_path().ok_or_else(|| {
                config_error!("Could not determine a configuration directory", "cli")
            })?,
        };

        GatekeepConfig::default().save_to_file(&path)?;
        println!("Configuration initialized at: {}", path.display());
    }

    if show {
        let rendered = toml::to_string_pretty(config).map_err(|e| GatekeepError::Config {
            message: format!("Failed to render config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("cli").with_operation("config_show"),
        })?;
        println!("{}", rendered);
    }

    if validate {
        config.validate()?;
        println!("Configuration is valid");
    }

    Ok(())
}
