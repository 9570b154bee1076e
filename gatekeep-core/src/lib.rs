//! gatekeep core - error taxonomy, logging and configuration shared by the workspace

pub mod config;
pub mod error;
pub mod logging;

pub use config::*;
pub use error::*;
pub use logging::*;

// Used by the logging macros
pub use tracing;
