//! CLI error types and exit codes

use idm_scim_client::error::{RequestError, ScimClientError};
use idm_scim_plugin::config::ConfigError;
use idm_scim_plugin::error::PluginError;
use thiserror::Error;

/// Exit codes for the CLI
/// - 0: Success
/// - 1: General or configuration error
/// - 2: Authentication failed
/// - 3: Network error
/// - 4: Validation error or rejected request
/// - 5: Server error
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Scim(#[from] ScimClientError),

    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error("Failed to format output: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Validation(_) => 4,
            CliError::Config(_) | CliError::Output(_) => 1,
            CliError::Scim(e) => scim_exit_code(e),
            CliError::Plugin(e) => match e {
                PluginError::Scim { source, .. } => scim_exit_code(source),
                PluginError::Configure(ConfigError::Client(source)) => scim_exit_code(source),
                PluginError::Configure(_) | PluginError::NoScimClient => 1,
                PluginError::NoId
                | PluginError::GroupNotFound(_)
                | PluginError::MultipleGroups(_)
                | PluginError::MissingAuthContextField(_) => 4,
            },
        }
    }

    /// Print the error to stderr
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {self}");
        } else {
            eprintln!("Error: {self}");
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {suggestion}");
            } else {
                eprintln!("\nSuggestion: {suggestion}");
            }
        }
    }

    /// Get a suggested action for this error
    fn suggestion(&self) -> Option<&'static str> {
        match self.exit_code() {
            2 => Some("Check the client id, secret or certificate for the SCIM server."),
            3 => Some("Check the host and that the SCIM server is reachable."),
            _ => None,
        }
    }
}

fn scim_exit_code(error: &ScimClientError) -> i32 {
    let Some(request_error) = error.request_error() else {
        // Construction failures: missing or inconsistent auth material.
        return 1;
    };

    match request_error {
        RequestError::Transport(_) => 3,
        RequestError::Auth(_) => 2,
        other => match other.status().map(|status| status.as_u16()) {
            Some(401 | 403) => 2,
            Some(status) if status >= 500 => 5,
            _ => 4,
        },
    }
}
