//! Error types for model construction.
//!
//! Every failure the classification and chaining stages can raise is a
//! variant of [`GenError`]. Structural problems that do not stop the run are
//! reported separately through [`ValidationError`](crate::ValidationError).

use thiserror::Error;

use crate::ApiVersion;

/// Errors raised while building the generation model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenError {
    /// A feature block declares a version other than the next expected one.
    #[error("version sequence gap: expected {expected}, found {found} (feature {feature})")]
    VersionGap {
        expected: ApiVersion,
        found: ApiVersion,
        feature: String,
    },

    /// A command is listed more than once across the version chain.
    #[error("command {command} declared again in {version} (first declared in {first})")]
    DuplicateCommand {
        command: String,
        first: ApiVersion,
        version: ApiVersion,
    },

    /// A referenced command is absent from the command registry and the
    /// configured policy rejects unknown commands.
    #[error("command {command} referenced by {referenced_by} is not in the command registry")]
    UnknownCommand {
        command: String,
        referenced_by: String,
    },

    /// A platform has no registered guard token.
    #[error("no guard mapping for platform {platform}")]
    MissingGuardMapping { platform: String },

    /// A registry entity lacks a required field or carries an invalid value.
    #[error("malformed schema entity {entity}: {detail}")]
    MalformedSchema { entity: String, detail: String },

    /// Generator configuration could not be read or written.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience alias for results with [`GenError`].
pub type Result<T> = std::result::Result<T, GenError>;
