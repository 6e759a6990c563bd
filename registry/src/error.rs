//! Error types for registry loading.

use thiserror::Error;
use vkw_codegen_core::GenError;

/// Errors that can occur while loading a registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not well-formed XML.
    #[error("XML error: {0}")]
    Xml(#[from] xml::reader::Error),

    /// The document is XML but not a usable registry.
    #[error(transparent)]
    Schema(#[from] GenError),
}

/// Convenience alias for results with [`RegistryError`].
pub type Result<T> = std::result::Result<T, RegistryError>;
