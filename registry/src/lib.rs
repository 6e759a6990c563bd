//! Vulkan registry loading.
//!
//! Reads `vk.xml` into the [`SchemaModel`] consumed by
//! [`vkw_codegen_core`]. Only the parts the generators use are kept:
//! platforms, command prototypes and aliases, feature blocks, extensions,
//! and the members of `VkPhysicalDeviceFeatures`.
//!
//! # Example
//!
//! ```
//! use vkw_codegen_registry::parse_registry_str;
//!
//! let xml = r#"<registry>
//!   <platforms><platform name="xcb" protect="VK_USE_PLATFORM_XCB_KHR"/></platforms>
//!   <commands>
//!     <command><proto><type>void</type> <name>vkDestroyInstance</name></proto>
//!       <param><type>VkInstance</type> <name>instance</name></param></command>
//!   </commands>
//!   <feature api="vulkan" name="VK_VERSION_1_0" number="1.0">
//!     <require><command name="vkDestroyInstance"/></require>
//!   </feature>
//! </registry>"#;
//!
//! let schema = parse_registry_str(xml, "vulkan").unwrap();
//! assert_eq!(schema.commands[0].first_param_type.as_deref(), Some("VkInstance"));
//! assert_eq!(schema.features[0].number, "1.0");
//! assert_eq!(schema.platforms[0].guard_token.as_deref(), Some("VK_USE_PLATFORM_XCB_KHR"));
//! ```

mod error;
mod parser;
mod tree;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use tracing::info;
use vkw_codegen_core::SchemaModel;

pub use error::{RegistryError, Result};
pub use parser::DEVICE_FEATURES_STRUCT;

/// File name looked up when the registry path is a directory.
pub const REGISTRY_FILE_NAME: &str = "vk.xml";

/// Resolves a registry path: directories are joined with
/// [`REGISTRY_FILE_NAME`], files are used as given.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use vkw_codegen_registry::resolve_registry_path;
///
/// let file = resolve_registry_path(Path::new("/no/such/registry.xml"));
/// assert_eq!(file, Path::new("/no/such/registry.xml"));
/// ```
pub fn resolve_registry_path(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(REGISTRY_FILE_NAME)
    } else {
        path.to_path_buf()
    }
}

/// Loads a registry from a file, or from `vk.xml` inside a directory.
///
/// # Errors
///
/// Returns [`RegistryError::Io`] if the file cannot be opened,
/// [`RegistryError::Xml`] if it is not well-formed, and
/// [`RegistryError::Schema`] if required registry fields are missing.
pub fn load_registry(path: impl AsRef<Path>, api: &str) -> Result<SchemaModel> {
    let path = resolve_registry_path(path.as_ref());
    let file = File::open(&path)?;
    let schema = parse_registry(BufReader::new(file), api)?;
    info!(
        path = %path.display(),
        commands = schema.commands.len(),
        features = schema.features.len(),
        extensions = schema.extensions.len(),
        platforms = schema.platforms.len(),
        "Loaded registry"
    );
    Ok(schema)
}

/// Parses a registry from any reader.
///
/// # Errors
///
/// See [`load_registry`].
pub fn parse_registry<R: Read>(reader: R, api: &str) -> Result<SchemaModel> {
    let root = tree::parse_document(reader)?;
    Ok(parser::convert(&root, api)?)
}

/// Parses a registry held in memory.
///
/// # Errors
///
/// See [`load_registry`].
pub fn parse_registry_str(xml: &str, api: &str) -> Result<SchemaModel> {
    parse_registry(xml.as_bytes(), api)
}
