//! Generator configuration.
//!
//! The classification rules and the target API are data, not control flow.
//! [`GeneratorConfig::default`] reproduces the stock vkw rules; a YAML file
//! can override any part of it.
//!
//! # Example YAML
//!
//! ```yaml
//! api: vulkan
//! unknown_commands: instance
//! classification:
//!   global_commands:
//!     - vkCreateInstance
//!     - vkEnumerateInstanceExtensionProperties
//!     - vkEnumerateInstanceLayerProperties
//!     - vkGetInstanceProcAddr
//!     - vkEnumerateInstanceVersion
//!   instance_overrides:
//!     - vkGetDeviceProcAddr
//!   instance_handle_types:
//!     - VkInstance
//!     - VkPhysicalDevice
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GenError, Result};

/// Commands usable before any instance exists.
pub const DEFAULT_GLOBAL_COMMANDS: &[&str] = &[
    "vkCreateInstance",
    "vkEnumerateInstanceExtensionProperties",
    "vkEnumerateInstanceLayerProperties",
    "vkGetInstanceProcAddr",
    "vkEnumerateInstanceVersion",
];

/// Commands forced to instance scope regardless of signature.
///
/// `vkGetDeviceProcAddr` takes a `VkDevice` but has to be resolved before any
/// device dispatch table exists.
pub const DEFAULT_INSTANCE_OVERRIDES: &[&str] = &["vkGetDeviceProcAddr"];

/// First-parameter types that make a command instance-scoped.
pub const DEFAULT_INSTANCE_HANDLE_TYPES: &[&str] = &["VkInstance", "VkPhysicalDevice"];

/// Target API name used for `api`/`supported` filtering.
pub const DEFAULT_API: &str = "vulkan";

/// Static rule table consumed by the
/// [`CommandScopeClassifier`](crate::CommandScopeClassifier).
///
/// # Examples
///
/// ```
/// use vkw_codegen_core::ClassificationTable;
///
/// let table = ClassificationTable::default();
/// assert!(table.is_global("vkCreateInstance"));
/// assert!(table.is_instance_override("vkGetDeviceProcAddr"));
/// assert!(table.is_instance_handle("VkPhysicalDevice"));
/// assert!(!table.is_instance_handle("VkDevice"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationTable {
    pub global_commands: Vec<String>,
    pub instance_overrides: Vec<String>,
    pub instance_handle_types: Vec<String>,
}

impl Default for ClassificationTable {
    fn default() -> Self {
        Self {
            global_commands: owned(DEFAULT_GLOBAL_COMMANDS),
            instance_overrides: owned(DEFAULT_INSTANCE_OVERRIDES),
            instance_handle_types: owned(DEFAULT_INSTANCE_HANDLE_TYPES),
        }
    }
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| (*n).to_string()).collect()
}

impl ClassificationTable {
    pub fn is_global(&self, command: &str) -> bool {
        self.global_commands.iter().any(|c| c == command)
    }

    pub fn is_instance_override(&self, command: &str) -> bool {
        self.instance_overrides.iter().any(|c| c == command)
    }

    pub fn is_instance_handle(&self, ty: &str) -> bool {
        self.instance_handle_types.iter().any(|t| t == ty)
    }
}

/// What to do with a command that is referenced but not in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCommandPolicy {
    /// Classify as [`Scope::Instance`](crate::Scope::Instance) and record it.
    #[default]
    Instance,
    /// Fail with [`GenError::UnknownCommand`].
    Reject,
}

/// Top-level generator configuration.
///
/// # Examples
///
/// ```
/// use vkw_codegen_core::{GeneratorConfig, UnknownCommandPolicy};
///
/// let config = GeneratorConfig::default();
/// assert_eq!(config.api, "vulkan");
/// assert_eq!(config.unknown_commands, UnknownCommandPolicy::Instance);
///
/// let yaml = "api: vulkansc\nunknown_commands: reject\n";
/// let custom = GeneratorConfig::from_yaml(yaml).unwrap();
/// assert_eq!(custom.api, "vulkansc");
/// assert_eq!(custom.classification, config.classification);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub api: String,
    pub unknown_commands: UnknownCommandPolicy,
    pub classification: ClassificationTable,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api: DEFAULT_API.to_string(),
            unknown_commands: UnknownCommandPolicy::default(),
            classification: ClassificationTable::default(),
        }
    }
}

impl GeneratorConfig {
    /// Parses configuration from YAML text. Missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::Config`] if the YAML is invalid.
    pub fn from_yaml(raw: &str) -> Result<Self> {
        serde_yaml::from_str(raw).map_err(|err| GenError::Config(err.to_string()))
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::Config`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .map_err(|err| GenError::Config(format!("{}: {err}", path.display())))?;
        serde_yaml::from_reader(BufReader::new(file))
            .map_err(|err| GenError::Config(format!("{}: {err}", path.display())))
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::Config`] if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path)
            .map_err(|err| GenError::Config(format!("{}: {err}", path.display())))?;
        serde_yaml::to_writer(BufWriter::new(file), self)
            .map_err(|err| GenError::Config(format!("{}: {err}", path.display())))
    }
}
