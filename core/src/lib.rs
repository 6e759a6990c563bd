//! Command classification and version chaining for vkw binding generation.
//!
//! This crate turns a parsed Vulkan registry ([`SchemaModel`]) into the data
//! the header renderers consume:
//!
//! - [`CommandScopeClassifier`] decides whether each command is global,
//!   instance- or device-level.
//! - [`VersionChainBuilder`] builds the instance and device
//!   [`VersionChain`]s, one node per API version holding only that version's
//!   new commands.
//! - [`ExtensionCatalogBuilder`] groups supported extensions by scope and
//!   platform.
//! - [`PlatformGuardResolver`] maps platforms to their `#ifdef` tokens.
//!
//! [`GenerationModel::build`] runs all of them. Classification rules and the
//! target API come from [`GeneratorConfig`].
//!
//! # Example
//!
//! ```
//! use vkw_codegen_core::*;
//!
//! let mut schema = SchemaModel::new();
//! schema.commands.extend([
//!     CommandDef::new("vkEnumerateInstanceVersion", ["uint32_t"]),
//!     CommandDef::new("vkEnumeratePhysicalDeviceGroups", ["VkInstance"]),
//!     CommandDef::new("vkBindBufferMemory2", ["VkDevice"]),
//! ]);
//! schema.features.push(FeatureBlock::new("VK_VERSION_1_0", "1.0", Vec::<String>::new()));
//! schema.features.push(FeatureBlock::new(
//!     "VK_VERSION_1_1",
//!     "1.1",
//!     ["vkEnumerateInstanceVersion", "vkEnumeratePhysicalDeviceGroups", "vkBindBufferMemory2"],
//! ));
//!
//! let model = GenerationModel::build(&schema, &GeneratorConfig::default()).unwrap();
//! let v1_1 = ApiVersion::new(1, 1);
//! assert_eq!(model.chains.instance.node(v1_1).unwrap().delta, ["vkEnumeratePhysicalDeviceGroups"]);
//! assert_eq!(model.chains.device.node(v1_1).unwrap().delta, ["vkBindBufferMemory2"]);
//! assert!(validate_model(&model).is_empty());
//! ```

mod catalog;
mod chain;
mod classify;
mod config;
mod error;
mod guard;
mod model;
mod traits;
mod types;
mod validate;

pub use catalog::{
    CatalogEntry, ExtensionCatalog, ExtensionCatalogBuilder, PlatformBucket, RejectedExtension, ScopeCatalog,
    ScopedCommand,
};
pub use chain::{ChainNode, Cumulative, VersionChain, VersionChainBuilder, VersionChains};
pub use classify::{Classified, CommandScopeClassifier, UnresolvedCommand, classify_signature};
pub use config::{
    ClassificationTable, DEFAULT_API, DEFAULT_GLOBAL_COMMANDS, DEFAULT_INSTANCE_HANDLE_TYPES,
    DEFAULT_INSTANCE_OVERRIDES, GeneratorConfig, UnknownCommandPolicy,
};
pub use error::{GenError, Result};
pub use guard::PlatformGuardResolver;
pub use model::GenerationModel;
pub use traits::{TypeTrait, derive_type_traits};
pub use types::*;
pub use validate::{ValidationError, validate_model, validate_schema};
