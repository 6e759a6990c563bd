//! Registry and model validation.
//!
//! [`validate_schema`] checks the registry for duplicate definitions before
//! anything is built; [`validate_model`] checks that the built chains and
//! catalog keep every command in a single bucket.
//!
//! # Examples
//!
//! ```
//! use vkw_codegen_core::*;
//!
//! let mut schema = SchemaModel::new();
//! schema.commands.push(CommandDef::new("vkQueueSubmit", ["VkQueue"]));
//! assert!(validate_schema(&schema).is_empty());
//!
//! schema.commands.push(CommandDef::new("vkQueueSubmit", ["VkQueue"]));
//! assert_eq!(
//!     validate_schema(&schema),
//!     vec![ValidationError::DuplicateCommandDefinition("vkQueueSubmit".into())]
//! );
//! ```

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::{GenerationModel, SchemaModel};

/// Registry/model validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Two `<command>` entries share a name.
    #[error("duplicate command definition: {0}")]
    DuplicateCommandDefinition(String),
    /// Two `<extension>` entries share a name.
    #[error("duplicate extension: {0}")]
    DuplicateExtension(String),
    /// Two `<platform>` entries share a name.
    #[error("duplicate platform: {0}")]
    DuplicatePlatform(String),
    /// A command sits in a version delta and in an extension.
    #[error("command {command} is in version {version} and in extension {extension}")]
    VersionAndExtension {
        command: String,
        version: String,
        extension: String,
    },
    /// A command is listed by more than one extension.
    #[error("command {command} is listed by {first} and {second}")]
    SharedExtensionCommand {
        command: String,
        first: String,
        second: String,
    },
}

impl ValidationError {
    /// Whether the finding should stop generation.
    ///
    /// Extensions sharing a command each load their own pointer, so that case
    /// is reported but not fatal.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::SharedExtensionCommand { .. })
    }
}

/// Checks the registry for duplicate definitions.
pub fn validate_schema(schema: &SchemaModel) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut seen: HashSet<&str> = HashSet::new();
    for cmd in &schema.commands {
        if !seen.insert(cmd.name.as_str()) {
            errors.push(ValidationError::DuplicateCommandDefinition(cmd.name.clone()));
        }
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for ext in &schema.extensions {
        if !seen.insert(ext.name.as_str()) {
            errors.push(ValidationError::DuplicateExtension(ext.name.clone()));
        }
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for platform in &schema.platforms {
        if !seen.insert(platform.name.as_str()) {
            errors.push(ValidationError::DuplicatePlatform(platform.name.clone()));
        }
    }

    errors
}

/// Checks that no command is in both a version delta and an extension, or in
/// more than one extension.
///
/// Duplicates inside the version chain are rejected while the chain is
/// built, so they cannot reach this point.
pub fn validate_model(model: &GenerationModel) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut in_version: HashMap<&str, String> = HashMap::new();
    for chain in [&model.chains.instance, &model.chains.device] {
        for (version, command) in chain.commands() {
            in_version.insert(command, version.to_string());
        }
    }

    let mut owner: HashMap<&str, &str> = HashMap::new();
    for entry in model.catalog.entries() {
        for command in entry.command_names() {
            if let Some(version) = in_version.get(command) {
                errors.push(ValidationError::VersionAndExtension {
                    command: command.to_string(),
                    version: version.clone(),
                    extension: entry.name.clone(),
                });
            }
            match owner.get(command) {
                Some(first) if *first != entry.name => {
                    errors.push(ValidationError::SharedExtensionCommand {
                        command: command.to_string(),
                        first: (*first).to_string(),
                        second: entry.name.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    owner.insert(command, entry.name.as_str());
                }
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CommandDef, ExtensionDef, FeatureBlock, GeneratorConfig, PlatformDef, Scope};

    fn schema() -> SchemaModel {
        let mut schema = SchemaModel::new();
        schema.commands.extend([
            CommandDef::new("vkDestroyDevice", ["VkDevice"]),
            CommandDef::new("vkCreateSwapchainKHR", ["VkDevice"]),
            CommandDef::new("vkAcquireNextImage2KHR", ["VkDevice"]),
        ]);
        schema
            .features
            .push(FeatureBlock::new("VK_VERSION_1_0", "1.0", ["vkDestroyDevice"]));
        schema.extensions.push(ExtensionDef::new(
            "VK_KHR_swapchain",
            Scope::Device,
            ["vkCreateSwapchainKHR", "vkAcquireNextImage2KHR"],
        ));
        schema
    }

    #[test]
    fn test_clean_model_has_no_findings() {
        let model = GenerationModel::build(&schema(), &GeneratorConfig::default()).unwrap();
        assert!(validate_model(&model).is_empty());
    }

    #[test]
    fn test_command_in_version_and_extension() {
        let mut schema = schema();
        schema
            .extensions
            .push(ExtensionDef::new("VK_EXT_bogus", Scope::Device, ["vkDestroyDevice"]));

        let model = GenerationModel::build(&schema, &GeneratorConfig::default()).unwrap();
        let errors = validate_model(&model);
        assert_eq!(
            errors,
            vec![ValidationError::VersionAndExtension {
                command: "vkDestroyDevice".to_string(),
                version: "1.0".to_string(),
                extension: "VK_EXT_bogus".to_string(),
            }]
        );
        assert!(errors[0].is_fatal());
    }

    #[test]
    fn test_shared_extension_command_is_not_fatal() {
        let mut schema = schema();
        schema.extensions.push(ExtensionDef::new(
            "VK_KHR_device_group",
            Scope::Device,
            ["vkAcquireNextImage2KHR"],
        ));

        let model = GenerationModel::build(&schema, &GeneratorConfig::default()).unwrap();
        let errors = validate_model(&model);
        assert_eq!(errors.len(), 1);
        assert!(!errors[0].is_fatal());
    }

    #[test]
    fn test_duplicate_registry_entries() {
        let mut schema = schema();
        schema.extensions.push(schema.extensions[0].clone());
        schema.platforms.push(PlatformDef::new("xcb", "VK_USE_PLATFORM_XCB_KHR"));
        schema.platforms.push(PlatformDef::new("xcb", "VK_USE_PLATFORM_XCB_KHR"));

        assert_eq!(
            validate_schema(&schema),
            vec![
                ValidationError::DuplicateExtension("VK_KHR_swapchain".to_string()),
                ValidationError::DuplicatePlatform("xcb".to_string()),
            ]
        );
    }
}
