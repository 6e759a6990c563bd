//! The generation model: everything the renderers consume.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::catalog::{ExtensionCatalog, ExtensionCatalogBuilder};
use crate::chain::{VersionChainBuilder, VersionChains};
use crate::classify::{CommandScopeClassifier, UnresolvedCommand};
use crate::config::GeneratorConfig;
use crate::error::{GenError, Result};
use crate::guard::PlatformGuardResolver;
use crate::traits::{TypeTrait, derive_type_traits};
use crate::validate::{ValidationError, validate_schema};
use crate::{FeatureMember, SchemaModel};

/// Classified, chained and catalogued view of one registry.
///
/// Built in one pass by [`GenerationModel::build`]; two builds over the same
/// registry and configuration compare equal and share a
/// [`fingerprint`](GenerationModel::fingerprint).
///
/// # Examples
///
/// ```
/// use vkw_codegen_core::*;
///
/// let mut schema = SchemaModel::new();
/// schema.commands.push(CommandDef::new("vkDestroyInstance", ["VkInstance"]));
/// schema.commands.push(CommandDef::new("vkCreateSwapchainKHR", ["VkDevice"]));
/// schema.features.push(FeatureBlock::new("VK_VERSION_1_0", "1.0", ["vkDestroyInstance"]));
/// schema.extensions.push(ExtensionDef::new(
///     "VK_KHR_swapchain",
///     Scope::Device,
///     ["vkCreateSwapchainKHR"],
/// ));
///
/// let model = GenerationModel::build(&schema, &GeneratorConfig::default()).unwrap();
/// assert_eq!(model.chains.instance.nodes[0].delta, ["vkDestroyInstance"]);
/// assert!(model.catalog.find("VK_KHR_swapchain").is_some());
///
/// let again = GenerationModel::build(&schema, &GeneratorConfig::default()).unwrap();
/// assert_eq!(model.fingerprint().unwrap(), again.fingerprint().unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationModel {
    /// Target API the model was filtered for.
    pub api: String,
    pub chains: VersionChains,
    pub catalog: ExtensionCatalog,
    /// Commands classified through the unknown-command fallback.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unresolved_commands: Vec<UnresolvedCommand>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_traits: Vec<TypeTrait>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub device_features: Vec<FeatureMember>,
}

impl GenerationModel {
    /// Classifies every command and builds chains, catalog and derived
    /// tables.
    ///
    /// # Errors
    ///
    /// - [`GenError::MalformedSchema`] for duplicate registry entries,
    ///   unparsable version numbers or untyped extensions.
    /// - [`GenError::VersionGap`] and [`GenError::DuplicateCommand`] from the
    ///   chain builder.
    /// - [`GenError::UnknownCommand`] under the reject policy.
    pub fn build(schema: &SchemaModel, config: &GeneratorConfig) -> Result<Self> {
        if let Some(first) = validate_schema(schema).into_iter().next() {
            return Err(malformed(first));
        }

        let classifier = CommandScopeClassifier::new(schema, config);
        let guards = PlatformGuardResolver::new(&schema.platforms);
        debug!(commands = classifier.len(), "Classified registry commands");

        let mut unresolved = Vec::new();
        let chains = VersionChainBuilder::new(&classifier, &config.api).build(&schema.features, &mut unresolved)?;
        let catalog = ExtensionCatalogBuilder::new(&classifier, &guards, &config.api)
            .build(&schema.extensions, &mut unresolved)?;
        let type_traits = derive_type_traits(schema, &config.api);

        info!(
            versions = chains.instance.nodes.len(),
            extensions = catalog.len(),
            rejected = catalog.rejected.len(),
            unresolved = unresolved.len(),
            "Built generation model"
        );

        Ok(Self {
            api: config.api.clone(),
            chains,
            catalog,
            unresolved_commands: unresolved,
            type_traits,
            device_features: schema.device_features.clone(),
        })
    }

    /// Lowercase hex SHA-256 of the model's compact JSON form.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if the model cannot be encoded.
    pub fn fingerprint(&self) -> serde_json::Result<String> {
        let bytes = serde_json::to_vec(self)?;
        Ok(format!("{:x}", Sha256::digest(&bytes)))
    }
}

fn malformed(error: ValidationError) -> GenError {
    let entity = match &error {
        ValidationError::DuplicateCommandDefinition(name)
        | ValidationError::DuplicateExtension(name)
        | ValidationError::DuplicatePlatform(name) => name.clone(),
        ValidationError::VersionAndExtension { command, .. }
        | ValidationError::SharedExtensionCommand { command, .. } => command.clone(),
    };
    GenError::MalformedSchema {
        entity,
        detail: error.to_string(),
    }
}
