//! `VulkanTypeTraits` derivation.
//!
//! Every core 1.0 handle created by a `vkCreateX` command gets a traits
//! specialization naming its creator object, create-info structure,
//! constructor and destructor.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ApiVersion, FeatureBlock, SchemaModel, Scope};

/// Traits of one creatable handle type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeTrait {
    /// Handle type (`VkFence`).
    pub handle_type: String,
    /// Object the handle is created from.
    pub creator: Scope,
    /// `vkCreateFence`.
    pub constructor: String,
    /// `vkDestroyFence`.
    pub destructor: String,
    /// `VkFenceCreateInfo`.
    pub create_info: String,
}

/// Derives type traits for handles created by core 1.0 commands.
///
/// A `vkCreateX` command qualifies when its first parameter is `VkDevice` or
/// `VkInstance`, it takes a `*CreateInfo*` parameter, and both the command
/// and `VkX` are required by the 1.0 feature block of `api`.
///
/// # Examples
///
/// ```
/// use vkw_codegen_core::*;
///
/// let mut schema = SchemaModel::new();
/// schema.commands.push(CommandDef::new(
///     "vkCreateFence",
///     ["VkDevice", "VkFenceCreateInfo", "VkAllocationCallbacks", "VkFence"],
/// ));
/// schema.commands.push(CommandDef::new("vkDestroyFence", ["VkDevice", "VkFence"]));
/// let mut core = FeatureBlock::new("VK_VERSION_1_0", "1.0", ["vkCreateFence", "vkDestroyFence"]);
/// core.types.push("VkFence".into());
/// schema.features.push(core);
///
/// let traits = derive_type_traits(&schema, "vulkan");
/// assert_eq!(traits.len(), 1);
/// assert_eq!(traits[0].handle_type, "VkFence");
/// assert_eq!(traits[0].creator, Scope::Device);
/// assert_eq!(traits[0].destructor, "vkDestroyFence");
/// ```
pub fn derive_type_traits(schema: &SchemaModel, api: &str) -> Vec<TypeTrait> {
    let Some(core) = initial_feature(&schema.features, api) else {
        return Vec::new();
    };

    schema
        .commands
        .iter()
        .filter(|cmd| cmd.alias.is_none())
        .filter_map(|cmd| {
            let object = cmd.name.strip_prefix("vkCreate")?;
            let creator = match cmd.first_param_type.as_deref() {
                Some("VkDevice") => Scope::Device,
                Some("VkInstance") => Scope::Instance,
                _ => return None,
            };
            let handle_type = format!("Vk{object}");
            if !core.commands.contains(&cmd.name) || !core.types.contains(&handle_type) {
                return None;
            }
            let Some(create_info) = cmd.param_types.iter().rev().find(|ty| ty.contains("CreateInfo")) else {
                debug!(command = %cmd.name, "Constructor takes no create-info structure");
                return None;
            };
            Some(TypeTrait {
                handle_type,
                creator,
                constructor: cmd.name.clone(),
                destructor: format!("vkDestroy{object}"),
                create_info: create_info.clone(),
            })
        })
        .collect()
}

fn initial_feature<'a>(features: &'a [FeatureBlock], api: &str) -> Option<&'a FeatureBlock> {
    features
        .iter()
        .filter(|f| f.applies_to(api))
        .find(|f| f.number.parse::<ApiVersion>().is_ok_and(|v| v == ApiVersion::INITIAL))
}
