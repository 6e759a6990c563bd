//! Rendering for vkw generated sources.
//!
//! Every renderer is a pure function of a [`GenerationModel`]. Header
//! fragments are wrapped in the preprocessor sections the vkw headers
//! include them under:
//!
//! | Section | Renderer |
//! |---------|----------|
//! | `VKW_DUMP_CORE_CLASSES` | [`render_core_classes`] |
//! | `VKW_DUMP_EXTENSION_CLASSES` | [`render_extension_classes`] |
//! | `VKW_DUMP_EXTENSION_NAME_MAP_DEFINITION` | [`render_extension_name_map`] |
//! | `VKW_GENERATE_FEATURE_CLASSES` | [`render_feature_classes`] |
//! | `VKW_GENERATE_FEATURE_MAP` | [`render_feature_map`] |
//! | `VKW_GENERATE_TYPE_DEFINITIONS`, `VKW_GENERATE_TYPE_FUNC_IMPL` | [`render_type_traits`] |
//!
//! The `render_*_file` functions prepend a banner carrying the model
//! fingerprint.

pub mod features;
pub mod headers;
pub mod output;
pub mod traits;

use vkw_codegen_core::GenerationModel;

pub use features::{render_feature_classes, render_feature_map, render_features_file};
pub use headers::{
    render_core_classes, render_extension_classes, render_extension_name_map, render_headers_file,
};
pub use output::{OutputFormat, format_model};
pub use traits::{render_type_traits, render_type_traits_file};

/// Version stamped into generated banners.
pub const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Comment banner for a generated file.
///
/// # Errors
///
/// Returns an error if the model fingerprint cannot be computed.
pub fn banner(model: &GenerationModel) -> Result<String, String> {
    let fingerprint = model
        .fingerprint()
        .map_err(|e| format!("model fingerprint failed: {e}"))?;
    Ok(format!(
        "// Generated by vkw-gen {GENERATOR_VERSION}. Do not edit.\n\
         // api: {}\n\
         // model: {fingerprint}\n\n",
        model.api
    ))
}

pub(crate) fn open_section(out: &mut String, name: &str) {
    out.push_str(&format!("#ifdef {name}\n"));
}

pub(crate) fn close_section(out: &mut String, name: &str) {
    out.push_str(&format!("#endif // {name}\n"));
}

#[cfg(test)]
pub(crate) mod testing {
    use vkw_codegen_core::*;

    /// Two versions, a guarded and an unguarded extension per scope, one
    /// creatable handle and two device features.
    pub fn sample_model() -> GenerationModel {
        let mut schema = SchemaModel::new();
        schema.platforms.push(PlatformDef::new("wayland", "VK_USE_PLATFORM_WAYLAND_KHR"));
        schema.platforms.push(PlatformDef::new("win32", "VK_USE_PLATFORM_WIN32_KHR"));
        schema.commands.extend([
            CommandDef::new("vkCreateInstance", ["VkInstanceCreateInfo", "VkAllocationCallbacks", "VkInstance"]),
            CommandDef::new("vkDestroyInstance", ["VkInstance", "VkAllocationCallbacks"]),
            CommandDef::new("vkCreateFence", ["VkDevice", "VkFenceCreateInfo", "VkAllocationCallbacks", "VkFence"]),
            CommandDef::new("vkDestroyFence", ["VkDevice", "VkFence", "VkAllocationCallbacks"]),
            CommandDef::new("vkEnumeratePhysicalDeviceGroups", ["VkInstance", "uint32_t"]),
            CommandDef::new("vkTrimCommandPool", ["VkDevice", "VkCommandPool"]),
            CommandDef::new("vkDestroySurfaceKHR", ["VkInstance", "VkSurfaceKHR"]),
            CommandDef::new("vkCreateWaylandSurfaceKHR", ["VkInstance", "VkWaylandSurfaceCreateInfoKHR"]),
            CommandDef::new("vkCreateSwapchainKHR", ["VkDevice", "VkSwapchainCreateInfoKHR"]),
            CommandDef::new("vkQueuePresentKHR", ["VkQueue", "VkPresentInfoKHR"]),
            CommandDef::new("vkGetMemoryWin32HandleKHR", ["VkDevice", "VkMemoryGetWin32HandleInfoKHR"]),
        ]);

        let mut v1_0 = FeatureBlock::new(
            "VK_VERSION_1_0",
            "1.0",
            ["vkCreateInstance", "vkDestroyInstance", "vkCreateFence", "vkDestroyFence"],
        );
        v1_0.types = vec!["VkInstance".into(), "VkFence".into()];
        schema.features.push(v1_0);
        schema.features.push(FeatureBlock::new(
            "VK_VERSION_1_1",
            "1.1",
            ["vkEnumeratePhysicalDeviceGroups", "vkTrimCommandPool"],
        ));

        schema.extensions.extend([
            ExtensionDef::new("VK_KHR_surface", Scope::Instance, ["vkDestroySurfaceKHR"]),
            ExtensionDef::new("VK_KHR_wayland_surface", Scope::Instance, ["vkCreateWaylandSurfaceKHR"])
                .with_platform("wayland"),
            ExtensionDef::new("VK_KHR_swapchain", Scope::Device, ["vkCreateSwapchainKHR", "vkQueuePresentKHR"]),
            ExtensionDef::new("VK_KHR_external_memory_win32", Scope::Device, ["vkGetMemoryWin32HandleKHR"])
                .with_platform("win32"),
        ]);

        schema.device_features = vec![
            FeatureMember {
                name: "robustBufferAccess".into(),
                ty: "VkBool32".into(),
            },
            FeatureMember {
                name: "geometryShader".into(),
                ty: "VkBool32".into(),
            },
        ];

        GenerationModel::build(&schema, &GeneratorConfig::default()).unwrap()
    }
}
