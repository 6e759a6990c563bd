//! Registry entity definitions.
//!
//! These types mirror the parts of the Vulkan registry the generator consumes:
//! commands, feature (version) blocks, extensions, platforms, and the members
//! of `VkPhysicalDeviceFeatures`. They are plain data, built once per registry
//! load by the registry crate or by hand in tests, and never mutated after
//! [`GenerationModel::build`](crate::GenerationModel::build) starts.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::GenError;

/// Bucket name used for extensions without a platform restriction.
pub const BASE_PLATFORM: &str = "base";

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.(\d+)$").expect("static regex must compile"));

/// Dispatch level a command is loaded at.
///
/// # Examples
///
/// ```
/// use vkw_codegen_core::Scope;
///
/// assert_eq!(Scope::Device.to_string(), "device");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Resolvable before any instance exists.
    Global,
    /// Loaded through `vkGetInstanceProcAddr` on a live instance.
    Instance,
    /// Loaded through `vkGetDeviceProcAddr` on a live device.
    Device,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Instance => write!(f, "instance"),
            Self::Device => write!(f, "device"),
        }
    }
}

/// A `major.minor` API version.
///
/// Versions order by `(major, minor)`.
///
/// # Examples
///
/// ```
/// use vkw_codegen_core::ApiVersion;
///
/// let v: ApiVersion = "1.2".parse().unwrap();
/// assert_eq!(v, ApiVersion::new(1, 2));
/// assert!(ApiVersion::new(1, 0) < v);
/// assert_eq!(v.next_minor(), ApiVersion::new(1, 3));
/// assert!("1.x".parse::<ApiVersion>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApiVersion {
    pub major: u32,
    pub minor: u32,
}

impl ApiVersion {
    /// First version of every chain.
    pub const INITIAL: ApiVersion = ApiVersion { major: 1, minor: 0 };

    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    pub const fn next_minor(self) -> Self {
        Self {
            major: self.major,
            minor: self.minor + 1,
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for ApiVersion {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || GenError::MalformedSchema {
            entity: s.to_string(),
            detail: "version number must look like <major>.<minor>".to_string(),
        };
        let caps = VERSION_RE.captures(s.trim()).ok_or_else(malformed)?;
        let major = caps[1].parse().map_err(|_| malformed())?;
        let minor = caps[2].parse().map_err(|_| malformed())?;
        Ok(Self { major, minor })
    }
}

/// One entry of the registry's `<commands>` block.
///
/// Alias entries carry no prototype; they point at the command they alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDef {
    pub name: String,
    /// Type of the first formal parameter, if the command has parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_param_type: Option<String>,
    /// Types of all parameters, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub param_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl CommandDef {
    /// Creates a command from its parameter types.
    ///
    /// # Examples
    ///
    /// ```
    /// use vkw_codegen_core::CommandDef;
    ///
    /// let cmd = CommandDef::new("vkCreateFence", ["VkDevice", "VkFenceCreateInfo"]);
    /// assert_eq!(cmd.first_param_type.as_deref(), Some("VkDevice"));
    /// assert_eq!(cmd.param_types.len(), 2);
    /// ```
    pub fn new<I, S>(name: impl Into<String>, param_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let param_types: Vec<String> = param_types.into_iter().map(Into::into).collect();
        Self {
            name: name.into(),
            first_param_type: param_types.first().cloned(),
            param_types,
            alias: None,
        }
    }

    /// Creates an alias entry pointing at `target`.
    pub fn alias(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            first_param_type: None,
            param_types: Vec::new(),
            alias: Some(target.into()),
        }
    }
}

/// One `<feature>` block: a released API version and what it requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureBlock {
    /// Feature name, e.g. `VK_VERSION_1_1`.
    pub name: String,
    /// Declared version string, e.g. `"1.1"`. Parsed by the chain builder.
    pub number: String,
    /// APIs this block applies to. Empty means every API.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub api: Vec<String>,
    /// Commands required by this block, in declaration order.
    pub commands: Vec<String>,
    /// Types required by this block, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
}

impl FeatureBlock {
    pub fn new<I, S>(name: impl Into<String>, number: impl Into<String>, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            number: number.into(),
            api: Vec::new(),
            commands: commands.into_iter().map(Into::into).collect(),
            types: Vec::new(),
        }
    }

    /// Returns `true` if the block applies to `api`.
    pub fn applies_to(&self, api: &str) -> bool {
        self.api.is_empty() || self.api.iter().any(|a| a == api)
    }
}

/// One `<extension>` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionDef {
    /// Full extension name, e.g. `VK_KHR_surface`.
    pub name: String,
    /// Declared `type` attribute (`instance` or `device`); absent on
    /// disabled placeholder entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<Scope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// APIs from the `supported` attribute.
    #[serde(default)]
    pub supported: Vec<String>,
    pub commands: Vec<String>,
}

impl ExtensionDef {
    /// Creates a supported extension with the given scope and commands.
    ///
    /// # Examples
    ///
    /// ```
    /// use vkw_codegen_core::{ExtensionDef, Scope};
    ///
    /// let ext = ExtensionDef::new("VK_KHR_surface", Scope::Instance, ["vkDestroySurfaceKHR"])
    ///     .with_platform("wayland");
    /// assert!(ext.is_supported_by("vulkan"));
    /// assert_eq!(ext.platform_bucket(), "wayland");
    /// ```
    pub fn new<I, S>(name: impl Into<String>, kind: Scope, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            kind: Some(kind),
            platform: None,
            supported: vec!["vulkan".to_string()],
            commands: commands.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_platform(mut self, platform: &str) -> Self {
        self.platform = Some(platform.to_string());
        self
    }

    pub fn with_supported(mut self, supported: &str) -> Self {
        self.supported = split_api_list(supported);
        self
    }

    /// Returns `true` if the `supported` gate admits `api`.
    pub fn is_supported_by(&self, api: &str) -> bool {
        self.supported.iter().any(|s| s == api)
    }

    /// Platform bucket name, [`BASE_PLATFORM`] when unrestricted.
    pub fn platform_bucket(&self) -> &str {
        self.platform.as_deref().unwrap_or(BASE_PLATFORM)
    }

    /// Extension name without its leading `VK_` segment (`KHR_surface`).
    pub fn short_name(&self) -> &str {
        self.name
            .split_once('_')
            .map_or(self.name.as_str(), |(_, rest)| rest)
    }
}

/// One `<platform>` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformDef {
    pub name: String,
    /// Preprocessor symbol (the registry's `protect` attribute).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guard_token: Option<String>,
}

impl PlatformDef {
    pub fn new(name: impl Into<String>, guard_token: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            guard_token: Some(guard_token.into()),
        }
    }
}

/// One member of `VkPhysicalDeviceFeatures`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureMember {
    pub name: String,
    /// Member type, `VkBool32` for every current member.
    pub ty: String,
}

/// In-memory registry consumed by the generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaModel {
    pub commands: Vec<CommandDef>,
    pub features: Vec<FeatureBlock>,
    pub extensions: Vec<ExtensionDef>,
    pub platforms: Vec<PlatformDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub device_features: Vec<FeatureMember>,
}

impl SchemaModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds a command definition by name.
    pub fn find_command(&self, name: &str) -> Option<&CommandDef> {
        self.commands.iter().find(|c| c.name == name)
    }
}

/// Splits a registry API list attribute (`"vulkan,vulkansc"`).
pub fn split_api_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse_rejects_garbage() {
        assert!("1".parse::<ApiVersion>().is_err());
        assert!("1.2.3".parse::<ApiVersion>().is_err());
        assert!("v1.0".parse::<ApiVersion>().is_err());
        assert_eq!(" 1.3 ".parse::<ApiVersion>().unwrap(), ApiVersion::new(1, 3));
    }

    #[test]
    fn test_versions_order_by_major_then_minor() {
        assert!(ApiVersion::new(1, 9) < ApiVersion::new(2, 0));
        assert!(ApiVersion::new(1, 2) < ApiVersion::new(1, 10));
    }

    #[test]
    fn test_short_name_drops_first_segment() {
        let ext = ExtensionDef::new("VK_KHR_wayland_surface", Scope::Instance, ["vkCreateWaylandSurfaceKHR"]);
        assert_eq!(ext.short_name(), "KHR_wayland_surface");
    }

    #[test]
    fn test_supported_list_membership() {
        let ext = ExtensionDef::new("VK_KHR_swapchain", Scope::Device, ["vkCreateSwapchainKHR"])
            .with_supported("vulkan,vulkansc");
        assert!(ext.is_supported_by("vulkan"));
        assert!(ext.is_supported_by("vulkansc"));

        let disabled = ext.clone().with_supported("disabled");
        assert!(!disabled.is_supported_by("vulkan"));
    }

    #[test]
    fn test_feature_block_api_filter() {
        let mut block = FeatureBlock::new("VKSC_VERSION_1_0", "1.0", ["vkGetFaultData"]);
        assert!(block.applies_to("vulkan"));
        block.api = split_api_list("vulkansc");
        assert!(!block.applies_to("vulkan"));
    }
}
