//! Platform guard lookup.
//!
//! Platform-specific fragments are wrapped in `#ifdef <token>`; the token
//! comes from the registry's platform table. The unrestricted
//! [`BASE_PLATFORM`] bucket needs no guard.

use std::collections::HashMap;

use crate::error::{GenError, Result};
use crate::{BASE_PLATFORM, PlatformDef};

/// Maps platform names to guard tokens.
///
/// # Examples
///
/// ```
/// use vkw_codegen_core::{PlatformDef, PlatformGuardResolver};
///
/// let platforms = [PlatformDef::new("wayland", "VK_USE_PLATFORM_WAYLAND_KHR")];
/// let guards = PlatformGuardResolver::new(&platforms);
/// assert_eq!(guards.guard_for("wayland").unwrap(), Some("VK_USE_PLATFORM_WAYLAND_KHR"));
/// assert_eq!(guards.guard_for("base").unwrap(), None);
/// assert!(guards.guard_for("fuchsia").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct PlatformGuardResolver {
    guards: HashMap<String, String>,
    order: Vec<String>,
}

impl PlatformGuardResolver {
    pub fn new(platforms: &[PlatformDef]) -> Self {
        let mut guards = HashMap::with_capacity(platforms.len());
        let mut order = Vec::with_capacity(platforms.len());
        for platform in platforms {
            if let Some(token) = &platform.guard_token {
                guards.insert(platform.name.clone(), token.clone());
            }
            if !order.contains(&platform.name) {
                order.push(platform.name.clone());
            }
        }
        Self { guards, order }
    }

    /// Returns the guard token for `platform`.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::MissingGuardMapping`] if the platform is not in the
    /// table or has no token.
    pub fn guard_for(&self, platform: &str) -> Result<Option<&str>> {
        if platform == BASE_PLATFORM {
            return Ok(None);
        }
        self.guards
            .get(platform)
            .map(|token| Some(token.as_str()))
            .ok_or_else(|| GenError::MissingGuardMapping {
                platform: platform.to_string(),
            })
    }

    /// Platform names in registry declaration order.
    pub fn platforms(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}
