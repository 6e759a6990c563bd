//! Extension catalog.
//!
//! Supported extensions are grouped by declared scope, then by platform
//! bucket. Each entry holds exactly the commands the registry lists for that
//! extension; nothing is inherited from the version chain or from other
//! extensions. Within a bucket, registry declaration order is kept. Buckets
//! follow the platform table's declaration order, with
//! [`BASE_PLATFORM`](crate::BASE_PLATFORM) last.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::{CommandScopeClassifier, UnresolvedCommand};
use crate::error::{GenError, Result};
use crate::guard::PlatformGuardResolver;
use crate::{BASE_PLATFORM, ExtensionDef, Scope};

/// A command with its classified scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopedCommand {
    pub name: String,
    pub scope: Scope,
}

/// One catalogued extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Full registry name (`VK_KHR_surface`).
    pub name: String,
    /// Name without the `VK_` segment (`KHR_surface`).
    pub short_name: String,
    /// Declared scope (`type` attribute).
    pub scope: Scope,
    pub platform: String,
    pub commands: Vec<ScopedCommand>,
}

impl CatalogEntry {
    pub fn command_names(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(|c| c.name.as_str())
    }
}

/// All extensions of one scope sharing a platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformBucket {
    pub platform: String,
    /// Guard token; `None` for the base bucket.
    pub guard: Option<String>,
    pub extensions: Vec<CatalogEntry>,
}

/// Buckets of one scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeCatalog {
    pub scope: Scope,
    pub buckets: Vec<PlatformBucket>,
}

impl ScopeCatalog {
    pub fn bucket(&self, platform: &str) -> Option<&PlatformBucket> {
        self.buckets.iter().find(|b| b.platform == platform)
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.buckets.iter().flat_map(|b| b.extensions.iter())
    }
}

/// An extension left out of the catalog because it could not be emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedExtension {
    pub name: String,
    pub reason: String,
}

/// Extensions keyed by scope, then platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionCatalog {
    pub instance: ScopeCatalog,
    pub device: ScopeCatalog,
    /// Extensions dropped with an error; the rest of the catalog is intact.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<RejectedExtension>,
}

impl ExtensionCatalog {
    pub fn for_scope(&self, scope: Scope) -> Option<&ScopeCatalog> {
        match scope {
            Scope::Instance => Some(&self.instance),
            Scope::Device => Some(&self.device),
            Scope::Global => None,
        }
    }

    /// All entries, instance extensions first.
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.instance.entries().chain(self.device.entries())
    }

    pub fn find(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries().find(|e| e.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries().count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }
}

/// Builds the [`ExtensionCatalog`] from the registry's extension list.
///
/// # Examples
///
/// ```
/// use vkw_codegen_core::*;
///
/// let mut schema = SchemaModel::new();
/// schema.commands.push(CommandDef::new("vkCreateWaylandSurfaceKHR", ["VkInstance"]));
/// schema.platforms.push(PlatformDef::new("wayland", "VK_USE_PLATFORM_WAYLAND_KHR"));
/// schema.extensions.push(
///     ExtensionDef::new("VK_KHR_wayland_surface", Scope::Instance, ["vkCreateWaylandSurfaceKHR"])
///         .with_platform("wayland"),
/// );
///
/// let config = GeneratorConfig::default();
/// let classifier = CommandScopeClassifier::new(&schema, &config);
/// let guards = PlatformGuardResolver::new(&schema.platforms);
/// let mut unresolved = Vec::new();
/// let catalog = ExtensionCatalogBuilder::new(&classifier, &guards, &config.api)
///     .build(&schema.extensions, &mut unresolved)
///     .unwrap();
///
/// let bucket = catalog.instance.bucket("wayland").unwrap();
/// assert_eq!(bucket.guard.as_deref(), Some("VK_USE_PLATFORM_WAYLAND_KHR"));
/// assert_eq!(bucket.extensions[0].short_name, "KHR_wayland_surface");
/// ```
#[derive(Debug)]
pub struct ExtensionCatalogBuilder<'a> {
    classifier: &'a CommandScopeClassifier,
    guards: &'a PlatformGuardResolver,
    api: &'a str,
}

impl<'a> ExtensionCatalogBuilder<'a> {
    pub fn new(
        classifier: &'a CommandScopeClassifier,
        guards: &'a PlatformGuardResolver,
        api: &'a str,
    ) -> Self {
        Self {
            classifier,
            guards,
            api,
        }
    }

    /// Builds the catalog.
    ///
    /// Extensions with no commands or not supported by the target API are
    /// skipped. An extension on an unmapped platform is recorded in
    /// [`ExtensionCatalog::rejected`] and processing continues.
    ///
    /// # Errors
    ///
    /// - [`GenError::MalformedSchema`] if a kept extension has no usable type.
    /// - [`GenError::UnknownCommand`] under the reject policy.
    pub fn build(
        &self,
        extensions: &[ExtensionDef],
        unresolved: &mut Vec<UnresolvedCommand>,
    ) -> Result<ExtensionCatalog> {
        let mut instance = self.empty_scope(Scope::Instance);
        let mut device = self.empty_scope(Scope::Device);
        let mut rejected = Vec::new();

        for ext in extensions {
            if ext.commands.is_empty() {
                debug!(extension = %ext.name, "Skipping extension without commands");
                continue;
            }
            if !ext.is_supported_by(self.api) {
                debug!(extension = %ext.name, supported = ?ext.supported, "Skipping unsupported extension");
                continue;
            }

            let scope = match ext.kind {
                Some(scope @ (Scope::Instance | Scope::Device)) => scope,
                _ => {
                    return Err(GenError::MalformedSchema {
                        entity: ext.name.clone(),
                        detail: "extension type must be instance or device".to_string(),
                    });
                }
            };

            let platform = ext.platform_bucket();
            if let Err(err) = self.guards.guard_for(platform) {
                debug!(extension = %ext.name, platform = %platform, "Rejecting extension");
                rejected.push(RejectedExtension {
                    name: ext.name.clone(),
                    reason: err.to_string(),
                });
                continue;
            }

            let mut commands = Vec::with_capacity(ext.commands.len());
            for name in &ext.commands {
                let classified = self.classifier.classify_reference(name, &ext.name)?;
                if !classified.known {
                    unresolved.push(UnresolvedCommand {
                        command: name.clone(),
                        referenced_by: ext.name.clone(),
                    });
                }
                if classified.scope != scope {
                    debug!(
                        extension = %ext.name,
                        command = %name,
                        command_scope = %classified.scope,
                        "Extension command scope differs from extension type"
                    );
                }
                commands.push(ScopedCommand {
                    name: name.clone(),
                    scope: classified.scope,
                });
            }

            let entry = CatalogEntry {
                name: ext.name.clone(),
                short_name: ext.short_name().to_string(),
                scope,
                platform: platform.to_string(),
                commands,
            };
            let target = if scope == Scope::Instance {
                &mut instance
            } else {
                &mut device
            };
            if let Some(bucket) = target.buckets.iter_mut().find(|b| b.platform == platform) {
                bucket.extensions.push(entry);
            }
        }

        instance.buckets.retain(|b| !b.extensions.is_empty());
        device.buckets.retain(|b| !b.extensions.is_empty());

        Ok(ExtensionCatalog {
            instance,
            device,
            rejected,
        })
    }

    fn empty_scope(&self, scope: Scope) -> ScopeCatalog {
        let mut buckets: Vec<PlatformBucket> = self
            .guards
            .platforms()
            .filter(|name| *name != BASE_PLATFORM)
            .filter_map(|name| {
                let guard = self.guards.guard_for(name).ok()?;
                Some(PlatformBucket {
                    platform: name.to_string(),
                    guard: guard.map(str::to_string),
                    extensions: Vec::new(),
                })
            })
            .collect();
        buckets.push(PlatformBucket {
            platform: BASE_PLATFORM.to_string(),
            guard: None,
            extensions: Vec::new(),
        });
        ScopeCatalog { scope, buckets }
    }
}
