//! Cumulative version chains.
//!
//! Each released API version becomes one node on the instance chain and one
//! on the device chain. A node stores only the commands its version adds plus
//! a back-reference to the version it extends; the full command set of a
//! version is the walk from the root to that node, produced lazily by
//! [`VersionChain::cumulative`].
//!
//! # Example
//!
//! ```
//! use vkw_codegen_core::*;
//!
//! let mut schema = SchemaModel::new();
//! schema.commands.extend([
//!     CommandDef::new("vkDestroyInstance", ["VkInstance"]),
//!     CommandDef::new("vkQueueSubmit", ["VkQueue"]),
//!     CommandDef::new("vkTrimCommandPool", ["VkDevice"]),
//! ]);
//! schema.features.push(FeatureBlock::new("VK_VERSION_1_0", "1.0", ["vkDestroyInstance", "vkQueueSubmit"]));
//! schema.features.push(FeatureBlock::new("VK_VERSION_1_1", "1.1", ["vkTrimCommandPool"]));
//!
//! let config = GeneratorConfig::default();
//! let classifier = CommandScopeClassifier::new(&schema, &config);
//! let mut unresolved = Vec::new();
//! let chains = VersionChainBuilder::new(&classifier, &config.api)
//!     .build(&schema.features, &mut unresolved)
//!     .unwrap();
//!
//! let v1_1 = ApiVersion::new(1, 1);
//! let device: Vec<&str> = chains.device.cumulative(v1_1).unwrap().collect();
//! assert_eq!(device, ["vkQueueSubmit", "vkTrimCommandPool"]);
//! assert_eq!(chains.device.node(v1_1).unwrap().delta, ["vkTrimCommandPool"]);
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::{CommandScopeClassifier, UnresolvedCommand};
use crate::error::{GenError, Result};
use crate::{ApiVersion, FeatureBlock, Scope};

/// One version's node on a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainNode {
    pub version: ApiVersion,
    /// Feature block this node was built from (`VK_VERSION_1_1`).
    pub feature: String,
    /// Commands first introduced at this version, in declaration order.
    pub delta: Vec<String>,
    /// Version this node extends; `None` means the root symbol table.
    pub previous: Option<ApiVersion>,
}

/// Strictly increasing chain of version nodes for one dispatch scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionChain {
    pub scope: Scope,
    pub nodes: Vec<ChainNode>,
}

impl VersionChain {
    /// Creates an empty chain holding only the root.
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            nodes: Vec::new(),
        }
    }

    /// Finds the node for `version`.
    pub fn node(&self, version: ApiVersion) -> Option<&ChainNode> {
        self.nodes
            .binary_search_by_key(&version, |n| n.version)
            .ok()
            .map(|idx| &self.nodes[idx])
    }

    /// Returns the node `node` extends, `None` for the root.
    pub fn parent(&self, node: &ChainNode) -> Option<&ChainNode> {
        node.previous.and_then(|v| self.node(v))
    }

    /// Iterates the cumulative command set of `version`, oldest version
    /// first. Returns `None` if the chain has no such version.
    pub fn cumulative(&self, version: ApiVersion) -> Option<Cumulative<'_>> {
        let mut path = Vec::new();
        let mut cursor = self.node(version);
        while let Some(node) = cursor {
            path.push(node);
            cursor = self.parent(node);
        }
        if path.is_empty() {
            return None;
        }
        path.reverse();
        Some(Cumulative {
            path,
            node: 0,
            command: 0,
        })
    }

    /// Returns `true` if `command` is in the cumulative set of `version`.
    pub fn contains(&self, version: ApiVersion, command: &str) -> bool {
        self.cumulative(version)
            .is_some_and(|mut set| set.any(|c| c == command))
    }

    /// Every command on the chain, with the version introducing it.
    pub fn commands(&self) -> impl Iterator<Item = (ApiVersion, &str)> {
        self.nodes
            .iter()
            .flat_map(|n| n.delta.iter().map(move |c| (n.version, c.as_str())))
    }
}

/// Lazy iterator over a version's cumulative command set.
#[derive(Debug)]
pub struct Cumulative<'a> {
    path: Vec<&'a ChainNode>,
    node: usize,
    command: usize,
}

impl<'a> Iterator for Cumulative<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.path.get(self.node) {
            if let Some(cmd) = node.delta.get(self.command) {
                self.command += 1;
                return Some(cmd.as_str());
            }
            self.node += 1;
            self.command = 0;
        }
        None
    }
}

/// The instance and device chains built from one registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionChains {
    pub instance: VersionChain,
    pub device: VersionChain,
}

impl VersionChains {
    /// Returns the chain for a dispatchable scope.
    pub fn for_scope(&self, scope: Scope) -> Option<&VersionChain> {
        match scope {
            Scope::Instance => Some(&self.instance),
            Scope::Device => Some(&self.device),
            Scope::Global => None,
        }
    }

    /// Versions present on both chains, in order.
    pub fn versions(&self) -> impl Iterator<Item = ApiVersion> + '_ {
        self.instance.nodes.iter().map(|n| n.version)
    }
}

/// Walks feature blocks in declaration order and builds both chains.
#[derive(Debug)]
pub struct VersionChainBuilder<'a> {
    classifier: &'a CommandScopeClassifier,
    api: &'a str,
}

impl<'a> VersionChainBuilder<'a> {
    pub fn new(classifier: &'a CommandScopeClassifier, api: &'a str) -> Self {
        Self { classifier, api }
    }

    /// Builds the chains.
    ///
    /// Feature blocks not applying to the target API are skipped. Commands
    /// classified via the unknown-command fallback are appended to
    /// `unresolved`.
    ///
    /// # Errors
    ///
    /// - [`GenError::MalformedSchema`] if a version number does not parse.
    /// - [`GenError::VersionGap`] if a version is not the successor of the
    ///   previous one (the first must be 1.0).
    /// - [`GenError::DuplicateCommand`] if a command is listed twice.
    /// - [`GenError::UnknownCommand`] under the reject policy.
    pub fn build(
        &self,
        features: &[FeatureBlock],
        unresolved: &mut Vec<UnresolvedCommand>,
    ) -> Result<VersionChains> {
        let mut instance = VersionChain::new(Scope::Instance);
        let mut device = VersionChain::new(Scope::Device);
        let mut first_declared: HashMap<&str, ApiVersion> = HashMap::new();
        let mut expected = ApiVersion::INITIAL;
        let mut previous: Option<ApiVersion> = None;

        for feature in features {
            if !feature.applies_to(self.api) {
                debug!(feature = %feature.name, api = ?feature.api, "Skipping feature for other API");
                continue;
            }

            let version: ApiVersion = feature.number.parse().map_err(|_| GenError::MalformedSchema {
                entity: feature.name.clone(),
                detail: format!("invalid version number {:?}", feature.number),
            })?;
            if version != expected {
                return Err(GenError::VersionGap {
                    expected,
                    found: version,
                    feature: feature.name.clone(),
                });
            }

            let mut instance_delta = Vec::new();
            let mut device_delta = Vec::new();
            for command in &feature.commands {
                if let Some(&first) = first_declared.get(command.as_str()) {
                    return Err(GenError::DuplicateCommand {
                        command: command.clone(),
                        first,
                        version,
                    });
                }
                first_declared.insert(command.as_str(), version);

                let classified = self.classifier.classify_reference(command, &feature.name)?;
                if !classified.known {
                    unresolved.push(UnresolvedCommand {
                        command: command.clone(),
                        referenced_by: feature.name.clone(),
                    });
                }
                match classified.scope {
                    Scope::Global => {}
                    Scope::Instance => instance_delta.push(command.clone()),
                    Scope::Device => device_delta.push(command.clone()),
                }
            }

            debug!(
                version = %version,
                instance = instance_delta.len(),
                device = device_delta.len(),
                "Built version node"
            );

            instance.nodes.push(ChainNode {
                version,
                feature: feature.name.clone(),
                delta: instance_delta,
                previous,
            });
            device.nodes.push(ChainNode {
                version,
                feature: feature.name.clone(),
                delta: device_delta,
                previous,
            });

            previous = Some(version);
            expected = version.next_minor();
        }

        Ok(VersionChains { instance, device })
    }
}
