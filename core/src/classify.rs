//! Command scope classification.
//!
//! A command's scope decides which dispatch table loads it:
//!
//! 1. names in the global bootstrap set are [`Scope::Global`];
//! 2. names in the instance override set are [`Scope::Instance`];
//! 3. a first parameter of an instance handle type (`VkInstance`,
//!    `VkPhysicalDevice`) means [`Scope::Instance`], anything else
//!    [`Scope::Device`].
//!
//! The name rules hold whether or not the registry defines the command.
//! Alias entries are classified through the command they alias. Other
//! commands absent from the registry fall back to [`Scope::Instance`] unless
//! the configured [`UnknownCommandPolicy`] rejects them.
//!
//! # Examples
//!
//! ```
//! use vkw_codegen_core::*;
//!
//! let mut schema = SchemaModel::new();
//! schema.commands.push(CommandDef::new("vkCreateInstance", ["VkInstanceCreateInfo"]));
//! schema.commands.push(CommandDef::new("vkEnumeratePhysicalDevices", ["VkInstance"]));
//! schema.commands.push(CommandDef::new("vkQueueSubmit", ["VkQueue"]));
//!
//! let config = GeneratorConfig::default();
//! let classifier = CommandScopeClassifier::new(&schema, &config);
//! assert_eq!(classifier.classify("vkCreateInstance"), Scope::Global);
//! assert_eq!(classifier.classify("vkEnumeratePhysicalDevices"), Scope::Instance);
//! assert_eq!(classifier.classify("vkQueueSubmit"), Scope::Device);
//! ```

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{ClassificationTable, GeneratorConfig, UnknownCommandPolicy};
use crate::error::{GenError, Result};
use crate::{CommandDef, SchemaModel, Scope};

/// Applies the classification rules to one command signature.
///
/// Pure function of the rule table; does not consult any registry.
///
/// # Examples
///
/// ```
/// use vkw_codegen_core::{ClassificationTable, Scope, classify_signature};
///
/// let table = ClassificationTable::default();
/// assert_eq!(
///     classify_signature(&table, "vkGetInstanceProcAddr", Some("VkInstance")),
///     Scope::Global
/// );
/// assert_eq!(
///     classify_signature(&table, "vkGetDeviceProcAddr", Some("VkDevice")),
///     Scope::Instance
/// );
/// assert_eq!(
///     classify_signature(&table, "vkCmdDraw", Some("VkCommandBuffer")),
///     Scope::Device
/// );
/// ```
pub fn classify_signature(
    table: &ClassificationTable,
    name: &str,
    first_param_type: Option<&str>,
) -> Scope {
    if table.is_global(name) {
        return Scope::Global;
    }
    if table.is_instance_override(name) {
        return Scope::Instance;
    }
    match first_param_type {
        Some(ty) if table.is_instance_handle(ty) => Scope::Instance,
        _ => Scope::Device,
    }
}

/// Outcome of classifying a referenced command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classified {
    pub scope: Scope,
    /// `false` when the command was not in the registry and the scope is the
    /// fallback.
    pub known: bool,
}

/// A referenced command that fell back to the default scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedCommand {
    pub command: String,
    /// Feature block or extension naming the command.
    pub referenced_by: String,
}

/// Scope classifier over one registry.
///
/// Every registry command is classified once at construction; lookups are
/// map hits afterwards.
#[derive(Debug)]
pub struct CommandScopeClassifier {
    scopes: HashMap<String, Scope>,
    table: ClassificationTable,
    policy: UnknownCommandPolicy,
}

impl CommandScopeClassifier {
    pub fn new(schema: &SchemaModel, config: &GeneratorConfig) -> Self {
        let by_name: HashMap<&str, &CommandDef> = schema
            .commands
            .iter()
            .map(|cmd| (cmd.name.as_str(), cmd))
            .collect();

        let table = &config.classification;
        let mut scopes = HashMap::with_capacity(schema.commands.len());
        for cmd in &schema.commands {
            match resolve_signature(cmd, &by_name) {
                Some(first_param) => {
                    scopes.insert(cmd.name.clone(), classify_signature(table, &cmd.name, first_param));
                }
                None => {
                    debug!(command = %cmd.name, alias = ?cmd.alias, "Alias does not resolve to a prototype");
                }
            }
        }

        Self {
            scopes,
            table: table.clone(),
            policy: config.unknown_commands,
        }
    }

    /// Returns the scope of `name`, `None` if neither the name rules nor the
    /// registry decide it.
    pub fn resolve(&self, name: &str) -> Option<Scope> {
        if let Some(scope) = self.scopes.get(name) {
            return Some(*scope);
        }
        if self.table.is_global(name) || self.table.is_instance_override(name) {
            return Some(classify_signature(&self.table, name, None));
        }
        None
    }

    /// Returns the scope of `name`, falling back to [`Scope::Instance`] for
    /// commands nothing else decides.
    pub fn classify(&self, name: &str) -> Scope {
        self.resolve(name).unwrap_or(Scope::Instance)
    }

    /// Classifies a command referenced by a feature block or extension,
    /// applying the unknown-command policy.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::UnknownCommand`] if the command is not in the
    /// registry, no name rule covers it, and the policy is
    /// [`UnknownCommandPolicy::Reject`].
    pub fn classify_reference(&self, name: &str, referenced_by: &str) -> Result<Classified> {
        if let Some(scope) = self.resolve(name) {
            return Ok(Classified { scope, known: true });
        }
        match self.policy {
            UnknownCommandPolicy::Instance => {
                warn!(command = %name, referenced_by = %referenced_by, "Command not in registry, classifying as instance");
                Ok(Classified {
                    scope: Scope::Instance,
                    known: false,
                })
            }
            UnknownCommandPolicy::Reject => Err(GenError::UnknownCommand {
                command: name.to_string(),
                referenced_by: referenced_by.to_string(),
            }),
        }
    }

    /// Number of registry commands with a resolved prototype scope.
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

/// Follows alias links to the command carrying a prototype.
///
/// Returns the first parameter type of that prototype (itself optional), or
/// `None` when the chain dangles or loops.
fn resolve_signature<'a>(
    cmd: &'a CommandDef,
    by_name: &HashMap<&str, &'a CommandDef>,
) -> Option<Option<&'a str>> {
    let mut current = cmd;
    let mut seen: HashSet<&str> = HashSet::new();
    loop {
        let Some(target) = current.alias.as_deref() else {
            return Some(current.first_param_type.as_deref());
        };
        if !seen.insert(current.name.as_str()) {
            return None;
        }
        current = by_name.get(target).copied()?;
    }
}
