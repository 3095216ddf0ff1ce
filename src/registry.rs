//! Name-to-node registry joining parser output to the runner.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::parser::{NodeId, Script};

/// Registry-level errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A node name collides with one already registered or with another node
    /// in the same script.
    #[error("node `{name}` is already registered")]
    DuplicateNode {
        /// The conflicting node name.
        name: String,
    },
}

/// Resolved node handle: the owning script plus the node's id within it.
#[derive(Debug, Clone)]
pub struct NodeHandle {
    /// Shared compiled script.
    pub script: Arc<Script>,
    /// Node id within `script`.
    pub node: NodeId,
}

/// Mapping from node name to compiled node, populated once per loaded script.
///
/// Registration is atomic per script: a name conflict rejects the whole
/// script and leaves the registry unchanged, so a later definition can never
/// silently shadow an earlier one.
#[derive(Debug, Clone, Default)]
pub struct DialogueRegistry {
    scripts: Vec<Arc<Script>>,
    nodes: HashMap<String, (usize, NodeId)>,
}

impl DialogueRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every node of `script`.
    ///
    /// Fails without registering anything when any node name is already
    /// taken, or when the script itself defines the same name twice.
    pub fn register_script(&mut self, script: Script) -> Result<(), RegistryError> {
        let mut incoming: HashMap<&str, NodeId> = HashMap::new();
        for (index, node) in script.nodes.iter().enumerate() {
            if self.nodes.contains_key(&node.name)
                || incoming.insert(&node.name, NodeId::new(index)).is_some()
            {
                return Err(RegistryError::DuplicateNode {
                    name: node.name.clone(),
                });
            }
        }

        let script_index = self.scripts.len();
        let entries: Vec<(String, NodeId)> = incoming
            .into_iter()
            .map(|(name, id)| (name.to_string(), id))
            .collect();
        self.scripts.push(Arc::new(script));
        for (name, id) in entries {
            debug!(node = %name, "registered dialogue node");
            self.nodes.insert(name, (script_index, id));
        }
        Ok(())
    }

    /// Resolves a node by name.
    pub fn resolve(&self, name: &str) -> Option<NodeHandle> {
        let (script_index, node) = self.nodes.get(name).copied()?;
        let script = Arc::clone(self.scripts.get(script_index)?);
        Some(NodeHandle { script, node })
    }

    /// Returns `true` when a node with `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Returns the number of registered nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` when no nodes are registered.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over registered node names in unspecified order.
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }
}
