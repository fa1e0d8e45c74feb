//! Schema registry
//!
//! The registry holds the module definitions the codec consults to
//! resolve schema paths to node kinds, leaf types and list keys, and to
//! map module names to XML namespaces. Module definition files are JSON
//! documents produced outside this crate (schema compilation is out of
//! scope); the registry only loads them.
//!
//! A path is written `/module:node/child`, repeating the module prefix
//! only where the module changes along the path (augmentations).

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{NetconfError, Result};
use crate::types::YangType;

/// Kind of a schema-tree entry as declared by a module file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Container,
    List,
    LeafList,
    Leaf,
    Rpc,
}

/// One resolved schema entry
#[derive(Debug, Clone)]
pub struct SchemaEntry {
    pub kind: EntryKind,
    /// Declared type for leaf/leaf-list entries
    pub leaf_type: Option<YangType>,
    /// Key leaf names for list entries
    pub keys: Vec<String>,
}

/// Per-module metadata
#[derive(Debug, Clone)]
struct ModuleInfo {
    namespace: String,
    #[allow(dead_code)]
    revision: Option<String>,
}

/// Raw module file structure for deserialization
#[derive(Debug, Deserialize)]
struct RawModule {
    #[serde(rename = "module-name")]
    module_name: String,
    namespace: String,
    #[serde(default)]
    revision: Option<String>,
    #[serde(alias = "items")]
    item: Vec<RawItem>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    identifier: String,
    node: String,
    #[serde(rename = "type")]
    item_type: Option<Value>,
    #[serde(default)]
    keys: Option<Vec<String>>,
}

/// Registry of loaded module definitions. Read-only after loading and
/// safe to share across sessions.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    modules: HashMap<String, ModuleInfo>,
    namespaces: HashMap<String, String>,
    entries: HashMap<String, SchemaEntry>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a module definition file from the given path
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let content = fs::read_to_string(path.as_ref())?;
        self.load_str(&content)
    }

    /// Load a module definition from a JSON string
    pub fn load_str(&mut self, content: &str) -> Result<()> {
        let raw: RawModule = serde_json::from_str(content)?;

        for item in &raw.item {
            let kind = match item.node.as_str() {
                "container" => EntryKind::Container,
                "list" => EntryKind::List,
                "leaf-list" => EntryKind::LeafList,
                "leaf" => EntryKind::Leaf,
                "rpc" => EntryKind::Rpc,
                other => {
                    return Err(NetconfError::InvalidModuleFile(format!(
                        "unknown node kind '{other}' for {}",
                        item.identifier
                    )));
                }
            };
            let leaf_type = item.item_type.as_ref().map(YangType::from_module_type);
            let keys = item.keys.clone().unwrap_or_default();
            if !keys.is_empty() && kind != EntryKind::List {
                return Err(NetconfError::InvalidModuleFile(format!(
                    "keys declared on non-list node {}",
                    item.identifier
                )));
            }
            self.entries.insert(
                item.identifier.clone(),
                SchemaEntry {
                    kind,
                    leaf_type,
                    keys,
                },
            );
        }

        self.namespaces
            .insert(raw.namespace.clone(), raw.module_name.clone());
        self.modules.insert(
            raw.module_name,
            ModuleInfo {
                namespace: raw.namespace,
                revision: raw.revision,
            },
        );
        Ok(())
    }

    /// XML namespace of a loaded module
    pub fn namespace(&self, module: &str) -> Option<&str> {
        self.modules.get(module).map(|m| m.namespace.as_str())
    }

    /// Module name owning the given XML namespace
    pub fn module_for_namespace(&self, namespace: &str) -> Option<&str> {
        self.namespaces.get(namespace).map(String::as_str)
    }

    /// Resolve a schema path to its entry
    pub fn lookup(&self, path: &str) -> Option<&SchemaEntry> {
        self.entries.get(path)
    }

    /// Key leaf names of a list entry, empty if unknown
    pub fn keys(&self, path: &str) -> &[String] {
        self.lookup(path).map(|e| e.keys.as_slice()).unwrap_or(&[])
    }
}

/// Build a child schema path, repeating the module prefix only when the
/// module changes relative to the parent.
pub(crate) fn child_path(
    parent_path: &str,
    parent_module: Option<&str>,
    module: &str,
    name: &str,
) -> String {
    if parent_module == Some(module) {
        format!("{parent_path}/{name}")
    } else {
        format!("{parent_path}/{module}:{name}")
    }
}
