//! Generic in-memory tree of YANG-modeled data
//!
//! A [`SchemaNode`] represents one instance of a YANG data element:
//! container, list, leaf-list or leaf. Trees are assembled permissively;
//! type constraints and list-key uniqueness are checked when the tree is
//! serialized, not while it is being built.

use std::fmt;

use crate::types::LeafValue;

/// Kind of a schema node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Container,
    List,
    LeafList,
    Leaf,
}

/// Module-qualified tag of a node. Local names may collide between
/// modules, so the module name always travels with the tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    pub module: String,
    pub name: String,
}

impl QualifiedName {
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.name)
    }
}

/// One YANG data instance
///
/// A `List` node holds its entries as children (each entry shares the
/// list's qualified name); a `LeafList` node holds one `Leaf` child per
/// value. Children keep their insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    kind: NodeKind,
    qname: QualifiedName,
    value: Option<LeafValue>,
    children: Vec<SchemaNode>,
    keys: Vec<String>,
}

impl SchemaNode {
    fn new(kind: NodeKind, module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            qname: QualifiedName::new(module, name),
            value: None,
            children: Vec::new(),
            keys: Vec::new(),
        }
    }

    /// Create an empty container node
    pub fn container(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(NodeKind::Container, module, name)
    }

    /// Create an empty list node. Entries are appended with
    /// [`push_child`](Self::push_child) as container nodes carrying the
    /// same qualified name.
    pub fn list(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(NodeKind::List, module, name)
    }

    /// Create a leaf node with a value
    pub fn leaf(
        module: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<LeafValue>,
    ) -> Self {
        let mut node = Self::new(NodeKind::Leaf, module, name);
        node.value = Some(value.into());
        node
    }

    /// Create a leaf node with no value. Serializes to an empty element;
    /// used as a selection node in read filters.
    pub fn selection(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(NodeKind::Leaf, module, name)
    }

    /// Create an empty leaf-list node; values are appended with
    /// [`push_value`](Self::push_value)
    pub fn leaf_list(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(NodeKind::LeafList, module, name)
    }

    /// Set the key leaf names of a list node
    pub fn with_keys(mut self, keys: &[&str]) -> Self {
        self.keys = keys.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn qname(&self) -> &QualifiedName {
        &self.qname
    }

    /// Leaf value, if any
    pub fn value(&self) -> Option<&LeafValue> {
        self.value.as_ref()
    }

    /// Replace the leaf value
    pub fn set_value(&mut self, value: impl Into<LeafValue>) {
        self.value = Some(value.into());
    }

    pub fn children(&self) -> &[SchemaNode] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<SchemaNode> {
        &mut self.children
    }

    /// Key leaf names (list nodes)
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub(crate) fn set_keys(&mut self, keys: Vec<String>) {
        self.keys = keys;
    }

    /// Append a child node, preserving insertion order
    pub fn push_child(&mut self, child: SchemaNode) {
        self.children.push(child);
    }

    /// Append a value to a leaf-list node
    pub fn push_value(&mut self, value: impl Into<LeafValue>) {
        let mut entry = Self::new(NodeKind::Leaf, self.qname.module.clone(), self.qname.name.clone());
        entry.value = Some(value.into());
        self.children.push(entry);
    }

    /// Look up a direct child by local name. Absence is not an error,
    /// matching YANG optional-field semantics.
    pub fn child(&self, name: &str) -> Option<&SchemaNode> {
        self.children.iter().find(|c| c.qname.name == name)
    }

    /// Mutable variant of [`child`](Self::child)
    pub fn child_mut(&mut self, name: &str) -> Option<&mut SchemaNode> {
        self.children.iter_mut().find(|c| c.qname.name == name)
    }

    /// Value of a direct leaf child, if present
    pub fn leaf_value(&self, name: &str) -> Option<&LeafValue> {
        self.child(name).and_then(|c| c.value())
    }
}
