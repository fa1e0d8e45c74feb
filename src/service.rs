//! CRUD and executor services
//!
//! The caller-facing API surface: create/update/read/delete a subtree,
//! or invoke a custom RPC, all expressed in terms of [`SchemaNode`]
//! trees over an open [`Session`]. Configuration edits target the
//! candidate datastore (followed by a commit) when the server
//! advertises the candidate capability, the running datastore
//! otherwise.

use tracing::debug;

use crate::codec::XmlCodec;
use crate::error::{NetconfError, Result};
use crate::node::{NodeKind, QualifiedName, SchemaNode};
use crate::rpc::{CANDIDATE, NETCONF_NS, ReplyContent, RpcReply};
use crate::schema::{EntryKind, child_path};
use crate::session::Session;

/// Per-node edit-config operation attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditOperation {
    Create,
    Merge,
    Delete,
    Remove,
}

impl EditOperation {
    fn as_str(self) -> &'static str {
        match self {
            EditOperation::Create => "create",
            EditOperation::Merge => "merge",
            EditOperation::Delete => "delete",
            EditOperation::Remove => "remove",
        }
    }
}

/// Create/read/update/delete operations on configuration subtrees
#[derive(Debug, Clone)]
pub struct CrudService {
    codec: XmlCodec,
}

impl CrudService {
    pub fn new(codec: XmlCodec) -> Self {
        Self { codec }
    }

    /// Create the subtree on the device. Fails with
    /// [`NetconfError::ConfigRejected`] if the server declines, e.g. on
    /// validation failure or a conflicting key.
    pub fn create(&self, session: &Session, node: &SchemaNode) -> Result<()> {
        self.edit(session, node, EditOperation::Create)
    }

    /// Merge the subtree into the device configuration
    pub fn update(&self, session: &Session, node: &SchemaNode) -> Result<()> {
        self.edit(session, node, EditOperation::Merge)
    }

    /// Delete the subtree. Strict: deleting a target that does not
    /// exist is rejected by the server and surfaces as
    /// [`NetconfError::ConfigRejected`].
    pub fn delete(&self, session: &Session, node: &SchemaNode) -> Result<()> {
        self.edit(session, node, EditOperation::Delete)
    }

    /// Idempotent delete variant: a missing target is not an error
    pub fn delete_if_exists(&self, session: &Session, node: &SchemaNode) -> Result<()> {
        self.edit(session, node, EditOperation::Remove)
    }

    /// Read state and configuration matching the filter tree. Only the
    /// filter's structure and list keys select data; other leaf values
    /// are ignored. An empty result decodes to a tree with no children.
    pub fn read(&self, session: &Session, filter: &SchemaNode) -> Result<SchemaNode> {
        self.retrieve(session, filter, false, false)
    }

    /// Read configuration only, from the running datastore
    pub fn read_config(&self, session: &Session, filter: &SchemaNode) -> Result<SchemaNode> {
        self.retrieve(session, filter, true, false)
    }

    /// Like [`read`](Self::read), but fails with
    /// [`NetconfError::NotFound`] when the result is empty
    pub fn read_required(&self, session: &Session, filter: &SchemaNode) -> Result<SchemaNode> {
        self.retrieve(session, filter, false, true)
    }

    fn edit(&self, session: &Session, node: &SchemaNode, op: EditOperation) -> Result<()> {
        debug!(subtree = %node.qname(), operation = op.as_str(), "edit-config");
        let payload = self.codec.encode_with_attrs(
            node,
            &[("xmlns:xc", NETCONF_NS), ("xc:operation", op.as_str())],
        )?;
        let candidate = session.has_capability(CANDIDATE);
        let target = if candidate { "<candidate/>" } else { "<running/>" };
        let body =
            format!("<edit-config><target>{target}</target><config>{payload}</config></edit-config>");
        let reply = round_trip(session, body)?;
        expect_ok(reply)?;
        if candidate {
            let reply = round_trip(session, "<commit/>".to_string())?;
            expect_ok(reply)?;
        }
        Ok(())
    }

    fn retrieve(
        &self,
        session: &Session,
        filter: &SchemaNode,
        config_only: bool,
        required: bool,
    ) -> Result<SchemaNode> {
        let filter_xml = self.codec.encode(&self.filter_view(filter, "", None, &[]))?;
        let body = if config_only {
            format!(
                "<get-config><source><running/></source>\
                 <filter type=\"subtree\">{filter_xml}</filter></get-config>"
            )
        } else {
            format!("<get><filter type=\"subtree\">{filter_xml}</filter></get>")
        };
        let reply = round_trip(session, body)?;
        match reply.content {
            ReplyContent::Errors(mut errors) => Err(NetconfError::RpcError(errors.remove(0))),
            ReplyContent::Data(inner) if !inner.trim().is_empty() => {
                let mut nodes = self.codec.decode_fragment("", None, &inner)?;
                let position = nodes.iter().position(|n| n.qname() == filter.qname());
                match position {
                    Some(i) => Ok(nodes.remove(i)),
                    None if required => {
                        Err(NetconfError::NotFound(filter.qname().to_string()))
                    }
                    None => Ok(empty_like(filter)),
                }
            }
            _ if required => Err(NetconfError::NotFound(filter.qname().to_string())),
            _ => Ok(empty_like(filter)),
        }
    }

    /// Derive the subtree filter from a node: structure and list-key
    /// leaf values are kept, other leaf values are stripped to
    /// selection elements.
    fn filter_view(
        &self,
        node: &SchemaNode,
        parent_path: &str,
        parent_module: Option<&str>,
        keys_in_scope: &[String],
    ) -> SchemaNode {
        let qname = node.qname();
        let path = child_path(parent_path, parent_module, &qname.module, &qname.name);
        let registry = self.codec.registry();
        match node.kind() {
            NodeKind::Leaf => {
                if node.value().is_some() && keys_in_scope.iter().any(|k| k == &qname.name) {
                    node.clone()
                } else {
                    SchemaNode::selection(qname.module.clone(), qname.name.clone())
                }
            }
            NodeKind::LeafList => SchemaNode::leaf_list(qname.module.clone(), qname.name.clone()),
            NodeKind::List => {
                let keys = registry.keys(&path).to_vec();
                let mut view = SchemaNode::list(qname.module.clone(), qname.name.clone());
                for entry in node.children() {
                    let mut entry_view =
                        SchemaNode::container(entry.qname().module.clone(), entry.qname().name.clone());
                    for child in entry.children() {
                        entry_view.push_child(self.filter_view(
                            child,
                            &path,
                            Some(&qname.module),
                            &keys,
                        ));
                    }
                    view.push_child(entry_view);
                }
                view
            }
            NodeKind::Container => {
                // A container that the schema declares as a list is a
                // bare list entry; its key leaves stay selectable
                let keys = match registry.lookup(&path).map(|e| e.kind) {
                    Some(EntryKind::List) => registry.keys(&path).to_vec(),
                    _ => Vec::new(),
                };
                let mut view = SchemaNode::container(qname.module.clone(), qname.name.clone());
                for child in node.children() {
                    view.push_child(self.filter_view(child, &path, Some(&qname.module), &keys));
                }
                view
            }
        }
    }
}

/// Custom (non-CRUD) RPC invocation
#[derive(Debug, Clone)]
pub struct ExecutorService {
    codec: XmlCodec,
}

impl ExecutorService {
    pub fn new(codec: XmlCodec) -> Self {
        Self { codec }
    }

    /// Invoke the RPC named by `rpc`, supplying `input` as its `input`
    /// container. Returns the decoded output container, or `None` when
    /// the server replies with `<ok/>` or an empty reply. Server errors
    /// surface as [`NetconfError::RpcError`] with the diagnostic
    /// payload preserved verbatim.
    pub fn execute_rpc(
        &self,
        session: &Session,
        rpc: &QualifiedName,
        input: Option<&SchemaNode>,
    ) -> Result<Option<SchemaNode>> {
        let registry = self.codec.registry();
        let rpc_path = format!("/{}:{}", rpc.module, rpc.name);
        let entry = registry
            .lookup(&rpc_path)
            .ok_or_else(|| NetconfError::UnknownSchemaNode(rpc_path.clone()))?;
        if entry.kind != EntryKind::Rpc {
            return Err(NetconfError::TypeMismatch {
                path: rpc_path,
                detail: "not an rpc".to_string(),
            });
        }
        let namespace = registry
            .namespace(&rpc.module)
            .ok_or_else(|| NetconfError::UnknownSchemaNode(format!("module '{}'", rpc.module)))?
            .to_string();

        debug!(rpc = %rpc, "executing rpc");
        let inner = match input {
            Some(node) => self.codec.encode_subtree(&rpc_path, &rpc.module, node)?,
            None => String::new(),
        };
        let body = if inner.is_empty() {
            format!("<{} xmlns=\"{namespace}\"/>", rpc.name)
        } else {
            format!("<{} xmlns=\"{namespace}\">{inner}</{}>", rpc.name, rpc.name)
        };
        let reply = round_trip(session, body)?;
        match reply.content {
            ReplyContent::Errors(mut errors) => Err(NetconfError::RpcError(errors.remove(0))),
            ReplyContent::Ok => Ok(None),
            ReplyContent::Data(inner) | ReplyContent::Other(inner) => {
                self.decode_output(rpc, &rpc_path, &inner)
            }
        }
    }

    /// Normalize a reply body to one `output` container. Servers answer
    /// both with an `<output>` wrapper and with bare output leaves.
    fn decode_output(
        &self,
        rpc: &QualifiedName,
        rpc_path: &str,
        inner: &str,
    ) -> Result<Option<SchemaNode>> {
        match self.codec.decode_fragment(rpc_path, Some(&rpc.module), inner) {
            Ok(mut nodes) => match nodes.len() {
                0 => Ok(None),
                _ => Ok(Some(nodes.remove(0))),
            },
            Err(NetconfError::UnknownSchemaNode(_)) => {
                let output_path = format!("{rpc_path}/output");
                let children =
                    self.codec
                        .decode_fragment(&output_path, Some(&rpc.module), inner)?;
                let mut output = SchemaNode::container(rpc.module.clone(), "output");
                for child in children {
                    output.push_child(child);
                }
                Ok(Some(output))
            }
            Err(e) => Err(e),
        }
    }
}

fn round_trip(session: &Session, body: String) -> Result<RpcReply> {
    let request = session.envelope(body);
    let reply = session.send(&request)?;
    RpcReply::parse(&reply.body)
}

fn expect_ok(reply: RpcReply) -> Result<()> {
    match reply.content {
        ReplyContent::Errors(mut errors) => Err(NetconfError::ConfigRejected(errors.remove(0))),
        _ => Ok(()),
    }
}

fn empty_like(filter: &SchemaNode) -> SchemaNode {
    let qname = filter.qname();
    match filter.kind() {
        NodeKind::Container => SchemaNode::container(qname.module.clone(), qname.name.clone()),
        NodeKind::List => SchemaNode::list(qname.module.clone(), qname.name.clone()),
        NodeKind::LeafList => SchemaNode::leaf_list(qname.module.clone(), qname.name.clone()),
        NodeKind::Leaf => SchemaNode::selection(qname.module.clone(), qname.name.clone()),
    }
}
