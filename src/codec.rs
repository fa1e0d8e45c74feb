//! XML codec
//!
//! Serializes [`SchemaNode`] trees into the NETCONF payload form and
//! back: a container becomes an element, a list becomes repeated
//! sibling elements, a leaf becomes an element with canonical value
//! text, and an empty-typed leaf becomes a self-closing element.
//! Namespace declarations are emitted only where a node's module
//! differs from its parent's, and deduplicated below that point.
//!
//! The codec is pure; all state lives in the shared read-only
//! [`SchemaRegistry`].

use std::collections::HashSet;
use std::io::Write;
use std::sync::Arc;

use quick_xml::NsReader;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::{Namespace, ResolveResult};

use crate::error::{NetconfError, Result};
use crate::node::{NodeKind, QualifiedName, SchemaNode};
use crate::schema::{EntryKind, SchemaEntry, SchemaRegistry, child_path};
use crate::types::YangType;

/// XML codec over a shared schema registry
#[derive(Debug, Clone)]
pub struct XmlCodec {
    registry: Arc<SchemaRegistry>,
}

impl XmlCodec {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Serialize a tree into compact on-wire XML
    pub fn encode(&self, node: &SchemaNode) -> Result<String> {
        self.encode_with_attrs(node, &[])
    }

    /// Serialize a tree with indentation, for display purposes
    pub fn encode_pretty(&self, node: &SchemaNode) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        self.write_node(&mut writer, node, "", None, &[])?;
        Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
    }

    /// Serialize a tree placing extra attributes on the root element
    /// (used for per-node edit-config operations)
    pub(crate) fn encode_with_attrs(
        &self,
        node: &SchemaNode,
        attrs: &[(&str, &str)],
    ) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        self.write_node(&mut writer, node, "", None, attrs)?;
        Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
    }

    /// Serialize a subtree that sits below `parent_path` in the schema
    /// tree (used for RPC input payloads)
    pub(crate) fn encode_subtree(
        &self,
        parent_path: &str,
        parent_module: &str,
        node: &SchemaNode,
    ) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        self.write_node(&mut writer, node, parent_path, Some(parent_module), &[])?;
        Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
    }

    fn write_node<W: Write>(
        &self,
        writer: &mut Writer<W>,
        node: &SchemaNode,
        parent_path: &str,
        parent_module: Option<&str>,
        attrs: &[(&str, &str)],
    ) -> Result<()> {
        let qname = node.qname();
        let path = child_path(parent_path, parent_module, &qname.module, &qname.name);
        let entry = self
            .registry
            .lookup(&path)
            .ok_or_else(|| NetconfError::UnknownSchemaNode(path.clone()))?;

        match (entry.kind, node.kind()) {
            (EntryKind::List, NodeKind::List) => {
                self.check_list_keys(&path, entry, node)?;
                for item in node.children() {
                    self.write_element(writer, qname, item, &path, entry, parent_module, attrs)?;
                }
                Ok(())
            }
            (EntryKind::LeafList, NodeKind::LeafList) => {
                for item in node.children() {
                    self.write_element(writer, qname, item, &path, entry, parent_module, attrs)?;
                }
                Ok(())
            }
            // A single list entry may be passed without its wrapper,
            // e.g. as a read filter
            (EntryKind::Container, NodeKind::Container)
            | (EntryKind::List, NodeKind::Container)
            | (EntryKind::Leaf, NodeKind::Leaf)
            | (EntryKind::LeafList, NodeKind::Leaf) => {
                self.write_element(writer, qname, node, &path, entry, parent_module, attrs)
            }
            (expected, got) => Err(NetconfError::TypeMismatch {
                path,
                detail: format!("schema declares {expected:?}, node was built as {got:?}"),
            }),
        }
    }

    fn write_element<W: Write>(
        &self,
        writer: &mut Writer<W>,
        qname: &QualifiedName,
        content: &SchemaNode,
        path: &str,
        entry: &SchemaEntry,
        parent_module: Option<&str>,
        attrs: &[(&str, &str)],
    ) -> Result<()> {
        let mut start = BytesStart::new(qname.name.as_str());
        if parent_module != Some(qname.module.as_str()) {
            let ns = self.registry.namespace(&qname.module).ok_or_else(|| {
                NetconfError::UnknownSchemaNode(format!("module '{}'", qname.module))
            })?;
            start.push_attribute(("xmlns", ns));
        }
        for (key, value) in attrs {
            start.push_attribute((*key, *value));
        }

        match entry.kind {
            EntryKind::Leaf | EntryKind::LeafList => match content.value() {
                // Valueless leaf: selection node in a filter
                None => writer.write_event(Event::Empty(start))?,
                Some(value) => {
                    let declared = entry
                        .leaf_type
                        .clone()
                        .unwrap_or_else(|| YangType::Unknown(String::new()));
                    let text = declared.canonical_text(value).map_err(|detail| {
                        NetconfError::TypeMismatch {
                            path: path.to_string(),
                            detail,
                        }
                    })?;
                    match text {
                        None => writer.write_event(Event::Empty(start))?,
                        Some(text) => {
                            writer.write_event(Event::Start(start))?;
                            writer.write_event(Event::Text(BytesText::new(&text)))?;
                            writer.write_event(Event::End(BytesEnd::new(qname.name.as_str())))?;
                        }
                    }
                }
            },
            _ => {
                if content.children().is_empty() {
                    writer.write_event(Event::Empty(start))?;
                } else {
                    writer.write_event(Event::Start(start))?;
                    for child in content.children() {
                        self.write_node(writer, child, path, Some(&qname.module), &[])?;
                    }
                    writer.write_event(Event::End(BytesEnd::new(qname.name.as_str())))?;
                }
            }
        }
        Ok(())
    }

    fn check_list_keys(&self, path: &str, entry: &SchemaEntry, node: &SchemaNode) -> Result<()> {
        let keys: &[String] = if entry.keys.is_empty() {
            node.keys()
        } else {
            &entry.keys
        };
        if keys.is_empty() {
            return Ok(());
        }
        let mut seen: HashSet<Vec<String>> = HashSet::new();
        for item in node.children() {
            let tuple: Vec<String> = keys
                .iter()
                .map(|k| {
                    item.leaf_value(k)
                        .map(|v| v.to_string())
                        .unwrap_or_default()
                })
                .collect();
            if !seen.insert(tuple.clone()) {
                return Err(NetconfError::DuplicateListEntry {
                    list: path.to_string(),
                    key: tuple.join(" "),
                });
            }
        }
        Ok(())
    }

    /// Deserialize on-wire XML into a tree. Fails with
    /// [`NetconfError::MalformedEncoding`] on non-well-formed input and
    /// [`NetconfError::UnknownSchemaNode`] when a tag cannot be resolved
    /// against the loaded modules.
    pub fn decode(&self, xml: &str) -> Result<SchemaNode> {
        let mut roots = self.decode_fragment("", None, xml)?;
        match roots.len() {
            1 => Ok(roots.remove(0)),
            0 => Err(NetconfError::MalformedEncoding("empty document".to_string())),
            _ => Err(NetconfError::MalformedEncoding(
                "multiple root elements".to_string(),
            )),
        }
    }

    /// Deserialize a fragment whose elements sit below `parent_path` in
    /// the schema tree. Returns the top-level nodes in document order,
    /// with repeated list/leaf-list siblings grouped under wrapper
    /// nodes.
    pub(crate) fn decode_fragment(
        &self,
        parent_path: &str,
        parent_module: Option<&str>,
        xml: &str,
    ) -> Result<Vec<SchemaNode>> {
        let mut reader = NsReader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut roots: Vec<SchemaNode> = Vec::new();
        let mut stack: Vec<DecodeFrame> = Vec::new();

        loop {
            let (resolve, event) = reader
                .read_resolved_event()
                .map_err(|e| NetconfError::MalformedEncoding(e.to_string()))?;
            match event {
                Event::Start(start) => {
                    let frame =
                        self.open_frame(&resolve, &start, &stack, parent_path, parent_module)?;
                    stack.push(frame);
                }
                Event::Empty(start) => {
                    let frame =
                        self.open_frame(&resolve, &start, &stack, parent_path, parent_module)?;
                    let (node, kind, keys) = self.close_frame(frame)?;
                    match stack.last_mut() {
                        Some(parent) => attach(parent.node.children_mut(), node, kind, keys),
                        None => attach(&mut roots, node, kind, keys),
                    }
                }
                Event::Text(text) => {
                    if let Some(frame) = stack.last_mut() {
                        let text = text
                            .unescape()
                            .map_err(|e| NetconfError::MalformedEncoding(e.to_string()))?;
                        frame.text.push_str(&text);
                    }
                }
                Event::CData(data) => {
                    if let Some(frame) = stack.last_mut() {
                        let text = std::str::from_utf8(data.as_ref())
                            .map_err(|e| NetconfError::MalformedEncoding(e.to_string()))?;
                        frame.text.push_str(text);
                    }
                }
                Event::End(_) => {
                    let frame = stack.pop().ok_or_else(|| {
                        NetconfError::MalformedEncoding("unexpected end tag".to_string())
                    })?;
                    let (node, kind, keys) = self.close_frame(frame)?;
                    match stack.last_mut() {
                        Some(parent) => attach(parent.node.children_mut(), node, kind, keys),
                        None => attach(&mut roots, node, kind, keys),
                    }
                }
                Event::Eof => {
                    if !stack.is_empty() {
                        return Err(NetconfError::MalformedEncoding(
                            "unexpected end of document".to_string(),
                        ));
                    }
                    return Ok(roots);
                }
                // Declarations, comments and processing instructions
                // carry no data
                _ => {}
            }
        }
    }

    fn open_frame(
        &self,
        resolve: &ResolveResult<'_>,
        start: &BytesStart<'_>,
        stack: &[DecodeFrame],
        parent_path: &str,
        parent_module: Option<&str>,
    ) -> Result<DecodeFrame> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let (ctx_path, ctx_module) = match stack.last() {
            Some(frame) => (frame.path.as_str(), Some(frame.module.as_str())),
            None => (parent_path, parent_module),
        };

        let module = match resolve {
            ResolveResult::Bound(Namespace(ns)) => {
                let ns = std::str::from_utf8(ns)
                    .map_err(|e| NetconfError::MalformedEncoding(e.to_string()))?;
                self.registry
                    .module_for_namespace(ns)
                    .ok_or_else(|| {
                        NetconfError::UnknownSchemaNode(format!("namespace '{ns}' for <{name}>"))
                    })?
                    .to_string()
            }
            // No namespace in scope: inherit the parent's module
            _ => ctx_module
                .ok_or_else(|| NetconfError::UnknownSchemaNode(format!("<{name}>")))?
                .to_string(),
        };

        let path = child_path(ctx_path, ctx_module, &module, &name);
        let entry = self
            .registry
            .lookup(&path)
            .ok_or_else(|| NetconfError::UnknownSchemaNode(path.clone()))?;

        let node = match entry.kind {
            EntryKind::Leaf | EntryKind::LeafList => SchemaNode::selection(&module, &name),
            _ => SchemaNode::container(&module, &name),
        };
        Ok(DecodeFrame {
            node,
            path,
            module,
            kind: entry.kind,
            leaf_type: entry.leaf_type.clone(),
            keys: entry.keys.clone(),
            text: String::new(),
        })
    }

    fn close_frame(&self, frame: DecodeFrame) -> Result<(SchemaNode, EntryKind, Vec<String>)> {
        let DecodeFrame {
            mut node,
            path,
            kind,
            leaf_type,
            keys,
            text,
            ..
        } = frame;
        if matches!(kind, EntryKind::Leaf | EntryKind::LeafList) {
            let declared = leaf_type.unwrap_or_else(|| YangType::Unknown(String::new()));
            let value = declared
                .parse_text(&text)
                .map_err(|detail| NetconfError::MalformedEncoding(format!("{path}: {detail}")))?;
            node.set_value(value);
        } else if !text.is_empty() {
            return Err(NetconfError::MalformedEncoding(format!(
                "{path}: unexpected text content '{text}'"
            )));
        }
        Ok((node, kind, keys))
    }
}

struct DecodeFrame {
    node: SchemaNode,
    path: String,
    module: String,
    kind: EntryKind,
    leaf_type: Option<YangType>,
    keys: Vec<String>,
    text: String,
}

/// Attach a decoded node to its parent's child list, grouping repeated
/// list/leaf-list siblings under one wrapper node.
fn attach(dest: &mut Vec<SchemaNode>, node: SchemaNode, kind: EntryKind, keys: Vec<String>) {
    match kind {
        EntryKind::List => {
            if let Some(wrapper) = dest
                .iter_mut()
                .find(|c| c.kind() == NodeKind::List && c.qname() == node.qname())
            {
                wrapper.push_child(node);
                return;
            }
            let mut wrapper =
                SchemaNode::list(node.qname().module.clone(), node.qname().name.clone());
            wrapper.set_keys(keys);
            wrapper.push_child(node);
            dest.push(wrapper);
        }
        EntryKind::LeafList => {
            if let Some(wrapper) = dest
                .iter_mut()
                .find(|c| c.kind() == NodeKind::LeafList && c.qname() == node.qname())
            {
                wrapper.push_child(node);
                return;
            }
            let mut wrapper =
                SchemaNode::leaf_list(node.qname().module.clone(), node.qname().name.clone());
            wrapper.push_child(node);
            dest.push(wrapper);
        }
        _ => dest.push(node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LeafValue;

    const IFMGR_MODULE: &str = r#"{
        "module-name": "Cisco-IOS-XR-ifmgr-cfg",
        "namespace": "http://cisco.com/ns/yang/Cisco-IOS-XR-ifmgr-cfg",
        "revision": "2015-07-30",
        "item": [
            {"identifier": "/Cisco-IOS-XR-ifmgr-cfg:interface-configurations", "node": "container"},
            {"identifier": "/Cisco-IOS-XR-ifmgr-cfg:interface-configurations/interface-configuration", "node": "list", "keys": ["interface-name"]},
            {"identifier": "/Cisco-IOS-XR-ifmgr-cfg:interface-configurations/interface-configuration/interface-name", "node": "leaf", "type": "string"},
            {"identifier": "/Cisco-IOS-XR-ifmgr-cfg:interface-configurations/interface-configuration/description", "node": "leaf", "type": "string"},
            {"identifier": "/Cisco-IOS-XR-ifmgr-cfg:interface-configurations/interface-configuration/interface-virtual", "node": "leaf", "type": "empty"}
        ]
    }"#;

    const IPV4_IO_MODULE: &str = r#"{
        "module-name": "Cisco-IOS-XR-ipv4-io-cfg",
        "namespace": "http://cisco.com/ns/yang/Cisco-IOS-XR-ipv4-io-cfg",
        "item": [
            {"identifier": "/Cisco-IOS-XR-ifmgr-cfg:interface-configurations/interface-configuration/Cisco-IOS-XR-ipv4-io-cfg:ipv4-network", "node": "container"},
            {"identifier": "/Cisco-IOS-XR-ifmgr-cfg:interface-configurations/interface-configuration/Cisco-IOS-XR-ipv4-io-cfg:ipv4-network/addresses", "node": "container"},
            {"identifier": "/Cisco-IOS-XR-ifmgr-cfg:interface-configurations/interface-configuration/Cisco-IOS-XR-ipv4-io-cfg:ipv4-network/addresses/primary", "node": "container"},
            {"identifier": "/Cisco-IOS-XR-ifmgr-cfg:interface-configurations/interface-configuration/Cisco-IOS-XR-ipv4-io-cfg:ipv4-network/addresses/primary/address", "node": "leaf", "type": "string"},
            {"identifier": "/Cisco-IOS-XR-ifmgr-cfg:interface-configurations/interface-configuration/Cisco-IOS-XR-ipv4-io-cfg:ipv4-network/addresses/primary/netmask", "node": "leaf", "type": "string"}
        ]
    }"#;

    const TYPES_MODULE: &str = r#"{
        "module-name": "example-types",
        "namespace": "urn:example:types",
        "item": [
            {"identifier": "/example-types:settings", "node": "container"},
            {"identifier": "/example-types:settings/hostname", "node": "leaf", "type": "string"},
            {"identifier": "/example-types:settings/mtu", "node": "leaf", "type": "uint16"},
            {"identifier": "/example-types:settings/offset", "node": "leaf", "type": "int32"},
            {"identifier": "/example-types:settings/enabled", "node": "leaf", "type": "boolean"},
            {"identifier": "/example-types:settings/flagged", "node": "leaf", "type": "empty"},
            {"identifier": "/example-types:settings/secret", "node": "leaf", "type": "binary"},
            {"identifier": "/example-types:settings/mode", "node": "leaf", "type": {"enumeration": ["auto", "manual"]}},
            {"identifier": "/example-types:settings/tag", "node": "leaf-list", "type": "string"},
            {"identifier": "/example-types:settings/port", "node": "list", "keys": ["id"]},
            {"identifier": "/example-types:settings/port/id", "node": "leaf", "type": "uint16"},
            {"identifier": "/example-types:settings/port/speed", "node": "leaf", "type": "uint32"}
        ]
    }"#;

    fn codec(modules: &[&str]) -> XmlCodec {
        let mut registry = SchemaRegistry::new();
        for module in modules {
            registry.load_str(module).unwrap();
        }
        XmlCodec::new(Arc::new(registry))
    }

    fn loopback_config() -> SchemaNode {
        let mut root = SchemaNode::container("Cisco-IOS-XR-ifmgr-cfg", "interface-configurations");
        let mut list =
            SchemaNode::list("Cisco-IOS-XR-ifmgr-cfg", "interface-configuration");
        let mut entry =
            SchemaNode::container("Cisco-IOS-XR-ifmgr-cfg", "interface-configuration");
        entry.push_child(SchemaNode::leaf(
            "Cisco-IOS-XR-ifmgr-cfg",
            "interface-name",
            "Loopback0",
        ));
        entry.push_child(SchemaNode::leaf(
            "Cisco-IOS-XR-ifmgr-cfg",
            "description",
            "PRIMARY ROUTER LOOPBACK",
        ));
        list.push_child(entry);
        root.push_child(list);
        root
    }

    #[test]
    fn test_encode_loopback_config() {
        let codec = codec(&[IFMGR_MODULE]);
        let xml = codec.encode(&loopback_config()).unwrap();
        assert_eq!(
            xml,
            "<interface-configurations xmlns=\"http://cisco.com/ns/yang/Cisco-IOS-XR-ifmgr-cfg\">\
             <interface-configuration>\
             <interface-name>Loopback0</interface-name>\
             <description>PRIMARY ROUTER LOOPBACK</description>\
             </interface-configuration>\
             </interface-configurations>"
        );
    }

    #[test]
    fn test_namespace_declared_once_per_module_transition() {
        let codec = codec(&[IFMGR_MODULE, IPV4_IO_MODULE]);

        let mut primary = SchemaNode::container("Cisco-IOS-XR-ipv4-io-cfg", "primary");
        primary.push_child(SchemaNode::leaf("Cisco-IOS-XR-ipv4-io-cfg", "address", "172.16.255.1"));
        primary.push_child(SchemaNode::leaf(
            "Cisco-IOS-XR-ipv4-io-cfg",
            "netmask",
            "255.255.255.255",
        ));
        let mut addresses = SchemaNode::container("Cisco-IOS-XR-ipv4-io-cfg", "addresses");
        addresses.push_child(primary);
        let mut ipv4 = SchemaNode::container("Cisco-IOS-XR-ipv4-io-cfg", "ipv4-network");
        ipv4.push_child(addresses);

        let mut root = loopback_config();
        root.child_mut("interface-configuration")
            .unwrap()
            .children_mut()[0]
            .push_child(ipv4);

        let xml = codec.encode(&root).unwrap();
        assert_eq!(
            xml.matches("xmlns=\"http://cisco.com/ns/yang/Cisco-IOS-XR-ifmgr-cfg\"")
                .count(),
            1
        );
        // One declaration at the ipv4-network transition, none repeated
        // on its descendants
        assert_eq!(
            xml.matches("xmlns=\"http://cisco.com/ns/yang/Cisco-IOS-XR-ipv4-io-cfg\"")
                .count(),
            1
        );
        assert!(xml.contains("<addresses><primary>"));
    }

    #[test]
    fn test_roundtrip_structural_equality() {
        let codec = codec(&[TYPES_MODULE]);

        let mut settings = SchemaNode::container("example-types", "settings");
        settings.push_child(SchemaNode::leaf("example-types", "hostname", "router1"));
        settings.push_child(SchemaNode::leaf("example-types", "mtu", 1500u64));
        settings.push_child(SchemaNode::leaf("example-types", "offset", -42i64));
        settings.push_child(SchemaNode::leaf("example-types", "enabled", true));
        settings.push_child(SchemaNode::leaf("example-types", "flagged", LeafValue::Empty));
        settings.push_child(SchemaNode::leaf(
            "example-types",
            "secret",
            LeafValue::Binary(vec![0xde, 0xad, 0xbe, 0xef]),
        ));
        settings.push_child(SchemaNode::leaf(
            "example-types",
            "mode",
            LeafValue::Enum("auto".to_string()),
        ));
        let mut tags = SchemaNode::leaf_list("example-types", "tag");
        tags.push_value("core");
        tags.push_value("edge");
        settings.push_child(tags);
        let mut ports = SchemaNode::list("example-types", "port").with_keys(&["id"]);
        for (id, speed) in [(1u64, 1000u64), (2, 10000)] {
            let mut entry = SchemaNode::container("example-types", "port");
            entry.push_child(SchemaNode::leaf("example-types", "id", id));
            entry.push_child(SchemaNode::leaf("example-types", "speed", speed));
            ports.push_child(entry);
        }
        settings.push_child(ports);

        let xml = codec.encode(&settings).unwrap();
        let decoded = codec.decode(&xml).unwrap();
        assert_eq!(decoded, settings);

        // Encoding the decoded tree reproduces the exact document
        assert_eq!(codec.encode(&decoded).unwrap(), xml);
    }

    #[test]
    fn test_decode_ignores_incidental_whitespace() {
        let codec = codec(&[TYPES_MODULE]);
        let xml = "<settings xmlns=\"urn:example:types\">\n  <hostname>router1</hostname>\n  <mtu>1500</mtu>\n</settings>";
        let decoded = codec.decode(xml).unwrap();
        assert_eq!(
            decoded.leaf_value("hostname"),
            Some(&LeafValue::String("router1".to_string()))
        );
        assert_eq!(decoded.leaf_value("mtu"), Some(&LeafValue::Uint(1500)));
    }

    #[test]
    fn test_empty_leaf_self_closing() {
        let codec = codec(&[TYPES_MODULE]);
        let mut settings = SchemaNode::container("example-types", "settings");
        settings.push_child(SchemaNode::leaf("example-types", "flagged", LeafValue::Empty));
        let xml = codec.encode(&settings).unwrap();
        assert_eq!(xml, "<settings xmlns=\"urn:example:types\"><flagged/></settings>");
        assert_eq!(codec.decode(&xml).unwrap(), settings);
    }

    #[test]
    fn test_duplicate_list_keys_rejected_at_encode() {
        let codec = codec(&[TYPES_MODULE]);
        let mut settings = SchemaNode::container("example-types", "settings");
        let mut ports = SchemaNode::list("example-types", "port");
        for _ in 0..2 {
            let mut entry = SchemaNode::container("example-types", "port");
            entry.push_child(SchemaNode::leaf("example-types", "id", 7u64));
            ports.push_child(entry);
        }
        settings.push_child(ports);
        assert!(matches!(
            codec.encode(&settings),
            Err(NetconfError::DuplicateListEntry { .. })
        ));
    }

    #[test]
    fn test_type_mismatch_reported_at_encode() {
        let codec = codec(&[TYPES_MODULE]);
        let mut settings = SchemaNode::container("example-types", "settings");
        settings.push_child(SchemaNode::leaf("example-types", "mtu", "not-a-number"));
        let err = codec.encode(&settings).unwrap_err();
        assert!(matches!(err, NetconfError::TypeMismatch { .. }));
    }

    #[test]
    fn test_decode_malformed_input() {
        let codec = codec(&[TYPES_MODULE]);
        let err = codec
            .decode("<settings xmlns=\"urn:example:types\"><hostname>x</settings>")
            .unwrap_err();
        assert!(matches!(err, NetconfError::MalformedEncoding(_)));
    }

    #[test]
    fn test_decode_unknown_tag() {
        let codec = codec(&[TYPES_MODULE]);
        let err = codec
            .decode("<settings xmlns=\"urn:example:types\"><bogus>1</bogus></settings>")
            .unwrap_err();
        assert!(matches!(err, NetconfError::UnknownSchemaNode(_)));

        let err = codec
            .decode("<settings xmlns=\"urn:other\"><hostname>x</hostname></settings>")
            .unwrap_err();
        assert!(matches!(err, NetconfError::UnknownSchemaNode(_)));
    }

    #[test]
    fn test_selection_leaf_encodes_empty_element() {
        let codec = codec(&[IFMGR_MODULE]);
        let mut entry =
            SchemaNode::container("Cisco-IOS-XR-ifmgr-cfg", "interface-configuration");
        entry.push_child(SchemaNode::leaf(
            "Cisco-IOS-XR-ifmgr-cfg",
            "interface-name",
            "Loopback0",
        ));
        entry.push_child(SchemaNode::selection("Cisco-IOS-XR-ifmgr-cfg", "description"));
        let mut root = SchemaNode::container("Cisco-IOS-XR-ifmgr-cfg", "interface-configurations");
        root.push_child(entry);

        let xml = codec.encode(&root).unwrap();
        assert!(xml.contains("<interface-name>Loopback0</interface-name><description/>"));
    }
}
