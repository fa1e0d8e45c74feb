//! rust-netconf - NETCONF client with a generic YANG data tree
//!
//! This library provides a typed in-memory tree for YANG-modeled
//! configuration data, an XML codec driven by externally supplied
//! module definition files, a blocking NETCONF-over-SSH transport
//! session (RFC 6241/6242), and CRUD/executor services expressed in
//! terms of schema-node trees.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use rust_netconf::{CrudService, SchemaNode, SchemaRegistry, Session, SessionConfig, XmlCodec};
//!
//! # fn main() -> rust_netconf::Result<()> {
//! // Load module definitions
//! let mut registry = SchemaRegistry::new();
//! registry.load_file("models/Cisco-IOS-XR-ifmgr-cfg.json")?;
//! let codec = XmlCodec::new(Arc::new(registry));
//!
//! // Open a session
//! let session = Session::connect(&SessionConfig {
//!     address: "10.0.0.1".to_string(),
//!     username: "admin".to_string(),
//!     password: "admin".to_string(),
//!     ..Default::default()
//! })?;
//!
//! // Build a subtree and create it on the device
//! let config = SchemaNode::container("Cisco-IOS-XR-ifmgr-cfg", "interface-configurations");
//! let crud = CrudService::new(codec);
//! crud.create(&session, &config)?;
//!
//! session.close()?;
//! # Ok(())
//! # }
//! ```

pub mod codec;
mod error;
pub mod frame;
pub mod node;
pub mod rpc;
pub mod schema;
pub mod service;
pub mod session;
pub mod transport;
mod types;

pub use codec::XmlCodec;
pub use error::{NetconfError, Result};
pub use node::{NodeKind, QualifiedName, SchemaNode};
pub use rpc::{RpcEnvelope, RpcErrorInfo, RpcReply};
pub use schema::SchemaRegistry;
pub use service::{CrudService, ExecutorService};
pub use session::{Session, SessionConfig, SessionState};
pub use transport::{SshTransport, Transport};
pub use types::{LeafValue, YangType};
