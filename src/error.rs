//! Error types for rust-netconf

use thiserror::Error;

use crate::rpc::RpcErrorInfo;

/// Main error type for NETCONF client operations
#[derive(Debug, Error)]
pub enum NetconfError {
    /// TCP connection to the device could not be established
    #[error("connection refused: {0}")]
    ConnectionRefused(String),

    /// SSH authentication was rejected by the device
    #[error("authentication failed for user '{0}'")]
    AuthenticationFailed(String),

    /// No common base protocol version between client and server hello
    #[error("no common base protocol version (server capabilities: {server:?})")]
    CapabilityMismatch { server: Vec<String> },

    /// The correlated reply did not arrive within the caller timeout.
    /// The session moves to Closed afterwards since message-id
    /// correlation cannot be trusted without resynchronization.
    #[error("timed out waiting for reply to message-id {message_id}")]
    Timeout { message_id: u64 },

    /// Operation attempted on a session in the Closed state
    #[error("session is closed")]
    SessionClosed,

    /// A second request was issued while one was already in flight
    #[error("another request is already in flight on this session")]
    SessionBusy,

    /// SSH-layer failure that is neither a refusal nor an auth error
    #[error("transport error: {0}")]
    Transport(String),

    /// Leaf value cannot be coerced to the declared YANG type
    #[error("type mismatch at {path}: {detail}")]
    TypeMismatch { path: String, detail: String },

    /// Two entries of the same list carry the same key tuple
    #[error("duplicate key [{key}] in list {list}")]
    DuplicateListEntry { list: String, key: String },

    /// Input is not well-formed XML or carries a non-canonical value
    #[error("malformed encoding: {0}")]
    MalformedEncoding(String),

    /// A tag could not be resolved against the loaded schema modules
    #[error("unknown schema node: {0}")]
    UnknownSchemaNode(String),

    /// The server declined an edit-config or commit request
    #[error("configuration rejected by server: {0}")]
    ConfigRejected(RpcErrorInfo),

    /// A required subtree was absent from the read result
    #[error("required subtree not found: {0}")]
    NotFound(String),

    /// The server reported an error for a custom RPC invocation
    #[error("rpc failed: {0}")]
    RpcError(RpcErrorInfo),

    /// Invalid module definition file
    #[error("invalid module file: {0}")]
    InvalidModuleFile(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error (module definition files)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for NETCONF client operations
pub type Result<T> = std::result::Result<T, NetconfError>;
