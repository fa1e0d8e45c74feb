//! Transport session
//!
//! One [`Session`] owns one authenticated connection: hello/capability
//! exchange on open, a monotonically increasing message-id counter, and
//! a strictly synchronous request/reply discipline. Exactly one request
//! may be in flight at a time; a second concurrent `send` fails with
//! [`NetconfError::SessionBusy`] instead of interleaving.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, TryLockError};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{NetconfError, Result};
use crate::rpc::{self, RpcEnvelope};
use crate::transport::{SshTransport, Transport};

/// Base protocol version negotiated during capability exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseVersion {
    V1_0,
    V1_1,
}

/// Session lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Connecting,
    CapabilityExchange,
    Ready,
}

/// Connection parameters for a session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub address: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Reply timeout applied to every request
    pub timeout: Duration,
    /// Extra capability URIs advertised in the client hello
    pub capabilities: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            port: 830,
            username: String::new(),
            password: String::new(),
            timeout: Duration::from_secs(60),
            capabilities: Vec::new(),
        }
    }
}

struct Io {
    state: SessionState,
    transport: Box<dyn Transport>,
}

/// One authenticated NETCONF session
pub struct Session {
    io: Mutex<Io>,
    message_id: AtomicU64,
    base: BaseVersion,
    session_id: Option<u32>,
    capabilities: Vec<String>,
}

impl Session {
    /// Connect to a device over SSH and perform the hello exchange
    pub fn connect(config: &SessionConfig) -> Result<Self> {
        debug!(address = %config.address, port = config.port, "connecting");
        let transport = SshTransport::connect(
            &config.address,
            config.port,
            &config.username,
            &config.password,
            config.timeout,
        )?;
        Self::open(Box::new(transport), config)
    }

    /// Perform the hello exchange over an already-established transport.
    /// A session that fails capability exchange never reaches Ready; the
    /// transport is dropped and the error returned.
    pub fn open(mut transport: Box<dyn Transport>, config: &SessionConfig) -> Result<Self> {
        transport.set_timeout(config.timeout);
        transport.send(&rpc::client_hello(&config.capabilities))?;
        let server_hello = transport.recv()?;
        let (session_id, capabilities) = rpc::parse_hello(&server_hello)?;
        let base = negotiate(&capabilities)?;
        if base == BaseVersion::V1_1 {
            transport.upgrade();
        }
        info!(?session_id, ?base, "netconf session established");
        Ok(Session {
            io: Mutex::new(Io {
                state: SessionState::Ready,
                transport,
            }),
            message_id: AtomicU64::new(1),
            base,
            session_id,
            capabilities,
        })
    }

    /// Draw the next message-id and wrap a request body
    pub fn envelope(&self, body: impl Into<String>) -> RpcEnvelope {
        RpcEnvelope::new(self.message_id.fetch_add(1, Ordering::Relaxed), body)
    }

    /// Send a request and block until the correlated reply arrives.
    /// Frames whose message-id does not match are discarded. A timeout
    /// forces the session to Closed.
    pub fn send(&self, request: &RpcEnvelope) -> Result<RpcEnvelope> {
        let mut io = match self.io.try_lock() {
            Ok(io) => io,
            Err(TryLockError::Poisoned(e)) => e.into_inner(),
            Err(TryLockError::WouldBlock) => return Err(NetconfError::SessionBusy),
        };
        if io.state != SessionState::Ready {
            return Err(NetconfError::SessionClosed);
        }
        debug!(message_id = request.message_id, "sending rpc");
        match exchange(&mut io, request) {
            Ok(reply) => Ok(reply),
            Err(NetconfError::Timeout { .. }) => {
                // Correlation cannot be trusted after a timeout without
                // a resynchronization protocol
                warn!(message_id = request.message_id, "reply timed out, closing session");
                io.transport.close().ok();
                io.state = SessionState::Closed;
                Err(NetconfError::Timeout {
                    message_id: request.message_id,
                })
            }
            Err(NetconfError::SessionClosed) => {
                io.state = SessionState::Closed;
                Err(NetconfError::SessionClosed)
            }
            Err(e) => Err(e),
        }
    }

    /// Send `<close-session/>` best-effort and close the transport.
    /// Blocks until any in-flight request completes; idempotent.
    pub fn close(&self) -> Result<()> {
        let mut io = self
            .io
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if io.state != SessionState::Ready {
            return Ok(());
        }
        let request = RpcEnvelope::new(
            self.message_id.fetch_add(1, Ordering::Relaxed),
            "<close-session/>",
        );
        if io.transport.send(&request.to_xml()).is_ok() {
            let _ = io.transport.recv();
        }
        io.transport.close().ok();
        io.state = SessionState::Closed;
        debug!("session closed");
        Ok(())
    }

    /// Current lifecycle state. A session with a request in flight is
    /// Ready.
    pub fn state(&self) -> SessionState {
        match self.io.try_lock() {
            Ok(io) => io.state,
            Err(TryLockError::Poisoned(e)) => e.into_inner().state,
            Err(TryLockError::WouldBlock) => SessionState::Ready,
        }
    }

    /// Base protocol version negotiated with the server
    pub fn base_version(&self) -> BaseVersion {
        self.base
    }

    /// Session-id reported by the server hello
    pub fn session_id(&self) -> Option<u32> {
        self.session_id
    }

    /// Capability URIs advertised by the server
    pub fn capabilities(&self) -> &[String] {
        &self.capabilities
    }

    /// Whether the server advertised the given capability URI
    pub fn has_capability(&self, uri: &str) -> bool {
        self.capabilities.iter().any(|c| c == uri)
    }
}

fn negotiate(server_capabilities: &[String]) -> Result<BaseVersion> {
    let has = |uri: &str| server_capabilities.iter().any(|c| c == uri);
    if has(rpc::BASE_1_1) {
        Ok(BaseVersion::V1_1)
    } else if has(rpc::BASE_1_0) {
        Ok(BaseVersion::V1_0)
    } else {
        Err(NetconfError::CapabilityMismatch {
            server: server_capabilities.to_vec(),
        })
    }
}

fn exchange(io: &mut Io, request: &RpcEnvelope) -> Result<RpcEnvelope> {
    io.transport.send(&request.to_xml())?;
    loop {
        let raw = io.transport.recv()?;
        match rpc::peek_message_id(&raw) {
            Some(id) if id == request.message_id => {
                debug!(message_id = id, "reply received");
                return Ok(RpcEnvelope::new(id, raw));
            }
            other => {
                warn!(
                    expected = request.message_id,
                    received = ?other,
                    "discarding uncorrelated frame"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::sync::mpsc;

    const SERVER_HELLO_1_1: &str = "<hello xmlns=\"urn:ietf:params:xml:ns:netconf:base:1.0\">\
        <capabilities>\
        <capability>urn:ietf:params:netconf:base:1.1</capability>\
        <capability>urn:ietf:params:netconf:capability:candidate:1.0</capability>\
        </capabilities>\
        <session-id>4</session-id></hello>";

    const SERVER_HELLO_1_0: &str = "<hello xmlns=\"urn:ietf:params:xml:ns:netconf:base:1.0\">\
        <capabilities>\
        <capability>urn:ietf:params:netconf:base:1.0</capability>\
        </capabilities>\
        <session-id>9</session-id></hello>";

    fn ok_reply(message_id: u64) -> String {
        format!(
            "<rpc-reply message-id=\"{message_id}\" \
             xmlns=\"urn:ietf:params:xml:ns:netconf:base:1.0\"><ok/></rpc-reply>"
        )
    }

    struct ScriptedTransport {
        replies: VecDeque<Result<String>>,
        sent: Arc<Mutex<Vec<String>>>,
        upgraded: Arc<Mutex<bool>>,
    }

    impl ScriptedTransport {
        fn new(replies: Vec<Result<String>>) -> (Self, Arc<Mutex<Vec<String>>>, Arc<Mutex<bool>>) {
            let sent = Arc::new(Mutex::new(Vec::new()));
            let upgraded = Arc::new(Mutex::new(false));
            (
                Self {
                    replies: replies.into_iter().collect(),
                    sent: sent.clone(),
                    upgraded: upgraded.clone(),
                },
                sent,
                upgraded,
            )
        }
    }

    impl Transport for ScriptedTransport {
        fn send(&mut self, payload: &str) -> Result<()> {
            self.sent.lock().unwrap().push(payload.to_string());
            Ok(())
        }

        fn recv(&mut self) -> Result<String> {
            self.replies
                .pop_front()
                .unwrap_or(Err(NetconfError::SessionClosed))
        }

        fn upgrade(&mut self) {
            *self.upgraded.lock().unwrap() = true;
        }

        fn set_timeout(&mut self, _timeout: Duration) {}

        fn close(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_open_negotiates_1_1_and_upgrades_framing() {
        let (transport, sent, upgraded) =
            ScriptedTransport::new(vec![Ok(SERVER_HELLO_1_1.to_string())]);
        let session = Session::open(Box::new(transport), &SessionConfig::default()).unwrap();

        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.base_version(), BaseVersion::V1_1);
        assert_eq!(session.session_id(), Some(4));
        assert!(session.has_capability(rpc::CANDIDATE));
        assert!(*upgraded.lock().unwrap());
        assert!(sent.lock().unwrap()[0].contains("<hello"));
    }

    #[test]
    fn test_open_falls_back_to_1_0() {
        let (transport, _, upgraded) =
            ScriptedTransport::new(vec![Ok(SERVER_HELLO_1_0.to_string())]);
        let session = Session::open(Box::new(transport), &SessionConfig::default()).unwrap();
        assert_eq!(session.base_version(), BaseVersion::V1_0);
        assert!(!*upgraded.lock().unwrap());
    }

    #[test]
    fn test_capability_mismatch_never_reaches_ready() {
        let hello = "<hello xmlns=\"urn:ietf:params:xml:ns:netconf:base:1.0\">\
            <capabilities><capability>urn:vendor:something</capability></capabilities></hello>";
        let (transport, _, _) = ScriptedTransport::new(vec![Ok(hello.to_string())]);
        let result = Session::open(Box::new(transport), &SessionConfig::default());
        assert!(matches!(
            result,
            Err(NetconfError::CapabilityMismatch { .. })
        ));
    }

    #[test]
    fn test_send_correlates_on_message_id() {
        let (transport, sent, _) = ScriptedTransport::new(vec![
            Ok(SERVER_HELLO_1_1.to_string()),
            // Stray frame with a foreign message-id is skipped
            Ok(ok_reply(99)),
            Ok(ok_reply(1)),
        ]);
        let session = Session::open(Box::new(transport), &SessionConfig::default()).unwrap();

        let request = session.envelope("<get/>");
        assert_eq!(request.message_id, 1);
        let reply = session.send(&request).unwrap();
        assert_eq!(reply.message_id, 1);
        assert!(sent.lock().unwrap()[1].contains("message-id=\"1\""));
    }

    #[test]
    fn test_timeout_forces_closed() {
        let (transport, _, _) = ScriptedTransport::new(vec![
            Ok(SERVER_HELLO_1_1.to_string()),
            Err(NetconfError::Timeout { message_id: 0 }),
        ]);
        let session = Session::open(Box::new(transport), &SessionConfig::default()).unwrap();

        let request = session.envelope("<get/>");
        let err = session.send(&request).unwrap_err();
        assert!(matches!(err, NetconfError::Timeout { message_id: 1 }));
        assert_eq!(session.state(), SessionState::Closed);

        let request = session.envelope("<get/>");
        assert!(matches!(
            session.send(&request),
            Err(NetconfError::SessionClosed)
        ));
    }

    #[test]
    fn test_close_is_idempotent() {
        let (transport, sent, _) = ScriptedTransport::new(vec![
            Ok(SERVER_HELLO_1_1.to_string()),
            Ok(ok_reply(1)),
        ]);
        let session = Session::open(Box::new(transport), &SessionConfig::default()).unwrap();
        session.close().unwrap();
        assert_eq!(session.state(), SessionState::Closed);
        session.close().unwrap();
        assert!(sent.lock().unwrap()[1].contains("<close-session/>"));
    }

    /// Transport whose second recv blocks until the test releases it,
    /// to hold a request in flight
    struct BlockingTransport {
        hello: Option<String>,
        entered: mpsc::Sender<()>,
        release: mpsc::Receiver<String>,
    }

    impl Transport for BlockingTransport {
        fn send(&mut self, _payload: &str) -> Result<()> {
            Ok(())
        }

        fn recv(&mut self) -> Result<String> {
            if let Some(hello) = self.hello.take() {
                return Ok(hello);
            }
            self.entered.send(()).unwrap();
            self.release
                .recv()
                .map_err(|_| NetconfError::SessionClosed)
        }

        fn upgrade(&mut self) {}

        fn set_timeout(&mut self, _timeout: Duration) {}

        fn close(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_concurrent_send_observes_session_busy() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let transport = BlockingTransport {
            hello: Some(SERVER_HELLO_1_1.to_string()),
            entered: entered_tx,
            release: release_rx,
        };
        let session =
            Arc::new(Session::open(Box::new(transport), &SessionConfig::default()).unwrap());

        let worker = {
            let session = session.clone();
            std::thread::spawn(move || {
                let request = session.envelope("<get/>");
                session.send(&request)
            })
        };

        // Wait until the first send is blocked waiting for its reply
        entered_rx.recv().unwrap();
        let second = session.envelope("<get/>");
        assert!(matches!(
            session.send(&second),
            Err(NetconfError::SessionBusy)
        ));

        // Release the first caller; it completes normally
        release_tx.send(ok_reply(1)).unwrap();
        let reply = worker.join().unwrap().unwrap();
        assert_eq!(reply.message_id, 1);
        assert_eq!(session.state(), SessionState::Ready);
    }
}
