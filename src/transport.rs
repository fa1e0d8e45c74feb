//! Blocking transport layer
//!
//! The [`Transport`] trait carries framed NETCONF messages over an
//! established channel. The real implementation speaks the
//! NETCONF-over-SSH subsystem; tests plug in scripted transports, the
//! session logic does not care.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use tracing::{debug, trace};

use crate::error::{NetconfError, Result};
use crate::frame::{FrameBuffer, Framing, encode_message};

/// Blocking byte transport carrying framed NETCONF messages
pub trait Transport: Send {
    /// Send one framed message
    fn send(&mut self, payload: &str) -> Result<()>;

    /// Receive the next framed message, blocking up to the configured
    /// timeout. Transports report timeouts as
    /// [`NetconfError::Timeout`] with a zero message-id; the session
    /// stamps the real one.
    fn recv(&mut self) -> Result<String>;

    /// Switch to chunked framing after base:1.1 negotiation
    fn upgrade(&mut self);

    /// Set the receive timeout for subsequent calls
    fn set_timeout(&mut self, timeout: Duration);

    /// Close the underlying channel
    fn close(&mut self) -> Result<()>;
}

/// NETCONF-over-SSH transport using password authentication
pub struct SshTransport {
    session: ssh2::Session,
    channel: ssh2::Channel,
    frames: FrameBuffer,
}

impl SshTransport {
    /// Establish the SSH channel and start the `netconf` subsystem
    pub fn connect(
        address: &str,
        port: u16,
        username: &str,
        password: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let tcp = TcpStream::connect((address, port))
            .map_err(|e| NetconfError::ConnectionRefused(format!("{address}:{port}: {e}")))?;
        let mut session =
            ssh2::Session::new().map_err(|e| NetconfError::Transport(e.to_string()))?;
        session.set_tcp_stream(tcp);
        session
            .handshake()
            .map_err(|e| NetconfError::Transport(format!("ssh handshake: {e}")))?;
        session
            .userauth_password(username, password)
            .map_err(|_| NetconfError::AuthenticationFailed(username.to_string()))?;
        if !session.authenticated() {
            return Err(NetconfError::AuthenticationFailed(username.to_string()));
        }
        let mut channel = session
            .channel_session()
            .map_err(|e| NetconfError::Transport(e.to_string()))?;
        channel
            .subsystem("netconf")
            .map_err(|e| NetconfError::Transport(format!("netconf subsystem: {e}")))?;
        session.set_timeout(timeout.as_millis() as u32);
        debug!(address = %address, port, "netconf subsystem channel established");
        Ok(Self {
            session,
            channel,
            frames: FrameBuffer::new(),
        })
    }
}

impl Transport for SshTransport {
    fn send(&mut self, payload: &str) -> Result<()> {
        let framed = encode_message(self.frames.framing(), payload);
        self.channel.write_all(framed.as_bytes()).map_err(map_io)?;
        self.channel.flush().map_err(map_io)?;
        trace!(bytes = framed.len(), "frame sent");
        Ok(())
    }

    fn recv(&mut self) -> Result<String> {
        loop {
            if let Some(message) = self.frames.try_next()? {
                trace!(bytes = message.len(), "frame received");
                return Ok(message);
            }
            let mut chunk = [0u8; 4096];
            let n = self.channel.read(&mut chunk).map_err(map_io)?;
            if n == 0 {
                return Err(NetconfError::SessionClosed);
            }
            self.frames.push(&chunk[..n]);
        }
    }

    fn upgrade(&mut self) {
        self.frames.set_framing(Framing::Chunked);
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.session.set_timeout(timeout.as_millis() as u32);
    }

    fn close(&mut self) -> Result<()> {
        self.channel
            .close()
            .map_err(|e| NetconfError::Transport(e.to_string()))?;
        // Discard the close failure if the peer already went away
        let _ = self.channel.wait_close();
        Ok(())
    }
}

fn map_io(e: std::io::Error) -> NetconfError {
    match e.kind() {
        std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => {
            NetconfError::Timeout { message_id: 0 }
        }
        _ => NetconfError::Transport(e.to_string()),
    }
}
