//! NETCONF message framing per [RFC 6242](https://datatracker.ietf.org/doc/html/rfc6242)
//!
//! Hello messages always use end-of-message framing; after both peers
//! advertise base:1.1 the transport upgrades to chunked framing.

use crate::error::{NetconfError, Result};

/// End-of-message terminator used by NETCONF 1.0 and hello exchange
pub const EOM_TERMINATOR: &str = "]]>]]>";

const CHUNK_START: &str = "\n#";
const MESSAGE_TERMINATOR: &str = "\n##\n";

/// Maximum chunk size as per RFC 6242
const MAX_CHUNK_SIZE: usize = 4294967295;

/// Maximum length of the chunk size field in characters
const MAX_CHUNK_SIZE_LEN: usize = 10;

/// Active framing mode of a transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Framing {
    /// Message followed by `]]>]]>`
    #[default]
    EndOfMessage,
    /// `\n#<size>\n<data>` chunks terminated by `\n##\n`
    Chunked,
}

/// Frame a complete message for the wire. Chunked messages are written
/// as a single chunk.
pub fn encode_message(framing: Framing, payload: &str) -> String {
    match framing {
        Framing::EndOfMessage => format!("{payload}{EOM_TERMINATOR}"),
        Framing::Chunked => {
            format!("{CHUNK_START}{}\n{payload}{MESSAGE_TERMINATOR}", payload.len())
        }
    }
}

/// Incremental receive buffer. Bytes are pushed as they arrive from the
/// channel; complete messages are extracted once their terminator is
/// present.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    framing: Framing,
    buf: Vec<u8>,
    /// Reassembled chunk data of the message in progress
    message: Vec<u8>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn framing(&self) -> Framing {
        self.framing
    }

    pub fn set_framing(&mut self, framing: Framing) {
        self.framing = framing;
    }

    /// Append bytes received from the channel
    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Extract the next complete message, if one is buffered
    pub fn try_next(&mut self) -> Result<Option<String>> {
        match self.framing {
            Framing::EndOfMessage => self.try_end_of_message(),
            Framing::Chunked => self.try_chunked(),
        }
    }

    fn try_end_of_message(&mut self) -> Result<Option<String>> {
        let terminator = EOM_TERMINATOR.as_bytes();
        let Some(pos) = self
            .buf
            .windows(terminator.len())
            .position(|w| w == terminator)
        else {
            return Ok(None);
        };
        let message = self.buf[..pos].to_vec();
        self.buf.drain(..pos + terminator.len());
        let message = String::from_utf8(message)
            .map_err(|e| NetconfError::MalformedEncoding(e.to_string()))?;
        Ok(Some(message))
    }

    fn try_chunked(&mut self) -> Result<Option<String>> {
        loop {
            // Shortest meaningful prefixes are "\n#N\n" and "\n##\n"
            if self.buf.len() < MESSAGE_TERMINATOR.len() {
                return Ok(None);
            }
            if !self.buf.starts_with(CHUNK_START.as_bytes()) {
                return Err(NetconfError::MalformedEncoding(
                    "expected chunk start sequence".to_string(),
                ));
            }

            if self.buf[2] == b'#' {
                if self.buf[3] != b'\n' {
                    return Err(NetconfError::MalformedEncoding(
                        "invalid message terminator".to_string(),
                    ));
                }
                self.buf.drain(..MESSAGE_TERMINATOR.len());
                let message = std::mem::take(&mut self.message);
                let message = String::from_utf8(message)
                    .map_err(|e| NetconfError::MalformedEncoding(e.to_string()))?;
                return Ok(Some(message));
            }

            // Parse the chunk size field
            let size_start = CHUNK_START.len();
            let search_end = (size_start + MAX_CHUNK_SIZE_LEN + 1).min(self.buf.len());
            let Some(pos) = self.buf[size_start..search_end].iter().position(|&b| b == b'\n')
            else {
                if search_end - size_start > MAX_CHUNK_SIZE_LEN {
                    return Err(NetconfError::MalformedEncoding(
                        "chunk size field not terminated".to_string(),
                    ));
                }
                return Ok(None);
            };
            let size_end = size_start + pos;
            let size_str = std::str::from_utf8(&self.buf[size_start..size_end])
                .map_err(|e| NetconfError::MalformedEncoding(e.to_string()))?;
            let chunk_size: usize = size_str.parse().map_err(|_| {
                NetconfError::MalformedEncoding(format!("invalid chunk size '{size_str}'"))
            })?;
            if chunk_size == 0 || chunk_size > MAX_CHUNK_SIZE {
                return Err(NetconfError::MalformedEncoding(format!(
                    "chunk size {chunk_size} out of range"
                )));
            }

            let data_start = size_end + 1;
            if self.buf.len() < data_start + chunk_size {
                return Ok(None);
            }
            self.message
                .extend_from_slice(&self.buf[data_start..data_start + chunk_size]);
            self.buf.drain(..data_start + chunk_size);
        }
    }
}
