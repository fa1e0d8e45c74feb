//! RPC envelopes, hello messages and reply parsing
//!
//! The structures here mirror the `<rpc>`/`<rpc-reply>`/`<hello>`
//! element layout of the base protocol; payload content stays opaque
//! text for the codec to interpret.

use std::fmt;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::{NetconfError, Result};

/// XML namespace of the NETCONF base protocol
pub const NETCONF_NS: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

/// Capability URN for NETCONF 1.0 (end-of-message framing)
pub const BASE_1_0: &str = "urn:ietf:params:netconf:base:1.0";

/// Capability URN for NETCONF 1.1 (chunked framing)
pub const BASE_1_1: &str = "urn:ietf:params:netconf:base:1.1";

/// Capability URN for the candidate configuration datastore
pub const CANDIDATE: &str = "urn:ietf:params:netconf:capability:candidate:1.0";

const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>";

/// One request or reply in a message-id-correlated round trip. For
/// requests the body is the operation element; for replies it is the
/// raw `<rpc-reply>` document.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcEnvelope {
    pub message_id: u64,
    pub body: String,
}

impl RpcEnvelope {
    pub fn new(message_id: u64, body: impl Into<String>) -> Self {
        Self {
            message_id,
            body: body.into(),
        }
    }

    /// Render the full `<rpc>` document for the wire
    pub fn to_xml(&self) -> String {
        format!(
            "{XML_HEADER}<rpc message-id=\"{}\" xmlns=\"{NETCONF_NS}\">{}</rpc>",
            self.message_id, self.body
        )
    }
}

/// Build the client `<hello>` document
pub(crate) fn client_hello(extra_capabilities: &[String]) -> String {
    let mut capabilities = String::new();
    for uri in [BASE_1_0, BASE_1_1]
        .into_iter()
        .chain(extra_capabilities.iter().map(String::as_str))
    {
        capabilities.push_str(&format!("<capability>{uri}</capability>"));
    }
    format!(
        "{XML_HEADER}<hello xmlns=\"{NETCONF_NS}\"><capabilities>{capabilities}</capabilities></hello>"
    )
}

/// Parse a server `<hello>`: session-id and advertised capability URIs
pub(crate) fn parse_hello(xml: &str) -> Result<(Option<u32>, Vec<String>)> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut capabilities = Vec::new();
    let mut session_id = None;
    let mut current: Option<Vec<u8>> = None;
    loop {
        match reader
            .read_event()
            .map_err(|e| NetconfError::MalformedEncoding(e.to_string()))?
        {
            Event::Start(e) => current = Some(e.local_name().as_ref().to_vec()),
            Event::Text(t) => {
                let text = t
                    .unescape()
                    .map_err(|e| NetconfError::MalformedEncoding(e.to_string()))?;
                let text = text.trim();
                match current.as_deref() {
                    Some(b"capability") => capabilities.push(text.to_string()),
                    Some(b"session-id") => session_id = text.parse::<u32>().ok(),
                    _ => {}
                }
            }
            Event::End(_) => current = None,
            Event::Eof => break,
            _ => {}
        }
    }
    if capabilities.is_empty() {
        return Err(NetconfError::MalformedEncoding(
            "hello without capabilities".to_string(),
        ));
    }
    Ok((session_id, capabilities))
}

/// Extract the message-id of an `<rpc-reply>` without parsing further.
/// Returns `None` for frames that are not replies (e.g. notifications).
pub(crate) fn peek_message_id(xml: &str) -> Option<u64> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() != b"rpc-reply" {
                    return None;
                }
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"message-id"
                        && let Ok(value) = attr.unescape_value()
                    {
                        return value.trim().parse().ok();
                    }
                }
                return None;
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
    }
}

/// Parsed `<rpc-reply>` content
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyContent {
    /// `<ok/>` or an empty reply
    Ok,
    /// Inner XML of a `<data>` element
    Data(String),
    /// One or more `<rpc-error>` elements
    Errors(Vec<RpcErrorInfo>),
    /// Anything else, e.g. custom RPC output: the raw inner XML of the
    /// reply element
    Other(String),
}

/// A parsed reply with its raw document preserved
#[derive(Debug, Clone, PartialEq)]
pub struct RpcReply {
    pub message_id: Option<u64>,
    pub content: ReplyContent,
    pub raw: String,
}

impl RpcReply {
    /// Parse a raw `<rpc-reply>` document
    pub fn parse(xml: &str) -> Result<RpcReply> {
        let malformed = |e: quick_xml::Error| NetconfError::MalformedEncoding(e.to_string());

        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);
        let (message_id, inner) = loop {
            match reader.read_event().map_err(malformed)? {
                Event::Start(e) if e.local_name().as_ref() == b"rpc-reply" => {
                    let message_id = reply_message_id(&e);
                    let end = e.to_end().into_owned();
                    let inner = reader.read_text(end.name()).map_err(malformed)?.into_owned();
                    break (message_id, inner);
                }
                Event::Empty(e) if e.local_name().as_ref() == b"rpc-reply" => {
                    break (reply_message_id(&e), String::new());
                }
                Event::Start(e) | Event::Empty(e) => {
                    return Err(NetconfError::MalformedEncoding(format!(
                        "expected <rpc-reply>, found <{}>",
                        String::from_utf8_lossy(e.local_name().as_ref())
                    )));
                }
                Event::Eof => {
                    return Err(NetconfError::MalformedEncoding(
                        "no <rpc-reply> element".to_string(),
                    ));
                }
                _ => {}
            }
        };

        let mut reader = Reader::from_str(&inner);
        reader.config_mut().trim_text(true);
        let mut errors = Vec::new();
        let mut content: Option<ReplyContent> = None;
        loop {
            match reader.read_event().map_err(malformed)? {
                Event::Start(e) => {
                    let name = e.local_name().as_ref().to_vec();
                    let end = e.to_end().into_owned();
                    let element_inner =
                        reader.read_text(end.name()).map_err(malformed)?.into_owned();
                    match name.as_slice() {
                        b"ok" => {
                            content.get_or_insert(ReplyContent::Ok);
                        }
                        b"data" => content = Some(ReplyContent::Data(element_inner)),
                        b"rpc-error" => errors.push(RpcErrorInfo::parse(&element_inner)),
                        _ => {
                            content.get_or_insert_with(|| ReplyContent::Other(inner.clone()));
                        }
                    }
                }
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"ok" => {
                        content.get_or_insert(ReplyContent::Ok);
                    }
                    b"data" => {
                        content.get_or_insert(ReplyContent::Data(String::new()));
                    }
                    _ => {
                        content.get_or_insert_with(|| ReplyContent::Other(inner.clone()));
                    }
                },
                Event::Eof => break,
                _ => {}
            }
        }

        let content = if errors.is_empty() {
            content.unwrap_or(ReplyContent::Ok)
        } else {
            ReplyContent::Errors(errors)
        };
        Ok(RpcReply {
            message_id,
            content,
            raw: xml.to_string(),
        })
    }
}

fn reply_message_id(start: &quick_xml::events::BytesStart<'_>) -> Option<u64> {
    for attr in start.attributes().flatten() {
        if attr.key.as_ref() == b"message-id"
            && let Ok(value) = attr.unescape_value()
        {
            return value.trim().parse().ok();
        }
    }
    None
}

/// Server-reported error payload of one `<rpc-error>`, preserved
/// verbatim in `raw` for the caller to inspect or log
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RpcErrorInfo {
    pub error_type: String,
    pub tag: String,
    pub severity: String,
    pub message: String,
    /// Verbatim inner XML of the `<rpc-error>` element
    pub raw: String,
}

impl RpcErrorInfo {
    fn parse(raw_inner: &str) -> Self {
        let mut info = RpcErrorInfo {
            raw: raw_inner.trim().to_string(),
            ..Default::default()
        };
        let mut reader = Reader::from_str(raw_inner);
        reader.config_mut().trim_text(true);
        let mut current: Option<Vec<u8>> = None;
        while let Ok(event) = reader.read_event() {
            match event {
                Event::Start(e) => current = Some(e.local_name().as_ref().to_vec()),
                Event::Text(t) => {
                    if let (Some(name), Ok(text)) = (current.as_deref(), t.unescape()) {
                        let text = text.trim().to_string();
                        match name {
                            b"error-type" => info.error_type = text,
                            b"error-tag" => info.tag = text,
                            b"error-severity" => info.severity = text,
                            b"error-message" => info.message = text,
                            _ => {}
                        }
                    }
                }
                Event::End(_) => current = None,
                Event::Eof => break,
                _ => {}
            }
        }
        info
    }
}

impl fmt::Display for RpcErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.tag.is_empty(), self.message.is_empty()) {
            (false, false) => write!(f, "{}: {}", self.tag, self.message),
            (false, true) => f.write_str(&self.tag),
            (true, false) => f.write_str(&self.message),
            (true, true) => f.write_str(&self.raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_to_xml() {
        let envelope = RpcEnvelope::new(101, "<get/>");
        assert_eq!(
            envelope.to_xml(),
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
             <rpc message-id=\"101\" xmlns=\"urn:ietf:params:xml:ns:netconf:base:1.0\"><get/></rpc>"
        );
    }

    #[test]
    fn test_client_hello_advertises_both_base_versions() {
        let hello = client_hello(&[]);
        assert!(hello.contains("<capability>urn:ietf:params:netconf:base:1.0</capability>"));
        assert!(hello.contains("<capability>urn:ietf:params:netconf:base:1.1</capability>"));
    }

    #[test]
    fn test_parse_hello() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<hello xmlns="urn:ietf:params:xml:ns:netconf:base:1.0">
  <capabilities>
    <capability>
      urn:ietf:params:netconf:base:1.1
    </capability>
    <capability>urn:ietf:params:netconf:capability:candidate:1.0</capability>
  </capabilities>
  <session-id>4</session-id>
</hello>"#;
        let (session_id, capabilities) = parse_hello(xml).unwrap();
        assert_eq!(session_id, Some(4));
        assert_eq!(
            capabilities,
            vec![BASE_1_1.to_string(), CANDIDATE.to_string()]
        );
    }

    #[test]
    fn test_parse_hello_without_capabilities() {
        let xml = "<hello xmlns=\"urn:ietf:params:xml:ns:netconf:base:1.0\"></hello>";
        assert!(matches!(
            parse_hello(xml),
            Err(NetconfError::MalformedEncoding(_))
        ));
    }

    #[test]
    fn test_parse_reply_ok() {
        let xml = "<rpc-reply message-id=\"7\" xmlns=\"urn:ietf:params:xml:ns:netconf:base:1.0\"><ok/></rpc-reply>";
        let reply = RpcReply::parse(xml).unwrap();
        assert_eq!(reply.message_id, Some(7));
        assert_eq!(reply.content, ReplyContent::Ok);
    }

    #[test]
    fn test_parse_reply_data() {
        let xml = "<rpc-reply message-id=\"2\" xmlns=\"urn:ietf:params:xml:ns:netconf:base:1.0\">\
                   <data><a xmlns=\"urn:x\"><b>1</b></a></data></rpc-reply>";
        let reply = RpcReply::parse(xml).unwrap();
        assert_eq!(
            reply.content,
            ReplyContent::Data("<a xmlns=\"urn:x\"><b>1</b></a>".to_string())
        );
    }

    #[test]
    fn test_parse_reply_errors_preserve_payload() {
        let xml = r#"<rpc-reply message-id="3" xmlns="urn:ietf:params:xml:ns:netconf:base:1.0">
  <rpc-error>
    <error-type>application</error-type>
    <error-tag>data-missing</error-tag>
    <error-severity>error</error-severity>
    <error-message>object not found</error-message>
  </rpc-error>
</rpc-reply>"#;
        let reply = RpcReply::parse(xml).unwrap();
        let ReplyContent::Errors(errors) = reply.content else {
            panic!("expected errors");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].tag, "data-missing");
        assert_eq!(errors[0].error_type, "application");
        assert_eq!(errors[0].message, "object not found");
        assert!(errors[0].raw.contains("<error-tag>data-missing</error-tag>"));
    }

    #[test]
    fn test_parse_reply_custom_output() {
        let xml = "<rpc-reply message-id=\"5\" xmlns=\"urn:ietf:params:xml:ns:netconf:base:1.0\">\
                   <output xmlns=\"urn:x\"><result>done</result></output></rpc-reply>";
        let reply = RpcReply::parse(xml).unwrap();
        assert_eq!(
            reply.content,
            ReplyContent::Other("<output xmlns=\"urn:x\"><result>done</result></output>".to_string())
        );
    }

    #[test]
    fn test_peek_message_id() {
        assert_eq!(
            peek_message_id("<rpc-reply message-id=\"42\"><ok/></rpc-reply>"),
            Some(42)
        );
        assert_eq!(peek_message_id("<notification><x/></notification>"), None);
        assert_eq!(peek_message_id("not xml"), None);
    }
}
