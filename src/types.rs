//! YANG leaf type definitions and value conversions

use std::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde_json::Value;

/// Declared type of a leaf or leaf-list, as read from a module
/// definition file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YangType {
    String,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Boolean,
    Empty,
    Binary,
    Identityref,
    /// Enumeration with the set of legal names
    Enumeration(Vec<String>),
    /// Union of multiple types, tried in order
    Union(Vec<YangType>),
    /// Unknown/unrecognized type, passed through without checking
    Unknown(String),
}

impl YangType {
    /// Parse a YANG type from a module file `type` field
    pub fn from_module_type(type_value: &Value) -> Self {
        match type_value {
            Value::String(s) => Self::from_string(s),
            Value::Object(map) => {
                // Enumeration: {"enumeration": ["name", ...]}
                let names: Vec<String> = map
                    .get("enumeration")
                    .and_then(|v| v.as_array())
                    .map(|arr| {
                        arr.iter()
                            .filter_map(|v| v.as_str().map(str::to_string))
                            .collect()
                    })
                    .unwrap_or_default();
                YangType::Enumeration(names)
            }
            Value::Array(arr) => {
                // Union of types
                let types: Vec<YangType> = arr
                    .iter()
                    .filter_map(|v| v.as_str().map(Self::from_string))
                    .collect();
                YangType::Union(types)
            }
            _ => YangType::Unknown("invalid".to_string()),
        }
    }

    fn from_string(s: &str) -> Self {
        match s {
            "string" => YangType::String,
            "int8" => YangType::Int8,
            "int16" => YangType::Int16,
            "int32" => YangType::Int32,
            "int64" => YangType::Int64,
            "uint8" => YangType::Uint8,
            "uint16" => YangType::Uint16,
            "uint32" => YangType::Uint32,
            "uint64" => YangType::Uint64,
            "boolean" => YangType::Boolean,
            "empty" => YangType::Empty,
            "binary" => YangType::Binary,
            "identityref" => YangType::Identityref,
            other => YangType::Unknown(other.to_string()),
        }
    }

    fn signed_range(&self) -> (i64, i64) {
        match self {
            YangType::Int8 => (i8::MIN as i64, i8::MAX as i64),
            YangType::Int16 => (i16::MIN as i64, i16::MAX as i64),
            YangType::Int32 => (i32::MIN as i64, i32::MAX as i64),
            _ => (i64::MIN, i64::MAX),
        }
    }

    fn unsigned_max(&self) -> u64 {
        match self {
            YangType::Uint8 => u8::MAX as u64,
            YangType::Uint16 => u16::MAX as u64,
            YangType::Uint32 => u32::MAX as u64,
            _ => u64::MAX,
        }
    }

    /// Render a leaf value into its canonical wire text, checking it
    /// against the declared type. `Ok(None)` means the element carries
    /// no text at all (YANG `empty`).
    pub fn canonical_text(&self, value: &LeafValue) -> Result<Option<String>, String> {
        match self {
            YangType::String => match value {
                LeafValue::String(s) | LeafValue::Enum(s) | LeafValue::Identity(s) => {
                    Ok(Some(s.clone()))
                }
                other => Err(mismatch("string", other)),
            },

            YangType::Int8 | YangType::Int16 | YangType::Int32 | YangType::Int64 => {
                let (min, max) = self.signed_range();
                let n = match value {
                    LeafValue::Int(n) => *n,
                    LeafValue::Uint(u) => i64::try_from(*u)
                        .map_err(|_| format!("value {u} out of range [{min}, {max}]"))?,
                    LeafValue::String(s) => s
                        .parse::<i64>()
                        .map_err(|_| format!("cannot parse '{s}' as integer"))?,
                    other => return Err(mismatch("integer", other)),
                };
                if n < min || n > max {
                    return Err(format!("value {n} out of range [{min}, {max}]"));
                }
                Ok(Some(n.to_string()))
            }

            YangType::Uint8 | YangType::Uint16 | YangType::Uint32 | YangType::Uint64 => {
                let max = self.unsigned_max();
                let n = match value {
                    LeafValue::Uint(u) => *u,
                    LeafValue::Int(n) => u64::try_from(*n)
                        .map_err(|_| format!("value {n} out of range [0, {max}]"))?,
                    LeafValue::String(s) => s
                        .parse::<u64>()
                        .map_err(|_| format!("cannot parse '{s}' as unsigned integer"))?,
                    other => return Err(mismatch("unsigned integer", other)),
                };
                if n > max {
                    return Err(format!("value {n} out of range [0, {max}]"));
                }
                Ok(Some(n.to_string()))
            }

            YangType::Boolean => match value {
                LeafValue::Bool(b) => Ok(Some(b.to_string())),
                LeafValue::String(s) if s == "true" || s == "false" => Ok(Some(s.clone())),
                other => Err(mismatch("boolean", other)),
            },

            YangType::Empty => match value {
                LeafValue::Empty => Ok(None),
                other => Err(mismatch("empty", other)),
            },

            YangType::Binary => match value {
                LeafValue::Binary(bytes) => Ok(Some(BASE64.encode(bytes))),
                // Re-encode to keep the rendering canonical
                LeafValue::String(s) => {
                    let bytes = BASE64
                        .decode(s)
                        .map_err(|e| format!("invalid base64: {e}"))?;
                    Ok(Some(BASE64.encode(bytes)))
                }
                other => Err(mismatch("binary", other)),
            },

            YangType::Identityref => match value {
                LeafValue::Identity(s) | LeafValue::String(s) | LeafValue::Enum(s) => {
                    Ok(Some(s.clone()))
                }
                other => Err(mismatch("identityref", other)),
            },

            YangType::Enumeration(names) => match value {
                LeafValue::Enum(s) | LeafValue::String(s) => {
                    if names.contains(s) {
                        Ok(Some(s.clone()))
                    } else {
                        Err(format!("'{s}' is not a member of {names:?}"))
                    }
                }
                other => Err(mismatch("enumeration", other)),
            },

            YangType::Union(types) => {
                for t in types {
                    if let Ok(text) = t.canonical_text(value) {
                        return Ok(text);
                    }
                }
                Err(format!("no union branch accepts {value}"))
            }

            YangType::Unknown(_) => Ok(Some(value.to_string())),
        }
    }

    /// Parse canonical wire text back into a typed leaf value
    pub fn parse_text(&self, text: &str) -> Result<LeafValue, String> {
        match self {
            YangType::String => Ok(LeafValue::String(text.to_string())),

            YangType::Int8 | YangType::Int16 | YangType::Int32 | YangType::Int64 => {
                let (min, max) = self.signed_range();
                let n: i64 = text
                    .parse()
                    .map_err(|_| format!("cannot parse '{text}' as integer"))?;
                if n < min || n > max {
                    return Err(format!("value {n} out of range [{min}, {max}]"));
                }
                Ok(LeafValue::Int(n))
            }

            YangType::Uint8 | YangType::Uint16 | YangType::Uint32 | YangType::Uint64 => {
                let max = self.unsigned_max();
                let n: u64 = text
                    .parse()
                    .map_err(|_| format!("cannot parse '{text}' as unsigned integer"))?;
                if n > max {
                    return Err(format!("value {n} out of range [0, {max}]"));
                }
                Ok(LeafValue::Uint(n))
            }

            YangType::Boolean => match text {
                "true" => Ok(LeafValue::Bool(true)),
                "false" => Ok(LeafValue::Bool(false)),
                other => Err(format!("'{other}' is not a boolean")),
            },

            YangType::Empty => {
                if text.is_empty() {
                    Ok(LeafValue::Empty)
                } else {
                    Err(format!("empty leaf carries text '{text}'"))
                }
            }

            YangType::Binary => {
                let bytes = BASE64
                    .decode(text)
                    .map_err(|e| format!("invalid base64: {e}"))?;
                Ok(LeafValue::Binary(bytes))
            }

            YangType::Identityref => Ok(LeafValue::Identity(text.to_string())),

            YangType::Enumeration(names) => {
                if names.iter().any(|n| n == text) {
                    Ok(LeafValue::Enum(text.to_string()))
                } else {
                    Err(format!("'{text}' is not a member of {names:?}"))
                }
            }

            YangType::Union(types) => {
                for t in types {
                    if let Ok(v) = t.parse_text(text) {
                        return Ok(v);
                    }
                }
                Err(format!("no union branch accepts '{text}'"))
            }

            YangType::Unknown(_) => Ok(LeafValue::String(text.to_string())),
        }
    }
}

fn mismatch(expected: &str, value: &LeafValue) -> String {
    format!("expected {expected}, got {}", value.kind_name())
}

/// Value carried by a Leaf or a LeafList entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeafValue {
    String(String),
    Int(i64),
    Uint(u64),
    Bool(bool),
    /// YANG `empty` marker, rendered as a self-closing element
    Empty,
    Binary(Vec<u8>),
    /// Enumeration member name
    Enum(String),
    /// Identity reference, e.g. "openconfig-bgp-types:ipv4-unicast"
    Identity(String),
}

impl LeafValue {
    fn kind_name(&self) -> &'static str {
        match self {
            LeafValue::String(_) => "string",
            LeafValue::Int(_) => "integer",
            LeafValue::Uint(_) => "unsigned integer",
            LeafValue::Bool(_) => "boolean",
            LeafValue::Empty => "empty",
            LeafValue::Binary(_) => "binary",
            LeafValue::Enum(_) => "enumeration",
            LeafValue::Identity(_) => "identityref",
        }
    }
}

impl fmt::Display for LeafValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeafValue::String(s) | LeafValue::Enum(s) | LeafValue::Identity(s) => f.write_str(s),
            LeafValue::Int(n) => write!(f, "{n}"),
            LeafValue::Uint(n) => write!(f, "{n}"),
            LeafValue::Bool(b) => write!(f, "{b}"),
            LeafValue::Empty => Ok(()),
            LeafValue::Binary(bytes) => f.write_str(&BASE64.encode(bytes)),
        }
    }
}

impl From<&str> for LeafValue {
    fn from(s: &str) -> Self {
        LeafValue::String(s.to_string())
    }
}

impl From<String> for LeafValue {
    fn from(s: String) -> Self {
        LeafValue::String(s)
    }
}

impl From<i64> for LeafValue {
    fn from(n: i64) -> Self {
        LeafValue::Int(n)
    }
}

impl From<u64> for LeafValue {
    fn from(n: u64) -> Self {
        LeafValue::Uint(n)
    }
}

impl From<bool> for LeafValue {
    fn from(b: bool) -> Self {
        LeafValue::Bool(b)
    }
}
