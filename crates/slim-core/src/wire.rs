//! Chunk codec: the SLIM wire format.
//!
//! Every message on the wire — instruction batches going in, result lists
//! coming back — is a *chunk*: a bracketed, length-prefixed list where each
//! element is itself either a scalar string or a nested chunk. This module
//! is the only place that format is allowed to leak out of; everything
//! above it works with [`Value`].
//!
//! This IS the protocol. Changing a constant here desyncs with FitNesse.

use thiserror::Error;

pub const HANDSHAKE_BANNER: &str = "Slim -- V0.0\n";
pub const DISCONNECT: &str = "bye";

const START_CHUNK: u8 = b'[';
const END_CHUNK: u8 = b']';
const SEPARATOR: u8 = b':';
const NUMERIC_LENGTH: usize = 6;
const NUMERIC_BLOCK_LENGTH: usize = NUMERIC_LENGTH + 1;

/// A decoded wire value: either a leaf string or a nested list.
///
/// The empty string has no representation of its own on the wire — it is
/// the same `null` literal an absent/void value packs to — so decoding
/// never distinguishes "empty string" from "null"; both come back as
/// `Value::Scalar(String::new())`. Callers that care about the distinction
/// do so above this layer, per the conversion rules in `slim-engine`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Scalar(String),
    List(Vec<Value>),
}

impl Value {
    pub fn scalar(s: impl Into<String>) -> Self {
        Value::Scalar(s.into())
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Value::Scalar(s) => Some(s),
            Value::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) => Some(v),
            Value::Scalar(_) => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("chunk truncated: expected {expected} more bytes at position {pos}")]
    Truncated { pos: usize, expected: usize },
    #[error("{0:?} has no leading '['")]
    MissingStartChunk(String),
    #[error("{0:?} has no trailing ']'")]
    MissingEndChunk(String),
    #[error("{chunk:?} has no ':' separator at position {pos}")]
    MissingSeparator { chunk: String, pos: usize },
    #[error("{0:?} is not a valid 6-digit length header")]
    InvalidLength(String),
}

/// Encode a top-level list of values into one bracketed chunk: `[NNNNNN:...:]`.
pub fn encode(items: &[Value]) -> String {
    pack(items)
}

fn pack(items: &[Value]) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(items.len() + 1);
    parts.push(format!("{:06}", items.len()));
    for item in items {
        parts.push(pack_item(item));
    }
    format!("[{}:]", parts.join(":"))
}

fn pack_item(item: &Value) -> String {
    match item {
        Value::List(items) => pack_item(&Value::Scalar(pack(items))),
        Value::Scalar(s) => {
            let body: &str = if s.is_empty() { "null" } else { s };
            format!("{:06}:{}", body.len(), body)
        }
    }
}

/// Decode a bracketed chunk into its top-level list of values.
///
/// Mirrors `waferslim.protocol.unpack`/`_unpack_chunk`: nested chunks are
/// detected by bracket sniffing on the already-extracted item string and
/// recursively unpacked, not by a separate type tag on the wire.
pub fn decode(packed: &str) -> Result<Vec<Value>, WireError> {
    let bytes = packed.as_bytes();
    let mut out = Vec::new();
    unpack_chunk(bytes, &mut out)?;
    Ok(out)
}

fn unpack_chunk(chunk: &[u8], out: &mut Vec<Value>) -> Result<(), WireError> {
    check_chunk(chunk)?;
    let mut pos = 1usize;
    let count = read_numeric(chunk, pos)?;
    check_separator(chunk, pos + NUMERIC_LENGTH)?;
    pos += NUMERIC_BLOCK_LENGTH;

    for _ in 0..count {
        let item_len = read_numeric(chunk, pos)?;
        check_separator(chunk, pos + NUMERIC_LENGTH)?;
        pos += NUMERIC_BLOCK_LENGTH;

        if pos + item_len > chunk.len() {
            return Err(WireError::Truncated {
                pos,
                expected: item_len,
            });
        }
        let item = &chunk[pos..pos + item_len];
        check_separator(chunk, pos + item_len)?;
        pos += item_len + 1;

        if is_chunk(item) {
            let mut nested = Vec::new();
            unpack_chunk(item, &mut nested)?;
            out.push(Value::List(nested));
        } else {
            out.push(Value::Scalar(String::from_utf8_lossy(item).into_owned()));
        }
    }
    Ok(())
}

fn read_numeric(chunk: &[u8], pos: usize) -> Result<usize, WireError> {
    if pos + NUMERIC_LENGTH > chunk.len() {
        return Err(WireError::Truncated {
            pos,
            expected: NUMERIC_LENGTH,
        });
    }
    let digits = std::str::from_utf8(&chunk[pos..pos + NUMERIC_LENGTH]).ok();
    digits
        .and_then(|d| d.parse::<usize>().ok())
        .ok_or_else(|| WireError::InvalidLength(lossy(&chunk[pos..pos + NUMERIC_LENGTH])))
}

fn check_separator(chunk: &[u8], pos: usize) -> Result<(), WireError> {
    match chunk.get(pos) {
        Some(&b) if b == SEPARATOR => Ok(()),
        _ => Err(WireError::MissingSeparator {
            chunk: lossy(chunk),
            pos,
        }),
    }
}

fn check_chunk(chunk: &[u8]) -> Result<(), WireError> {
    if chunk.first() != Some(&START_CHUNK) {
        return Err(WireError::MissingStartChunk(lossy(chunk)));
    }
    if chunk.last() != Some(&END_CHUNK) {
        return Err(WireError::MissingEndChunk(lossy(chunk)));
    }
    Ok(())
}

fn is_chunk(item: &[u8]) -> bool {
    item.first() == Some(&START_CHUNK) && item.last() == Some(&END_CHUNK)
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Format a bare length header (the `NNNNNN:` sent ahead of each message body).
pub fn format_length_header(len: usize) -> String {
    format!("{:06}:", len)
}

/// Parse a bare 6-digit length header (without its trailing separator).
pub fn parse_length_header(digits: &str) -> Result<usize, WireError> {
    digits
        .parse::<usize>()
        .map_err(|_| WireError::InvalidLength(digits.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_flat_list() {
        let items = vec![Value::scalar("hello"), Value::scalar("world")];
        let packed = encode(&items);
        assert_eq!(packed, "[000002:000005:hello:000005:world:]");
        assert_eq!(decode(&packed).unwrap(), items);
    }

    #[test]
    fn round_trips_nested_list() {
        let items = vec![
            Value::scalar("OK"),
            Value::List(vec![Value::scalar("a"), Value::scalar("b")]),
        ];
        let packed = encode(&items);
        let decoded = decode(&packed).unwrap();
        assert_eq!(decoded, items);
    }

    #[test]
    fn empty_string_packs_as_null() {
        let items = vec![Value::scalar("")];
        let packed = encode(&items);
        assert_eq!(packed, "[000001:000004:null:]");
    }

    #[test]
    fn empty_list_packs_with_zero_count() {
        let packed = encode(&[]);
        assert_eq!(packed, "[000000:]");
        assert_eq!(decode(&packed).unwrap(), Vec::<Value>::new());
    }

    #[test]
    fn rejects_missing_leading_bracket() {
        let err = decode("000000:]").unwrap_err();
        assert!(matches!(err, WireError::MissingStartChunk(_)));
    }

    #[test]
    fn rejects_missing_trailing_bracket() {
        let err = decode("[000000:").unwrap_err();
        assert!(matches!(err, WireError::MissingEndChunk(_)));
    }

    #[test]
    fn rejects_truncated_item() {
        let err = decode("[000001:000010:short:]").unwrap_err();
        assert!(matches!(err, WireError::Truncated { .. }));
    }

    #[test]
    fn counts_multibyte_utf8_by_byte_length_not_char_count() {
        let items = vec![Value::scalar("héllo")];
        let packed = encode(&items);
        // 'é' is 2 bytes in UTF-8, so "héllo" is 6 bytes, not 5 chars.
        assert_eq!(packed, "[000001:000006:héllo:]");
        assert_eq!(decode(&packed).unwrap(), items);
    }

    #[test]
    fn length_header_round_trips() {
        let header = format_length_header(42);
        assert_eq!(header, "000042:");
        assert_eq!(parse_length_header("000042").unwrap(), 42);
    }
}
