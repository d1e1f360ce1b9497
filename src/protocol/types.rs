//! RESP (Redis Serialization Protocol) Reply Types and Encoder
//!
//! Every reply is framed as `<prefix-byte><payload>\r\n`:
//! - `+` Simple String
//! - `-` Error
//! - `:` Integer
//! - `$` Bulk String (`$-1\r\n` is the null bulk string)
//! - `*` Array (`*-1\r\n` is the null array)
//!
//! ## Examples
//!
//! Simple String: `+OK\r\n`
//! Error: `-ERR unknown command\r\n`
//! Integer: `:1000\r\n`
//! Bulk String: `$5\r\nhello\r\n`
//! Array: `*2\r\n$3\r\nGET\r\n$4\r\nname\r\n`
//!
//! The encoder is purely structural: it serializes whatever value it is
//! handed and never looks at command semantics.

use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;
use thiserror::Error;

/// The CRLF terminator used in RESP protocol
pub const CRLF: &[u8] = b"\r\n";

/// RESP protocol type prefixes
pub mod prefix {
    pub const SIMPLE_STRING: u8 = b'+';
    pub const ERROR: u8 = b'-';
    pub const INTEGER: u8 = b':';
    pub const BULK_STRING: u8 = b'$';
    pub const ARRAY: u8 = b'*';
}

/// Errors raised while encoding a reply.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The value cannot be represented on the wire. Simple strings and errors
    /// are line-delimited, so a CR or LF inside the payload is rejected.
    #[error("resp: invalid value")]
    InvalidValue,
}

/// A value in the RESP protocol.
///
/// The same type is produced by the decoder, so `parse(encode(v)) == v`
/// holds for every variant, including both null kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RespValue {
    /// Non binary-safe status line. Format: `+<string>\r\n`
    SimpleString(Bytes),

    /// Error line. Format: `-<error message>\r\n`
    Error(Bytes),

    /// 64-bit signed integer. Format: `:<integer>\r\n`
    Integer(i64),

    /// Binary-safe string. Format: `$<length>\r\n<data>\r\n`
    BulkString(Bytes),

    /// Null bulk string: `$-1\r\n`
    NullBulk,

    /// Format: `*<count>\r\n<element1><element2>...`
    Array(Vec<RespValue>),

    /// Null array: `*-1\r\n`
    NullArray,
}

impl RespValue {
    /// Creates a new simple string response.
    ///
    /// # Example
    /// ```
    /// use redkey::protocol::types::RespValue;
    /// let ok = RespValue::simple_string("OK");
    /// ```
    pub fn simple_string(s: impl Into<Bytes>) -> Self {
        RespValue::SimpleString(s.into())
    }

    /// Creates a new error response.
    ///
    /// # Example
    /// ```
    /// use redkey::protocol::types::RespValue;
    /// let err = RespValue::error("ERR unknown command");
    /// ```
    pub fn error(s: impl Into<Bytes>) -> Self {
        RespValue::Error(s.into())
    }

    /// Creates a new integer response.
    pub fn integer(n: i64) -> Self {
        RespValue::Integer(n)
    }

    /// Creates a new bulk string response.
    pub fn bulk_string(data: impl Into<Bytes>) -> Self {
        RespValue::BulkString(data.into())
    }

    /// Creates a null bulk string response.
    pub fn null() -> Self {
        RespValue::NullBulk
    }

    /// Creates an array response.
    pub fn array(values: Vec<RespValue>) -> Self {
        RespValue::Array(values)
    }

    /// Common response for successful operations
    pub fn ok() -> Self {
        RespValue::SimpleString(Bytes::from_static(b"OK"))
    }

    /// Common response for PONG
    pub fn pong() -> Self {
        RespValue::SimpleString(Bytes::from_static(b"PONG"))
    }

    /// Encodes the value into a freshly allocated buffer.
    pub fn encode(&self) -> Result<Bytes, EncodeError> {
        let mut buf = BytesMut::new();
        self.encode_into(&mut buf)?;
        Ok(buf.freeze())
    }

    /// Encodes the value at the end of `buf`.
    ///
    /// On failure `buf` is restored to its previous length, so a partially
    /// written array never reaches the wire.
    pub fn encode_into(&self, buf: &mut BytesMut) -> Result<(), EncodeError> {
        let start = buf.len();
        let result = self.write_frame(buf);
        if result.is_err() {
            buf.truncate(start);
        }
        result
    }

    fn write_frame(&self, buf: &mut BytesMut) -> Result<(), EncodeError> {
        match self {
            RespValue::SimpleString(s) => write_line(buf, prefix::SIMPLE_STRING, s),
            RespValue::Error(s) => write_line(buf, prefix::ERROR, s),
            RespValue::Integer(n) => {
                write_prefixed(buf, prefix::INTEGER, n.to_string().as_bytes());
                Ok(())
            }
            RespValue::BulkString(data) => {
                write_prefixed(buf, prefix::BULK_STRING, data.len().to_string().as_bytes());
                buf.put_slice(data);
                buf.put_slice(CRLF);
                Ok(())
            }
            RespValue::NullBulk => {
                write_prefixed(buf, prefix::BULK_STRING, b"-1");
                Ok(())
            }
            RespValue::Array(values) => {
                write_prefixed(buf, prefix::ARRAY, values.len().to_string().as_bytes());
                for value in values {
                    value.write_frame(buf)?;
                }
                Ok(())
            }
            RespValue::NullArray => {
                write_prefixed(buf, prefix::ARRAY, b"-1");
                Ok(())
            }
        }
    }

    /// Returns true if this value is an error.
    pub fn is_error(&self) -> bool {
        matches!(self, RespValue::Error(_))
    }

    /// Attempts to extract the inner bytes from SimpleString or BulkString.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            RespValue::SimpleString(b) | RespValue::BulkString(b) => Some(b),
            _ => None,
        }
    }

    /// Attempts to extract the inner integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            RespValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract the inner array.
    pub fn as_array(&self) -> Option<&[RespValue]> {
        match self {
            RespValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Consumes self and returns the inner array if this is an Array variant.
    pub fn into_array(self) -> Option<Vec<RespValue>> {
        match self {
            RespValue::Array(arr) => Some(arr),
            _ => None,
        }
    }
}

fn write_line(buf: &mut BytesMut, prefix: u8, payload: &[u8]) -> Result<(), EncodeError> {
    if payload.iter().any(|&b| b == b'\r' || b == b'\n') {
        return Err(EncodeError::InvalidValue);
    }
    write_prefixed(buf, prefix, payload);
    Ok(())
}

fn write_prefixed(buf: &mut BytesMut, prefix: u8, payload: &[u8]) {
    buf.reserve(payload.len() + 3);
    buf.put_u8(prefix);
    buf.put_slice(payload);
    buf.put_slice(CRLF);
}

impl From<i64> for RespValue {
    fn from(n: i64) -> Self {
        RespValue::Integer(n)
    }
}

impl From<usize> for RespValue {
    fn from(n: usize) -> Self {
        RespValue::Integer(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

/// Booleans go out as `:1` / `:0`.
impl From<bool> for RespValue {
    fn from(b: bool) -> Self {
        RespValue::Integer(i64::from(b))
    }
}

impl From<Bytes> for RespValue {
    fn from(b: Bytes) -> Self {
        RespValue::BulkString(b)
    }
}

impl From<Option<Bytes>> for RespValue {
    fn from(b: Option<Bytes>) -> Self {
        b.map_or(RespValue::NullBulk, RespValue::BulkString)
    }
}

impl From<Vec<Bytes>> for RespValue {
    fn from(items: Vec<Bytes>) -> Self {
        RespValue::Array(items.into_iter().map(RespValue::BulkString).collect())
    }
}

impl From<Vec<Option<Bytes>>> for RespValue {
    fn from(items: Vec<Option<Bytes>>) -> Self {
        RespValue::Array(items.into_iter().map(RespValue::from).collect())
    }
}

impl fmt::Display for RespValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RespValue::SimpleString(s) => write!(f, "\"{}\"", String::from_utf8_lossy(s)),
            RespValue::Error(s) => write!(f, "(error) {}", String::from_utf8_lossy(s)),
            RespValue::Integer(n) => write!(f, "(integer) {}", n),
            RespValue::BulkString(data) => {
                if let Ok(s) = std::str::from_utf8(data) {
                    write!(f, "\"{}\"", s)
                } else {
                    write!(f, "(binary data, {} bytes)", data.len())
                }
            }
            RespValue::NullBulk | RespValue::NullArray => write!(f, "(nil)"),
            RespValue::Array(values) => {
                if values.is_empty() {
                    write!(f, "(empty array)")
                } else {
                    writeln!(f)?;
                    for (i, v) in values.iter().enumerate() {
                        writeln!(f, "{}) {}", i + 1, v)?;
                    }
                    Ok(())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(value: RespValue) -> Vec<u8> {
        value.encode().unwrap().to_vec()
    }

    #[test]
    fn test_simple_string_encode() {
        assert_eq!(encoded(RespValue::simple_string("OK")), b"+OK\r\n");
    }

    #[test]
    fn test_error_encode() {
        let value = RespValue::error("ERR unknown command");
        assert_eq!(encoded(value), b"-ERR unknown command\r\n");
    }

    #[test]
    fn test_integer_encode() {
        assert_eq!(encoded(RespValue::integer(1000)), b":1000\r\n");
        assert_eq!(encoded(RespValue::integer(-42)), b":-42\r\n");
    }

    #[test]
    fn test_bulk_string_encode() {
        let value = RespValue::bulk_string(Bytes::from("hello"));
        assert_eq!(encoded(value), b"$5\r\nhello\r\n");
    }

    #[test]
    fn test_bulk_string_keeps_crlf_inside() {
        let value = RespValue::bulk_string(Bytes::from("a\r\nb"));
        assert_eq!(encoded(value), b"$4\r\na\r\nb\r\n");
    }

    #[test]
    fn test_null_variants_encode() {
        assert_eq!(encoded(RespValue::NullBulk), b"$-1\r\n");
        assert_eq!(encoded(RespValue::NullArray), b"*-1\r\n");
    }

    #[test]
    fn test_array_encode() {
        let value = RespValue::array(vec![
            RespValue::bulk_string(Bytes::from("GET")),
            RespValue::bulk_string(Bytes::from("name")),
        ]);
        assert_eq!(encoded(value), b"*2\r\n$3\r\nGET\r\n$4\r\nname\r\n");
    }

    #[test]
    fn test_nested_array_encode() {
        let value = RespValue::array(vec![
            RespValue::integer(1),
            RespValue::array(vec![RespValue::integer(2), RespValue::NullBulk]),
        ]);
        assert_eq!(encoded(value), b"*2\r\n:1\r\n*2\r\n:2\r\n$-1\r\n");
    }

    #[test]
    fn test_simple_string_with_newline_is_invalid() {
        let value = RespValue::simple_string("bad\r\nline");
        assert_eq!(value.encode(), Err(EncodeError::InvalidValue));
    }

    #[test]
    fn test_failed_encode_leaves_buffer_untouched() {
        let mut buf = BytesMut::from(&b"+OK\r\n"[..]);
        let value = RespValue::array(vec![
            RespValue::integer(1),
            RespValue::error("broken\nerror"),
        ]);
        assert!(value.encode_into(&mut buf).is_err());
        assert_eq!(&buf[..], b"+OK\r\n");
    }

    #[test]
    fn test_conversions() {
        assert_eq!(RespValue::from(true), RespValue::Integer(1));
        assert_eq!(RespValue::from(false), RespValue::Integer(0));
        assert_eq!(RespValue::from(None::<Bytes>), RespValue::NullBulk);
        assert_eq!(
            RespValue::from(vec![Some(Bytes::from("a")), None]),
            RespValue::Array(vec![RespValue::bulk_string("a"), RespValue::NullBulk])
        );
    }
}
