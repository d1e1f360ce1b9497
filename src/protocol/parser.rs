//! Incremental RESP Decoder
//!
//! The decoder is the exact inverse of [`RespValue::encode`]. It reads a
//! leading type byte, then the type-specific payload.
//!
//! ## How the Parser Works
//!
//! The parser reads from a buffer and returns either:
//! - `Ok(Some((value, consumed)))` - Successfully parsed a value, `consumed` bytes were used
//! - `Ok(None)` - Need more data, the message is incomplete
//! - `Err(ParseError)` - Invalid protocol data
//!
//! Malformed frames are never repaired. The connection layer reports the
//! error to the client and closes the connection.

use crate::protocol::types::{prefix, RespValue, CRLF};
use bytes::Bytes;
use thiserror::Error;

/// Errors that can occur during RESP parsing.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    /// Unknown type prefix byte
    #[error("unknown type prefix: {0:#04x}")]
    UnknownPrefix(u8),

    /// Invalid integer format (integer payloads and length fields)
    #[error("invalid integer: {0}")]
    InvalidInteger(String),

    /// Bulk string length is negative (but not -1 for null)
    #[error("invalid bulk string length: {0}")]
    InvalidBulkLength(i64),

    /// Array length is negative (but not -1 for null)
    #[error("invalid array length: {0}")]
    InvalidArrayLength(i64),

    /// Protocol violation (missing CRLF, etc.)
    #[error("protocol error: {0}")]
    ProtocolError(String),

    /// The message exceeds maximum allowed size
    #[error("message too large: {size} bytes (max: {max})")]
    MessageTooLarge { size: usize, max: usize },
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

type Parsed = Option<(RespValue, usize)>;

/// Maximum size for a single bulk string (512 MB, same as Redis)
pub const MAX_BULK_SIZE: usize = 512 * 1024 * 1024;

/// Maximum array nesting depth (prevent stack overflow)
pub const MAX_NESTING_DEPTH: usize = 32;

/// An incremental RESP parser.
///
/// # Example
///
/// ```
/// use redkey::protocol::RespParser;
///
/// let mut parser = RespParser::new();
/// let buffer = b"*2\r\n$3\r\nGET\r\n$4\r\nname\r\n";
///
/// let (value, consumed) = parser.parse(buffer).unwrap().unwrap();
/// assert_eq!(consumed, buffer.len());
/// assert_eq!(value.as_array().map(|a| a.len()), Some(2));
/// ```
#[derive(Debug, Default)]
pub struct RespParser {
    /// Current nesting depth (for array parsing)
    depth: usize,
}

impl RespParser {
    /// Creates a new parser instance.
    pub fn new() -> Self {
        Self { depth: 0 }
    }

    /// Attempts to parse one RESP value from the front of `buf`.
    pub fn parse(&mut self, buf: &[u8]) -> ParseResult<Parsed> {
        self.depth = 0;
        self.parse_value(buf)
    }

    fn parse_value(&mut self, buf: &[u8]) -> ParseResult<Parsed> {
        let Some(&type_byte) = buf.first() else {
            return Ok(None);
        };

        if self.depth > MAX_NESTING_DEPTH {
            return Err(ParseError::ProtocolError(format!(
                "maximum nesting depth exceeded: {}",
                MAX_NESTING_DEPTH
            )));
        }

        match type_byte {
            prefix::SIMPLE_STRING => Ok(read_line(buf)
                .map(|(line, used)| (RespValue::SimpleString(Bytes::copy_from_slice(line)), used))),
            prefix::ERROR => Ok(read_line(buf)
                .map(|(line, used)| (RespValue::Error(Bytes::copy_from_slice(line)), used))),
            prefix::INTEGER => match read_line(buf) {
                Some((line, used)) => Ok(Some((RespValue::Integer(parse_int(line)?), used))),
                None => Ok(None),
            },
            prefix::BULK_STRING => self.parse_bulk_string(buf),
            prefix::ARRAY => self.parse_array(buf),
            other => Err(ParseError::UnknownPrefix(other)),
        }
    }

    /// Parses a bulk string: `$<length>\r\n<data>\r\n`
    fn parse_bulk_string(&mut self, buf: &[u8]) -> ParseResult<Parsed> {
        let Some((line, header)) = read_line(buf) else {
            return Ok(None);
        };

        let length = parse_int(line)?;
        if length == -1 {
            return Ok(Some((RespValue::NullBulk, header)));
        }
        if length < 0 {
            return Err(ParseError::InvalidBulkLength(length));
        }

        let length = length as usize;
        if length > MAX_BULK_SIZE {
            return Err(ParseError::MessageTooLarge {
                size: length,
                max: MAX_BULK_SIZE,
            });
        }

        let total_needed = header + length + CRLF.len();
        if buf.len() < total_needed {
            return Ok(None);
        }

        if &buf[header + length..total_needed] != CRLF {
            return Err(ParseError::ProtocolError(
                "bulk string missing trailing CRLF".to_string(),
            ));
        }

        let data = Bytes::copy_from_slice(&buf[header..header + length]);
        Ok(Some((RespValue::BulkString(data), total_needed)))
    }

    /// Parses an array: `*<count>\r\n<elements...>`
    fn parse_array(&mut self, buf: &[u8]) -> ParseResult<Parsed> {
        let Some((line, header)) = read_line(buf) else {
            return Ok(None);
        };

        let count = parse_int(line)?;
        if count == -1 {
            return Ok(Some((RespValue::NullArray, header)));
        }
        if count < 0 {
            return Err(ParseError::InvalidArrayLength(count));
        }

        let count = count as usize;
        // Every element needs at least 3 bytes, so a huge count cannot
        // reserve more than the buffer could ever describe.
        let mut elements = Vec::with_capacity(count.min(buf.len() / 3));
        let mut consumed = header;

        self.depth += 1;
        for _ in 0..count {
            match self.parse_value(&buf[consumed..])? {
                Some((value, used)) => {
                    elements.push(value);
                    consumed += used;
                }
                None => {
                    self.depth -= 1;
                    return Ok(None);
                }
            }
        }
        self.depth -= 1;

        Ok(Some((RespValue::Array(elements), consumed)))
    }
}

/// Splits off the line after the prefix byte.
///
/// Returns the line without its CRLF and the bytes consumed including the
/// prefix and the terminator.
fn read_line(buf: &[u8]) -> Option<(&[u8], usize)> {
    find_crlf(&buf[1..]).map(|pos| (&buf[1..1 + pos], 1 + pos + CRLF.len()))
}

fn parse_int(line: &[u8]) -> ParseResult<i64> {
    std::str::from_utf8(line)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| ParseError::InvalidInteger(String::from_utf8_lossy(line).into_owned()))
}

/// Finds the position of `\r` in the first CRLF of `buf`.
#[inline]
fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == CRLF)
}

/// Helper function to parse a single RESP message from bytes.
pub fn parse_message(buf: &[u8]) -> ParseResult<Parsed> {
    RespParser::new().parse(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_string() {
        let (value, consumed) = parse_message(b"+OK\r\n").unwrap().unwrap();
        assert_eq!(value, RespValue::simple_string("OK"));
        assert_eq!(consumed, 5);
    }

    #[test]
    fn test_parse_simple_string_incomplete() {
        assert!(parse_message(b"+OK").unwrap().is_none());
        assert!(parse_message(b"+OK\r").unwrap().is_none());
    }

    #[test]
    fn test_parse_error() {
        let input = b"-ERR unknown command\r\n";
        let (value, consumed) = parse_message(input).unwrap().unwrap();
        assert_eq!(value, RespValue::error("ERR unknown command"));
        assert_eq!(consumed, 22);
    }

    #[test]
    fn test_parse_integer() {
        let (value, consumed) = parse_message(b":1000\r\n").unwrap().unwrap();
        assert_eq!(value, RespValue::Integer(1000));
        assert_eq!(consumed, 7);

        let (value, _) = parse_message(b":-42\r\n").unwrap().unwrap();
        assert_eq!(value, RespValue::Integer(-42));
    }

    #[test]
    fn test_parse_bulk_string() {
        let (value, consumed) = parse_message(b"$5\r\nhello\r\n").unwrap().unwrap();
        assert_eq!(value, RespValue::bulk_string("hello"));
        assert_eq!(consumed, 11);
    }

    #[test]
    fn test_parse_null_bulk_string() {
        let (value, consumed) = parse_message(b"$-1\r\n").unwrap().unwrap();
        assert_eq!(value, RespValue::NullBulk);
        assert_eq!(consumed, 5);
    }

    #[test]
    fn test_parse_empty_bulk_string() {
        let (value, consumed) = parse_message(b"$0\r\n\r\n").unwrap().unwrap();
        assert_eq!(value, RespValue::bulk_string(""));
        assert_eq!(consumed, 6);
    }

    #[test]
    fn test_parse_bulk_string_incomplete() {
        assert!(parse_message(b"$5\r\nhel").unwrap().is_none());
        assert!(parse_message(b"$5").unwrap().is_none());
    }

    #[test]
    fn test_parse_bulk_string_bad_terminator() {
        let result = parse_message(b"$3\r\nabcXY");
        assert!(matches!(result, Err(ParseError::ProtocolError(_))));
    }

    #[test]
    fn test_parse_array() {
        let input = b"*2\r\n$3\r\nGET\r\n$4\r\nname\r\n";
        let (value, consumed) = parse_message(input).unwrap().unwrap();
        assert_eq!(
            value,
            RespValue::Array(vec![
                RespValue::bulk_string("GET"),
                RespValue::bulk_string("name"),
            ])
        );
        assert_eq!(consumed, 23);
    }

    #[test]
    fn test_parse_null_array_is_distinct_from_null_bulk() {
        let (value, _) = parse_message(b"*-1\r\n").unwrap().unwrap();
        assert_eq!(value, RespValue::NullArray);
    }

    #[test]
    fn test_parse_empty_array() {
        let (value, _) = parse_message(b"*0\r\n").unwrap().unwrap();
        assert_eq!(value, RespValue::Array(vec![]));
    }

    #[test]
    fn test_parse_array_incomplete() {
        assert!(parse_message(b"*2\r\n$3\r\nGET\r\n").unwrap().is_none());
    }

    #[test]
    fn test_parse_nested_array() {
        let input = b"*2\r\n:1\r\n*2\r\n:2\r\n$-1\r\n";
        let (value, _) = parse_message(input).unwrap().unwrap();
        assert_eq!(
            value,
            RespValue::Array(vec![
                RespValue::Integer(1),
                RespValue::Array(vec![RespValue::Integer(2), RespValue::NullBulk]),
            ])
        );
    }

    #[test]
    fn test_parse_unknown_prefix_fails_closed() {
        let result = parse_message(b"@invalid\r\n");
        assert_eq!(result, Err(ParseError::UnknownPrefix(b'@')));
    }

    #[test]
    fn test_parse_invalid_integer() {
        let result = parse_message(b":not_a_number\r\n");
        assert!(matches!(result, Err(ParseError::InvalidInteger(_))));
    }

    #[test]
    fn test_parse_non_numeric_length_fails_closed() {
        assert!(matches!(
            parse_message(b"$abc\r\nxyz\r\n"),
            Err(ParseError::InvalidInteger(_))
        ));
        assert!(matches!(
            parse_message(b"*x\r\n"),
            Err(ParseError::InvalidInteger(_))
        ));
        assert_eq!(
            parse_message(b"$-2\r\n"),
            Err(ParseError::InvalidBulkLength(-2))
        );
        assert_eq!(
            parse_message(b"*-5\r\n"),
            Err(ParseError::InvalidArrayLength(-5))
        );
    }

    #[test]
    fn test_nesting_limit() {
        let mut input = Vec::new();
        for _ in 0..=MAX_NESTING_DEPTH + 1 {
            input.extend_from_slice(b"*1\r\n");
        }
        input.extend_from_slice(b":1\r\n");
        assert!(matches!(
            parse_message(&input),
            Err(ParseError::ProtocolError(_))
        ));
    }

    #[test]
    fn test_roundtrip_every_reply_kind() {
        let values = vec![
            RespValue::simple_string("OK"),
            RespValue::simple_string(""),
            RespValue::error("WRONGTYPE Operation against a key holding the wrong kind of value"),
            RespValue::Integer(0),
            RespValue::Integer(i64::MIN),
            RespValue::Integer(i64::MAX),
            RespValue::bulk_string(""),
            RespValue::bulk_string(Bytes::from(&b"bin\x00\r\nary"[..])),
            RespValue::NullBulk,
            RespValue::NullArray,
            RespValue::Array(vec![]),
            RespValue::Array(vec![
                RespValue::bulk_string("HSET"),
                RespValue::NullBulk,
                RespValue::Integer(-1),
                RespValue::Array(vec![RespValue::NullArray, RespValue::simple_string("x")]),
            ]),
        ];

        for original in values {
            let encoded = original.encode().unwrap();
            let (parsed, consumed) = parse_message(&encoded).unwrap().unwrap();
            assert_eq!(parsed, original);
            assert_eq!(consumed, encoded.len());
        }
    }

    #[test]
    fn test_pipelined_frames() {
        let input = b"+OK\r\n:5\r\n";
        let (first, used) = parse_message(input).unwrap().unwrap();
        assert_eq!(first, RespValue::ok());
        let (second, _) = parse_message(&input[used..]).unwrap().unwrap();
        assert_eq!(second, RespValue::Integer(5));
    }
}
