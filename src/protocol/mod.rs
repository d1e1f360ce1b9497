//! RESP Protocol Implementation
//!
//! This module provides the wire codec spoken with every client: the five
//! RESP reply kinds plus their null variants.
//!
//! ## Modules
//!
//! - `types`: Defines the `RespValue` enum and the encoder
//! - `parser`: Incremental decoder for incoming RESP data
//!
//! ## Example
//!
//! ```
//! use redkey::protocol::{parse_message, RespValue};
//!
//! let response = RespValue::bulk_string("Ariz");
//! let bytes = response.encode().unwrap();
//!
//! let (decoded, _) = parse_message(&bytes).unwrap().unwrap();
//! assert_eq!(decoded, response);
//! ```

pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use parser::{parse_message, ParseError, ParseResult, RespParser};
pub use types::{EncodeError, RespValue};
