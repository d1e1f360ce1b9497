//! # redkey - A Concurrent, Multi-Type In-Memory Key-Value Store
//!
//! redkey speaks the Redis wire protocol (RESP) and serves string, hash,
//! list and set values from a single in-memory keyspace.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                               redkey                                    │
//! │                                                                         │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐                  │
//! │  │ TCP Server  │───>│ Connection  │───>│  Command    │                  │
//! │  │ (Listener)  │    │  Handler    │    │  Handler    │                  │
//! │  └─────────────┘    └─────────────┘    └──────┬──────┘                  │
//! │                                               │                         │
//! │  ┌─────────────┐                              ▼                         │
//! │  │    RESP     │    ┌──────────────────────────────────────────────┐    │
//! │  │   Codec     │    │                 Database                     │    │
//! │  └─────────────┘    │  structural RwLock ──> name ──> Arc<Key>     │    │
//! │                     │                          per-key RwLock<Value>│   │
//! │                     │                          per-key TTL timer    │   │
//! │                     └──────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use redkey::commands::CommandHandler;
//! use redkey::protocol::RespValue;
//! use redkey::storage::Database;
//!
//! let handler = CommandHandler::new(Database::new());
//! let request = RespValue::array(vec![
//!     RespValue::bulk_string("HSET"),
//!     RespValue::bulk_string("user"),
//!     RespValue::bulk_string("name"),
//!     RespValue::bulk_string("Ariz"),
//! ]);
//! assert_eq!(handler.execute(request), RespValue::integer(1));
//! ```
//!
//! ## Module Overview
//!
//! - [`protocol`]: RESP encoder and incremental decoder
//! - [`values`]: The four value kinds and their capability traits
//! - [`storage`]: Keys, the keyspace and TTL timers
//! - [`commands`]: Argument contracts, the registry and every command family
//! - [`connection`]: Client connection management
//! - [`config`]: Command-line configuration
//!
//! ## Design Highlights
//!
//! ### Two Lock Levels
//!
//! Each key carries its own reader-writer lock, so commands on different
//! keys never contend. Inserting or removing a name takes the keyspace's
//! structural lock, which keeps two commands from racing to create or
//! delete the same key.
//!
//! ### Lazy + Timer Expiry
//!
//! Keys with a TTL are expired in two ways:
//! 1. **Lazy**: a lookup that finds an expired key removes it
//! 2. **Timer**: each TTL arms a Tokio timer that removes the key on time

pub mod commands;
pub mod config;
pub mod connection;
pub mod error;
pub mod protocol;
pub mod storage;
pub mod values;

// Re-export commonly used types for convenience
pub use commands::{CommandHandler, CommandRegistry};
pub use config::Config;
pub use connection::{handle_connection, ConnectionStats};
pub use error::{CommandError, CommandResult};
pub use protocol::{ParseError, RespParser, RespValue};
pub use storage::Database;

/// The default port redkey listens on (same as Redis)
pub const DEFAULT_PORT: u16 = 6379;

/// The default host redkey binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Version of redkey
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
