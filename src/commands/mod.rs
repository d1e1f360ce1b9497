//! Command Layer
//!
//! This module implements the command processing layer for redkey.
//! It receives decoded RESP requests, runs them against the database,
//! and returns the replies.
//!
//! ## Architecture
//!
//! ```text
//! Client Request
//!       │
//!       ▼
//! ┌─────────────────┐
//! │  RESP Parser    │  (protocol module)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ CommandHandler  │  (handler)
//! │  - Lookup       │  (registry)
//! │  - Validate     │  (command)
//! │  - Execute      │  (one module per family)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    Database     │  (storage module)
//! └─────────────────┘
//! ```
//!
//! ## Supported Commands
//!
//! ### Hash Commands
//! - `HSET`, `HSETNX`, `HMSET`, `HGET`, `HMGET`, `HDEL`, `HEXISTS`
//! - `HLEN`, `HKEYS`, `HVALS`, `HGETALL`, `HINCRBY`, `HINCRBYFLOAT`
//!
//! ### List Commands
//! - `LPUSH`, `RPUSH`, `LPOP`, `RPOP`, `LLEN`, `LINDEX`
//! - `LRANGE`, `LINSERT`, `LSET`, `LREM`, `LTRIM`
//!
//! ### Set Commands
//! - `SADD`, `SREM`, `SCARD`, `SMEMBERS`, `SISMEMBER`
//! - `SDIFF`, `SINTER`, `SUNION`
//!
//! ### String Commands
//! - `GET`, `SET`, `GETSET`, `APPEND`, `STRLEN`, `GETRANGE`, `SETRANGE`
//! - `INCR`, `DECR`, `INCRBY`, `DECRBY`, `INCRBYFLOAT`
//!
//! ### Key Commands
//! - `DEL`, `EXISTS`, `TYPE`
//! - `EXPIRE`, `PEXPIRE`, `TTL`, `PTTL`, `PERSIST`
//!
//! ### Server Commands
//! - `PING`, `ECHO`, `DBSIZE`, `FLUSHDB`, `QUIT`

pub mod command;
pub mod handler;
pub mod hashes;
pub mod keys;
pub mod lists;
pub mod registry;
pub mod server;
pub mod sets;
pub mod strings;

pub use command::{ArgDef, Args, Command};
pub use handler::CommandHandler;
pub use registry::CommandRegistry;
