//! Command Handler
//!
//! Turns a decoded request into a reply. The request must be an array of
//! bulk (or simple) strings; the first element names the command and the
//! rest are its arguments.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CommandHandler                          │
//! │                                                             │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐      │
//! │  │  execute()  │───>│  dispatch() │───>│   Command   │      │
//! │  └─────────────┘    └─────────────┘    └─────────────┘      │
//! │                            │                  │             │
//! │                            ▼                  ▼             │
//! │                    CommandRegistry        Database          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Errors never escape as Rust errors: every failure becomes a RESP error
//! reply carrying the error line of [`CommandError`].

use super::registry::CommandRegistry;
use crate::error::CommandError;
use crate::protocol::RespValue;
use crate::storage::Database;
use bytes::Bytes;
use std::sync::Arc;
use tracing::debug;

/// Executes requests against a shared database. Cheap to clone; each
/// connection gets its own copy.
#[derive(Clone)]
pub struct CommandHandler {
    registry: Arc<CommandRegistry>,
    db: Database,
}

impl CommandHandler {
    /// Creates a handler serving every built-in command.
    pub fn new(db: Database) -> Self {
        Self::with_registry(Arc::new(CommandRegistry::with_builtins()), db)
    }

    /// Creates a handler over an existing registry.
    pub fn with_registry(registry: Arc<CommandRegistry>, db: Database) -> Self {
        Self { registry, db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Executes a request and returns the reply to send back.
    pub fn execute(&self, request: RespValue) -> RespValue {
        let items = match request {
            RespValue::Array(items) => items,
            _ => return RespValue::error("ERR invalid command format"),
        };

        let mut parts = Vec::with_capacity(items.len());
        for item in items {
            match item {
                RespValue::BulkString(data) | RespValue::SimpleString(data) => parts.push(data),
                _ => return RespValue::error("ERR invalid command format"),
            }
        }

        if parts.is_empty() {
            return RespValue::error("ERR empty command");
        }

        let name = parts.remove(0);
        self.dispatch(&name, parts)
    }

    /// Looks `name` up and runs it with `args`.
    pub fn dispatch(&self, name: &[u8], args: Vec<Bytes>) -> RespValue {
        let Some(command) = self.registry.get(name) else {
            let name = String::from_utf8_lossy(name).into_owned();
            debug!(command = %name, "Unknown command");
            return RespValue::error(CommandError::UnknownCommand(name).to_string());
        };

        match command.call(&self.db, args) {
            Ok(reply) => reply,
            Err(e) => {
                debug!(command = command.name(), error = %e, "Command failed");
                RespValue::error(e.to_string())
            }
        }
    }

    /// Whether `request` asks the server to close the connection.
    pub fn is_quit(request: &RespValue) -> bool {
        let Some(first) = request.as_array().and_then(|items| items.first()) else {
            return false;
        };
        first
            .as_bytes()
            .is_some_and(|name| name.eq_ignore_ascii_case(b"quit"))
    }

    /// Runs a request given as plain strings.
    #[cfg(test)]
    pub(crate) fn run(&self, args: &[&str]) -> RespValue {
        let request = args
            .iter()
            .map(|s| RespValue::bulk_string(Bytes::from(s.to_string())))
            .collect();
        self.execute(RespValue::Array(request))
    }
}
