//! Server Commands
//!
//! Connection and keyspace-wide commands that take no key.

use super::command::{ArgDef, Args, Command};
use crate::error::CommandResult;
use crate::protocol::RespValue;
use crate::storage::Database;
use tracing::info;

pub fn commands() -> Vec<Command> {
    vec![
        Command::database("ping", ArgDef::range(0, 1), ping),
        Command::database("echo", ArgDef::exact(1), echo),
        Command::database("dbsize", ArgDef::exact(0), dbsize),
        Command::database("flushdb", ArgDef::exact(0), flushdb),
        Command::database("quit", ArgDef::exact(0), quit),
    ]
}

/// PING [message]
fn ping(_db: &Database, args: &Args) -> CommandResult {
    match args.raw.first() {
        Some(message) => Ok(RespValue::bulk_string(message.clone())),
        None => Ok(RespValue::pong()),
    }
}

fn echo(_db: &Database, args: &Args) -> CommandResult {
    Ok(RespValue::bulk_string(args.get(0).clone()))
}

fn dbsize(db: &Database, _args: &Args) -> CommandResult {
    Ok(db.len().into())
}

fn flushdb(db: &Database, _args: &Args) -> CommandResult {
    let mut keyspace = db.xlock();
    let removed = keyspace.len();
    keyspace.clear();
    info!(keys = removed, "Database flushed");
    Ok(RespValue::ok())
}

/// The connection layer closes the socket once this reply is written.
fn quit(_db: &Database, _args: &Args) -> CommandResult {
    Ok(RespValue::ok())
}
