//! Key Commands
//!
//! Generic commands that work on a key regardless of the kind of value it
//! holds: deletion, existence, type and TTL management.

use super::command::{ArgDef, Args, Command};
use crate::error::{CommandError, CommandResult};
use crate::protocol::RespValue;
use crate::storage::expiry::deadline_after;
use crate::storage::{Database, DefaultPolicy, KeyHandle};
use std::time::Duration;

const EMPTY: DefaultPolicy = DefaultPolicy::DefaultEmpty;

pub fn commands() -> Vec<Command> {
    vec![
        Command::database("del", ArgDef::at_least(1), del),
        Command::database("exists", ArgDef::at_least(1), exists),
        Command::single_key("type", ArgDef::exact(1), EMPTY, key_type),
        Command::database("expire", ArgDef::exact(2).ints(&[1]), expire),
        Command::database("pexpire", ArgDef::exact(2).ints(&[1]), pexpire),
        Command::single_key("ttl", ArgDef::exact(1), EMPTY, ttl),
        Command::single_key("pttl", ArgDef::exact(1), EMPTY, pttl),
        Command::single_key("persist", ArgDef::exact(1), EMPTY, persist),
    ]
}

fn del(db: &Database, args: &Args) -> CommandResult {
    let mut keyspace = db.xlock();
    let deleted = args
        .raw
        .iter()
        .filter(|name| keyspace.del_key(name))
        .count();
    Ok(deleted.into())
}

/// Counts how many of the names exist; repeated names count each time.
fn exists(db: &Database, args: &Args) -> CommandResult {
    let count = args.raw.iter().filter(|name| db.exists(name)).count();
    Ok(count.into())
}

fn key_type(key: &KeyHandle, _args: &Args) -> CommandResult {
    let name = key.read()?.kind().map_or("none", |kind| kind.name());
    Ok(RespValue::simple_string(name))
}

/// Shared body of `EXPIRE` and `PEXPIRE`. A non-positive TTL deletes the key.
fn expire_in(db: &Database, args: &Args, millis: Option<i64>, command: &'static str) -> CommandResult {
    let millis = millis.ok_or(CommandError::InvalidExpireTime(command))?;
    let (key, mut keyspace) = db.xlock_get_key(args.key(), EMPTY)?;

    let Some(key) = key.key() else {
        return Ok(RespValue::integer(0));
    };

    if millis <= 0 {
        keyspace.del_key(key.name());
        return Ok(RespValue::integer(1));
    }

    let ttl = Duration::from_millis(millis.unsigned_abs());
    if deadline_after(ttl).is_none() {
        return Err(CommandError::InvalidExpireTime(command));
    }
    db.expire(key, ttl);
    Ok(RespValue::integer(1))
}

fn expire(db: &Database, args: &Args) -> CommandResult {
    expire_in(db, args, args.int(0).checked_mul(1000), "expire")
}

fn pexpire(db: &Database, args: &Args) -> CommandResult {
    expire_in(db, args, Some(args.int(0)), "pexpire")
}

/// Remaining TTL in milliseconds: -2 for a missing key, -1 when none is set.
fn remaining_millis(key: &KeyHandle) -> i64 {
    match key.key() {
        None => -2,
        Some(key) if key.expires_at().is_none() => -1,
        Some(key) => i64::try_from(key.ttl().as_millis()).unwrap_or(i64::MAX),
    }
}

fn ttl(key: &KeyHandle, _args: &Args) -> CommandResult {
    let millis = remaining_millis(key);
    let secs = if millis < 0 { millis } else { (millis + 500) / 1000 };
    Ok(RespValue::integer(secs))
}

fn pttl(key: &KeyHandle, _args: &Args) -> CommandResult {
    Ok(RespValue::integer(remaining_millis(key)))
}

fn persist(key: &KeyHandle, _args: &Args) -> CommandResult {
    Ok(key.abort().into())
}
