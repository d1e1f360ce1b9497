//! String Commands
//!
//! `SET` and `GETSET` replace whatever the key held, of any kind, and drop
//! its TTL, so they run under the structural lock. So does `SETRANGE`,
//! which must not create a key when asked to write nothing.

use super::command::{float_reply, ArgDef, Args, Command};
use crate::error::{CommandError, CommandResult};
use crate::protocol::RespValue;
use crate::storage::expiry::deadline_after;
use crate::storage::{Database, DefaultPolicy, KeyHandle};
use crate::values::string::MAX_STRING_LEN;
use crate::values::{Kind, StringValue, Value};
use std::time::Duration;

const CREATE: DefaultPolicy = DefaultPolicy::CreateOnWrite(Kind::String);
const EMPTY: DefaultPolicy = DefaultPolicy::DefaultEmpty;

pub fn commands() -> Vec<Command> {
    vec![
        Command::single_key("get", ArgDef::exact(1), EMPTY, get),
        Command::database("set", ArgDef::range(2, 5).validate(set_options), set),
        Command::database("getset", ArgDef::exact(2), getset),
        Command::single_key("append", ArgDef::exact(2), CREATE, append),
        Command::single_key("strlen", ArgDef::exact(1), EMPTY, strlen),
        Command::single_key("getrange", ArgDef::exact(3).ints(&[1, 2]), EMPTY, getrange),
        Command::database(
            "setrange",
            ArgDef::exact(3).ints(&[1]).validate(setrange_offset),
            setrange,
        ),
        Command::single_key("incr", ArgDef::exact(1), CREATE, incr),
        Command::single_key("decr", ArgDef::exact(1), CREATE, decr),
        Command::single_key("incrby", ArgDef::exact(2).ints(&[1]), CREATE, incrby),
        Command::single_key(
            "decrby",
            ArgDef::exact(2).ints(&[1]).validate(negatable_delta),
            CREATE,
            decrby,
        ),
        Command::single_key(
            "incrbyfloat",
            ArgDef::exact(2).floats(&[1]),
            CREATE,
            incrbyfloat,
        ),
    ]
}

/// Options accepted by `SET` after the value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct SetOptions {
    ttl: Option<Duration>,
    nx: bool,
    xx: bool,
}

impl SetOptions {
    /// Parses `[EX seconds | PX milliseconds] [NX | XX]`, in any order.
    fn parse(args: &Args) -> CommandResult<Self> {
        let mut options = Self::default();
        let mut tokens = args.rest(2).iter();

        while let Some(token) = tokens.next() {
            let token = token.to_ascii_uppercase();
            match token.as_slice() {
                b"EX" | b"PX" if options.ttl.is_none() => {
                    let amount = tokens.next().ok_or(CommandError::Syntax)?;
                    let amount: i64 = std::str::from_utf8(amount)
                        .ok()
                        .and_then(|s| s.parse().ok())
                        .ok_or(CommandError::NotAnInteger)?;
                    if amount <= 0 {
                        return Err(CommandError::InvalidExpireTime("set"));
                    }
                    let amount = amount.unsigned_abs();
                    let ttl = if token == b"EX" {
                        Duration::from_secs(amount)
                    } else {
                        Duration::from_millis(amount)
                    };
                    if deadline_after(ttl).is_none() {
                        return Err(CommandError::InvalidExpireTime("set"));
                    }
                    options.ttl = Some(ttl);
                }
                b"NX" if !options.xx => options.nx = true,
                b"XX" if !options.nx => options.xx = true,
                _ => return Err(CommandError::Syntax),
            }
        }

        Ok(options)
    }
}

fn set_options(args: &Args) -> CommandResult<()> {
    SetOptions::parse(args).map(|_| ())
}

fn setrange_offset(args: &Args) -> CommandResult<()> {
    let offset = args.int(0);
    let fits = usize::try_from(offset)
        .ok()
        .and_then(|offset| offset.checked_add(args.get(2).len()))
        .is_some_and(|end| end <= MAX_STRING_LEN);
    if fits {
        Ok(())
    } else {
        Err(CommandError::OffsetOutOfRange)
    }
}

/// Rejects a `DECRBY` delta that has no negation before any key is created.
fn negatable_delta(args: &Args) -> CommandResult<()> {
    args.int(0)
        .checked_neg()
        .map(|_| ())
        .ok_or(CommandError::Overflow)
}

fn string_value(data: &[u8]) -> Value {
    Value::String(StringValue::new(data))
}

fn get(key: &KeyHandle, _args: &Args) -> CommandResult {
    Ok(key.read()?.string()?.get().into())
}

fn set(db: &Database, args: &Args) -> CommandResult {
    let options = SetOptions::parse(args)?;
    let mut keyspace = db.xlock();

    let exists = keyspace.exists(args.key());
    if (options.nx && exists) || (options.xx && !exists) {
        return Ok(RespValue::null());
    }

    let key = keyspace.insert(args.key().clone(), string_value(args.get(1)));
    if let Some(ttl) = options.ttl {
        db.expire(&key, ttl);
    }
    Ok(RespValue::ok())
}

fn getset(db: &Database, args: &Args) -> CommandResult {
    let (key, mut keyspace) = db.xlock_get_key(args.key(), EMPTY)?;

    if !key.is_present() {
        keyspace.insert(args.key().clone(), string_value(args.get(1)));
        return Ok(RespValue::null());
    }

    let old = key.write()?.string_mut()?.get_set(args.get(1));
    key.abort();
    Ok(old.into())
}

fn append(key: &KeyHandle, args: &Args) -> CommandResult {
    Ok(key.write()?.string_mut()?.append(args.get(1)).into())
}

fn strlen(key: &KeyHandle, _args: &Args) -> CommandResult {
    Ok(key.read()?.string()?.strlen().into())
}

fn getrange(key: &KeyHandle, args: &Args) -> CommandResult {
    let range = key.read()?.string()?.get_range(args.int(0), args.int(1));
    Ok(RespValue::bulk_string(range))
}

fn setrange(db: &Database, args: &Args) -> CommandResult {
    let data = args.get(2);
    let offset = usize::try_from(args.int(0)).map_err(|_| CommandError::OffsetOutOfRange)?;

    let mut keyspace = db.xlock();
    let key = match keyspace.get_key(args.key(), EMPTY)? {
        KeyHandle::Absent(_) if data.is_empty() => return Ok(RespValue::integer(0)),
        KeyHandle::Absent(name) => {
            KeyHandle::Present(keyspace.insert(name, Value::empty(Kind::String)))
        }
        present => present,
    };

    let len = key.write()?.string_mut()?.set_range(offset, data);
    Ok(len.into())
}

fn incr_by(key: &KeyHandle, delta: i64) -> CommandResult {
    Ok(key.write()?.string_mut()?.incr_by(delta)?.into())
}

fn incr(key: &KeyHandle, _args: &Args) -> CommandResult {
    incr_by(key, 1)
}

fn decr(key: &KeyHandle, _args: &Args) -> CommandResult {
    incr_by(key, -1)
}

fn incrby(key: &KeyHandle, args: &Args) -> CommandResult {
    incr_by(key, args.int(0))
}

fn decrby(key: &KeyHandle, args: &Args) -> CommandResult {
    let delta = args.int(0).checked_neg().ok_or(CommandError::Overflow)?;
    incr_by(key, delta)
}

fn incrbyfloat(key: &KeyHandle, args: &Args) -> CommandResult {
    let n = key.write()?.string_mut()?.incr_by_float(args.float(0))?;
    Ok(float_reply(n))
}
