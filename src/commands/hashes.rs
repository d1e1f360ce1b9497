//! Hash Commands
//!
//! `HDEL` is the only hash command that can remove its key (when the last
//! field goes), so it is the only one registered with the database shape.

use super::command::{float_reply, ArgDef, Args, Command};
use crate::error::{CommandError, CommandResult};
use crate::protocol::RespValue;
use crate::storage::{Database, DefaultPolicy, KeyHandle};
use crate::values::Kind;

const CREATE: DefaultPolicy = DefaultPolicy::CreateOnWrite(Kind::Hash);
const EMPTY: DefaultPolicy = DefaultPolicy::DefaultEmpty;

pub fn commands() -> Vec<Command> {
    vec![
        Command::database("hdel", ArgDef::at_least(2), hdel),
        Command::single_key("hexists", ArgDef::exact(2), EMPTY, hexists),
        Command::single_key("hget", ArgDef::exact(2), EMPTY, hget),
        Command::single_key("hgetall", ArgDef::exact(1), EMPTY, hgetall),
        Command::single_key("hincrby", ArgDef::exact(3).ints(&[2]), CREATE, hincrby),
        Command::single_key(
            "hincrbyfloat",
            ArgDef::exact(3).floats(&[2]),
            CREATE,
            hincrbyfloat,
        ),
        Command::single_key("hkeys", ArgDef::exact(1), EMPTY, hkeys),
        Command::single_key("hlen", ArgDef::exact(1), EMPTY, hlen),
        Command::single_key("hmget", ArgDef::at_least(2), EMPTY, hmget),
        Command::single_key(
            "hmset",
            ArgDef::at_least(3).validate(complete_pairs),
            CREATE,
            hmset,
        ),
        Command::single_key("hset", ArgDef::exact(3), CREATE, hset),
        Command::single_key("hsetnx", ArgDef::exact(3), CREATE, hsetnx),
        Command::single_key("hvals", ArgDef::exact(1), EMPTY, hvals),
    ]
}

/// `HMSET key field value [field value ...]`: everything after the key must pair up.
fn complete_pairs(args: &Args) -> CommandResult<()> {
    if args.rest(1).len() % 2 == 0 {
        Ok(())
    } else {
        Err(CommandError::WrongNumberOfArguments("hmset"))
    }
}

fn hdel(db: &Database, args: &Args) -> CommandResult {
    let (key, mut keyspace) = db.xlock_get_key(args.key(), EMPTY)?;
    let mut value = key.write()?;
    let hash = value.hash_mut()?;

    let removed = hash.hdel(args.rest(1));
    if hash.hlen() == 0 {
        keyspace.del_key(key.name());
    }
    Ok(removed.into())
}

fn hexists(key: &KeyHandle, args: &Args) -> CommandResult {
    Ok(key.read()?.hash()?.hexists(args.get(1)).into())
}

fn hget(key: &KeyHandle, args: &Args) -> CommandResult {
    Ok(key.read()?.hash()?.hget(args.get(1)).into())
}

fn hgetall(key: &KeyHandle, _args: &Args) -> CommandResult {
    Ok(key.read()?.hash()?.hgetall().into())
}

fn hincrby(key: &KeyHandle, args: &Args) -> CommandResult {
    let n = key.write()?.hash_mut()?.hincr_by(args.get(1), args.int(0))?;
    Ok(n.into())
}

fn hincrbyfloat(key: &KeyHandle, args: &Args) -> CommandResult {
    let n = key
        .write()?
        .hash_mut()?
        .hincr_by_float(args.get(1), args.float(0))?;
    Ok(float_reply(n))
}

fn hkeys(key: &KeyHandle, _args: &Args) -> CommandResult {
    Ok(key.read()?.hash()?.hkeys().into())
}

fn hlen(key: &KeyHandle, _args: &Args) -> CommandResult {
    Ok(key.read()?.hash()?.hlen().into())
}

fn hmget(key: &KeyHandle, args: &Args) -> CommandResult {
    Ok(key.read()?.hash()?.hmget(args.rest(1)).into())
}

fn hmset(key: &KeyHandle, args: &Args) -> CommandResult {
    key.write()?.hash_mut()?.hmset(args.rest(1));
    Ok(RespValue::ok())
}

fn hset(key: &KeyHandle, args: &Args) -> CommandResult {
    let created = key
        .write()?
        .hash_mut()?
        .hset(args.get(1).clone(), args.get(2).clone());
    Ok(created.into())
}

fn hsetnx(key: &KeyHandle, args: &Args) -> CommandResult {
    let set = key
        .write()?
        .hash_mut()?
        .hsetnx(args.get(1).clone(), args.get(2).clone());
    Ok(set.into())
}

fn hvals(key: &KeyHandle, _args: &Args) -> CommandResult {
    Ok(key.read()?.hash()?.hvals().into())
}
