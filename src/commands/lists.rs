//! List Commands
//!
//! Pops, `LREM` and `LTRIM` can leave a list empty, in which case the key is
//! removed. Those take the structural lock up front.

use super::command::{ArgDef, Args, Command};
use crate::error::{CommandError, CommandResult};
use crate::protocol::RespValue;
use crate::storage::{Database, DefaultPolicy, KeyHandle};
use crate::values::{InsertPosition, Kind, ListOps};

const CREATE: DefaultPolicy = DefaultPolicy::CreateOnWrite(Kind::List);
const EMPTY: DefaultPolicy = DefaultPolicy::DefaultEmpty;

pub fn commands() -> Vec<Command> {
    vec![
        Command::single_key("lpush", ArgDef::at_least(2), CREATE, lpush),
        Command::single_key("rpush", ArgDef::at_least(2), CREATE, rpush),
        Command::database("lpop", ArgDef::exact(1), lpop),
        Command::database("rpop", ArgDef::exact(1), rpop),
        Command::single_key("llen", ArgDef::exact(1), EMPTY, llen),
        Command::single_key("lindex", ArgDef::exact(2).ints(&[1]), EMPTY, lindex),
        Command::single_key("lrange", ArgDef::exact(3).ints(&[1, 2]), EMPTY, lrange),
        Command::single_key(
            "linsert",
            ArgDef::exact(4).validate(insert_position),
            EMPTY,
            linsert,
        ),
        Command::single_key(
            "lset",
            ArgDef::exact(3).ints(&[1]),
            DefaultPolicy::NoDefault,
            lset,
        ),
        Command::database("lrem", ArgDef::exact(3).ints(&[1]), lrem),
        Command::database("ltrim", ArgDef::exact(3).ints(&[1, 2]), ltrim),
    ]
}

fn insert_position(args: &Args) -> CommandResult<()> {
    InsertPosition::parse(args.get(1))
        .map(|_| ())
        .ok_or(CommandError::Syntax)
}

/// Runs `op` on the list under the structural lock, then drops the key if
/// the list ended up empty.
fn mutate_and_prune<T>(
    db: &Database,
    args: &Args,
    op: impl FnOnce(&mut dyn ListOps) -> T,
) -> CommandResult<T> {
    let (key, mut keyspace) = db.xlock_get_key(args.key(), EMPTY)?;
    let mut value = key.write()?;
    let list = value.list_mut()?;

    let out = op(&mut *list);
    if list.llen() == 0 {
        keyspace.del_key(key.name());
    }
    Ok(out)
}

fn lpush(key: &KeyHandle, args: &Args) -> CommandResult {
    Ok(key.write()?.list_mut()?.lpush(args.rest(1)).into())
}

fn rpush(key: &KeyHandle, args: &Args) -> CommandResult {
    Ok(key.write()?.list_mut()?.rpush(args.rest(1)).into())
}

fn lpop(db: &Database, args: &Args) -> CommandResult {
    mutate_and_prune(db, args, |list| list.lpop()).map(RespValue::from)
}

fn rpop(db: &Database, args: &Args) -> CommandResult {
    mutate_and_prune(db, args, |list| list.rpop()).map(RespValue::from)
}

fn llen(key: &KeyHandle, _args: &Args) -> CommandResult {
    Ok(key.read()?.list()?.llen().into())
}

fn lindex(key: &KeyHandle, args: &Args) -> CommandResult {
    Ok(key.read()?.list()?.lindex(args.int(0)).into())
}

fn lrange(key: &KeyHandle, args: &Args) -> CommandResult {
    Ok(key.read()?.list()?.lrange(args.int(0), args.int(1)).into())
}

fn linsert(key: &KeyHandle, args: &Args) -> CommandResult {
    let position = InsertPosition::parse(args.get(1)).ok_or(CommandError::Syntax)?;
    let len = key
        .write()?
        .list_mut()?
        .linsert(position, args.get(2), args.get(3).clone());
    Ok(len.into())
}

fn lset(key: &KeyHandle, args: &Args) -> CommandResult {
    let updated = key
        .write()?
        .list_mut()?
        .lset(args.int(0), args.get(2).clone());
    if updated {
        Ok(RespValue::ok())
    } else {
        Err(CommandError::IndexOutOfRange)
    }
}

fn lrem(db: &Database, args: &Args) -> CommandResult {
    let count = args.int(0);
    mutate_and_prune(db, args, |list| list.lrem(count, args.get(2))).map(RespValue::from)
}

fn ltrim(db: &Database, args: &Args) -> CommandResult {
    let (start, stop) = (args.int(0), args.int(1));
    mutate_and_prune(db, args, |list| list.ltrim(start, stop))?;
    Ok(RespValue::ok())
}
