//! Set Commands
//!
//! `SDIFF`, `SINTER` and `SUNION` read several keys. They snapshot each
//! key's members in turn under that key's shared lock instead of holding
//! all the locks at once; missing keys count as empty sets.

use super::command::{ArgDef, Args, Command};
use crate::error::CommandResult;
use crate::storage::{Database, DefaultPolicy, KeyHandle};
use crate::values::{set, Kind};
use bytes::Bytes;
use std::collections::HashSet;

const CREATE: DefaultPolicy = DefaultPolicy::CreateOnWrite(Kind::Set);
const EMPTY: DefaultPolicy = DefaultPolicy::DefaultEmpty;

pub fn commands() -> Vec<Command> {
    vec![
        Command::single_key("sadd", ArgDef::at_least(2), CREATE, sadd),
        Command::database("srem", ArgDef::at_least(2), srem),
        Command::single_key("scard", ArgDef::exact(1), EMPTY, scard),
        Command::single_key("smembers", ArgDef::exact(1), EMPTY, smembers),
        Command::single_key("sismember", ArgDef::exact(2), EMPTY, sismember),
        Command::database("sdiff", ArgDef::at_least(1), sdiff),
        Command::database("sinter", ArgDef::at_least(1), sinter),
        Command::database("sunion", ArgDef::at_least(1), sunion),
    ]
}

fn sadd(key: &KeyHandle, args: &Args) -> CommandResult {
    Ok(key.write()?.set_mut()?.sadd(args.rest(1)).into())
}

fn srem(db: &Database, args: &Args) -> CommandResult {
    let (key, mut keyspace) = db.xlock_get_key(args.key(), EMPTY)?;
    let mut value = key.write()?;
    let members = value.set_mut()?;

    let removed = members.srem(args.rest(1));
    if members.scard() == 0 {
        keyspace.del_key(key.name());
    }
    Ok(removed.into())
}

fn scard(key: &KeyHandle, _args: &Args) -> CommandResult {
    Ok(key.read()?.set()?.scard().into())
}

fn smembers(key: &KeyHandle, _args: &Args) -> CommandResult {
    Ok(key.read()?.set()?.smembers().into())
}

fn sismember(key: &KeyHandle, args: &Args) -> CommandResult {
    Ok(key.read()?.set()?.sismember(args.get(1)).into())
}

fn snapshot(db: &Database, name: &Bytes) -> CommandResult<Vec<Bytes>> {
    let key = db.get_key(name, EMPTY)?;
    let members = key.read()?.set()?.smembers();
    Ok(members)
}

fn snapshot_rest(db: &Database, args: &Args) -> CommandResult<Vec<HashSet<Bytes>>> {
    args.rest(1)
        .iter()
        .map(|name| snapshot(db, name).map(|members| members.into_iter().collect()))
        .collect()
}

fn sdiff(db: &Database, args: &Args) -> CommandResult {
    let first = snapshot(db, args.key())?;
    let rest = snapshot_rest(db, args)?;
    Ok(set::difference(first, &rest).into())
}

fn sinter(db: &Database, args: &Args) -> CommandResult {
    let first = snapshot(db, args.key())?;
    let rest = snapshot_rest(db, args)?;
    Ok(set::intersection(first, &rest).into())
}

fn sunion(db: &Database, args: &Args) -> CommandResult {
    let all = args
        .raw
        .iter()
        .map(|name| snapshot(db, name))
        .collect::<CommandResult<Vec<_>>>()?;
    Ok(set::union(all).into())
}
