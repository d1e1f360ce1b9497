//! The missing-key sentinel.
//!
//! [`DefaultValue`] behaves like an empty value of every kind at once.
//! Reads return empty results and writes are absorbed without effect, so
//! a command body never needs a separate code path for an absent key.

use super::{
    Capabilities, CapabilitiesMut, HashOps, InsertPosition, Kind, ListOps, SetOps, StringOps,
};
use crate::error::CommandError;
use bytes::Bytes;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultValue;

impl StringOps for DefaultValue {
    fn append(&mut self, _data: &[u8]) -> usize {
        0
    }

    fn get(&self) -> Option<Bytes> {
        None
    }

    fn get_range(&self, _start: i64, _end: i64) -> Bytes {
        Bytes::new()
    }

    fn get_set(&mut self, _data: &[u8]) -> Option<Bytes> {
        None
    }

    fn set_range(&mut self, _offset: usize, _data: &[u8]) -> usize {
        0
    }

    fn strlen(&self) -> usize {
        0
    }

    fn incr_by(&mut self, _delta: i64) -> Result<i64, CommandError> {
        Ok(0)
    }

    fn incr_by_float(&mut self, _delta: f64) -> Result<f64, CommandError> {
        Ok(0.0)
    }
}

impl HashOps for DefaultValue {
    fn hdel(&mut self, _fields: &[Bytes]) -> usize {
        0
    }

    fn hexists(&self, _field: &[u8]) -> bool {
        false
    }

    fn hget(&self, _field: &[u8]) -> Option<Bytes> {
        None
    }

    fn hgetall(&self) -> Vec<Bytes> {
        Vec::new()
    }

    fn hincr_by(&mut self, _field: &Bytes, _delta: i64) -> Result<i64, CommandError> {
        Ok(0)
    }

    fn hincr_by_float(&mut self, _field: &Bytes, _delta: f64) -> Result<f64, CommandError> {
        Ok(0.0)
    }

    fn hkeys(&self) -> Vec<Bytes> {
        Vec::new()
    }

    fn hlen(&self) -> usize {
        0
    }

    fn hmget(&self, fields: &[Bytes]) -> Vec<Option<Bytes>> {
        vec![None; fields.len()]
    }

    fn hmset(&mut self, _pairs: &[Bytes]) {}

    fn hset(&mut self, _field: Bytes, _value: Bytes) -> bool {
        false
    }

    fn hsetnx(&mut self, _field: Bytes, _value: Bytes) -> bool {
        false
    }

    fn hvals(&self) -> Vec<Bytes> {
        Vec::new()
    }
}

impl ListOps for DefaultValue {
    fn lindex(&self, _index: i64) -> Option<Bytes> {
        None
    }

    fn linsert(&mut self, _position: InsertPosition, _pivot: &[u8], _value: Bytes) -> i64 {
        0
    }

    fn llen(&self) -> usize {
        0
    }

    fn lpop(&mut self) -> Option<Bytes> {
        None
    }

    fn lpush(&mut self, _values: &[Bytes]) -> usize {
        0
    }

    fn lrange(&self, _start: i64, _stop: i64) -> Vec<Bytes> {
        Vec::new()
    }

    fn lrem(&mut self, _count: i64, _value: &[u8]) -> usize {
        0
    }

    fn lset(&mut self, _index: i64, _value: Bytes) -> bool {
        false
    }

    fn ltrim(&mut self, _start: i64, _stop: i64) {}

    fn rpop(&mut self) -> Option<Bytes> {
        None
    }

    fn rpush(&mut self, _values: &[Bytes]) -> usize {
        0
    }
}

impl SetOps for DefaultValue {
    fn sadd(&mut self, _members: &[Bytes]) -> usize {
        0
    }

    fn scard(&self) -> usize {
        0
    }

    fn sismember(&self, _member: &[u8]) -> bool {
        false
    }

    fn smembers(&self) -> Vec<Bytes> {
        Vec::new()
    }

    fn srem(&mut self, _members: &[Bytes]) -> usize {
        0
    }
}

impl Capabilities for DefaultValue {
    fn kind(&self) -> Option<Kind> {
        None
    }

    fn as_string(&self) -> Option<&dyn StringOps> {
        Some(self)
    }

    fn as_hash(&self) -> Option<&dyn HashOps> {
        Some(self)
    }

    fn as_list(&self) -> Option<&dyn ListOps> {
        Some(self)
    }

    fn as_set(&self) -> Option<&dyn SetOps> {
        Some(self)
    }
}

impl CapabilitiesMut for DefaultValue {
    fn as_string_mut(&mut self) -> Option<&mut dyn StringOps> {
        Some(self)
    }

    fn as_hash_mut(&mut self) -> Option<&mut dyn HashOps> {
        Some(self)
    }

    fn as_list_mut(&mut self) -> Option<&mut dyn ListOps> {
        Some(self)
    }

    fn as_set_mut(&mut self) -> Option<&mut dyn SetOps> {
        Some(self)
    }
}
