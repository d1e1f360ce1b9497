//! Value Types
//!
//! A key holds exactly one [`Value`]. Each kind exposes its operations
//! through a capability trait:
//!
//! | Kind   | Trait        | Backing store              |
//! |--------|--------------|----------------------------|
//! | String | [`StringOps`] | `Vec<u8>`                 |
//! | Hash   | [`HashOps`]   | `HashMap<Bytes, Bytes>`   |
//! | List   | [`ListOps`]   | `VecDeque<Bytes>`         |
//! | Set    | [`SetOps`]    | `HashSet<Bytes>`          |
//!
//! Commands never match on `Value` directly. They ask for a capability
//! (`value.hash()?`) and get [`CommandError::InvalidValueType`] when the
//! stored kind does not provide it. [`DefaultValue`] provides every
//! capability with empty results, which is what a read against a missing
//! key observes.

pub mod default;
pub mod hash;
pub mod list;
pub mod set;
pub mod string;

pub use default::DefaultValue;
pub use hash::HashValue;
pub use list::{InsertPosition, ListValue};
pub use set::SetValue;
pub use string::StringValue;

use crate::error::CommandError;
use bytes::Bytes;

/// The capability set a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    String,
    Hash,
    List,
    Set,
}

impl Kind {
    /// Name reported by the `TYPE` command.
    pub fn name(self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Hash => "hash",
            Kind::List => "list",
            Kind::Set => "set",
        }
    }
}

/// A stored value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(StringValue),
    Hash(HashValue),
    List(ListValue),
    Set(SetValue),
}

impl Value {
    /// Creates the empty value of the given kind.
    pub fn empty(kind: Kind) -> Self {
        match kind {
            Kind::String => Value::String(StringValue::default()),
            Kind::Hash => Value::Hash(HashValue::default()),
            Kind::List => Value::List(ListValue::default()),
            Kind::Set => Value::Set(SetValue::default()),
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Value::String(_) => Kind::String,
            Value::Hash(_) => Kind::Hash,
            Value::List(_) => Kind::List,
            Value::Set(_) => Kind::Set,
        }
    }
}

/// String capability.
pub trait StringOps {
    /// Appends `data` and returns the new length.
    fn append(&mut self, data: &[u8]) -> usize;
    fn get(&self) -> Option<Bytes>;
    /// Inclusive byte range with negative offsets counted from the end.
    fn get_range(&self, start: i64, end: i64) -> Bytes;
    /// Replaces the content and returns the previous one.
    fn get_set(&mut self, data: &[u8]) -> Option<Bytes>;
    /// Overwrites from `offset`, zero-padding as needed. Returns the new length.
    fn set_range(&mut self, offset: usize, data: &[u8]) -> usize;
    fn strlen(&self) -> usize;
    fn incr_by(&mut self, delta: i64) -> Result<i64, CommandError>;
    fn incr_by_float(&mut self, delta: f64) -> Result<f64, CommandError>;
}

/// Hash capability.
pub trait HashOps {
    /// Removes the listed fields and returns how many existed.
    fn hdel(&mut self, fields: &[Bytes]) -> usize;
    fn hexists(&self, field: &[u8]) -> bool;
    fn hget(&self, field: &[u8]) -> Option<Bytes>;
    /// Flattened `field, value, field, value, ...`.
    fn hgetall(&self) -> Vec<Bytes>;
    fn hincr_by(&mut self, field: &Bytes, delta: i64) -> Result<i64, CommandError>;
    fn hincr_by_float(&mut self, field: &Bytes, delta: f64) -> Result<f64, CommandError>;
    fn hkeys(&self) -> Vec<Bytes>;
    fn hlen(&self) -> usize;
    fn hmget(&self, fields: &[Bytes]) -> Vec<Option<Bytes>>;
    /// `pairs` alternates field and value; a trailing odd item is ignored.
    fn hmset(&mut self, pairs: &[Bytes]);
    /// Returns true if the field is new.
    fn hset(&mut self, field: Bytes, value: Bytes) -> bool;
    /// Sets only an absent field. Returns whether the set occurred.
    fn hsetnx(&mut self, field: Bytes, value: Bytes) -> bool;
    fn hvals(&self) -> Vec<Bytes>;
}

/// List capability.
pub trait ListOps {
    fn lindex(&self, index: i64) -> Option<Bytes>;
    /// Returns the new length, or -1 when `pivot` is not in the list.
    fn linsert(&mut self, position: InsertPosition, pivot: &[u8], value: Bytes) -> i64;
    fn llen(&self) -> usize;
    fn lpop(&mut self) -> Option<Bytes>;
    /// Pushes each value to the head in argument order. Returns the new length.
    fn lpush(&mut self, values: &[Bytes]) -> usize;
    fn lrange(&self, start: i64, stop: i64) -> Vec<Bytes>;
    /// `count > 0` removes from the head, `count < 0` from the tail, `0` removes all.
    fn lrem(&mut self, count: i64, value: &[u8]) -> usize;
    /// Returns false when the index is out of range.
    fn lset(&mut self, index: i64, value: Bytes) -> bool;
    fn ltrim(&mut self, start: i64, stop: i64);
    fn rpop(&mut self) -> Option<Bytes>;
    fn rpush(&mut self, values: &[Bytes]) -> usize;
}

/// Set capability.
pub trait SetOps {
    /// Returns the number of members that were not already present.
    fn sadd(&mut self, members: &[Bytes]) -> usize;
    fn scard(&self) -> usize;
    fn sismember(&self, member: &[u8]) -> bool;
    fn smembers(&self) -> Vec<Bytes>;
    fn srem(&mut self, members: &[Bytes]) -> usize;
}

/// Read access to whatever capabilities a value provides.
pub trait Capabilities {
    /// `None` for the missing-key sentinel.
    fn kind(&self) -> Option<Kind>;
    fn as_string(&self) -> Option<&dyn StringOps>;
    fn as_hash(&self) -> Option<&dyn HashOps>;
    fn as_list(&self) -> Option<&dyn ListOps>;
    fn as_set(&self) -> Option<&dyn SetOps>;

    fn string(&self) -> Result<&dyn StringOps, CommandError> {
        self.as_string().ok_or(CommandError::InvalidValueType)
    }

    fn hash(&self) -> Result<&dyn HashOps, CommandError> {
        self.as_hash().ok_or(CommandError::InvalidValueType)
    }

    fn list(&self) -> Result<&dyn ListOps, CommandError> {
        self.as_list().ok_or(CommandError::InvalidValueType)
    }

    fn set(&self) -> Result<&dyn SetOps, CommandError> {
        self.as_set().ok_or(CommandError::InvalidValueType)
    }
}

/// Write access to whatever capabilities a value provides.
pub trait CapabilitiesMut: Capabilities {
    fn as_string_mut(&mut self) -> Option<&mut dyn StringOps>;
    fn as_hash_mut(&mut self) -> Option<&mut dyn HashOps>;
    fn as_list_mut(&mut self) -> Option<&mut dyn ListOps>;
    fn as_set_mut(&mut self) -> Option<&mut dyn SetOps>;

    fn string_mut(&mut self) -> Result<&mut dyn StringOps, CommandError> {
        self.as_string_mut().ok_or(CommandError::InvalidValueType)
    }

    fn hash_mut(&mut self) -> Result<&mut dyn HashOps, CommandError> {
        self.as_hash_mut().ok_or(CommandError::InvalidValueType)
    }

    fn list_mut(&mut self) -> Result<&mut dyn ListOps, CommandError> {
        self.as_list_mut().ok_or(CommandError::InvalidValueType)
    }

    fn set_mut(&mut self) -> Result<&mut dyn SetOps, CommandError> {
        self.as_set_mut().ok_or(CommandError::InvalidValueType)
    }
}

impl Capabilities for Value {
    fn kind(&self) -> Option<Kind> {
        Some(Value::kind(self))
    }

    fn as_string(&self) -> Option<&dyn StringOps> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    fn as_hash(&self) -> Option<&dyn HashOps> {
        match self {
            Value::Hash(h) => Some(h),
            _ => None,
        }
    }

    fn as_list(&self) -> Option<&dyn ListOps> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    fn as_set(&self) -> Option<&dyn SetOps> {
        match self {
            Value::Set(s) => Some(s),
            _ => None,
        }
    }
}

impl CapabilitiesMut for Value {
    fn as_string_mut(&mut self) -> Option<&mut dyn StringOps> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    fn as_hash_mut(&mut self) -> Option<&mut dyn HashOps> {
        match self {
            Value::Hash(h) => Some(h),
            _ => None,
        }
    }

    fn as_list_mut(&mut self) -> Option<&mut dyn ListOps> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    fn as_set_mut(&mut self) -> Option<&mut dyn SetOps> {
        match self {
            Value::Set(s) => Some(s),
            _ => None,
        }
    }
}

/// Resolves an inclusive `[start, stop]` window over a sequence of `len`
/// items the way list commands do.
///
/// Negative indices count from the end. `start` clamps to 0 and `stop` to
/// `len - 1`. Returns `None` when the window is empty after clamping.
pub(crate) fn resolve_window(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    let len = i64::try_from(len).unwrap_or(i64::MAX);
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };

    if start >= len || stop < 0 || start > stop {
        return None;
    }
    Some((start as usize, stop as usize))
}

/// Resolves a single possibly-negative index.
pub(crate) fn resolve_index(len: usize, index: i64) -> Option<usize> {
    let len = i64::try_from(len).unwrap_or(i64::MAX);
    let index = if index < 0 { len + index } else { index };
    (0..len).contains(&index).then_some(index as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_window() {
        assert_eq!(resolve_window(0, 0, 1), None);
        assert_eq!(resolve_window(1, 0, 2), Some((0, 0)));
        assert_eq!(resolve_window(3, 1, 2), Some((1, 2)));
        assert_eq!(resolve_window(3, -3, 2), Some((0, 2)));
        assert_eq!(resolve_window(3, 1, 222), Some((1, 2)));
        assert_eq!(resolve_window(3, -123, -2), Some((0, 1)));
        assert_eq!(resolve_window(3, -123, -5), None);
        assert_eq!(resolve_window(3, 17, -1), None);
        assert_eq!(resolve_window(3, 17, -18), None);
        assert_eq!(resolve_window(3, 2, 1), None);
    }

    #[test]
    fn test_resolve_index() {
        assert_eq!(resolve_index(3, 0), Some(0));
        assert_eq!(resolve_index(3, -1), Some(2));
        assert_eq!(resolve_index(3, 3), None);
        assert_eq!(resolve_index(3, -4), None);
        assert_eq!(resolve_index(0, 0), None);
    }

    #[test]
    fn test_capability_check() {
        let value = Value::empty(Kind::List);
        assert!(value.list().is_ok());
        assert_eq!(value.hash().err(), Some(CommandError::InvalidValueType));
        assert_eq!(Capabilities::kind(&value), Some(Kind::List));
        assert_eq!(Kind::Hash.name(), "hash");
    }
}
