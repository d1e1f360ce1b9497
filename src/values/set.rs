//! Set values: unordered collections of distinct members.

use super::SetOps;
use bytes::Bytes;
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetValue {
    members: HashSet<Bytes>,
}

impl SetValue {
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl<T: Into<Bytes>> FromIterator<T> for SetValue {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl SetOps for SetValue {
    fn sadd(&mut self, members: &[Bytes]) -> usize {
        members
            .iter()
            .filter(|m| self.members.insert((*m).clone()))
            .count()
    }

    fn scard(&self) -> usize {
        self.members.len()
    }

    fn sismember(&self, member: &[u8]) -> bool {
        self.members.contains(member)
    }

    fn smembers(&self) -> Vec<Bytes> {
        self.members.iter().cloned().collect()
    }

    fn srem(&mut self, members: &[Bytes]) -> usize {
        members
            .iter()
            .filter(|m| self.members.remove(*m))
            .count()
    }
}

/// Members of `first` that appear in none of `rest`.
pub fn difference(first: Vec<Bytes>, rest: &[HashSet<Bytes>]) -> Vec<Bytes> {
    first
        .into_iter()
        .filter(|m| !rest.iter().any(|other| other.contains(m)))
        .collect()
}

/// Members of `first` that appear in every one of `rest`.
pub fn intersection(first: Vec<Bytes>, rest: &[HashSet<Bytes>]) -> Vec<Bytes> {
    first
        .into_iter()
        .filter(|m| rest.iter().all(|other| other.contains(m)))
        .collect()
}

/// Every distinct member across all snapshots.
pub fn union(all: impl IntoIterator<Item = Vec<Bytes>>) -> Vec<Bytes> {
    let mut seen = HashSet::new();
    all.into_iter()
        .flatten()
        .filter(|m| seen.insert(m.clone()))
        .collect()
}
