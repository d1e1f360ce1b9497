//! Hash values: field → value maps.

use super::HashOps;
use crate::error::CommandError;
use bytes::Bytes;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashValue {
    fields: HashMap<Bytes, Bytes>,
}

impl HashValue {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn field_str(&self, field: &[u8]) -> Option<Option<&str>> {
        self.fields.get(field).map(|v| std::str::from_utf8(v).ok())
    }
}

impl HashOps for HashValue {
    fn hdel(&mut self, fields: &[Bytes]) -> usize {
        fields
            .iter()
            .filter(|field| self.fields.remove(*field).is_some())
            .count()
    }

    fn hexists(&self, field: &[u8]) -> bool {
        self.fields.contains_key(field)
    }

    fn hget(&self, field: &[u8]) -> Option<Bytes> {
        self.fields.get(field).cloned()
    }

    fn hgetall(&self) -> Vec<Bytes> {
        let mut flat = Vec::with_capacity(self.fields.len() * 2);
        for (field, value) in &self.fields {
            flat.push(field.clone());
            flat.push(value.clone());
        }
        flat
    }

    fn hincr_by(&mut self, field: &Bytes, delta: i64) -> Result<i64, CommandError> {
        let current = match self.field_str(field) {
            None => 0,
            Some(s) => s
                .and_then(|s| s.parse::<i64>().ok())
                .ok_or(CommandError::FieldNotInteger)?,
        };
        let next = current.checked_add(delta).ok_or(CommandError::Overflow)?;
        self.fields
            .insert(field.clone(), Bytes::from(next.to_string()));
        Ok(next)
    }

    fn hincr_by_float(&mut self, field: &Bytes, delta: f64) -> Result<f64, CommandError> {
        let current = match self.field_str(field) {
            None => 0.0,
            Some(s) => s
                .and_then(|s| s.trim().parse::<f64>().ok())
                .filter(|f| f.is_finite())
                .ok_or(CommandError::FieldNotFloat)?,
        };
        let next = current + delta;
        if !next.is_finite() {
            return Err(CommandError::NanOrInfinity);
        }
        self.fields
            .insert(field.clone(), Bytes::from(next.to_string()));
        Ok(next)
    }

    fn hkeys(&self) -> Vec<Bytes> {
        self.fields.keys().cloned().collect()
    }

    fn hlen(&self) -> usize {
        self.fields.len()
    }

    fn hmget(&self, fields: &[Bytes]) -> Vec<Option<Bytes>> {
        fields.iter().map(|f| self.fields.get(f).cloned()).collect()
    }

    fn hmset(&mut self, pairs: &[Bytes]) {
        for pair in pairs.chunks_exact(2) {
            self.fields.insert(pair[0].clone(), pair[1].clone());
        }
    }

    fn hset(&mut self, field: Bytes, value: Bytes) -> bool {
        self.fields.insert(field, value).is_none()
    }

    fn hsetnx(&mut self, field: Bytes, value: Bytes) -> bool {
        match self.fields.entry(field) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        }
    }

    fn hvals(&self) -> Vec<Bytes> {
        self.fields.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b(s: &str) -> Bytes {
        Bytes::from(s.to_string())
    }

    #[test]
    fn test_hset_reports_new_fields() {
        let mut h = HashValue::default();
        assert!(h.hset(b("f"), b("v")));
        assert!(!h.hset(b("f"), b("v2")));
        assert_eq!(h.hget(b"f"), Some(b("v2")));
        assert_eq!(h.hlen(), 1);
    }

    #[test]
    fn test_hsetnx() {
        let mut h = HashValue::default();
        assert!(h.hsetnx(b("f"), b("1")));
        assert!(!h.hsetnx(b("f"), b("2")));
        assert_eq!(h.hget(b"f"), Some(b("1")));
    }

    #[test]
    fn test_hdel_counts_only_existing() {
        let mut h = HashValue::default();
        h.hmset(&[b("a"), b("1"), b("b"), b("2")]);
        assert_eq!(h.hdel(&[b("a"), b("zz"), b("a")]), 1);
        assert_eq!(h.hlen(), 1);
        assert!(!h.hexists(b"a"));
        assert!(h.hexists(b"b"));
    }

    #[test]
    fn test_hmget_preserves_order_and_gaps() {
        let mut h = HashValue::default();
        h.hmset(&[b("a"), b("1"), b("c"), b("3")]);
        assert_eq!(
            h.hmget(&[b("a"), b("b"), b("c")]),
            vec![Some(b("1")), None, Some(b("3"))]
        );
    }

    #[test]
    fn test_hgetall_pairs_fields_with_values() {
        let mut h = HashValue::default();
        h.hmset(&[b("a"), b("1"), b("b"), b("2")]);
        let flat = h.hgetall();
        let mut pairs: Vec<(Bytes, Bytes)> = flat
            .chunks_exact(2)
            .map(|p| (p[0].clone(), p[1].clone()))
            .collect();
        pairs.sort();
        assert_eq!(pairs, vec![(b("a"), b("1")), (b("b"), b("2"))]);

        let mut keys = h.hkeys();
        keys.sort();
        assert_eq!(keys, vec![b("a"), b("b")]);
        let mut vals = h.hvals();
        vals.sort();
        assert_eq!(vals, vec![b("1"), b("2")]);
    }

    #[test]
    fn test_hincr_by() {
        let mut h = HashValue::default();
        assert_eq!(h.hincr_by(&b("n"), 5), Ok(5));
        assert_eq!(h.hincr_by(&b("n"), -7), Ok(-2));
        assert_eq!(h.hget(b"n"), Some(b("-2")));

        h.hset(b("s"), b("abc"));
        assert_eq!(h.hincr_by(&b("s"), 1), Err(CommandError::FieldNotInteger));
        assert_eq!(h.hget(b"s"), Some(b("abc")));

        h.hset(b("big"), b(&i64::MAX.to_string()));
        assert_eq!(h.hincr_by(&b("big"), 1), Err(CommandError::Overflow));
    }

    #[test]
    fn test_hincr_by_float() {
        let mut h = HashValue::default();
        h.hset(b("f"), b("10.50"));
        assert_eq!(h.hincr_by_float(&b("f"), 0.1), Ok(10.6));
        assert_eq!(h.hget(b"f"), Some(b("10.6")));

        assert_eq!(h.hincr_by_float(&b("new"), 2.5), Ok(2.5));

        h.hset(b("s"), b("nope"));
        assert_eq!(
            h.hincr_by_float(&b("s"), 1.0),
            Err(CommandError::FieldNotFloat)
        );
    }
}
