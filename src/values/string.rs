//! Binary-safe string values.

use super::StringOps;
use crate::error::CommandError;
use bytes::Bytes;

/// Maximum length a string may grow to through `SETRANGE` (512 MB, same as Redis).
pub const MAX_STRING_LEN: usize = 512 * 1024 * 1024;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringValue {
    data: Vec<u8>,
}

impl StringValue {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Freshly created keys hold an empty string, which counts as zero.
    fn parse_integer(&self) -> Option<i64> {
        if self.data.is_empty() {
            return Some(0);
        }
        std::str::from_utf8(&self.data).ok()?.parse().ok()
    }

    fn parse_float(&self) -> Option<f64> {
        if self.data.is_empty() {
            return Some(0.0);
        }
        let f: f64 = std::str::from_utf8(&self.data).ok()?.trim().parse().ok()?;
        f.is_finite().then_some(f)
    }
}

impl StringOps for StringValue {
    fn append(&mut self, data: &[u8]) -> usize {
        self.data.extend_from_slice(data);
        self.data.len()
    }

    fn get(&self) -> Option<Bytes> {
        Some(Bytes::copy_from_slice(&self.data))
    }

    fn get_range(&self, start: i64, end: i64) -> Bytes {
        let len = i64::try_from(self.data.len()).unwrap_or(i64::MAX);
        if len == 0 {
            return Bytes::new();
        }

        let start = if start < 0 { (len + start).max(0) } else { start };
        let end = if end < 0 { (len + end).max(0) } else { end.min(len - 1) };

        if start > end || start >= len {
            return Bytes::new();
        }
        Bytes::copy_from_slice(&self.data[start as usize..=end as usize])
    }

    fn get_set(&mut self, data: &[u8]) -> Option<Bytes> {
        let old = Bytes::from(std::mem::replace(&mut self.data, data.to_vec()));
        Some(old)
    }

    fn set_range(&mut self, offset: usize, data: &[u8]) -> usize {
        if data.is_empty() {
            return self.data.len();
        }
        let end = offset + data.len();
        if self.data.len() < end {
            self.data.resize(end, 0);
        }
        self.data[offset..end].copy_from_slice(data);
        self.data.len()
    }

    fn strlen(&self) -> usize {
        self.data.len()
    }

    fn incr_by(&mut self, delta: i64) -> Result<i64, CommandError> {
        let current = self.parse_integer().ok_or(CommandError::NotAnInteger)?;
        let next = current.checked_add(delta).ok_or(CommandError::Overflow)?;
        self.data = next.to_string().into_bytes();
        Ok(next)
    }

    fn incr_by_float(&mut self, delta: f64) -> Result<f64, CommandError> {
        let current = self.parse_float().ok_or(CommandError::NotAFloat)?;
        let next = current + delta;
        if !next.is_finite() {
            return Err(CommandError::NanOrInfinity);
        }
        self.data = next.to_string().into_bytes();
        Ok(next)
    }
}
