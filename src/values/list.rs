//! List values, stored as a deque for O(1) push/pop on both ends.

use super::{resolve_index, resolve_window, ListOps};
use bytes::Bytes;
use std::collections::VecDeque;

/// Where `LINSERT` places the new element relative to the pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    Before,
    After,
}

impl InsertPosition {
    /// Parses the `BEFORE` / `AFTER` token, case-insensitively.
    pub fn parse(token: &[u8]) -> Option<Self> {
        if token.eq_ignore_ascii_case(b"before") {
            Some(InsertPosition::Before)
        } else if token.eq_ignore_ascii_case(b"after") {
            Some(InsertPosition::After)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListValue {
    items: VecDeque<Bytes>,
}

impl ListValue {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bytes> {
        self.items.iter()
    }
}

impl<T: Into<Bytes>> FromIterator<T> for ListValue {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl ListOps for ListValue {
    fn lindex(&self, index: i64) -> Option<Bytes> {
        resolve_index(self.items.len(), index).map(|i| self.items[i].clone())
    }

    fn linsert(&mut self, position: InsertPosition, pivot: &[u8], value: Bytes) -> i64 {
        let Some(at) = self.items.iter().position(|item| item.as_ref() == pivot) else {
            return -1;
        };
        let at = match position {
            InsertPosition::Before => at,
            InsertPosition::After => at + 1,
        };
        self.items.insert(at, value);
        self.items.len() as i64
    }

    fn llen(&self) -> usize {
        self.items.len()
    }

    fn lpop(&mut self) -> Option<Bytes> {
        self.items.pop_front()
    }

    fn lpush(&mut self, values: &[Bytes]) -> usize {
        for value in values {
            self.items.push_front(value.clone());
        }
        self.items.len()
    }

    fn lrange(&self, start: i64, stop: i64) -> Vec<Bytes> {
        match resolve_window(self.items.len(), start, stop) {
            Some((start, stop)) => self.items.range(start..=stop).cloned().collect(),
            None => Vec::new(),
        }
    }

    fn lrem(&mut self, count: i64, value: &[u8]) -> usize {
        let limit = if count == 0 {
            usize::MAX
        } else {
            usize::try_from(count.unsigned_abs()).unwrap_or(usize::MAX)
        };
        let mut removed = 0usize;

        if count >= 0 {
            self.items.retain(|item| {
                if removed < limit && item.as_ref() == value {
                    removed += 1;
                    false
                } else {
                    true
                }
            });
        } else {
            let mut kept = VecDeque::with_capacity(self.items.len());
            for item in self.items.drain(..).rev() {
                if removed < limit && item.as_ref() == value {
                    removed += 1;
                } else {
                    kept.push_front(item);
                }
            }
            self.items = kept;
        }

        removed
    }

    fn lset(&mut self, index: i64, value: Bytes) -> bool {
        match resolve_index(self.items.len(), index) {
            Some(i) => {
                self.items[i] = value;
                true
            }
            None => false,
        }
    }

    fn ltrim(&mut self, start: i64, stop: i64) {
        match resolve_window(self.items.len(), start, stop) {
            Some((start, stop)) => {
                self.items.truncate(stop + 1);
                self.items.drain(..start);
            }
            None => self.items.clear(),
        }
    }

    fn rpop(&mut self) -> Option<Bytes> {
        self.items.pop_back()
    }

    fn rpush(&mut self, values: &[Bytes]) -> usize {
        self.items.extend(values.iter().cloned());
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> ListValue {
        items.iter().map(|s| Bytes::from(s.to_string())).collect()
    }

    fn items(l: &ListValue) -> Vec<String> {
        l.iter()
            .map(|b| String::from_utf8(b.to_vec()).unwrap())
            .collect()
    }

    fn strings(v: Vec<Bytes>) -> Vec<String> {
        v.into_iter()
            .map(|b| String::from_utf8(b.to_vec()).unwrap())
            .collect()
    }

    #[test]
    fn test_linsert_before() {
        let cases: &[(&[&str], &str, i64, Option<usize>)] = &[
            (&[], "", -1, None),
            (&["a"], "a", 2, Some(0)),
            (&["a"], "x", -1, None),
            (&["a", "b", "c"], "a", 4, Some(0)),
            (&["a", "b", "c"], "b", 4, Some(1)),
            (&["a", "b", "c"], "c", 4, Some(2)),
        ];
        for (i, (start, pivot, expected, at)) in cases.iter().enumerate() {
            let mut l = list(start);
            let got = l.linsert(InsertPosition::Before, pivot.as_bytes(), Bytes::from("z"));
            assert_eq!(got, *expected, "case {}", i);
            match at {
                Some(at) => assert_eq!(items(&l)[*at], "z", "case {}", i),
                None => assert_eq!(items(&l), strings(list(start).lrange(0, -1)), "case {}", i),
            }
        }
    }

    #[test]
    fn test_linsert_after() {
        let cases: &[(&[&str], &str, i64, Option<usize>)] = &[
            (&[], "", -1, None),
            (&["a"], "a", 2, Some(1)),
            (&["a"], "x", -1, None),
            (&["a", "b", "c"], "a", 4, Some(1)),
            (&["a", "b", "c"], "b", 4, Some(2)),
            (&["a", "b", "c"], "c", 4, Some(3)),
        ];
        for (i, (start, pivot, expected, at)) in cases.iter().enumerate() {
            let mut l = list(start);
            let got = l.linsert(InsertPosition::After, pivot.as_bytes(), Bytes::from("z"));
            assert_eq!(got, *expected, "case {}", i);
            if let Some(at) = at {
                assert_eq!(items(&l)[*at], "z", "case {}", i);
            }
        }
    }

    #[test]
    fn test_linsert_scenario() {
        let mut l = list(&["a", "b", "c"]);
        assert_eq!(l.linsert(InsertPosition::Before, b"b", Bytes::from("z")), 4);
        assert_eq!(items(&l), vec!["a", "z", "b", "c"]);
        assert_eq!(l.linsert(InsertPosition::Before, b"x", Bytes::from("y")), -1);
        assert_eq!(items(&l), vec!["a", "z", "b", "c"]);
    }

    #[test]
    fn test_lrange() {
        let cases: &[(&[&str], i64, i64, &[&str])] = &[
            (&[], 0, 2, &[]),
            (&["a"], 0, 2, &["a"]),
            (&["a", "b", "c"], 1, 2, &["b", "c"]),
            (&["a", "b", "c"], -3, 2, &["a", "b", "c"]),
            (&["a", "b", "c"], 1, 222, &["b", "c"]),
            (&["a", "b", "c"], -123, -2, &["a", "b"]),
            (&["a", "b", "c"], -123, -5, &[]),
            (&["a", "b", "c"], 17, -1, &[]),
            (&["a", "b", "c"], 17, -18, &[]),
        ];
        for (i, (start, from, to, expected)) in cases.iter().enumerate() {
            let got = strings(list(start).lrange(*from, *to));
            assert_eq!(got, expected.to_vec(), "case {}", i);
        }
    }

    #[test]
    fn test_lrem() {
        let cases: &[(&[&str], &str, i64, usize, &[&str])] = &[
            (&[], "", 0, 0, &[]),
            (&["a", "b", "c"], "z", 0, 0, &["a", "b", "c"]),
            (&["a", "b", "c"], "z", 2, 0, &["a", "b", "c"]),
            (&["a", "b", "c"], "z", -1, 0, &["a", "b", "c"]),
            (&["a", "z", "c", "z"], "z", 0, 2, &["a", "c"]),
            (&["a", "z", "c", "z"], "z", 1, 1, &["a", "c", "z"]),
            (&["a", "z", "c", "z"], "z", 3, 2, &["a", "c"]),
            (&["a", "z", "c", "z"], "z", -1, 1, &["a", "z", "c"]),
            (&["a", "z", "c", "z"], "z", -4, 2, &["a", "c"]),
            (&["a", "z", "c", "z"], "a", -4, 1, &["z", "c", "z"]),
        ];
        for (i, (start, value, count, removed, expected)) in cases.iter().enumerate() {
            let mut l = list(start);
            assert_eq!(l.lrem(*count, value.as_bytes()), *removed, "case {}", i);
            assert_eq!(items(&l), expected.to_vec(), "case {}", i);
        }
    }

    #[test]
    fn test_push_pop() {
        let mut l = ListValue::default();
        assert_eq!(l.lpush(&[Bytes::from("a"), Bytes::from("b")]), 2);
        assert_eq!(l.rpush(&[Bytes::from("c")]), 3);
        assert_eq!(items(&l), vec!["b", "a", "c"]);
        assert_eq!(l.lpop(), Some(Bytes::from("b")));
        assert_eq!(l.rpop(), Some(Bytes::from("c")));
        assert_eq!(l.rpop(), Some(Bytes::from("a")));
        assert_eq!(l.lpop(), None);
    }

    #[test]
    fn test_lindex_and_lset() {
        let mut l = list(&["a", "b", "c"]);
        assert_eq!(l.lindex(-1), Some(Bytes::from("c")));
        assert_eq!(l.lindex(3), None);
        assert!(l.lset(-2, Bytes::from("B")));
        assert!(!l.lset(5, Bytes::from("x")));
        assert_eq!(items(&l), vec!["a", "B", "c"]);
    }

    #[test]
    fn test_ltrim() {
        let mut l = list(&["a", "b", "c", "d"]);
        l.ltrim(1, -2);
        assert_eq!(items(&l), vec!["b", "c"]);

        let mut l = list(&["a", "b"]);
        l.ltrim(5, 10);
        assert!(l.is_empty());
    }
}
