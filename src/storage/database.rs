//! The Keyspace
//!
//! [`Database`] maps names to [`Key`]s. The map sits behind one `RwLock`:
//!
//! - the **shared** side serves plain lookups, so commands that never
//!   create or delete keys run in parallel and contend only on per-key locks;
//! - the **exclusive** side is the structural lock. Every insert and every
//!   removal happens under it, through a [`KeyspaceGuard`].
//!
//! ## Lock Order
//!
//! ```text
//!   structural lock ──► per-key lock ──► (mutate, maybe delete) ──► release key ──► release structural
//! ```
//!
//! A command that may delete the key it mutates takes the structural lock
//! first with [`Database::xlock_get_key`] and keeps the guard until its body
//! is done. Declaring the guard before the value guard gives this order for
//! free, since locals drop in reverse.
//!
//! ## Expiry
//!
//! Lookups remove keys whose deadline has passed (fast path under the
//! shared lock, removal under the exclusive lock after a re-check), and
//! [`Database::expire`] arms a timer that removes the key at its deadline.

use super::key::{Key, KeyHandle};
use crate::error::{CommandError, CommandResult};
use crate::values::{Kind, Value};
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};
use std::time::Duration;
use tracing::debug;

/// What a lookup yields when the name is not in the keyspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultPolicy {
    /// Fail with [`CommandError::NoSuchKey`].
    NoDefault,
    /// Hand out the read-only sentinel.
    DefaultEmpty,
    /// Create the key holding an empty value of the given kind.
    ///
    /// The structural lock is released before the command body takes the
    /// key's own lock, so `EXISTS`, `TYPE` or `DBSIZE` running meanwhile can
    /// briefly observe the empty aggregate.
    CreateOnWrite(Kind),
}

type KeyMap = HashMap<Bytes, Arc<Key>>;

#[derive(Debug, Default)]
struct Shared {
    keys: RwLock<KeyMap>,
}

/// A handle to the shared keyspace. Cloning is cheap.
#[derive(Debug, Clone, Default)]
pub struct Database {
    shared: Arc<Shared>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves `name` for a single-key command.
    ///
    /// Takes the structural lock only when a key has to be created or an
    /// expired one removed.
    pub fn get_key(&self, name: &Bytes, policy: DefaultPolicy) -> CommandResult<KeyHandle> {
        // Fast path: shared lock
        {
            let keys = self.read_keys();
            match keys.get(name) {
                Some(key) if !key.is_expired() => {
                    return Ok(KeyHandle::Present(Arc::clone(key)));
                }
                None if !matches!(policy, DefaultPolicy::CreateOnWrite(_)) => {
                    return absent(name, policy);
                }
                _ => {}
            }
        }

        // Slow path: expired key to remove, or a key to create
        self.xlock().get_key(name, policy)
    }

    /// Takes the structural lock and resolves `name` under it.
    ///
    /// The returned guard must outlive any value guard taken from the handle.
    pub fn xlock_get_key(
        &self,
        name: &Bytes,
        policy: DefaultPolicy,
    ) -> CommandResult<(KeyHandle, KeyspaceGuard<'_>)> {
        let mut keyspace = self.xlock();
        let key = keyspace.get_key(name, policy)?;
        Ok((key, keyspace))
    }

    /// Takes the structural lock.
    pub fn xlock(&self) -> KeyspaceGuard<'_> {
        KeyspaceGuard {
            keys: self
                .shared
                .keys
                .write()
                .unwrap_or_else(PoisonError::into_inner),
        }
    }

    /// Sets a TTL on `key`. When it elapses, the key is removed, provided the
    /// same key object is still mapped under its name by then.
    ///
    /// Returns true if a pending TTL was replaced.
    pub fn expire(&self, key: &Arc<Key>, ttl: Duration) -> bool {
        let shared = Arc::downgrade(&self.shared);
        let target = Arc::downgrade(key);
        key.expire(ttl, move || expire_key(shared, target))
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        self.read_keys()
            .values()
            .filter(|key| !key.is_expired())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn exists(&self, name: &[u8]) -> bool {
        self.read_keys()
            .get(name)
            .is_some_and(|key| !key.is_expired())
    }

    fn read_keys(&self) -> RwLockReadGuard<'_, KeyMap> {
        self.shared
            .keys
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn absent(name: &Bytes, policy: DefaultPolicy) -> CommandResult<KeyHandle> {
    match policy {
        DefaultPolicy::NoDefault => Err(CommandError::NoSuchKey),
        _ => Ok(KeyHandle::Absent(name.clone())),
    }
}

/// Timer callback: removes `target` if it is still the mapped key and expired.
fn expire_key(shared: Weak<Shared>, target: Weak<Key>) {
    let (Some(shared), Some(target)) = (shared.upgrade(), target.upgrade()) else {
        return;
    };
    let db = Database { shared };
    let mut keyspace = db.xlock();
    keyspace.remove_if_expired(&target);
}

/// The structural lock, held.
///
/// This is the only type that can insert or delete keys.
pub struct KeyspaceGuard<'a> {
    keys: RwLockWriteGuard<'a, KeyMap>,
}

impl KeyspaceGuard<'_> {
    /// Resolves `name`, removing it first if it has expired.
    pub fn get_key(&mut self, name: &Bytes, policy: DefaultPolicy) -> CommandResult<KeyHandle> {
        self.purge_expired(name);

        if let Some(key) = self.keys.get(name) {
            return Ok(KeyHandle::Present(Arc::clone(key)));
        }

        match policy {
            DefaultPolicy::CreateOnWrite(kind) => {
                debug!(key = %String::from_utf8_lossy(name), kind = kind.name(), "Creating key");
                let key = Arc::new(Key::new(name.clone(), Value::empty(kind)));
                self.keys.insert(name.clone(), Arc::clone(&key));
                Ok(KeyHandle::Present(key))
            }
            _ => absent(name, policy),
        }
    }

    /// Removes `name` from the keyspace.
    ///
    /// Returns true if a live key was removed.
    pub fn del_key(&mut self, name: &[u8]) -> bool {
        match self.keys.remove(name) {
            Some(key) => {
                // Read the deadline before detach clears it.
                let live = !key.is_expired();
                key.detach();
                live
            }
            None => false,
        }
    }

    /// Maps `name` to a fresh key holding `value`, replacing any existing key
    /// together with its TTL.
    pub fn insert(&mut self, name: Bytes, value: Value) -> Arc<Key> {
        let key = Arc::new(Key::new(name.clone(), value));
        if let Some(old) = self.keys.insert(name, Arc::clone(&key)) {
            old.detach();
        }
        key
    }

    pub fn exists(&mut self, name: &[u8]) -> bool {
        self.purge_expired(name);
        self.keys.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.keys.values().filter(|key| !key.is_expired()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every key.
    pub fn clear(&mut self) {
        for key in self.keys.values() {
            key.detach();
        }
        self.keys.clear();
    }

    fn purge_expired(&mut self, name: &[u8]) {
        if self.keys.get(name).is_some_and(|key| key.is_expired()) {
            if let Some(key) = self.keys.remove(name) {
                debug!(key = %String::from_utf8_lossy(name), "Key expired");
                key.detach();
            }
        }
    }

    fn remove_if_expired(&mut self, target: &Arc<Key>) -> bool {
        let still_mapped = self
            .keys
            .get(target.name())
            .is_some_and(|key| Arc::ptr_eq(key, target));

        if !still_mapped || !target.is_expired() {
            return false;
        }

        self.keys.remove(target.name());
        target.detach();
        debug!(key = %String::from_utf8_lossy(target.name()), "Key expired");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::{HashOps, StringValue};
    use std::thread;

    fn name(s: &str) -> Bytes {
        Bytes::from(s.to_string())
    }

    #[test]
    fn test_policies_on_missing_key() {
        let db = Database::new();

        assert_eq!(
            db.get_key(&name("k"), DefaultPolicy::NoDefault).err(),
            Some(CommandError::NoSuchKey)
        );

        let handle = db.get_key(&name("k"), DefaultPolicy::DefaultEmpty).unwrap();
        assert!(!handle.is_present());
        assert_eq!(db.len(), 0);

        let handle = db
            .get_key(&name("k"), DefaultPolicy::CreateOnWrite(Kind::Hash))
            .unwrap();
        assert!(handle.is_present());
        assert!(db.exists(b"k"));
        assert_eq!(handle.read().unwrap().kind(), Some(Kind::Hash));
    }

    #[test]
    fn test_create_on_write_keeps_existing_kind() {
        let db = Database::new();
        db.xlock()
            .insert(name("s"), Value::String(StringValue::new("x")));

        let handle = db
            .get_key(&name("s"), DefaultPolicy::CreateOnWrite(Kind::Hash))
            .unwrap();
        assert_eq!(handle.read().unwrap().kind(), Some(Kind::String));
        assert_eq!(
            handle.write().unwrap().hash_mut().err(),
            Some(CommandError::InvalidValueType)
        );
    }

    #[test]
    fn test_del_key_detaches() {
        let db = Database::new();
        let handle = db
            .get_key(&name("k"), DefaultPolicy::CreateOnWrite(Kind::Set))
            .unwrap();

        assert!(db.xlock().del_key(b"k"));
        assert!(!db.xlock().del_key(b"k"));
        assert!(!db.exists(b"k"));
        assert_eq!(handle.read().err(), Some(CommandError::KeyDetached));
    }

    #[test]
    fn test_del_key_skips_expired_key() {
        let db = Database::new();
        let key = db.xlock().insert(name("k"), Value::empty(Kind::String));
        db.expire(&key, Duration::ZERO);

        assert!(!db.xlock().del_key(b"k"));
        assert!(key.is_detached());
        assert_eq!(db.shared.keys.read().unwrap().len(), 0);
    }

    #[test]
    fn test_insert_replaces_key_and_ttl() {
        let db = Database::new();
        let old = db.xlock().insert(name("k"), Value::empty(Kind::List));
        db.expire(&old, Duration::from_secs(60));

        let new = db.xlock().insert(name("k"), Value::empty(Kind::String));
        assert!(old.is_detached());
        assert_eq!(new.expires_at(), None);
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn test_lazy_expiry() {
        let db = Database::new();
        let key = db.xlock().insert(name("k"), Value::empty(Kind::String));
        db.expire(&key, Duration::ZERO);

        assert!(!db.exists(b"k"));
        assert_eq!(db.len(), 0);
        let handle = db.get_key(&name("k"), DefaultPolicy::DefaultEmpty).unwrap();
        assert!(!handle.is_present());
        assert!(key.is_detached());
    }

    #[test]
    fn test_xlock_get_key_holds_structural_lock() {
        let db = Database::new();
        let (handle, mut keyspace) = db
            .xlock_get_key(&name("h"), DefaultPolicy::CreateOnWrite(Kind::Hash))
            .unwrap();
        {
            let mut value = handle.write().unwrap();
            value
                .hash_mut()
                .unwrap()
                .hset(name("f"), name("v"));
        }
        assert!(keyspace.exists(b"h"));
        assert!(keyspace.del_key(b"h"));
        drop(keyspace);
        assert!(db.is_empty());
    }

    #[test]
    fn test_concurrent_hset_never_loses_an_update() {
        let db = Database::new();
        let threads: Vec<_> = (0..8)
            .map(|t| {
                let db = db.clone();
                thread::spawn(move || {
                    for i in 0..200 {
                        let handle = db
                            .get_key(&name("h"), DefaultPolicy::CreateOnWrite(Kind::Hash))
                            .unwrap();
                        handle
                            .write()
                            .unwrap()
                            .hash_mut()
                            .unwrap()
                            .hset(name(&format!("f{}-{}", t, i)), name("v"));
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        let handle = db.get_key(&name("h"), DefaultPolicy::NoDefault).unwrap();
        assert_eq!(handle.read().unwrap().hash().unwrap().hlen(), 8 * 200);
    }

    #[tokio::test]
    async fn test_timer_removes_key() {
        let db = Database::new();
        let key = db.xlock().insert(name("k"), Value::empty(Kind::String));
        db.expire(&key, Duration::from_millis(30));
        drop(key);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(db.shared.keys.read().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_timer_spares_replacement_key() {
        let db = Database::new();
        let key = db.xlock().insert(name("k"), Value::empty(Kind::String));
        db.expire(&key, Duration::from_millis(30));
        drop(key);

        // SET replaces the key before the old timer fires.
        let replacement = db.xlock().insert(name("k"), Value::empty(Kind::String));

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(db.exists(b"k"));
        assert!(!replacement.is_detached());
    }
}
