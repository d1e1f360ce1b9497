//! Keys and Key Handles
//!
//! A [`Key`] is a named, individually lockable slot holding one [`Value`].
//! Commands reach it through a [`KeyHandle`], which is either a live key
//! or the absent-key sentinel.
//!
//! ## Locking
//!
//! `read()` takes the shared per-key lock and `write()` the exclusive one.
//! Both return RAII guards, so the lock is released on every exit path,
//! including early returns through `?`.
//!
//! ## Detached Keys
//!
//! A key that is removed from the keyspace is marked detached. A command
//! that looked the key up before the removal and only then asks for its
//! lock gets [`CommandError::KeyDetached`] instead of a value nobody can
//! observe any more. The dispatcher resolves the name again and reruns the
//! command.

use super::expiry;
use crate::error::{CommandError, CommandResult};
use crate::values::{Capabilities, CapabilitiesMut, DefaultValue, Value};
use bytes::Bytes;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};
use tokio::task::AbortHandle;

/// A pending expiration.
#[derive(Debug)]
struct Expiry {
    deadline: Instant,
    timer: Option<AbortHandle>,
}

impl Expiry {
    fn cancel(&self) {
        if let Some(timer) = &self.timer {
            timer.abort();
        }
    }
}

/// A named value with its own lock and optional TTL.
#[derive(Debug)]
pub struct Key {
    name: Bytes,
    value: RwLock<Value>,
    expiry: Mutex<Option<Expiry>>,
    detached: AtomicBool,
}

impl Key {
    pub fn new(name: Bytes, value: Value) -> Self {
        Self {
            name,
            value: RwLock::new(value),
            expiry: Mutex::new(None),
            detached: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &Bytes {
        &self.name
    }

    /// Takes the shared lock on the value.
    pub fn read(&self) -> CommandResult<RwLockReadGuard<'_, Value>> {
        let guard = self.value.read().unwrap_or_else(PoisonError::into_inner);
        if self.is_detached() {
            return Err(CommandError::KeyDetached);
        }
        Ok(guard)
    }

    /// Takes the exclusive lock on the value.
    pub fn write(&self) -> CommandResult<RwLockWriteGuard<'_, Value>> {
        let guard = self.value.write().unwrap_or_else(PoisonError::into_inner);
        if self.is_detached() {
            return Err(CommandError::KeyDetached);
        }
        Ok(guard)
    }

    /// Arms a timer that calls `on_expire` after `ttl`.
    ///
    /// Any previous timer is cancelled first. Returns true if a TTL that had
    /// not yet elapsed was replaced.
    pub fn expire<F>(&self, ttl: Duration, on_expire: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        let mut slot = self.expiry_slot();
        let replaced = slot.take().is_some_and(|old| {
            old.cancel();
            old.deadline > Instant::now()
        });

        let Some(deadline) = expiry::deadline_after(ttl) else {
            return replaced;
        };

        // The slot stays locked while the timer is spawned so a concurrent
        // abort() cannot miss it.
        let timer = expiry::spawn_timer(deadline, on_expire);
        *slot = Some(Expiry { deadline, timer });
        replaced
    }

    /// Cancels a pending expiration.
    ///
    /// Returns true only if a TTL was armed and its deadline had not passed.
    /// Safe to call after the timer fired; that case reports false.
    pub fn abort(&self) -> bool {
        match self.expiry_slot().take() {
            Some(expiry) => {
                expiry.cancel();
                expiry.deadline > Instant::now()
            }
            None => false,
        }
    }

    /// Remaining time to live, zero when none is armed.
    pub fn ttl(&self) -> Duration {
        self.expires_at()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
            .unwrap_or(Duration::ZERO)
    }

    pub fn expires_at(&self) -> Option<Instant> {
        self.expiry_slot().as_ref().map(|e| e.deadline)
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.expires_at()
            .map(|deadline| Instant::now() >= deadline)
            .unwrap_or(false)
    }

    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::Acquire)
    }

    /// Marks the key as removed from the keyspace and cancels its timer.
    /// Callers hold the structural lock.
    pub(crate) fn detach(&self) {
        self.detached.store(true, Ordering::Release);
        if let Some(expiry) = self.expiry_slot().take() {
            expiry.cancel();
        }
    }

    fn expiry_slot(&self) -> MutexGuard<'_, Option<Expiry>> {
        self.expiry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The result of resolving a key name.
#[derive(Debug, Clone)]
pub enum KeyHandle {
    Present(Arc<Key>),
    /// The name is not in the keyspace; reads see an empty value.
    Absent(Bytes),
}

impl KeyHandle {
    pub fn name(&self) -> &Bytes {
        match self {
            KeyHandle::Present(key) => key.name(),
            KeyHandle::Absent(name) => name,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, KeyHandle::Present(_))
    }

    pub fn key(&self) -> Option<&Arc<Key>> {
        match self {
            KeyHandle::Present(key) => Some(key),
            KeyHandle::Absent(_) => None,
        }
    }

    pub fn read(&self) -> CommandResult<ValueReadGuard<'_>> {
        match self {
            KeyHandle::Present(key) => key.read().map(ValueReadGuard::Held),
            KeyHandle::Absent(_) => Ok(ValueReadGuard::Absent(DefaultValue)),
        }
    }

    pub fn write(&self) -> CommandResult<ValueWriteGuard<'_>> {
        match self {
            KeyHandle::Present(key) => key.write().map(ValueWriteGuard::Held),
            KeyHandle::Absent(_) => Ok(ValueWriteGuard::Absent(DefaultValue)),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.key().map(|key| key.ttl()).unwrap_or(Duration::ZERO)
    }

    pub fn abort(&self) -> bool {
        self.key().is_some_and(|key| key.abort())
    }
}

/// Shared access to a key's value, or to the sentinel.
pub enum ValueReadGuard<'a> {
    Held(RwLockReadGuard<'a, Value>),
    Absent(DefaultValue),
}

impl Deref for ValueReadGuard<'_> {
    type Target = dyn Capabilities;

    fn deref(&self) -> &Self::Target {
        match self {
            ValueReadGuard::Held(guard) => &**guard,
            ValueReadGuard::Absent(sentinel) => sentinel,
        }
    }
}

/// Exclusive access to a key's value, or to the sentinel.
pub enum ValueWriteGuard<'a> {
    Held(RwLockWriteGuard<'a, Value>),
    Absent(DefaultValue),
}

impl Deref for ValueWriteGuard<'_> {
    type Target = dyn CapabilitiesMut;

    fn deref(&self) -> &Self::Target {
        match self {
            ValueWriteGuard::Held(guard) => &**guard,
            ValueWriteGuard::Absent(sentinel) => sentinel,
        }
    }
}

impl DerefMut for ValueWriteGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match self {
            ValueWriteGuard::Held(guard) => &mut **guard,
            ValueWriteGuard::Absent(sentinel) => sentinel,
        }
    }
}
