//! Storage Module
//!
//! The concurrent keyspace: named keys with per-key locks and TTL timers,
//! and the database that maps names to keys under a structural lock.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        Database                          │
//! │   RwLock<HashMap<Bytes, Arc<Key>>>                       │
//! │     read side:  lookups                                  │
//! │     write side: structural lock (insert / delete)        │
//! │                                                          │
//! │   ┌────────────┐ ┌────────────┐ ┌────────────┐           │
//! │   │ Key "a"    │ │ Key "b"    │ │ Key "c"    │   ...     │
//! │   │ RwLock<V>  │ │ RwLock<V>  │ │ RwLock<V>  │           │
//! │   │ TTL timer  │ │            │ │ TTL timer  │           │
//! │   └────────────┘ └────────────┘ └────────────┘           │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use redkey::storage::{Database, DefaultPolicy};
//! use redkey::values::{HashOps, Kind};
//! use bytes::Bytes;
//!
//! let db = Database::new();
//! let name = Bytes::from("user:1");
//!
//! let key = db.get_key(&name, DefaultPolicy::CreateOnWrite(Kind::Hash)).unwrap();
//! key.write().unwrap().hash_mut().unwrap().hset(Bytes::from("name"), Bytes::from("Ariz"));
//!
//! let key = db.get_key(&name, DefaultPolicy::DefaultEmpty).unwrap();
//! assert_eq!(key.read().unwrap().hash().unwrap().hget(b"name"), Some(Bytes::from("Ariz")));
//! ```

pub mod database;
pub mod expiry;
pub mod key;

pub use database::{Database, DefaultPolicy, KeyspaceGuard};
pub use key::{Key, KeyHandle, ValueReadGuard, ValueWriteGuard};
