//! Expiry Timers
//!
//! Every key with a TTL owns one timer task. The task sleeps until the
//! deadline and then runs the key's expiry callback, which removes the key
//! from the keyspace under the structural lock.
//!
//! ## Active and Lazy Expiry
//!
//! Timers give "active" expiry: a key disappears at its deadline even if it
//! is never touched again. Keyspace lookups also check the deadline
//! ("lazy" expiry), which covers the window between the deadline and the
//! timer task being scheduled, and keys whose TTL was set outside a Tokio
//! runtime (no timer task exists for those).
//!
//! ```text
//!   EXPIRE k 10 ──► Key::expire ──► spawn_timer ──► sleep_until(deadline)
//!                        │                                   │
//!                        │ re-arm / PERSIST / delete         ▼
//!                        └──────── AbortHandle::abort    on_expire()
//! ```

use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tracing::trace;

/// Computes the deadline `ttl` from now, or `None` if it is not representable.
pub fn deadline_after(ttl: Duration) -> Option<Instant> {
    Instant::now().checked_add(ttl)
}

/// Spawns a task that runs `on_expire` once `deadline` has passed.
///
/// Returns `None` when called outside a Tokio runtime; the deadline then
/// takes effect through lazy expiry only.
pub fn spawn_timer<F>(deadline: Instant, on_expire: F) -> Option<AbortHandle>
where
    F: FnOnce() + Send + 'static,
{
    let runtime = match Handle::try_current() {
        Ok(runtime) => runtime,
        Err(_) => {
            trace!("No runtime available, expiry is lazy only");
            return None;
        }
    };

    let task = runtime.spawn(async move {
        tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
        on_expire();
    });

    Some(task.abort_handle())
}
