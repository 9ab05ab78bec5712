//! Named, refcounted locks for serialising work on the same logical key.
//!
//! A [`NamedLockPool`] hands out at most one [`NamedLockGuard`] per key at a
//! time. Callers contending for the same key queue on that key's condition
//! variable, while callers using different keys never wait on each other.
//! Each key's slot lives only while someone holds or waits for it, so the
//! pool does not grow with the number of keys ever seen.
//!
//! # Examples
//!
//! ```
//! use cellmark_sync::NamedLockPool;
//!
//! let pool = NamedLockPool::new();
//! let total = pool.with_lock("8FVC9G8F+6X", || 40 + 2);
//! assert_eq!(total, 42);
//! assert!(pool.is_empty());
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;

pub use error::LockPoolError;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Book-keeping for one key: how many callers hold or wait for it, and
/// whether one of them currently owns it.
#[derive(Debug, Default)]
struct Slot {
    refs: usize,
    held: bool,
    released: Arc<Condvar>,
}

type Slots = HashMap<String, Slot>;

/// Pool of per-key mutual-exclusion locks.
///
/// All slot creation, refcounting, and removal happens under one mutex, so
/// a slot is never removed while another caller is about to wait on it.
/// Acquiring a key that the current thread already holds deadlocks; the
/// pool does not detect re-entrant use.
#[derive(Debug, Default)]
pub struct NamedLockPool {
    slots: Mutex<Slots>,
}

impl NamedLockPool {
    /// Create an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until the lock for `key` is free, then take it.
    ///
    /// The lock is released when the returned guard is dropped or
    /// explicitly [released](NamedLockGuard::release).
    pub fn acquire(&self, key: &str) -> NamedLockGuard<'_> {
        let mut slots = self.slots.lock();
        let released = enter(&mut slots, key);
        while !take(&mut slots, key) {
            released.wait(&mut slots);
        }
        NamedLockGuard::new(self, key)
    }

    /// Take the lock for `key`, waiting at most `timeout`.
    ///
    /// # Errors
    /// Returns [`LockPoolError::Timeout`] when the lock stays busy for the
    /// whole wait. The caller's claim on the slot is dropped first, so a
    /// timed-out caller leaves no trace in the pool.
    pub fn try_acquire_for(
        &self,
        key: &str,
        timeout: Duration,
    ) -> Result<NamedLockGuard<'_>, LockPoolError> {
        let started = Instant::now();
        let Some(deadline) = started.checked_add(timeout) else {
            return Ok(self.acquire(key));
        };
        let mut slots = self.slots.lock();
        let released = enter(&mut slots, key);
        loop {
            if take(&mut slots, key) {
                break;
            }
            if released.wait_until(&mut slots, deadline).timed_out() {
                // The holder may have released right at the deadline.
                if take(&mut slots, key) {
                    break;
                }
                leave(&mut slots, key);
                log::debug!("gave up waiting for lock {key:?}");
                return Err(LockPoolError::Timeout {
                    key: key.to_owned(),
                    waited: started.elapsed(),
                });
            }
        }
        Ok(NamedLockGuard::new(self, key))
    }

    /// Run `action` while holding the lock for `key`.
    ///
    /// The lock is released exactly once on every exit path, including
    /// when `action` panics.
    pub fn with_lock<R>(&self, key: &str, action: impl FnOnce() -> R) -> R {
        let _guard = self.acquire(key);
        action()
    }

    /// Number of keys currently held or waited on.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    /// Report whether no key is held or waited on.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }

    /// Report whether `key` has a live slot.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.slots.lock().contains_key(key)
    }

    /// Number of callers holding or waiting for `key`.
    #[must_use]
    pub fn ref_count(&self, key: &str) -> usize {
        self.slots.lock().get(key).map_or(0, |slot| slot.refs)
    }

    fn release(&self, key: &str) -> Result<(), LockPoolError> {
        let mut slots = self.slots.lock();
        let Some(slot) = slots.get_mut(key).filter(|slot| slot.held) else {
            return Err(LockPoolError::NotHeld {
                key: key.to_owned(),
            });
        };
        slot.held = false;
        slot.released.notify_one();
        leave(&mut slots, key);
        Ok(())
    }
}

/// Register interest in `key`, creating its slot on first use.
fn enter(slots: &mut Slots, key: &str) -> Arc<Condvar> {
    let slot = slots.entry(key.to_owned()).or_insert_with(|| {
        log::debug!("creating lock slot {key:?}");
        Slot::default()
    });
    slot.refs = slot.refs.saturating_add(1);
    Arc::clone(&slot.released)
}

/// Claim the slot for `key` if nobody holds it.
fn take(slots: &mut Slots, key: &str) -> bool {
    slots.get_mut(key).is_some_and(|slot| {
        let free = !slot.held;
        slot.held = true;
        free
    })
}

/// Drop one claim on `key`, removing the slot with the last one.
fn leave(slots: &mut Slots, key: &str) {
    if let Some(slot) = slots.get_mut(key) {
        slot.refs = slot.refs.saturating_sub(1);
        if slot.refs == 0 {
            slots.remove(key);
            log::debug!("removed lock slot {key:?}");
        }
    }
}

/// Exclusive lease on one key of a [`NamedLockPool`].
#[derive(Debug)]
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct NamedLockGuard<'pool> {
    pool: &'pool NamedLockPool,
    key: String,
    released: bool,
}

impl<'pool> NamedLockGuard<'pool> {
    fn new(pool: &'pool NamedLockPool, key: &str) -> Self {
        Self {
            pool,
            key: key.to_owned(),
            released: false,
        }
    }

    /// Key this guard holds.
    #[must_use]
    pub const fn key(&self) -> &str {
        self.key.as_str()
    }

    /// Release the lock now.
    ///
    /// # Errors
    /// Returns [`LockPoolError::NotHeld`] if the pool no longer records the
    /// key as held.
    pub fn release(mut self) -> Result<(), LockPoolError> {
        self.released = true;
        self.pool.release(&self.key)
    }
}

impl Drop for NamedLockGuard<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(err) = self.pool.release(&self.key) {
            log::error!("failed to release lock {:?}: {err}", self.key);
        }
    }
}
