//! Bounded-acquisition mutual exclusion
//!
//! [`TimedMutex`] serializes access to the shared position records. Unlike a
//! blocking mutex, acquisition is bounded: after [`ACQUIRE_SPIN_BUDGET`]
//! failed attempts [`TimedMutex::lock`] returns `None` and the caller
//! degrades (accessors return their neutral value, mutating operations
//! report `false`). No caller ever blocks without bound on this lock.
//!
//! The guard releases the lock on drop. Critical sections must stay short;
//! in particular the update callback runs inside one and must not call back
//! into the owning manager.

use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, Ordering};

/// Acquisition attempts before `lock` gives up.
///
/// Stands in for a wall-clock lock timeout: critical sections under this
/// lock are a handful of field copies, so a holder releases within far
/// fewer iterations unless it is descheduled mid-section.
pub const ACQUIRE_SPIN_BUDGET: u32 = 10_000;

/// Mutual exclusion with bounded acquisition.
pub struct TimedMutex<T> {
    locked: AtomicBool,
    value: UnsafeCell<T>,
}

// SAFETY: access to `value` is serialized by `locked`; the guard hands out
// a unique reference only while the flag is held.
unsafe impl<T: Send> Sync for TimedMutex<T> {}

impl<T> TimedMutex<T> {
    /// Create a new unlocked mutex owning `value`.
    pub const fn new(value: T) -> Self {
        Self {
            locked: AtomicBool::new(false),
            value: UnsafeCell::new(value),
        }
    }

    /// Acquire the lock within the spin budget.
    ///
    /// Returns `None` when the budget is exhausted; the protected section
    /// was not entered and the caller must treat the call as a no-op.
    pub fn lock(&self) -> Option<LockGuard<'_, T>> {
        let mut attempts: u32 = 0;
        loop {
            if self
                .locked
                .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
            {
                return Some(LockGuard { mutex: self });
            }
            attempts += 1;
            if attempts >= ACQUIRE_SPIN_BUDGET {
                return None;
            }
            core::hint::spin_loop();
        }
    }

    /// Consume the mutex and return the protected value.
    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }
}

/// Scoped access to the value behind a [`TimedMutex`].
pub struct LockGuard<'a, T> {
    mutex: &'a TimedMutex<T>,
}

impl<T> Deref for LockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: the guard's existence proves exclusive acquisition.
        unsafe { &*self.mutex.value.get() }
    }
}

impl<T> DerefMut for LockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: the guard's existence proves exclusive acquisition.
        unsafe { &mut *self.mutex.value.get() }
    }
}

impl<T> Drop for LockGuard<'_, T> {
    fn drop(&mut self) {
        self.mutex.locked.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_grants_exclusive_access() {
        let mutex = TimedMutex::new(7u32);

        {
            let mut guard = mutex.lock().expect("uncontended lock");
            *guard += 1;
        }

        let guard = mutex.lock().expect("released after drop");
        assert_eq!(*guard, 8);
    }

    #[test]
    fn held_lock_exhausts_budget() {
        let mutex = TimedMutex::new(0u32);

        let _guard = mutex.lock().expect("uncontended lock");
        assert!(mutex.lock().is_none());
    }

    #[test]
    fn into_inner_returns_value() {
        let mutex = TimedMutex::new(41u32);
        assert_eq!(mutex.into_inner(), 41);
    }

    #[test]
    fn concurrent_increments_serialize() {
        let mutex = TimedMutex::new(0u32);

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..1000 {
                        loop {
                            if let Some(mut guard) = mutex.lock() {
                                *guard += 1;
                                break;
                            }
                        }
                    }
                });
            }
        });

        assert_eq!(*mutex.lock().unwrap(), 4000);
    }
}
