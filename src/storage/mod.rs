//! Durable key-value storage boundary
//!
//! The position manager persists its last-known-good fix through this
//! namespaced store: typed puts, typed gets with caller-supplied defaults,
//! and an explicit open/close lifecycle. [`FlashStore`] is the shipped
//! flash-backed implementation.
//!
//! Unavailable or corrupt storage is not an error surface at this boundary:
//! gets fall back to their defaults and the manager logs and carries on.

pub mod flash;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use flash::FlashStore;

#[cfg(any(test, feature = "mock"))]
pub use mock::MockStore;

use crate::platform::Result;

/// Typed value held by a store entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum StoreValue {
    /// Double-precision float
    F64(f64),
    /// Unsigned 32-bit integer
    U32(u32),
    /// Boolean flag
    Bool(bool),
}

/// Durable namespaced key-value store
///
/// A store must be opened before use; gets on a closed store return their
/// defaults and puts fail. Values are typed: a get with the wrong type for
/// an existing key returns the default rather than reinterpreting bytes.
pub trait FixStore {
    /// Open the given namespace, hydrating any persisted entries.
    ///
    /// # Errors
    ///
    /// Returns an error only for unusable arguments (e.g. an oversized
    /// namespace); missing or corrupt persisted state opens as empty.
    fn open(&mut self, namespace: &str) -> Result<()>;

    /// Close the namespace; subsequent gets return defaults.
    fn close(&mut self);

    /// Read a double, or `default` when absent/mistyped/closed.
    fn get_f64(&mut self, key: &str, default: f64) -> f64;

    /// Read an unsigned integer, or `default` when absent/mistyped/closed.
    fn get_u32(&mut self, key: &str, default: u32) -> u32;

    /// Read a boolean, or `default` when absent/mistyped/closed.
    fn get_bool(&mut self, key: &str, default: bool) -> bool;

    /// Durably store a double under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed, the key does not fit, or
    /// the medium rejects the write.
    fn put_f64(&mut self, key: &str, value: f64) -> Result<()>;

    /// Durably store an unsigned integer under `key`.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`FixStore::put_f64`].
    fn put_u32(&mut self, key: &str, value: u32) -> Result<()>;

    /// Durably store a boolean under `key`.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`FixStore::put_f64`].
    fn put_bool(&mut self, key: &str, value: bool) -> Result<()>;
}
