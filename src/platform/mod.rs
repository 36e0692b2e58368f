//! Platform abstraction layer
//!
//! This module provides hardware abstraction for the two peripherals the
//! position manager touches: the UART carrying NMEA bytes and the flash
//! backing the durable store. All platform-specific code stays behind these
//! traits.

pub mod error;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types
pub use error::{PlatformError, Result};
pub use traits::{FlashInterface, Platform, UartInterface};
