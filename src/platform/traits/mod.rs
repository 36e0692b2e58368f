//! Platform abstraction traits
//!
//! This module defines the traits that platform implementations must provide.

pub mod flash;
pub mod platform;
pub mod uart;

// Re-export trait interfaces
pub use flash::FlashInterface;
pub use platform::Platform;
pub use uart::{UartConfig, UartInterface, UartParity, UartStopBits};
