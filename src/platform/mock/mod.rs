//! Mock peripherals for hardware-free testing
//!
//! In-memory doubles for the UART and flash interfaces, plus a platform
//! wiring them together. Fixed-capacity buffers keep these usable from
//! `no_std` builds with the `mock` feature.

pub mod flash;
pub mod platform;
pub mod uart;

pub use flash::MockFlash;
pub use platform::MockPlatform;
pub use uart::MockUart;
