//! Root platform trait
//!
//! Aggregates the peripheral interfaces the position manager consumes.

use super::{FlashInterface, UartConfig, UartInterface};
use crate::platform::Result;

/// Root platform trait
///
/// Platform implementations provide concrete types for each peripheral via
/// associated types, enabling compile-time dispatch.
pub trait Platform: Sized {
    /// UART peripheral type
    type Uart: UartInterface;

    /// Flash peripheral type
    type Flash: FlashInterface;

    /// Initialize the platform
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::ResourceUnavailable` if initialization fails.
    fn init() -> Result<Self>;

    /// Create a UART peripheral instance
    ///
    /// # Arguments
    ///
    /// * `uart_id` - Platform-specific UART identifier (0 for UART0, ...)
    /// * `config` - UART configuration
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::ResourceUnavailable` if the UART is already
    /// in use or the UART ID is invalid.
    fn create_uart(&mut self, uart_id: u8, config: UartConfig) -> Result<Self::Uart>;

    /// Take ownership of the flash peripheral
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::ResourceUnavailable` if flash was already
    /// taken.
    fn take_flash(&mut self) -> Result<Self::Flash>;
}
