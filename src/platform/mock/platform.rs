//! Mock platform implementation for testing

use crate::platform::{
    error::PlatformError,
    traits::{Platform, UartConfig},
    Result,
};

use super::{MockFlash, MockUart};

/// Mock platform implementation
///
/// Wires the mock peripherals together behind the [`Platform`] trait.
///
/// # Example
///
/// ```
/// use lastfix::platform::mock::MockPlatform;
/// use lastfix::platform::traits::{Platform, UartInterface};
///
/// let mut platform = MockPlatform::new();
/// let mut uart = platform.create_uart(0, Default::default()).unwrap();
/// uart.write(b"Hello").unwrap();
/// ```
#[derive(Debug, Default)]
pub struct MockPlatform {
    uart_count: u8,
    flash_taken: bool,
}

impl MockPlatform {
    /// Create a new mock platform
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of UART peripherals the mock exposes
    pub const MAX_UARTS: u8 = 2;
}

impl Platform for MockPlatform {
    type Uart = MockUart;
    type Flash = MockFlash;

    fn init() -> Result<Self> {
        Ok(Self::new())
    }

    fn create_uart(&mut self, uart_id: u8, config: UartConfig) -> Result<Self::Uart> {
        if uart_id >= Self::MAX_UARTS {
            return Err(PlatformError::ResourceUnavailable);
        }
        self.uart_count += 1;
        Ok(MockUart::new(config))
    }

    fn take_flash(&mut self) -> Result<Self::Flash> {
        if self.flash_taken {
            return Err(PlatformError::ResourceUnavailable);
        }
        self.flash_taken = true;
        Ok(MockFlash::new())
    }
}
