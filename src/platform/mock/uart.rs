//! Mock UART implementation for testing

use crate::platform::{
    error::UartError,
    traits::{UartConfig, UartInterface},
    Result,
};
use heapless::Vec;

/// Transmit capture capacity
const TX_CAPACITY: usize = 1024;

/// Receive injection capacity
const RX_CAPACITY: usize = 4096;

/// Mock UART implementation
///
/// Provides in-memory buffers for transmit and receive data, allowing tests
/// to verify UART traffic without hardware.
///
/// # Example
///
/// ```
/// use lastfix::platform::mock::MockUart;
/// use lastfix::platform::traits::UartInterface;
///
/// let mut uart = MockUart::new(Default::default());
///
/// uart.inject_rx_data(b"$GP");
/// assert!(uart.available());
///
/// let mut buf = [0u8; 3];
/// assert_eq!(uart.read(&mut buf).unwrap(), 3);
/// assert_eq!(&buf, b"$GP");
/// assert!(!uart.available());
/// ```
#[derive(Debug)]
pub struct MockUart {
    config: UartConfig,
    tx: Vec<u8, TX_CAPACITY>,
    rx: Vec<u8, RX_CAPACITY>,
    rx_pos: usize,
}

impl MockUart {
    /// Create a new mock UART
    pub fn new(config: UartConfig) -> Self {
        Self {
            config,
            tx: Vec::new(),
            rx: Vec::new(),
            rx_pos: 0,
        }
    }

    /// Get transmitted data (for test verification)
    pub fn tx_data(&self) -> &[u8] {
        &self.tx
    }

    /// Inject receive data (for test setup)
    pub fn inject_rx_data(&mut self, data: &[u8]) {
        self.rx
            .extend_from_slice(data)
            .expect("mock UART rx buffer overflow");
    }

    /// Get current baud rate
    pub fn baud_rate(&self) -> u32 {
        self.config.baud_rate
    }
}

impl UartInterface for MockUart {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.tx
            .extend_from_slice(data)
            .map_err(|_| UartError::WriteFailed)?;
        Ok(data.len())
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let pending = self.rx.len() - self.rx_pos;
        let to_read = core::cmp::min(buffer.len(), pending);

        buffer[..to_read].copy_from_slice(&self.rx[self.rx_pos..self.rx_pos + to_read]);
        self.rx_pos += to_read;

        Ok(to_read)
    }

    fn set_baud_rate(&mut self, baud: u32) -> Result<()> {
        self.config.baud_rate = baud;
        Ok(())
    }

    fn available(&self) -> bool {
        self.rx_pos < self.rx.len()
    }

    fn flush(&mut self) -> Result<()> {
        // Nothing buffered beyond the capture
        Ok(())
    }
}
