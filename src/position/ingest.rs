//! Ingestion pipeline
//!
//! Opens the serial link carrying NMEA traffic and runs the single writer
//! that feeds the position manager: drain whatever bytes are pending, push
//! them through the decoder, refresh once per completed sentence, idle
//! briefly, repeat.

use super::manager::PositionManager;
use crate::decode::FixDecoder;
use crate::platform::traits::{Platform, UartConfig, UartInterface};
use crate::platform::Result;
use crate::storage::FixStore;

/// Serial channel configuration for the position link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelConfig {
    /// Platform UART index
    pub port: u8,
    /// Baud rate in bits per second
    pub baud_rate: u32,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            port: 1,
            baud_rate: 115_200,
        }
    }
}

/// Port used when the requested one is unavailable
const FALLBACK_PORT: u8 = 0;

/// Bytes drained from the link per read
const READ_CHUNK: usize = 64;

/// Idle delay between drain cycles
#[cfg(feature = "embassy")]
const IDLE_DELAY_MS: u64 = 10;

/// Open the serial link described by `config`.
///
/// A port the platform rejects is not an error: the link silently degrades
/// to the shared fallback port, keeping the requested baud rate. Only a
/// platform that also rejects the fallback port fails.
pub fn open_link<P: Platform>(platform: &mut P, config: &ChannelConfig) -> Result<P::Uart> {
    let uart_config = UartConfig {
        baud_rate: config.baud_rate,
        ..UartConfig::default()
    };

    match platform.create_uart(config.port, uart_config) {
        Ok(uart) => Ok(uart),
        Err(_) => {
            crate::log_warn!(
                "position link: port {} unavailable, using port {}",
                config.port,
                FALLBACK_PORT
            );
            platform.create_uart(FALLBACK_PORT, uart_config)
        }
    }
}

/// The single writer feeding a [`PositionManager`]
pub struct IngestLoop<'a, U, D, S>
where
    U: UartInterface,
    D: FixDecoder,
    S: FixStore,
{
    link: U,
    decoder: D,
    manager: &'a PositionManager<S>,
}

impl<'a, U, D, S> IngestLoop<'a, U, D, S>
where
    U: UartInterface,
    D: FixDecoder,
    S: FixStore,
{
    /// Create the loop over an opened link and decoder
    pub fn new(link: U, decoder: D, manager: &'a PositionManager<S>) -> Self {
        Self {
            link,
            decoder,
            manager,
        }
    }

    /// Drain all currently available bytes through the decoder.
    ///
    /// Performs one state refresh per completed sentence and returns how
    /// many refreshes were applied. A refresh skipped because the state
    /// lock was contended is not counted; the next sentence retries.
    ///
    /// # Errors
    ///
    /// Returns an error if the link read fails; already-applied refreshes
    /// stay applied.
    pub fn poll_once(&mut self) -> Result<u32> {
        let mut refreshed = 0;
        let mut chunk = [0u8; READ_CHUNK];

        while self.link.available() {
            let count = self.link.read(&mut chunk)?;
            if count == 0 {
                break;
            }
            for &byte in &chunk[..count] {
                if self.decoder.feed(byte) && self.manager.refresh_from(&self.decoder) {
                    refreshed += 1;
                }
            }
        }
        Ok(refreshed)
    }

    /// Get mutable access to the link (tests inject traffic through this)
    pub fn link_mut(&mut self) -> &mut U {
        &mut self.link
    }

    /// Run the ingestion loop forever.
    ///
    /// Spawn this on a dedicated executor task. Link errors are logged and
    /// the loop keeps polling; it never terminates.
    #[cfg(feature = "embassy")]
    pub async fn run(mut self) -> ! {
        crate::log_info!("position link: ingestion running");
        loop {
            if self.poll_once().is_err() {
                crate::log_warn!("position link: read error, continuing");
            }
            embassy_time::Timer::after(embassy_time::Duration::from_millis(IDLE_DELAY_MS)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{MockDecoder, NmeaDecoder};
    use crate::platform::mock::{MockPlatform, MockUart};
    use crate::storage::MockStore;

    const GGA: &[u8] = b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n";

    fn started_manager() -> PositionManager<MockStore> {
        let manager = PositionManager::new(MockStore::new());
        assert!(manager.start());
        manager
    }

    #[test]
    fn open_link_uses_requested_port() {
        let mut platform = MockPlatform::new();
        let config = ChannelConfig {
            port: 1,
            baud_rate: 9600,
        };

        let uart = open_link(&mut platform, &config).unwrap();
        assert_eq!(uart.baud_rate(), 9600);
    }

    #[test]
    fn open_link_degrades_to_fallback_port() {
        let mut platform = MockPlatform::new();
        let config = ChannelConfig {
            port: 7,
            baud_rate: 38_400,
        };

        // Out-of-range port silently falls back, keeping the baud rate
        let uart = open_link(&mut platform, &config).unwrap();
        assert_eq!(uart.baud_rate(), 38_400);
    }

    #[test]
    fn poll_once_refreshes_per_sentence() {
        let manager = started_manager();
        let mut uart = MockUart::new(Default::default());
        uart.inject_rx_data(GGA);

        let mut ingest = IngestLoop::new(uart, NmeaDecoder::new(), &manager);
        assert_eq!(ingest.poll_once().unwrap(), 1);

        assert!(manager.has_fix());
        assert!((manager.latitude() - 48.1173).abs() < 1e-3);
        assert_eq!(manager.satellites(), 8);
    }

    #[test]
    fn poll_once_idle_link_is_noop() {
        let manager = started_manager();
        let uart = MockUart::new(Default::default());

        let mut ingest = IngestLoop::new(uart, NmeaDecoder::new(), &manager);
        assert_eq!(ingest.poll_once().unwrap(), 0);
        assert!(!manager.has_fix());
    }

    #[test]
    fn poll_once_drains_multiple_sentences() {
        let manager = started_manager();
        let uart = MockUart::new(Default::default());

        let mut decoder = MockDecoder::new();
        decoder.location = Some((37.421, -122.084));
        let mut ingest = IngestLoop::new(uart, decoder, &manager);

        // Three scripted sentence completions in one drain
        ingest.link_mut().inject_rx_data(b"x\ny\nz\n");
        assert_eq!(ingest.poll_once().unwrap(), 3);
        assert!(manager.has_fix());
    }
}
