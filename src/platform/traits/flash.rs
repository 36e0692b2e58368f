//! Flash interface trait
//!
//! Defines the storage medium behind the durable position store. Flash is
//! organized in erase blocks; the store keeps its record inside one block.

use crate::platform::Result;

/// Flash interface trait
///
/// Platform implementations must provide this interface for flash
/// read/write/erase operations.
///
/// # Flash Characteristics
///
/// - Flash is organized in blocks (typically 4 KB)
/// - Erase operations set all bytes to 0xFF
/// - Write operations can only change bits from 1 to 0 (erase first)
/// - Erase/write can take 100 ms+ and must stay off the ingestion path
///
/// # Safety Invariants
///
/// - Flash peripheral must be initialized before use
/// - Only one owner per flash instance (no concurrent access)
/// - Must not erase/write the firmware region (implementations must
///   validate addresses)
pub trait FlashInterface {
    /// Read data from flash
    ///
    /// Reads `buf.len()` bytes from flash starting at `address`.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Flash(FlashError::InvalidAddress)` if the
    /// range is out of bounds, `FlashError::ReadFailed` if the read fails.
    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<()>;

    /// Write data to flash
    ///
    /// The target region must have been erased first; writing can only
    /// clear bits.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Flash(FlashError::InvalidAddress)` if the
    /// address is in the firmware region, `FlashError::WriteFailed` if the
    /// write fails.
    fn write(&mut self, address: u32, data: &[u8]) -> Result<()>;

    /// Erase a flash region
    ///
    /// Sets all bytes in the region to 0xFF. `address` must be
    /// block-aligned and `size` a multiple of the block size.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Flash(FlashError::InvalidAddress)` on
    /// misalignment or a protected region, `FlashError::EraseFailed` if the
    /// erase fails.
    fn erase(&mut self, address: u32, size: u32) -> Result<()>;

    /// Get the minimum erasable unit size in bytes.
    fn block_size(&self) -> u32;

    /// Get the total flash capacity in bytes.
    fn capacity(&self) -> u32;
}
