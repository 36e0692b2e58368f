//! Flash-backed fix store
//!
//! Persists the namespace's entries inside one flash block with CRC
//! validation.
//!
//! # Flash Block Format
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │ Magic: [u8; 4] = b"LFIX"                      │  Offset: 0
//! ├───────────────────────────────────────────────┤
//! │ Version: u32 = 1                              │  Offset: 4
//! ├───────────────────────────────────────────────┤
//! │ Namespace: [u8; 16] (null-padded)             │  Offset: 8
//! ├───────────────────────────────────────────────┤
//! │ Entry Count: u32                              │  Offset: 24
//! ├───────────────────────────────────────────────┤
//! │ Entries: [(key, value)]                       │  Offset: 28
//! │   key: [u8; 16] (null-terminated)             │
//! │   type: u8 (0=F64, 1=U32, 2=Bool)             │
//! │   value: 8/4/1 bytes little-endian            │
//! ├───────────────────────────────────────────────┤
//! │ CRC32: u32                                    │  Offset: block_size - 4
//! └───────────────────────────────────────────────┘
//! ```
//!
//! Puts write through: every put rewrites the block so the entry is durable
//! the moment the call returns. A block that fails validation (blank flash,
//! bad CRC, foreign namespace) opens as empty and gets fall back to their
//! defaults.

use super::{FixStore, StoreValue};
use crate::platform::error::PlatformError;
use crate::platform::traits::FlashInterface;
use crate::platform::Result;
use heapless::{FnvIndexMap, String};

/// Default block base address (past a 256 KB firmware region)
pub const FIX_BLOCK_BASE: u32 = 0x040000;

/// Store block size (one erase block)
const FIX_BLOCK_SIZE: u32 = 4096;

/// Magic number for store blocks
const STORE_MAGIC: [u8; 4] = *b"LFIX";

/// Store format version
const STORE_VERSION: u32 = 1;

/// Maximum key length
const KEY_LEN: usize = 16;

/// Maximum namespace length
const NAMESPACE_LEN: usize = 16;

/// Maximum number of entries
const MAX_ENTRIES: usize = 16;

impl StoreValue {
    /// Type discriminant for serialization
    fn type_id(&self) -> u8 {
        match self {
            StoreValue::F64(_) => 0,
            StoreValue::U32(_) => 1,
            StoreValue::Bool(_) => 2,
        }
    }

    /// Serialized size in bytes
    fn encoded_len(&self) -> usize {
        match self {
            StoreValue::F64(_) => 8,
            StoreValue::U32(_) => 4,
            StoreValue::Bool(_) => 1,
        }
    }

    /// Serialize into `buf`, which must be `encoded_len` bytes
    fn encode(&self, buf: &mut [u8]) {
        match self {
            StoreValue::F64(v) => buf.copy_from_slice(&v.to_le_bytes()),
            StoreValue::U32(v) => buf.copy_from_slice(&v.to_le_bytes()),
            StoreValue::Bool(v) => buf[0] = u8::from(*v),
        }
    }

    /// Deserialize a value of type `type_id` from `buf` at `offset`
    fn decode(type_id: u8, buf: &[u8], offset: &mut usize) -> Result<Self> {
        match type_id {
            0 => {
                if *offset + 8 > buf.len() {
                    return Err(PlatformError::InvalidConfig);
                }
                let bytes: [u8; 8] = buf[*offset..*offset + 8]
                    .try_into()
                    .map_err(|_| PlatformError::InvalidConfig)?;
                *offset += 8;
                Ok(StoreValue::F64(f64::from_le_bytes(bytes)))
            }
            1 => {
                if *offset + 4 > buf.len() {
                    return Err(PlatformError::InvalidConfig);
                }
                let bytes: [u8; 4] = buf[*offset..*offset + 4]
                    .try_into()
                    .map_err(|_| PlatformError::InvalidConfig)?;
                *offset += 4;
                Ok(StoreValue::U32(u32::from_le_bytes(bytes)))
            }
            2 => {
                if *offset >= buf.len() {
                    return Err(PlatformError::InvalidConfig);
                }
                let value = buf[*offset] != 0;
                *offset += 1;
                Ok(StoreValue::Bool(value))
            }
            _ => Err(PlatformError::InvalidConfig),
        }
    }
}

/// Fix store with flash persistence
pub struct FlashStore<F: FlashInterface> {
    flash: F,
    base: u32,
    namespace: String<NAMESPACE_LEN>,
    entries: FnvIndexMap<String<KEY_LEN>, StoreValue, MAX_ENTRIES>,
    opened: bool,
}

impl<F: FlashInterface> FlashStore<F> {
    /// Create a store over `flash` at the default block address
    pub fn new(flash: F) -> Self {
        Self::with_base(flash, FIX_BLOCK_BASE)
    }

    /// Create a store over `flash` with an explicit block address
    ///
    /// The address must be erase-block aligned and outside the firmware
    /// region.
    pub fn with_base(flash: F, base: u32) -> Self {
        Self {
            flash,
            base,
            namespace: String::new(),
            entries: FnvIndexMap::new(),
            opened: false,
        }
    }

    /// Consume the store and return the flash peripheral
    pub fn into_flash(self) -> F {
        self.flash
    }

    /// Load and validate the store block into `entries`
    fn load_block(&mut self) -> Result<()> {
        let mut buf = [0u8; FIX_BLOCK_SIZE as usize];
        self.flash.read(self.base, &mut buf)?;

        if buf[0..4] != STORE_MAGIC {
            return Err(PlatformError::InvalidConfig);
        }

        let version = u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
        if version != STORE_VERSION {
            return Err(PlatformError::InvalidConfig);
        }

        let mut namespace = [0u8; NAMESPACE_LEN];
        namespace[..self.namespace.len()].copy_from_slice(self.namespace.as_bytes());
        if buf[8..8 + NAMESPACE_LEN] != namespace {
            return Err(PlatformError::InvalidConfig);
        }

        let stored_crc = u32::from_le_bytes([
            buf[FIX_BLOCK_SIZE as usize - 4],
            buf[FIX_BLOCK_SIZE as usize - 3],
            buf[FIX_BLOCK_SIZE as usize - 2],
            buf[FIX_BLOCK_SIZE as usize - 1],
        ]);
        let calculated_crc = crc::Crc::<u32>::new(&crc::CRC_32_ISO_HDLC)
            .checksum(&buf[0..FIX_BLOCK_SIZE as usize - 4]);
        if stored_crc != calculated_crc {
            return Err(PlatformError::InvalidConfig);
        }

        let entry_count = u32::from_le_bytes([buf[24], buf[25], buf[26], buf[27]]) as usize;
        if entry_count > MAX_ENTRIES {
            return Err(PlatformError::InvalidConfig);
        }

        let mut offset = 28;
        for _ in 0..entry_count {
            if offset + KEY_LEN + 1 > buf.len() {
                break;
            }

            let key_bytes = &buf[offset..offset + KEY_LEN];
            let key_len = key_bytes.iter().position(|&b| b == 0).unwrap_or(KEY_LEN);
            let key_str = core::str::from_utf8(&key_bytes[..key_len])
                .map_err(|_| PlatformError::InvalidConfig)?;
            let key = String::try_from(key_str).map_err(|_| PlatformError::InvalidConfig)?;
            offset += KEY_LEN;

            let type_id = buf[offset];
            offset += 1;

            match StoreValue::decode(type_id, &buf, &mut offset) {
                Ok(value) => {
                    self.entries.insert(key, value).ok();
                }
                Err(_) => break,
            }
        }

        Ok(())
    }

    /// Rewrite the store block from `entries`
    fn persist(&mut self) -> Result<()> {
        let mut buf = [0xFFu8; FIX_BLOCK_SIZE as usize];

        buf[0..4].copy_from_slice(&STORE_MAGIC);
        buf[4..8].copy_from_slice(&STORE_VERSION.to_le_bytes());

        let mut namespace = [0u8; NAMESPACE_LEN];
        namespace[..self.namespace.len()].copy_from_slice(self.namespace.as_bytes());
        buf[8..8 + NAMESPACE_LEN].copy_from_slice(&namespace);

        buf[24..28].copy_from_slice(&(self.entries.len() as u32).to_le_bytes());

        let mut offset = 28;
        for (key, value) in &self.entries {
            let mut key_bytes = [0u8; KEY_LEN];
            key_bytes[..key.len()].copy_from_slice(key.as_bytes());
            buf[offset..offset + KEY_LEN].copy_from_slice(&key_bytes);
            offset += KEY_LEN;

            buf[offset] = value.type_id();
            offset += 1;

            value.encode(&mut buf[offset..offset + value.encoded_len()]);
            offset += value.encoded_len();
        }

        let crc = crc::Crc::<u32>::new(&crc::CRC_32_ISO_HDLC)
            .checksum(&buf[0..FIX_BLOCK_SIZE as usize - 4]);
        buf[FIX_BLOCK_SIZE as usize - 4..].copy_from_slice(&crc.to_le_bytes());

        self.flash.erase(self.base, FIX_BLOCK_SIZE)?;
        self.flash.write(self.base, &buf)?;

        Ok(())
    }

    fn get(&mut self, key: &str) -> Option<StoreValue> {
        if !self.opened {
            return None;
        }
        let key = String::<KEY_LEN>::try_from(key).ok()?;
        self.entries.get(&key).copied()
    }

    fn put(&mut self, key: &str, value: StoreValue) -> Result<()> {
        if !self.opened {
            return Err(PlatformError::InvalidConfig);
        }
        let key = String::<KEY_LEN>::try_from(key).map_err(|_| PlatformError::InvalidConfig)?;
        self.entries
            .insert(key, value)
            .map_err(|_| PlatformError::InvalidConfig)?;
        self.persist()
    }
}

impl<F: FlashInterface> FixStore for FlashStore<F> {
    fn open(&mut self, namespace: &str) -> Result<()> {
        self.namespace =
            String::try_from(namespace).map_err(|_| PlatformError::InvalidConfig)?;
        self.entries.clear();
        self.opened = true;

        if self.load_block().is_err() {
            // Blank or unusable block: open empty, gets fall back to
            // defaults until the first put rewrites the block
            self.entries.clear();
        }
        Ok(())
    }

    fn close(&mut self) {
        self.opened = false;
    }

    fn get_f64(&mut self, key: &str, default: f64) -> f64 {
        match self.get(key) {
            Some(StoreValue::F64(value)) => value,
            _ => default,
        }
    }

    fn get_u32(&mut self, key: &str, default: u32) -> u32 {
        match self.get(key) {
            Some(StoreValue::U32(value)) => value,
            _ => default,
        }
    }

    fn get_bool(&mut self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(StoreValue::Bool(value)) => value,
            _ => default,
        }
    }

    fn put_f64(&mut self, key: &str, value: f64) -> Result<()> {
        self.put(key, StoreValue::F64(value))
    }

    fn put_u32(&mut self, key: &str, value: u32) -> Result<()> {
        self.put(key, StoreValue::U32(value))
    }

    fn put_bool(&mut self, key: &str, value: bool) -> Result<()> {
        self.put(key, StoreValue::Bool(value))
    }
}
