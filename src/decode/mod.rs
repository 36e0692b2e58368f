//! Sentence decoding boundary
//!
//! The position manager treats the sentence decoder as an opaque
//! collaborator: bytes go in, and after each completed sentence the decoder
//! exposes per-field readings. [`NmeaDecoder`] is the shipped NMEA 0183
//! implementation; any conforming decoder can be substituted.

pub mod nmea;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use nmea::NmeaDecoder;

#[cfg(any(test, feature = "mock"))]
pub use mock::MockDecoder;

/// Decoder boundary consumed by the ingestion loop.
///
/// Each reading is `Some(value)` while the decoder currently considers the
/// field valid and `None` otherwise. Validity is per field: a decoder may
/// report a valid altitude alongside an invalid location. Location validity
/// is re-evaluated on every location-bearing sentence, so a no-fix sentence
/// flips [`FixDecoder::location`] back to `None`.
pub trait FixDecoder {
    /// Feed one byte; returns `true` when it completed a decodable sentence.
    fn feed(&mut self, byte: u8) -> bool;

    /// Latitude and longitude in degrees.
    fn location(&self) -> Option<(f64, f64)>;

    /// Altitude in meters.
    fn altitude(&self) -> Option<f64>;

    /// Horizontal dilution of precision (unitless, lower is better).
    fn hdop(&self) -> Option<f64>;

    /// Ground speed in km/h.
    fn speed_kmph(&self) -> Option<f64>;

    /// Course over ground in degrees (0-360).
    fn course(&self) -> Option<f64>;

    /// Satellites used in the fix.
    fn satellites(&self) -> Option<u8>;

    /// UTC time packed as `HHMMSSCC`.
    fn utc_time(&self) -> Option<u32>;

    /// UTC date packed as `DDMMYY`.
    fn utc_date(&self) -> Option<u32>;
}
