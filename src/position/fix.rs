//! Position records
//!
//! Plain-copy records guarded by the manager's lock. Fields other than the
//! validity flags may hold stale data once validity drops; the manager's
//! accessors mask position reads accordingly.

/// Live fix state, refreshed by the ingestion loop
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LiveFix {
    /// Latitude in degrees, meaningful only while `fix_valid`
    pub latitude: f64,
    /// Longitude in degrees, meaningful only while `fix_valid`
    pub longitude: f64,
    /// Altitude in meters
    pub altitude: f64,
    /// Horizontal dilution of precision
    pub hdop: f64,
    /// Ground speed in km/h
    pub speed_kmph: f64,
    /// Course over ground in degrees (0-360)
    pub course: f64,
    /// Satellites used in the fix
    pub satellites: u8,
    /// UTC time packed as `HHMMSSCC`
    pub utc_time: u32,
    /// UTC date packed as `DDMMYY`
    pub utc_date: u32,
    /// Whether the decoder currently reports a valid location
    pub fix_valid: bool,
}

impl LiveFix {
    /// Zero-initialized, no-fix state (const for static construction)
    pub const fn init() -> Self {
        Self {
            latitude: 0.0,
            longitude: 0.0,
            altitude: 0.0,
            hdop: 0.0,
            speed_kmph: 0.0,
            course: 0.0,
            satellites: 0,
            utc_time: 0,
            utc_date: 0,
            fix_valid: false,
        }
    }
}

impl Default for LiveFix {
    fn default() -> Self {
        Self::init()
    }
}

/// Last durably saved valid fix
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LastPosition {
    /// Latitude in degrees, meaningful only while `valid`
    pub latitude: f64,
    /// Longitude in degrees, meaningful only while `valid`
    pub longitude: f64,
    /// UTC time of the saved fix, packed as `HHMMSSCC`
    pub utc_time: u32,
    /// UTC date of the saved fix, packed as `DDMMYY`
    pub utc_date: u32,
    /// Whether a save or load has produced a usable position
    pub valid: bool,
}

impl LastPosition {
    /// Invalid, zeroed state (const for static construction)
    pub const fn init() -> Self {
        Self {
            latitude: 0.0,
            longitude: 0.0,
            utc_time: 0,
            utc_date: 0,
            valid: false,
        }
    }
}

impl Default for LastPosition {
    fn default() -> Self {
        Self::init()
    }
}
