//! Scripted decoder for testing
//!
//! Tests set the readings directly and drive refreshes either through
//! [`crate::position::PositionManager::refresh_from`] or by feeding bytes:
//! a newline counts as a completed sentence, everything else accumulates.

use super::FixDecoder;

/// Scripted [`FixDecoder`] stand-in
#[derive(Debug, Default)]
pub struct MockDecoder {
    /// Latitude/longitude reading, `None` = no fix
    pub location: Option<(f64, f64)>,
    /// Altitude reading in meters
    pub altitude: Option<f64>,
    /// HDOP reading
    pub hdop: Option<f64>,
    /// Speed reading in km/h
    pub speed_kmph: Option<f64>,
    /// Course reading in degrees
    pub course: Option<f64>,
    /// Satellite count reading
    pub satellites: Option<u8>,
    /// Packed UTC time reading
    pub utc_time: Option<u32>,
    /// Packed UTC date reading
    pub utc_date: Option<u32>,
}

impl MockDecoder {
    /// Create a decoder with no readings
    pub fn new() -> Self {
        Self::default()
    }
}

impl FixDecoder for MockDecoder {
    fn feed(&mut self, byte: u8) -> bool {
        byte == b'\n'
    }

    fn location(&self) -> Option<(f64, f64)> {
        self.location
    }

    fn altitude(&self) -> Option<f64> {
        self.altitude
    }

    fn hdop(&self) -> Option<f64> {
        self.hdop
    }

    fn speed_kmph(&self) -> Option<f64> {
        self.speed_kmph
    }

    fn course(&self) -> Option<f64> {
        self.course
    }

    fn satellites(&self) -> Option<u8> {
        self.satellites
    }

    fn utc_time(&self) -> Option<u32> {
        self.utc_time
    }

    fn utc_date(&self) -> Option<u32> {
        self.utc_date
    }
}
