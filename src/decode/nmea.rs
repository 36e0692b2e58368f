//! NMEA 0183 decoder
//!
//! Wraps the `nmea0183` push parser and merges the sentence types a GNSS
//! receiver interleaves:
//! - **GGA**: position, fix quality, altitude, HDOP, satellite count, time
//! - **RMC**: position, speed, course, time and date
//! - **VTG**: speed and course (backup source)
//!
//! Location validity follows the most recent location-bearing sentence: a
//! no-fix GGA/RMC clears it, a fixed one sets it. The remaining fields keep
//! their last decoded value, matching receivers that stop emitting a field
//! without retracting the previous reading.

use super::FixDecoder;
use nmea0183::datetime::{Date, Time};
use nmea0183::{GPSQuality, ParseResult, Parser};

/// Knots to km/h
const KNOTS_TO_KMPH: f64 = 1.852;

/// NMEA 0183 implementation of [`FixDecoder`]
pub struct NmeaDecoder {
    parser: Parser,
    location: Option<(f64, f64)>,
    altitude: Option<f64>,
    hdop: Option<f64>,
    speed_kmph: Option<f64>,
    course: Option<f64>,
    satellites: Option<u8>,
    utc_time: Option<u32>,
    utc_date: Option<u32>,
}

impl NmeaDecoder {
    /// Create a decoder with no readings yet
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
            location: None,
            altitude: None,
            hdop: None,
            speed_kmph: None,
            course: None,
            satellites: None,
            utc_time: None,
            utc_date: None,
        }
    }

    fn apply_gga(&mut self, gga: Option<&nmea0183::GGA>) {
        // A GGA without fix data (or with quality NoFix) retracts the
        // location; scalar fields update whenever the sentence carries them.
        self.location = match gga {
            Some(gga) if !matches!(gga.gps_quality, GPSQuality::NoFix) => {
                Some((gga.latitude.as_f64(), gga.longitude.as_f64()))
            }
            _ => None,
        };

        if let Some(gga) = gga {
            self.altitude = Some(f64::from(gga.altitude.meters));
            self.hdop = Some(f64::from(gga.hdop));
            self.satellites = Some(gga.sat_in_use);
            self.utc_time = Some(pack_time(&gga.time));
        }
    }

    fn apply_rmc(&mut self, rmc: Option<&nmea0183::RMC>) {
        match rmc {
            Some(rmc) => {
                self.location = Some((rmc.latitude.as_f64(), rmc.longitude.as_f64()));
                self.speed_kmph = Some(f64::from(rmc.speed.as_knots()) * KNOTS_TO_KMPH);
                if let Some(course) = &rmc.course {
                    self.course = Some(f64::from(course.degrees));
                }
                self.utc_time = Some(pack_time(&rmc.datetime.time));
                self.utc_date = Some(pack_date(&rmc.datetime.date));
            }
            // Receiver reported no valid fix (status V)
            None => self.location = None,
        }
    }

    fn apply_vtg(&mut self, vtg: &nmea0183::VTG) {
        self.speed_kmph = Some(f64::from(vtg.speed.as_knots()) * KNOTS_TO_KMPH);
        if let Some(course) = &vtg.course {
            self.course = Some(f64::from(course.degrees));
        }
    }
}

impl Default for NmeaDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FixDecoder for NmeaDecoder {
    fn feed(&mut self, byte: u8) -> bool {
        match self.parser.parse_from_byte(byte) {
            Some(Ok(ParseResult::GGA(gga))) => {
                self.apply_gga(gga.as_ref());
                true
            }
            Some(Ok(ParseResult::RMC(rmc))) => {
                self.apply_rmc(rmc.as_ref());
                true
            }
            Some(Ok(ParseResult::VTG(vtg))) => {
                if let Some(vtg) = vtg.as_ref() {
                    self.apply_vtg(vtg);
                }
                true
            }
            // Recognized sentence carrying nothing we track
            Some(Ok(_)) => true,
            // Checksum or grammar failure: not a decodable sentence
            Some(Err(_)) => false,
            None => false,
        }
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

/// Pack a UTC time as `HHMMSSCC` (hours, minutes, seconds, centiseconds)
fn pack_time(time: &Time) -> u32 {
    let centis = (time.seconds * 100.0) as u32;
    u32::from(time.hours) * 1_000_000 + u32::from(time.minutes) * 10_000 + centis
}

/// Pack a UTC date as `DDMMYY`
fn pack_date(date: &Date) -> u32 {
    u32::from(date.day) * 10_000 + u32::from(date.month) * 100 + u32::from(date.year) % 100
}
