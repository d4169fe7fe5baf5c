// FarmWatch — Sensor Acquisition
//
// Converts raw probe counts to soil moisture and folds climate readings into
// the cycle snapshot, keeping the last valid value for any field the sensor
// failed to deliver.

use crate::events::{ClimateReading, CycleSnapshot, SensorError};

/// Full-scale value of the 12-bit ADC.
pub const ADC_MAX: u16 = 4095;

/// Soil probe calibration: raw counts at saturated soil and in dry air.
///
/// The reference probe reads higher when drier, so `raw_dry > raw_wet`, but
/// the mapping also works for probes wired the other way round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoilCalibration {
    pub raw_wet: u16,
    pub raw_dry: u16,
}

impl SoilCalibration {
    pub const fn new(raw_wet: u16, raw_dry: u16) -> Self {
        Self { raw_wet, raw_dry }
    }

    /// Linear remap of a raw reading to 0-100 % moisture.
    ///
    /// Integer arithmetic truncates toward the wet end, so `raw_wet` maps to
    /// exactly 100 and `raw_dry` to exactly 0. Readings beyond either
    /// endpoint are clamped.
    pub fn moisture_percent(&self, raw: u16) -> u8 {
        let (lo, hi) = if self.raw_wet <= self.raw_dry {
            (self.raw_wet, self.raw_dry)
        } else {
            (self.raw_dry, self.raw_wet)
        };
        let span = u32::from(hi - lo);
        if span == 0 {
            return 0;
        }
        let raw = raw.clamp(lo, hi);
        let from_wet = u32::from(raw.abs_diff(self.raw_wet));
        (100 - from_wet * 100 / span) as u8
    }

    /// Inverse mapping, used by the simulator to synthesise probe counts.
    /// Whole percentages map back onto themselves exactly.
    pub fn raw_for_percent(&self, percent: f32) -> u16 {
        let span = f64::from(self.raw_wet.abs_diff(self.raw_dry));
        let dryness = (100.0 - f64::from(percent.clamp(0.0, 100.0))) / 100.0;
        let offset = (dryness * span).ceil().min(span) as u16;
        if self.raw_wet <= self.raw_dry {
            self.raw_wet + offset
        } else {
            self.raw_wet - offset
        }
    }
}

impl Default for SoilCalibration {
    fn default() -> Self {
        Self::new(crate::config::SOIL_RAW_WET, crate::config::SOIL_RAW_DRY)
    }
}

/// Which climate fields were refreshed this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acquired {
    pub temperature: bool,
    pub humidity: bool,
}

impl Acquired {
    pub const fn all(&self) -> bool {
        self.temperature && self.humidity
    }
}

/// Fold a climate read into the snapshot. Failed or NaN fields keep their
/// previous value.
pub fn merge_climate(
    snapshot: &mut CycleSnapshot,
    reading: Result<ClimateReading, SensorError>,
) -> Acquired {
    let reading = reading.unwrap_or(ClimateReading::INVALID);

    let temperature = reading.temperature_c.is_finite();
    if temperature {
        snapshot.temperature = reading.temperature_c;
    }
    let humidity = reading.humidity_pct.is_finite();
    if humidity {
        snapshot.air_humidity = reading.humidity_pct;
    }

    Acquired { temperature, humidity }
}

/// Decode a 40-bit DHT22 frame: humidity and temperature in tenths, the
/// temperature sign in the top bit, then an 8-bit additive checksum.
pub fn decode_dht22(frame: &[u8; 5]) -> Result<ClimateReading, SensorError> {
    let sum = frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != frame[4] {
        return Err(SensorError::Checksum);
    }

    let humidity = u16::from_be_bytes([frame[0], frame[1]]);
    let magnitude = u16::from_be_bytes([frame[2] & 0x7F, frame[3]]);
    let mut temperature = f32::from(magnitude) / 10.0;
    if frame[2] & 0x80 != 0 {
        temperature = -temperature;
    }

    // The sensor answers all-zero frames when the line is stuck low.
    if frame[..4] == [0; 4] {
        return Err(SensorError::ReadFailed);
    }
    Ok(ClimateReading {
        temperature_c: temperature,
        humidity_pct: f32::from(humidity) / 10.0,
    })
}
