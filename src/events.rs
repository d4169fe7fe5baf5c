// FarmWatch — Cycle Data & Event Types

use core::fmt;

// ---------------------------------------------------------------------------
// Raw climate reading (air temperature + humidity)
// ---------------------------------------------------------------------------
/// Either field may be NaN when the sensor produced no usable value.
#[derive(Debug, Clone, Copy)]
pub struct ClimateReading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

impl ClimateReading {
    pub const INVALID: ClimateReading = ClimateReading {
        temperature_c: f32::NAN,
        humidity_pct: f32::NAN,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// No response or a malformed frame.
    ReadFailed,
    /// Frame received but checksum mismatch.
    Checksum,
    /// Line never changed level within the protocol window.
    Timeout,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed => write!(f, "sensor read failed"),
            Self::Checksum => write!(f, "sensor checksum mismatch"),
            Self::Timeout => write!(f, "sensor timeout"),
        }
    }
}

impl std::error::Error for SensorError {}

// ---------------------------------------------------------------------------
// Status code
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusCode {
    #[default]
    Ok,
    TempHigh,
    TempLow,
    SoilDry,
    SoilWet,
}

impl StatusCode {
    /// Wire value used in the telemetry line (0-4).
    pub const fn code(self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::TempHigh => 1,
            Self::TempLow => 2,
            Self::SoilDry => 3,
            Self::SoilWet => 4,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::TempHigh => "TEMP_HIGH",
            Self::TempLow => "TEMP_LOW",
            Self::SoilDry => "SOIL_DRY",
            Self::SoilWet => "SOIL_WET",
        }
    }
}

// ---------------------------------------------------------------------------
// Cycle Snapshot
// ---------------------------------------------------------------------------
/// The complete set of values valid for one read cycle.
#[derive(Debug, Clone, Copy)]
pub struct CycleSnapshot {
    /// Last valid air temperature (°C); NaN until the first good read.
    pub temperature: f32,
    /// Last valid air humidity (%); NaN until the first good read.
    pub air_humidity: f32,
    pub soil_moisture: u8,
    pub setpoint: u8,
    pub error: i16,
    pub irrigation_active: bool,
    pub status: StatusCode,
    /// Milliseconds since boot when this cycle completed.
    pub timestamp_ms: u64,
}

impl CycleSnapshot {
    pub fn new(setpoint: u8) -> Self {
        Self {
            temperature: f32::NAN,
            air_humidity: f32::NAN,
            soil_moisture: 0,
            setpoint,
            error: 0,
            irrigation_active: false,
            status: StatusCode::Ok,
            timestamp_ms: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Actuation edges
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateEdge {
    /// OFF → ON
    Activated,
    /// ON → OFF
    Deactivated,
}

/// What one read cycle produced.
#[derive(Debug, Clone, Copy)]
pub struct CycleOutcome {
    pub output: f32,
    pub edge: Option<GateEdge>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_wire_enumeration() {
        let all = [
            StatusCode::Ok,
            StatusCode::TempHigh,
            StatusCode::TempLow,
            StatusCode::SoilDry,
            StatusCode::SoilWet,
        ];
        for (i, s) in all.iter().enumerate() {
            assert_eq!(s.code() as usize, i);
        }
    }

    #[test]
    fn fresh_snapshot_is_idle() {
        let s = CycleSnapshot::new(50);
        assert_eq!(s.setpoint, 50);
        assert!(!s.irrigation_active);
        assert!(s.temperature.is_nan());
        assert_eq!(s.status, StatusCode::Ok);
    }
}
