// FarmWatch — Telemetry Emitter
//
// One CSV line per emission:
//   <elapsed_s>,<temp>,<air_hum>,<soil>,<setpoint>,<error>,<irrigation 0|1>,<status 0-4>
// The elapsed column is dropped in bare (plotter) mode.

use core::fmt::Write;

use crate::config::TelemetryMode;
use crate::events::CycleSnapshot;

const COLUMNS: &str = "temperature,air_humidity,soil_moisture,setpoint,error,irrigation,status";

/// Column header printed once at boot.
pub fn header(mode: TelemetryMode) -> String {
    match mode {
        TelemetryMode::Timestamped => format!("elapsed_s,{COLUMNS}"),
        TelemetryMode::Bare => COLUMNS.to_string(),
    }
}

/// Format the latest completed snapshot. `now_ms` is the emission time, so
/// repeated emissions of one snapshot still advance the elapsed column.
pub fn line(mode: TelemetryMode, snapshot: &CycleSnapshot, now_ms: u64) -> String {
    let mut out = String::with_capacity(64);
    if mode == TelemetryMode::Timestamped {
        let _ = write!(out, "{:.1},", now_ms as f64 / 1000.0);
    }
    let _ = write!(
        out,
        "{:.2},{:.2},{},{},{},{},{}",
        snapshot.temperature,
        snapshot.air_humidity,
        snapshot.soil_moisture,
        snapshot.setpoint,
        snapshot.error,
        u8::from(snapshot.irrigation_active),
        snapshot.status.code(),
    );
    out
}
