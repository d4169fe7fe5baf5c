// FarmWatch — Status Evaluator

use crate::config::StatusThresholds;
use crate::events::StatusCode;

/// Classify one cycle's readings. Exactly one status is returned; when several
/// conditions hold the first in this order wins: temperature high,
/// temperature low, soil dry, soil wet.
///
/// A NaN temperature (no valid read yet) matches neither temperature alert.
pub fn evaluate(t: &StatusThresholds, temperature: f32, soil_moisture: u8) -> StatusCode {
    if temperature > t.temp_max_c {
        StatusCode::TempHigh
    } else if temperature < t.temp_min_c {
        StatusCode::TempLow
    } else if soil_moisture < t.soil_dry_min {
        StatusCode::SoilDry
    } else if soil_moisture > t.soil_wet_max {
        StatusCode::SoilWet
    } else {
        StatusCode::Ok
    }
}
