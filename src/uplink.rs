// FarmWatch — Network Uplink
//
// Serialises cycle snapshots for an HTTP collector. Publishing happens off
// the control thread; see `tasks::uplink`.

use core::fmt::Write;

use crate::events::CycleSnapshot;

/// Something that can ship a JSON body somewhere.
pub trait Uplink {
    fn publish(&mut self, body: &str) -> anyhow::Result<()>;
}

/// Log-only uplink used on the host and when no endpoint is configured.
pub struct LogUplink;

impl Uplink for LogUplink {
    fn publish(&mut self, body: &str) -> anyhow::Result<()> {
        log::info!("uplink(LOG): {body}");
        Ok(())
    }
}

fn json_number(out: &mut String, v: f32) {
    if v.is_finite() {
        let _ = write!(out, "{v:.2}");
    } else {
        out.push_str("null");
    }
}

/// Hand-formatted JSON object for one snapshot. `timestamp_ms` is the
/// boot-relative time of the read cycle it describes.
pub fn snapshot_json(snapshot: &CycleSnapshot) -> String {
    let mut out = String::with_capacity(224);
    out.push_str("{\"temperature\":");
    json_number(&mut out, snapshot.temperature);
    out.push_str(",\"air_humidity\":");
    json_number(&mut out, snapshot.air_humidity);
    let _ = write!(
        out,
        ",\"soil_moisture\":{},\"setpoint\":{},\"error\":{},\"irrigation_active\":{},\
         \"status_code\":{},\"status\":\"{}\",\"timestamp_ms\":{}}}",
        snapshot.soil_moisture,
        snapshot.setpoint,
        snapshot.error,
        snapshot.irrigation_active,
        snapshot.status.code(),
        snapshot.status.label(),
        snapshot.timestamp_ms,
    );
    out
}
