// FarmWatch — Board Port
//
// The hardware surface the control loop touches. The ESP32 drivers and the
// host simulator both implement it.

use crate::events::{ClimateReading, SensorError};

pub trait Board {
    /// Air temperature and humidity. Individual fields may be NaN.
    fn read_climate(&mut self) -> Result<ClimateReading, SensorError>;

    /// Raw 12-bit soil probe reading. Assumed always valid.
    fn read_soil_raw(&mut self) -> u16;

    /// Drive the irrigation relay.
    fn set_relay(&mut self, on: bool) -> anyhow::Result<()>;
}
