// FarmWatch — ESP32 Board
//
// Binds the peripheral drivers to the `Board` port used by the control loop.

pub mod dht22;
#[cfg(feature = "uplink")]
pub mod net;
pub mod oled;
pub mod relay;
pub mod soil;

use crate::board::Board;
use crate::events::{ClimateReading, SensorError};

use dht22::Dht22;
use relay::Relay;
use soil::SoilProbe;

pub struct EspBoard {
    dht: Dht22,
    soil: SoilProbe,
    relay: Relay,
}

impl EspBoard {
    pub fn new(dht: Dht22, soil: SoilProbe, relay: Relay) -> Self {
        Self { dht, soil, relay }
    }
}

impl Board for EspBoard {
    fn read_climate(&mut self) -> Result<ClimateReading, SensorError> {
        self.dht.read()
    }

    fn read_soil_raw(&mut self) -> u16 {
        self.soil.read_raw()
    }

    fn set_relay(&mut self, on: bool) -> anyhow::Result<()> {
        self.relay.set(on)
    }
}
