// FarmWatch — Simulated Field
//
// Host stand-in for the ESP32 board. Soil moisture rises while the valve is
// open, dries out otherwise and loses extra water to evaporation on warm
// days. Air temperature and humidity follow a slow sinusoid with noise.

use std::fmt;

use crate::board::Board;
use crate::events::{ClimateReading, SensorError};
use crate::sensor::SoilCalibration;

/// Simulation presets selected through `SIM_SCENARIO`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Mid-range soil on a mild day. Slowly dries until the controller waters.
    Drying,
    /// Heat wave: temperature above the alarm threshold, strong evaporation.
    Hot,
    /// Saturated soil on a cool day. The controller should stay idle.
    Wet,
}

impl Scenario {
    pub fn from_str_lossy(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "hot" => Self::Hot,
            "wet" => Self::Wet,
            _ => Self::Drying,
        }
    }

    /// (initial soil %, mean air temperature °C)
    fn profile(self) -> (f32, f32) {
        match self {
            Self::Drying => (45.0, 25.0),
            Self::Hot => (40.0, 38.0),
            Self::Wet => (85.0, 20.0),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Drying => write!(f, "drying"),
            Self::Hot => write!(f, "hot"),
            Self::Wet => write!(f, "wet"),
        }
    }
}

fn uniform(lo: f32, hi: f32) -> f32 {
    lo + fastrand::f32() * (hi - lo)
}

pub struct SimulatedField {
    scenario: Scenario,
    calibration: SoilCalibration,
    /// Simulated seconds per read cycle.
    step_secs: f32,
    elapsed_secs: f32,
    soil_pct: f32,
    temperature: f32,
    valve_open: bool,
    /// Probability that a climate read comes back as NaN.
    fault_rate: f32,
}

impl SimulatedField {
    pub fn new(scenario: Scenario, calibration: SoilCalibration, step_secs: f32) -> Self {
        let (soil_pct, temperature) = scenario.profile();
        Self {
            scenario,
            calibration,
            step_secs,
            elapsed_secs: 0.0,
            soil_pct,
            temperature,
            valve_open: false,
            fault_rate: 0.0,
        }
    }

    /// Build from `SIM_SCENARIO` and `SIM_NAN_RATE`.
    pub fn from_env(calibration: SoilCalibration, step_secs: f32) -> Self {
        let scenario = std::env::var("SIM_SCENARIO")
            .map(|s| Scenario::from_str_lossy(&s))
            .unwrap_or(Scenario::Drying);
        let fault_rate = std::env::var("SIM_NAN_RATE")
            .ok()
            .and_then(|s| s.parse::<f32>().ok())
            .unwrap_or(0.0);
        Self::new(scenario, calibration, step_secs).with_fault_rate(fault_rate)
    }

    pub fn with_fault_rate(mut self, rate: f32) -> Self {
        self.fault_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    pub fn soil_pct(&self) -> f32 {
        self.soil_pct
    }

    fn step_soil(&mut self) {
        let delta = if self.valve_open {
            uniform(0.5, 2.0)
        } else {
            uniform(-1.0, -0.2)
        };
        let evaporation = (self.temperature - 25.0) * 0.1;
        self.soil_pct = (self.soil_pct + delta - evaporation).clamp(0.0, 100.0);
    }
}

impl Board for SimulatedField {
    fn read_climate(&mut self) -> Result<ClimateReading, SensorError> {
        self.elapsed_secs += self.step_secs;
        let (_, mean_temp) = self.scenario.profile();
        let phase = (self.elapsed_secs / 30.0).sin();

        self.temperature = mean_temp + 3.0 * phase + uniform(-0.5, 0.5);
        let humidity = (70.0 - 2.0 * phase + uniform(-1.0, 1.0)).clamp(30.0, 95.0);

        if self.fault_rate > 0.0 && fastrand::f32() < self.fault_rate {
            return Ok(ClimateReading::INVALID);
        }
        Ok(ClimateReading { temperature_c: self.temperature, humidity_pct: humidity })
    }

    fn read_soil_raw(&mut self) -> u16 {
        self.step_soil();
        self.calibration.raw_for_percent(self.soil_pct.round())
    }

    fn set_relay(&mut self, on: bool) -> anyhow::Result<()> {
        if on != self.valve_open {
            log::debug!("sim: valve {}", if on { "open" } else { "closed" });
        }
        self.valve_open = on;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(scenario: Scenario) -> SimulatedField {
        SimulatedField::new(scenario, SoilCalibration::default(), 5.0)
    }

    #[test]
    fn scenario_names() {
        assert_eq!(Scenario::from_str_lossy("HOT"), Scenario::Hot);
        assert_eq!(Scenario::from_str_lossy(" wet "), Scenario::Wet);
        assert_eq!(Scenario::from_str_lossy("anything"), Scenario::Drying);
        assert_eq!(Scenario::Hot.to_string(), "hot");
    }

    #[test]
    fn open_valve_wets_the_soil() {
        fastrand::seed(11);
        let mut f = field(Scenario::Drying);
        f.set_relay(true).unwrap();
        let mut last = f.soil_pct();
        for _ in 0..20 {
            f.read_climate().unwrap();
            f.read_soil_raw();
            assert!(f.soil_pct() > last);
            last = f.soil_pct();
        }
    }

    #[test]
    fn heat_dries_the_soil() {
        fastrand::seed(3);
        let mut f = field(Scenario::Hot);
        let mut last = f.soil_pct();
        for _ in 0..20 {
            f.read_climate().unwrap();
            f.read_soil_raw();
            assert!(f.soil_pct() < last || f.soil_pct() == 0.0);
            last = f.soil_pct();
        }
    }

    #[test]
    fn soil_raw_maps_back_to_percent() {
        fastrand::seed(5);
        let cal = SoilCalibration::default();
        let mut f = field(Scenario::Wet);
        f.read_climate().unwrap();
        let raw = f.read_soil_raw();
        assert_eq!(f32::from(cal.moisture_percent(raw)), f.soil_pct().round());
    }

    #[test]
    fn climate_stays_in_plausible_range() {
        fastrand::seed(9);
        let mut f = field(Scenario::Drying);
        for _ in 0..100 {
            let r = f.read_climate().unwrap();
            assert!((21.0..=29.0).contains(&r.temperature_c));
            assert!((30.0..=95.0).contains(&r.humidity_pct));
        }
    }

    #[test]
    fn fault_rate_one_always_reads_nan() {
        let mut f = field(Scenario::Drying).with_fault_rate(1.0);
        for _ in 0..5 {
            let r = f.read_climate().unwrap();
            assert!(r.temperature_c.is_nan() && r.humidity_pct.is_nan());
        }
    }
}
