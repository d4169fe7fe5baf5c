//! FarmWatch: soil-moisture irrigation controller.
//!
//! Everything that does not touch a peripheral lives here and builds for the
//! host as well as the ESP32: sensor conversion, status evaluation, the PID
//! loop and its hysteresis gate, the serial command protocol, telemetry
//! formatting and the cooperative control loop. Hardware sits behind the
//! [`board::Board`] trait; the ESP-IDF implementation is in `drivers`, a
//! simulated field for desktop runs is in `sim`.

pub mod board;
pub mod command;
pub mod config;
pub mod controller;
pub mod display;
pub mod events;
pub mod gate;
pub mod pid;
pub mod schedule;
pub mod sensor;
pub mod status;
pub mod tasks;
pub mod telemetry;
pub mod uplink;

#[cfg(target_os = "espidf")]
pub mod drivers;

#[cfg(not(target_os = "espidf"))]
pub mod sim;
