// FarmWatch — Controller State Owner
//
// Single owner of everything that changes at runtime: the cycle snapshot,
// PID memory, gate state and counters. The control task holds the only
// instance; every component reads or mutates it through `&self`/`&mut self`.

use crate::command::{self, Command};
use crate::config::{ConfigError, ControllerConfig};
use crate::events::{ClimateReading, CycleOutcome, CycleSnapshot, GateEdge, SensorError};
use crate::gate::ActuationGate;
use crate::pid::{PidController, PidTerms};
use crate::sensor::{self, SoilCalibration};
use crate::status;
use crate::telemetry;

/// Derived counters reported by `STATS`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub uptime_ms: u64,
    pub read_cycles: u32,
    pub activations: u32,
    pub deactivations: u32,
    /// Read cycles per second of uptime.
    pub read_frequency_hz: f32,
    /// Activations per hour of uptime.
    pub activations_per_hour: f32,
}

pub struct Controller {
    config: ControllerConfig,
    calibration: SoilCalibration,
    snapshot: CycleSnapshot,
    pid: PidController,
    gate: ActuationGate,
    /// Target for the next read cycle; copied into the snapshot there.
    setpoint: u8,
    read_cycles: u32,
    activations: u32,
    deactivations: u32,
}

impl Controller {
    pub fn new(config: ControllerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            calibration: SoilCalibration::new(config.soil_raw_wet, config.soil_raw_dry),
            snapshot: CycleSnapshot::new(config.default_setpoint),
            pid: PidController::new(config.gains, config.integral_limit),
            gate: ActuationGate::new(config.activate_threshold, config.deactivate_threshold),
            setpoint: config.default_setpoint,
            read_cycles: 0,
            activations: 0,
            deactivations: 0,
            config,
        })
    }

    /// One read cycle: acquisition → status → PID → gate.
    ///
    /// The snapshot is replaced only once all stages have run, so a reader
    /// never observes a half-updated cycle.
    pub fn read_cycle(
        &mut self,
        now_ms: u64,
        climate: Result<ClimateReading, SensorError>,
        soil_raw: u16,
    ) -> CycleOutcome {
        let mut next = self.snapshot;

        if let Err(e) = &climate {
            log::warn!("Climate sensor: {e}, keeping last values");
        }
        let failed = climate.is_err();
        let acquired = sensor::merge_climate(&mut next, climate);
        if !failed && !acquired.all() {
            log::warn!(
                "Climate read incomplete (temperature:{} humidity:{})",
                acquired.temperature,
                acquired.humidity
            );
        }
        next.soil_moisture = self.calibration.moisture_percent(soil_raw);
        next.setpoint = self.setpoint;

        next.status = status::evaluate(&self.config.thresholds, next.temperature, next.soil_moisture);

        next.error = i16::from(next.setpoint) - i16::from(next.soil_moisture);
        let terms = self.pid.update(f32::from(next.error), self.config.dt_secs());

        let edge = self.gate.update(terms.output);
        match edge {
            Some(GateEdge::Activated) => {
                self.activations += 1;
                log::info!(
                    "Irrigation ON (output {:.2}, soil {}% → setpoint {}%)",
                    terms.output,
                    next.soil_moisture,
                    next.setpoint
                );
            }
            Some(GateEdge::Deactivated) => {
                self.deactivations += 1;
                log::info!(
                    "Irrigation OFF (output {:.2}, soil {}%)",
                    terms.output,
                    next.soil_moisture
                );
            }
            None => {}
        }
        next.irrigation_active = self.gate.is_on();
        next.timestamp_ms = now_ms;

        self.read_cycles += 1;
        self.snapshot = next;

        log::debug!(
            "cycle {}: soil={}% err={} P={:.2} I={:.2} D={:.2} out={:.2} status={}",
            self.read_cycles,
            next.soil_moisture,
            next.error,
            terms.proportional,
            terms.integral,
            terms.derivative,
            terms.output,
            next.status.label()
        );

        CycleOutcome {
            output: terms.output,
            edge,
        }
    }

    /// Telemetry line from the latest completed cycle.
    pub fn telemetry_line(&self, now_ms: u64) -> String {
        telemetry::line(self.config.telemetry_mode, &self.snapshot, now_ms)
    }

    pub fn telemetry_header(&self) -> String {
        telemetry::header(self.config.telemetry_mode)
    }

    /// Interpret one input line. Returns the response to write back, or
    /// `None` for lines that are not commands.
    ///
    /// Setpoint and gain changes take effect from the next read cycle.
    pub fn handle_command(&mut self, line: &str, now_ms: u64) -> Option<String> {
        let Some(parsed) = command::parse(line) else {
            log::debug!("Ignoring unrecognized input '{}'", line.trim());
            return None;
        };
        let cmd = match parsed {
            Ok(cmd) => cmd,
            Err(e) => {
                log::warn!("Rejected command '{}': {e}", line.trim());
                return Some(e.to_string());
            }
        };

        let response = match cmd {
            Command::Setpoint(sp) => {
                let old = self.setpoint;
                self.setpoint = sp;
                log::info!("Setpoint {old}% → {sp}%");
                format!("OK: setpoint set to {sp}%")
            }
            Command::Status => {
                command::status_text(
                    &self.snapshot,
                    self.setpoint,
                    &self.pid.last(),
                    self.pid.integral(),
                )
            }
            Command::Info => command::info_text(&self.config, &self.pid.gains()),
            Command::Stats => command::stats_text(&self.stats(now_ms)),
            Command::Help => command::help_text(),
            Command::Reset => {
                self.pid.reset();
                log::info!("PID memory reset");
                "OK: PID reset (integral and previous error zeroed)".to_string()
            }
            Command::Gains(None) => command::gains_text(&self.pid.gains()),
            Command::Gains(Some(gains)) => {
                self.pid.set_gains(gains);
                self.config.gains = gains;
                log::info!(
                    "PID gains Kp={} Ki={} Kd={} (memory reset)",
                    gains.kp,
                    gains.ki,
                    gains.kd
                );
                format!("OK: {}", command::gains_text(&gains))
            }
        };
        Some(response)
    }

    pub fn stats(&self, now_ms: u64) -> Stats {
        let uptime_s = now_ms as f32 / 1000.0;
        let (read_frequency_hz, activations_per_hour) = if uptime_s > 0.0 {
            (
                self.read_cycles as f32 / uptime_s,
                self.activations as f32 / uptime_s * 3600.0,
            )
        } else {
            (0.0, 0.0)
        };
        Stats {
            uptime_ms: now_ms,
            read_cycles: self.read_cycles,
            activations: self.activations,
            deactivations: self.deactivations,
            read_frequency_hz,
            activations_per_hour,
        }
    }

    /// Setpoint that the next read cycle will use.
    pub fn setpoint(&self) -> u8 {
        self.setpoint
    }

    /// Read-only view for the display and uplink collaborators.
    pub fn snapshot(&self) -> &CycleSnapshot {
        &self.snapshot
    }

    pub fn pid_terms(&self) -> PidTerms {
        self.pid.last()
    }

    pub fn pid(&self) -> &PidController {
        &self.pid
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }
}
