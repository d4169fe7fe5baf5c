// End-to-end scenarios through the public controller and control-loop API.

use std::collections::VecDeque;
use std::sync::mpsc::{self, Sender};

use farmwatch::board::Board;
use farmwatch::config::{ControllerConfig, TelemetryMode, INTEGRAL_LIMIT, READ_INTERVAL_MS};
use farmwatch::controller::Controller;
use farmwatch::events::{ClimateReading, GateEdge, SensorError, StatusCode};
use farmwatch::sensor::SoilCalibration;
use farmwatch::tasks::control::ControlLoop;

fn config() -> ControllerConfig {
    ControllerConfig {
        telemetry_mode: TelemetryMode::Timestamped,
        ..Default::default()
    }
}

fn raw(pct: u8) -> u16 {
    SoilCalibration::default().raw_for_percent(f32::from(pct))
}

fn climate(t: f32, h: f32) -> Result<ClimateReading, SensorError> {
    Ok(ClimateReading { temperature_c: t, humidity_pct: h })
}

/// Plays back one (climate, soil %) pair per read cycle; repeats the last
/// entry once the script runs out.
struct ScriptedBoard {
    script: VecDeque<(Result<ClimateReading, SensorError>, u8)>,
    current: (Result<ClimateReading, SensorError>, u8),
    relay_writes: Vec<bool>,
}

impl ScriptedBoard {
    fn new(script: Vec<(Result<ClimateReading, SensorError>, u8)>) -> Self {
        let mut script: VecDeque<_> = script.into();
        let current = script.pop_front().unwrap_or((climate(25.0, 60.0), 50));
        Self { script, current, relay_writes: Vec::new() }
    }
}

impl Board for ScriptedBoard {
    fn read_climate(&mut self) -> Result<ClimateReading, SensorError> {
        self.current.0
    }

    fn read_soil_raw(&mut self) -> u16 {
        let pct = self.current.1;
        if let Some(next) = self.script.pop_front() {
            self.current = next;
        }
        raw(pct)
    }

    fn set_relay(&mut self, on: bool) -> anyhow::Result<()> {
        self.relay_writes.push(on);
        Ok(())
    }
}

fn control_loop(
    script: Vec<(Result<ClimateReading, SensorError>, u8)>,
) -> (ControlLoop<ScriptedBoard, Vec<u8>>, Sender<String>) {
    let (tx, rx) = mpsc::channel();
    let controller = Controller::new(config()).unwrap();
    let mut lp = ControlLoop::new(controller, ScriptedBoard::new(script), Vec::new(), rx);
    lp.start();
    (lp, tx)
}

fn output(lp: &ControlLoop<ScriptedBoard, Vec<u8>>) -> String {
    String::from_utf8(lp.output().clone()).unwrap()
}

#[test]
fn small_error_stays_below_activation() {
    let mut c = Controller::new(config()).unwrap();
    let out = c.read_cycle(0, climate(24.0, 60.0), raw(45));

    assert_eq!(c.snapshot().error, 5);
    assert!((c.pid_terms().proportional - 2.5).abs() < 1e-4);
    assert!(out.output < 10.0);
    assert_eq!(out.edge, None);
    assert!(!c.snapshot().irrigation_active);
}

#[test]
fn raised_setpoint_activates_irrigation_with_an_edge() {
    let mut c = Controller::new(config()).unwrap();
    c.read_cycle(0, climate(24.0, 60.0), raw(56));
    assert!(!c.snapshot().irrigation_active);

    assert_eq!(c.handle_command("SETPOINT:65", 1_000).as_deref(), Some("OK: setpoint set to 65%"));

    let mut edges = Vec::new();
    for i in 1..=3 {
        let out = c.read_cycle(i * READ_INTERVAL_MS, climate(24.0, 60.0), raw(56));
        assert_eq!(c.snapshot().error, 9);
        edges.extend(out.edge);
    }
    assert_eq!(edges, vec![GateEdge::Activated]);
    assert!(c.snapshot().irrigation_active);
    assert_eq!(c.stats(15_000).activations, 1);
}

#[test]
fn hot_day_reports_temp_high_over_soil() {
    let mut c = Controller::new(config()).unwrap();
    c.read_cycle(0, climate(40.0, 30.0), raw(50));
    assert_eq!(c.snapshot().status, StatusCode::TempHigh);
    assert_eq!(c.snapshot().status.code(), 1);

    c.read_cycle(5_000, climate(40.0, 30.0), raw(20));
    assert_eq!(c.snapshot().status, StatusCode::TempHigh);
}

#[test]
fn setpoint_round_trips_through_status() {
    let mut c = Controller::new(config()).unwrap();
    c.handle_command("SETPOINT:65", 0);
    let status = c.handle_command("STATUS", 0).unwrap();
    assert!(status.lines().any(|l| l == "setpoint=65 %"), "{status}");
}

#[test]
fn out_of_range_setpoint_is_reported_and_ignored() {
    let mut c = Controller::new(config()).unwrap();
    let reply = c.handle_command("SETPOINT:150", 0).unwrap();
    assert!(reply.starts_with("ERROR"), "{reply}");
    assert_eq!(c.snapshot().setpoint, 50);

    let reply = c.handle_command("SETPOINT:abc", 0).unwrap();
    assert!(reply.starts_with("ERROR"), "{reply}");
    assert_eq!(c.snapshot().setpoint, 50);
}

#[test]
fn reset_clears_pid_memory_only() {
    let mut c = Controller::new(config()).unwrap();
    c.handle_command("SETPOINT:70", 0);
    for i in 0..4 {
        c.read_cycle(i * READ_INTERVAL_MS, climate(24.0, 60.0), raw(40));
    }
    assert!(c.pid().integral() != 0.0);
    let before = c.stats(20_000);

    c.handle_command("RESET", 20_000);
    assert_eq!(c.pid().integral(), 0.0);
    assert_eq!(c.pid().previous_error(), 0.0);
    assert_eq!(c.snapshot().setpoint, 70);
    assert_eq!(c.stats(20_000), before);
}

#[test]
fn integral_stays_clamped_over_long_runs() {
    let mut c = Controller::new(config()).unwrap();
    c.handle_command("SETPOINT:100", 0);
    for i in 0..200 {
        c.read_cycle(i * READ_INTERVAL_MS, climate(24.0, 60.0), raw(0));
        assert!(c.pid().integral().abs() <= INTEGRAL_LIMIT);
    }
    c.handle_command("SETPOINT:0", 0);
    for i in 200..400 {
        c.read_cycle(i * READ_INTERVAL_MS, climate(24.0, 60.0), raw(100));
        assert!(c.pid().integral().abs() <= INTEGRAL_LIMIT);
    }
}

#[test]
fn no_chattering_inside_the_band() {
    let mut c = Controller::new(config()).unwrap();
    // error 30 switches the gate on at once
    c.read_cycle(0, climate(24.0, 60.0), raw(20));
    assert!(c.snapshot().irrigation_active);

    // Soil at the setpoint with cleared memory: output 0, inside (-5, 10).
    c.handle_command("RESET", 0);
    for i in 1..10 {
        let out = c.read_cycle(i * READ_INTERVAL_MS, climate(24.0, 60.0), raw(50));
        assert_eq!(out.edge, None);
        assert!(c.snapshot().irrigation_active);
    }
}

#[test]
fn failed_climate_read_keeps_last_values() {
    let (mut lp, _tx) = control_loop(vec![
        (climate(22.5, 61.0), 50),
        (Err(SensorError::Timeout), 50),
        (climate(f32::NAN, 63.0), 50),
    ]);
    lp.tick(0);
    lp.tick(5_000);
    assert_eq!(lp.controller().snapshot().temperature, 22.5);
    assert_eq!(lp.controller().snapshot().air_humidity, 61.0);

    lp.tick(10_000);
    assert_eq!(lp.controller().snapshot().temperature, 22.5);
    assert_eq!(lp.controller().snapshot().air_humidity, 63.0);
}

#[test]
fn telemetry_repeats_latest_cycle_between_reads() {
    let (mut lp, _tx) = control_loop(vec![(climate(21.0, 55.0), 45), (climate(23.0, 57.0), 47)]);
    for now in (0..=5_000).step_by(10) {
        lp.tick(now);
    }
    let out = output(&lp);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "elapsed_s,temperature,air_humidity,soil_moisture,setpoint,error,irrigation,status");
    assert_eq!(lines[1], "0.0,21.00,55.00,45,50,5,0,0");
    assert_eq!(lines[5], "4.0,21.00,55.00,45,50,5,0,0");
    assert_eq!(lines[6], "5.0,23.00,57.00,47,50,3,0,0");
}

#[test]
fn serial_commands_drive_the_loop() {
    let (mut lp, tx) = control_loop(vec![(climate(24.0, 60.0), 56)]);
    lp.tick(0);

    tx.send("SETPOINT:65".into()).unwrap();
    tx.send("NOT A COMMAND".into()).unwrap();
    tx.send("STATUS".into()).unwrap();
    for now in (10..=15_000).step_by(10) {
        lp.tick(now);
    }

    let out = output(&lp);
    assert!(out.contains("OK: setpoint set to 65%"));
    assert!(out.contains("setpoint=65 %"));
    assert!(!out.contains("NOT A COMMAND"));
    assert!(lp.controller().snapshot().irrigation_active);
    assert_eq!(lp.board().relay_writes, vec![false, true]);
}
