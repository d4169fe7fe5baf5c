// FarmWatch — Control Task
//
// The single cooperative loop. Each iteration, in order:
//   1. read cycle (sensors → status → PID → gate → relay → uplink)
//   2. display refresh
//   3. telemetry line
//   4. at most one pending command line
// The controller state is owned here and nowhere else.

use std::io::Write;
use std::sync::mpsc::{Receiver, SyncSender, TryRecvError, TrySendError};
use std::thread;
use std::time::{Duration, Instant};

use crate::board::Board;
use crate::config::LOOP_POLL_MS;
use crate::controller::Controller;
use crate::display::{self, StatusDisplay};
use crate::events::CycleSnapshot;
use crate::schedule::Cadence;

pub struct ControlLoop<B: Board, W: Write> {
    controller: Controller,
    board: B,
    out: W,
    commands: Receiver<String>,
    uplink: Option<SyncSender<CycleSnapshot>>,
    display: Option<Box<dyn StatusDisplay + Send>>,

    read: Cadence,
    refresh: Cadence,
    telemetry: Cadence,

    /// Relay level last written successfully; `None` forces a write.
    relay_applied: Option<bool>,
    uplink_dropped: u32,
}

impl<B: Board, W: Write> ControlLoop<B, W> {
    pub fn new(controller: Controller, board: B, out: W, commands: Receiver<String>) -> Self {
        let cfg = *controller.config();
        Self {
            controller,
            board,
            out,
            commands,
            uplink: None,
            display: None,
            read: Cadence::new(cfg.read_interval_ms),
            refresh: Cadence::new(cfg.display_interval_ms),
            telemetry: Cadence::new(cfg.telemetry_interval_ms),
            relay_applied: None,
            uplink_dropped: 0,
        }
    }

    pub fn with_uplink(mut self, tx: SyncSender<CycleSnapshot>) -> Self {
        self.uplink = Some(tx);
        self
    }

    pub fn with_display(mut self, display: Box<dyn StatusDisplay + Send>) -> Self {
        self.display = Some(display);
        self
    }

    /// Drive the relay to its initial OFF level and print the telemetry header.
    pub fn start(&mut self) {
        self.sync_relay();
        let header = self.controller.telemetry_header();
        self.emit(&header);
    }

    /// One loop iteration at `now_ms` since boot.
    pub fn tick(&mut self, now_ms: u64) {
        if self.read.due(now_ms) {
            self.read_cycle(now_ms);
        }

        if self.refresh.due(now_ms) {
            self.refresh_display();
        }

        if self.telemetry.due(now_ms) {
            let line = self.controller.telemetry_line(now_ms);
            self.emit(&line);
        }

        match self.commands.try_recv() {
            Ok(line) => {
                if let Some(response) = self.controller.handle_command(&line, now_ms) {
                    self.emit(&response);
                }
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {}
        }
    }

    /// Run forever on the wall clock.
    pub fn run(mut self) -> ! {
        log::info!("Control task started");
        let boot = Instant::now();
        let poll = Duration::from_millis(LOOP_POLL_MS);

        self.start();
        loop {
            self.tick(boot.elapsed().as_millis() as u64);
            thread::sleep(poll);
        }
    }

    fn read_cycle(&mut self, now_ms: u64) {
        let climate = self.board.read_climate();
        let soil_raw = self.board.read_soil_raw();
        let outcome = self.controller.read_cycle(now_ms, climate, soil_raw);

        if outcome.edge.is_some() {
            self.relay_applied = None;
        }
        self.sync_relay();
        self.publish(now_ms);
    }

    /// Bring the relay in line with the gate; a failed write is retried on
    /// the next read cycle.
    fn sync_relay(&mut self) {
        let want = self.controller.snapshot().irrigation_active;
        if self.relay_applied == Some(want) {
            return;
        }
        match self.board.set_relay(want) {
            Ok(()) => self.relay_applied = Some(want),
            Err(e) => {
                self.relay_applied = None;
                log::error!("Relay write failed ({}): {e:#}", if want { "ON" } else { "OFF" });
            }
        }
    }

    fn publish(&mut self, now_ms: u64) {
        let Some(tx) = &self.uplink else { return };
        match tx.try_send(*self.controller.snapshot()) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.uplink_dropped += 1;
                log::debug!(
                    "Uplink busy at {} ms, snapshot dropped ({} total)",
                    now_ms,
                    self.uplink_dropped
                );
            }
            Err(TrySendError::Disconnected(_)) => {
                log::warn!("Uplink task gone, disabling uplink");
                self.uplink = None;
            }
        }
    }

    fn refresh_display(&mut self) {
        let Some(panel) = self.display.as_mut() else { return };
        let lines = display::status_lines(
            self.controller.snapshot(),
            self.controller.pid_terms().output,
        );
        if let Err(e) = panel.show(&lines) {
            log::warn!("Display error: {e:#}");
        }
    }

    fn emit(&mut self, text: &str) {
        let res = writeln!(self.out, "{text}").and_then(|_| self.out.flush());
        if let Err(e) = res {
            log::warn!("Serial write failed: {e}");
        }
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn uplink_dropped(&self) -> u32 {
        self.uplink_dropped
    }
}
