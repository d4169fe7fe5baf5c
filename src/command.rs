// FarmWatch — Command Interpreter
//
// Line-oriented, case-sensitive commands on the serial channel. Parsing is
// kept separate from execution so the controller applies a command only
// after its argument has been validated.

use core::fmt::{self, Write};

use crate::config::{ControllerConfig, PidGains, HARDWARE_DESCRIPTION};
use crate::controller::Stats;
use crate::events::CycleSnapshot;
use crate::pid::PidTerms;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Setpoint(u8),
    Status,
    Info,
    Stats,
    Help,
    Reset,
    /// `GAINS` alone queries, `GAINS:kp,ki,kd` replaces.
    Gains(Option<PidGains>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    InvalidNumber(String),
    OutOfRange(i64),
    InvalidGains(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidNumber(arg) => {
                write!(f, "ERROR: invalid setpoint '{arg}' (expected integer 0-100)")
            }
            Self::OutOfRange(v) => write!(f, "ERROR: setpoint {v} out of range (0-100)"),
            Self::InvalidGains(arg) => write!(
                f,
                "ERROR: invalid gains '{arg}' (expected GAINS:<kp>,<ki>,<kd>, non-negative)"
            ),
        }
    }
}

impl std::error::Error for CommandError {}

/// Parse one input line.
///
/// `None` means the line is not a command at all; callers ignore it without
/// answering on the channel. `Some(Err(_))` is a known command with a bad
/// argument.
pub fn parse(line: &str) -> Option<Result<Command, CommandError>> {
    let line = line.trim();

    if let Some(arg) = line.strip_prefix("SETPOINT:") {
        return Some(parse_setpoint(arg.trim()));
    }
    if let Some(arg) = line.strip_prefix("GAINS:") {
        return Some(parse_gains(arg.trim()).map(|g| Command::Gains(Some(g))));
    }

    match line {
        "STATUS" => Some(Ok(Command::Status)),
        "INFO" => Some(Ok(Command::Info)),
        "STATS" => Some(Ok(Command::Stats)),
        "HELP" => Some(Ok(Command::Help)),
        "RESET" => Some(Ok(Command::Reset)),
        "GAINS" => Some(Ok(Command::Gains(None))),
        _ => None,
    }
}

fn parse_setpoint(arg: &str) -> Result<Command, CommandError> {
    let value: i64 = arg
        .parse()
        .map_err(|_| CommandError::InvalidNumber(arg.to_string()))?;
    if !(0..=100).contains(&value) {
        return Err(CommandError::OutOfRange(value));
    }
    Ok(Command::Setpoint(value as u8))
}

fn parse_gains(arg: &str) -> Result<PidGains, CommandError> {
    let invalid = || CommandError::InvalidGains(arg.to_string());

    let mut parts = arg.split(',').map(|p| p.trim().parse::<f32>());
    let mut next = || match parts.next() {
        Some(Ok(v)) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(invalid()),
    };
    let gains = PidGains {
        kp: next()?,
        ki: next()?,
        kd: next()?,
    };
    if parts.next().is_some() {
        return Err(invalid());
    }
    Ok(gains)
}

// ---------------------------------------------------------------------------
// Response blocks
// ---------------------------------------------------------------------------

pub fn help_text() -> String {
    [
        "=== COMMANDS ===",
        "SETPOINT:<0-100>       set target soil moisture (%)",
        "STATUS                 current readings and controller state",
        "INFO                   static configuration",
        "STATS                  uptime, cycles, activations",
        "RESET                  zero PID integral and derivative memory",
        "GAINS                  show PID gains",
        "GAINS:<kp>,<ki>,<kd>   replace PID gains (resets PID memory)",
        "HELP                   this list",
    ]
    .join("\n")
}

/// STATUS block for the last completed cycle. `setpoint` is the pending
/// target, which may differ from `snapshot.setpoint` until the next read.
pub fn status_text(
    snapshot: &CycleSnapshot,
    setpoint: u8,
    terms: &PidTerms,
    integral: f32,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== STATUS ===");
    let _ = writeln!(out, "temperature={:.2} C", snapshot.temperature);
    let _ = writeln!(out, "air_humidity={:.2} %", snapshot.air_humidity);
    let _ = writeln!(out, "soil_moisture={} %", snapshot.soil_moisture);
    let _ = writeln!(out, "setpoint={setpoint} %");
    let _ = writeln!(out, "error={}", snapshot.error);
    let _ = writeln!(
        out,
        "irrigation={}",
        if snapshot.irrigation_active { "ON" } else { "OFF" }
    );
    let _ = writeln!(
        out,
        "status={} ({})",
        snapshot.status.label(),
        snapshot.status.code()
    );
    let _ = writeln!(
        out,
        "pid: P={:.2} I={:.2} D={:.2} output={:.2}",
        terms.proportional, terms.integral, terms.derivative, terms.output
    );
    let _ = write!(out, "pid: integral_accumulator={integral:.2}");
    out
}

pub fn info_text(config: &ControllerConfig, gains: &PidGains) -> String {
    let t = &config.thresholds;
    let mut out = String::new();
    let _ = writeln!(out, "=== INFO ===");
    let _ = writeln!(out, "hardware: {HARDWARE_DESCRIPTION}");
    let _ = writeln!(
        out,
        "gains: Kp={:.3} Ki={:.3} Kd={:.3}",
        gains.kp, gains.ki, gains.kd
    );
    let _ = writeln!(out, "integral_limit=+/-{:.1}", config.integral_limit);
    let _ = writeln!(
        out,
        "hysteresis: on>{:.1} off<{:.1}",
        config.activate_threshold, config.deactivate_threshold
    );
    let _ = writeln!(
        out,
        "alerts: temp>{:.1}C temp<{:.1}C soil<{}% soil>{}%",
        t.temp_max_c, t.temp_min_c, t.soil_dry_min, t.soil_wet_max
    );
    let _ = writeln!(
        out,
        "soil_calibration: wet={} dry={}",
        config.soil_raw_wet, config.soil_raw_dry
    );
    let _ = write!(
        out,
        "intervals: read={}ms telemetry={}ms display={}ms",
        config.read_interval_ms, config.telemetry_interval_ms, config.display_interval_ms
    );
    out
}

/// STATS block. Uptime is shown as `HH:MM:SS` followed by raw seconds.
pub fn stats_text(s: &Stats) -> String {
    let secs = s.uptime_ms / 1000;
    let mut out = String::new();
    let _ = writeln!(out, "=== STATS ===");
    let _ = writeln!(
        out,
        "uptime={:02}:{:02}:{:02} ({} s)",
        secs / 3600,
        (secs / 60) % 60,
        secs % 60,
        secs
    );
    let _ = writeln!(out, "read_cycles={}", s.read_cycles);
    let _ = writeln!(out, "irrigation_activations={}", s.activations);
    let _ = writeln!(out, "read_frequency={:.3} Hz", s.read_frequency_hz);
    let _ = write!(out, "activation_frequency={:.2} /h", s.activations_per_hour);
    out
}

pub fn gains_text(gains: &PidGains) -> String {
    format!("GAINS: Kp={:.3} Ki={:.3} Kd={:.3}", gains.kp, gains.ki, gains.kd)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keywords_with_surrounding_whitespace() {
        assert_eq!(parse("  STATUS\r\n"), Some(Ok(Command::Status)));
        assert_eq!(parse("INFO"), Some(Ok(Command::Info)));
        assert_eq!(parse("STATS"), Some(Ok(Command::Stats)));
        assert_eq!(parse("HELP"), Some(Ok(Command::Help)));
        assert_eq!(parse("RESET"), Some(Ok(Command::Reset)));
        assert_eq!(parse("GAINS"), Some(Ok(Command::Gains(None))));
    }

    #[test]
    fn keywords_are_case_sensitive() {
        assert_eq!(parse("status"), None);
        assert_eq!(parse("setpoint:50"), None);
    }

    #[test]
    fn unknown_lines_are_not_commands() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("FOO"), None);
        assert_eq!(parse("STATUS NOW"), None);
    }

    #[test]
    fn setpoint_accepts_inclusive_range() {
        assert_eq!(parse("SETPOINT:0"), Some(Ok(Command::Setpoint(0))));
        assert_eq!(parse("SETPOINT:65"), Some(Ok(Command::Setpoint(65))));
        assert_eq!(parse("SETPOINT: 100 "), Some(Ok(Command::Setpoint(100))));
    }

    #[test]
    fn setpoint_rejects_bad_arguments() {
        assert_eq!(parse("SETPOINT:101"), Some(Err(CommandError::OutOfRange(101))));
        assert_eq!(parse("SETPOINT:-1"), Some(Err(CommandError::OutOfRange(-1))));
        assert_eq!(
            parse("SETPOINT:abc"),
            Some(Err(CommandError::InvalidNumber("abc".into())))
        );
        assert_eq!(
            parse("SETPOINT:"),
            Some(Err(CommandError::InvalidNumber(String::new())))
        );
    }

    #[test]
    fn gains_parse_three_non_negative_numbers() {
        assert_eq!(
            parse("GAINS:1.0, 0.2,0"),
            Some(Ok(Command::Gains(Some(PidGains { kp: 1.0, ki: 0.2, kd: 0.0 }))))
        );
        for bad in ["GAINS:1,2", "GAINS:1,2,3,4", "GAINS:-1,0,0", "GAINS:a,b,c", "GAINS:inf,0,0"] {
            assert!(
                matches!(parse(bad), Some(Err(CommandError::InvalidGains(_)))),
                "{bad} accepted"
            );
        }
    }

    #[test]
    fn error_messages_mention_range() {
        let msg = CommandError::OutOfRange(150).to_string();
        assert!(msg.starts_with("ERROR"));
        assert!(msg.contains("0-100"));
    }

    #[test]
    fn help_lists_every_command() {
        let help = help_text();
        for kw in ["SETPOINT", "STATUS", "INFO", "STATS", "RESET", "GAINS", "HELP"] {
            assert!(help.contains(kw), "{kw} missing from help");
        }
    }

    #[test]
    fn status_shows_pending_setpoint() {
        let mut snapshot = CycleSnapshot::new(50);
        snapshot.soil_moisture = 45;
        snapshot.error = 5;
        let text = status_text(&snapshot, 65, &PidTerms::default(), 0.0);
        assert!(text.lines().any(|l| l == "setpoint=65 %"), "{text}");
        assert!(text.lines().any(|l| l == "error=5"), "{text}");
    }

    #[test]
    fn stats_block_format() {
        let stats = Stats {
            uptime_ms: 3_661_500,
            read_cycles: 732,
            activations: 3,
            deactivations: 2,
            read_frequency_hz: 0.2,
            activations_per_hour: 2.95,
        };
        let text = stats_text(&stats);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "=== STATS ===",
                "uptime=01:01:01 (3661 s)",
                "read_cycles=732",
                "irrigation_activations=3",
                "read_frequency=0.200 Hz",
                "activation_frequency=2.95 /h",
            ]
        );
    }
}
