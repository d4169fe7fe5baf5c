// FarmWatch — Hardware & System Configuration
// Target: ESP32 DevKit (Xtensa) with DHT22, capacitive soil probe, relay, SSD1306

use core::fmt;

// ---------------------------------------------------------------------------
// GPIO Pin Definitions (ESP32 DevKit)
// ---------------------------------------------------------------------------
pub const PIN_DHT22: i32 = 15;      // DHT22 data line (open drain, external pull-up)
pub const PIN_SOIL_ADC: i32 = 34;   // Soil probe analog out (ADC1_CH6, input only)
pub const PIN_RELAY: i32 = 2;       // Irrigation relay (active HIGH)
pub const PIN_I2C_SDA: i32 = 21;    // I2C data line
pub const PIN_I2C_SCL: i32 = 22;    // I2C clock line

// ---------------------------------------------------------------------------
// I2C Bus
// ---------------------------------------------------------------------------
pub const I2C_ADDR_OLED: u8 = 0x3C;
pub const I2C_TIMEOUT_TICKS: u32 = 1000; // FreeRTOS ticks

// ---------------------------------------------------------------------------
// Display (SSD1306 OLED)
// ---------------------------------------------------------------------------
pub const SCREEN_WIDTH: u32 = 128;
pub const SCREEN_HEIGHT: u32 = 64;
pub const DISPLAY_BUFFER_SIZE: usize = (SCREEN_WIDTH as usize * SCREEN_HEIGHT as usize) / 8; // 1024

// ---------------------------------------------------------------------------
// Task Stack Sizes (bytes)
// ---------------------------------------------------------------------------
pub const STACK_CONTROL: usize = 12 * 1024;
pub const STACK_SERIAL: usize = 4096;
pub const STACK_UPLINK: usize = 12 * 1024;

// ---------------------------------------------------------------------------
// Timing (milliseconds)
// ---------------------------------------------------------------------------
pub const READ_INTERVAL_MS: u64 = 5000;       // sensor read + PID cycle
pub const TELEMETRY_INTERVAL_MS: u64 = 1000;  // serial CSV line
pub const DISPLAY_INTERVAL_MS: u64 = 2000;    // OLED refresh
pub const LOOP_POLL_MS: u64 = 10;             // cooperative loop idle

// ---------------------------------------------------------------------------
// PID Control
// ---------------------------------------------------------------------------
pub const KP: f32 = 0.5;
pub const KI: f32 = 0.1;
pub const KD: f32 = 0.05;
pub const INTEGRAL_LIMIT: f32 = 50.0;         // anti-windup band [-I_MAX, I_MAX]
pub const ACTIVATE_THRESHOLD: f32 = 10.0;     // PID output above → relay ON
pub const DEACTIVATE_THRESHOLD: f32 = -5.0;   // PID output below → relay OFF
pub const DEFAULT_SETPOINT: u8 = 50;          // % soil moisture

// ---------------------------------------------------------------------------
// Status Thresholds
// ---------------------------------------------------------------------------
pub const TEMP_MAX_C: f32 = 35.0;
pub const TEMP_MIN_C: f32 = 10.0;
pub const SOIL_DRY_MIN: u8 = 30;
pub const SOIL_WET_MAX: u8 = 80;

// ---------------------------------------------------------------------------
// Soil Probe Calibration (12-bit ADC, higher raw = drier)
// ---------------------------------------------------------------------------
pub const SOIL_RAW_WET: u16 = 0;
pub const SOIL_RAW_DRY: u16 = 4095;

// ---------------------------------------------------------------------------
// Telemetry
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryMode {
    /// `elapsed_s,temperature,...` for logging and plotting against time.
    Timestamped,
    /// Values only, for the Arduino-style serial plotter.
    Bare,
}

pub const TELEMETRY_MODE: TelemetryMode = if cfg!(feature = "plotter") {
    TelemetryMode::Bare
} else {
    TelemetryMode::Timestamped
};

// ---------------------------------------------------------------------------
// Network Uplink (build-time credentials)
// ---------------------------------------------------------------------------
pub const WIFI_SSID: Option<&str> = option_env!("FARMWATCH_WIFI_SSID");
pub const WIFI_PASS: Option<&str> = option_env!("FARMWATCH_WIFI_PASS");
pub const UPLINK_URL: Option<&str> = option_env!("FARMWATCH_UPLINK_URL");
pub const UPLINK_QUEUE_DEPTH: usize = 4;
pub const UPLINK_TIMEOUT_MS: u64 = 5000;

pub const HARDWARE_DESCRIPTION: &str =
    "ESP32 + DHT22 (air) + capacitive soil probe (ADC1_CH6) + relay (GPIO2)";

// ---------------------------------------------------------------------------
// Runtime configuration bundle
// ---------------------------------------------------------------------------

/// PID gains.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidGains {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
}

impl Default for PidGains {
    fn default() -> Self {
        Self { kp: KP, ki: KI, kd: KD }
    }
}

/// Static thresholds used by the status evaluator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusThresholds {
    pub temp_max_c: f32,
    pub temp_min_c: f32,
    pub soil_dry_min: u8,
    pub soil_wet_max: u8,
}

impl Default for StatusThresholds {
    fn default() -> Self {
        Self {
            temp_max_c: TEMP_MAX_C,
            temp_min_c: TEMP_MIN_C,
            soil_dry_min: SOIL_DRY_MIN,
            soil_wet_max: SOIL_WET_MAX,
        }
    }
}

/// Everything the controller needs to run one read cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerConfig {
    pub gains: PidGains,
    pub integral_limit: f32,
    pub activate_threshold: f32,
    pub deactivate_threshold: f32,
    pub default_setpoint: u8,
    pub thresholds: StatusThresholds,
    pub soil_raw_wet: u16,
    pub soil_raw_dry: u16,
    pub read_interval_ms: u64,
    pub telemetry_interval_ms: u64,
    pub display_interval_ms: u64,
    pub telemetry_mode: TelemetryMode,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            gains: PidGains::default(),
            integral_limit: INTEGRAL_LIMIT,
            activate_threshold: ACTIVATE_THRESHOLD,
            deactivate_threshold: DEACTIVATE_THRESHOLD,
            default_setpoint: DEFAULT_SETPOINT,
            thresholds: StatusThresholds::default(),
            soil_raw_wet: SOIL_RAW_WET,
            soil_raw_dry: SOIL_RAW_DRY,
            read_interval_ms: READ_INTERVAL_MS,
            telemetry_interval_ms: TELEMETRY_INTERVAL_MS,
            display_interval_ms: DISPLAY_INTERVAL_MS,
            telemetry_mode: TELEMETRY_MODE,
        }
    }
}

impl ControllerConfig {
    /// PID time step, approximated by the fixed read interval.
    pub fn dt_secs(&self) -> f32 {
        self.read_interval_ms as f32 / 1000.0
    }

    /// Reject configurations that would break the controller invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.deactivate_threshold < self.activate_threshold) {
            return Err(ConfigError::HysteresisInverted);
        }
        if !(self.integral_limit > 0.0) {
            return Err(ConfigError::IntegralLimit);
        }
        if self.read_interval_ms == 0
            || self.telemetry_interval_ms == 0
            || self.display_interval_ms == 0
        {
            return Err(ConfigError::ZeroInterval);
        }
        if self.default_setpoint > 100 {
            return Err(ConfigError::Setpoint);
        }
        let t = &self.thresholds;
        if !(t.temp_min_c < t.temp_max_c) || t.soil_dry_min >= t.soil_wet_max {
            return Err(ConfigError::StatusThresholds);
        }
        if self.soil_raw_wet == self.soil_raw_dry {
            return Err(ConfigError::SoilCalibration);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    HysteresisInverted,
    IntegralLimit,
    ZeroInterval,
    Setpoint,
    StatusThresholds,
    SoilCalibration,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HysteresisInverted => {
                write!(f, "deactivate threshold must be strictly below activate threshold")
            }
            Self::IntegralLimit => write!(f, "integral limit must be positive"),
            Self::ZeroInterval => write!(f, "cadence intervals must be non-zero"),
            Self::Setpoint => write!(f, "default setpoint must be within 0-100"),
            Self::StatusThresholds => write!(f, "status thresholds are inverted"),
            Self::SoilCalibration => write!(f, "soil calibration endpoints are identical"),
        }
    }
}

impl std::error::Error for ConfigError {}
