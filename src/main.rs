// FarmWatch — Entry Point
//
// Firmware (target_os = "espidf"):
//   1. Logger, controller configuration check.
//   2. DHT22, soil probe, relay, SSD1306 (optional) bring-up.
//   3. Serial line reader on the console UART.
//   4. WiFi + HTTP uplink when built with `--features uplink`.
//   5. Control task owns everything else; the main thread parks.
//
// Host: the same control loop over a simulated field. Telemetry and command
// responses go to stdout, commands come from stdin, logs go to stderr.

use std::io::BufReader;
use std::sync::mpsc;

use farmwatch::config::*;
use farmwatch::controller::Controller;
use farmwatch::tasks::control::ControlLoop;
use farmwatch::tasks::serial::{spawn_line_reader, InputMode};

fn log_boot_config(config: &ControllerConfig) {
    log::info!(
        "Setpoint {}%, Kp={} Ki={} Kd={}, gate ON>{} OFF<{}",
        config.default_setpoint,
        config.gains.kp,
        config.gains.ki,
        config.gains.kd,
        config.activate_threshold,
        config.deactivate_threshold
    );
    log::info!(
        "Read every {} ms, telemetry every {} ms, display every {} ms",
        config.read_interval_ms,
        config.telemetry_interval_ms,
        config.display_interval_ms
    );
}

// ---------------------------------------------------------------------------
// Firmware
// ---------------------------------------------------------------------------
#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    use std::thread;
    use std::time::Duration;

    use esp_idf_hal::gpio::{IOPin, OutputPin};
    use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
    use esp_idf_hal::prelude::*;

    use farmwatch::drivers::dht22::Dht22;
    use farmwatch::drivers::oled::OledDisplay;
    use farmwatch::drivers::relay::Relay;
    use farmwatch::drivers::soil::SoilProbe;
    use farmwatch::drivers::EspBoard;

    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
    log::info!("FarmWatch firmware starting ({HARDWARE_DESCRIPTION})");

    let config = ControllerConfig::default();
    let controller = Controller::new(config)?;
    log_boot_config(&config);

    // ---- Peripherals ------------------------------------------------------
    let peripherals = Peripherals::take()?;
    log::info!(
        "Pins: DHT22 GPIO{PIN_DHT22}, soil GPIO{PIN_SOIL_ADC}, relay GPIO{PIN_RELAY}, \
         I2C SDA GPIO{PIN_I2C_SDA} SCL GPIO{PIN_I2C_SCL}"
    );

    let dht = Dht22::new(peripherals.pins.gpio15.downgrade())?;
    let soil = SoilProbe::new()?;
    let relay = Relay::new(peripherals.pins.gpio2.downgrade_output())?;
    let board = EspBoard::new(dht, soil, relay);

    let i2c_config = I2cConfig::new().baudrate(400u32.kHz().into());
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21, // SDA
        peripherals.pins.gpio22, // SCL
        &i2c_config,
    )?;
    let mut oled = OledDisplay::new(i2c);
    let oled_ok = match oled.init() {
        Ok(()) => true,
        Err(e) => {
            log::error!("OLED not responding, running without display: {e:#}");
            false
        }
    };

    // ---- Serial commands --------------------------------------------------
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_line_reader(BufReader::new(std::io::stdin()), InputMode::Polled, cmd_tx)?;

    let mut control = ControlLoop::new(controller, board, std::io::stdout(), cmd_rx);
    if oled_ok {
        control = control.with_display(Box::new(oled));
    }

    // ---- Uplink -----------------------------------------------------------
    #[cfg(feature = "uplink")]
    let _wifi = {
        use farmwatch::drivers::net::{connect_wifi, HttpUplink};
        use farmwatch::tasks::uplink::spawn_uplink;

        match (WIFI_SSID, WIFI_PASS, UPLINK_URL) {
            (Some(ssid), Some(pass), Some(url)) => match connect_wifi(peripherals.modem, ssid, pass) {
                Ok(wifi) => {
                    log::info!("Uplink to {url}");
                    control = control.with_uplink(spawn_uplink(HttpUplink::new(url), UPLINK_QUEUE_DEPTH)?);
                    Some(wifi)
                }
                Err(e) => {
                    log::error!("WiFi bring-up failed, uplink disabled: {e:#}");
                    None
                }
            },
            _ => {
                log::warn!("Uplink enabled but FARMWATCH_WIFI_SSID/PASS/UPLINK_URL not set at build time");
                None
            }
        }
    };

    // ---- Control task -----------------------------------------------------
    thread::Builder::new()
        .name("control".into())
        .stack_size(STACK_CONTROL)
        .spawn(move || control.run())?;

    // Main thread has nothing left to do; keep the WiFi handle alive.
    loop {
        thread::sleep(Duration::from_secs(60));
    }
}

// ---------------------------------------------------------------------------
// Host simulator
// ---------------------------------------------------------------------------
#[cfg(not(target_os = "espidf"))]
fn main() -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    use farmwatch::sensor::SoilCalibration;
    use farmwatch::sim::SimulatedField;
    use farmwatch::tasks::uplink::spawn_uplink;
    use farmwatch::uplink::LogUplink;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = ControllerConfig::default();
    let controller = Controller::new(config)?;
    log_boot_config(&config);

    let field = SimulatedField::from_env(
        SoilCalibration::new(config.soil_raw_wet, config.soil_raw_dry),
        config.dt_secs(),
    );
    log::info!("FarmWatch simulator, scenario '{}'", field.scenario());

    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_line_reader(BufReader::new(std::io::stdin()), InputMode::Stream, cmd_tx)?;

    let mut control = ControlLoop::new(controller, field, std::io::stdout(), cmd_rx);
    if std::env::var_os("SIM_UPLINK").is_some() {
        control = control.with_uplink(spawn_uplink(LogUplink, UPLINK_QUEUE_DEPTH)?);
    }

    control.run()
}
