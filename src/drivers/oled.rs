// FarmWatch — SSD1306 OLED Driver
//
// Register-level driver for a 128x64 panel on I2C. Drawing happens in the
// host-side `display::Framebuffer`; this module only pushes it to GDDRAM.

use esp_idf_hal::i2c::I2cDriver;

use crate::config::*;
use crate::display::{self, Framebuffer, StatusDisplay};

// Control bytes
const CTRL_CMD: u8 = 0x00;
const CTRL_DATA: u8 = 0x40;

// Commands
const CMD_DISPLAY_OFF: u8 = 0xAE;
const CMD_DISPLAY_ON: u8 = 0xAF;
const CMD_SET_COLUMN_RANGE: u8 = 0x21;
const CMD_SET_PAGE_RANGE: u8 = 0x22;

const INIT_SEQUENCE: &[u8] = &[
    CMD_DISPLAY_OFF,
    0xD5, 0x80, // clock divide
    0xA8, 0x3F, // multiplex 1/64
    0xD3, 0x00, // display offset
    0x40,       // start line 0
    0x8D, 0x14, // charge pump on
    0x20, 0x00, // horizontal addressing
    0xA1,       // segment remap
    0xC8,       // COM scan descending
    0xDA, 0x12, // COM pins
    0x81, 0xCF, // contrast
    0xD9, 0xF1, // pre-charge
    0xDB, 0x40, // VCOMH deselect
    0xA4,       // resume from RAM
    0xA6,       // normal (not inverted)
    CMD_DISPLAY_ON,
];

pub struct OledDisplay {
    bus: I2cDriver<'static>,
    frame: Framebuffer,
}

impl OledDisplay {
    pub fn new(bus: I2cDriver<'static>) -> Self {
        Self { bus, frame: Framebuffer::new() }
    }

    /// Probe the panel and run the power-up sequence.
    pub fn init(&mut self) -> anyhow::Result<()> {
        for cmd in INIT_SEQUENCE {
            self.command(&[*cmd])?;
        }
        self.flush()?;
        log::info!("SSD1306 initialised at 0x{:02X}", I2C_ADDR_OLED);
        Ok(())
    }

    fn command(&mut self, bytes: &[u8]) -> anyhow::Result<()> {
        let mut buf = [CTRL_CMD; 4];
        buf[1..=bytes.len()].copy_from_slice(bytes);
        self.bus.write(I2C_ADDR_OLED, &buf[..=bytes.len()], I2C_TIMEOUT_TICKS)?;
        Ok(())
    }

    fn flush(&mut self) -> anyhow::Result<()> {
        self.command(&[CMD_SET_COLUMN_RANGE, 0, (SCREEN_WIDTH - 1) as u8])?;
        self.command(&[CMD_SET_PAGE_RANGE, 0, (SCREEN_HEIGHT / 8 - 1) as u8])?;

        let mut chunk = [CTRL_DATA; 1 + SCREEN_WIDTH as usize];
        for page in self.frame.pages() {
            chunk[1..].copy_from_slice(page);
            self.bus.write(I2C_ADDR_OLED, &chunk, I2C_TIMEOUT_TICKS)?;
        }
        Ok(())
    }
}

impl StatusDisplay for OledDisplay {
    fn show(&mut self, lines: &[String]) -> anyhow::Result<()> {
        // Framebuffer drawing is infallible.
        let _ = display::draw_status(&mut self.frame, lines);
        self.flush()
    }
}
