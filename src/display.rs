// FarmWatch — Status View
//
// Four-line summary of the latest cycle for a 128x64 monochrome panel
// (21 columns at 6x10).

use embedded_graphics::{
    mono_font::{ascii::FONT_6X10, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};

use crate::config::{DISPLAY_BUFFER_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::events::CycleSnapshot;

pub const LINE_HEIGHT: i32 = 12;
pub const MAX_COLUMNS: usize = 21;

fn or_dashes(v: f32, precision: usize) -> String {
    if v.is_finite() {
        format!("{v:.precision$}")
    } else {
        "--".to_string()
    }
}

pub fn status_lines(snapshot: &CycleSnapshot, pid_output: f32) -> [String; 4] {
    [
        format!(
            "T {}C  H {}%",
            or_dashes(snapshot.temperature, 1),
            or_dashes(snapshot.air_humidity, 0)
        ),
        format!("Soil {}%  SP {}%", snapshot.soil_moisture, snapshot.setpoint),
        format!(
            "Irr {}  PID {:.1}",
            if snapshot.irrigation_active { "ON " } else { "OFF" },
            pid_output
        ),
        format!("Status {}", snapshot.status.label()),
    ]
}

/// A panel the control loop can push status lines to.
pub trait StatusDisplay {
    fn show(&mut self, lines: &[String]) -> anyhow::Result<()>;
}

pub fn draw_status<D>(target: &mut D, lines: &[String]) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    target.clear(BinaryColor::Off)?;
    let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
    for (row, line) in lines.iter().enumerate() {
        Text::with_baseline(
            line,
            Point::new(0, row as i32 * LINE_HEIGHT),
            style,
            Baseline::Top,
        )
        .draw(target)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// SSD1306 page-layout framebuffer
// ---------------------------------------------------------------------------

/// One bit per pixel, eight vertical pixels per byte, 128-byte pages. This is
/// the controller's native GDDRAM layout so a flush is a straight copy.
pub struct Framebuffer {
    buf: [u8; DISPLAY_BUFFER_SIZE],
}

impl Framebuffer {
    pub const fn new() -> Self {
        Self { buf: [0; DISPLAY_BUFFER_SIZE] }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Rows of `SCREEN_WIDTH` bytes, one per 8-pixel page.
    pub fn pages(&self) -> impl Iterator<Item = &[u8]> {
        self.buf.chunks(SCREEN_WIDTH as usize)
    }

    pub fn pixel(&self, x: u32, y: u32) -> bool {
        if x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
            return false;
        }
        let idx = x as usize + (y as usize / 8) * SCREEN_WIDTH as usize;
        self.buf[idx] & (1 << (y % 8)) != 0
    }

    fn set_pixel(&mut self, x: u32, y: u32, on: bool) {
        let idx = x as usize + (y as usize / 8) * SCREEN_WIDTH as usize;
        let mask = 1u8 << (y % 8);
        if on {
            self.buf[idx] |= mask;
        } else {
            self.buf[idx] &= !mask;
        }
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(SCREEN_WIDTH, SCREEN_HEIGHT)
    }
}

impl DrawTarget for Framebuffer {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, color) in pixels {
            // off-screen pixels are clipped
            if let (Ok(x), Ok(y)) = (u32::try_from(p.x), u32::try_from(p.y)) {
                if x < SCREEN_WIDTH && y < SCREEN_HEIGHT {
                    self.set_pixel(x, y, color.is_on());
                }
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.buf.fill(if color.is_on() { 0xFF } else { 0x00 });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::StatusCode;
    use core::convert::Infallible;

    struct Canvas {
        lit: usize,
        outside: usize,
    }

    impl OriginDimensions for Canvas {
        fn size(&self) -> Size {
            Size::new(128, 64)
        }
    }

    impl DrawTarget for Canvas {
        type Color = BinaryColor;
        type Error = Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            let area = self.bounding_box();
            for Pixel(p, c) in pixels {
                if !area.contains(p) {
                    self.outside += 1;
                } else if c.is_on() {
                    self.lit += 1;
                }
            }
            Ok(())
        }
    }

    fn busy_snapshot() -> CycleSnapshot {
        CycleSnapshot {
            temperature: -12.3,
            air_humidity: 100.0,
            soil_moisture: 100,
            setpoint: 100,
            error: 0,
            irrigation_active: true,
            status: StatusCode::TempHigh,
            timestamp_ms: 0,
        }
    }

    #[test]
    fn lines_fit_panel_width() {
        let lines = status_lines(&busy_snapshot(), -123.4);
        for l in &lines {
            assert!(l.len() <= MAX_COLUMNS, "'{l}' too wide");
        }
        assert_eq!(lines[1], "Soil 100%  SP 100%");
        assert_eq!(lines[3], "Status TEMP_HIGH");
    }

    #[test]
    fn missing_climate_renders_dashes() {
        let lines = status_lines(&CycleSnapshot::new(50), 0.0);
        assert_eq!(lines[0], "T --C  H --%");
        assert_eq!(lines[2], "Irr OFF  PID 0.0");
    }

    #[test]
    fn draws_inside_panel() {
        let mut canvas = Canvas { lit: 0, outside: 0 };
        let lines = status_lines(&busy_snapshot(), 12.0);
        draw_status(&mut canvas, &lines).unwrap();
        assert!(canvas.lit > 0);
        assert_eq!(canvas.outside, 0);
    }

    #[test]
    fn framebuffer_uses_page_layout() {
        let mut fb = Framebuffer::new();
        Pixel(Point::new(3, 10), BinaryColor::On).draw(&mut fb).unwrap();
        // page 1, column 3, bit 2
        assert_eq!(fb.as_bytes()[128 + 3], 0b0000_0100);
        assert!(fb.pixel(3, 10));
        assert!(!fb.pixel(3, 11));
        assert_eq!(fb.pages().count(), 8);
    }

    #[test]
    fn framebuffer_clips_and_clears() {
        let mut fb = Framebuffer::new();
        Pixel(Point::new(-1, 5), BinaryColor::On).draw(&mut fb).unwrap();
        Pixel(Point::new(128, 5), BinaryColor::On).draw(&mut fb).unwrap();
        assert!(fb.as_bytes().iter().all(|b| *b == 0));

        draw_status(&mut fb, &status_lines(&busy_snapshot(), 1.0)).unwrap();
        assert!(fb.as_bytes().iter().any(|b| *b != 0));
        fb.clear(BinaryColor::Off).unwrap();
        assert!(fb.as_bytes().iter().all(|b| *b == 0));
    }
}
