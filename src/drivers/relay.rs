// FarmWatch — Irrigation Relay
//
// Active-HIGH relay module on a plain GPIO output.

use esp_idf_hal::gpio::{AnyOutputPin, Output, PinDriver};

pub struct Relay {
    pin: PinDriver<'static, AnyOutputPin, Output>,
}

impl Relay {
    /// Takes the pin and drives it LOW so the valve starts closed.
    pub fn new(pin: AnyOutputPin) -> anyhow::Result<Self> {
        let mut pin = PinDriver::output(pin)?;
        pin.set_low()?;
        Ok(Self { pin })
    }

    pub fn set(&mut self, on: bool) -> anyhow::Result<()> {
        if on {
            self.pin.set_high()?;
        } else {
            self.pin.set_low()?;
        }
        Ok(())
    }
}
