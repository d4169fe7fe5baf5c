// FarmWatch — DHT22 Driver
//
// Bit-banged single-wire protocol on an open-drain GPIO with an external
// pull-up. The 40-bit frame is clocked in with interrupts masked; decoding
// lives in `sensor::decode_dht22`.

use esp_idf_hal::delay::Ets;
use esp_idf_hal::gpio::{AnyIOPin, InputOutput, PinDriver};
use esp_idf_hal::interrupt;

use crate::events::{ClimateReading, SensorError};
use crate::sensor;

const START_LOW_US: u32 = 1_100; // host start signal, >= 1 ms
const RELEASE_US: u32 = 30;
const RESPONSE_TIMEOUT_US: i64 = 100;
const BIT_TIMEOUT_US: i64 = 90;
const ONE_THRESHOLD_US: i64 = 40; // 26-28 µs high = 0, 70 µs high = 1

fn now_us() -> i64 {
    unsafe { esp_idf_sys::esp_timer_get_time() }
}

pub struct Dht22 {
    pin: PinDriver<'static, AnyIOPin, InputOutput>,
}

impl Dht22 {
    pub fn new(pin: AnyIOPin) -> anyhow::Result<Self> {
        let mut pin = PinDriver::input_output_od(pin)?;
        pin.set_high()?; // release the line
        Ok(Self { pin })
    }

    pub fn read(&mut self) -> Result<ClimateReading, SensorError> {
        let frame = self.read_frame()?;
        sensor::decode_dht22(&frame)
    }

    fn read_frame(&mut self) -> Result<[u8; 5], SensorError> {
        self.pin.set_low().map_err(|_| SensorError::ReadFailed)?;
        Ets::delay_us(START_LOW_US);
        self.pin.set_high().map_err(|_| SensorError::ReadFailed)?;
        Ets::delay_us(RELEASE_US);

        interrupt::free(|| {
            // Sensor response: ~80 µs low then ~80 µs high.
            self.hold_while(true, RESPONSE_TIMEOUT_US)?;
            self.hold_while(false, RESPONSE_TIMEOUT_US)?;
            self.hold_while(true, RESPONSE_TIMEOUT_US)?;

            let mut frame = [0u8; 5];
            for bit in 0..40 {
                self.hold_while(false, BIT_TIMEOUT_US)?;
                let high_us = self.hold_while(true, BIT_TIMEOUT_US)?;
                if high_us > ONE_THRESHOLD_US {
                    frame[bit / 8] |= 0x80 >> (bit % 8);
                }
            }
            Ok(frame)
        })
    }

    /// Busy-wait while the line sits at `high`; returns how long that took.
    fn hold_while(&self, high: bool, timeout_us: i64) -> Result<i64, SensorError> {
        let start = now_us();
        while self.pin.is_high() == high {
            if now_us() - start > timeout_us {
                return Err(SensorError::Timeout);
            }
        }
        Ok(now_us() - start)
    }
}
