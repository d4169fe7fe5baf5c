// FarmWatch — Soil Probe (ADC)
//
// One-shot reads of the capacitive probe on GPIO34 / ADC1_CHANNEL_6 with
// 11 dB attenuation (0-3.3 V range) and 12-bit width.

use esp_idf_sys::{self as sys, esp};

pub struct SoilProbe {
    handle: sys::adc_oneshot_unit_handle_t,
    channel: sys::adc_channel_t,
    last_raw: u16,
}

// SAFETY: the ADC unit handle is created once and only ever used by the
// thread that owns this probe.
unsafe impl Send for SoilProbe {}

impl SoilProbe {
    pub fn new() -> anyhow::Result<Self> {
        let channel = sys::adc_channel_t_ADC_CHANNEL_6; // GPIO34
        let mut handle: sys::adc_oneshot_unit_handle_t = core::ptr::null_mut();

        unsafe {
            let unit_cfg = sys::adc_oneshot_unit_init_cfg_t {
                unit_id: sys::adc_unit_t_ADC_UNIT_1,
                ulp_mode: sys::adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
                ..core::mem::zeroed()
            };
            esp!(sys::adc_oneshot_new_unit(&unit_cfg, &mut handle))?;

            let chan_cfg = sys::adc_oneshot_chan_cfg_t {
                atten: sys::adc_atten_t_ADC_ATTEN_DB_11,
                bitwidth: sys::adc_bitwidth_t_ADC_BITWIDTH_12,
            };
            esp!(sys::adc_oneshot_config_channel(handle, channel, &chan_cfg))?;
        }

        log::info!("Soil probe ready on ADC1_CH6");
        Ok(Self { handle, channel, last_raw: crate::config::SOIL_RAW_DRY })
    }

    /// Raw 0-4095 count. A failed conversion repeats the previous value.
    pub fn read_raw(&mut self) -> u16 {
        let mut raw: i32 = 0;
        let ret = unsafe { sys::adc_oneshot_read(self.handle, self.channel, &mut raw) };
        if ret == sys::ESP_OK {
            self.last_raw = raw.clamp(0, i32::from(crate::sensor::ADC_MAX)) as u16;
        } else {
            log::warn!("Soil ADC read failed ({ret}), reusing {}", self.last_raw);
        }
        self.last_raw
    }
}
