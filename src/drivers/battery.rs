// AccelLog — Battery Monitor
//
// One-shot ADC reads on GPIO2 / ADC1_CHANNEL_2 with 11 dB attenuation
// (0–3.3 V range), via raw ESP-IDF calls.

use accellog::config::PIN_BATTERY_ADC;
use accellog::events::ChargeState;
use accellog::power;
use accellog::services::Battery;

pub struct AdcBattery {
    handle: esp_idf_sys::adc_oneshot_unit_handle_t,
    channel: esp_idf_sys::adc_channel_t,
    last: ChargeState,
}

// SAFETY: the oneshot unit handle is only used from the thread that owns
// this struct.
unsafe impl Send for AdcBattery {}

impl AdcBattery {
    pub fn new() -> anyhow::Result<Self> {
        // On the C3, GPIO0..4 map one-to-one onto ADC1 channels 0..4.
        let channel: esp_idf_sys::adc_channel_t = PIN_BATTERY_ADC;
        let mut handle: esp_idf_sys::adc_oneshot_unit_handle_t = core::ptr::null_mut();

        unsafe {
            let unit_cfg = esp_idf_sys::adc_oneshot_unit_init_cfg_t {
                unit_id: esp_idf_sys::adc_unit_t_ADC_UNIT_1,
                ulp_mode: esp_idf_sys::adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
                ..core::mem::zeroed()
            };
            esp_idf_sys::esp!(esp_idf_sys::adc_oneshot_new_unit(&unit_cfg, &mut handle))?;

            let chan_cfg = esp_idf_sys::adc_oneshot_chan_cfg_t {
                atten: esp_idf_sys::adc_atten_t_ADC_ATTEN_DB_11,
                bitwidth: esp_idf_sys::adc_bitwidth_t_ADC_BITWIDTH_12,
            };
            esp_idf_sys::esp!(esp_idf_sys::adc_oneshot_config_channel(handle, channel, &chan_cfg))?;
        }

        Ok(Self {
            handle,
            channel,
            last: ChargeState::default(),
        })
    }
}

impl Battery for AdcBattery {
    fn peek(&mut self) -> ChargeState {
        let mut raw: i32 = 0;
        let ret = unsafe { esp_idf_sys::adc_oneshot_read(self.handle, self.channel, &mut raw) };
        if ret == esp_idf_sys::ESP_OK {
            self.last = ChargeState {
                charge_percent: power::charge_percent(raw),
                is_charging: false,
                is_plugged: false,
            };
        } else {
            log::warn!("Battery ADC read failed ({}) — reporting last level", ret);
        }
        self.last
    }
}
