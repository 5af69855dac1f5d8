// AccelLog — Battery level conversion
//
// The battery is sensed through a 1:2 resistor divider on a 12-bit ADC
// channel with 11 dB attenuation (0–3.3 V range).

use crate::config::*;

/// Battery voltage for a raw ADC reading.
pub fn battery_voltage(raw: i32) -> f32 {
    (raw as f32 / ADC_MAX_RAW) * ADC_FULL_SCALE_V * BATTERY_DIVIDER_RATIO
}

/// Charge percentage for a raw ADC reading.
/// Maps the LiPo range linearly: 3.3 V = 0 %, 4.2 V = 100 %.
pub fn charge_percent(raw: i32) -> u8 {
    let voltage = battery_voltage(raw);
    let level = ((voltage - BATTERY_EMPTY_V) / (BATTERY_FULL_V - BATTERY_EMPTY_V) * 100.0).clamp(0.0, 100.0);
    level.round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_for(voltage: f32) -> i32 {
        (voltage / BATTERY_DIVIDER_RATIO / ADC_FULL_SCALE_V * ADC_MAX_RAW).round() as i32
    }

    #[test]
    fn test_empty_and_full() {
        assert_eq!(charge_percent(raw_for(3.3)), 0);
        assert_eq!(charge_percent(raw_for(4.2)), 100);
    }

    #[test]
    fn test_midpoint() {
        let pct = charge_percent(raw_for(3.75));
        assert!((49..=51).contains(&pct), "got {pct}");
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        assert_eq!(charge_percent(0), 0);
        assert_eq!(charge_percent(4095), 100);
    }
}
