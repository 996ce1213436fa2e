//! Board-wide timing and sizing constants.

/// Current measurement (control tick) rate [Hz].
///
/// One control tick runs per current sample; all millisecond-based
/// windows (endstop debounce, homing zero-velocity window) convert
/// through this rate.
pub const TICK_HZ: u32 = 8_000;

/// Duration of one control tick [s].
pub const TICK_PERIOD: f32 = 1.0 / TICK_HZ as f32;

/// How long the worker waits for a current-measurement token before
/// declaring the tick missed [ms].
pub const CURRENT_MEAS_TIMEOUT_MS: u64 = 10;

/// Full-scale ADC reading used to normalize raw channel values.
pub const ADC_FULL_SCALE: f32 = 4096.0;

/// Number of ADC measurement cells carried by the board context.
pub const ADC_CHANNEL_COUNT: usize = 16;

/// Task chain capacity. The longest expansion (full startup sequence)
/// uses six entries; the rest is headroom.
pub const TASK_CHAIN_CAP: usize = 12;

/// Convert a millisecond window into a tick count at [`TICK_HZ`].
#[inline]
pub const fn ticks_for_ms(ms: u32) -> u64 {
    (TICK_HZ as u64 * ms as u64) / 1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_for_ms_matches_rate() {
        assert_eq!(ticks_for_ms(1000), TICK_HZ as u64);
        assert_eq!(ticks_for_ms(500), TICK_HZ as u64 / 2);
        assert_eq!(ticks_for_ms(0), 0);
    }
}
