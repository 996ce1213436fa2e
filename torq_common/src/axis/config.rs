//! Axis and board configuration structs.
//!
//! All structs deserialize from TOML with per-field defaults so a
//! minimal config file stays minimal. Validation lives next to the
//! types; the loader in the axis crate calls it after parsing.

use serde::{Deserialize, Serialize};

// ─── Axis Behaviour Config ──────────────────────────────────────────

/// Per-axis behaviour configuration, writable over the property layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxisConfig {
    /// Run motor calibration as part of the startup sequence.
    #[serde(default)]
    pub startup_motor_calibration: bool,
    /// Run the encoder index search on startup (requires use_index).
    #[serde(default)]
    pub startup_encoder_index_search: bool,
    /// Run encoder offset calibration on startup.
    #[serde(default)]
    pub startup_encoder_offset_calibration: bool,
    /// Enter closed-loop control at the end of the startup sequence.
    #[serde(default)]
    pub startup_closed_loop_control: bool,
    /// Enter sensorless control at the end of the startup sequence.
    /// Ignored when closed-loop startup is selected.
    #[serde(default)]
    pub startup_sensorless_control: bool,
    /// Home the axis before entering closed-loop control on startup.
    #[serde(default)]
    pub startup_homing: bool,

    /// Enable the step/dir input while in a control state.
    #[serde(default)]
    pub enable_step_dir: bool,
    /// Encoder counts added to the position setpoint per step edge.
    #[serde(default = "default_counts_per_step")]
    pub counts_per_step: f32,

    /// Sensorless spin-up: duration of the current spiral stage [s].
    #[serde(default = "default_ramp_up_time")]
    pub ramp_up_time: f32,
    /// Sensorless spin-up: electrical angle swept by the spiral [rad].
    #[serde(default = "default_ramp_up_distance")]
    pub ramp_up_distance: f32,
    /// Sensorless spin-up: current magnitude ramp target [A].
    #[serde(default = "default_spin_up_current")]
    pub spin_up_current: f32,
    /// Sensorless spin-up: electrical acceleration [rad/s^2].
    #[serde(default = "default_spin_up_acceleration")]
    pub spin_up_acceleration: f32,
    /// Sensorless spin-up: hand-off velocity [rad/s].
    #[serde(default = "default_spin_up_target_vel")]
    pub spin_up_target_vel: f32,
}

fn default_counts_per_step() -> f32 {
    2.0
}
fn default_ramp_up_time() -> f32 {
    0.4
}
fn default_ramp_up_distance() -> f32 {
    4.0 * std::f32::consts::PI
}
fn default_spin_up_current() -> f32 {
    10.0
}
fn default_spin_up_acceleration() -> f32 {
    400.0
}
fn default_spin_up_target_vel() -> f32 {
    400.0
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            startup_motor_calibration: false,
            startup_encoder_index_search: false,
            startup_encoder_offset_calibration: false,
            startup_closed_loop_control: false,
            startup_sensorless_control: false,
            startup_homing: false,
            enable_step_dir: false,
            counts_per_step: default_counts_per_step(),
            ramp_up_time: default_ramp_up_time(),
            ramp_up_distance: default_ramp_up_distance(),
            spin_up_current: default_spin_up_current(),
            spin_up_acceleration: default_spin_up_acceleration(),
            spin_up_target_vel: default_spin_up_target_vel(),
        }
    }
}

impl AxisConfig {
    /// Check parameter bounds. Returns a human-readable reason on the
    /// first violation.
    pub fn validate(&self) -> Result<(), String> {
        if self.ramp_up_time <= 0.0 {
            return Err(format!("ramp_up_time must be > 0 (got {})", self.ramp_up_time));
        }
        if self.spin_up_current <= 0.0 {
            return Err(format!(
                "spin_up_current must be > 0 (got {})",
                self.spin_up_current
            ));
        }
        if self.spin_up_acceleration <= 0.0 {
            return Err(format!(
                "spin_up_acceleration must be > 0 (got {})",
                self.spin_up_acceleration
            ));
        }
        if self.spin_up_target_vel <= 0.0 {
            return Err(format!(
                "spin_up_target_vel must be > 0 (got {})",
                self.spin_up_target_vel
            ));
        }
        if self.enable_step_dir && self.counts_per_step == 0.0 {
            return Err("counts_per_step must be non-zero when step/dir is enabled".to_string());
        }
        Ok(())
    }
}

// ─── Endstop Config ─────────────────────────────────────────────────

/// Configuration for one mechanical endstop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndstopConfig {
    /// GPIO pin the endstop is wired to.
    #[serde(default)]
    pub gpio_num: u16,
    /// Whether the endstop participates in homing and guarding.
    #[serde(default)]
    pub enabled: bool,
    /// Linear count assigned to the min endstop position when no
    /// home percentage is configured.
    #[serde(default)]
    pub offset: i32,
    /// Pin polarity.
    #[serde(default)]
    pub is_active_high: bool,
    /// Debounce window [ms].
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: f32,
    /// Where between the endstops zero lands, as a percentage of the
    /// measured travel. Zero disables percentage homing.
    #[serde(default)]
    pub home_percentage: f32,
    /// Whether a physical switch exists, as opposed to homing against
    /// a hard mechanical limit via the zero-velocity window.
    #[serde(default)]
    pub physical_endstop: bool,
    /// Zero-velocity window before a hard limit counts as found [ms].
    #[serde(default = "default_min_ms_homing")]
    pub min_ms_homing: u32,
}

fn default_debounce_ms() -> f32 {
    100.0
}
fn default_min_ms_homing() -> u32 {
    4000
}

impl Default for EndstopConfig {
    fn default() -> Self {
        Self {
            gpio_num: 0,
            enabled: false,
            offset: 0,
            is_active_high: false,
            debounce_ms: default_debounce_ms(),
            home_percentage: 0.0,
            physical_endstop: false,
            min_ms_homing: default_min_ms_homing(),
        }
    }
}

// ─── Hardware Binding ───────────────────────────────────────────────

/// Immutable per-axis hardware binding, fixed at board bring-up.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AxisHardwareConfig {
    /// Step input pin.
    #[serde(default)]
    pub step_pin: u16,
    /// Direction input pin.
    #[serde(default)]
    pub dir_pin: u16,
    /// ADC channel of the motor thermistor.
    #[serde(default)]
    pub thermistor_adc_ch: usize,
    /// Thermistor voltage-to-temperature polynomial, highest degree
    /// first.
    #[serde(default)]
    pub thermistor_poly_coeffs: [f32; 4],
    /// Worker thread real-time priority; zero leaves scheduling alone.
    #[serde(default)]
    pub thread_priority: i32,
}

// ─── Board Config ───────────────────────────────────────────────────

/// Board-level trip levels shared by all axes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Bus voltage below this trips `DC_BUS_UNDER_VOLTAGE` [V].
    #[serde(default = "default_undervoltage_trip")]
    pub dc_bus_undervoltage_trip_level: f32,
    /// Bus voltage above this trips `DC_BUS_OVER_VOLTAGE` [V].
    #[serde(default = "default_overvoltage_trip")]
    pub dc_bus_overvoltage_trip_level: f32,
}

fn default_undervoltage_trip() -> f32 {
    8.0
}
fn default_overvoltage_trip() -> f32 {
    59.92
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            dc_bus_undervoltage_trip_level: default_undervoltage_trip(),
            dc_bus_overvoltage_trip_level: default_overvoltage_trip(),
        }
    }
}

impl BoardConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.dc_bus_undervoltage_trip_level >= self.dc_bus_overvoltage_trip_level {
            return Err(format!(
                "undervoltage trip ({}) must be below overvoltage trip ({})",
                self.dc_bus_undervoltage_trip_level, self.dc_bus_overvoltage_trip_level
            ));
        }
        Ok(())
    }
}
