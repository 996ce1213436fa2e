//! Homing sub-machine.
//!
//! Runs inside the closed-loop tick body whenever the homing state is
//! active. Two seek phases (min endstop, then max endstop if one is
//! configured) followed by a trajectory move back to zero.
//!
//! An endstop is "found" when either its switch asserts or the axis
//! has sat at zero velocity past the configured window; the latter is
//! how homing against a hard mechanical limit works when no physical
//! switch exists.

use torq_common::axis::state::{ControlMode, HomingState};
use torq_common::consts::ticks_for_ms;
use torq_common::drive::{Controller, Encoder, Endstop, TrajectoryPlanner};

/// Borrowed collaborator context for one homing tick.
pub struct HomingIo<'a> {
    pub encoder: &'a mut dyn Encoder,
    pub controller: &'a mut dyn Controller,
    pub trajectory: &'a mut dyn TrajectoryPlanner,
    pub min_endstop: &'a mut dyn Endstop,
    pub max_endstop: &'a mut dyn Endstop,
    /// Current control tick count.
    pub loop_counter: u64,
}

/// Per-entry homing progress. Re-created on each entry into
/// closed-loop control.
#[derive(Debug, Clone, Copy)]
pub struct Homing {
    /// True while phase 1 (min endstop seek) is active.
    pub finding_min_endstop: bool,
    /// Tick after which sustained zero velocity counts as "found".
    pub deadline_tick: u64,
}

impl Homing {
    /// Start a fresh homing run: seek the min endstop, with the
    /// zero-velocity deadline armed from its configured window.
    pub fn begin(loop_counter: u64, min_ms_homing: u32) -> Self {
        Self {
            finding_min_endstop: true,
            deadline_tick: loop_counter + ticks_for_ms(min_ms_homing),
        }
    }

    /// Run one homing tick. Returns the (possibly unchanged) homing
    /// state; the caller publishes transitions.
    pub fn tick(&mut self, state: HomingState, io: &mut HomingIo<'_>) -> HomingState {
        match state {
            HomingState::Inactive => HomingState::Inactive,
            HomingState::Homing => self.seek_tick(io),
            HomingState::MoveToZero => Self::move_to_zero_tick(io),
        }
    }

    fn seek_tick(&mut self, io: &mut HomingIo<'_>) -> HomingState {
        let pressed = if self.finding_min_endstop {
            io.min_endstop.is_pressed()
        } else {
            io.max_endstop.is_pressed()
        };
        // Zero velocity sustained past the window: the axis is parked
        // against a hard limit.
        let found_end = io.encoder.vel_estimate() == 0.0 && io.loop_counter >= self.deadline_tick;

        if !(pressed || found_end) {
            return HomingState::Homing;
        }

        if self.finding_min_endstop {
            self.min_found(io)
        } else {
            Self::max_found(io)
        }
    }

    /// Phase 1 transition: min endstop located.
    fn min_found(&mut self, io: &mut HomingIo<'_>) -> HomingState {
        // Temporarily park the raw count here; phase 2 turns it into
        // the real offset.
        io.min_endstop.set_offset_from_home(io.encoder.shadow_count());
        self.finding_min_endstop = false;
        self.deadline_tick =
            io.loop_counter + ticks_for_ms(io.min_endstop.config().min_ms_homing);

        if io.max_endstop.config().enabled {
            // Phase 2: drive towards the max endstop at homing speed.
            io.controller.set_vel_integrator_current(0.0);
            let homing_speed = io.controller.homing_speed();
            io.controller.set_vel_setpoint(homing_speed, 0.0);
            HomingState::Homing
        } else {
            // No max endstop: the min position defines zero directly.
            io.encoder.set_linear_count(io.min_endstop.config().offset);
            io.controller.set_pos_setpoint(0.0, 0.0, 0.0);
            HomingState::MoveToZero
        }
    }

    /// Phase 2 transition: max endstop located, travel measured.
    fn max_found(io: &mut HomingIo<'_>) -> HomingState {
        let total_cpr = io.encoder.shadow_count() - io.min_endstop.offset_from_home();
        let home_percentage = io.min_endstop.config().home_percentage;

        if home_percentage > 0.0 {
            let min_offset = -(total_cpr as f32) * (home_percentage / 100.0);
            io.min_endstop.set_offset_from_home(min_offset as i32);
            io.max_endstop
                .set_offset_from_home(total_cpr + io.min_endstop.offset_from_home());
            io.encoder
                .set_linear_count(-io.min_endstop.offset_from_home());
        } else {
            let offset = io.min_endstop.config().offset;
            io.min_endstop.set_offset_from_home(offset);
            io.max_endstop.set_offset_from_home(total_cpr + offset);
            io.encoder.set_linear_count(offset);
        }

        io.controller.set_pos_setpoint(0.0, 0.0, 0.0);
        HomingState::MoveToZero
    }

    /// Trajectory move back to zero. Re-plans the trapezoid every tick
    /// while the min endstop stays unasserted.
    fn move_to_zero_tick(io: &mut HomingIo<'_>) -> HomingState {
        if io.min_endstop.is_pressed() {
            return HomingState::Inactive;
        }
        let homing_speed = io.controller.homing_speed();
        io.trajectory.plan_trapezoidal(
            0.0,
            io.encoder.pos_estimate(),
            io.encoder.vel_estimate(),
            homing_speed,
            homing_speed / 4.0,
            homing_speed / 4.0,
        );
        io.controller.set_traj_start_tick(io.loop_counter);
        io.controller.set_control_mode(ControlMode::TrajectoryControl);
        HomingState::MoveToZero
    }
}
