//! Homing scenario: find the min endstop via the zero-velocity
//! window, home, and move back to zero.

use torq_common::axis::config::BoardConfig;
use torq_common::axis::error::AxisError;
use torq_common::axis::state::{AxisState, ControlMode, HomingState};

use torq_axis::sim::SimRig;

use super::{calibrate, default_node, wait_for};

#[test]
fn homing_via_zero_velocity_window_without_physical_endstop() {
    let mut node = default_node();
    node.min_endstop.enabled = true;
    node.min_endstop.physical_endstop = false;
    node.min_endstop.min_ms_homing = 50;

    let rig = SimRig::start(&node, &BoardConfig::default());
    calibrate(&rig);
    // The shaft sits parked against the hard limit: zero velocity,
    // some accumulated raw count.
    rig.world.set_shadow_count(1234);

    rig.request_state(AxisState::Homing);

    // Phase 1 completes once the zero-velocity window has elapsed;
    // with no max endstop the axis homes directly and moves to zero.
    wait_for("move-to-zero phase", || {
        rig.shared.homing_state() == HomingState::MoveToZero
    });
    assert_eq!(rig.world.min_offset_from_home(), 1234);
    assert_eq!(rig.world.linear_count(), 0);

    // The move-to-zero phase re-plans the trapezoid every tick while
    // the endstop stays released.
    wait_for("trajectory re-planning", || rig.world.traj_plans() >= 2);
    assert_eq!(
        rig.world.control_mode(),
        ControlMode::TrajectoryControl as u8
    );
    let (goal, _, _, vel_max, accel, decel) = rig.world.last_traj_plan();
    assert_eq!(goal, 0.0);
    assert_eq!(accel, vel_max / 4.0);
    assert_eq!(decel, vel_max / 4.0);

    // Reaching the endstop finishes homing; the normal endstop guard
    // then trips on the still-pressed switch and parks the axis.
    rig.world.press_min_endstop(true);
    wait_for("homing to finish", || {
        rig.shared.homing_state() == HomingState::Inactive
    });
    wait_for("endstop guard to trip", || {
        rig.shared.error().contains(AxisError::MIN_ENDSTOP_PRESSED)
    });
    wait_for("fall to idle", || {
        rig.shared.current_state() == AxisState::Idle
    });
    rig.shutdown();
}

#[test]
fn homing_seek_ends_immediately_on_a_pressed_switch() {
    let mut node = default_node();
    node.min_endstop.enabled = true;
    node.min_endstop.physical_endstop = true;
    node.min_endstop.min_ms_homing = 4000;
    node.min_endstop.offset = 100;

    let rig = SimRig::start(&node, &BoardConfig::default());
    calibrate(&rig);
    rig.world.encoder_vel.store(-200.0);
    rig.world.set_shadow_count(50);
    rig.world.press_min_endstop(true);

    rig.request_state(AxisState::Homing);

    // The switch is already pressed, so the seek transitions on the
    // first homing tick, long before the zero-velocity window; the
    // move-to-zero phase then exits on the same pressed switch.
    wait_for("min endstop capture", || {
        rig.world.min_offset_from_home() == 50
    });
    assert_eq!(rig.world.linear_count(), 100);
    wait_for("homing to finish", || {
        rig.shared.homing_state() == HomingState::Inactive
    });
    rig.shutdown();
}
