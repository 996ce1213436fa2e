//! Sequencing scenarios: request expansion, calibration ordering and
//! prerequisite validation against a live worker.

use torq_common::axis::config::BoardConfig;
use torq_common::axis::error::AxisError;
use torq_common::axis::state::AxisState;

use torq_axis::sim::{SimRig, SimRigOptions};

use super::{calibrate, default_node, wait_for};

#[test]
fn request_idle_from_fresh_boot() {
    let rig = SimRig::start(&default_node(), &BoardConfig::default());
    rig.request_state(AxisState::Idle);

    wait_for("axis to reach idle", || {
        rig.shared.current_state() == AxisState::Idle
    });
    wait_for("errors to clear", || rig.shared.error().is_empty());
    // Idle guarantees the PWM is disarmed before any tick runs, and
    // with no further request the axis stays there.
    wait_for("motor to disarm", || !rig.world.motor_armed());
    assert_eq!(rig.shared.requested_state(), AxisState::Undefined);
    assert!(rig.shutdown().is_some());
}

#[test]
fn full_calibration_sequence_runs_in_order() {
    let options = SimRigOptions {
        encoder_use_index: true,
        ..Default::default()
    };
    let rig = SimRig::start_opts(&default_node(), &BoardConfig::default(), options);
    rig.request_state(AxisState::FullCalibrationSequence);

    wait_for("calibration chain to finish", || {
        rig.shared.current_state() == AxisState::Idle && rig.world.calls().len() >= 3
    });
    assert_eq!(
        rig.world.calls(),
        vec!["motor_calibration", "index_search", "offset_calibration"]
    );
    assert!(rig.shared.error().is_empty());
    rig.shutdown();
}

#[test]
fn full_calibration_without_index_skips_the_search() {
    let rig = SimRig::start(&default_node(), &BoardConfig::default());
    rig.request_state(AxisState::FullCalibrationSequence);

    wait_for("calibration chain to finish", || {
        rig.shared.current_state() == AxisState::Idle && rig.world.calls().len() >= 2
    });
    assert_eq!(
        rig.world.calls(),
        vec!["motor_calibration", "offset_calibration"]
    );
    rig.shutdown();
}

#[test]
fn closed_loop_before_calibration_is_rejected() {
    let rig = SimRig::start(&default_node(), &BoardConfig::default());
    // Motor never calibrated: prerequisite validation must force the
    // state to undefined and fall to idle.
    rig.request_state(AxisState::ClosedLoopControl);

    wait_for("invalid state error", || {
        rig.shared.error().contains(AxisError::INVALID_STATE)
    });
    wait_for("fall to idle", || {
        rig.shared.current_state() == AxisState::Idle
    });
    // The closed loop never ran a tick body against the motor.
    assert_eq!(rig.world.motor_updates(), 0);
    rig.shutdown();
}

#[test]
fn failed_motor_calibration_falls_to_idle_without_advancing() {
    let rig = SimRig::start(&default_node(), &BoardConfig::default());
    rig.world
        .fail_motor_calibration
        .store(true, std::sync::atomic::Ordering::Release);
    rig.request_state(AxisState::FullCalibrationSequence);

    wait_for("fall to idle", || {
        rig.shared.current_state() == AxisState::Idle
    });
    // The chain stopped at the failed handler: no encoder routines ran.
    assert_eq!(rig.world.calls(), vec!["motor_calibration"]);
    rig.shutdown();
}

#[test]
fn closed_loop_runs_once_calibrated() {
    let rig = SimRig::start(&default_node(), &BoardConfig::default());
    calibrate(&rig);
    rig.request_state(AxisState::ClosedLoopControl);

    wait_for("closed loop entry", || {
        rig.shared.current_state() == AxisState::ClosedLoopControl
    });
    wait_for("ticks to flow", || rig.world.motor_updates() > 10);
    assert!(rig.shared.error().is_empty());

    rig.request_state(AxisState::Idle);
    wait_for("return to idle", || {
        rig.shared.current_state() == AxisState::Idle
    });
    wait_for("motor to disarm", || !rig.world.motor_armed());
    rig.shutdown();
}
