//! Control loop scenarios: missed measurement signals and the
//! sensorless spin-up hand-off.

use torq_common::axis::config::BoardConfig;
use torq_common::axis::error::AxisError;
use torq_common::axis::state::{AxisState, ControlMode};

use torq_axis::sim::SimRig;

use super::{calibrate, default_node, wait_for};

#[test]
fn missed_tick_outside_idle_faults_and_disarms() {
    let rig = SimRig::start(&default_node(), &BoardConfig::default());
    calibrate(&rig);
    rig.request_state(AxisState::ClosedLoopControl);
    wait_for("closed loop entry", || {
        rig.shared.current_state() == AxisState::ClosedLoopControl
            && rig.world.motor_updates() > 0
    });

    // Kill the measurement signal: the next wait times out and the
    // axis must fault to idle with the PWM disarmed.
    let mut rig = rig;
    rig.stop_ticker();

    wait_for("control loop missed error", || {
        rig.shared.error().contains(AxisError::CONTROL_LOOP_MISSED)
    });
    wait_for("fall to idle", || {
        rig.shared.current_state() == AxisState::Idle
    });
    wait_for("motor to disarm", || !rig.world.motor_armed());
    rig.shutdown();
}

#[test]
fn sensorless_spin_up_hands_off_at_target_velocity() {
    let mut node = default_node();
    // Short profile so the whole spin-up takes ~150 ticks.
    node.config.ramp_up_time = 0.0125;
    node.config.ramp_up_distance = 4.0;
    node.config.spin_up_current = 10.0;
    node.config.spin_up_acceleration = 1600.0;
    node.config.spin_up_target_vel = 330.0;

    let rig = SimRig::start(&node, &BoardConfig::default());
    rig.world
        .motor_calibrated
        .store(true, std::sync::atomic::Ordering::Release);
    // Sensorless control rejects position-class modes; stage velocity
    // mode before entering.
    rig.world.set_control_mode(ControlMode::VelocityControl as u8);

    rig.request_state(AxisState::SensorlessControl);
    wait_for("sensorless control entry", || {
        rig.shared.current_state() == AxisState::SensorlessControl
    });
    // Spin-up left the velocity setpoint at the hand-off velocity so
    // the closed sensorless loop starts smoothly.
    wait_for("hand-off setpoint", || {
        rig.world.vel_setpoint.load() == 330.0
    });
    assert!(rig.shared.error().is_empty());
    let updates_after_spin_up = rig.world.motor_updates();
    wait_for("sensorless loop ticking", || {
        rig.world.motor_updates() > updates_after_spin_up + 10
    });

    // Commanding position control mid-flight is rejected.
    rig.world.set_control_mode(ControlMode::PositionControl as u8);
    wait_for("position control rejected", || {
        rig.shared
            .error()
            .contains(AxisError::POS_CTRL_DURING_SENSORLESS)
    });
    wait_for("fall to idle", || {
        rig.shared.current_state() == AxisState::Idle
    });
    rig.shutdown();
}

#[test]
fn motor_fault_during_closed_loop_parks_the_axis() {
    let rig = SimRig::start(&default_node(), &BoardConfig::default());
    calibrate(&rig);
    rig.request_state(AxisState::ClosedLoopControl);
    wait_for("closed loop entry", || rig.world.motor_updates() > 0);

    rig.world
        .fail_motor_update
        .store(true, std::sync::atomic::Ordering::Release);
    wait_for("motor failure recorded", || {
        rig.shared.error().contains(AxisError::MOTOR_FAILED)
    });
    wait_for("fall to idle", || {
        rig.shared.current_state() == AxisState::Idle
    });
    rig.shutdown();
}

#[test]
fn undervoltage_trips_the_bus_check() {
    let rig = SimRig::start(&default_node(), &BoardConfig::default());
    calibrate(&rig);
    rig.request_state(AxisState::ClosedLoopControl);
    wait_for("closed loop entry", || rig.world.motor_updates() > 0);

    rig.board.vbus_voltage.store(5.0);
    wait_for("undervoltage error", || {
        rig.shared.error().contains(AxisError::DC_BUS_UNDER_VOLTAGE)
    });
    wait_for("fall to idle", || {
        rig.shared.current_state() == AxisState::Idle
    });
    rig.shutdown();
}
