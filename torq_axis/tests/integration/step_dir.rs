//! Step/dir scenario: edges on the step pin move the position
//! setpoint while a control state is active.

use torq_common::axis::config::BoardConfig;
use torq_common::axis::state::AxisState;

use torq_axis::sim::SimRig;

use super::{calibrate, default_node, wait_for};

const STEP_PIN: u16 = 11;
const DIR_PIN: u16 = 12;

fn step_dir_node(counts_per_step: f32) -> torq_axis::config::AxisNodeConfig {
    let mut node = default_node();
    node.hw.step_pin = STEP_PIN;
    node.hw.dir_pin = DIR_PIN;
    node.config.enable_step_dir = true;
    node.config.counts_per_step = counts_per_step;
    node
}

#[test]
fn step_edges_nudge_the_position_setpoint() {
    let rig = SimRig::start(&step_dir_node(12.5), &BoardConfig::default());
    calibrate(&rig);
    rig.request_state(AxisState::ClosedLoopControl);

    wait_for("closed loop entry", || {
        rig.shared.current_state() == AxisState::ClosedLoopControl
            && rig.gpio.is_subscribed(STEP_PIN)
    });

    // Three positive steps.
    rig.gpio.set_level(DIR_PIN, true);
    for _ in 0..3 {
        rig.gpio.pulse(STEP_PIN);
    }
    assert_eq!(rig.world.pos_setpoint.load(), 37.5);

    // One negative step.
    rig.gpio.set_level(DIR_PIN, false);
    rig.gpio.pulse(STEP_PIN);
    assert_eq!(rig.world.pos_setpoint.load(), 25.0);

    rig.shutdown();
}

#[test]
fn step_input_is_released_when_leaving_the_control_state() {
    let rig = SimRig::start(&step_dir_node(2.0), &BoardConfig::default());
    calibrate(&rig);
    rig.request_state(AxisState::ClosedLoopControl);
    wait_for("step input subscribed", || rig.gpio.is_subscribed(STEP_PIN));

    rig.request_state(AxisState::Idle);
    wait_for("step input unsubscribed", || {
        !rig.gpio.is_subscribed(STEP_PIN)
    });

    rig.gpio.set_level(DIR_PIN, true);
    rig.gpio.pulse(STEP_PIN);
    assert_eq!(rig.world.pos_setpoint.load(), 0.0);
    rig.shutdown();
}
