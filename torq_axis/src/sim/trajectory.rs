//! Simulated trajectory planner. Records each plan for inspection.

use std::sync::Arc;

use torq_common::drive::TrajectoryPlanner;

use super::world::SimWorld;

pub struct SimTrajectory {
    world: Arc<SimWorld>,
}

impl SimTrajectory {
    pub fn new(world: Arc<SimWorld>) -> Self {
        Self { world }
    }
}

impl TrajectoryPlanner for SimTrajectory {
    fn plan_trapezoidal(
        &mut self,
        goal_pos: f32,
        current_pos: f32,
        current_vel: f32,
        vel_max: f32,
        accel_max: f32,
        decel_max: f32,
    ) {
        self.world.record_traj_plan((
            goal_pos,
            current_pos,
            current_vel,
            vel_max,
            accel_max,
            decel_max,
        ));
    }
}
