//! # TORQ Axis Controller binary
//!
//! Operator entry point for bench bring-up: loads the drive config,
//! builds one simulated axis per configured block, runs the startup
//! sequence and logs telemetry once per second. Hardware builds link
//! their own collaborator implementations instead of the simulation.

use std::path::Path;
use std::process;
use std::time::Duration;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use torq_axis::config::load_config;
use torq_axis::sim::{SimRig, SimRigOptions};
use torq_common::axis::error::AxisError;
use torq_common::axis::state::AxisState;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/drive.toml".to_string());

    info!("loading drive config from {config_path}");
    let config = match load_config(Path::new(&config_path)) {
        Ok(config) => config,
        Err(e) => {
            error!("FATAL: {e}");
            process::exit(1);
        }
    };
    if config.axes.is_empty() {
        error!("FATAL: no axes configured");
        process::exit(1);
    }

    let rigs: Vec<SimRig> = config
        .axes
        .iter()
        .enumerate()
        .map(|(i, node)| {
            let options = SimRigOptions {
                id: i as u8,
                ..Default::default()
            };
            SimRig::start_opts(node, &config.board, options)
        })
        .collect();
    info!(axes = rigs.len(), "simulated axes running");

    for rig in &rigs {
        rig.request_state(AxisState::StartupSequence);
    }

    loop {
        std::thread::sleep(Duration::from_secs(1));
        for (i, rig) in rigs.iter().enumerate() {
            let snap = rig.shared.snapshot();
            let error = AxisError::from_bits_truncate(snap.error_bits);
            info!(
                axis = i,
                state = ?AxisState::from_u8(snap.current_state),
                ticks = snap.loop_counter,
                error = ?error,
                "telemetry"
            );
        }
    }
}
