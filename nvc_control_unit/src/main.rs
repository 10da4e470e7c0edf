//! # NVC Control Unit binary
//!
//! Loads the controller configuration (falling back to built-in defaults
//! on any load failure), builds the axis set, and runs the deterministic
//! cycle loop until Ctrl-C. Drive offsets accumulated during operation
//! are written back to the configuration file at shutdown when not in
//! simulation mode.
//!
//! This binary links no hardware device provider: requesting hardware
//! mode is a fatal binding error. Hardware deployments embed the library
//! and supply their own `DeviceProvider`.

use clap::Parser;
use nvc_common::config::{load_config_or_default, save_config};
use nvc_common::consts::DEFAULT_CYCLE_TIME_US;
use nvc_control_unit::controller::AxisSetController;
use nvc_control_unit::cycle::{rt_setup, CycleRunner};
use nvc_control_unit::factory::build_axes;
use nvc_control_unit::notify::TracingSink;
use nvc_control_unit::ports::axis_ports;
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

/// NVC Control Unit: joint velocity control loop
#[derive(Parser, Debug)]
#[command(name = "nvc_control_unit")]
#[command(version)]
#[command(about = "Deterministic velocity control loop for a fixed set of robot joints")]
struct Args {
    /// Path to the controller configuration TOML.
    #[arg(default_value = "config/controller.toml")]
    config: PathBuf,

    /// Force simulation mode regardless of the configuration file.
    #[arg(long)]
    simulation: bool,

    /// Arm the controller and start all axes once at startup.
    #[arg(long)]
    auto_start: bool,

    /// Control cycle time in microseconds.
    #[arg(long, default_value_t = DEFAULT_CYCLE_TIME_US)]
    cycle_time_us: u32,

    /// CPU core to pin the cycle thread to (rt builds).
    #[arg(long, default_value_t = 1)]
    cpu_core: usize,

    /// SCHED_FIFO priority (rt builds).
    #[arg(long, default_value_t = 80)]
    rt_priority: i32,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    setup_tracing(&args);

    info!("NVC Control Unit v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&args) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("NVC Control Unit shutdown complete");
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config_or_default(&args.config);
    if args.simulation {
        config.simulation = true;
    }
    info!(
        simulation = config.simulation,
        axes = config.axes.len(),
        cycle_time_us = args.cycle_time_us,
        "config OK"
    );

    let (axes, permissive) = build_axes(&config, None)?;
    let (controller_ports, peer_ports) = axis_ports();
    let mut controller = AxisSetController::new(
        config.clone(),
        axes,
        permissive,
        controller_ports,
        Box::new(TracingSink),
    );

    if args.auto_start {
        controller.arm_for_use();
        if !controller.unlock_all() {
            warn!("not every axis unlocked");
        }
        if !controller.start_all() {
            warn!("not every axis started");
        }
    }

    rt_setup(args.cpu_core, args.rt_priority)?;

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let mut runner = CycleRunner::new(controller, args.cycle_time_us, running);
    info!("entering cycle loop");
    let result = runner.run();

    let stats = runner.stats().clone();
    info!(
        cycles = stats.cycle_count,
        avg_ns = stats.avg_cycle_ns(),
        max_ns = stats.max_cycle_ns,
        overruns = stats.overruns,
        "cycle loop exited"
    );

    let controller = runner.into_controller();
    if !config.simulation {
        controller.store_drive_offsets(&mut config);
        if let Err(e) = save_config(&args.config, &config) {
            warn!(error = %e, "drive offset persistence failed");
        }
    }
    drop(controller); // disarms: stop-all, lock-all, permissive off

    // Keep the peer channel ends alive until the loop has exited.
    drop(peer_ports);

    result?;
    Ok(())
}

fn setup_tracing(args: &Args) {
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if args.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
