//! Axis backend selection.
//!
//! Builds the fixed axis set once, at controller construction: simulated
//! backends when the configuration says so, hardware backends from a
//! [`DeviceProvider`] otherwise. Callers never branch on backend kind
//! after this point.

use crate::axis::Axis;
use crate::backend::{
    AxisBackend, DeviceProvider, HardwareBackend, NullPermissive, PermissiveCircuit,
    SimulationBackend,
};
use crate::error::ControllerError;
use nvc_common::config::{AxisConfig, ControllerConfig};
use nvc_common::consts::NUM_AXES;
use nvc_common::conversion;
use tracing::info;

/// Fixed-size axis set.
pub type AxisSet = heapless::Vec<Axis, NUM_AXES>;

/// Build the axis set and the permissive circuit for a configuration.
///
/// Hardware mode requires a `provider`; any binding it fails to construct
/// aborts the whole build. Missing axis entries in the configuration are
/// filled with defaults.
pub fn build_axes(
    config: &ControllerConfig,
    provider: Option<&mut dyn DeviceProvider>,
) -> Result<(AxisSet, Box<dyn PermissiveCircuit>), ControllerError> {
    if config.simulation {
        let mut axes = AxisSet::new();
        for i in 0..NUM_AXES {
            let axis_cfg = axis_config(config, i);
            let backend = Box::new(SimulationBackend::new(&axis_cfg));
            push_axis(&mut axes, i, backend);
        }
        info!(axes = NUM_AXES, "simulation axis set ready");
        return Ok((axes, Box::new(NullPermissive)));
    }

    let Some(provider) = provider else {
        return Err(ControllerError::HardwareBinding(
            "hardware mode requested but no device provider is available".to_string(),
        ));
    };

    let table = conversion::table();
    let mut axes = AxisSet::new();
    for i in 0..NUM_AXES {
        let axis_cfg = axis_config(config, i);
        let mut backend = Box::new(HardwareBackend::new(
            provider.position_sensor(i)?,
            provider.velocity_actuator(i)?,
            provider.enable_output(i)?,
            provider.brake_output(i)?,
            table[i],
            axis_cfg.drive_offset,
        ));
        // Known-safe output state before the axis takes over: brake
        // engaged, drive stage off.
        backend.set_brake(true);
        backend.set_drive_enabled(false);
        push_axis(&mut axes, i, backend);
    }
    let permissive = provider.permissive_circuit()?;
    info!(axes = NUM_AXES, "hardware axis set ready");
    Ok((axes, permissive))
}

fn axis_config(config: &ControllerConfig, axis: usize) -> AxisConfig {
    config.axes.get(axis).cloned().unwrap_or_default()
}

fn push_axis(axes: &mut AxisSet, index: usize, backend: Box<dyn AxisBackend>) {
    // Capacity equals NUM_AXES and the build loop is bounded by it.
    axes.push(Axis::new(index, backend))
        .expect("axis set within NUM_AXES");
}
