//! Per-axis data channel bundles.
//!
//! Each axis exchanges two periodic scalars with the outside world: the
//! commanded velocity flowing in and the measured position flowing out.
//! `axis_ports()` creates both channel sets and hands the controller its
//! ends; the peer ends go to whatever feeds commands and consumes
//! positions.

use nvc_channel::{channel, ScalarReader, ScalarWriter};
use nvc_common::consts::NUM_AXES;

/// Velocity read on an input channel that was never written [rad/s].
pub const DEFAULT_COMMANDED_VELOCITY: f64 = 0.0;

/// Controller-side channel ends for one axis.
#[derive(Debug)]
pub struct AxisPorts {
    /// Latest commanded velocity [rad/s].
    pub velocity_in: ScalarReader,
    /// Latest measured position [rad].
    pub position_out: ScalarWriter,
}

/// Peer-side channel ends for one axis.
#[derive(Debug)]
pub struct PeerPorts {
    /// Commanded velocity [rad/s] into the controller.
    pub velocity_out: ScalarWriter,
    /// Measured position [rad] out of the controller.
    pub position_in: ScalarReader,
}

/// Create the channel pairs for all axes.
pub fn axis_ports() -> ([AxisPorts; NUM_AXES], [PeerPorts; NUM_AXES]) {
    let mut controller_side = Vec::with_capacity(NUM_AXES);
    let mut peer_side = Vec::with_capacity(NUM_AXES);

    for _ in 0..NUM_AXES {
        let (velocity_out, velocity_in) = channel(DEFAULT_COMMANDED_VELOCITY);
        let (position_out, position_in) = channel(0.0);
        controller_side.push(AxisPorts {
            velocity_in,
            position_out,
        });
        peer_side.push(PeerPorts {
            velocity_out,
            position_in,
        });
    }

    // The loop above fills both vectors to exactly NUM_AXES.
    let controller_side: [AxisPorts; NUM_AXES] = controller_side
        .try_into()
        .expect("built exactly NUM_AXES ports");
    let peer_side: [PeerPorts; NUM_AXES] = peer_side
        .try_into()
        .expect("built exactly NUM_AXES ports");
    (controller_side, peer_side)
}
