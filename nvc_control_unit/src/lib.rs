//! # NVC Control Unit
//!
//! Velocity control for a fixed set of robot joint axes. Each axis walks
//! a linear lifecycle (`Locked ⇄ Stopped ⇄ Driven`); a deterministic
//! per-tick update reads positions, enforces limits, and forwards legal
//! velocity commands to the axis backends.
//!
//! Axis backends are selected once at construction, either simulated
//! (velocity-integrating) or hardware-bound via a
//! [`backend::DeviceProvider`], and the controller operates only through
//! the uniform [`backend::AxisBackend`] capability surface afterwards.

pub mod axis;
pub mod backend;
pub mod command;
pub mod controller;
pub mod cycle;
pub mod error;
pub mod factory;
pub mod notify;
pub mod ports;
