//! Hardware-bound axis backend.
//!
//! Composes the per-axis device bindings (encoder channel, analog drive
//! output, enable line, brake relay) with the static conversion table.
//! The drive offset accumulates here and is persisted at shutdown.

use super::{AxisBackend, PositionSensor, SwitchOutput, VelocityActuator};
use nvc_common::conversion::Conversion;

/// One axis bound to real devices.
pub struct HardwareBackend {
    sensor: Box<dyn PositionSensor>,
    actuator: Box<dyn VelocityActuator>,
    enable: Box<dyn SwitchOutput>,
    brake: Box<dyn SwitchOutput>,
    conversion: Conversion,
    drive_offset: f64,
}

impl HardwareBackend {
    /// Bind an axis to its devices.
    ///
    /// `drive_offset` is the persisted bias adjustment [rad/s] restored
    /// from configuration.
    pub fn new(
        sensor: Box<dyn PositionSensor>,
        actuator: Box<dyn VelocityActuator>,
        enable: Box<dyn SwitchOutput>,
        brake: Box<dyn SwitchOutput>,
        conversion: Conversion,
        drive_offset: f64,
    ) -> Self {
        Self {
            sensor,
            actuator,
            enable,
            brake,
            conversion,
            drive_offset,
        }
    }
}

impl AxisBackend for HardwareBackend {
    fn read_position(&mut self) -> f64 {
        self.conversion.position_from_ticks(self.sensor.read_ticks())
    }

    fn apply_drive(&mut self, velocity: f64) {
        let volts = self
            .conversion
            .volts_from_velocity(velocity + self.drive_offset);
        self.actuator.write_volts(volts);
    }

    fn set_drive_enabled(&mut self, enabled: bool) {
        self.enable.set(enabled);
    }

    fn set_brake(&mut self, engaged: bool) {
        self.brake.set(engaged);
    }

    fn add_drive_offset(&mut self, offset: f64) {
        self.drive_offset += offset;
    }

    fn drive_offset(&self) -> f64 {
        self.drive_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Shared scratchpad standing in for the device registers.
    #[derive(Debug, Default)]
    struct FakeDevices {
        ticks: i32,
        volts: Option<f64>,
        enabled: bool,
        brake: bool,
    }

    struct FakeSensor(Arc<Mutex<FakeDevices>>);
    impl PositionSensor for FakeSensor {
        fn read_ticks(&mut self) -> i32 {
            self.0.lock().unwrap().ticks
        }
    }

    struct FakeActuator(Arc<Mutex<FakeDevices>>);
    impl VelocityActuator for FakeActuator {
        fn write_volts(&mut self, volts: f64) {
            self.0.lock().unwrap().volts = Some(volts);
        }
    }

    struct FakeEnable(Arc<Mutex<FakeDevices>>);
    impl SwitchOutput for FakeEnable {
        fn set(&mut self, on: bool) {
            self.0.lock().unwrap().enabled = on;
        }
    }

    struct FakeBrake(Arc<Mutex<FakeDevices>>);
    impl SwitchOutput for FakeBrake {
        fn set(&mut self, on: bool) {
            self.0.lock().unwrap().brake = on;
        }
    }

    fn conversion() -> Conversion {
        Conversion {
            rad_per_tick: 0.001,
            encoder_offset: 1000,
            volt_per_rad_s: 2.0,
        }
    }

    fn backend_with_devices() -> (HardwareBackend, Arc<Mutex<FakeDevices>>) {
        let devices = Arc::new(Mutex::new(FakeDevices::default()));
        let backend = HardwareBackend::new(
            Box::new(FakeSensor(devices.clone())),
            Box::new(FakeActuator(devices.clone())),
            Box::new(FakeEnable(devices.clone())),
            Box::new(FakeBrake(devices.clone())),
            conversion(),
            0.1,
        );
        (backend, devices)
    }

    #[test]
    fn position_is_scaled_encoder_reading() {
        let (mut backend, devices) = backend_with_devices();
        devices.lock().unwrap().ticks = 1500;
        assert!((backend.read_position() - 0.5).abs() < 1e-12);

        devices.lock().unwrap().ticks = 1000;
        assert_eq!(backend.read_position(), 0.0);
    }

    #[test]
    fn drive_writes_converted_volts_with_offset() {
        let (mut backend, devices) = backend_with_devices();
        backend.apply_drive(0.5);
        // (0.5 + 0.1 offset) * 2.0 V per rad/s
        let volts = devices.lock().unwrap().volts.unwrap();
        assert!((volts - 1.2).abs() < 1e-12);
    }

    #[test]
    fn offset_accumulates_across_adjustments() {
        let (mut backend, devices) = backend_with_devices();
        backend.add_drive_offset(0.2);
        backend.add_drive_offset(-0.05);
        assert!((backend.drive_offset() - 0.25).abs() < 1e-12);

        backend.apply_drive(0.0);
        let volts = devices.lock().unwrap().volts.unwrap();
        assert!((volts - 0.5).abs() < 1e-12);
    }

    #[test]
    fn enable_and_brake_reach_their_switches() {
        let (mut backend, devices) = backend_with_devices();
        backend.set_drive_enabled(true);
        backend.set_brake(true);
        {
            let d = devices.lock().unwrap();
            assert!(d.enabled);
            assert!(d.brake);
        }
        backend.set_drive_enabled(false);
        backend.set_brake(false);
        let d = devices.lock().unwrap();
        assert!(!d.enabled);
        assert!(!d.brake);
    }
}
