//! Device polymorphism. Restated per SPEC_FULL.md REDESIGN FLAGS as a
//! `Device` trait object rather than the donor's function-pointer-plus-
//! opaque-state `h8_device_t` (`examples/original_source/device.h`); the
//! system's pin/ADC/SSU dispatch tables hold `usize` indices into a
//! `Vec<Box<dyn Device>>` rather than raw pointers.

pub mod adc;
pub mod bma150;
pub mod buttons;
pub mod eeprom;
pub mod factory_control;
pub mod ir;
pub mod lcd;
pub mod led;
pub mod rtc;

/// Every external device a system preset can wire up. Devices are pure
/// state machines: the system drives them, they never reach back into
/// the system.
pub trait Device {
    fn name(&self) -> &'static str;

    /// Per-pin input callback: does this device drive pin `pin` high right
    /// now? `None` means this device has no input callback for that pin
    /// index (the system preserves the PDR's stored bit in that case).
    fn pin_in(&mut self, _pin: usize) -> Option<bool> {
        None
    }

    /// Per-pin output callback: the CPU stored `value` on pin `pin`.
    fn pin_out(&mut self, _pin: usize, _value: bool) {}

    /// SSU receive-data read. `None` if this device is not currently
    /// selected (the system polls every attached device in order and
    /// takes the first `Some`).
    fn ssu_in(&mut self) -> Option<u8> {
        None
    }

    /// SSU transmit-data write. Returns whether this device was selected
    /// and consumed the byte.
    fn ssu_out(&mut self, _byte: u8) -> bool {
        false
    }

    /// A/D converter value-producer callback, for devices wired to an
    /// analog channel (accelerometer axes, battery level).
    fn adc_value(&mut self) -> Option<u16> {
        None
    }

    fn save(&self) -> Option<Vec<u8>> {
        None
    }

    fn load(&mut self, _buf: &[u8]) -> bool {
        false
    }

    /// Host-side button press/release injection; a no-op on any device
    /// that isn't a [`Buttons`].
    fn set_button(&mut self, _index: usize, _pressed: bool) {}

    /// Host-side accelerometer axis injection; a no-op on any device
    /// that isn't a [`Bma150`].
    fn set_accelerometer_axis(&mut self, _x: u16, _y: u16, _z: u16) {}
}

pub use adc::{AccelerometerAxisSource, AdcChannel, AdcStrategy, Battery};
pub use bma150::Bma150;
pub use buttons::Buttons;
pub use eeprom::Eeprom;
pub use factory_control::FactoryControl;
pub use ir::IrBuffer;
pub use lcd::Lcd;
pub use led::{Led, LedState};
pub use rtc::Rtc;
