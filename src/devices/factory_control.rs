//! Factory-test control line, read by firmware to decide whether to enter
//! its factory test mode. `h8_factory_control_read` always returns
//! `H8_FACTORY_CONTROL_NO_TEST`; there is no write side and no factory ROM
//! image in this corpus to ever drive the line the other way.
//! Grounded on `examples/original_source/devices/factory_control.c`.

use crate::devices::Device;

pub struct FactoryControl;

impl FactoryControl {
    pub fn new() -> Self {
        FactoryControl
    }
}

impl Default for FactoryControl {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for FactoryControl {
    fn name(&self) -> &'static str {
        "factory-control"
    }

    fn pin_in(&mut self, pin: usize) -> Option<bool> {
        if pin == 0 {
            Some(true)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_zero_always_reads_no_test() {
        let mut fc = FactoryControl::new();
        assert_eq!(fc.pin_in(0), Some(true));
        assert_eq!(fc.pin_in(1), None);
    }
}
