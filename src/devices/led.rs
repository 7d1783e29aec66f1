//! Dual-colour (red/green) status LED driven by two port pins. Grounded on
//! `examples/original_source/devices/led.c`: pin 0 is the on/off latch,
//! pin 1 picks the colour while on, and green takes priority over red
//! whenever both are asserted — there is no combined "both" state.

use crate::devices::Device;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedState {
    Off,
    Red,
    Green,
}

pub struct Led {
    on: bool,
    green: bool,
}

impl Led {
    pub fn new() -> Self {
        Led { on: false, green: false }
    }

    pub fn state(&self) -> LedState {
        if !self.on {
            LedState::Off
        } else if self.green {
            LedState::Green
        } else {
            LedState::Red
        }
    }
}

impl Default for Led {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for Led {
    fn name(&self) -> &'static str {
        "led"
    }

    fn pin_out(&mut self, pin: usize, value: bool) {
        match pin {
            0 => self.on = value,
            1 => self.green = value,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn green_takes_priority_over_red_when_both_latched() {
        let mut led = Led::new();
        led.pin_out(1, true);
        led.pin_out(0, true);
        assert_eq!(led.state(), LedState::Green);
    }

    #[test]
    fn on_without_green_is_red() {
        let mut led = Led::new();
        led.pin_out(0, true);
        assert_eq!(led.state(), LedState::Red);
    }

    #[test]
    fn default_state_is_off() {
        assert_eq!(Led::new().state(), LedState::Off);
    }

    #[test]
    fn turning_off_overrides_colour() {
        let mut led = Led::new();
        led.pin_out(1, true);
        led.pin_out(0, true);
        led.pin_out(0, false);
        assert_eq!(led.state(), LedState::Off);
    }
}
