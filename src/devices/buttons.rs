//! Discrete push-buttons wired to port input pins: one-button and
//! three-button variants. Grounded on
//! `examples/original_source/devices/buttons.c`.

use crate::devices::Device;

pub struct Buttons {
    pressed: Vec<bool>,
}

impl Buttons {
    pub fn one_button() -> Self {
        Buttons { pressed: vec![false; 1] }
    }

    pub fn three_button() -> Self {
        Buttons { pressed: vec![false; 3] }
    }

    /// Host-side input injection: press or release button `index`.
    pub fn set_pressed(&mut self, index: usize, pressed: bool) {
        if let Some(slot) = self.pressed.get_mut(index) {
            *slot = pressed;
        }
    }
}

impl Device for Buttons {
    fn name(&self) -> &'static str {
        "buttons"
    }

    fn pin_in(&mut self, pin: usize) -> Option<bool> {
        // Buttons are active-low: an unpressed button holds its pin high.
        self.pressed.get(pin).map(|pressed| !pressed)
    }

    fn set_button(&mut self, index: usize, pressed: bool) {
        self.set_pressed(index, pressed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpressed_button_reads_high() {
        let mut buttons = Buttons::one_button();
        assert_eq!(buttons.pin_in(0), Some(true));
    }

    #[test]
    fn pressed_button_reads_low() {
        let mut buttons = Buttons::three_button();
        buttons.set_pressed(1, true);
        assert_eq!(buttons.pin_in(1), Some(false));
        assert_eq!(buttons.pin_in(0), Some(true));
    }
}
