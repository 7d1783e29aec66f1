//! SPI-like EEPROM command protocol, 8 KiB or 64 KiB. Grounded on
//! `examples/original_source/devices/eeprom.c` for the general rx-stream/
//! position-counter shape; the fuller six-command protocol and status bits
//! follow SPEC_FULL.md §4.6.1 since the on-disk donor snapshot implements
//! only a two-path (READ vs not) subset.

use crate::devices::Device;

const CMD_WRSR: u8 = 0x01;
const CMD_WRITE: u8 = 0x02;
const CMD_READ: u8 = 0x03;
const CMD_WRDI: u8 = 0x04;
const CMD_RDSR: u8 = 0x05;
const CMD_WREN: u8 = 0x06;

bitflags::bitflags! {
    pub struct StatusRegister: u8 {
        const WIP  = 0b0000_0001;
        const WEL  = 0b0000_0010;
        const BP0  = 0b0000_0100;
        const BP1  = 0b0000_1000;
        const SRWD = 0b1000_0000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Idle,
    Wrsr,
    Write,
    Read,
    Rdsr,
}

pub struct Eeprom {
    name: &'static str,
    data: Vec<u8>,
    address: u16,
    status: StatusRegister,
    selected: bool,
    mode: Mode,
    position: usize,
}

impl Eeprom {
    pub fn new_8k() -> Self {
        Self::with_size("eeprom-8k", 8 * 1024)
    }

    pub fn new_64k() -> Self {
        Self::with_size("eeprom-64k", 64 * 1024)
    }

    fn with_size(name: &'static str, size: usize) -> Self {
        Eeprom {
            name,
            data: vec![0xFF; size],
            address: 0,
            status: StatusRegister::empty(),
            selected: false,
            mode: Mode::Idle,
            position: 0,
        }
    }

    fn mask_address(&self, address: u16) -> usize {
        (address as usize) & (self.data.len() - 1)
    }

    fn deselect(&mut self) {
        self.selected = false;
        self.mode = Mode::Idle;
        self.position = 0;
    }
}

impl Device for Eeprom {
    fn name(&self) -> &'static str {
        self.name
    }

    fn pin_out(&mut self, pin: usize, value: bool) {
        // Pin 0 is the active-low SSU chip-select.
        if pin == 0 {
            let now_selected = !value;
            if self.selected && !now_selected {
                self.deselect();
            }
            self.selected = now_selected;
        }
    }

    fn ssu_out(&mut self, byte: u8) -> bool {
        if !self.selected {
            return false;
        }
        if self.position == 0 {
            self.mode = match byte {
                CMD_WRSR => Mode::Wrsr,
                CMD_WRITE => Mode::Write,
                CMD_READ => Mode::Read,
                CMD_WRDI => {
                    self.status.remove(StatusRegister::WEL);
                    Mode::Idle
                }
                CMD_RDSR => Mode::Rdsr,
                CMD_WREN => {
                    self.status.insert(StatusRegister::WEL);
                    Mode::Idle
                }
                other => {
                    log::warn!(target: "h8300h::devices::eeprom", "unknown EEPROM opcode {:#04x}", other);
                    Mode::Idle
                }
            };
            self.position = 1;
            return true;
        }
        match self.mode {
            Mode::Wrsr => {
                if self.position == 1 && self.status.contains(StatusRegister::WEL) {
                    let wel = self.status & StatusRegister::WEL;
                    self.status = StatusRegister::from_bits_truncate(byte) | wel;
                }
                self.position += 1;
            }
            Mode::Write | Mode::Read => {
                if self.position == 1 {
                    self.address = (byte as u16) << 8;
                } else if self.position == 2 {
                    self.address |= byte as u16;
                } else if self.mode == Mode::Write {
                    if self.status.contains(StatusRegister::WEL) {
                        let idx = self.mask_address(self.address);
                        self.data[idx] = byte;
                    }
                    self.address = self.address.wrapping_add(1);
                }
                self.position += 1;
            }
            Mode::Rdsr | Mode::Idle => {
                self.position += 1;
            }
        }
        true
    }

    fn ssu_in(&mut self) -> Option<u8> {
        if !self.selected {
            return None;
        }
        match self.mode {
            Mode::Read if self.position > 2 => {
                let idx = self.mask_address(self.address);
                let value = self.data[idx];
                self.address = self.address.wrapping_add(1);
                Some(value)
            }
            Mode::Rdsr => Some(self.status.bits()),
            _ => Some(0),
        }
    }

    fn save(&self) -> Option<Vec<u8>> {
        let mut buf = self.data.clone();
        buf.push(self.status.bits());
        buf.extend_from_slice(&self.address.to_be_bytes());
        Some(buf)
    }

    fn load(&mut self, buf: &[u8]) -> bool {
        if buf.len() != self.data.len() + 3 {
            return false;
        }
        self.data.copy_from_slice(&buf[..self.data.len()]);
        self.status = StatusRegister::from_bits_truncate(buf[self.data.len()]);
        self.address = u16::from_be_bytes([buf[self.data.len() + 1], buf[self.data.len() + 2]]);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_round_trips() {
        let mut eeprom = Eeprom::new_8k();
        eeprom.pin_out(0, false); // select (active low)

        eeprom.ssu_out(CMD_WREN);
        eeprom.pin_out(0, true);
        eeprom.pin_out(0, false);

        for byte in [CMD_WRITE, 0x00, 0x10, 0xAB] {
            eeprom.ssu_out(byte);
        }
        eeprom.pin_out(0, true);
        eeprom.pin_out(0, false);

        for byte in [CMD_READ, 0x00, 0x10] {
            eeprom.ssu_out(byte);
        }
        let value = eeprom.ssu_in().unwrap();
        // One more don't-care byte is needed after the address pair before
        // the data byte at 0x10 comes back, matching the donor's
        // two-address-byte-then-N-data-byte framing.
        assert_eq!(value, 0xAB);
    }

    #[test]
    fn write_without_wren_is_ignored() {
        let mut eeprom = Eeprom::new_8k();
        eeprom.pin_out(0, false);
        for byte in [CMD_WRITE, 0x00, 0x00, 0x42] {
            eeprom.ssu_out(byte);
        }
        eeprom.pin_out(0, true);
        eeprom.pin_out(0, false);
        for byte in [CMD_READ, 0x00, 0x00] {
            eeprom.ssu_out(byte);
        }
        assert_eq!(eeprom.ssu_in().unwrap(), 0xFF);
    }
}
