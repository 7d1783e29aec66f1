//! Manual integration harness (`harness = false` in Cargo.toml): a plain
//! `fn main()` that runs each check in turn and panics on the first
//! failure, rather than linking libtest.

use h8300h::devices::{AdcStrategy, Device, Led};
use h8300h::memory;
use h8300h::{System, SystemId};

const PDR9: usize = 0xFFDC;
const SSTDR: usize = 0xF0EB;
const SSRDR: usize = 0xF0E9;

fn blank() -> System {
    System::system_init(SystemId::Ntr027, AdcStrategy::Constant(0))
}

fn layout_matches_the_catalog_address_map() {
    assert_eq!(memory::IO1_SIZE, 0xE0);
    assert_eq!(memory::IO2_SIZE, 0x80);
    assert_eq!(memory::MEMORY_SIZE, 0x1_0000);
    // Every region abuts the next with no gap or overlap, and the last
    // one ends exactly at the top of the 64 KiB space.
    assert_eq!(memory::IO1_START, memory::ROM_END);
    assert_eq!(memory::RESERVED_START, memory::IO1_END);
    assert_eq!(memory::IO2_START, memory::RAM_END);
    assert_eq!(memory::IO2_END, memory::MEMORY_SIZE);
}

fn reset_vector_loads_pc_from_the_first_rom_word() {
    // The reset vector lives in the IVAT region at address 0, ahead of
    // where `load_rom` places ROM content (0x0050) — `init` reads it
    // raw rather than through `load_rom`.
    let mut system = blank();
    system.poke_w(0, 0x0100);
    system.init();
    assert_eq!(system.cpu.pc, 0x0100);
}

fn eeprom_command_stream_round_trips_a_byte() {
    let mut system = blank();

    system.write_b(PDR9, 0x00); // select, active low on bit 0
    system.write_b(SSTDR, 0x06); // WREN
    system.write_b(PDR9, 0x01); // deselect
    system.write_b(PDR9, 0x00); // reselect

    for byte in [0x02u8, 0x00, 0x10, 0xAB] {
        // WRITE, address hi, address lo, data
        system.write_b(SSTDR, byte);
    }
    system.write_b(PDR9, 0x01);
    system.write_b(PDR9, 0x00);

    for byte in [0x03u8, 0x00, 0x10, 0x00] {
        // READ, address hi, address lo, don't-care
        system.write_b(SSTDR, byte);
    }
    assert_eq!(system.read_b(SSRDR), 0xAB);
}

fn led_state_follows_on_and_colour_pins() {
    let mut led = Led::new();
    led.pin_out(0, true);
    led.pin_out(1, true);
    assert_eq!(led.state(), h8300h::devices::LedState::Green);
    led.pin_out(0, false);
    assert_eq!(led.state(), h8300h::devices::LedState::Off);
}

fn main() {
    layout_matches_the_catalog_address_map();
    reset_vector_loads_pc_from_the_first_rom_word();
    eeprom_command_stream_round_trips_a_byte();
    led_state_follows_on_and_colour_pins();
    println!("all integration checks passed");
}
