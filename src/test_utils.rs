//! Shared test scaffolding for building an in-memory program and HAL.
//!
//! Grounded on the teacher's `test_utils::build_nrom_with_prg` - a single
//! helper that de-duplicates ROM/bus construction across the CPU, Bus,
//! and Cartridge test suites - but with the iNES header and mapper
//! concerns stripped out (out of scope here, §1): a program is just
//! bytes dropped directly onto a flat 64 KiB RAM-backed bus, with the
//! reset vector pointed at wherever the caller wants execution to start.
//!
//! Unlike the teacher's version, this module isn't `#[cfg(test)]`-gated:
//! the conformance suite under `tests/` needs it too, and a `cfg(test)`
//! item in the library crate isn't visible to an external integration
//! test binary.

#![allow(dead_code)]

use crate::bus::device::Ram;
use crate::bus::Bus;
use crate::cpu::Hal;

/// Build a `Bus` with a flat 64 KiB RAM region, `program` written starting
/// at `origin`, and the reset vector (`0xFFFC`/`0xFFFD`) pointed at
/// `reset_vector`.
pub fn build_bus_with_program(program: &[u8], origin: u16, reset_vector: u16) -> Bus {
    let mut bus = Bus::new();
    bus.attach(Box::new(Ram::new(0x10000)), 0x0000, 0x10000)
        .expect("flat 64 KiB RAM never overlaps itself");
    for (i, byte) in program.iter().enumerate() {
        bus.write(origin.wrapping_add(i as u16), *byte);
    }
    bus.write_u16(0xFFFC, reset_vector);
    bus
}

/// Same as `build_bus_with_program`, wrapped in a fresh `Hal` at power-up
/// defaults.
pub fn build_hal_with_program(program: &[u8], origin: u16, reset_vector: u16) -> Hal {
    Hal::new(build_bus_with_program(program, origin, reset_vector))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_lands_at_origin_and_reset_vector_is_set() {
        let bus = build_bus_with_program(&[0xA9, 0x01], 0x8000, 0x8000);
        assert_eq!(bus.read(0x8000), 0xA9);
        assert_eq!(bus.read(0x8001), 0x01);
        assert_eq!(bus.read_u16(0xFFFC), 0x8000);
    }
}
