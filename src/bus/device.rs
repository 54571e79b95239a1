/*!
device.rs - Devices attachable to the `Bus`.

Grounded on the teacher's per-region submodules (`ram.rs`,
`ppu_registers.rs`, `apu_registers.rs`): each region of the address space
was a small struct with `read`/`write` taking an address already relative
to that region. `Device` generalizes that shape into a trait so the core
doesn't know about RAM vs ROM vs memory-mapped registers - it just knows
about devices.

Only `Ram`, `Rom`, and `RegisterBlock` are provided. Anything
NES/C64/target-specific (PPU, APU, controller ports, mappers) is an
external collaborator that implements `Device` in the host crate (§1
Explicitly out of scope); `RegisterBlock` exists purely to illustrate the
shape such a device takes (a fixed-size window with a read/write hook),
matching the `hal.set_controller_state` style facade named in §6.
*/

/// A single addressable region behind the bus. `offset` is already
/// relative to the device's attachment origin.
pub trait Device {
    fn read(&self, offset: u16) -> u8;
    fn write(&mut self, offset: u16, value: u8);
}

/// Plain read/write memory.
pub struct Ram {
    data: Vec<u8>,
}

impl Ram {
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0; size],
        }
    }

    pub fn with_contents(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl Device for Ram {
    fn read(&self, offset: u16) -> u8 {
        self.data.get(offset as usize).copied().unwrap_or(0)
    }

    fn write(&mut self, offset: u16, value: u8) {
        if let Some(slot) = self.data.get_mut(offset as usize) {
            *slot = value;
        }
    }
}

/// Read-only memory. Writes are silently dropped (§3 Memory Bus invariant).
pub struct Rom {
    data: Vec<u8>,
}

impl Rom {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl Device for Rom {
    fn read(&self, offset: u16) -> u8 {
        self.data.get(offset as usize).copied().unwrap_or(0)
    }

    fn write(&mut self, _offset: u16, _value: u8) {
        // Read-only: writes are no-ops.
    }
}

/// A small fixed-size window of host-defined memory-mapped registers.
///
/// This is the thin interface §1 and §6 describe for PPU/APU/controller
/// devices: the core never implements their semantics, only the shape
/// (a byte-addressable block a host can back with whatever behavior it
/// needs, including side effects on read).
pub struct RegisterBlock {
    data: Vec<u8>,
    on_write: Option<Box<dyn FnMut(u16, u8)>>,
}

impl RegisterBlock {
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0; size],
            on_write: None,
        }
    }

    /// Install a callback invoked after every write, in addition to the
    /// default store - lets a host model registers with write side
    /// effects (e.g. a PPU address-increment latch) without the core
    /// knowing about them.
    pub fn with_write_hook(mut self, hook: Box<dyn FnMut(u16, u8)>) -> Self {
        self.on_write = Some(hook);
        self
    }
}

impl Device for RegisterBlock {
    fn read(&self, offset: u16) -> u8 {
        self.data.get(offset as usize).copied().unwrap_or(0)
    }

    fn write(&mut self, offset: u16, value: u8) {
        if let Some(slot) = self.data.get_mut(offset as usize) {
            *slot = value;
        }
        if let Some(hook) = self.on_write.as_mut() {
            hook(offset, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ram_out_of_range_read_is_zero() {
        let ram = Ram::new(4);
        assert_eq!(ram.read(10), 0);
    }

    #[test]
    fn rom_write_is_noop() {
        let mut rom = Rom::new(vec![1, 2, 3]);
        rom.write(0, 0xFF);
        assert_eq!(rom.read(0), 1);
    }

    #[test]
    fn register_block_write_hook_observes_offset_and_value() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let seen = Rc::new(RefCell::new(None));
        let seen_clone = seen.clone();
        let mut block = RegisterBlock::new(8).with_write_hook(Box::new(move |off, val| {
            *seen_clone.borrow_mut() = Some((off, val));
        }));

        block.write(3, 0x42);
        assert_eq!(block.read(3), 0x42);
        assert_eq!(*seen.borrow(), Some((3, 0x42)));
    }
}
