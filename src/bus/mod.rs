/*!
bus: 16-bit address-space multiplexer.

Overview
========
`Bus` maps every address in `0x0000..=0xFFFF` to exactly one attached
`Device`. This mirrors the teacher repo's `bus` façade (a single entry
point for all CPU-visible reads/writes, with submodules owning their own
slice of the map) but is generalized away from NES specifics: instead of
hardcoded PPU/APU/controller register windows, devices are attached at
runtime with an origin and a size (§3 "Memory Bus").

Responsibilities
================
- Resolve a 16-bit address to the device that owns it (`read`/`write`).
- Reject overlapping attachments at configuration time (`ConfigurationError`),
  rather than producing ambiguous reads later.
- Fire a write observer on every successful write, regardless of which
  device handled it - this is what lets the JIT cache invalidate itself
  (§4.J).

Non-Responsibilities
====================
- Device semantics (RAM vs ROM vs memory-mapped registers) live in
  `bus::device`.
- Cycle timing: the core does not model bus cycles; see spec §9 (timing
  fidelity below instruction granularity is explicitly not guaranteed).
*/

pub mod device;

use crate::error::{CoreError, Result};
pub use device::{Device, Ram, RegisterBlock, Rom};

struct Attachment {
    origin: u16,
    size: u32,
    device: Box<dyn Device>,
}

impl Attachment {
    fn covers(&self, addr: u16) -> bool {
        let addr = addr as u32;
        let origin = self.origin as u32;
        addr >= origin && addr < origin + self.size
    }

    fn overlaps(&self, other_origin: u16, other_size: u32) -> bool {
        let a0 = self.origin as u32;
        let a1 = a0 + self.size;
        let b0 = other_origin as u32;
        let b1 = b0 + other_size;
        a0 < b1 && b0 < a1
    }
}

/// A callback invoked with the absolute address of every bus write.
pub type WriteObserver = Box<dyn FnMut(u16)>;

/// The CPU-visible 64 KiB address space.
pub struct Bus {
    attachments: Vec<Attachment>,
    observer: Option<WriteObserver>,
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus {
    pub fn new() -> Self {
        Self {
            attachments: Vec::new(),
            observer: None,
        }
    }

    /// Attach a device at `origin`, covering `size` bytes. Fails if the new
    /// range overlaps any existing attachment (§4.A invariant).
    pub fn attach(&mut self, device: Box<dyn Device>, origin: u16, size: u32) -> Result<()> {
        if size == 0 {
            return Err(CoreError::ConfigurationError(format!(
                "device at {origin:#06x} has zero size"
            )));
        }
        if (origin as u32) + size > 0x1_0000 {
            return Err(CoreError::ConfigurationError(format!(
                "device at {origin:#06x} with size {size} exceeds the 64KiB address space"
            )));
        }
        for existing in &self.attachments {
            if existing.overlaps(origin, size) {
                return Err(CoreError::ConfigurationError(format!(
                    "device at {origin:#06x} (size {size}) overlaps existing attachment at {:#06x} (size {})",
                    existing.origin, existing.size
                )));
            }
        }
        self.attachments.push(Attachment {
            origin,
            size,
            device,
        });
        Ok(())
    }

    /// Install (replacing any prior) the write observer (§4.J).
    pub fn set_write_observer(&mut self, observer: WriteObserver) {
        self.observer = Some(observer);
    }

    fn find(&self, addr: u16) -> Option<&Attachment> {
        self.attachments.iter().find(|a| a.covers(addr))
    }

    fn find_mut(&mut self, addr: u16) -> Option<&mut Attachment> {
        self.attachments.iter_mut().find(|a| a.covers(addr))
    }

    /// Read a byte. Unmapped addresses read as 0 (§3, §7).
    pub fn read(&self, addr: u16) -> u8 {
        match self.find(addr) {
            Some(a) => a.device.read(addr - a.origin),
            None => 0,
        }
    }

    /// Read a little-endian word.
    pub fn read_u16(&self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi = self.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    /// Write a byte. No-op if the owning device is read-only or the
    /// address is unmapped. Fires the write observer on every call that
    /// targets a mapped address, whether or not the device accepted it -
    /// invalidation must be conservative (§4.J: write amplification is
    /// acceptable).
    pub fn write(&mut self, addr: u16, value: u8) {
        if let Some(a) = self.find_mut(addr) {
            let offset = addr - a.origin;
            a.device.write(offset, value);
        } else {
            return;
        }
        if let Some(observer) = self.observer.as_mut() {
            observer(addr);
        }
    }

    pub fn write_u16(&mut self, addr: u16, value: u16) {
        let lo = (value & 0xFF) as u8;
        let hi = (value >> 8) as u8;
        self.write(addr, lo);
        self.write(addr.wrapping_add(1), hi);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use device::Ram;

    #[test]
    fn reads_unmapped_address_as_zero() {
        let bus = Bus::new();
        assert_eq!(bus.read(0x1234), 0);
    }

    #[test]
    fn read_write_roundtrip() {
        let mut bus = Bus::new();
        bus.attach(Box::new(Ram::new(0x0800)), 0x0000, 0x0800)
            .unwrap();
        bus.write(0x0010, 0xAB);
        assert_eq!(bus.read(0x0010), 0xAB);
    }

    #[test]
    fn overlapping_attachment_is_configuration_error() {
        let mut bus = Bus::new();
        bus.attach(Box::new(Ram::new(0x1000)), 0x0000, 0x1000)
            .unwrap();
        let err = bus
            .attach(Box::new(Ram::new(0x10)), 0x0FF0, 0x20)
            .unwrap_err();
        assert!(matches!(err, CoreError::ConfigurationError(_)));
    }

    #[test]
    fn write_to_read_only_device_is_dropped() {
        let mut bus = Bus::new();
        bus.attach(Box::new(Rom::new(vec![0xAA; 16])), 0x8000, 16)
            .unwrap();
        bus.write(0x8000, 0xFF);
        assert_eq!(bus.read(0x8000), 0xAA);
    }

    #[test]
    fn write_observer_fires_with_absolute_address() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let mut bus = Bus::new();
        bus.attach(Box::new(Ram::new(0x100)), 0x0200, 0x100)
            .unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        bus.set_write_observer(Box::new(move |addr| seen_clone.borrow_mut().push(addr)));

        bus.write(0x0205, 0x01);
        assert_eq!(*seen.borrow(), vec![0x0205]);
    }

    #[test]
    fn little_endian_word_roundtrip() {
        let mut bus = Bus::new();
        bus.attach(Box::new(Ram::new(0x10000)), 0x0000, 0x10000)
            .unwrap();
        bus.write_u16(0xAAAA, 0xBEEF);
        assert_eq!(bus.read(0xAAAA), 0xEF);
        assert_eq!(bus.read(0xAAAB), 0xBE);
        assert_eq!(bus.read_u16(0xAAAA), 0xBEEF);
    }
}
