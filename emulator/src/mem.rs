use std::collections::HashMap;

use crate::misc::EmuError;

use log::trace;

// Write observer. Receives the raw cell array and the freshly stored value;
// pokes through the slice don't re-enter observer dispatch.
pub type WatchFn = Box<dyn FnMut(&mut [u16], u16, u16) + Send>;

// Flat word-addressable storage with one observer per address.
pub struct MemorySystem {
    cells: Vec<u16>,
    watches: HashMap<u16, WatchFn>,
}

impl MemorySystem {
    pub fn new(words: usize) -> MemorySystem {
        assert!(words <= (u16::MAX as usize) + 1);
        MemorySystem {
            cells: vec![0; words],
            watches: HashMap::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.cells.len()
    }

    fn check(&self, addr: u16) -> Result<(), EmuError> {
        if (addr as usize) < self.cells.len() {
            Ok(())
        } else {
            Err(EmuError::AddressingFault {
                addr,
                size: self.cells.len(),
            })
        }
    }

    pub fn read(&self, addr: u16) -> Result<u16, EmuError> {
        self.check(addr)?;
        Ok(self.cells[addr as usize])
    }

    // Store, then notify. The observer always sees the value already in place.
    pub fn write(&mut self, addr: u16, val: u16) -> Result<(), EmuError> {
        self.check(addr)?;
        trace!("mem: writing {val:#06x} to {addr:#06x}");
        self.cells[addr as usize] = val;
        if let Some(watch) = self.watches.get_mut(&addr) {
            watch(&mut self.cells, addr, val);
        }
        Ok(())
    }

    // Bulk image load. Doesn't fire observers.
    pub fn load(&mut self, offset: u16, words: &[u16]) -> Result<(), EmuError> {
        let start = offset as usize;
        let end = start + words.len();
        if end > self.cells.len() {
            return Err(EmuError::LoadOverflow {
                offset,
                len: words.len(),
                size: self.cells.len(),
            });
        }
        self.cells[start..end].copy_from_slice(words);
        Ok(())
    }

    // Registers the observer for addr; an existing one is replaced.
    pub fn watch(&mut self, addr: u16, watch: WatchFn) {
        self.watches.insert(addr, watch);
    }

    pub fn unwatch(&mut self, addr: u16) {
        self.watches.remove(&addr);
    }
}
