use std::sync::{Arc, Mutex};

use as_lib::{AsmError, assemble};
use common::asm::Reg;
use common::constants::*;
use emu_lib::io::clock::{Clock, TimeSource};
use emu_lib::io::display::Display;
use emu_lib::io::keyboard::Keyboard;
use emu_lib::{Cpu, EmuError, HardwareDevice, HardwareManager, MemorySystem};

use delegate::delegate;
use log::info;
use thiserror::Error;

pub use emu_lib::io::clock::{FakeTime, MonotonicTime};
pub use emu_lib::io::keyboard::Key;

#[derive(Debug, Error)]
pub enum ComputerError {
    #[error(transparent)]
    Asm(#[from] AsmError),
    #[error(transparent)]
    Emu(#[from] EmuError),
}

/// The assembled machine: CPU, memory, and the standard peripheral set,
/// wired together and ready to run source programs.
pub struct Computer {
    cpu: Cpu,
    mem: MemorySystem,
    hw: HardwareManager,
    display: Arc<Mutex<Display>>,
    keyboard: Arc<Mutex<Keyboard>>,
}

impl Computer {
    pub fn new() -> Computer {
        Computer::with_clock(Clock::new())
    }

    /// Builds the machine around a specific time source, for hosts that want
    /// to drive the clock themselves.
    pub fn with_time_source(time: Box<dyn TimeSource>) -> Computer {
        Computer::with_clock(Clock::with_time_source(time))
    }

    fn with_clock(clock: Clock) -> Computer {
        let mut mem = MemorySystem::new(MEM_WORDS);
        let mut hw = HardwareManager::new();

        let display = Arc::new(Mutex::new(Display::new()));
        display.lock().unwrap().connect(&mut mem);
        hw.register(display.clone());

        let keyboard = Arc::new(Mutex::new(Keyboard::new()));
        keyboard.lock().unwrap().connect(&mut mem);
        hw.register(keyboard.clone());

        let clock = Arc::new(Mutex::new(clock));
        clock.lock().unwrap().connect(&mut mem);
        hw.register(clock);

        Computer {
            cpu: Cpu::new(),
            mem,
            hw,
            display,
            keyboard,
        }
    }

    /// Assembles `source`, loads the image at address 0, and resets the CPU.
    /// Device state and memory outside the image survive a reload.
    pub fn load_assembly(&mut self, source: &str) -> Result<(), ComputerError> {
        let program = assemble(source)?;
        info!("loading {} word(s)", program.words.len());
        self.mem.load(0, &program.words)?;
        self.cpu.reset();
        Ok(())
    }

    /// Runs exactly `cycles` instructions, then gives every device its time
    /// slice.
    pub fn run(&mut self, cycles: usize) -> Result<(), ComputerError> {
        self.cpu.exec(&mut self.mem, cycles)?;
        self.hw.update_all(&mut self.cpu, &mut self.mem)?;
        Ok(())
    }

    // True while the owned handle is still the device registered under `id`;
    // false once the host detached it or registered a replacement.
    fn owns_device(&self, id: u32, handle: &Arc<Mutex<dyn HardwareDevice>>) -> bool {
        self.hw
            .get_device(id)
            .is_some_and(|dev| Arc::ptr_eq(&dev, handle))
    }

    /// Current framebuffer as RGBA8, re-rendered if memory changed since the
    /// last look. A machine whose own display was removed or replaced on the
    /// bus yields a solid red frame so the host shows something obviously
    /// wrong instead of garbage.
    pub fn display_pixels(&mut self) -> Result<Vec<u8>, ComputerError> {
        let handle: Arc<Mutex<dyn HardwareDevice>> = self.display.clone();
        if !self.owns_device(DISPLAY_HW_ID, &handle) {
            let mut frame = vec![0; FRAME_BYTES];
            for px in frame.chunks_exact_mut(PIXEL_BYTES) {
                px.copy_from_slice(&[0xff, 0, 0, 0xff]);
            }
            return Ok(frame);
        }
        let mut display = self.display.lock().unwrap();
        display.refresh(&mut self.mem)?;
        Ok(display.pixels().to_vec())
    }

    /// Key events drive the machine's own keyboard; once the host detaches
    /// or replaces it on the bus they are dropped rather than fed to the
    /// stale device.
    pub fn key_down(&mut self, key: Key) -> Result<(), ComputerError> {
        let handle: Arc<Mutex<dyn HardwareDevice>> = self.keyboard.clone();
        if !self.owns_device(KEYBOARD_HW_ID, &handle) {
            return Ok(());
        }
        self.keyboard
            .lock()
            .unwrap()
            .key_down(&mut self.cpu, &mut self.mem, key)?;
        Ok(())
    }

    pub fn key_up(&mut self, key: Key) {
        let handle: Arc<Mutex<dyn HardwareDevice>> = self.keyboard.clone();
        if !self.owns_device(KEYBOARD_HW_ID, &handle) {
            return;
        }
        self.keyboard.lock().unwrap().key_up(key);
    }

    pub fn detach_device(&mut self, id: u32) -> bool {
        self.hw.remove(id).is_some()
    }

    pub fn attach_device(&mut self, device: Arc<Mutex<dyn HardwareDevice>>) {
        device.lock().unwrap().connect(&mut self.mem);
        self.hw.register(device);
    }

    delegate! {
        to self.cpu {
            pub fn pc(&self) -> u16;
            pub fn sp(&self) -> u16;
            pub fn ex(&self) -> u16;
            pub fn ia(&self) -> u16;
            pub fn set_ia(&mut self, ia: u16);
            pub fn reg_read(&self, reg: Reg) -> u16;
            pub fn reg_write(&mut self, reg: Reg, val: u16);
        }

        to self.mem {
            #[call(read)]
            pub fn read_word(&self, addr: u16) -> Result<u16, EmuError>;
            #[call(write)]
            pub fn write_word(&mut self, addr: u16, val: u16) -> Result<(), EmuError>;
        }
    }
}

impl Default for Computer {
    fn default() -> Self {
        Self::new()
    }
}
