use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use common::constants::*;

use crate::cpu::Cpu;
use crate::hw::HardwareDevice;
use crate::mem::MemorySystem;
use crate::misc::EmuError;

use log::trace;

// Command codes written to the command register.
const CMD_CLEAR: u16 = 0;
const CMD_POP: u16 = 1;
const CMD_HELD: u16 = 2;

const REG_COMMAND: u16 = 0;
const REG_DATA: u16 = 1;
const REG_MESSAGE: u16 = 2;

/// A key as seen by the host. `code` gives the word pushed into the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Backspace,
    Return,
    Insert,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Shift,
    Control,
}

impl Key {
    pub fn code(self) -> u16 {
        match self {
            Key::Char(c) => c as u16,
            Key::Backspace => 0x10,
            Key::Return => 0x11,
            Key::Insert => 0x12,
            Key::Delete => 0x13,
            Key::Up => 0x80,
            Key::Down => 0x81,
            Key::Left => 0x82,
            Key::Right => 0x83,
            Key::Shift => 0x90,
            Key::Control => 0x91,
        }
    }
}

#[derive(Default)]
struct KeyboardState {
    fifo: VecDeque<u16>,
    held: HashSet<u16>,
    message: u16,
}

// Buffered keyboard. Programs drive it through a small command protocol on
// the command register; the answer lands in the data register. Key events
// raise an interrupt when the message register is nonzero.
pub struct Keyboard {
    state: Arc<Mutex<KeyboardState>>,
}

impl Keyboard {
    pub fn new() -> Keyboard {
        Keyboard {
            state: Arc::new(Mutex::new(KeyboardState::default())),
        }
    }

    pub fn key_down(
        &mut self,
        cpu: &mut Cpu,
        mem: &mut MemorySystem,
        key: Key,
    ) -> Result<(), EmuError> {
        let code = key.code();
        trace!("keyboard: key down {code:#06x}");
        let message = {
            let mut state = self.state.lock().unwrap();
            // Holding a key doesn't repeat into the buffer.
            if !state.held.insert(code) {
                return Ok(());
            }
            state.fifo.push_back(code);
            state.message
        };
        if message != 0 {
            cpu.interrupt(mem, message)?;
        }
        Ok(())
    }

    pub fn key_up(&mut self, key: Key) {
        let code = key.code();
        trace!("keyboard: key up {code:#06x}");
        self.state.lock().unwrap().held.remove(&code);
    }
}

impl HardwareDevice for Keyboard {
    fn hardware_id(&self) -> u32 {
        KEYBOARD_HW_ID
    }

    fn connect(&mut self, mem: &mut MemorySystem) {
        let state = Arc::clone(&self.state);
        mem.watch(
            KEYBOARD_BASE + REG_COMMAND,
            Box::new(move |cells, _addr, cmd| {
                let mut state = state.lock().unwrap();
                let Some(data) = cells.get_mut((KEYBOARD_BASE + REG_DATA) as usize) else {
                    return;
                };
                match cmd {
                    CMD_CLEAR => state.fifo.clear(),
                    CMD_POP => *data = state.fifo.pop_front().unwrap_or(0),
                    CMD_HELD => *data = state.held.contains(data) as u16,
                    _ => {}
                }
            }),
        );

        let state = Arc::clone(&self.state);
        mem.watch(
            KEYBOARD_BASE + REG_MESSAGE,
            Box::new(move |_cells, _addr, val| {
                state.lock().unwrap().message = val;
            }),
        );
    }

    fn update(&mut self, _cpu: &mut Cpu, _mem: &mut MemorySystem) -> Result<(), EmuError> {
        Ok(())
    }
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::new()
    }
}
