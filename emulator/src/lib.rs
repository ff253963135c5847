pub mod cpu;
pub mod hw;
pub mod io;
pub mod mem;
pub mod misc;

pub use cpu::Cpu;
pub use hw::{HardwareDevice, HardwareManager};
pub use mem::MemorySystem;
pub use misc::EmuError;
