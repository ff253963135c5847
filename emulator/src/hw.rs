use std::sync::{Arc, Mutex};

use crate::cpu::Cpu;
use crate::mem::MemorySystem;
use crate::misc::EmuError;

use log::debug;

// A memory-mapped peripheral. Each device owns a block of control registers
// somewhere in machine memory and wires its own watches onto them in
// `connect`; the bus never routes addresses itself.
pub trait HardwareDevice: Send {
    fn hardware_id(&self) -> u32;

    fn connect(&mut self, mem: &mut MemorySystem);

    // Cooperative time slice, once per `Computer::run`. Devices may read and
    // write machine memory and raise CPU interrupts from here.
    fn update(&mut self, cpu: &mut Cpu, mem: &mut MemorySystem) -> Result<(), EmuError>;
}

// Id-keyed device registry. Updates run in registration order.
#[derive(Default)]
pub struct HardwareManager {
    devices: Vec<Arc<Mutex<dyn HardwareDevice>>>,
}

impl HardwareManager {
    pub fn new() -> HardwareManager {
        Default::default()
    }

    // A second registration with the same id replaces the first, keeping its
    // position in the update order.
    pub fn register(&mut self, device: Arc<Mutex<dyn HardwareDevice>>) {
        let id = device.lock().unwrap().hardware_id();
        debug!("hw: registering device {id:#010x}");
        for slot in &mut self.devices {
            if slot.lock().unwrap().hardware_id() == id {
                *slot = device;
                return;
            }
        }
        self.devices.push(device);
    }

    // Unregisters the device. Watches it wired in `connect` stay in place;
    // only its update slot goes away.
    pub fn remove(&mut self, id: u32) -> Option<Arc<Mutex<dyn HardwareDevice>>> {
        let at = self
            .devices
            .iter()
            .position(|dev| dev.lock().unwrap().hardware_id() == id)?;
        Some(self.devices.remove(at))
    }

    pub fn get_device(&self, id: u32) -> Option<Arc<Mutex<dyn HardwareDevice>>> {
        self.devices
            .iter()
            .find(|dev| dev.lock().unwrap().hardware_id() == id)
            .cloned()
    }

    pub fn update_all(&mut self, cpu: &mut Cpu, mem: &mut MemorySystem) -> Result<(), EmuError> {
        for dev in &self.devices {
            dev.lock().unwrap().update(cpu, mem)?;
        }
        Ok(())
    }
}
