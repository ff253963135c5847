use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use common::constants::*;

use crate::cpu::Cpu;
use crate::hw::HardwareDevice;
use crate::mem::MemorySystem;
use crate::misc::EmuError;

use log::trace;

const REG_DIVIDER: u16 = 0;
const REG_COUNT: u16 = 1;
const REG_MESSAGE: u16 = 2;

const BASE_RATE_HZ: u64 = 60;

/// Wall-clock source. Swapped for a fake in tests.
pub trait TimeSource: Send {
    fn now(&self) -> Duration;
}

pub struct MonotonicTime {
    start: Instant,
}

impl MonotonicTime {
    pub fn new() -> MonotonicTime {
        MonotonicTime {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicTime {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Manually advanced clock for tests. Hold an `Arc<FakeTime>` and hand a
/// clone to the device.
#[derive(Default)]
pub struct FakeTime {
    millis: AtomicU64,
}

impl FakeTime {
    pub fn new() -> FakeTime {
        Default::default()
    }

    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl TimeSource for Arc<FakeTime> {
    fn now(&self) -> Duration {
        Duration::from_millis(self.millis.load(Ordering::SeqCst))
    }
}

#[derive(Default)]
struct ClockState {
    divider: u16,
    message: u16,
    reset: bool,
}

// Real-time tick source. Writing the divider register starts the clock at
// 60/divider Hz (0 switches it off) and restarts the tick count. Each tick
// raises an interrupt when the message register is nonzero.
pub struct Clock {
    state: Arc<Mutex<ClockState>>,
    time: Box<dyn TimeSource>,
    epoch: Duration,
    ticks_seen: u64,
}

impl Clock {
    pub fn new() -> Clock {
        Clock::with_time_source(Box::new(MonotonicTime::new()))
    }

    pub fn with_time_source(time: Box<dyn TimeSource>) -> Clock {
        Clock {
            state: Arc::new(Mutex::new(ClockState::default())),
            time,
            epoch: Duration::ZERO,
            ticks_seen: 0,
        }
    }
}

impl HardwareDevice for Clock {
    fn hardware_id(&self) -> u32 {
        CLOCK_HW_ID
    }

    fn connect(&mut self, mem: &mut MemorySystem) {
        let state = Arc::clone(&self.state);
        mem.watch(
            CLOCK_BASE + REG_DIVIDER,
            Box::new(move |_cells, _addr, val| {
                let mut state = state.lock().unwrap();
                state.divider = val;
                state.reset = true;
            }),
        );

        let state = Arc::clone(&self.state);
        mem.watch(
            CLOCK_BASE + REG_MESSAGE,
            Box::new(move |_cells, _addr, val| {
                state.lock().unwrap().message = val;
            }),
        );
    }

    fn update(&mut self, cpu: &mut Cpu, mem: &mut MemorySystem) -> Result<(), EmuError> {
        let (divider, message, reset) = {
            let mut state = self.state.lock().unwrap();
            (state.divider, state.message, std::mem::take(&mut state.reset))
        };
        if reset {
            self.epoch = self.time.now();
            self.ticks_seen = 0;
            mem.write(CLOCK_BASE + REG_COUNT, 0)?;
        }
        if divider == 0 {
            return Ok(());
        }

        let elapsed = self.time.now().saturating_sub(self.epoch);
        let total = elapsed.as_millis() as u64 * BASE_RATE_HZ / (1000 * divider as u64);
        let new = total - self.ticks_seen;
        if new == 0 {
            return Ok(());
        }
        trace!("clock: {new} tick(s), {total} total");
        self.ticks_seen = total;
        mem.write(CLOCK_BASE + REG_COUNT, total as u16)?;
        if message != 0 {
            for _ in 0..new {
                cpu.interrupt(mem, message)?;
            }
        }
        Ok(())
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
