use std::sync::{Arc, Mutex};

use common::asm::{NUM_REGS, Reg};
use common::constants::MEM_WORDS;
use common::misc::ReadU16;

use emu_lib::io::clock::Clock;
use emu_lib::io::display::Display;
use emu_lib::io::keyboard::Keyboard;
use emu_lib::{Cpu, EmuError, HardwareDevice, HardwareManager, MemorySystem};

use clap::Parser;
use num_traits::FromPrimitive;

/// C16 emulator
#[derive(Parser)]
struct Args {
    /// Memory image to execute
    image: String,

    /// Number of instructions to run
    #[arg(long, default_value_t = 10_000)]
    cycles: usize,
}

fn run(cpu: &mut Cpu, mem: &mut MemorySystem, hw: &mut HardwareManager, cycles: usize) -> Result<(), EmuError> {
    cpu.exec(mem, cycles)?;
    hw.update_all(cpu, mem)
}

fn main() {
    env_logger::init();

    let args = Args::parse();

    let buf = match std::fs::read(&args.image) {
        Ok(buf) => buf,
        Err(err) => {
            eprintln!("{}: {err}", args.image);
            std::process::exit(1);
        }
    };
    let mut words = Vec::with_capacity(buf.len() / 2);
    let mut rest = buf.as_slice();
    while rest.len() >= 2 {
        words.push(rest.read_u16());
    }

    let mut mem = MemorySystem::new(MEM_WORDS);
    let mut cpu = Cpu::new();
    let mut hw = HardwareManager::new();
    let display = Arc::new(Mutex::new(Display::new()));
    display.lock().unwrap().connect(&mut mem);
    hw.register(display);
    let keyboard = Arc::new(Mutex::new(Keyboard::new()));
    keyboard.lock().unwrap().connect(&mut mem);
    hw.register(keyboard);
    let clock = Arc::new(Mutex::new(Clock::new()));
    clock.lock().unwrap().connect(&mut mem);
    hw.register(clock);

    if let Err(err) = mem.load(0, &words) {
        eprintln!("{err}");
        std::process::exit(1);
    }

    if let Err(err) = run(&mut cpu, &mut mem, &mut hw, args.cycles) {
        eprintln!("{err}");
        std::process::exit(1);
    }

    for i in 0..NUM_REGS {
        let reg = Reg::from_usize(i).unwrap();
        println!("{reg}: {:#06x}", cpu.reg_read(reg));
    }
    println!("PC: {:#06x}", cpu.pc());
    println!("SP: {:#06x}", cpu.sp());
    println!("EX: {:#06x}", cpu.ex());
}
