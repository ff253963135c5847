use common::asm::{NUM_REGS, Opcode, RawInstr, Reg, param};
use common::constants::SP_INIT;

use crate::mem::MemorySystem;
use crate::misc::EmuError;

use log::{debug, trace};
use num_traits::{FromPrimitive, ToPrimitive};

// A resolved operand: somewhere a value can be read from and (except for
// literals) written back to. Resolving is side-effecting, it may consume a
// trailing word and move SP, so each operand is resolved exactly once per
// instruction, a before b.
#[derive(Debug, Clone, Copy)]
enum Loc {
    Reg(Reg),
    Sp,
    Pc,
    Ex,
    Mem(u16),
    Lit(u16),
}

// Which side of the instruction an operand sits on. Only 0x18 cares: it pops
// as a source and pushes as a destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Src,
    Dst,
}

pub struct Cpu {
    regs: [u16; NUM_REGS],
    pc: u16,
    sp: u16,
    ex: u16,
    ia: u16,
}

impl Cpu {
    pub fn new() -> Cpu {
        Cpu {
            regs: [0; NUM_REGS],
            pc: 0,
            sp: SP_INIT,
            ex: 0,
            ia: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Cpu::new();
    }

    pub fn reg_read(&self, reg: Reg) -> u16 {
        self.regs[reg.to_usize().unwrap()]
    }

    pub fn reg_write(&mut self, reg: Reg, val: u16) {
        trace!("reg: writing {val:#06x} to {reg}");
        self.regs[reg.to_usize().unwrap()] = val;
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn set_pc(&mut self, pc: u16) {
        self.pc = pc;
    }

    pub fn sp(&self) -> u16 {
        self.sp
    }

    pub fn set_sp(&mut self, sp: u16) {
        self.sp = sp;
    }

    pub fn ex(&self) -> u16 {
        self.ex
    }

    pub fn ia(&self) -> u16 {
        self.ia
    }

    // IA has no instruction-level accessor in the opcode table; the host (or
    // a device protocol built on top) sets it directly.
    pub fn set_ia(&mut self, ia: u16) {
        self.ia = ia;
    }

    // Run exactly `cycles` fetch/decode/execute rounds, or stop at the first
    // fault.
    pub fn exec(&mut self, mem: &mut MemorySystem, cycles: usize) -> Result<(), EmuError> {
        for _ in 0..cycles {
            self.step(mem)?;
        }
        Ok(())
    }

    pub fn step(&mut self, mem: &mut MemorySystem) -> Result<(), EmuError> {
        let pc = self.pc;
        let word = mem.read(pc)?;
        self.pc = self.pc.wrapping_add(1);

        let ins = RawInstr::decode(word);
        let Some(op) = Opcode::from_u16(ins.opcode) else {
            return Err(EmuError::UnknownOpcode { word, pc });
        };
        debug!("pc {pc:#06x}: {op} a={:#04x} b={:#04x}", ins.a, ins.b);

        // a's trailing word (if any) is fetched before b's, and both before
        // the operation body runs.
        let a = self.resolve(mem, ins.a, Side::Dst)?;
        let b = self.resolve(mem, ins.b, Side::Src)?;
        let bv = self.read_loc(mem, b)?;

        use Opcode::*;
        match op {
            Set => self.write_loc(mem, a, bv)?,
            Add => {
                let av = self.read_loc(mem, a)?;
                let sum = av as u32 + bv as u32;
                self.ex = (sum >> 16) as u16;
                self.write_loc(mem, a, sum as u16)?;
            }
            Sub => {
                let av = self.read_loc(mem, a)?;
                self.ex = if av < bv { 0xffff } else { 0 };
                self.write_loc(mem, a, av.wrapping_sub(bv))?;
            }
            Mul => {
                let av = self.read_loc(mem, a)?;
                let prod = av as u32 * bv as u32;
                self.ex = (prod >> 16) as u16;
                self.write_loc(mem, a, prod as u16)?;
            }
            Mli => {
                let av = self.read_loc(mem, a)?;
                let prod = (av as i16 as i32) * (bv as i16 as i32);
                self.ex = (prod >> 16) as u16;
                self.write_loc(mem, a, prod as u16)?;
            }
            Div => {
                let av = self.read_loc(mem, a)?;
                let (res, ex) = if bv == 0 {
                    (0, 0)
                } else {
                    (av / bv, (((av as u32) << 16) / bv as u32) as u16)
                };
                self.ex = ex;
                self.write_loc(mem, a, res)?;
            }
            Dvi => {
                let av = self.read_loc(mem, a)?;
                let (res, ex) = if bv == 0 {
                    (0, 0)
                } else {
                    let ai = av as i16 as i32;
                    let bi = bv as i16 as i32;
                    ((ai / bi) as u16, (ai << 16).wrapping_div(bi) as u16)
                };
                self.ex = ex;
                self.write_loc(mem, a, res)?;
            }
            Mod => {
                let av = self.read_loc(mem, a)?;
                let res = if bv == 0 { 0 } else { av % bv };
                self.write_loc(mem, a, res)?;
            }
            Mdi => {
                let av = self.read_loc(mem, a)?;
                // Widened so i16::MIN % -1 can't overflow.
                let res = if bv == 0 {
                    0
                } else {
                    ((av as i16 as i32) % (bv as i16 as i32)) as u16
                };
                self.write_loc(mem, a, res)?;
            }
            And => {
                let av = self.read_loc(mem, a)?;
                self.write_loc(mem, a, av & bv)?;
            }
            Bor => {
                let av = self.read_loc(mem, a)?;
                self.write_loc(mem, a, av | bv)?;
            }
            Xor => {
                let av = self.read_loc(mem, a)?;
                self.write_loc(mem, a, av ^ bv)?;
            }
            Shr => {
                let av = self.read_loc(mem, a)?;
                let wide = (av as u64) << 16;
                let res = if bv >= 48 { 0 } else { wide >> bv };
                self.ex = res as u16;
                self.write_loc(mem, a, (res >> 16) as u16)?;
            }
            Asr => {
                let av = self.read_loc(mem, a)?;
                let wide = (av as i16 as i64) << 16;
                let res = wide >> (bv as u32).min(63);
                self.ex = res as u16;
                self.write_loc(mem, a, (res >> 16) as u16)?;
            }
            Shl => {
                let av = self.read_loc(mem, a)?;
                let res = if bv >= 48 { 0 } else { (av as u64) << bv };
                self.ex = (res >> 16) as u16;
                self.write_loc(mem, a, res as u16)?;
            }
            // Table codes >= 0x10 don't fit the four-bit opcode field, so the
            // decoder can never hand them to us.
            _ => return Err(EmuError::UnknownOpcode { word, pc }),
        }
        Ok(())
    }

    fn next_word(&mut self, mem: &MemorySystem) -> Result<u16, EmuError> {
        let val = mem.read(self.pc)?;
        self.pc = self.pc.wrapping_add(1);
        Ok(val)
    }

    fn resolve(&mut self, mem: &MemorySystem, code: u16, side: Side) -> Result<Loc, EmuError> {
        let loc = match code {
            0x00..=param::REG_DIRECT_TOP => Loc::Reg(Reg::from_u16(code).unwrap()),
            param::REG_INDIRECT..=param::REG_INDIRECT_TOP => {
                let reg = Reg::from_u16(code - param::REG_INDIRECT).unwrap();
                Loc::Mem(self.reg_read(reg))
            }
            param::IDX_INDIRECT..=param::IDX_INDIRECT_TOP => {
                let reg = Reg::from_u16(code - param::IDX_INDIRECT).unwrap();
                let off = self.next_word(mem)?;
                Loc::Mem(self.reg_read(reg).wrapping_add(off))
            }
            param::PUSH_POP => {
                if side == Side::Dst {
                    self.sp = self.sp.wrapping_sub(1);
                    Loc::Mem(self.sp)
                } else {
                    let addr = self.sp;
                    self.sp = self.sp.wrapping_add(1);
                    Loc::Mem(addr)
                }
            }
            param::PEEK => Loc::Mem(self.sp),
            param::PICK => {
                let off = self.next_word(mem)?;
                Loc::Mem(self.sp.wrapping_add(off))
            }
            param::SP => Loc::Sp,
            param::PC => Loc::Pc,
            param::EX => Loc::Ex,
            param::NEXT_WORD_IND => Loc::Mem(self.next_word(mem)?),
            param::NEXT_WORD_LIT => Loc::Lit(self.next_word(mem)?),
            _ => Loc::Lit(code - param::SMALL_LIT),
        };
        Ok(loc)
    }

    fn read_loc(&self, mem: &MemorySystem, loc: Loc) -> Result<u16, EmuError> {
        Ok(match loc {
            Loc::Reg(reg) => self.reg_read(reg),
            Loc::Sp => self.sp,
            Loc::Pc => self.pc,
            Loc::Ex => self.ex,
            Loc::Mem(addr) => mem.read(addr)?,
            Loc::Lit(val) => val,
        })
    }

    fn write_loc(&mut self, mem: &mut MemorySystem, loc: Loc, val: u16) -> Result<(), EmuError> {
        match loc {
            Loc::Reg(reg) => self.reg_write(reg, val),
            Loc::Sp => self.sp = val,
            Loc::Pc => self.pc = val,
            Loc::Ex => self.ex = val,
            Loc::Mem(addr) => mem.write(addr, val)?,
            Loc::Lit(_) => return Err(EmuError::IllegalWrite),
        }
        Ok(())
    }

    fn push(&mut self, mem: &mut MemorySystem, val: u16) -> Result<(), EmuError> {
        self.sp = self.sp.wrapping_sub(1);
        mem.write(self.sp, val)
    }

    // Deliver a hardware interrupt: save PC then A on the stack, vector to IA
    // with the message in A. No-op while IA is 0.
    pub fn interrupt(&mut self, mem: &mut MemorySystem, msg: u16) -> Result<(), EmuError> {
        if self.ia == 0 {
            return Ok(());
        }
        debug!("interrupt {msg:#06x}: vectoring to {:#06x}", self.ia);
        self.push(mem, self.pc)?;
        self.push(mem, self.reg_read(Reg::A))?;
        self.pc = self.ia;
        self.reg_write(Reg::A, msg);
        Ok(())
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}
