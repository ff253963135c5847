use std::fmt;

use num_derive::{FromPrimitive, ToPrimitive};

pub const NUM_REGS: usize = 8;

#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq, Hash)]
pub enum Reg {
    A = 0,
    B,
    C,
    X,
    Y,
    Z,
    I,
    J,
}

impl Reg {
    pub const NUM_BITS: usize = 3;
    pub const MASK: u16 = (1u16 << Self::NUM_BITS) - 1;

    pub fn from_name(name: &str) -> Option<Reg> {
        use Reg::*;
        Some(match name.to_ascii_uppercase().as_str() {
            "A" => A,
            "B" => B,
            "C" => C,
            "X" => X,
            "Y" => Y,
            "Z" => Z,
            "I" => I,
            "J" => J,
            _ => return None,
        })
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

////////////////////////////////////////////////////////////////////////////////

// Six-bit value parameter codes shared by the assembler's operand encoder and
// the CPU's addressing-mode resolution.
pub mod param {
    pub const REG_DIRECT_TOP: u16 = 0x07;
    pub const REG_INDIRECT: u16 = 0x08;
    pub const REG_INDIRECT_TOP: u16 = 0x0f;
    pub const IDX_INDIRECT: u16 = 0x10;
    pub const IDX_INDIRECT_TOP: u16 = 0x17;
    pub const PUSH_POP: u16 = 0x18;
    pub const PEEK: u16 = 0x19;
    pub const PICK: u16 = 0x1a;
    pub const SP: u16 = 0x1b;
    pub const PC: u16 = 0x1c;
    pub const EX: u16 = 0x1d;
    pub const NEXT_WORD_IND: u16 = 0x1e;
    pub const NEXT_WORD_LIT: u16 = 0x1f;
    pub const SMALL_LIT: u16 = 0x20;
    pub const MAX: u16 = 0x3f;

    // SP, PC, and EX are addressed by fixed codes rather than register numbers.
    pub fn special(name: &str) -> Option<u16> {
        Some(match name.to_ascii_uppercase().as_str() {
            "SP" => SP,
            "PC" => PC,
            "EX" => EX,
            _ => return None,
        })
    }
}

////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq)]
pub enum Opcode {
    Set = 0x01,
    Add = 0x02,
    Sub = 0x03,
    Mul = 0x04,
    Mli = 0x05,
    Div = 0x06,
    Dvi = 0x07,
    Mod = 0x08,
    Mdi = 0x09,
    And = 0x0a,
    Bor = 0x0b,
    Xor = 0x0c,
    Shr = 0x0d,
    Asr = 0x0e,
    Shl = 0x0f,
    Ifb = 0x10,
    Ifc = 0x11,
    Ife = 0x12,
    Ifn = 0x13,
    Ifg = 0x14,
    Ifa = 0x15,
    Ifl = 0x16,
    Ifu = 0x17,
    Adx = 0x1a,
    Sbx = 0x1b,
    Sti = 0x1e,
    Std = 0x1f,
}

impl Opcode {
    pub fn from_mnemonic(mnemonic: &str) -> Option<Opcode> {
        use Opcode::*;
        Some(match mnemonic.to_ascii_uppercase().as_str() {
            "SET" => Set,
            "ADD" => Add,
            "SUB" => Sub,
            "MUL" => Mul,
            "MLI" => Mli,
            "DIV" => Div,
            "DVI" => Dvi,
            "MOD" => Mod,
            "MDI" => Mdi,
            "AND" => And,
            "BOR" => Bor,
            "XOR" => Xor,
            "SHR" => Shr,
            "ASR" => Asr,
            "SHL" => Shl,
            "IFB" => Ifb,
            "IFC" => Ifc,
            "IFE" => Ife,
            "IFN" => Ifn,
            "IFG" => Ifg,
            "IFA" => Ifa,
            "IFL" => Ifl,
            "IFU" => Ifu,
            "ADX" => Adx,
            "SBX" => Sbx,
            "STI" => Sti,
            "STD" => Std,
            _ => return None,
        })
    }

    pub fn mnemonic(&self) -> &'static str {
        use Opcode::*;
        match self {
            Set => "SET",
            Add => "ADD",
            Sub => "SUB",
            Mul => "MUL",
            Mli => "MLI",
            Div => "DIV",
            Dvi => "DVI",
            Mod => "MOD",
            Mdi => "MDI",
            And => "AND",
            Bor => "BOR",
            Xor => "XOR",
            Shr => "SHR",
            Asr => "ASR",
            Shl => "SHL",
            Ifb => "IFB",
            Ifc => "IFC",
            Ife => "IFE",
            Ifn => "IFN",
            Ifg => "IFG",
            Ifa => "IFA",
            Ifl => "IFL",
            Ifu => "IFU",
            Adx => "ADX",
            Sbx => "SBX",
            Sti => "STI",
            Std => "STD",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

////////////////////////////////////////////////////////////////////////////////

// Packed instruction word: oooo aaaaaa bbbbbb (low to high).
//
// The opcode field is four bits wide, so table codes >= 0x10 don't survive a
// round trip; they encode with the high bit OR'd into the a field and decode
// as a different instruction. Kept that way deliberately, see DESIGN.md.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawInstr {
    pub opcode: u16,
    pub a: u16,
    pub b: u16,
}

impl RawInstr {
    pub const OPCODE_BITS: usize = 4;
    pub const OPCODE_MASK: u16 = (1u16 << Self::OPCODE_BITS) - 1;
    pub const PARAM_BITS: usize = 6;
    pub const PARAM_MASK: u16 = (1u16 << Self::PARAM_BITS) - 1;
    pub const A_SHIFT: usize = Self::OPCODE_BITS;
    pub const B_SHIFT: usize = Self::OPCODE_BITS + Self::PARAM_BITS;

    pub fn decode(word: u16) -> RawInstr {
        RawInstr {
            opcode: word & Self::OPCODE_MASK,
            a: (word >> Self::A_SHIFT) & Self::PARAM_MASK,
            b: (word >> Self::B_SHIFT) & Self::PARAM_MASK,
        }
    }

    pub fn encode(&self) -> u16 {
        self.opcode | (self.a << Self::A_SHIFT) | (self.b << Self::B_SHIFT)
    }
}
