use common::asm::{Reg, param};

use derive_more::{IsVariant, Unwrap};

// One meaningful source line: either a `:name` label definition or an
// instruction. Comments and blank lines never make it this far.
#[derive(Debug, Clone, IsVariant)]
pub enum Stmt {
    Label(String),
    Ins(Ins),
}

#[derive(Debug, Clone)]
pub struct Ins {
    pub mnemonic: String,
    pub args: Vec<String>,
}

impl Ins {
    // Size, in words, of the assembled instruction: one base word plus one
    // trailing word per operand that can't be packed into a parameter code.
    // Both passes must agree on this or label addresses drift.
    pub fn size(&self) -> u16 {
        let extras = self
            .args
            .iter()
            .take(2)
            .filter(|arg| parse_operand(arg).1.is_some())
            .count();
        1 + extras as u16
    }
}

// A trailing word: either a known value or a label to backfill.
#[derive(Debug, Clone, PartialEq, Eq, IsVariant, Unwrap)]
pub enum Extra {
    Lit(u16),
    LabelRef(String),
}

// Encode one operand as a six-bit parameter code plus an optional extra word.
//
// Bare literals always take the next-word path (0x1f), never the inline
// small-literal codes (0x20+). See DESIGN.md.
pub fn parse_operand(text: &str) -> (u16, Option<Extra>) {
    let text = text.trim();

    if let Some(inner) = text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        let inner = inner.trim();
        if let Some(reg) = Reg::from_name(inner) {
            return (param::REG_INDIRECT + reg as u16, None);
        }
        if let Some(code) = param::special(inner) {
            return (param::REG_INDIRECT + code, None);
        }
        return (param::NEXT_WORD_IND, Some(parse_extra(inner)));
    }

    if let Some(reg) = Reg::from_name(text) {
        return (reg as u16, None);
    }
    if let Some(code) = param::special(text) {
        return (code, None);
    }

    (param::NEXT_WORD_LIT, Some(parse_extra(text)))
}

fn parse_extra(text: &str) -> Extra {
    match parse_literal(text) {
        Some(val) => Extra::Lit(val),
        // References may name the label with or without its defining colon.
        None => Extra::LabelRef(text.trim_start_matches(':').to_string()),
    }
}

// `0x` hex, `0b` binary, all-digit decimal; anything else reads as a label.
fn parse_literal(text: &str) -> Option<u16> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u16::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = text.strip_prefix("0b").or_else(|| text.strip_prefix("0B")) {
        u16::from_str_radix(bin, 2).ok()
    } else if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        text.parse().ok()
    } else {
        None
    }
}
