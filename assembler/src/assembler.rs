use std::collections::HashMap;

use crate::ir::{Extra, Ins, Stmt, parse_operand};
use common::asm::{Opcode, RawInstr};

use log::trace;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AsmError {
    #[error("unknown mnemonic '{0}'")]
    UnknownMnemonic(String),

    #[error("label '{0}' referenced but never defined")]
    UndefinedLabel(String),

    #[error("label '{0}' defined more than once")]
    DuplicateLabel(String),
}

#[derive(Debug)]
pub struct Program {
    pub words: Vec<u16>,
    pub labels: HashMap<String, u16>,
}

pub fn assemble(src: &str) -> Result<Program, AsmError> {
    Assembler::new().assemble(src)
}

struct Assembler {
    words: Vec<u16>,
    labels: HashMap<String, u16>,
    // (index into words, label name) pairs awaiting backfill.
    patches: Vec<(usize, String)>,
}

impl Assembler {
    fn new() -> Assembler {
        Assembler {
            words: Vec::new(),
            labels: HashMap::new(),
            patches: Vec::new(),
        }
    }

    fn assemble(mut self, src: &str) -> Result<Program, AsmError> {
        let stmts = tokenize(src);

        // Pass 1: fix every label to a word address without emitting anything.
        let mut addr: u16 = 0;
        for stmt in &stmts {
            match stmt {
                Stmt::Label(name) => {
                    trace!("label '{name}' at {addr:#06x}");
                    if self.labels.insert(name.clone(), addr).is_some() {
                        return Err(AsmError::DuplicateLabel(name.clone()));
                    }
                }
                Stmt::Ins(ins) => addr = addr.wrapping_add(ins.size()),
            }
        }

        // Pass 2: emit over the same statement list; labels already placed.
        for stmt in &stmts {
            if let Stmt::Ins(ins) = stmt {
                self.emit(ins)?;
            }
        }

        // Backfill the recorded label references.
        for (idx, name) in std::mem::take(&mut self.patches) {
            let addr = self
                .labels
                .get(&name)
                .ok_or(AsmError::UndefinedLabel(name))?;
            self.words[idx] = *addr;
        }

        Ok(Program {
            words: self.words,
            labels: self.labels,
        })
    }

    fn emit(&mut self, ins: &Ins) -> Result<(), AsmError> {
        let opcode = Opcode::from_mnemonic(&ins.mnemonic)
            .ok_or_else(|| AsmError::UnknownMnemonic(ins.mnemonic.clone()))?;

        let mut params = [0u16; 2];
        let mut extras = Vec::new();
        for (param, arg) in params.iter_mut().zip(ins.args.iter().take(2)) {
            let (code, extra) = parse_operand(arg);
            *param = code;
            extras.extend(extra);
        }

        let word = RawInstr {
            opcode: opcode as u16,
            a: params[0],
            b: params[1],
        };
        self.words.push(word.encode());

        // Extra words follow the instruction word in a-then-b order.
        for extra in extras {
            match extra {
                Extra::Lit(val) => self.words.push(val),
                Extra::LabelRef(name) => {
                    self.patches.push((self.words.len(), name));
                    self.words.push(0);
                }
            }
        }
        Ok(())
    }
}

// Strip comments and blanks; split the rest into label and instruction lines.
fn tokenize(src: &str) -> Vec<Stmt> {
    let mut stmts = Vec::new();
    for line in src.lines() {
        let line = line.split(';').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        if let Some(name) = line.strip_prefix(':') {
            stmts.push(Stmt::Label(name.trim().to_string()));
            continue;
        }

        let (mnemonic, rest) = match line.split_once(char::is_whitespace) {
            Some((m, rest)) => (m, rest),
            None => (line, ""),
        };
        let args = if rest.trim().is_empty() {
            Vec::new()
        } else {
            rest.split(',').map(|a| a.trim().to_string()).collect()
        };
        stmts.push(Stmt::Ins(Ins {
            mnemonic: mnemonic.to_string(),
            args,
        }));
    }
    stmts
}
