use common::asm::{Opcode, RawInstr, Reg, param};
use common::constants::{MEM_WORDS, SP_INIT};
use emu_lib::{Cpu, MemorySystem};

fn word(opcode: Opcode, a: u16, b: u16) -> u16 {
    RawInstr {
        opcode: opcode as u16,
        a,
        b,
    }
    .encode()
}

fn machine(words: &[u16]) -> (Cpu, MemorySystem) {
    let mut mem = MemorySystem::new(MEM_WORDS);
    mem.load(0, words).unwrap();
    (Cpu::new(), mem)
}

#[test]
fn small_literal() {
    // SET A, 7 with the inline literal code.
    let (mut cpu, mut mem) = machine(&[word(Opcode::Set, 0x00, param::SMALL_LIT + 7)]);
    cpu.exec(&mut mem, 1).unwrap();
    assert_eq!(cpu.reg_read(Reg::A), 7);
    assert_eq!(cpu.pc(), 1);
}

#[test]
fn next_word_literal() {
    let (mut cpu, mut mem) = machine(&[word(Opcode::Set, 0x00, param::NEXT_WORD_LIT), 0xbeef]);
    cpu.exec(&mut mem, 1).unwrap();
    assert_eq!(cpu.reg_read(Reg::A), 0xbeef);
    assert_eq!(cpu.pc(), 2);
}

#[test]
fn register_indirect() {
    // SET [A], 3 then SET B, [A]
    let (mut cpu, mut mem) = machine(&[
        word(Opcode::Set, param::REG_INDIRECT, param::SMALL_LIT + 3),
        word(Opcode::Set, 0x01, param::REG_INDIRECT),
    ]);
    cpu.reg_write(Reg::A, 0x500);
    cpu.exec(&mut mem, 2).unwrap();
    assert_eq!(mem.read(0x500).unwrap(), 3);
    assert_eq!(cpu.reg_read(Reg::B), 3);
}

#[test]
fn indexed_indirect() {
    // SET [A + 2], 9
    let (mut cpu, mut mem) = machine(&[
        word(Opcode::Set, param::IDX_INDIRECT, param::SMALL_LIT + 9),
        2,
    ]);
    cpu.reg_write(Reg::A, 0x500);
    cpu.exec(&mut mem, 1).unwrap();
    assert_eq!(mem.read(0x502).unwrap(), 9);
    assert_eq!(cpu.pc(), 2);
}

#[test]
fn next_word_indirect() {
    let (mut cpu, mut mem) = machine(&[
        word(Opcode::Set, param::NEXT_WORD_IND, param::SMALL_LIT + 4),
        0x700,
    ]);
    cpu.exec(&mut mem, 1).unwrap();
    assert_eq!(mem.read(0x700).unwrap(), 4);
}

#[test]
fn push_then_pop() {
    // SET PUSH, 5 / SET PUSH, 6 / SET A, POP / SET B, POP
    let (mut cpu, mut mem) = machine(&[
        word(Opcode::Set, param::PUSH_POP, param::SMALL_LIT + 5),
        word(Opcode::Set, param::PUSH_POP, param::SMALL_LIT + 6),
        word(Opcode::Set, 0x00, param::PUSH_POP),
        word(Opcode::Set, 0x01, param::PUSH_POP),
    ]);
    cpu.exec(&mut mem, 2).unwrap();
    assert_eq!(cpu.sp(), SP_INIT - 2);
    cpu.exec(&mut mem, 2).unwrap();
    assert_eq!(cpu.reg_read(Reg::A), 6);
    assert_eq!(cpu.reg_read(Reg::B), 5);
    assert_eq!(cpu.sp(), SP_INIT);
}

#[test]
fn peek_and_pick() {
    // SET PUSH, 1 / SET PUSH, 2 / SET A, PEEK / SET B, [SP + 1]
    let (mut cpu, mut mem) = machine(&[
        word(Opcode::Set, param::PUSH_POP, param::SMALL_LIT + 1),
        word(Opcode::Set, param::PUSH_POP, param::SMALL_LIT + 2),
        word(Opcode::Set, 0x00, param::PEEK),
        word(Opcode::Set, 0x01, param::PICK),
        1,
    ]);
    cpu.exec(&mut mem, 4).unwrap();
    assert_eq!(cpu.reg_read(Reg::A), 2);
    assert_eq!(cpu.reg_read(Reg::B), 1);
    // Neither PEEK nor PICK moves SP.
    assert_eq!(cpu.sp(), SP_INIT - 2);
}

#[test]
fn special_registers_direct() {
    // SET SP, 0x100 / SET A, SP / SET EX, 3 / SET B, EX
    let (mut cpu, mut mem) = machine(&[
        word(Opcode::Set, param::SP, param::NEXT_WORD_LIT),
        0x100,
        word(Opcode::Set, 0x00, param::SP),
        word(Opcode::Set, param::EX, param::SMALL_LIT + 3),
        word(Opcode::Set, 0x01, param::EX),
    ]);
    cpu.exec(&mut mem, 4).unwrap();
    assert_eq!(cpu.sp(), 0x100);
    assert_eq!(cpu.reg_read(Reg::A), 0x100);
    assert_eq!(cpu.reg_read(Reg::B), 3);
}

#[test]
fn pc_reads_past_the_instruction() {
    // SET A, PC. PC has already advanced past the whole instruction when the
    // operand is read.
    let (mut cpu, mut mem) = machine(&[word(Opcode::Set, 0x00, param::PC)]);
    cpu.exec(&mut mem, 1).unwrap();
    assert_eq!(cpu.reg_read(Reg::A), 1);
}

#[test]
fn a_extra_word_fetched_before_b() {
    // SET [0x600], [0x601]: a's trailing word comes first in the stream.
    let (mut cpu, mut mem) = machine(&[
        word(Opcode::Set, param::NEXT_WORD_IND, param::NEXT_WORD_IND),
        0x600,
        0x601,
    ]);
    mem.write(0x601, 0x4242).unwrap();
    cpu.exec(&mut mem, 1).unwrap();
    assert_eq!(mem.read(0x600).unwrap(), 0x4242);
    assert_eq!(cpu.pc(), 3);
}
