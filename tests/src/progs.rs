use common::asm::Reg;
use computer::Computer;

fn run(src: &str, cycles: usize) -> Computer {
    let mut comp = Computer::new();
    comp.load_assembly(src).unwrap();
    comp.run(cycles).unwrap();
    comp
}

#[test]
fn counting_loop() {
    let src = r#"
        SET A, 0
        :loop
            ADD A, 1
            SET PC, loop
    "#;
    // One setup instruction, then two per iteration.
    let comp = run(src, 1 + 2 * 5);
    assert_eq!(comp.reg_read(Reg::A), 5);
}

#[test]
fn spin_holds_pc() {
    let src = r#"
        SET A, 1
        :spin
            SET PC, spin
    "#;
    let comp = run(src, 100);
    // :spin sits after the two-word SET A, 1.
    assert_eq!(comp.pc(), 2);
}

#[test]
fn copy_through_memory() {
    let src = r#"
        SET [0x100], 0xdead
        SET A, 0x100
        SET B, [A]
        SET [0x101], B
    "#;
    let comp = run(src, 4);
    assert_eq!(comp.read_word(0x101).unwrap(), 0xdead);
}

#[test]
fn label_value_as_operand() {
    let src = r#"
        SET A, table
        SET PC, halt
        :table
        :halt
            SET PC, halt
    "#;
    // SET A, table (2 words) + SET PC, halt (2 words) put both labels at 4.
    let comp = run(src, 3);
    assert_eq!(comp.reg_read(Reg::A), 4);
    assert_eq!(comp.pc(), 4);
}

#[test]
fn hello_demo_renders() {
    let mut comp = Computer::new();
    comp.load_assembly(include_str!("../../demos/hello.s")).unwrap();
    comp.run(16).unwrap();

    let frame = comp.display_pixels().unwrap();
    // 'H' lights the top-left pixel of the first cell.
    assert_eq!(&frame[..4], &[0xff, 0xff, 0xff, 0xff]);
}

#[test]
fn assembled_image_runs_on_bare_emulator() {
    use common::constants::MEM_WORDS;
    use emu_lib::{Cpu, MemorySystem};

    let prog = as_lib::assemble("SET A, 0x1234").unwrap();
    let mut mem = MemorySystem::new(MEM_WORDS);
    mem.load(0, &prog.words).unwrap();
    let mut cpu = Cpu::new();
    cpu.exec(&mut mem, 1).unwrap();
    assert_eq!(cpu.reg_read(Reg::A), 0x1234);
}

#[test]
fn sixteen_bit_wraparound() {
    let src = r#"
        SET A, 0xffff
        ADD A, 1
        SET B, 0
        SUB B, 1
    "#;
    let comp = run(src, 4);
    assert_eq!(comp.reg_read(Reg::A), 0);
    assert_eq!(comp.ex(), 0xffff);
    assert_eq!(comp.reg_read(Reg::B), 0xffff);
}
