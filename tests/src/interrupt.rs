use common::asm::Reg;
use common::constants::{KEYBOARD_BASE, SP_INIT};
use computer::{Computer, Key};

#[test]
fn stack_frame_layout() {
    let mut comp = Computer::new();
    comp.reg_write(Reg::A, 0x1111);
    comp.set_ia(0x400);
    comp.write_word(KEYBOARD_BASE + 2, 0x7).unwrap();

    comp.key_down(Key::Char('k')).unwrap();

    // Old PC at the first pushed slot, old A below it.
    assert_eq!(comp.pc(), 0x400);
    assert_eq!(comp.reg_read(Reg::A), 0x7);
    assert_eq!(comp.sp(), SP_INIT - 2);
    assert_eq!(comp.read_word(SP_INIT - 1).unwrap(), 0);
    assert_eq!(comp.read_word(SP_INIT - 2).unwrap(), 0x1111);
}

#[test]
fn masked_until_ia_set() {
    let mut comp = Computer::new();
    comp.write_word(KEYBOARD_BASE + 2, 0x7).unwrap();
    comp.key_down(Key::Char('k')).unwrap();

    // IA still 0: no vectoring, but the key is buffered all the same.
    assert_eq!(comp.pc(), 0);
    assert_eq!(comp.sp(), SP_INIT);
    comp.write_word(KEYBOARD_BASE, 1).unwrap();
    assert_eq!(comp.read_word(KEYBOARD_BASE + 1).unwrap(), 'k' as u16);
}

#[test]
fn handler_executes() {
    let src = r#"
        :spin
            SET PC, spin
        :handler
            SET B, A
            SET C, 0xcafe
        :done
            SET PC, done
    "#;
    let mut comp = Computer::new();
    comp.load_assembly(src).unwrap();
    comp.run(1).unwrap();

    comp.set_ia(2); // :handler
    comp.write_word(KEYBOARD_BASE + 2, 0x42).unwrap();
    comp.key_down(Key::Return).unwrap();
    comp.run(2).unwrap();

    assert_eq!(comp.reg_read(Reg::B), 0x42);
    assert_eq!(comp.reg_read(Reg::C), 0xcafe);
}
