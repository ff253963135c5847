use common::asm::Reg;
use computer::Computer;

// Each case runs on a fresh machine: SET A / SET B / one op. Returns the
// result in A and whatever landed in EX.
fn run(ins: &str, a: u16, b: u16) -> (u16, u16) {
    let src = format!("SET A, 0x{a:x}\nSET B, 0x{b:x}\n{ins} A, B\n");
    let mut comp = Computer::new();
    comp.load_assembly(&src).unwrap();
    comp.run(3).unwrap();
    (comp.reg_read(Reg::A), comp.ex())
}

#[test]
fn set() {
    assert_eq!(run("SET", 0, 5), (5, 0));
    assert_eq!(run("SET", 0xffff, 0), (0, 0));
}

#[test]
fn add() {
    assert_eq!(run("ADD", 1, 2), (3, 0));
    assert_eq!(run("ADD", 0xffff, 1), (0, 1));
    assert_eq!(run("ADD", 0x8000, 0x8000), (0, 1));
    assert_eq!(run("ADD", 0xffff, 0xffff), (0xfffe, 1));
}

#[test]
fn sub() {
    assert_eq!(run("SUB", 5, 3), (2, 0));
    assert_eq!(run("SUB", 3, 5), (0xfffe, 0xffff));
    assert_eq!(run("SUB", 0, 1), (0xffff, 0xffff));
}

#[test]
fn mul() {
    assert_eq!(run("MUL", 3, 4), (12, 0));
    assert_eq!(run("MUL", 0x8000, 2), (0, 1));
    assert_eq!(run("MUL", 0xffff, 0xffff), (1, 0xfffe));
}

#[test]
fn mli() {
    // -2 * 3 = -6
    assert_eq!(run("MLI", 0xfffe, 3), (0xfffa, 0xffff));
    assert_eq!(run("MLI", 2, 3), (6, 0));
}

#[test]
fn div() {
    assert_eq!(run("DIV", 12, 4), (3, 0));
    // EX picks up the fractional part: 1/2 = 0 r 0x8000/0x10000.
    assert_eq!(run("DIV", 1, 2), (0, 0x8000));
    assert_eq!(run("DIV", 7, 0), (0, 0));
}

#[test]
fn dvi() {
    // -6 / 2 = -3
    assert_eq!(run("DVI", 0xfffa, 2).0, 0xfffd);
    assert_eq!(run("DVI", 6, 2).0, 3);
    assert_eq!(run("DVI", 6, 0), (0, 0));
}

#[test]
fn modulo() {
    assert_eq!(run("MOD", 7, 3).0, 1);
    assert_eq!(run("MOD", 7, 0).0, 0);
    // -7 mod 3 keeps the dividend's sign.
    assert_eq!(run("MDI", 0xfff9, 3).0, 0xffff);
    assert_eq!(run("MDI", 7, 0).0, 0);
    // i16::MIN % -1 must yield 0, not trap.
    assert_eq!(run("MDI", 0x8000, 0xffff).0, 0);
}

#[test]
fn mod_leaves_ex_alone() {
    let src = "SET EX, 0x1234\nSET A, 7\nSET B, 3\nMOD A, B\n";
    let mut comp = Computer::new();
    comp.load_assembly(src).unwrap();
    comp.run(4).unwrap();
    assert_eq!(comp.reg_read(Reg::A), 1);
    assert_eq!(comp.ex(), 0x1234);
}

#[test]
fn bitwise() {
    assert_eq!(run("AND", 0b1100, 0b1010).0, 0b1000);
    assert_eq!(run("BOR", 0b1100, 0b1010).0, 0b1110);
    assert_eq!(run("XOR", 0b1100, 0b1010).0, 0b0110);
}

#[test]
fn shr() {
    assert_eq!(run("SHR", 8, 2), (2, 0));
    // Bits shifted out land in EX, high end first.
    assert_eq!(run("SHR", 1, 1), (0, 0x8000));
    assert_eq!(run("SHR", 0xffff, 16), (0, 0xffff));
}

#[test]
fn asr() {
    assert_eq!(run("ASR", 0x8000, 1), (0xc000, 0));
    assert_eq!(run("ASR", 0xfffc, 1), (0xfffe, 0));
    assert_eq!(run("ASR", 5, 1), (2, 0x8000));
}

#[test]
fn shl() {
    assert_eq!(run("SHL", 1, 4), (16, 0));
    assert_eq!(run("SHL", 0x8000, 1), (0, 1));
    assert_eq!(run("SHL", 0xffff, 16), (0, 0xffff));
}
