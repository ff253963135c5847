#![cfg(test)]

mod addressing_modes;
mod arith;
mod interrupt;
mod io;
mod progs;
