use std::sync::{Arc, Mutex};

use bytemuck::cast_slice;
use common::constants::*;
use common::misc::ToU16P;

use crate::cpu::Cpu;
use crate::hw::HardwareDevice;
use crate::mem::MemorySystem;
use crate::misc::EmuError;

use log::trace;

// Control register offsets within the device block.
const REG_SCREEN: u16 = 0;
const REG_FONT: u16 = 1;
const REG_PALETTE: u16 = 2;
const REG_BORDER: u16 = 3;
const NUM_CTRL_REGS: u16 = 4;

// Mapped registers, shared with the watch closures wired in `connect`.
struct DisplayRegs {
    screen_base: u16,
    font_base: u16,
    palette_base: u16,
    border: u16,
    dirty: bool,
    remapped: bool,
}

// Character-cell display. Renders a 32x12 grid of 4x8 glyph cells out of
// machine memory into an RGBA8 framebuffer. Each cell word packs a foreground
// nibble, a background nibble, and a 7-bit glyph index.
pub struct Display {
    regs: Arc<Mutex<DisplayRegs>>,
    // Video window currently wired with dirty-watches.
    watched: Option<u16>,
    pixels: Vec<[u8; PIXEL_BYTES]>,
}

impl Display {
    pub fn new() -> Display {
        Display {
            regs: Arc::new(Mutex::new(DisplayRegs {
                screen_base: 0,
                font_base: 0,
                palette_base: 0,
                border: 0,
                dirty: true,
                remapped: false,
            })),
            watched: None,
            pixels: vec![[0; PIXEL_BYTES]; SCREEN_WIDTH * SCREEN_HEIGHT],
        }
    }

    pub fn border_color(&self) -> u16 {
        self.regs.lock().unwrap().border
    }

    pub fn pixels(&self) -> &[u8] {
        cast_slice(&self.pixels)
    }

    // Rewire window watches if the screen base moved, then re-render if
    // anything is dirty. Shared by `update` and on-demand readback.
    pub fn refresh(&mut self, mem: &mut MemorySystem) -> Result<(), EmuError> {
        let (remapped, screen_base) = {
            let mut regs = self.regs.lock().unwrap();
            let remapped = std::mem::take(&mut regs.remapped);
            (remapped, regs.screen_base)
        };
        if remapped {
            self.rewire(mem, screen_base);
        }

        if self.regs.lock().unwrap().dirty {
            self.render(mem)?;
            self.regs.lock().unwrap().dirty = false;
        }
        Ok(())
    }

    // Move the dirty-watches from the old video window to the new one.
    fn rewire(&mut self, mem: &mut MemorySystem, base: u16) {
        trace!("display: video window moved to {base:#06x}");
        if let Some(old) = self.watched.take() {
            for addr in old..old.saturating_add(VRAM_WORDS) {
                mem.unwatch(addr);
            }
        }
        if base != 0 {
            for addr in base..base.saturating_add(VRAM_WORDS) {
                let regs = Arc::clone(&self.regs);
                mem.watch(
                    addr,
                    Box::new(move |_cells, _addr, _val| {
                        regs.lock().unwrap().dirty = true;
                    }),
                );
            }
            self.watched = Some(base);
        }
    }

    fn render(&mut self, mem: &MemorySystem) -> Result<(), EmuError> {
        let (screen, font, palette) = {
            let regs = self.regs.lock().unwrap();
            (regs.screen_base, regs.font_base, regs.palette_base)
        };

        // Screen base 0 means no window is mapped: a blank frame.
        if screen == 0 {
            self.pixels.fill([0, 0, 0, 0xff]);
            return Ok(());
        }

        for row in 0..SCREEN_ROWS {
            for col in 0..SCREEN_COLS {
                let cell = mem.read(screen.wrapping_add((row * SCREEN_COLS + col).to_u16p()))?;
                let fg = (cell >> 12) & 0xf;
                let bg = (cell >> 8) & 0xf;
                let glyph = cell & 0x7f;

                for gx in 0..CELL_WIDTH {
                    // Two glyph columns per font word, high octet first.
                    let idx = glyph * 2 + (gx / 2) as u16;
                    let pair = if font == 0 {
                        DEFAULT_FONT[idx as usize]
                    } else {
                        mem.read(font.wrapping_add(idx))?
                    };
                    let column = if gx % 2 == 0 { pair >> 8 } else { pair & 0xff };

                    for gy in 0..CELL_HEIGHT {
                        let lit = (column >> gy) & 1 != 0;
                        let entry = if lit { fg } else { bg };
                        let rgb = if palette == 0 {
                            DEFAULT_PALETTE[entry as usize]
                        } else {
                            mem.read(palette.wrapping_add(entry))?
                        };

                        let x = col * CELL_WIDTH + gx;
                        let y = row * CELL_HEIGHT + gy;
                        self.pixels[y * SCREEN_WIDTH + x] = expand_rgb(rgb);
                    }
                }
            }
        }
        Ok(())
    }
}

// 12-bit 0x0RGB to RGBA8, each nibble widened to a full channel.
fn expand_rgb(rgb: u16) -> [u8; 4] {
    let chan = |nibble: u16| ((nibble << 4) | nibble) as u8;
    [
        chan((rgb >> 8) & 0xf),
        chan((rgb >> 4) & 0xf),
        chan(rgb & 0xf),
        0xff,
    ]
}

impl HardwareDevice for Display {
    fn hardware_id(&self) -> u32 {
        DISPLAY_HW_ID
    }

    fn connect(&mut self, mem: &mut MemorySystem) {
        for offset in 0..NUM_CTRL_REGS {
            let regs = Arc::clone(&self.regs);
            mem.watch(
                DISPLAY_BASE + offset,
                Box::new(move |_cells, _addr, val| {
                    let mut regs = regs.lock().unwrap();
                    match offset {
                        REG_SCREEN => {
                            if regs.screen_base != val {
                                regs.screen_base = val;
                                regs.remapped = true;
                            }
                        }
                        REG_FONT => regs.font_base = val,
                        REG_PALETTE => regs.palette_base = val,
                        REG_BORDER => regs.border = val,
                        _ => unreachable!(),
                    }
                    regs.dirty = true;
                }),
            );
        }
    }

    fn update(&mut self, _cpu: &mut Cpu, mem: &mut MemorySystem) -> Result<(), EmuError> {
        self.refresh(mem)
    }
}

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}

// Built-in 4x8 font, two words per glyph, one octet per column, bit 0 at the
// top. Used whenever the font base register is 0.
#[rustfmt::skip]
pub const DEFAULT_FONT: [u16; FONT_WORDS as usize] = [
    0xb79e, 0x388e, 0x722c, 0x75f4, 0x19bb, 0x7f8f, 0x85f9, 0xb158,
    0x242e, 0x2400, 0x082a, 0x0800, 0x0008, 0x0000, 0x0808, 0x0808,
    0x00ff, 0x0000, 0x00f8, 0x0808, 0x08f8, 0x0000, 0x080f, 0x0000,
    0x000f, 0x0808, 0x00ff, 0x0808, 0x08f8, 0x0808, 0x08ff, 0x0000,
    0x080f, 0x0808, 0x08ff, 0x0808, 0x6633, 0x99cc, 0x9933, 0x66cc,
    0xfef8, 0xe080, 0x7f1f, 0x0701, 0x0107, 0x1f7f, 0x80e0, 0xf8fe,
    0x5500, 0xaa00, 0x55aa, 0x55aa, 0xffaa, 0xff55, 0x0f0f, 0x0f0f,
    0xf0f0, 0xf0f0, 0x0000, 0xffff, 0xffff, 0x0000, 0xffff, 0xffff,
    0x0000, 0x0000, 0x005f, 0x0000, 0x0300, 0x0300, 0x3e14, 0x3e00,
    0x266b, 0x3200, 0x611c, 0x4300, 0x3629, 0x7650, 0x0002, 0x0100,
    0x1c22, 0x4100, 0x4122, 0x1c00, 0x1408, 0x1400, 0x081c, 0x0800,
    0x4020, 0x0000, 0x0808, 0x0800, 0x0040, 0x0000, 0x601c, 0x0300,
    0x3e49, 0x3e00, 0x427f, 0x4000, 0x6259, 0x4600, 0x2249, 0x3600,
    0x0f08, 0x7f00, 0x2745, 0x3900, 0x3e49, 0x3200, 0x6119, 0x0700,
    0x3649, 0x3600, 0x2649, 0x3e00, 0x0024, 0x0000, 0x4024, 0x0000,
    0x0814, 0x2200, 0x1414, 0x1400, 0x2214, 0x0800, 0x0259, 0x0600,
    0x3e59, 0x5e00, 0x7e09, 0x7e00, 0x7f49, 0x3600, 0x3e41, 0x2200,
    0x7f41, 0x3e00, 0x7f49, 0x4100, 0x7f09, 0x0100, 0x3e41, 0x7a00,
    0x7f08, 0x7f00, 0x417f, 0x4100, 0x2040, 0x3f00, 0x7f08, 0x7700,
    0x7f40, 0x4000, 0x7f06, 0x7f00, 0x7f01, 0x7e00, 0x3e41, 0x3e00,
    0x7f09, 0x0600, 0x3e61, 0x7e00, 0x7f09, 0x7600, 0x2649, 0x3200,
    0x017f, 0x0100, 0x3f40, 0x7f00, 0x1f60, 0x1f00, 0x7f30, 0x7f00,
    0x7708, 0x7700, 0x0778, 0x0700, 0x7149, 0x4700, 0x007f, 0x4100,
    0x031c, 0x6000, 0x417f, 0x0000, 0x0201, 0x0200, 0x8080, 0x8000,
    0x0001, 0x0200, 0x2454, 0x7800, 0x7f44, 0x3800, 0x3844, 0x2800,
    0x3844, 0x7f00, 0x3854, 0x5800, 0x087e, 0x0900, 0x4854, 0x3c00,
    0x7f04, 0x7800, 0x047d, 0x0000, 0x2040, 0x3d00, 0x7f10, 0x6c00,
    0x017f, 0x0000, 0x7c18, 0x7c00, 0x7c04, 0x7800, 0x3844, 0x3800,
    0x7c14, 0x0800, 0x0814, 0x7c00, 0x7c04, 0x0800, 0x4854, 0x2400,
    0x043e, 0x4400, 0x3c40, 0x7c00, 0x1c60, 0x1c00, 0x7c30, 0x7c00,
    0x6c10, 0x6c00, 0x4c50, 0x3c00, 0x6454, 0x4c00, 0x0836, 0x4100,
    0x0077, 0x0000, 0x4136, 0x0800, 0x0201, 0x0201, 0x0205, 0x0200,
];

// Built-in 16-entry 12-bit palette, 0x0RGB. Used whenever the palette base
// register is 0.
#[rustfmt::skip]
pub const DEFAULT_PALETTE: [u16; PALETTE_WORDS as usize] = [
    0x000, 0x00a, 0x0a0, 0x0aa, 0xa00, 0xa0a, 0xa50, 0xaaa,
    0x555, 0x55f, 0x5f5, 0x5ff, 0xf55, 0xf5f, 0xff5, 0xfff,
];
