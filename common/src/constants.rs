// Machine-wide layout. Device register blocks live in ordinary memory; each
// device watches its own block, so the bases only need to stay out of the way
// of program text loaded at 0.

pub const MEM_WORDS: usize = 0x1_0000;
pub const SP_INIT: u16 = 0xffff;

pub const DISPLAY_HW_ID: u32 = 0x7349_f615;
pub const KEYBOARD_HW_ID: u32 = 0x30cf_7406;
pub const CLOCK_HW_ID: u32 = 0x12d0_b402;

pub const DISPLAY_BASE: u16 = 0x8000;
pub const KEYBOARD_BASE: u16 = 0x8010;
pub const CLOCK_BASE: u16 = 0x8020;

// Character-cell display: a 32x12 grid of 4x8 glyphs.
pub const SCREEN_COLS: usize = 32;
pub const SCREEN_ROWS: usize = 12;
pub const CELL_WIDTH: usize = 4;
pub const CELL_HEIGHT: usize = 8;
pub const SCREEN_WIDTH: usize = SCREEN_COLS * CELL_WIDTH;
pub const SCREEN_HEIGHT: usize = SCREEN_ROWS * CELL_HEIGHT;
pub const VRAM_WORDS: u16 = (SCREEN_COLS * SCREEN_ROWS) as u16;
pub const FONT_WORDS: u16 = 256; // 128 glyphs, two words each
pub const PALETTE_WORDS: u16 = 16;
pub const PIXEL_BYTES: usize = 4; // RGBA8
pub const FRAME_BYTES: usize = SCREEN_WIDTH * SCREEN_HEIGHT * PIXEL_BYTES;
