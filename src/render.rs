use std::sync::Mutex;
use std::sync::PoisonError;

use crate::cell::Placement;
use crate::cell::Renderer;
use crate::grid::Pos;

/// Hex values of braille dots
///
/// ```text
///  1   8
///  2  10
///  4  20
/// 40  80
/// ```
///
/// Where the base blank pattern is codepoint `0x2800` (or U+2800)
///
/// To get other configurations, just add the numbers above.
const BRAILLE_EMPTY: u32 = 0x2800;

/// Pixels covered by one braille character, horizontally and vertically
const DOTS_X: usize = 2;
const DOTS_Y: usize = 4;

struct Framebuffer {
    /// The pixel buffer, row-major
    px: Vec<bool>,

    /// Width of the pixel buffer
    w: usize,

    /// Height of the pixel buffer
    h: usize,
}

impl Framebuffer {
    fn fill(&mut self, placement: &Placement, on: bool) {
        let x_end = (placement.top_x + placement.width).min(self.w);
        let y_end = (placement.top_y + placement.height).min(self.h);

        for y in placement.top_y..y_end {
            let row = y * self.w;
            self.px[row + placement.top_x.min(x_end)..row + x_end].fill(on);
        }
    }

    /// Every pixel is either on or off: render them as braille, one line of text per 4 rows of
    /// pixels.
    fn render(&self) -> String {
        let (bw, bh) = (self.w.div_ceil(DOTS_X), self.h.div_ceil(DOTS_Y));

        // compute codepoints
        let mut cp = vec![BRAILLE_EMPTY; bw * bh];

        for (n, &on) in self.px.iter().enumerate() {
            let (x, y) = (n % self.w, n / self.w);

            if on {
                cp[(y / DOTS_Y) * bw + (x / DOTS_X)] += dot_value(x, y);
            }
        }

        // Each braille character is 3 bytes, and newlines one byte.
        let mut fb = String::with_capacity(3 * (bw * bh) + bh);

        for (i, &c) in cp.iter().enumerate() {
            if i > 0 && i % bw == 0 {
                fb.push('\n');
            }

            fb.push(char::from_u32(c).unwrap_or(' '));
        }

        fb
    }
}

fn dot_value(x: usize, y: usize) -> u32 {
    match (x % DOTS_X, y % DOTS_Y) {
        (0, 0) => 0x1,
        (1, 0) => 0x8,
        (0, 1) => 0x2,
        (1, 1) => 0x10,
        (0, 2) => 0x4,
        (1, 2) => 0x20,
        (0, 3) => 0x40,
        (1, 3) => 0x80,
        _ => unreachable!(),
    }
}

/// A terminal drawing surface made of braille characters, each one showing 2x4 pixels.
///
/// Cells paint their placement rectangle on it as they change: alive cells light their pixels up,
/// dead cells clear them. Colors are ignored.
pub struct Screen {
    fb: Mutex<Framebuffer>,
}

impl Screen {
    /// A blank screen of `w` by `h` pixels
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            fb: Mutex::new(Framebuffer {
                px: vec![false; w * h],
                w,
                h,
            }),
        }
    }

    /// A screen just large enough for a grid.
    pub fn for_grid(rows: usize, cols: usize, cell_size: usize) -> Self {
        Self::new(cols * cell_size, rows * cell_size)
    }

    /// Width and height of the rendered text, in characters
    pub fn text_size(&self) -> (usize, usize) {
        let fb = self.fb.lock().unwrap_or_else(PoisonError::into_inner);

        (fb.w.div_ceil(DOTS_X), fb.h.div_ceil(DOTS_Y))
    }

    pub fn render(&self) -> String {
        self.fb
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .render()
    }

    /// The grid position shown at character `(column, row)` of the rendered text.
    pub fn cell_at(column: u16, row: u16, cell_size: usize) -> Pos {
        let x = column as usize * DOTS_X;
        let y = row as usize * DOTS_Y;

        Pos::new(y / cell_size, x / cell_size)
    }
}

impl Renderer for Screen {
    fn cell_changed(&self, active: bool, placement: &Placement) {
        self.fb
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .fill(placement, active);
    }
}
