use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH, SPRITE_WIDTH};

/// A snapshot of every pixel on the screen, indexed as [y][x]; each pixel is 0 or 1.
pub type Frame = [[u8; DISPLAY_WIDTH]; DISPLAY_HEIGHT];

/// # Framebuffer
/// The 64x32 monochrome screen plus a dirty flag.
///
/// The flag is raised by any visible change and only lowered by whoever renders the frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Framebuffer {
    pixels: Frame,
    dirty: bool,
}

impl Framebuffer {
    pub fn new() -> Self {
        Framebuffer {
            pixels: [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
            dirty: false,
        }
    }

    pub fn clear(&mut self) {
        self.pixels = [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
        self.dirty = true;
    }

    /// XORs a single pixel, wrapping coordinates around both axes.
    ///
    /// Returns whether the pixel was erased (went from 1 to 0).
    pub fn toggle(&mut self, x: usize, y: usize) -> bool {
        let pixel = &mut self.pixels[y % DISPLAY_HEIGHT][x % DISPLAY_WIDTH];
        *pixel ^= 1;
        self.dirty = true;
        *pixel == 0
    }

    /// draw_sprite(x, y, rows)
    /// XORs an 8 pixel wide sprite onto the screen with wrapping, one byte per row, most
    /// significant bit leftmost.
    ///
    /// Returns whether any pixel was erased.
    pub fn draw_sprite(&mut self, x: usize, y: usize, rows: &[u8]) -> bool {
        let mut collision = false;
        for (row, byte) in rows.iter().enumerate() {
            for bit in 0..SPRITE_WIDTH {
                if byte & (0x80 >> bit) != 0 {
                    collision |= self.toggle(x + bit, y + row);
                }
            }
        }
        self.dirty = true;
        collision
    }

    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.pixels[y % DISPLAY_HEIGHT][x % DISPLAY_WIDTH]
    }

    pub fn pixels(&self) -> &Frame {
        &self.pixels
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Forces a redraw, e.g. after the whole frame was swapped out
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_blank_and_clean() {
        let fb = Framebuffer::new();
        assert!(fb.pixels().iter().flatten().all(|&p| p == 0));
        assert!(!fb.is_dirty());
    }

    #[test]
    fn test_clear_sets_dirty() {
        let mut fb = Framebuffer::new();
        fb.toggle(3, 4);
        fb.clear_dirty();
        fb.clear();
        assert_eq!(fb.pixel(3, 4), 0);
        assert!(fb.is_dirty());
    }

    #[test]
    fn test_toggle_reports_erase() {
        let mut fb = Framebuffer::new();
        assert!(!fb.toggle(0, 0));
        assert_eq!(fb.pixel(0, 0), 1);
        assert!(fb.toggle(0, 0));
        assert_eq!(fb.pixel(0, 0), 0);
    }

    #[test]
    fn test_toggle_wraps() {
        let mut fb = Framebuffer::new();
        fb.toggle(DISPLAY_WIDTH + 1, DISPLAY_HEIGHT + 2);
        assert_eq!(fb.pixels()[2][1], 1);
    }

    #[test]
    fn test_draw_sprite_xors() {
        let mut fb = Framebuffer::new();
        // 0 1 0 1 -> Set
        fb.toggle(1, 0);
        fb.toggle(3, 0);
        // 1 1 0 0 -> Draw xor
        let collision = fb.draw_sprite(0, 0, &[0b1100_0000]);
        assert_eq!(fb.pixels()[0][0..4], [1, 0, 0, 1]);
        assert!(collision);
    }

    #[test]
    fn test_draw_sprite_wraps_both_axes() {
        let mut fb = Framebuffer::new();
        let collision = fb.draw_sprite(62, 31, &[0xFF, 0x80]);
        assert!(!collision);
        assert_eq!(fb.pixels()[31][62..64], [1, 1]);
        assert_eq!(fb.pixels()[31][0..6], [1, 1, 1, 1, 1, 1]);
        assert_eq!(fb.pixels()[0][62], 1);
        assert_eq!(fb.pixels()[0][63], 0);
    }

    #[test]
    fn test_draw_sprite_twice_erases() {
        let mut fb = Framebuffer::new();
        assert!(!fb.draw_sprite(10, 10, &[0xF0, 0x90]));
        assert!(fb.draw_sprite(10, 10, &[0xF0, 0x90]));
        assert!(fb.pixels().iter().flatten().all(|&p| p == 0));
    }
}
