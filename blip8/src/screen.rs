//! Monochrome display buffer.
use crate::constants::*;

/// A single pixel record as observed by a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pixel {
    pub x: usize,
    pub y: usize,
    pub on: bool,
}

/// Screen buffer that sprites are XOR-drawn into.
pub(crate) struct Screen {
    buffer: Box<[bool; DISPLAY_BUFFER_SIZE]>,
}

impl Default for Screen {
    fn default() -> Self {
        Self {
            buffer: Box::new([false; DISPLAY_BUFFER_SIZE]),
        }
    }
}

impl Screen {
    pub(crate) fn new() -> Self {
        Default::default()
    }

    /// Reset all pixels to unset.
    pub(crate) fn clear(&mut self) {
        self.buffer.fill(false);
    }

    #[inline]
    pub(crate) fn pixel(&self, x: usize, y: usize) -> bool {
        self.buffer[x + y * DISPLAY_WIDTH]
    }

    /// XOR one sprite row into the buffer at `(x, y)`, most significant
    /// bit first. Columns past the right edge are dropped, not wrapped.
    ///
    /// Returns whether any set pixel was flipped to unset (a collision).
    pub(crate) fn draw_octet(&mut self, mut x: usize, y: usize, octet: u8) -> bool {
        let mut collision = false;
        let mut bit_mask = 0b1000_0000u8;

        for _ in 0..8 {
            if x >= DISPLAY_WIDTH {
                break;
            }

            let new_px = octet & bit_mask != 0;
            let old_px = self.buffer[x + y * DISPLAY_WIDTH];

            // XOR erases a pixel when the old and new values are both set.
            collision |= new_px && old_px;
            self.buffer[x + y * DISPLAY_WIDTH] = old_px ^ new_px;

            bit_mask >>= 1;
            x += 1;
        }

        collision
    }

    /// Read a rectangle of pixels, clipped to the buffer bounds.
    ///
    /// The iterator is lazy and can be restarted by calling `read` again;
    /// this is the only channel a renderer observes pixel state through.
    pub(crate) fn read(
        &self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> impl Iterator<Item = Pixel> + '_ {
        (y..(y + height).min(DISPLAY_HEIGHT)).flat_map(move |row| {
            (x..(x + width).min(DISPLAY_WIDTH)).map(move |col| Pixel {
                x: col,
                y: row,
                on: self.pixel(col, row),
            })
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_draw_sets_pixels_msb_first() {
        let mut screen = Screen::new();
        let collision = screen.draw_octet(0, 0, 0b1010_0001);

        assert!(!collision);
        assert!(screen.pixel(0, 0));
        assert!(!screen.pixel(1, 0));
        assert!(screen.pixel(2, 0));
        assert!(screen.pixel(7, 0));
    }

    #[test]
    fn test_redraw_erases_and_reports_collision() {
        let mut screen = Screen::new();
        assert!(!screen.draw_octet(4, 2, 0xFF));
        assert!(screen.draw_octet(4, 2, 0xFF));

        for x in 4..12 {
            assert!(!screen.pixel(x, 2));
        }
    }

    #[test]
    fn test_zero_bits_do_not_collide() {
        let mut screen = Screen::new();
        screen.draw_octet(0, 0, 0b1111_0000);
        // Overlapping zero bits leave set pixels alone.
        let collision = screen.draw_octet(0, 0, 0b0000_1111);

        assert!(!collision);
        for x in 0..8 {
            assert!(screen.pixel(x, 0));
        }
    }

    #[test]
    fn test_right_edge_clips_instead_of_wrapping() {
        let mut screen = Screen::new();
        screen.draw_octet(DISPLAY_WIDTH - 2, 0, 0xFF);

        assert!(screen.pixel(DISPLAY_WIDTH - 2, 0));
        assert!(screen.pixel(DISPLAY_WIDTH - 1, 0));
        // Nothing wrapped around to the left side.
        for x in 0..6 {
            assert!(!screen.pixel(x, 0));
        }
    }

    #[test]
    fn test_read_clips_to_bounds() {
        let mut screen = Screen::new();
        screen.draw_octet(DISPLAY_WIDTH - 4, DISPLAY_HEIGHT - 1, 0xF0);

        let pixels: Vec<Pixel> = screen
            .read(DISPLAY_WIDTH - 4, DISPLAY_HEIGHT - 1, 8, 2)
            .collect();

        // 4 columns remain in bounds, 1 row.
        assert_eq!(pixels.len(), 4);
        assert!(pixels.iter().all(|p| p.on));
    }

    #[test]
    fn test_read_is_restartable() {
        let mut screen = Screen::new();
        screen.draw_octet(0, 0, 0x80);

        let first: Vec<Pixel> = screen.read(0, 0, 2, 1).collect();
        let second: Vec<Pixel> = screen.read(0, 0, 2, 1).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_clear_unsets_everything() {
        let mut screen = Screen::new();
        screen.draw_octet(10, 10, 0xFF);
        screen.clear();

        assert!(screen.read(0, 0, DISPLAY_WIDTH, DISPLAY_HEIGHT).all(|p| !p.on));
    }
}
