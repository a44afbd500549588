//! One-bit drawing layer.

/// Frame width in pixels.
pub const FRAME_WIDTH: usize = 256;
/// Frame height in pixels.
pub const FRAME_HEIGHT: usize = 192;
/// Bytes per packed layer row.
pub const ROW_BYTES: usize = FRAME_WIDTH / 8;

/// A 256x192 plane of drawn / not-drawn pixels.
///
/// Rows are packed 8 pixels per byte in the same order as the bitstream:
/// the least significant bit of each byte is the leftmost pixel.
#[derive(Clone, PartialEq, Eq)]
pub struct Layer {
    bits: Vec<u8>,
}

impl Default for Layer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layer")
            .field("set_pixels", &self.count_set())
            .finish()
    }
}

impl Layer {
    /// Blank layer.
    pub fn new() -> Self {
        Self {
            bits: vec![0u8; ROW_BYTES * FRAME_HEIGHT],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.bits[y * ROW_BYTES + x / 8] & (1 << (x % 8)) != 0
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        let byte = &mut self.bits[y * ROW_BYTES + x / 8];
        if value {
            *byte |= 1 << (x % 8);
        } else {
            *byte &= !(1 << (x % 8));
        }
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[u8] {
        &self.bits[y * ROW_BYTES..(y + 1) * ROW_BYTES]
    }

    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        &mut self.bits[y * ROW_BYTES..(y + 1) * ROW_BYTES]
    }

    /// Reset every pixel to blank.
    pub fn clear(&mut self) {
        self.bits.fill(0);
    }

    pub fn count_set(&self) -> usize {
        self.bits.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Shift the contents by (dx, dy).
    ///
    /// Pixels moved past an edge are dropped and the uncovered area is blank.
    pub fn translate(&mut self, dx: i32, dy: i32) {
        if dx == 0 && dy == 0 {
            return;
        }
        let mut shifted = Layer::new();
        for y in 0..FRAME_HEIGHT {
            let ty = y as i32 + dy;
            if !(0..FRAME_HEIGHT as i32).contains(&ty) {
                continue;
            }
            for x in 0..FRAME_WIDTH {
                let tx = x as i32 + dx;
                if (0..FRAME_WIDTH as i32).contains(&tx) && self.get(x, y) {
                    shifted.set(tx as usize, ty as usize, true);
                }
            }
        }
        *self = shifted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_bit_order() {
        let mut layer = Layer::new();
        layer.set(0, 0, true);
        layer.set(9, 0, true);
        assert_eq!(layer.row(0)[0], 0b0000_0001);
        assert_eq!(layer.row(0)[1], 0b0000_0010);
        assert!(layer.get(9, 0));
        layer.set(9, 0, false);
        assert!(!layer.get(9, 0));
        assert_eq!(layer.count_set(), 1);
    }

    #[test]
    fn test_translate_moves_pixels() {
        let mut layer = Layer::new();
        layer.set(10, 20, true);
        layer.translate(5, -3);
        assert!(layer.get(15, 17));
        assert_eq!(layer.count_set(), 1);
    }

    #[test]
    fn test_translate_discards_out_of_bounds() {
        let mut layer = Layer::new();
        layer.set(FRAME_WIDTH - 1, 0, true);
        layer.set(0, FRAME_HEIGHT - 1, true);
        layer.translate(1, 0);
        assert!(!layer.get(0, FRAME_HEIGHT - 1));
        assert!(layer.get(1, FRAME_HEIGHT - 1));
        assert_eq!(layer.count_set(), 1);

        // Fully outside the canvas leaves a blank layer
        layer.translate(0, FRAME_HEIGHT as i32);
        assert_eq!(layer.count_set(), 0);
    }
}
