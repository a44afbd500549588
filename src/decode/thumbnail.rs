//! Embedded 64x48 thumbnail bitmap.

use crate::error::{PpmError, Result};
use crate::format::THUMBNAIL_SIZE;

pub const THUMBNAIL_WIDTH: usize = 64;
pub const THUMBNAIL_HEIGHT: usize = 48;

const TILE: usize = 8;

/// Fixed 16-colour thumbnail palette, RGBA.
pub const THUMBNAIL_PALETTE: [[u8; 4]; 16] = [
    [0xFE, 0xFE, 0xFE, 0xFF],
    [0x4F, 0x4F, 0x4F, 0xFF],
    [0xFF, 0xFF, 0xFF, 0xFF],
    [0x9F, 0x9F, 0x9F, 0xFF],
    [0xFF, 0x00, 0x00, 0xFF],
    [0x77, 0x00, 0x00, 0xFF],
    [0xFF, 0x77, 0x77, 0xFF],
    [0x00, 0xFF, 0x00, 0xFF],
    [0x00, 0x00, 0xFF, 0xFF],
    [0x00, 0x00, 0x77, 0xFF],
    [0x77, 0x77, 0xFF, 0xFF],
    [0x00, 0xFF, 0x00, 0xFF],
    [0xFF, 0x00, 0xFF, 0xFF],
    [0x00, 0xFF, 0x00, 0xFF],
    [0x00, 0xFF, 0x00, 0xFF],
    [0x00, 0xFF, 0x00, 0xFF],
];

/// Thumbnail as row-major indices into [`THUMBNAIL_PALETTE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pixels: Vec<u8>,
}

impl Thumbnail {
    /// Untile the 4bpp bitmap: 8x8 tiles left to right, top to bottom,
    /// two pixels per byte with the left pixel in the low nibble.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < THUMBNAIL_SIZE {
            return Err(PpmError::invalid(format!(
                "thumbnail needs {THUMBNAIL_SIZE} bytes, got {}",
                data.len()
            )));
        }

        let mut pixels = vec![0u8; THUMBNAIL_WIDTH * THUMBNAIL_HEIGHT];
        let tiles_x = THUMBNAIL_WIDTH / TILE;
        for (i, &byte) in data[..THUMBNAIL_SIZE].iter().enumerate() {
            let n = i * 2;
            let tile = n / (TILE * TILE);
            let within = n % (TILE * TILE);
            let x = (tile % tiles_x) * TILE + within % TILE;
            let y = (tile / tiles_x) * TILE + within / TILE;
            let idx = y * THUMBNAIL_WIDTH + x;
            pixels[idx] = byte & 0x0F;
            pixels[idx + 1] = byte >> 4;
        }
        Ok(Self { pixels })
    }

    pub fn width(&self) -> usize {
        THUMBNAIL_WIDTH
    }

    pub fn height(&self) -> usize {
        THUMBNAIL_HEIGHT
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * THUMBNAIL_WIDTH + x]
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn rgba(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|&i| THUMBNAIL_PALETTE[i as usize])
            .collect()
    }
}
