//! Colour selection and layer compositing.

use serde::Serialize;

use super::layer::{FRAME_HEIGHT, FRAME_WIDTH, Layer};
use crate::format::FrameFlags;

/// Paper (background) colour of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum Paper {
    Black = 0,
    White = 1,
}

/// Two-bit pen selector of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum Pen {
    /// Same colour as the paper.
    Paper = 0,
    /// Opposite of the paper (black on white, white on black).
    Inverse = 1,
    Red = 2,
    Blue = 3,
}

impl Pen {
    /// Decode the low two bits.
    pub fn from_bits(v: u8) -> Self {
        match v & 0x03 {
            0 => Pen::Paper,
            1 => Pen::Inverse,
            2 => Pen::Red,
            _ => Pen::Blue,
        }
    }
}

/// The four colours a frame can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FrameColor {
    White,
    Black,
    Red,
    Blue,
}

impl FrameColor {
    pub fn rgba(self) -> [u8; 4] {
        match self {
            FrameColor::White => [0xFF, 0xFF, 0xFF, 0xFF],
            FrameColor::Black => [0x00, 0x00, 0x00, 0xFF],
            FrameColor::Red => [0xFF, 0x00, 0x00, 0xFF],
            FrameColor::Blue => [0x00, 0x00, 0xFF, 0xFF],
        }
    }
}

impl From<Paper> for FrameColor {
    fn from(paper: Paper) -> Self {
        match paper {
            Paper::Black => FrameColor::Black,
            Paper::White => FrameColor::White,
        }
    }
}

/// Resolve a pen selector against the frame's paper colour.
pub fn resolve_pen(pen: Pen, paper: Paper) -> FrameColor {
    match (pen, paper) {
        (Pen::Paper, _) => paper.into(),
        (Pen::Inverse, Paper::White) => FrameColor::Black,
        (Pen::Inverse, Paper::Black) => FrameColor::White,
        (Pen::Red, _) => FrameColor::Red,
        (Pen::Blue, _) => FrameColor::Blue,
    }
}

/// Raster pixel values.
pub const PAPER_INDEX: u8 = 0;
pub const LAYER0_INDEX: u8 = 1;
pub const LAYER1_INDEX: u8 = 2;

/// Composited frame: 256x192 indices into a three-entry palette.
///
/// Index 0 is the paper, 1 the layer 0 pen and 2 the layer 1 pen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    pixels: Vec<u8>,
    palette: [FrameColor; 3],
}

impl Raster {
    #[inline]
    pub fn width(&self) -> usize {
        FRAME_WIDTH
    }

    #[inline]
    pub fn height(&self) -> usize {
        FRAME_HEIGHT
    }

    /// Palette index at (x, y).
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * FRAME_WIDTH + x]
    }

    /// Row-major palette indices.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn row(&self, y: usize) -> &[u8] {
        &self.pixels[y * FRAME_WIDTH..(y + 1) * FRAME_WIDTH]
    }

    pub fn palette(&self) -> [FrameColor; 3] {
        self.palette
    }

    pub fn palette_rgba(&self) -> [[u8; 4]; 3] {
        self.palette.map(FrameColor::rgba)
    }

    /// Expand to row-major RGBA8 for an image encoder.
    pub fn rgba(&self) -> Vec<u8> {
        let palette = self.palette_rgba();
        self.pixels
            .iter()
            .flat_map(|&i| palette[i as usize])
            .collect()
    }
}

/// Combine two decoded layers into a palette-indexed raster.
///
/// Layer 1 is drawn over layer 0 where both are set.
pub fn compose_raster(layers: &[Layer; 2], flags: &FrameFlags) -> Raster {
    let mut pixels = vec![PAPER_INDEX; FRAME_WIDTH * FRAME_HEIGHT];
    for y in 0..FRAME_HEIGHT {
        let (row0, row1) = (layers[0].row(y), layers[1].row(y));
        let out = &mut pixels[y * FRAME_WIDTH..(y + 1) * FRAME_WIDTH];
        for (x, px) in out.iter_mut().enumerate() {
            let mask = 1 << (x % 8);
            if row1[x / 8] & mask != 0 {
                *px = LAYER1_INDEX;
            } else if row0[x / 8] & mask != 0 {
                *px = LAYER0_INDEX;
            }
        }
    }

    Raster {
        pixels,
        palette: [
            flags.paper.into(),
            resolve_pen(flags.pens[0], flags.paper),
            resolve_pen(flags.pens[1], flags.paper),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pen_resolution() {
        assert_eq!(resolve_pen(Pen::Inverse, Paper::White), FrameColor::Black);
        assert_eq!(resolve_pen(Pen::Inverse, Paper::Black), FrameColor::White);
        assert_eq!(resolve_pen(Pen::Paper, Paper::Black), FrameColor::Black);
        assert_eq!(resolve_pen(Pen::Red, Paper::Black), FrameColor::Red);
        assert_eq!(resolve_pen(Pen::from_bits(0b111), Paper::White), FrameColor::Blue);
    }

    #[test]
    fn test_layer_one_drawn_on_top() {
        let mut layers = [Layer::new(), Layer::new()];
        layers[0].set(1, 0, true);
        layers[0].set(2, 0, true);
        layers[1].set(2, 0, true);
        layers[1].set(3, 0, true);

        let flags = FrameFlags {
            pens: [Pen::Red, Pen::Blue],
            ..Default::default()
        };
        let raster = compose_raster(&layers, &flags);

        assert_eq!(raster.get(0, 0), PAPER_INDEX);
        assert_eq!(raster.get(1, 0), LAYER0_INDEX);
        assert_eq!(raster.get(2, 0), LAYER1_INDEX);
        assert_eq!(raster.get(3, 0), LAYER1_INDEX);
        assert_eq!(
            raster.palette(),
            [FrameColor::White, FrameColor::Red, FrameColor::Blue]
        );
    }

    #[test]
    fn test_rgba_expansion() {
        let mut layers = [Layer::new(), Layer::new()];
        layers[0].set(0, 0, true);
        let flags = FrameFlags {
            paper: Paper::Black,
            ..Default::default()
        };
        let raster = compose_raster(&layers, &flags);
        let rgba = raster.rgba();

        assert_eq!(rgba.len(), FRAME_WIDTH * FRAME_HEIGHT * 4);
        // Inverse pen on black paper is white
        assert_eq!(&rgba[0..4], &[0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(&rgba[4..8], &[0x00, 0x00, 0x00, 0xFF]);
    }
}
