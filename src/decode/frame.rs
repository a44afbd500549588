//! Frame bitstream decoder.
//!
//! A frame bitstream is laid out as:
//!
//! ```text
//! header byte              (see FrameFlags)
//! [dx: i8, dy: i8]         only when a translate flag is set
//! line types, layer 0      48 bytes, 2 bits per row, lowest bits first
//! line types, layer 1      48 bytes
//! row payloads, layer 0    rows 0..192 in order
//! row payloads, layer 1
//! ```
//!
//! Row payloads depend on the row's line type: nothing for skipped rows,
//! 32 bytes for raw rows, and a big-endian chunk mask followed by one byte
//! per set mask bit for the two compressed types. Decoded rows are
//! XOR-merged onto the inherited layer (blank for keyframes, the previous
//! frame for difference frames).

use super::layer::{FRAME_HEIGHT, Layer, ROW_BYTES};
use crate::error::{PpmError, Result};
use crate::format::{ByteCursor, FrameFlags};

/// Bytes of line-type table per layer.
pub const LINE_TABLE_BYTES: usize = FRAME_HEIGHT / 4;

/// Per-row encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LineType {
    /// Row unchanged, no payload.
    Skip = 0,
    /// Chunk mask plus the changed chunks.
    Compressed = 1,
    /// Like `Compressed`, but chunks absent from the mask are fully set.
    CompressedFlip = 2,
    /// Every pixel stored, 32 bytes.
    Raw = 3,
}

impl LineType {
    pub fn from_bits(v: u8) -> Self {
        match v & 0x03 {
            0 => LineType::Skip,
            1 => LineType::Compressed,
            2 => LineType::CompressedFlip,
            _ => LineType::Raw,
        }
    }
}

/// Translation carried by a frame header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Translate {
    pub dx: i8,
    pub dy: i8,
}

/// Decoder for one dependency chain.
///
/// Holds the two working layers; each decoded frame is merged into them in
/// place, so after [`FrameDecoder::decode`] they are the frame's final
/// layers and the base for the next difference frame.
#[derive(Debug, Clone, Default)]
pub struct FrameDecoder {
    layers: [Layer; 2],
    has_previous: bool,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layers of the most recently decoded frame.
    pub fn layers(&self) -> &[Layer; 2] {
        &self.layers
    }

    /// Whether a previous frame is available for difference decoding.
    pub fn has_previous(&self) -> bool {
        self.has_previous
    }

    /// Forget the previous frame.
    pub fn reset(&mut self) {
        self.layers.iter_mut().for_each(Layer::clear);
        self.has_previous = false;
    }

    /// Decode frame `frame` from its bitstream.
    ///
    /// Difference frames merge onto the layers left by the previous call;
    /// without a previous frame they start from blank. On error the decoder
    /// drops its previous state.
    pub fn decode(&mut self, frame: usize, bitstream: &[u8]) -> Result<FrameFlags> {
        match self.decode_inner(bitstream) {
            Ok(flags) => {
                self.has_previous = true;
                Ok(flags)
            }
            Err(reason) => {
                self.has_previous = false;
                Err(PpmError::CorruptFrame { frame, reason })
            }
        }
    }

    fn decode_inner(&mut self, bitstream: &[u8]) -> std::result::Result<FrameFlags, String> {
        let mut r = ByteCursor::new(bitstream);
        let header_err = |e: PpmError| format!("frame header: {e}");
        let flags = FrameFlags::from_parts(r.read_u8().map_err(header_err)?, 0);

        let translate = if flags.is_translated() {
            Translate {
                dx: r.read_i8().map_err(header_err)?,
                dy: r.read_i8().map_err(header_err)?,
            }
        } else {
            Translate::default()
        };

        let mut line_types = [[LineType::Skip; FRAME_HEIGHT]; 2];
        for (l, table) in line_types.iter_mut().enumerate() {
            let bytes = r
                .read_bytes(LINE_TABLE_BYTES)
                .map_err(|e| format!("line table of layer {l}: {e}"))?;
            for (i, &byte) in bytes.iter().enumerate() {
                for j in 0..4 {
                    table[i * 4 + j] = LineType::from_bits(byte >> (j * 2));
                }
            }
        }

        if flags.difference && self.has_previous {
            for layer in &mut self.layers {
                layer.translate(translate.dx as i32, translate.dy as i32);
            }
        } else {
            self.layers.iter_mut().for_each(Layer::clear);
        }

        for (l, (layer, types)) in self.layers.iter_mut().zip(&line_types).enumerate() {
            for (y, &line_type) in types.iter().enumerate() {
                merge_row(&mut r, line_type, layer.row_mut(y))
                    .map_err(|e| format!("row {y} of layer {l} ({line_type:?}): {e}"))?;
            }
        }

        Ok(flags)
    }
}

/// Read one row payload and XOR it onto `row`.
fn merge_row(r: &mut ByteCursor<'_>, line_type: LineType, row: &mut [u8]) -> Result<()> {
    match line_type {
        LineType::Skip => {}
        LineType::Raw => {
            let bytes = r.read_bytes(ROW_BYTES)?;
            for (dst, src) in row.iter_mut().zip(bytes) {
                *dst ^= src;
            }
        }
        LineType::Compressed | LineType::CompressedFlip => {
            let mask = r.read_u32_be()?;
            let fill = if line_type == LineType::CompressedFlip {
                0xFF
            } else {
                0x00
            };
            for (chunk, dst) in row.iter_mut().enumerate() {
                let delta = if mask & (0x8000_0000 >> chunk) != 0 {
                    r.read_u8()?
                } else {
                    fill
                };
                *dst ^= delta;
            }
        }
    }
    Ok(())
}
