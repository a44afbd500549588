//! Synthetic PPM containers for unit tests.

use std::collections::BTreeMap;

use crate::decode::{FRAME_HEIGHT, LINE_TABLE_BYTES, Paper, Pen, ROW_BYTES};
use crate::format::{ANIMATION_OFFSET, FrameFlags, PPM_MAGIC, SIGNATURE_SIZE, THUMBNAIL_OFFSET};

/// One encoded row payload.
#[derive(Debug, Clone)]
pub enum TestRow {
    Raw([u8; ROW_BYTES]),
    Compressed { mask: u32, chunks: Vec<u8> },
    CompressedFlip { mask: u32, chunks: Vec<u8> },
}

impl TestRow {
    fn line_type(&self) -> u8 {
        match self {
            TestRow::Compressed { .. } => 1,
            TestRow::CompressedFlip { .. } => 2,
            TestRow::Raw(_) => 3,
        }
    }

    fn payload(&self, out: &mut Vec<u8>) {
        match self {
            TestRow::Raw(bits) => out.extend_from_slice(bits),
            TestRow::Compressed { mask, chunks } | TestRow::CompressedFlip { mask, chunks } => {
                assert_eq!(mask.count_ones() as usize, chunks.len());
                out.extend_from_slice(&mask.to_be_bytes());
                out.extend_from_slice(chunks);
            }
        }
    }
}

/// Frame bitstream builder. Rows not given are encoded as skipped.
#[derive(Debug, Clone)]
pub struct TestFrame {
    pub flags: FrameFlags,
    pub translate: (i8, i8),
    rows: BTreeMap<(usize, usize), TestRow>,
    /// Trailing bytes dropped from the encoded bitstream.
    truncate: usize,
}

impl TestFrame {
    /// Keyframe with no rows, black pens on white paper.
    pub fn blank() -> Self {
        Self {
            flags: FrameFlags::default(),
            translate: (0, 0),
            rows: BTreeMap::new(),
            truncate: 0,
        }
    }

    pub fn difference(mut self) -> Self {
        self.flags.difference = true;
        self
    }

    pub fn sfx(mut self, sfx: [bool; 3]) -> Self {
        self.flags.sfx = sfx;
        self
    }

    pub fn pens(mut self, pens: [Pen; 2]) -> Self {
        self.flags.pens = pens;
        self
    }

    pub fn paper(mut self, paper: Paper) -> Self {
        self.flags.paper = paper;
        self
    }

    pub fn translate(mut self, dx: i8, dy: i8) -> Self {
        self.flags.translate = [false, true];
        self.translate = (dx, dy);
        self
    }

    pub fn row(mut self, layer: usize, y: usize, row: TestRow) -> Self {
        self.rows.insert((layer, y), row);
        self
    }

    /// Every row of `layer` stored raw with all pixels set.
    pub fn full_layer(mut self, layer: usize) -> Self {
        for y in 0..FRAME_HEIGHT {
            self.rows.insert((layer, y), TestRow::Raw([0xFF; ROW_BYTES]));
        }
        self
    }

    /// Cut `n` bytes off the end of the encoded frame.
    pub fn truncated(mut self, n: usize) -> Self {
        self.truncate = n;
        self
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = vec![self.flags.header_byte()];
        if self.flags.is_translated() {
            out.push(self.translate.0 as u8);
            out.push(self.translate.1 as u8);
        }

        for layer in 0..2 {
            let mut table = [0u8; LINE_TABLE_BYTES];
            for ((l, y), row) in &self.rows {
                if *l == layer {
                    table[y / 4] |= row.line_type() << ((y % 4) * 2);
                }
            }
            out.extend_from_slice(&table);
        }

        // BTreeMap order is layer, then row
        for row in self.rows.values() {
            row.payload(&mut out);
        }
        out.truncate(out.len().saturating_sub(self.truncate));
        out
    }
}

/// Whole-container builder.
#[derive(Debug, Clone)]
pub struct PpmBuilder {
    pub frames: Vec<TestFrame>,
    pub tracks: [Vec<u8>; 4],
    pub locked: bool,
    pub looped: bool,
    pub thumbnail_frame: u16,
    pub frame_speed: u8,
    pub bgm_speed: u8,
    pub author_names: [String; 3],
    pub timestamp: u32,
    pub thumbnail: Vec<u8>,
    /// Replace one raw frame table entry: (frame, relative offset).
    pub frame_offset_override: Option<(usize, u32)>,
}

impl Default for PpmBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PpmBuilder {
    pub fn new() -> Self {
        Self {
            frames: vec![TestFrame::blank()],
            tracks: Default::default(),
            locked: false,
            looped: false,
            thumbnail_frame: 0,
            frame_speed: 8,
            bgm_speed: 8,
            author_names: Default::default(),
            timestamp: 0,
            thumbnail: Vec::new(),
            frame_offset_override: None,
        }
    }

    pub fn frames(mut self, frames: Vec<TestFrame>) -> Self {
        self.frames = frames;
        self
    }

    pub fn tracks(mut self, tracks: [Vec<u8>; 4]) -> Self {
        self.tracks = tracks;
        self
    }

    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    pub fn looped(mut self, looped: bool) -> Self {
        self.looped = looped;
        self
    }

    pub fn thumbnail_frame(mut self, index: u16) -> Self {
        self.thumbnail_frame = index;
        self
    }

    pub fn speeds(mut self, frame_speed: u8, bgm_speed: u8) -> Self {
        self.frame_speed = frame_speed;
        self.bgm_speed = bgm_speed;
        self
    }

    pub fn author_names(mut self, names: [&str; 3]) -> Self {
        self.author_names = names.map(str::to_owned);
        self
    }

    pub fn timestamp(mut self, timestamp: u32) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn thumbnail(mut self, bitmap: Vec<u8>) -> Self {
        self.thumbnail = bitmap;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let frame_count = self.frames.len();
        assert!(frame_count >= 1);

        let mut offsets = Vec::with_capacity(frame_count);
        let mut frame_data = Vec::new();
        for frame in &self.frames {
            offsets.push(frame_data.len() as u32);
            frame_data.extend_from_slice(&frame.encode());
        }
        if let Some((index, offset)) = self.frame_offset_override {
            offsets[index] = offset;
        }

        let table_size = frame_count * 4;
        let animation_size = 8 + table_size + frame_data.len();
        let sound_size: usize = self.tracks.iter().map(Vec::len).sum();

        let mut out = vec![0u8; ANIMATION_OFFSET];
        out[..4].copy_from_slice(PPM_MAGIC);
        put_u32(&mut out, 0x04, animation_size as u32);
        put_u32(&mut out, 0x08, sound_size as u32);
        put_u16(&mut out, 0x0C, (frame_count - 1) as u16);
        put_u16(&mut out, 0x0E, 0x24);
        put_u16(&mut out, 0x10, self.locked as u16);
        put_u16(&mut out, 0x12, self.thumbnail_frame);

        for (i, name) in self.author_names.iter().enumerate() {
            let base = 0x14 + i * 22;
            for (j, unit) in name.encode_utf16().take(11).enumerate() {
                put_u16(&mut out, base + j * 2, unit);
            }
        }
        out[0x56..0x5E].copy_from_slice(&[0x11; 8]);
        out[0x5E..0x66].copy_from_slice(&[0x22; 8]);
        write_filename(&mut out, 0x66, 0);
        write_filename(&mut out, 0x78, 7);
        out[0x8A..0x92].copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        out[0x92..0x9A].copy_from_slice(&[0xAA; 8]);
        put_u32(&mut out, 0x9A, self.timestamp);
        out[THUMBNAIL_OFFSET..THUMBNAIL_OFFSET + self.thumbnail.len()]
            .copy_from_slice(&self.thumbnail);

        // Animation header
        out.extend_from_slice(&(table_size as u16).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&((self.looped as u16) << 1).to_le_bytes());
        for offset in &offsets {
            out.extend_from_slice(&offset.to_le_bytes());
        }
        out.extend_from_slice(&frame_data);

        // Sound region
        for frame in &self.frames {
            let sfx = frame.flags.sfx;
            out.push(sfx[0] as u8 | (sfx[1] as u8) << 1 | (sfx[2] as u8) << 2);
        }
        while out.len() % 4 != 0 {
            out.push(0);
        }
        for track in &self.tracks {
            out.extend_from_slice(&(track.len() as u32).to_le_bytes());
        }
        out.push(8 - self.frame_speed);
        out.push(8 - self.bgm_speed);
        out.extend_from_slice(&[0u8; 14]);
        for track in &self.tracks {
            out.extend_from_slice(track);
        }

        out.extend_from_slice(&[0u8; SIGNATURE_SIZE]);
        out
    }
}

fn put_u16(out: &mut [u8], at: usize, v: u16) {
    out[at..at + 2].copy_from_slice(&v.to_le_bytes());
}

fn put_u32(out: &mut [u8], at: usize, v: u32) {
    out[at..at + 4].copy_from_slice(&v.to_le_bytes());
}

fn write_filename(out: &mut [u8], at: usize, edit_count: u16) {
    out[at..at + 3].copy_from_slice(&[0xF7, 0x8D, 0xA8]);
    out[at + 3..at + 16].copy_from_slice(b"14768882B56B8");
    put_u16(out, at + 16, edit_count);
}
