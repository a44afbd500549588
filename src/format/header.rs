//! Fixed header, sound header and frame offset table of a PPM container.

use std::ops::Range;

use serde::Serialize;

use super::cursor::ByteCursor;
use crate::decode::{Paper, Pen, TrackKind};
use crate::error::{PpmError, Result};

/// Magic bytes identifying a Flipnote PPM file.
pub const PPM_MAGIC: &[u8; 4] = b"PARA";

/// Start of the metadata block.
pub const METADATA_OFFSET: usize = 0x14;
/// Start of the embedded 64x48 thumbnail bitmap.
pub const THUMBNAIL_OFFSET: usize = 0xA0;
pub const THUMBNAIL_SIZE: usize = 0x600;
/// Start of the animation region (animation header, offset table, frame data).
pub const ANIMATION_OFFSET: usize = 0x6A0;
/// First entry of the frame offset table.
pub const FRAME_TABLE_OFFSET: usize = 0x6A8;
/// Size of one frame offset table entry.
pub const FRAME_TABLE_ENTRY_SIZE: usize = 4;
/// Four track sizes, two speed bytes and padding.
pub const SOUND_HEADER_SIZE: usize = 32;
/// Trailing signature plus its padding.
pub const SIGNATURE_SIZE: usize = 0x80 + 0x10;

/// Frames per second for each stored speed value (index 0 unused).
const SPEED_FPS: [f32; 9] = [0.0, 0.5, 1.0, 2.0, 4.0, 6.0, 12.0, 20.0, 30.0];

/// Playback speed setting, 1 (slowest) to 8 (fastest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameSpeed(u8);

impl FrameSpeed {
    pub fn new(v: u8) -> Option<Self> {
        (1..=8).contains(&v).then_some(Self(v))
    }

    /// Decode the on-disk byte, which stores `8 - speed`.
    pub fn from_stored(byte: u8) -> Option<Self> {
        8u8.checked_sub(byte).and_then(Self::new)
    }

    #[inline]
    pub fn value(self) -> u8 {
        self.0
    }

    /// Frames per second at this speed.
    #[inline]
    pub fn fps(self) -> f32 {
        SPEED_FPS[self.0 as usize]
    }
}

/// Unpacked per-frame flag word.
///
/// Low byte is the frame's own header byte, bits 8..10 are the SFX flags
/// from the sound region:
///
/// ```text
/// bit 0     paper colour (1 = white)
/// bits 1-2  layer 0 pen
/// bits 3-4  layer 1 pen
/// bits 5-6  translate present
/// bit 7     keyframe (clear = difference frame)
/// bits 8-10 SFX 1..3 trigger
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameFlags {
    /// Frame is encoded against the previous frame.
    pub difference: bool,
    /// Translate-present flags; either one means a (dx, dy) pair follows the header byte.
    pub translate: [bool; 2],
    pub paper: Paper,
    /// Pen selectors for layer 0 and layer 1.
    pub pens: [Pen; 2],
    /// SFX trigger bits for effects 1, 2, 3.
    pub sfx: [bool; 3],
}

impl Default for FrameFlags {
    fn default() -> Self {
        Self {
            difference: false,
            translate: [false; 2],
            paper: Paper::White,
            pens: [Pen::Inverse; 2],
            sfx: [false; 3],
        }
    }
}

impl FrameFlags {
    pub fn from_parts(frame_header: u8, sfx_bits: u8) -> Self {
        Self::from_u16(frame_header as u16 | ((sfx_bits as u16 & 0x07) << 8))
    }

    pub fn from_u16(v: u16) -> Self {
        let bit = |n: u16| v & (1 << n) != 0;
        Self {
            difference: !bit(7),
            translate: [bit(5), bit(6)],
            paper: if bit(0) { Paper::White } else { Paper::Black },
            pens: [Pen::from_bits((v >> 1) as u8), Pen::from_bits((v >> 3) as u8)],
            sfx: [bit(8), bit(9), bit(10)],
        }
    }

    pub fn to_u16(self) -> u16 {
        let mut v = self.paper as u16;
        v |= (self.pens[0] as u16) << 1;
        v |= (self.pens[1] as u16) << 3;
        v |= (self.translate[0] as u16) << 5;
        v |= (self.translate[1] as u16) << 6;
        if !self.difference {
            v |= 1 << 7;
        }
        for (i, &set) in self.sfx.iter().enumerate() {
            v |= (set as u16) << (8 + i);
        }
        v
    }

    /// The frame header byte as stored at the start of the frame bitstream.
    #[inline]
    pub fn header_byte(self) -> u8 {
        self.to_u16() as u8
    }

    #[inline]
    pub fn is_translated(self) -> bool {
        self.translate[0] || self.translate[1]
    }
}

/// Location and flags of one frame's bitstream.
#[derive(Debug, Clone, Copy)]
pub struct FrameOffsetEntry {
    /// Playback index.
    pub index: usize,
    /// Absolute byte offset of the frame bitstream.
    pub offset: usize,
    /// Bytes available to the frame (up to the next frame or the region end).
    pub size: usize,
    pub flags: FrameFlags,
}

impl FrameOffsetEntry {
    /// Byte range of the bitstream within the container.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.size
    }

    #[inline]
    pub fn flag_word(&self) -> u16 {
        self.flags.to_u16()
    }
}

/// Parsed PPM header plus the region layout derived from it.
#[derive(Debug, Clone)]
pub struct Header {
    /// Size of the animation region starting at [`ANIMATION_OFFSET`].
    pub animation_size: u32,
    /// Combined size of the four audio tracks.
    pub sound_size: u32,
    /// Total number of frames (always at least 1).
    pub frame_count: usize,
    pub format_version: u16,
    pub locked: bool,
    pub looped: bool,
    /// Frame shown as the thumbnail, 0-based.
    pub thumbnail_frame: usize,
    /// Size in bytes of the frame offset table.
    pub frame_table_size: usize,
    /// Absolute start of frame data (offset table entries are relative to it).
    pub frame_data_offset: usize,
    /// Absolute end of frame data; the SFX flag table starts here.
    pub frame_data_end: usize,
    pub sound_header_offset: usize,
    /// Track sizes in [`TrackKind::ALL`] order.
    pub track_sizes: [u32; 4],
    pub frame_speed: FrameSpeed,
    pub bgm_speed: FrameSpeed,
    /// Absolute start of the BGM track; other tracks follow back to back.
    pub audio_offset: usize,
    /// Total length implied by the header, signature included.
    pub declared_length: usize,
}

impl Header {
    /// Read and validate the header against the buffer it came from.
    ///
    /// With `strict_length` the declared length must match the buffer
    /// exactly; otherwise the buffer only has to contain every track.
    pub fn read_from(data: &[u8], strict_length: bool) -> Result<Self> {
        if data.len() < PPM_MAGIC.len() || &data[..PPM_MAGIC.len()] != PPM_MAGIC {
            return Err(PpmError::invalid(format!(
                "magic is {:?} instead of \"PARA\"",
                &data[..data.len().min(PPM_MAGIC.len())]
            )));
        }

        let mut r = ByteCursor::at(data, PPM_MAGIC.len())?;
        let animation_size = r.read_u32()?;
        let sound_size = r.read_u32()?;
        let frame_count = r.read_u16()? as usize + 1;
        let format_version = r.read_u16()?;
        let locked = r.read_u16()? & 0x01 != 0;
        let thumbnail_frame = r.read_u16()? as usize;

        r.seek(ANIMATION_OFFSET)?;
        let frame_table_size = r.read_u16()? as usize;
        r.skip(4)?;
        let looped = (r.read_u16()? >> 1) & 0x01 != 0;

        if frame_table_size < frame_count * FRAME_TABLE_ENTRY_SIZE {
            return Err(PpmError::invalid(format!(
                "frame table holds {} bytes but {} frames need {}",
                frame_table_size,
                frame_count,
                frame_count * FRAME_TABLE_ENTRY_SIZE
            )));
        }

        let frame_data_offset = FRAME_TABLE_OFFSET + frame_table_size;
        let frame_data_end = ANIMATION_OFFSET + animation_size as usize;
        if frame_data_offset > frame_data_end {
            return Err(PpmError::invalid(format!(
                "frame table ends at {frame_data_offset:#x}, past the animation region end {frame_data_end:#x}"
            )));
        }
        check_within(data, frame_data_end + frame_count, "SFX flag table")?;

        let sound_header_offset = align4(frame_data_end + frame_count);
        check_within(data, sound_header_offset + SOUND_HEADER_SIZE, "sound header")?;

        let mut r = ByteCursor::at(data, sound_header_offset)?;
        let mut track_sizes = [0u32; 4];
        for size in &mut track_sizes {
            *size = r.read_u32()?;
        }
        let speed_byte = r.read_u8()?;
        let frame_speed = FrameSpeed::from_stored(speed_byte)
            .ok_or_else(|| PpmError::invalid(format!("invalid frame speed byte {speed_byte}")))?;
        let bgm_byte = r.read_u8()?;
        let bgm_speed = FrameSpeed::from_stored(bgm_byte)
            .ok_or_else(|| PpmError::invalid(format!("invalid BGM speed byte {bgm_byte}")))?;

        let tracks_total: usize = track_sizes.iter().map(|&s| s as usize).sum();
        if tracks_total > sound_size as usize {
            return Err(PpmError::invalid(format!(
                "track sizes total {tracks_total} bytes but sound region is {sound_size}"
            )));
        }

        let audio_offset = sound_header_offset + SOUND_HEADER_SIZE;
        check_within(data, audio_offset + tracks_total, "audio tracks")?;

        let declared_length = audio_offset + sound_size as usize + SIGNATURE_SIZE;
        if strict_length && declared_length != data.len() {
            return Err(PpmError::invalid(format!(
                "declared length {declared_length} does not match buffer length {}",
                data.len()
            )));
        }

        log::debug!(
            "PPM header: {frame_count} frames, frame data {frame_data_offset:#x}..{frame_data_end:#x}, audio at {audio_offset:#x}, tracks {track_sizes:?}"
        );

        Ok(Self {
            animation_size,
            sound_size,
            frame_count,
            format_version,
            locked,
            looped,
            thumbnail_frame,
            frame_table_size,
            frame_data_offset,
            frame_data_end,
            sound_header_offset,
            track_sizes,
            frame_speed,
            bgm_speed,
            audio_offset,
            declared_length,
        })
    }

    /// Absolute offset of the per-frame SFX flag table.
    #[inline]
    pub fn sfx_flags_offset(&self) -> usize {
        self.frame_data_end
    }

    /// Byte range of one audio track.
    pub fn track_range(&self, kind: TrackKind) -> Range<usize> {
        let idx = kind.index();
        let start = self.audio_offset
            + self.track_sizes[..idx]
                .iter()
                .map(|&s| s as usize)
                .sum::<usize>();
        start..start + self.track_sizes[idx] as usize
    }

    /// Read the frame offset table, resolving each entry's size and flags.
    ///
    /// Fails before any frame is decoded if an entry points outside the
    /// frame data region.
    pub fn read_frame_table(&self, data: &[u8]) -> Result<Vec<FrameOffsetEntry>> {
        let mut r = ByteCursor::at(data, FRAME_TABLE_OFFSET)?;
        let mut offsets = Vec::with_capacity(self.frame_count);
        for index in 0..self.frame_count {
            let offset = self.frame_data_offset + r.read_u32()? as usize;
            if offset >= self.frame_data_end {
                return Err(PpmError::invalid(format!(
                    "frame {index} starts at {offset:#x}, outside the frame data region ending at {:#x}",
                    self.frame_data_end
                )));
            }
            offsets.push(offset);
        }

        let mut sorted = offsets.clone();
        sorted.sort_unstable();
        sorted.dedup();

        let sfx_flags = &data[self.sfx_flags_offset()..self.sfx_flags_offset() + self.frame_count];

        Ok(offsets
            .iter()
            .zip(sfx_flags)
            .enumerate()
            .map(|(index, (&offset, &sfx))| {
                let next = sorted.partition_point(|&o| o <= offset);
                let end = sorted.get(next).copied().unwrap_or(self.frame_data_end);
                FrameOffsetEntry {
                    index,
                    offset,
                    size: end - offset,
                    flags: FrameFlags::from_parts(data[offset], sfx),
                }
            })
            .collect())
    }
}

fn check_within(data: &[u8], end: usize, what: &str) -> Result<()> {
    if end > data.len() {
        return Err(PpmError::invalid(format!(
            "{what} ends at {end:#x}, past the end of the {} byte buffer",
            data.len()
        )));
    }
    Ok(())
}

#[inline]
fn align4(v: usize) -> usize {
    (v + 3) & !3
}
