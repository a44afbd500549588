//! Container entry point tying header, frames, audio and SFX together.

use std::path::Path;

#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

use super::chain::{FrameIterator, chain_start, decode_chains};
use crate::decode::{AudioTrack, Raster, SfxSchedule, Thumbnail, TrackKind};
use crate::error::{PpmError, Result};
use crate::format::{
    FrameOffsetEntry, FrameSpeed, Header, THUMBNAIL_OFFSET, THUMBNAIL_SIZE, read_metadata,
};
use crate::schema::{DecodeOptions, Metadata};

/// A parsed Flipnote PPM file.
///
/// Construction reads and validates the header, metadata and frame offset
/// table; frames and tracks are decoded on demand.
///
/// ```ignore
/// let ppm = PpmContainer::open("note.ppm")?;
/// println!("{} frames at {} fps", ppm.frame_count(), ppm.fps());
///
/// for frame in ppm.frames() {
///     let raster = frame?;
///     // hand raster.rgba() to an image encoder
/// }
/// ```
#[derive(Debug, Clone)]
pub struct PpmContainer {
    data: Vec<u8>,
    options: DecodeOptions,
    header: Header,
    metadata: Metadata,
    entries: Vec<FrameOffsetEntry>,
}

impl PpmContainer {
    /// Parse an in-memory container with default options.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::with_options(data, DecodeOptions::default())
    }

    /// Parse an in-memory container.
    pub fn with_options(data: Vec<u8>, options: DecodeOptions) -> Result<Self> {
        options.validate()?;

        let header = Header::read_from(&data, options.strict_length)?;
        let entries = header.read_frame_table(&data)?;
        let metadata = read_metadata(&data, &header)?;

        log::debug!(
            "Opened PPM by {:?}: {} frames at {} fps",
            metadata.current_author_name,
            header.frame_count,
            header.frame_speed.fps()
        );

        Ok(Self {
            data,
            options,
            header,
            metadata,
            entries,
        })
    }

    /// Read a whole file and parse it with default options.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, DecodeOptions::default())
    }

    pub fn open_with_options<P: AsRef<Path>>(path: P, options: DecodeOptions) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::with_options(data, options)
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Raw container bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn frame_count(&self) -> usize {
        self.entries.len()
    }

    pub fn frame_entries(&self) -> &[FrameOffsetEntry] {
        &self.entries
    }

    pub fn frame_speed(&self) -> FrameSpeed {
        self.header.frame_speed
    }

    /// Frame speed the BGM was recorded at.
    pub fn bgm_speed(&self) -> FrameSpeed {
        self.header.bgm_speed
    }

    /// Playback rate in frames per second.
    pub fn fps(&self) -> f32 {
        self.header.frame_speed.fps()
    }

    /// Length of one pass through the animation, in seconds.
    pub fn duration(&self) -> f64 {
        self.frame_count() as f64 / self.fps() as f64
    }

    /// Decode a single frame, replaying its chain from the nearest keyframe.
    pub fn decode_frame(&self, index: usize) -> Result<Raster> {
        if index >= self.frame_count() {
            return Err(PpmError::FrameOutOfRange {
                index,
                count: self.frame_count(),
            });
        }

        let start = chain_start(&self.entries, index);
        let mut last = None;
        let chain = FrameIterator::new(&self.data, &self.entries, start..index + 1);
        for (i, result) in (start..=index).zip(chain) {
            match result {
                Ok(raster) => last = Some(raster),
                Err(e) if i == index => return Err(e),
                Err(_) => {
                    return Err(PpmError::PoisonedFrame {
                        frame: index,
                        failed: i,
                    });
                }
            }
        }
        last.ok_or(PpmError::FrameOutOfRange {
            index,
            count: self.frame_count(),
        })
    }

    /// Lazy in-order iterator over every frame.
    pub fn frames(&self) -> FrameIterator<'_> {
        FrameIterator::new(&self.data, &self.entries, 0..self.frame_count())
    }

    /// Decode every frame. Failed and poisoned frames are kept as errors at
    /// their index; other chains are unaffected.
    pub fn decode_frames(&self) -> DecodedFrames {
        DecodedFrames {
            results: decode_chains(&self.data, &self.entries, self.options.parallel),
        }
    }

    /// Sample rate assigned to a track at output time.
    ///
    /// The BGM is retimed from the speed it was recorded at to the playback
    /// speed, then scaled by the configured multiplier.
    pub fn track_sample_rate(&self, kind: TrackKind) -> u32 {
        let base = self.options.sample_rate;
        match kind {
            TrackKind::BackgroundMusic => {
                let ratio =
                    self.header.frame_speed.fps() as f64 / self.header.bgm_speed.fps() as f64;
                let rate = base as f64 * ratio * self.options.bgm_speed_multiplier as f64;
                (rate.round() as u32).max(1)
            }
            _ => base,
        }
    }

    /// Decode one audio track. A track with no data yields an empty track.
    pub fn decode_track(&self, kind: TrackKind) -> Result<AudioTrack> {
        let range = self.header.track_range(kind);
        let bytes = self
            .data
            .get(range.clone())
            .ok_or_else(|| PpmError::CorruptTrack {
                track: kind,
                reason: format!("byte range {range:?} lies outside the buffer"),
            })?;
        let track = AudioTrack::decode(kind, bytes, self.track_sample_rate(kind));
        log::trace!(
            "Decoded {kind}: {} samples at {} Hz",
            track.samples.len(),
            track.sample_rate
        );
        Ok(track)
    }

    /// Decode all four tracks, each with its own decoder state.
    pub fn decode_audio(&self) -> DecodedAudio {
        #[cfg(not(target_arch = "wasm32"))]
        let results: Vec<Result<AudioTrack>> = if self.options.parallel {
            TrackKind::ALL
                .par_iter()
                .map(|&kind| self.decode_track(kind))
                .collect()
        } else {
            TrackKind::ALL.iter().map(|&kind| self.decode_track(kind)).collect()
        };
        #[cfg(target_arch = "wasm32")]
        let results: Vec<Result<AudioTrack>> =
            TrackKind::ALL.iter().map(|&kind| self.decode_track(kind)).collect();

        for (kind, result) in TrackKind::ALL.iter().zip(&results) {
            if let Err(e) = result {
                log::warn!("Skipping {kind}: {e}");
            }
        }
        DecodedAudio { results }
    }

    pub fn sfx_schedule(&self) -> SfxSchedule {
        SfxSchedule::from_entries(&self.entries)
    }

    /// The embedded 64x48 preview bitmap.
    pub fn thumbnail(&self) -> Result<Thumbnail> {
        let bytes = self
            .data
            .get(THUMBNAIL_OFFSET..THUMBNAIL_OFFSET + THUMBNAIL_SIZE)
            .ok_or_else(|| PpmError::invalid("buffer too short for the thumbnail bitmap"))?;
        Thumbnail::decode(bytes)
    }

    /// Full-size raster of the frame the header names as thumbnail.
    pub fn thumbnail_frame(&self) -> Result<Raster> {
        self.decode_frame(self.header.thumbnail_frame)
    }

    /// Decode everything: frames, audio, SFX schedule and thumbnail.
    pub fn decode(&self) -> Result<DecodedFlipnote> {
        Ok(DecodedFlipnote {
            metadata: self.metadata.clone(),
            fps: self.fps(),
            frames: self.decode_frames(),
            audio: self.decode_audio(),
            sfx: self.sfx_schedule(),
            thumbnail: self.thumbnail()?,
        })
    }
}

/// Per-frame decode results in playback order.
#[derive(Debug)]
pub struct DecodedFrames {
    results: Vec<Result<Raster>>,
}

impl DecodedFrames {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Result<Raster>> {
        self.results.get(index)
    }

    /// The decoded raster at `index`, if it decoded.
    pub fn raster(&self, index: usize) -> Option<&Raster> {
        self.results.get(index).and_then(|r| r.as_ref().ok())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Result<Raster>> {
        self.results.iter()
    }

    /// Frames that failed or were poisoned, with their index.
    pub fn failures(&self) -> impl Iterator<Item = (usize, &PpmError)> {
        self.results
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.as_ref().err().map(|e| (i, e)))
    }

    pub fn is_complete(&self) -> bool {
        self.results.iter().all(Result::is_ok)
    }

    /// All rasters, or the first error.
    pub fn into_rasters(self) -> Result<Vec<Raster>> {
        self.results.into_iter().collect()
    }
}

/// Per-track decode results in [`TrackKind::ALL`] order.
#[derive(Debug)]
pub struct DecodedAudio {
    results: Vec<Result<AudioTrack>>,
}

impl DecodedAudio {
    pub fn result(&self, kind: TrackKind) -> &Result<AudioTrack> {
        &self.results[kind.index()]
    }

    /// The decoded track, if it decoded.
    pub fn get(&self, kind: TrackKind) -> Option<&AudioTrack> {
        self.result(kind).as_ref().ok()
    }

    /// Decoded tracks that carry samples.
    pub fn tracks(&self) -> impl Iterator<Item = &AudioTrack> {
        self.results
            .iter()
            .filter_map(|r| r.as_ref().ok())
            .filter(|t| !t.is_empty())
    }

    pub fn failures(&self) -> impl Iterator<Item = (TrackKind, &PpmError)> {
        TrackKind::ALL
            .into_iter()
            .zip(&self.results)
            .filter_map(|(kind, r)| r.as_ref().err().map(|e| (kind, e)))
    }
}

/// Everything decoded from one container.
#[derive(Debug)]
pub struct DecodedFlipnote {
    pub metadata: Metadata,
    pub fps: f32,
    pub frames: DecodedFrames,
    pub audio: DecodedAudio,
    pub sfx: SfxSchedule,
    pub thumbnail: Thumbnail,
}
