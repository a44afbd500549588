//! Flipnote PPM - decoder for Flipnote Studio animation containers.
//!
//! A `.ppm` file bundles a two-layer 1-bit animation, up to four ADPCM audio
//! tracks (background music plus three sound effects), per-frame effect
//! triggers, a 64x48 thumbnail and author/lineage metadata. This crate turns
//! the raw bytes into palette-indexed rasters, PCM buffers, an SFX schedule
//! and a serializable metadata record.
//!
//! # Architecture
//!
//! - `format`: bounds-checked reading of the header, frame table and metadata
//! - `decode`: frame bitstreams, layer compositing, ADPCM, SFX, thumbnail
//! - `container`: [`PpmContainer`], which orchestrates the above
//! - `schema`: decode options and the metadata record
//!
//! # Example
//!
//! ```rust,no_run
//! use flipnote_ppm::{PpmContainer, TrackKind};
//!
//! let ppm = PpmContainer::open("note.ppm")?;
//! println!("{} frames at {} fps", ppm.frame_count(), ppm.fps());
//!
//! let frames = ppm.decode_frames();
//! for (index, err) in frames.failures() {
//!     eprintln!("frame {index}: {err}");
//! }
//!
//! let bgm = ppm.decode_track(TrackKind::BackgroundMusic)?;
//! println!("BGM: {} samples at {} Hz", bgm.samples.len(), bgm.sample_rate);
//! # Ok::<(), flipnote_ppm::PpmError>(())
//! ```

pub mod container;
pub mod decode;
pub mod error;
pub mod format;
pub mod schema;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use container::{DecodedAudio, DecodedFlipnote, DecodedFrames, PpmContainer};
pub use decode::{AudioTrack, Raster, SfxChannel, SfxEvent, SfxSchedule, Thumbnail, TrackKind};
pub use error::{PpmError, Result};
pub use schema::{DecodeOptions, Metadata};
