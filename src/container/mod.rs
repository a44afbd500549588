//! The decoded view of a whole PPM container.
//!
//! [`PpmContainer`] owns the raw bytes and the parsed header, metadata and
//! frame table. Frames are decoded per dependency chain: each keyframe
//! starts a chain that can be decoded independently of the others, which
//! is what [`PpmContainer::decode_frames`] spreads across the rayon pool.

mod chain;
mod ppm;

pub use chain::{FrameIterator, chain_start, plan_chains};
pub use ppm::{DecodedAudio, DecodedFlipnote, DecodedFrames, PpmContainer};
