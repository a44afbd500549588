//! Decode module - Frame, palette, audio and SFX decoding for PPM containers.

mod audio;
mod frame;
mod layer;
mod palette;
mod sfx;
mod thumbnail;

pub use audio::*;
pub use frame::*;
pub use layer::*;
pub use palette::*;
pub use sfx::*;
pub use thumbnail::*;
