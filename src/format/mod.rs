//! Container layout of Flipnote Studio `.ppm` files.
//!
//! # File Format
//!
//! ```text
//! Header (0x000..0x6A0):
//!   Magic: "PARA" (4 bytes)
//!   Animation data size: u32
//!   Sound data size: u32
//!   Frame count - 1: u16
//!   Format version: u16
//!   Lock flag: u16
//!   Thumbnail frame index: u16
//!   Metadata: names, ids, filenames, timestamp (0x14..0xA0)
//!   Thumbnail: 64x48 4bpp tiled bitmap (0xA0..0x6A0)
//!
//! Animation region (0x6A0, animation data size bytes):
//!   Frame table size: u16
//!   Unknown: u32
//!   Animation flags: u16 (bit 1 = loop)
//!   Frame offset table: frame_count * u32
//!   Frame data (variable)
//!
//! Sound region:
//!   SFX flags: frame_count bytes, padded to 4
//!   Sound header: 4 * u32 track sizes, frame speed, BGM speed, 14 bytes padding
//!   Track data: BGM, SFX1, SFX2, SFX3 (4-bit ADPCM)
//!
//! Signature: 0x80 bytes + 0x10 bytes padding
//! ```

mod cursor;
mod header;
mod metadata;

pub use cursor::ByteCursor;
pub use header::*;
pub use metadata::read_metadata;
