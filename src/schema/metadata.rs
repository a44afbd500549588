//! Decoded PPM metadata record.

use std::fmt;

use serde::{Serialize, Serializer};

/// Seconds between the Unix epoch and 2000-01-01T00:00:00Z.
pub const PPM_EPOCH_OFFSET: i64 = 946_684_800;

/// Author identifier, an opaque 8-byte value.
///
/// Displayed as upper-case hex with the stored bytes reversed, which is how
/// the handheld shows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AuthorId(pub [u8; 8]);

impl fmt::Display for AuthorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().rev().try_for_each(|b| write!(f, "{b:02X}"))
    }
}

impl Serialize for AuthorId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Opaque 8-byte fragment of the root file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FileFragment(pub [u8; 8]);

impl fmt::Display for FileFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|b| write!(f, "{b:02X}"))
    }
}

impl Serialize for FileFragment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Packed 18-byte file name: 3-byte prefix, 13 ASCII characters, edit counter.
///
/// Rendered as `PPPPPP_BBBBBBBBBBBBB_NNN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileName {
    pub prefix: [u8; 3],
    pub body: [u8; 13],
    pub edit_count: u16,
}

impl FileName {
    pub const SIZE: usize = 18;

    pub fn from_bytes(b: &[u8; Self::SIZE]) -> Self {
        let mut prefix = [0u8; 3];
        prefix.copy_from_slice(&b[..3]);
        let mut body = [0u8; 13];
        body.copy_from_slice(&b[3..16]);
        Self {
            prefix,
            body,
            edit_count: u16::from_le_bytes([b[16], b[17]]),
        }
    }
}

impl fmt::Display for FileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.prefix.iter().try_for_each(|b| write!(f, "{b:02X}"))?;
        f.write_str("_")?;
        for &b in &self.body {
            let c = if b.is_ascii_graphic() { b as char } else { '?' };
            write!(f, "{c}")?;
        }
        write!(f, "_{:03}", self.edit_count)
    }
}

impl Serialize for FileName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Last-edit time, stored as seconds since 2000-01-01 UTC.
///
/// Serialized as Unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(pub u32);

impl Timestamp {
    pub fn unix_seconds(self) -> i64 {
        PPM_EPOCH_OFFSET + self.0 as i64
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.unix_seconds())
    }
}

/// Everything the header says about a flipnote besides its media.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub locked: bool,
    pub looped: bool,
    pub frame_count: usize,
    /// 0-based index of the thumbnail frame.
    pub thumbnail_frame: usize,
    pub root_author_name: String,
    pub parent_author_name: String,
    pub current_author_name: String,
    pub root_author_id: AuthorId,
    pub parent_author_id: AuthorId,
    pub current_author_id: AuthorId,
    pub parent_filename: FileName,
    pub current_filename: FileName,
    pub root_file_fragment: FileFragment,
    pub timestamp: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_id_reversed_hex() {
        let id = AuthorId([0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0xAB]);
        assert_eq!(id.to_string(), "AB07060504030201");
    }

    #[test]
    fn test_filename_display() {
        let mut raw = [0u8; FileName::SIZE];
        raw[..3].copy_from_slice(&[0xF7, 0x8D, 0xA8]);
        raw[3..16].copy_from_slice(b"14768882B56B8");
        raw[16..].copy_from_slice(&30u16.to_le_bytes());

        let name = FileName::from_bytes(&raw);
        assert_eq!(name.to_string(), "F78DA8_14768882B56B8_030");
    }

    #[test]
    fn test_timestamp_serializes_as_unix() {
        let ts = Timestamp(86_400);
        assert_eq!(ts.unix_seconds(), 946_771_200);
        assert_eq!(serde_json::to_string(&ts).unwrap(), "946771200");
    }
}
