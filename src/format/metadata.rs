//! Metadata block reader (0x14..0xA0).

use super::cursor::ByteCursor;
use super::header::{Header, METADATA_OFFSET};
use crate::error::Result;
use crate::schema::{AuthorId, FileFragment, FileName, Metadata, Timestamp};

/// UTF-16 code units per author name field.
const NAME_UNITS: usize = 11;

/// Read the metadata block; flags and counts come from the already parsed header.
pub fn read_metadata(data: &[u8], header: &Header) -> Result<Metadata> {
    let mut r = ByteCursor::at(data, METADATA_OFFSET)?;

    let root_author_name = read_name(&mut r)?;
    let parent_author_name = read_name(&mut r)?;
    let current_author_name = read_name(&mut r)?;
    let parent_author_id = AuthorId(r.read_array()?);
    let current_author_id = AuthorId(r.read_array()?);
    let parent_filename = FileName::from_bytes(&r.read_array()?);
    let current_filename = FileName::from_bytes(&r.read_array()?);
    let root_author_id = AuthorId(r.read_array()?);
    let root_file_fragment = FileFragment(r.read_array()?);
    let timestamp = Timestamp(r.read_u32()?);

    Ok(Metadata {
        locked: header.locked,
        looped: header.looped,
        frame_count: header.frame_count,
        thumbnail_frame: header.thumbnail_frame,
        root_author_name,
        parent_author_name,
        current_author_name,
        root_author_id,
        parent_author_id,
        current_author_id,
        parent_filename,
        current_filename,
        root_file_fragment,
        timestamp,
    })
}

/// Zero-padded UTF-16LE name.
fn read_name(r: &mut ByteCursor<'_>) -> Result<String> {
    let raw = r.read_bytes(NAME_UNITS * 2)?;
    let units = raw
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .take_while(|&u| u != 0);
    Ok(char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect())
}
