//! Tag header, extended header, and the top-level decode loop.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use bitflags::bitflags;

use super::TagError;
use super::cursor::{ByteCursor, decode_synchsafe};
use super::frame::{self, Frame};

/// The three-byte magic at the start of every tag.
pub const TAG_MAGIC: [u8; 3] = *b"ID3";

/// Size of the fixed main header.
pub const TAG_HEADER_LEN: u64 = 10;

bitflags! {
    /// Flag byte of the main tag header. Unknown bits are retained.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TagFlags: u8 {
        const UNSYNCHRONISATION = 0x80;
        /// Bit 6: an extended header follows the main header.
        const EXTENDED_HEADER = 0x40;
        const EXPERIMENTAL = 0x20;
    }
}

/// Fixed 10-byte header opening the tag.
///
/// The magic identifier is validated during decode and not retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagHeader {
    pub major_version: u8,
    pub revision: u8,
    pub flags: TagFlags,
    /// Declared size of the tag *after* this header, synchsafe-decoded.
    pub size: u32,
    pub extended: Option<ExtendedHeader>,
}

/// Optional block following the main header when
/// [`TagFlags::EXTENDED_HEADER`] is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtendedHeader {
    /// Declared length of the block after its own length field: 6 or 10.
    pub size: u32,
    pub flags: u16,
    pub padding_size: u32,
}

/// A complete decoded tag: header plus frames in source order.
///
/// Duplicate identifiers are preserved as-is; choosing "the" value for an
/// identifier is a consumer policy (see [`crate::model::TrackInfo`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub header: TagHeader,
    pub frames: Vec<Frame>,
}

/// Decodes a complete tag from a source positioned at the first magic byte.
///
/// Any truncation or structural problem in the header, extended header, or a
/// frame header aborts the decode; no partial [`Tag`] is returned.
pub fn read_tag<R: Read>(source: R) -> Result<Tag, TagError> {
    let mut cursor = ByteCursor::new(source);

    let raw: [u8; 10] = cursor.read_array("tag header")?;
    if raw[..3] != TAG_MAGIC {
        return Err(TagError::structural(
            "tag header",
            format!(
                "missing ID3 magic (found {:?})",
                String::from_utf8_lossy(&raw[..3])
            ),
        ));
    }
    let flags = TagFlags::from_bits_retain(raw[5]);
    let size = decode_synchsafe([raw[6], raw[7], raw[8], raw[9]]);

    let extended = if flags.contains(TagFlags::EXTENDED_HEADER) {
        Some(read_extended_header(&mut cursor)?)
    } else {
        None
    };

    let header = TagHeader {
        major_version: raw[3],
        revision: raw[4],
        flags,
        size,
        extended,
    };

    // The declared size excludes the 10-byte header itself; extended-header
    // bytes count against it, which the cursor position already reflects.
    let tag_end = TAG_HEADER_LEN + u64::from(size);

    let mut frames = Vec::new();
    while cursor.position() < tag_end {
        let remaining = tag_end - cursor.position();
        let frame = frame::read_frame(&mut cursor, remaining).map_err(|e| {
            TagError::Frame {
                index: frames.len(),
                source: Box::new(e),
            }
        })?;
        let last = frame.is_last();
        frames.push(frame);
        if last {
            // Whatever remains before tag_end is padding, not frames.
            break;
        }
    }

    Ok(Tag { header, frames })
}

/// Opens `path` and decodes the tag at the start of the file.
pub fn read_path(path: &Path) -> Result<Tag, TagError> {
    let file = File::open(path).map_err(|e| TagError::Io {
        section: "opening file",
        source: e,
    })?;
    read_tag(BufReader::new(file))
}

/// Reads the extended header block: a 4-byte length that must be 6 or 10,
/// then that many bytes holding a 2-byte flags field and a 4-byte pad size.
/// Declared bytes beyond those six are reserved; they are consumed to keep
/// the cursor aligned and otherwise ignored.
fn read_extended_header<R: Read>(cursor: &mut ByteCursor<R>) -> Result<ExtendedHeader, TagError> {
    let size = cursor.read_be_u32("extended header length")?;
    if size != 6 && size != 10 {
        return Err(TagError::structural(
            "extended header",
            format!("declared length {size} (must be 6 or 10)"),
        ));
    }

    let body = cursor.read_vec(size as usize, "extended header")?;
    Ok(ExtendedHeader {
        size,
        flags: u16::from_be_bytes([body[0], body[1]]),
        padding_size: u32::from_be_bytes([body[2], body[3], body[4], body[5]]),
    })
}
