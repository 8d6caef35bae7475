//! ID3v2 tag container decoding.
//!
//! Decodes the binary metadata block at the front of an MP3 file: a fixed
//! 10-byte header carrying a synchsafe size, an optional extended header,
//! and a sequence of variable-length frames whose content layout depends on
//! the frame identifier. Decoding is a single forward pass over a
//! [`ByteCursor`]; nothing reads ahead or rewinds.
//!
//! The decoder keeps no state between calls and never mutates its input, so
//! independent decodes can run in parallel (the library pipeline does
//! exactly that). A structural problem in the header or a frame header
//! aborts the whole decode; malformed content *inside* a recognized frame
//! degrades to partially-empty fields instead.

mod content;
mod cursor;
mod frame;
mod tag;

pub use content::{Comment, EncapsulatedObject, FrameContent, Private, TextEncoding};
pub use cursor::{ByteCursor, decode_synchsafe};
pub use frame::{FRAME_HEADER_LEN, Frame, FrameHeader, FrameId};
pub use tag::{
    ExtendedHeader, TAG_HEADER_LEN, TAG_MAGIC, Tag, TagFlags, TagHeader, read_path, read_tag,
};

/// Errors surfaced while decoding a tag.
///
/// `Truncated` and `Structural` are definitive for the input; callers may
/// retry only by supplying a fresh byte source.
#[derive(Debug, thiserror::Error)]
pub enum TagError {
    /// The source ran out of bytes partway through a structure.
    #[error("unexpected end of input while reading {section}")]
    Truncated {
        /// The structure being read when the source ran dry.
        section: &'static str,
    },

    /// A declared field value is outside its allowed domain.
    #[error("{section}: {message}")]
    Structural {
        section: &'static str,
        message: String,
    },

    /// Failure while decoding a specific frame, counted from 0.
    #[error("frame {index}: {source}")]
    Frame {
        index: usize,
        #[source]
        source: Box<TagError>,
    },

    /// The byte source failed with a non-EOF I/O error.
    #[error("I/O error while reading {section}: {source}")]
    Io {
        section: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl TagError {
    pub(crate) fn structural(section: &'static str, message: impl Into<String>) -> Self {
        Self::Structural {
            section,
            message: message.into(),
        }
    }
}
