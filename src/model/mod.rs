//! Track-level view over a decoded tag.
//!
//! [`TrackInfo`] binds a [`Tag`] to the file it came from and exposes the
//! named fields the indexer cares about, with "field absent ⇒ default"
//! semantics. Frame selection policy lives here, not in the decoder: when an
//! identifier occurs more than once, the last occurrence wins.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::id3::{self, FrameContent, FrameId, Tag};

const TRACK_TITLE: FrameId = FrameId::new(*b"TIT2");
const ALBUM_TITLE: FrameId = FrameId::new(*b"TALB");
const TRACK_PERFORMER: FrameId = FrameId::new(*b"TPE1");
const ALBUM_PERFORMER: FrameId = FrameId::new(*b"TPE2");
const TRACK_NUMBER: FrameId = FrameId::new(*b"TRCK");

/// Placeholder for text fields with no frame in the tag.
pub const UNKNOWN: &str = "N/A";

/// A decoded tag bound to its source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    pub path: PathBuf,
    pub tag: Tag,
}

impl TrackInfo {
    pub fn new(path: impl Into<PathBuf>, tag: Tag) -> Self {
        Self {
            path: path.into(),
            tag,
        }
    }

    /// Decodes the tag from the file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let tag = id3::read_path(path).map_err(|e| Error::tag(path, e))?;
        Ok(Self::new(path, tag))
    }

    /// Track title, or [`UNKNOWN`].
    pub fn track_title(&self) -> &str {
        self.text_frame(TRACK_TITLE).unwrap_or(UNKNOWN)
    }

    /// Album title, or [`UNKNOWN`].
    pub fn album_title(&self) -> &str {
        self.text_frame(ALBUM_TITLE).unwrap_or(UNKNOWN)
    }

    /// Lead performer, or [`UNKNOWN`].
    pub fn track_performer(&self) -> &str {
        self.text_frame(TRACK_PERFORMER).unwrap_or(UNKNOWN)
    }

    /// Album performer, falling back to the track performer when the album
    /// performer frame is absent.
    pub fn album_performer(&self) -> &str {
        self.text_frame(ALBUM_PERFORMER)
            .unwrap_or_else(|| self.track_performer())
    }

    /// Track number: the numeric prefix of the track frame before any
    /// `/total` separator, or 0.
    pub fn track_number(&self) -> u32 {
        self.text_frame(TRACK_NUMBER)
            .and_then(|text| text.split('/').next())
            .and_then(|n| n.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Last text frame with the given identifier, trailing NULs trimmed.
    fn text_frame(&self, id: FrameId) -> Option<&str> {
        self.tag.frames.iter().rev().find_map(|frame| {
            if frame.header.id != id {
                return None;
            }
            match &frame.content {
                Some(FrameContent::Text(text)) => Some(text.trim_end_matches('\0')),
                _ => None,
            }
        })
    }
}
