//! Test utilities and fixtures for tagdex tests.
//!
//! This module provides synthetic tag byte-builders (the test-side inverse
//! of the decoder), a temporary store helper, and mock factories to reduce
//! boilerplate in tests.
//!
//! # Example
//!
//! ```ignore
//! use tagdex::test_utils::{tag_bytes, text_frame_bytes};
//!
//! let bytes = tag_bytes(&[text_frame_bytes(b"TIT2", "Title")]);
//! let tag = tagdex::id3::read_tag(&bytes[..]).unwrap();
//! ```

use std::path::{Path, PathBuf};

use sqlx::sqlite::SqlitePool;
use tempfile::TempDir;

use crate::model::TrackInfo;

/// Encodes `n` (low 28 bits) as a 4-byte synchsafe integer.
pub fn synchsafe_bytes(n: u32) -> [u8; 4] {
    [
        ((n >> 21) & 0x7F) as u8,
        ((n >> 14) & 0x7F) as u8,
        ((n >> 7) & 0x7F) as u8,
        (n & 0x7F) as u8,
    ]
}

/// Assembles a complete v2.3 tag with empty flags: 10-byte header plus the
/// given chunks, declared size covering the chunks.
pub fn tag_bytes(chunks: &[Vec<u8>]) -> Vec<u8> {
    tag_bytes_with(0x00, chunks, 0)
}

/// Assembles a tag with an explicit flag byte and `padding` zero bytes
/// counted inside the declared size.
pub fn tag_bytes_with(flags: u8, chunks: &[Vec<u8>], padding: usize) -> Vec<u8> {
    let body: Vec<u8> = chunks.concat();
    let declared = body.len() + padding;

    let mut bytes = Vec::with_capacity(10 + declared);
    bytes.extend_from_slice(b"ID3");
    bytes.push(3); // major version
    bytes.push(0); // revision
    bytes.push(flags);
    bytes.extend_from_slice(&synchsafe_bytes(declared as u32));
    bytes.extend_from_slice(&body);
    bytes.resize(bytes.len() + padding, 0);
    bytes
}

/// One frame: 10-byte header plus content.
pub fn frame_bytes(id: &[u8; 4], content: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(10 + content.len());
    bytes.extend_from_slice(id);
    bytes.extend_from_slice(&(content.len() as u32).to_be_bytes());
    bytes.extend_from_slice(&[0, 0]); // flags
    bytes.extend_from_slice(content);
    bytes
}

/// A Latin-1 text frame: encoding byte 0 plus the text bytes.
pub fn text_frame_bytes(id: &[u8; 4], text: &str) -> Vec<u8> {
    let mut content = vec![0u8];
    content.extend_from_slice(text.as_bytes());
    frame_bytes(id, &content)
}

/// The zero-size frame header that terminates the frame sequence.
pub fn sentinel_frame_bytes() -> Vec<u8> {
    frame_bytes(&[0u8; 4], &[])
}

/// Writes a synthetic tagged MP3 into `dir` and returns its path.
pub fn write_mp3(dir: &Path, name: &str, frames: &[Vec<u8>]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, tag_bytes(frames)).expect("write test mp3");
    path
}

/// Builds a [`TrackInfo`] by round-tripping synthetic frames through the
/// real decoder.
pub fn mock_track(path: &str, artist: &str, album: &str, title: &str, number: u32) -> TrackInfo {
    let bytes = tag_bytes(&[
        text_frame_bytes(b"TPE1", artist),
        text_frame_bytes(b"TALB", album),
        text_frame_bytes(b"TIT2", title),
        text_frame_bytes(b"TRCK", &number.to_string()),
    ]);
    let tag = crate::id3::read_tag(&bytes[..]).expect("decode mock tag");
    TrackInfo::new(path, tag)
}

/// Creates a temporary store for testing.
///
/// Keep the TempDir alive for the duration of your test; the database is
/// deleted when it drops.
pub async fn temp_store() -> (SqlitePool, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = dir.path().join("test.db");

    let pool = crate::store::open(&crate::store::db_url(&db_path))
        .await
        .expect("Failed to initialize test store");

    (pool, dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synchsafe_bytes_layout() {
        assert_eq!(synchsafe_bytes(257), [0x00, 0x00, 0x02, 0x01]);
        assert_eq!(synchsafe_bytes(0), [0x00; 4]);
    }

    #[test]
    fn test_tag_bytes_declares_body_size() {
        let bytes = tag_bytes(&[text_frame_bytes(b"TIT2", "abc")]);
        assert_eq!(&bytes[..3], b"ID3");
        // 10-byte frame header + encoding byte + 3 text bytes
        assert_eq!(&bytes[6..10], &synchsafe_bytes(14));
        assert_eq!(bytes.len(), 24);
    }

    #[test]
    fn test_mock_track_round_trips_fields() {
        let info = mock_track("/m/a.mp3", "Artist", "Album", "Title", 7);
        assert_eq!(info.album_performer(), "Artist");
        assert_eq!(info.album_title(), "Album");
        assert_eq!(info.track_title(), "Title");
        assert_eq!(info.track_number(), 7);
        assert_eq!(info.path, PathBuf::from("/m/a.mp3"));
    }

    #[tokio::test]
    async fn test_temp_store_is_usable() {
        let (pool, _dir) = temp_store().await;
        crate::store::put(&pool, "k", "v").await.unwrap();
        assert_eq!(crate::store::get(&pool, "k").await.unwrap(), "v");
    }
}
