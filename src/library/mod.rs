//! Batch decode pipeline and catalog aggregation.
//!
//! Decodes share no state, so the pipeline simply runs up to `concurrency`
//! of them at once; one corrupt file fails its own event, never the batch.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use futures::{Stream, StreamExt};
use tracing::{debug, warn};

use crate::model::TrackInfo;
use crate::scanner;
use crate::store::{TrackDetails, TrackEntry};

/// Per-file outcome of a library scan.
#[derive(Debug)]
pub enum ScanEvent {
    Loaded(TrackInfo),
    Failed(PathBuf, String),
}

/// Walks `root` and decodes every MP3 found, with at most `concurrency`
/// decodes in flight. Returns a stream of per-file events.
pub fn scan(root: PathBuf, concurrency: usize) -> impl Stream<Item = ScanEvent> {
    scanner::scan(root)
        .map(|path| async move {
            // The decoder is synchronous file I/O; keep it off the async workers.
            let decode_path = path.clone();
            match tokio::task::spawn_blocking(move || TrackInfo::load(&decode_path)).await {
                Ok(Ok(info)) => {
                    debug!(path = %path.display(), title = info.track_title(), "decoded tag");
                    ScanEvent::Loaded(info)
                }
                Ok(Err(e)) => {
                    warn!(path = %path.display(), error = %e, "failed to decode tag");
                    ScanEvent::Failed(path, e.to_string())
                }
                Err(e) => ScanEvent::Failed(path, format!("decode task failed: {e}")),
            }
        })
        .buffer_unordered(concurrency.max(1))
}

/// Aggregated catalog derived from a set of loaded tracks.
///
/// Ordered maps keep the derived store content deterministic regardless of
/// the order files finished decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    /// Album performers, sorted.
    pub artists: BTreeSet<String>,
    /// Artist → sorted album titles.
    pub albums: BTreeMap<String, BTreeSet<String>>,
    /// (artist, album) → track entries, in load order.
    pub tracks: BTreeMap<(String, String), Vec<TrackEntry>>,
    /// (artist, album, track title) → details.
    pub details: BTreeMap<(String, String, String), TrackDetails>,
}

impl Catalog {
    /// Builds a catalog from loaded tracks.
    pub fn from_tracks<'a>(tracks: impl IntoIterator<Item = &'a TrackInfo>) -> Self {
        let mut catalog = Self::default();
        for info in tracks {
            catalog.add(info);
        }
        catalog
    }

    /// Folds one loaded track into the catalog.
    pub fn add(&mut self, info: &TrackInfo) {
        let artist = info.album_performer().to_owned();
        let album = info.album_title().to_owned();
        let title = info.track_title().to_owned();

        self.artists.insert(artist.clone());
        self.albums
            .entry(artist.clone())
            .or_default()
            .insert(album.clone());
        self.tracks
            .entry((artist.clone(), album.clone()))
            .or_default()
            .push(TrackEntry {
                title: title.clone(),
                number: info.track_number(),
            });
        self.details.insert(
            (artist, album, title),
            TrackDetails {
                path: info.path.to_string_lossy().into_owned(),
            },
        );
    }

    /// Number of distinct (artist, album, title) entries.
    pub fn track_count(&self) -> usize {
        self.details.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{mock_track, tag_bytes, text_frame_bytes, write_mp3};

    #[test]
    fn catalog_groups_tracks_by_artist_and_album() {
        let tracks = vec![
            mock_track("/m/1.mp3", "Adrian Belew", "Lone Rhino", "Big Electric Cat", 1),
            mock_track("/m/2.mp3", "Adrian Belew", "Lone Rhino", "The Momur", 2),
            mock_track("/m/3.mp3", "Bananarama", "Deep Sea Skiving", "Shy Boy", 1),
        ];
        let catalog = Catalog::from_tracks(&tracks);

        assert_eq!(
            catalog.artists.iter().collect::<Vec<_>>(),
            ["Adrian Belew", "Bananarama"]
        );
        assert_eq!(
            catalog.albums["Adrian Belew"].iter().collect::<Vec<_>>(),
            ["Lone Rhino"]
        );

        let entries = &catalog.tracks[&("Adrian Belew".to_owned(), "Lone Rhino".to_owned())];
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Big Electric Cat");
        assert_eq!(entries[0].number, 1);

        let details = &catalog.details[&(
            "Bananarama".to_owned(),
            "Deep Sea Skiving".to_owned(),
            "Shy Boy".to_owned(),
        )];
        assert_eq!(details.path, "/m/3.mp3");
        assert_eq!(catalog.track_count(), 3);
    }

    #[test]
    fn untagged_fields_group_under_placeholders() {
        let tracks = vec![mock_track("/m/x.mp3", "N/A", "N/A", "N/A", 0)];
        let catalog = Catalog::from_tracks(&tracks);
        assert!(catalog.artists.contains("N/A"));
    }

    #[tokio::test]
    async fn scan_emits_loaded_and_failed_events() {
        let dir = tempfile::tempdir().unwrap();
        write_mp3(
            dir.path(),
            "good.mp3",
            &[
                text_frame_bytes(b"TIT2", "Good Track"),
                text_frame_bytes(b"TPE1", "Someone"),
            ],
        );
        // Not a tag at all: decoding must fail without sinking the batch.
        std::fs::write(dir.path().join("bad.mp3"), b"not a tag").unwrap();

        let events: Vec<ScanEvent> = scan(dir.path().to_path_buf(), 4).collect().await;
        assert_eq!(events.len(), 2);

        let loaded: Vec<&TrackInfo> = events
            .iter()
            .filter_map(|e| match e {
                ScanEvent::Loaded(info) => Some(info),
                ScanEvent::Failed(..) => None,
            })
            .collect();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].track_title(), "Good Track");

        assert!(events.iter().any(|e| matches!(e, ScanEvent::Failed(p, _)
            if p.file_name().is_some_and(|n| n == "bad.mp3"))));
    }

    #[tokio::test]
    async fn scan_decodes_every_file_with_small_concurrency() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..20 {
            let bytes = tag_bytes(&[text_frame_bytes(b"TIT2", &format!("Track {i}"))]);
            std::fs::write(dir.path().join(format!("{i}.mp3")), bytes).unwrap();
        }

        let events: Vec<ScanEvent> = scan(dir.path().to_path_buf(), 2).collect().await;
        assert_eq!(events.len(), 20);
        assert!(events.iter().all(|e| matches!(e, ScanEvent::Loaded(_))));
    }
}
