use std::path::{Path, PathBuf};

use futures::stream::Stream;
use tokio::sync::mpsc;
use walkdir::WalkDir;

/// Recursively walks `root` and yields every `.mp3` file (case-insensitive).
///
/// The filesystem traversal runs on a blocking task; results arrive as an
/// async Stream of PathBufs, so the decode pipeline can start before the
/// walk finishes.
pub fn scan(root: PathBuf) -> impl Stream<Item = PathBuf> {
    let (tx, rx) = mpsc::channel(100);

    tokio::task::spawn_blocking(move || {
        for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
            if entry.file_type().is_file() && is_mp3(entry.path()) {
                // A dropped receiver means the consumer gave up; stop walking.
                if tx.blocking_send(entry.into_path()).is_err() {
                    break;
                }
            }
        }
    });

    futures::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|path| (path, rx))
    })
}

fn is_mp3(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("mp3"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::fs::File;
    use tempfile::tempdir;

    #[tokio::test]
    async fn scan_finds_only_mp3_files() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        File::create(root.join("song.mp3")).unwrap();
        File::create(root.join("LOUD.MP3")).unwrap(); // case-insensitive
        File::create(root.join("music.flac")).unwrap(); // ignored
        File::create(root.join("notes.txt")).unwrap(); // ignored

        let subdir = root.join("album");
        std::fs::create_dir(&subdir).unwrap();
        File::create(subdir.join("track.mp3")).unwrap();
        File::create(subdir.join("cover.png")).unwrap(); // ignored

        let paths: Vec<PathBuf> = scan(root.to_path_buf()).collect().await;
        assert_eq!(paths.len(), 3);

        let names: Vec<String> = paths
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(String::from))
            .collect();
        assert!(names.contains(&"song.mp3".to_string()));
        assert!(names.contains(&"LOUD.MP3".to_string()));
        assert!(names.contains(&"track.mp3".to_string()));
    }

    #[tokio::test]
    async fn scan_of_empty_directory_yields_nothing() {
        let dir = tempdir().unwrap();
        let paths: Vec<PathBuf> = scan(dir.path().to_path_buf()).collect().await;
        assert!(paths.is_empty());
    }
}
