//! Hierarchical key-value index over SQLite.
//!
//! A single `entries(key, value)` table holds the derived catalog as JSON
//! values under hierarchical keys:
//!
//! - `ARTISTS` → array of artist names
//! - `<artist>` → array of album titles
//! - `<artist>/<album>` → array of [`TrackEntry`]
//! - `<artist>/<album>/<track>` → [`TrackDetails`]
//!
//! Re-indexing upserts every derived key, so a re-scan replaces stale
//! values in place.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::error::{Error, Result};
use crate::library::Catalog;

/// Key under which the artist list is stored.
const ARTISTS_KEY: &str = "ARTISTS";

/// Default store filename.
pub const DEFAULT_DB_NAME: &str = "tagdex.db";

/// One track as listed under an album key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackEntry {
    pub title: String,
    pub number: u32,
}

/// Per-track details stored under the full hierarchical key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackDetails {
    /// Source file path.
    pub path: String,
}

/// Build a SQLite connection URL for a store file.
pub fn db_url(path: &Path) -> String {
    format!("sqlite:{}", path.display())
}

/// Opens the store, creating the database file and schema if needed.
pub async fn open(db_url: &str) -> Result<SqlitePool> {
    if !sqlx::Sqlite::database_exists(db_url).await.unwrap_or(false) {
        sqlx::Sqlite::create_database(db_url).await?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await?;

    sqlx::query("CREATE TABLE IF NOT EXISTS entries (key TEXT PRIMARY KEY, value TEXT NOT NULL)")
        .execute(&pool)
        .await?;

    Ok(pool)
}

/// Upserts one raw key.
pub async fn put(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO entries (key, value) VALUES (?, ?)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;
    Ok(())
}

/// Reads one raw key; an absent key is [`Error::KeyNotFound`].
pub async fn get(pool: &SqlitePool, key: &str) -> Result<String> {
    let row: Option<(String,)> = sqlx::query_as("SELECT value FROM entries WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;
    row.map(|(value,)| value)
        .ok_or_else(|| Error::key_not_found(key))
}

async fn put_json<T: Serialize>(pool: &SqlitePool, key: &str, value: &T) -> Result<()> {
    put(pool, key, &serde_json::to_string(value)?).await
}

async fn get_json<T: DeserializeOwned>(pool: &SqlitePool, key: &str) -> Result<T> {
    Ok(serde_json::from_str(&get(pool, key).await?)?)
}

/// Writes every derived key of a catalog.
pub async fn save_catalog(pool: &SqlitePool, catalog: &Catalog) -> Result<()> {
    put_json(pool, ARTISTS_KEY, &catalog.artists).await?;

    for (artist, albums) in &catalog.albums {
        put_json(pool, artist, albums).await?;
    }
    for ((artist, album), tracks) in &catalog.tracks {
        put_json(pool, &format!("{artist}/{album}"), tracks).await?;
    }
    for ((artist, album, track), details) in &catalog.details {
        put_json(pool, &format!("{artist}/{album}/{track}"), details).await?;
    }

    tracing::info!(
        artists = catalog.artists.len(),
        tracks = catalog.track_count(),
        "catalog saved"
    );
    Ok(())
}

/// All indexed artists.
pub async fn artists(pool: &SqlitePool) -> Result<Vec<String>> {
    get_json(pool, ARTISTS_KEY).await
}

/// Album titles for one artist.
pub async fn artist_albums(pool: &SqlitePool, artist: &str) -> Result<Vec<String>> {
    get_json(pool, artist).await
}

/// Track entries for one album.
pub async fn album_tracks(pool: &SqlitePool, artist: &str, album: &str) -> Result<Vec<TrackEntry>> {
    get_json(pool, &format!("{artist}/{album}")).await
}

/// Stored details for one track.
pub async fn track_details(
    pool: &SqlitePool,
    artist: &str,
    album: &str,
    track: &str,
) -> Result<TrackDetails> {
    get_json(pool, &format!("{artist}/{album}/{track}")).await
}
