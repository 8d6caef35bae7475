//! CLI command definitions and handlers.
//!
//! Each subcommand is implemented as a function that takes the parsed
//! arguments and returns an `anyhow::Result<()>`.

use clap::{Parser, Subcommand};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;
use tracing::info;

use crate::error::{Error, ResultExt};
use crate::id3::FrameContent;
use crate::{config, library, model, store};

/// Tagdex CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Store database path (defaults to storage.db_path from config)
    #[arg(long, env = "TAGDEX_DB", global = true)]
    pub db: Option<PathBuf>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Scan a directory tree and index the tags found
    Scan {
        /// Root directory (defaults to library.root from config)
        root: Option<PathBuf>,
        /// Decodes in flight
        #[arg(long, env = "TAGDEX_CONCURRENCY")]
        concurrency: Option<usize>,
    },
    /// Decode one file and print its tag
    Show {
        /// Path to the MP3 file
        path: PathBuf,
    },
    /// List indexed artists
    Artists,
    /// List an artist's albums
    Albums { artist: String },
    /// List an album's tracks in track-number order
    Tracks { artist: String, album: String },
    /// Show the stored details for a track
    Details {
        artist: String,
        album: String,
        track: String,
    },
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let rt = Runtime::new()?;
    let config = config::load();
    let db_path = cli
        .db
        .clone()
        .unwrap_or_else(|| config.storage.db_path.clone());

    match &cli.command {
        Commands::Scan { root, concurrency } => {
            cmd_scan(&rt, &config, &db_path, root.as_deref(), *concurrency)
        }
        Commands::Show { path } => cmd_show(path),
        Commands::Artists => cmd_artists(&rt, &db_path),
        Commands::Albums { artist } => cmd_albums(&rt, &db_path, artist),
        Commands::Tracks { artist, album } => cmd_tracks(&rt, &db_path, artist, album),
        Commands::Details {
            artist,
            album,
            track,
        } => cmd_details(&rt, &db_path, artist, album, track),
    }
}

// ============================================================================
// Individual command implementations
// ============================================================================

fn cmd_scan(
    rt: &Runtime,
    config: &config::Config,
    db_path: &Path,
    root: Option<&Path>,
    concurrency: Option<usize>,
) -> anyhow::Result<()> {
    let root = root
        .map(Path::to_path_buf)
        .or_else(|| config.library.root.clone())
        .ok_or_else(|| anyhow::anyhow!("no scan root given and none configured (library.root)"))?;
    let concurrency = concurrency.unwrap_or(config.scan.concurrency);

    rt.block_on(async {
        let pool = open_store(db_path).await?;
        println!("Scanning directory: {}", root.display());
        info!(root = %root.display(), concurrency, "scan started");

        let stream = library::scan(root, concurrency);
        let mut stream = std::pin::pin!(stream);
        let mut infos = Vec::new();
        let mut failures = 0usize;

        while let Some(event) = stream.next().await {
            match event {
                library::ScanEvent::Loaded(info) => {
                    infos.push(info);
                    if infos.len() % 100 == 0 {
                        print!("\rDecoded {} files...", infos.len());
                        use std::io::Write;
                        std::io::stdout().flush().unwrap();
                    }
                }
                library::ScanEvent::Failed(path, error) => {
                    failures += 1;
                    eprintln!("\nError decoding {}: {}", path.display(), error);
                }
            }
        }

        let catalog = library::Catalog::from_tracks(&infos);
        store::save_catalog(&pool, &catalog).await?;

        println!(
            "\nIndexed {} tracks across {} artists ({} failures).",
            catalog.track_count(),
            catalog.artists.len(),
            failures
        );
        Ok(())
    })
}

fn cmd_show(path: &Path) -> anyhow::Result<()> {
    let info = model::TrackInfo::load(path)?;
    let header = &info.tag.header;

    println!(
        "ID3v2.{}.{}  declared size {} bytes  flags {:?}",
        header.major_version, header.revision, header.size, header.flags
    );
    if let Some(ext) = &header.extended {
        println!(
            "extended header: length {}  flags {:#06x}  padding {}",
            ext.size, ext.flags, ext.padding_size
        );
    }

    for frame in &info.tag.frames {
        let id = frame.header.id;
        match &frame.content {
            Some(FrameContent::Text(text)) => {
                println!("  {id}  {}", text.trim_end_matches('\0'));
            }
            Some(FrameContent::Comment(c)) => {
                println!(
                    "  {id}  [{}] {}: {}",
                    c.language, c.short_description, c.full_text
                );
            }
            Some(FrameContent::EncapsulatedObject(o)) => {
                println!(
                    "  {id}  {} {:?} ({} bytes)",
                    o.mime_type,
                    o.filename,
                    o.payload.len()
                );
            }
            Some(FrameContent::Private(p)) => {
                println!("  {id}  {} ({} bytes)", p.owner, p.payload.len());
            }
            Some(FrameContent::Raw(bytes)) => {
                println!("  {id}  {} bytes (unrecognized)", bytes.len());
            }
            None => println!("  {id}  (padding marker)"),
        }
    }

    println!();
    println!(
        "{} - {} [{}] track {}",
        info.album_performer(),
        info.track_title(),
        info.album_title(),
        info.track_number()
    );
    Ok(())
}

fn cmd_artists(rt: &Runtime, db_path: &Path) -> anyhow::Result<()> {
    rt.block_on(async {
        let pool = open_store(db_path).await?;
        match store::artists(&pool).await {
            Ok(artists) => {
                for artist in artists {
                    println!("{artist}");
                }
                Ok(())
            }
            Err(Error::KeyNotFound(_)) => {
                println!("Nothing indexed yet. Run 'tagdex scan' first.");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    })
}

fn cmd_albums(rt: &Runtime, db_path: &Path, artist: &str) -> anyhow::Result<()> {
    rt.block_on(async {
        let pool = open_store(db_path).await?;
        for album in store::artist_albums(&pool, artist).await? {
            println!("{album}");
        }
        Ok(())
    })
}

fn cmd_tracks(rt: &Runtime, db_path: &Path, artist: &str, album: &str) -> anyhow::Result<()> {
    rt.block_on(async {
        let pool = open_store(db_path).await?;
        let mut tracks = store::album_tracks(&pool, artist, album).await?;
        tracks.sort_by_key(|t| t.number);
        for track in tracks {
            println!("{:2}  {}", track.number, track.title);
        }
        Ok(())
    })
}

fn cmd_details(
    rt: &Runtime,
    db_path: &Path,
    artist: &str,
    album: &str,
    track: &str,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let pool = open_store(db_path).await?;
        let details = store::track_details(&pool, artist, album, track).await?;
        println!("{}", details.path);
        Ok(())
    })
}

// ============================================================================
// Helper functions
// ============================================================================

async fn open_store(db_path: &Path) -> crate::error::Result<sqlx::SqlitePool> {
    store::open(&store::db_url(db_path))
        .await
        .with_context(format!("opening store {}", db_path.display()))
}
