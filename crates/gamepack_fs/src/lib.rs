//! # Gamepack FileSystem Backends
//!
//! Local filesystem implementations of the gamepack collaborators:
//!
//! * [`FsGameStore`] reads one JSON document per game (`games/<id>.json`,
//!   a [`GameWithAssets`]).
//! * [`FsSheetStore`] writes published sheets to a directory that is served
//!   under a public base URL.
//!
//! ## Features
//!
//! * **Atomic Writes**: Uses temporary files and rename operations so a sheet
//!   or record is never read half-written.
//!
//! ## Usage
//!
//! ```no_run
//! use gamepack_fs::{FsGameStore, FsSheetStore};
//!
//! let store = FsGameStore::new("./gamepack_data");
//! let sheets = FsSheetStore::new("./gamepack_data/sprites", "http://localhost:3000/sprites");
//! ```

use bytes::Bytes;
use gamepack_core::prelude::*;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

async fn atomic_write(path: &Path, data: Bytes) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let tmp_path = path.with_extension("tmp");

    fs::write(&tmp_path, data).await?;
    fs::rename(&tmp_path, path).await?;

    Ok(())
}

/// Ids and public ids become file names, so they must be a single plain segment.
fn is_plain_segment(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
}

#[derive(Clone)]
pub struct FsGameStore {
    root: PathBuf,
}

impl FsGameStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { root: path.into() }
    }

    fn games_dir(&self) -> PathBuf {
        self.root.join("games")
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.games_dir().join(format!("{id}.json"))
    }

    /// Writes (or replaces) a game document.
    pub async fn write_game(&self, record: &GameWithAssets) -> Result<(), StoreError> {
        if !is_plain_segment(&record.game.id) {
            return Err(StoreError::Generic(format!(
                "Invalid game id: '{}'",
                record.game.id
            )));
        }
        let data = Bytes::from(serde_json::to_vec_pretty(record)?);
        atomic_write(&self.record_path(&record.game.id), data).await?;
        Ok(())
    }

    async fn read_record(&self, id: &str) -> Result<Option<GameWithAssets>, StoreError> {
        if !is_plain_segment(id) {
            return Ok(None);
        }
        match fs::read(self.record_path(id)).await {
            Ok(data) => Ok(Some(serde_json::from_slice(&data)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn read_all(&self) -> Result<Vec<GameWithAssets>, StoreError> {
        let mut entries = match fs::read_dir(self.games_dir()).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Io(e)),
        };

        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let data = fs::read(&path).await?;
            match serde_json::from_slice(&data) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping unreadable game record {path:?}: {e}"),
            }
        }
        Ok(records)
    }
}

impl GameStore for FsGameStore {
    async fn get_game(&self, game: &GameRef) -> Result<Option<Game>, StoreError> {
        match game {
            GameRef::Id(id) => Ok(self.read_record(id).await?.map(|r| r.game)),
            GameRef::Code(_) => Ok(self
                .read_all()
                .await?
                .into_iter()
                .map(|r| r.game)
                .find(|g| game.matches(g))),
        }
    }

    async fn list_assets(&self, game_id: &str) -> Result<Vec<GameAsset>, StoreError> {
        let mut assets = self
            .read_record(game_id)
            .await?
            .map(|r| r.assets)
            .unwrap_or_default();
        assets.sort_by_key(|a| a.created_at);
        Ok(assets)
    }

    async fn list_games(&self) -> Result<Vec<Game>, StoreError> {
        let mut games: Vec<Game> = self.read_all().await?.into_iter().map(|r| r.game).collect();
        games.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(games)
    }
}

/// Publishes sheets as `<root>/<public_id>.png`, reachable at
/// `<public_base_url>/<public_id>.png`.
#[derive(Clone)]
pub struct FsSheetStore {
    root: PathBuf,
    public_base_url: String,
}

impl FsSheetStore {
    pub fn new(path: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: path.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SheetUploader for FsSheetStore {
    async fn upload_sheet(&self, public_id: &str, data: Bytes) -> Result<String, PublishError> {
        if !is_plain_segment(public_id) {
            return Err(PublishError::Upload {
                public_id: public_id.to_string(),
                message: "public id must be a single path segment".to_string(),
            });
        }

        let file_name = format!("{public_id}.png");
        let path = self.root.join(&file_name);
        atomic_write(&path, data).await?;
        debug!("Wrote sheet to {path:?}");

        Ok(format!("{}/{file_name}", self.public_base_url))
    }
}
