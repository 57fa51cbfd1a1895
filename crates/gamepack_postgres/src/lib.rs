//! Read-only [`GameStore`] over the `games` / `game_assets` tables.
//!
//! Ids are compared as text so the store works with both `uuid` and `text`
//! primary keys.

use chrono::{DateTime, Utc};
use gamepack_core::prelude::*;
use sqlx::{FromRow, PgPool};
use tracing::{debug, instrument};

#[derive(Debug, Clone, FromRow)]
struct GameRow {
    id: String,
    code: String,
    name: String,
    description: Option<String>,
    config: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<GameRow> for Game {
    fn from(row: GameRow) -> Self {
        Game {
            id: row.id,
            code: row.code,
            name: row.name,
            description: row.description,
            config: row.config.unwrap_or(serde_json::Value::Null),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
struct AssetRow {
    id: String,
    game_id: String,
    kind: Option<String>,
    label: String,
    url: String,
    width: Option<i32>,
    height: Option<i32>,
    format: Option<String>,
    target_width: Option<i32>,
    target_height: Option<i32>,
    metadata: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
}

/// Negative dimensions are treated like missing ones.
fn dimension(value: Option<i32>) -> Option<u32> {
    value.and_then(|v| u32::try_from(v).ok())
}

impl From<AssetRow> for GameAsset {
    fn from(row: AssetRow) -> Self {
        GameAsset {
            id: row.id,
            game_id: row.game_id,
            kind: row.kind.unwrap_or_default().into(),
            label: row.label,
            url: row.url,
            width: dimension(row.width),
            height: dimension(row.height),
            format: row.format,
            target_width: dimension(row.target_width),
            target_height: dimension(row.target_height),
            metadata: row.metadata.map(AssetMetadata::from).unwrap_or_default(),
            created_at: row.created_at,
        }
    }
}

const GAME_COLUMNS: &str =
    "id::text AS id, code, name, description, config, created_at, updated_at";

fn store_error(e: sqlx::Error) -> StoreError {
    StoreError::Generic(format!("Database error: {e}"))
}

#[derive(Clone)]
pub struct PgGameStore {
    pool: PgPool,
}

impl PgGameStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url).await.map_err(store_error)?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl GameStore for PgGameStore {
    #[instrument(skip(self), fields(game = %game))]
    async fn get_game(&self, game: &GameRef) -> Result<Option<Game>, StoreError> {
        let (column, value) = match game {
            GameRef::Id(id) => ("id::text", id),
            GameRef::Code(code) => ("code", code),
        };

        let row: Option<GameRow> = sqlx::query_as(&format!(
            "SELECT {GAME_COLUMNS} FROM games WHERE {column} = $1 LIMIT 1"
        ))
        .bind(value)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        debug!(found = row.is_some(), "Loaded game");
        Ok(row.map(Game::from))
    }

    #[instrument(skip(self))]
    async fn list_assets(&self, game_id: &str) -> Result<Vec<GameAsset>, StoreError> {
        let rows: Vec<AssetRow> = sqlx::query_as(
            r#"
            SELECT id::text AS id, game_id::text AS game_id, kind, label, url,
                   width, height, format, target_width, target_height,
                   metadata, created_at
              FROM game_assets
             WHERE game_id::text = $1
             ORDER BY created_at, id
            "#,
        )
        .bind(game_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        debug!(count = rows.len(), "Loaded assets");
        Ok(rows.into_iter().map(GameAsset::from).collect())
    }

    #[instrument(skip(self))]
    async fn list_games(&self) -> Result<Vec<Game>, StoreError> {
        let rows: Vec<GameRow> = sqlx::query_as(&format!(
            "SELECT {GAME_COLUMNS} FROM games ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(rows.into_iter().map(Game::from).collect())
    }
}
