use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::{AssetKind, Game, GameAsset};

/// The "Pack" is the JSON manifest of a game's resolved asset URLs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackManifest {
    pub game_id: String,
    pub game_code: String,
    pub name: String,
    pub description: Option<String>,
    pub config: serde_json::Value,
    pub built_at: DateTime<Utc>,

    /// In asset creation order.
    pub assets: Vec<PackAsset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackAsset {
    pub id: String,
    pub label: String,
    pub kind: AssetKind,
    pub original: OriginalAsset,
    pub target: TargetSize,
    pub processed: ProcessedAsset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginalAsset {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSize {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedAsset {
    /// The transformed delivery URL, or the origin URL when no transform applies.
    pub url: String,
}

/// Placement of one tile: cell origin plus the tile's own size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub label: String,
    pub frame: Frame,
}

/// A uniform grid layout for a sprite sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpriteLayout {
    pub columns: u32,
    pub rows: u32,
    pub cell_width: u32,
    pub cell_height: u32,
    pub sheet_width: u32,
    pub sheet_height: u32,

    /// One entry per input tile, in input order.
    pub placements: Vec<Placement>,
}

impl SpriteLayout {
    /// `label -> frame`. A repeated label keeps its last placement.
    pub fn frames(&self) -> BTreeMap<String, Frame> {
        self.placements
            .iter()
            .map(|p| (p.label.clone(), p.frame))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpriteManifest {
    pub game_id: String,
    pub game_code: String,
    pub name: String,
    pub description: Option<String>,
    pub sprite: SpriteSheet,
    pub built_at: DateTime<Utc>,
    pub frames: BTreeMap<String, Frame>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpriteSheet {
    /// Public delivery URL of the published sheet.
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub cell_width: u32,
    pub cell_height: u32,
    pub columns: u32,
    pub rows: u32,
}

/// The export-config payload: a game with its raw asset records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameExport {
    pub id: String,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub config: serde_json::Value,
    pub assets: Vec<ExportedAsset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedAsset {
    pub id: String,
    pub kind: AssetKind,
    pub label: String,
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub format: Option<String>,
}

impl GameExport {
    pub fn new(game: Game, assets: &[GameAsset]) -> Self {
        Self {
            id: game.id,
            name: game.name,
            code: game.code,
            description: game.description,
            config: game.config,
            assets: assets
                .iter()
                .map(|a| ExportedAsset {
                    id: a.id.clone(),
                    kind: a.kind.clone(),
                    label: a.label.clone(),
                    url: a.url.clone(),
                    width: a.width,
                    height: a.height,
                    format: a.format.clone(),
                })
                .collect(),
        }
    }
}

/// A game together with every asset it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameWithAssets {
    pub game: Game,
    pub assets: Vec<GameAsset>,
}
