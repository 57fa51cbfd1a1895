use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::BuildError;

/// A registered game: a named bundle of assets plus an opaque JSON config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: String,

    /// Unique, human-readable code e.g. "lucky_sevens".
    pub code: String,

    pub name: String,

    pub description: Option<String>,

    /// Interpreted by the consumer of the pack, never by the pipeline.
    #[serde(default)]
    pub config: serde_json::Value,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One visual or audio asset owned by a [`Game`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameAsset {
    pub id: String,
    pub game_id: String,

    #[serde(default)]
    pub kind: AssetKind,

    /// Key for frame lookup. Expected to be unique within a game.
    pub label: String,

    /// Origin location. Authoritative for the provider namespace.
    pub url: String,

    pub width: Option<u32>,
    pub height: Option<u32>,

    /// File extension / codec token e.g. "png".
    pub format: Option<String>,

    pub target_width: Option<u32>,
    pub target_height: Option<u32>,

    #[serde(default)]
    pub metadata: AssetMetadata,

    pub created_at: DateTime<Utc>,
}

impl GameAsset {
    /// `target_width || width`, where zero counts as unset.
    pub fn effective_width(&self) -> Option<u32> {
        non_zero(self.target_width).or(non_zero(self.width))
    }

    /// `target_height || height`, where zero counts as unset.
    pub fn effective_height(&self) -> Option<u32> {
        non_zero(self.target_height).or(non_zero(self.height))
    }

    /// The size used for both the URL transform and the sprite layout.
    pub fn effective_size(&self) -> Option<EffectiveSize> {
        Some(EffectiveSize {
            width: self.effective_width()?,
            height: self.effective_height()?,
        })
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref().filter(|f| !f.is_empty())
    }

    pub fn is_image(&self) -> bool {
        self.kind == AssetKind::Image
    }
}

fn non_zero(value: Option<u32>) -> Option<u32> {
    value.filter(|v| *v > 0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AssetKind {
    #[default]
    Image,
    Video,
    Other(String),
}

impl AssetKind {
    pub fn as_str(&self) -> &str {
        match self {
            AssetKind::Image => "image",
            AssetKind::Video => "video",
            AssetKind::Other(kind) => kind,
        }
    }
}

impl From<String> for AssetKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "" | "image" => AssetKind::Image,
            "video" => AssetKind::Video,
            _ => AssetKind::Other(value),
        }
    }
}

impl From<&str> for AssetKind {
    fn from(value: &str) -> Self {
        AssetKind::from(value.to_string())
    }
}

impl From<AssetKind> for String {
    fn from(kind: AssetKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The typed view of an asset's free-form `metadata` object.
///
/// Read leniently: anything that is not an object, and any field that is not
/// a non-empty string, is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value")]
pub struct AssetMetadata {
    /// The remote asset's transform-addressable identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
}

impl AssetMetadata {
    pub fn public_id(&self) -> Option<&str> {
        self.public_id.as_deref().filter(|s| !s.is_empty())
    }

    pub fn resource_type(&self) -> Option<&str> {
        self.resource_type.as_deref().filter(|s| !s.is_empty())
    }
}

impl From<serde_json::Value> for AssetMetadata {
    fn from(value: serde_json::Value) -> Self {
        let field = |name: &str| {
            value
                .get(name)
                .and_then(serde_json::Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Self {
            public_id: field("public_id"),
            resource_type: field("resource_type"),
        }
    }
}

/// How a build request names its game: exactly one of id or code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameRef {
    Id(String),
    Code(String),
}

impl GameRef {
    /// Builds a reference from optional request parameters.
    ///
    /// Empty strings count as absent. When both are present the id wins.
    pub fn from_parts(id: Option<&str>, code: Option<&str>) -> Result<Self, BuildError> {
        let id = id.map(str::trim).filter(|s| !s.is_empty());
        let code = code.map(str::trim).filter(|s| !s.is_empty());

        match (id, code) {
            (Some(id), _) => Ok(GameRef::Id(id.to_string())),
            (None, Some(code)) => Ok(GameRef::Code(code.to_string())),
            (None, None) => Err(BuildError::MissingReference),
        }
    }

    pub fn matches(&self, game: &Game) -> bool {
        match self {
            GameRef::Id(id) => game.id == *id,
            GameRef::Code(code) => game.code == *code,
        }
    }
}

impl fmt::Display for GameRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameRef::Id(id) => write!(f, "id={id}"),
            GameRef::Code(code) => write!(f, "code={code}"),
        }
    }
}
