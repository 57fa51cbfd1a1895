//! In-memory doubles for the gamepack collaborators.
//!
//! Don't use these in production! They exist for tests and demos.

use bytes::Bytes;
use chrono::{DateTime, Duration, TimeZone, Utc};
use gamepack_core::prelude::*;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex, MutexGuard};

/// A [`GameStore`] backed by a shared in-memory list.
#[derive(Clone, Default)]
pub struct MemoryGameStore {
    inner: Arc<Mutex<StoreState>>,
}

#[derive(Default)]
struct StoreState {
    games: Vec<Game>,
    assets: Vec<GameAsset>,
}

impl MemoryGameStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn insert_game(&self, game: Game) {
        self.state().games.push(game);
    }

    pub fn insert_asset(&self, asset: GameAsset) {
        self.state().assets.push(asset);
    }
}

impl GameStore for MemoryGameStore {
    async fn get_game(&self, game: &GameRef) -> Result<Option<Game>, StoreError> {
        Ok(self.state().games.iter().find(|g| game.matches(g)).cloned())
    }

    async fn list_assets(&self, game_id: &str) -> Result<Vec<GameAsset>, StoreError> {
        let mut assets: Vec<GameAsset> = self
            .state()
            .assets
            .iter()
            .filter(|a| a.game_id == game_id)
            .cloned()
            .collect();
        assets.sort_by_key(|a| a.created_at);
        Ok(assets)
    }

    async fn list_games(&self) -> Result<Vec<Game>, StoreError> {
        let mut games = self.state().games.clone();
        games.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(games)
    }
}

/// A fake CDN: serves fetches from memory and accepts sheet uploads.
///
/// Uploaded sheets become fetchable at the URL returned by the upload, so a
/// bundle build can download what it published.
#[derive(Clone)]
pub struct MemoryCdn {
    inner: Arc<Mutex<CdnState>>,
}

struct CdnState {
    base_url: String,
    objects: HashMap<String, Bytes>,
    failures: HashMap<String, u16>,
    upload_failure: Option<String>,
    synthesize: bool,
    latency: Option<std::time::Duration>,
    delays: HashMap<String, std::time::Duration>,
    fetched: Vec<String>,
    uploads: Vec<String>,
}

impl Default for MemoryCdn {
    fn default() -> Self {
        Self::new("https://cdn.test/sheets")
    }
}

impl MemoryCdn {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CdnState {
                base_url: base_url.into(),
                objects: HashMap::new(),
                failures: HashMap::new(),
                upload_failure: None,
                synthesize: false,
                latency: None,
                delays: HashMap::new(),
                fetched: Vec::new(),
                uploads: Vec::new(),
            })),
        }
    }

    /// Answers any `.../w_<W>,h_<H>,.../...` URL with a solid `W x H` PNG.
    pub fn synthesizing() -> Self {
        let cdn = Self::default();
        cdn.state().synthesize = true;
        cdn
    }

    fn state(&self) -> MutexGuard<'_, CdnState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn put(&self, url: impl Into<String>, data: Bytes) {
        self.state().objects.insert(url.into(), data);
    }

    /// Every fetch of `url` answers with `status`.
    pub fn fail(&self, url: impl Into<String>, status: u16) {
        self.state().failures.insert(url.into(), status);
    }

    /// Every upload is rejected with `message`.
    pub fn fail_uploads(&self, message: impl Into<String>) {
        self.state().upload_failure = Some(message.into());
    }

    /// Delays every fetch.
    pub fn with_latency(self, latency: std::time::Duration) -> Self {
        self.state().latency = Some(latency);
        self
    }

    /// Delays fetches of `url` only, overriding [`with_latency`](Self::with_latency).
    pub fn delay(&self, url: impl Into<String>, latency: std::time::Duration) {
        self.state().delays.insert(url.into(), latency);
    }

    pub fn sheet_url(&self, public_id: &str) -> String {
        format!("{}/{public_id}.png", self.state().base_url)
    }

    pub fn object(&self, url: &str) -> Option<Bytes> {
        self.state().objects.get(url).cloned()
    }

    /// URLs fetched so far, in call order.
    pub fn fetched(&self) -> Vec<String> {
        self.state().fetched.clone()
    }

    /// Public ids uploaded so far, in call order.
    pub fn uploads(&self) -> Vec<String> {
        self.state().uploads.clone()
    }
}

impl ImageFetcher for MemoryCdn {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        let (latency, outcome) = {
            let mut state = self.state();
            state.fetched.push(url.to_string());

            let outcome = if let Some(status) = state.failures.get(url) {
                Err(FetchError::Status {
                    url: url.to_string(),
                    status: *status,
                })
            } else if let Some(data) = state.objects.get(url) {
                Ok(data.clone())
            } else if let Some((w, h)) = state.synthesize.then(|| transform_size(url)).flatten() {
                Ok(solid_png(w, h, color_for(url)))
            } else {
                Err(FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                })
            };
            let latency = state.delays.get(url).copied().or(state.latency);
            (latency, outcome)
        };

        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        outcome
    }
}

impl SheetUploader for MemoryCdn {
    async fn upload_sheet(&self, public_id: &str, data: Bytes) -> Result<String, PublishError> {
        let mut state = self.state();
        if let Some(message) = &state.upload_failure {
            return Err(PublishError::Upload {
                public_id: public_id.to_string(),
                message: message.clone(),
            });
        }

        let url = format!("{}/{public_id}.png", state.base_url);
        state.objects.insert(url.clone(), data);
        state.uploads.push(public_id.to_string());
        Ok(url)
    }
}

fn transform_size(url: &str) -> Option<(u32, u32)> {
    url.split('/').find_map(|segment| {
        let mut width = None;
        let mut height = None;
        for part in segment.split(',') {
            if let Some(w) = part.strip_prefix("w_") {
                width = w.parse().ok();
            } else if let Some(h) = part.strip_prefix("h_") {
                height = h.parse().ok();
            }
        }
        Some((width?, height?))
    })
}

fn color_for(url: &str) -> [u8; 4] {
    let sum = url.bytes().fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
    [(sum >> 16) as u8, (sum >> 8) as u8, sum as u8, 255]
}

/// Encodes a `width x height` PNG filled with `color`.
pub fn solid_png(width: u32, height: u32, color: [u8; 4]) -> Bytes {
    let img = RgbaImage::from_pixel(width, height, Rgba(color));
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encoding an in-memory PNG cannot fail");
    Bytes::from(buf)
}

/// Record builders for tests.
pub mod fixtures {
    use super::*;

    /// A fixed clock so creation order is explicit.
    pub fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::seconds(seconds)
    }

    pub fn game(id: &str, code: &str) -> Game {
        Game {
            id: id.to_string(),
            code: code.to_string(),
            name: format!("Game {code}"),
            description: Some(format!("The {code} game")),
            config: serde_json::json!({ "reels": 5, "theme": code }),
            created_at: at(0),
            updated_at: at(0),
        }
    }

    /// An image asset with complete transform metadata, hosted under the
    /// `demo` namespace.
    pub fn image_asset(game: &Game, seq: i64, label: &str, width: u32, height: u32) -> GameAsset {
        GameAsset {
            id: format!("{}-{seq}", game.id),
            game_id: game.id.clone(),
            kind: AssetKind::Image,
            label: label.to_string(),
            url: format!("https://res.cloudinary.com/demo/image/upload/v1/{label}.png"),
            width: Some(width),
            height: Some(height),
            format: Some("png".to_string()),
            target_width: None,
            target_height: None,
            metadata: AssetMetadata {
                public_id: Some(label.to_string()),
                resource_type: None,
            },
            created_at: at(seq),
        }
    }

    /// The transformed URL [`image_asset`] resolves to.
    pub fn transformed_url(label: &str, width: u32, height: u32) -> String {
        format!("https://res.cloudinary.com/demo/image/upload/w_{width},h_{height},c_fit/{label}.png")
    }
}
