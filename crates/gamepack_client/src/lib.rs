use bytes::Bytes;
use gamepack_core::prelude::*;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GamepackClientError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server returned error {0}: {1}")]
    ServerError(StatusCode, String),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, GamepackClientError>;

/// A downloaded bundle archive and the file name the server suggested.
#[derive(Debug, Clone)]
pub struct BundleDownload {
    pub file_name: Option<String>,
    pub data: Bytes,
}

#[derive(Clone)]
pub struct GamepackClient {
    base_url: String,
    client: Client,
}

impl GamepackClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `<base>/games/<id>` with `id` percent-encoded as a single segment.
    fn game_url(&self, id: &str) -> Result<String> {
        let invalid = || GamepackClientError::Validation(format!("Invalid base url: {}", self.base_url));

        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .push("games")
            .push(id);
        Ok(url.into())
    }

    async fn get(&self, path: &str, game: Option<&GameRef>) -> Result<Response> {
        self.get_url(self.url(path), game).await
    }

    async fn get_url(&self, url: String, game: Option<&GameRef>) -> Result<Response> {
        let mut request = self.client.get(url);
        if let Some(game) = game {
            request = match game {
                GameRef::Id(id) => request.query(&[("id", id)]),
                GameRef::Code(code) => request.query(&[("code", code)]),
            };
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(GamepackClientError::ServerError(status, text));
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, game: Option<&GameRef>) -> Result<T> {
        self.get(path, game)
            .await?
            .json()
            .await
            .map_err(|e| GamepackClientError::Validation(format!("Failed to parse {path}: {e}")))
    }

    pub async fn fetch_pack(&self, game: &GameRef) -> Result<PackManifest> {
        self.get_json("/build/pack", Some(game)).await
    }

    /// Builds (and publishes) the sprite sheet on the server.
    pub async fn fetch_sprite(&self, game: &GameRef) -> Result<SpriteManifest> {
        self.get_json("/build/sprite", Some(game)).await
    }

    pub async fn download_bundle(&self, game: &GameRef) -> Result<BundleDownload> {
        let response = self.get("/build/bundle", Some(game)).await?;
        let file_name = response
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(attachment_name);

        let data = response.bytes().await?;
        Ok(BundleDownload { file_name, data })
    }

    pub async fn export(&self, game: &GameRef) -> Result<GameExport> {
        self.get_json("/export", Some(game)).await
    }

    pub async fn list_games(&self) -> Result<Vec<Game>> {
        self.get_json("/games", None).await
    }

    pub async fn game(&self, id: &str) -> Result<GameWithAssets> {
        self.get_url(self.game_url(id)?, None)
            .await?
            .json()
            .await
            .map_err(|e| GamepackClientError::Validation(format!("Failed to parse game {id}: {e}")))
    }
}

/// `attachment; filename="game_pack_slots.zip"` -> `game_pack_slots.zip`
fn attachment_name(disposition: &str) -> Option<String> {
    disposition
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}
