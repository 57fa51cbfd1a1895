use crate::{api, state::AppState};
use axum::{Router, routing::get};
use gamepack_build::{BuildPipeline, config::BuildConfig};
use gamepack_core::prelude::*;
use tower_http::trace::TraceLayer;
use tracing::warn;

/// The builder for the Gamepack Server.
#[derive(Clone, Debug, Default)]
pub struct GamepackServer {
    config: GamepackServerConfig,
}

impl GamepackServer {
    pub fn new(config: GamepackServerConfig) -> Self {
        Self { config }
    }
}

#[derive(Clone, Debug, Default)]
pub struct GamepackServerConfig {
    /// Timeouts, fan-out width and naming used by every build.
    pub build: BuildConfig,
}

impl GamepackServer {
    /// `store` provides the game records, `fetcher` downloads tiles and
    /// published sheets, `uploader` publishes composed sheets.
    pub fn build<G: GameStore, F: ImageFetcher, U: SheetUploader>(
        self,
        store: G,
        fetcher: F,
        uploader: U,
    ) -> Router {
        let GamepackServerConfig { build } = self.config;
        if build.max_concurrent_fetches == 0 {
            warn!("`max_concurrent_fetches` is 0, tile downloads will run one at a time");
        }

        let state = AppState {
            pipeline: BuildPipeline::new(store, fetcher, uploader, build),
        };

        Router::new()
            .route("/health", get(|| async { "OK" }))
            .route("/build/pack", get(api::build_pack))
            .route("/build/sprite", get(api::build_sprite))
            .route("/build/bundle", get(api::build_bundle))
            .route("/export", get(api::export_config))
            .route("/games", get(api::list_games))
            .route("/games/{id}", get(api::get_game))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
