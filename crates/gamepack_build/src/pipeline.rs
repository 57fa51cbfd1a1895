use crate::bundle::{Bundle, archive_name, write_archive};
use crate::compose::{ComposedSprite, SpriteComposer};
use crate::config::BuildConfig;
use crate::fetch::fetch_within;
use crate::pack::PackAssembler;
use crate::publish::SpriteSheetPublisher;
use crate::resolve::UrlResolver;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use gamepack_core::prelude::*;
use tracing::{debug, info, instrument};

/// Entry point for the three build operations.
///
/// Every build reads the record store fresh and owns its own state, so one
/// pipeline can serve any number of concurrent builds.
#[derive(Clone)]
pub struct BuildPipeline<G: GameStore, F: ImageFetcher, U: SheetUploader> {
    store: G,
    fetcher: F,
    pack: PackAssembler,
    composer: SpriteComposer<F>,
    publisher: SpriteSheetPublisher<U>,
    config: BuildConfig,
}

impl<G: GameStore, F: ImageFetcher, U: SheetUploader> BuildPipeline<G, F, U> {
    pub fn new(store: G, fetcher: F, uploader: U, config: BuildConfig) -> Self {
        let resolver = match &config.delivery_root {
            Some(root) => UrlResolver::with_delivery_root(root.clone()),
            None => UrlResolver::new(),
        };

        Self {
            pack: PackAssembler::new(resolver.clone()),
            composer: SpriteComposer::new(fetcher.clone(), resolver, config.clone()),
            publisher: SpriteSheetPublisher::new(uploader, config.sprite_prefix.clone()),
            store,
            fetcher,
            config,
        }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn store(&self) -> &G {
        &self.store
    }

    async fn load(&self, game: &GameRef) -> Result<(Game, Vec<GameAsset>), BuildError> {
        let found = self
            .store
            .get_game(game)
            .await?
            .ok_or_else(|| BuildError::GameNotFound(game.clone()))?;
        let assets = self.store.list_assets(&found.id).await?;
        debug!(game = %found.code, assets = assets.len(), "Loaded game");
        Ok((found, assets))
    }

    /// The pack manifest: every asset with its resolved delivery URL.
    #[instrument(skip(self, game), fields(game = %game))]
    pub async fn build_pack(&self, game: &GameRef) -> Result<PackManifest, BuildError> {
        let (game, assets) = self.load(game).await?;
        Ok(self.pack.assemble(&game, &assets, Utc::now()))
    }

    /// Composes the sheet without publishing it.
    #[instrument(skip(self, game), fields(game = %game))]
    pub async fn compose_sprite(&self, game: &GameRef) -> Result<ComposedSprite, BuildError> {
        let (game, assets) = self.load(game).await?;
        self.composer.compose(&game, &assets).await
    }

    /// Composes and publishes the sheet, returning its manifest.
    #[instrument(skip(self, game), fields(game = %game))]
    pub async fn build_sprite(&self, game: &GameRef) -> Result<SpriteManifest, BuildError> {
        self.bounded(async {
            let (game, assets) = self.load(game).await?;
            self.publish_sprite(&game, &assets, Utc::now()).await
        })
        .await
    }

    /// Pack and sprite for the same game, zipped with the published sheet.
    ///
    /// The sheet is downloaded again from its public URL rather than taken
    /// from memory, which also checks that the upload is reachable.
    #[instrument(skip(self, game), fields(game = %game))]
    pub async fn build_bundle(&self, game: &GameRef) -> Result<Bundle, BuildError> {
        self.bounded(async {
            let (game, assets) = self.load(game).await?;
            let built_at = Utc::now();

            let pack = self.pack.assemble(&game, &assets, built_at);
            let sprite = self.publish_sprite(&game, &assets, built_at).await?;

            let png = fetch_within(&self.fetcher, &sprite.sprite.url, self.config.fetch_timeout)
                .await?;
            let data = write_archive(&game.code, &pack, &sprite, &png)?;
            info!(bytes = data.len(), "Bundle assembled");

            Ok(Bundle {
                file_name: archive_name(&game.code),
                data: Bytes::from(data),
                pack,
                sprite,
            })
        })
        .await
    }

    /// The export-config view of a game.
    pub async fn export_game(&self, game: &GameRef) -> Result<GameExport, BuildError> {
        let (game, assets) = self.load(game).await?;
        Ok(GameExport::new(game, &assets))
    }

    pub async fn game_with_assets(&self, game: &GameRef) -> Result<GameWithAssets, BuildError> {
        let (game, assets) = self.load(game).await?;
        Ok(GameWithAssets { game, assets })
    }

    pub async fn list_games(&self) -> Result<Vec<Game>, BuildError> {
        Ok(self.store.list_games().await?)
    }

    async fn publish_sprite(
        &self,
        game: &Game,
        assets: &[GameAsset],
        built_at: DateTime<Utc>,
    ) -> Result<SpriteManifest, BuildError> {
        let composed = self.composer.compose(game, assets).await?;
        let url = self.publisher.publish(composed.png.clone(), &game.code).await?;
        let layout = &composed.layout;

        Ok(SpriteManifest {
            game_id: game.id.clone(),
            game_code: game.code.clone(),
            name: game.name.clone(),
            description: game.description.clone(),
            sprite: SpriteSheet {
                url,
                width: layout.sheet_width,
                height: layout.sheet_height,
                cell_width: layout.cell_width,
                cell_height: layout.cell_height,
                columns: layout.columns,
                rows: layout.rows,
            },
            built_at,
            frames: composed.frames(),
        })
    }

    async fn bounded<T>(
        &self,
        build: impl Future<Output = Result<T, BuildError>>,
    ) -> Result<T, BuildError> {
        tokio::time::timeout(self.config.build_timeout, build)
            .await
            .map_err(|_| BuildError::Timeout("build"))?
    }
}
