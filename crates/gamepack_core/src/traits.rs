use crate::error::*;
use crate::model::{Game, GameAsset, GameRef};

use bytes::Bytes;

/// Read access to the `games` / `game_assets` records.
pub trait GameStore: Send + Sync + 'static + Clone {
    /// `Ok(None)` when no game matches.
    fn get_game(
        &self,
        game: &GameRef,
    ) -> impl Future<Output = Result<Option<Game>, StoreError>> + Send;

    /// All assets of a game, oldest first.
    fn list_assets(
        &self,
        game_id: &str,
    ) -> impl Future<Output = Result<Vec<GameAsset>, StoreError>> + Send;

    /// All games, newest first.
    fn list_games(&self) -> impl Future<Output = Result<Vec<Game>, StoreError>> + Send;
}

/// Downloads (transformed) images from the CDN.
pub trait ImageFetcher: Send + Sync + 'static + Clone {
    /// Any non-success status is an error.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Bytes, FetchError>> + Send;
}

/// The remote asset store a composed sheet is published to.
pub trait SheetUploader: Send + Sync + 'static + Clone {
    /// Stores `data` under `public_id`, replacing any previous object, and
    /// returns its public delivery URL.
    fn upload_sheet(
        &self,
        public_id: &str,
        data: Bytes,
    ) -> impl Future<Output = Result<String, PublishError>> + Send;
}
