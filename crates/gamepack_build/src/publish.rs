use bytes::Bytes;
use gamepack_core::prelude::*;
use tracing::{error, info, instrument};

/// Uploads composed sheets under an id derived from the game code, so a
/// rebuild replaces the previous sheet instead of adding another one.
#[derive(Clone)]
pub struct SpriteSheetPublisher<U: SheetUploader> {
    uploader: U,
    prefix: String,
}

impl<U: SheetUploader> SpriteSheetPublisher<U> {
    pub fn new(uploader: U, prefix: impl Into<String>) -> Self {
        Self {
            uploader,
            prefix: prefix.into(),
        }
    }

    pub fn sheet_id(&self, game_code: &str) -> String {
        format!("{}{game_code}", self.prefix)
    }

    #[instrument(skip(self, png), fields(bytes = png.len()))]
    pub async fn publish(&self, png: Bytes, game_code: &str) -> Result<String, PublishError> {
        let public_id = self.sheet_id(game_code);
        let url = self
            .uploader
            .upload_sheet(&public_id, png)
            .await
            .inspect_err(|e| error!("Sheet upload failed: {e}"))?;

        info!(%url, "Published sprite sheet");
        Ok(url)
    }
}
