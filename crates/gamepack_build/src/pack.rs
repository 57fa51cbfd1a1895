use crate::resolve::UrlResolver;

use chrono::{DateTime, Utc};
use gamepack_core::prelude::*;

/// Turns a loaded game and its assets into a [`PackManifest`].
///
/// Never fails: an asset without usable transform data keeps its origin URL.
#[derive(Debug, Clone, Default)]
pub struct PackAssembler {
    resolver: UrlResolver,
}

impl PackAssembler {
    pub fn new(resolver: UrlResolver) -> Self {
        Self { resolver }
    }

    pub fn assemble(
        &self,
        game: &Game,
        assets: &[GameAsset],
        built_at: DateTime<Utc>,
    ) -> PackManifest {
        PackManifest {
            game_id: game.id.clone(),
            game_code: game.code.clone(),
            name: game.name.clone(),
            description: game.description.clone(),
            config: game.config.clone(),
            built_at,
            assets: assets.iter().map(|a| self.pack_asset(a)).collect(),
        }
    }

    fn pack_asset(&self, asset: &GameAsset) -> PackAsset {
        PackAsset {
            id: asset.id.clone(),
            label: asset.label.clone(),
            kind: asset.kind.clone(),
            original: OriginalAsset {
                url: asset.url.clone(),
                width: asset.width,
                height: asset.height,
                format: asset.format.clone(),
            },
            target: TargetSize {
                width: asset.effective_width(),
                height: asset.effective_height(),
            },
            processed: ProcessedAsset {
                url: self.resolver.resolve_or_original(asset),
            },
        }
    }
}
