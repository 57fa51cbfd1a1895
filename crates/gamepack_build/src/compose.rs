use crate::config::BuildConfig;
use crate::fetch::fetch_within;
use crate::layout::{Tile, plan_layout};
use crate::resolve::UrlResolver;

use bytes::Bytes;
use futures::{StreamExt, TryStreamExt, stream};
use gamepack_core::prelude::*;
use image::{DynamicImage, ImageFormat, RgbaImage, imageops};
use std::collections::{BTreeMap, HashSet};
use std::io::Cursor;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// An encoded sheet together with the layout it was drawn from.
#[derive(Debug, Clone)]
pub struct ComposedSprite {
    /// Lossless PNG with alpha.
    pub png: Bytes,
    pub layout: SpriteLayout,
}

impl ComposedSprite {
    pub fn frames(&self) -> BTreeMap<String, Frame> {
        self.layout.frames()
    }
}

/// Fetches every tile concurrently and draws them onto one transparent sheet.
#[derive(Clone)]
pub struct SpriteComposer<F: ImageFetcher> {
    fetcher: F,
    resolver: UrlResolver,
    config: BuildConfig,
}

impl<F: ImageFetcher> SpriteComposer<F> {
    pub fn new(fetcher: F, resolver: UrlResolver, config: BuildConfig) -> Self {
        Self {
            fetcher,
            resolver,
            config,
        }
    }

    /// Filters to image assets and turns each into a [`Tile`].
    ///
    /// Fails on the first asset that cannot be transformed, before any
    /// network access.
    pub fn prepare_tiles(&self, game: &Game, assets: &[GameAsset]) -> Result<Vec<Tile>, BuildError> {
        let images: Vec<&GameAsset> = assets.iter().filter(|a| a.is_image()).collect();
        if images.is_empty() {
            return Err(BuildError::NoImageAssets(game.code.clone()));
        }

        let mut labels = HashSet::new();
        images
            .into_iter()
            .map(|asset| {
                if self.config.reject_duplicate_labels && !labels.insert(asset.label.as_str()) {
                    return Err(BuildError::DuplicateLabel {
                        label: asset.label.clone(),
                        asset_id: asset.id.clone(),
                    });
                }

                let url = self
                    .resolver
                    .resolve(asset)
                    .map_err(|reason| BuildError::integrity(&asset.id, reason))?;
                let size = asset
                    .effective_size()
                    .ok_or_else(|| BuildError::integrity(&asset.id, ResolveError::MissingSize))?;

                Ok(Tile {
                    asset_id: asset.id.clone(),
                    label: asset.label.clone(),
                    width: size.width,
                    height: size.height,
                    url,
                })
            })
            .collect()
    }

    #[instrument(skip_all, fields(game = %game.code))]
    pub async fn compose(
        &self,
        game: &Game,
        assets: &[GameAsset],
    ) -> Result<ComposedSprite, BuildError> {
        let tiles = self.prepare_tiles(game, assets)?;
        let layout = plan_layout(&tiles)?;
        check_sheet_budget(&layout, self.config.max_sheet_pixels)?;
        info!(
            tiles = tiles.len(),
            columns = layout.columns,
            rows = layout.rows,
            "Planned sprite layout"
        );

        let deadline = Instant::now() + self.config.compose_timeout;
        let work = async {
            let buffers = self.fetch_tiles(&tiles).await?;
            render(layout, tiles, buffers, deadline).await
        };

        tokio::time::timeout(self.config.compose_timeout, work)
            .await
            .map_err(|_| BuildError::Timeout("sprite composition"))?
    }

    /// Downloads all tiles with at most `max_concurrent_fetches` in flight.
    ///
    /// The first failure to complete aborts the rest. Results come back in
    /// tile order regardless of completion order.
    async fn fetch_tiles(&self, tiles: &[Tile]) -> Result<Vec<Bytes>, FetchError> {
        let timeout = self.config.fetch_timeout;
        let fetches: Vec<_> = tiles
            .iter()
            .enumerate()
            .map(|(index, tile)| {
                let fetcher = self.fetcher.clone();
                let url = tile.url.clone();
                async move {
                    debug!(%url, "Fetching tile");
                    fetch_within(&fetcher, &url, timeout)
                        .await
                        .map(|data| (index, data))
                }
            })
            .collect();

        let mut fetched: Vec<(usize, Bytes)> = stream::iter(fetches)
            .buffer_unordered(self.config.max_concurrent_fetches.max(1))
            .try_collect()
            .await?;

        fetched.sort_by_key(|(index, _)| *index);
        Ok(fetched.into_iter().map(|(_, data)| data).collect())
    }
}

/// Rejects layouts whose canvas would exceed `max_pixels`.
pub fn check_sheet_budget(layout: &SpriteLayout, max_pixels: u64) -> Result<(), BuildError> {
    let width = u64::from(layout.sheet_width);
    let height = u64::from(layout.sheet_height);
    if width * height > max_pixels {
        return Err(BuildError::SheetTooLarge {
            width,
            height,
            limit: max_pixels,
        });
    }
    Ok(())
}

async fn render(
    layout: SpriteLayout,
    tiles: Vec<Tile>,
    buffers: Vec<Bytes>,
    deadline: Instant,
) -> Result<ComposedSprite, BuildError> {
    tokio::task::spawn_blocking(move || {
        let png = draw_sheet(&layout, &tiles, &buffers, deadline)?;
        Ok(ComposedSprite {
            png: Bytes::from(png),
            layout,
        })
    })
    .await
    .map_err(|e| BuildError::Image(format!("Composition task failed: {e}")))?
}

/// Decodes each tile and overlays it at its planned offset on a transparent
/// `sheet_width x sheet_height` canvas, then encodes the canvas as PNG.
///
/// Stops with [`BuildError::Timeout`] before the next tile once `deadline`
/// has passed, so an abandoned composition does not keep decoding.
pub fn draw_sheet(
    layout: &SpriteLayout,
    tiles: &[Tile],
    buffers: &[Bytes],
    deadline: Instant,
) -> Result<Vec<u8>, BuildError> {
    let mut canvas = RgbaImage::new(layout.sheet_width, layout.sheet_height);

    for ((placement, tile), data) in layout.placements.iter().zip(tiles).zip(buffers) {
        if Instant::now() >= deadline {
            return Err(BuildError::Timeout("sprite composition"));
        }
        let decoded = image::load_from_memory(data).map_err(|e| BuildError::Decode {
            url: tile.url.clone(),
            message: e.to_string(),
        })?;
        imageops::overlay(
            &mut canvas,
            &decoded.to_rgba8(),
            placement.frame.x as i64,
            placement.frame.y as i64,
        );
    }

    let mut png = Vec::new();
    DynamicImage::ImageRgba8(canvas)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| BuildError::Image(e.to_string()))?;
    Ok(png)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::time::Duration;

    fn png(width: u32, height: u32, color: [u8; 4]) -> Bytes {
        let img = RgbaImage::from_pixel(width, height, Rgba(color));
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        Bytes::from(buf)
    }

    fn later() -> Instant {
        Instant::now() + Duration::from_secs(60)
    }

    fn tile(label: &str, width: u32, height: u32) -> Tile {
        Tile {
            asset_id: label.to_string(),
            label: label.to_string(),
            width,
            height,
            url: format!("https://cdn/{label}.png"),
        }
    }

    #[test]
    fn draws_tiles_at_offsets_on_transparent_canvas() {
        let tiles = vec![tile("red", 4, 4), tile("blue", 2, 2)];
        let layout = plan_layout(&tiles).unwrap();
        let buffers = vec![png(4, 4, [255, 0, 0, 255]), png(2, 2, [0, 0, 255, 255])];

        let sheet = draw_sheet(&layout, &tiles, &buffers, later()).unwrap();
        let sheet = image::load_from_memory(&sheet).unwrap().to_rgba8();

        assert_eq!(sheet.dimensions(), (8, 4));
        assert_eq!(sheet.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(sheet.get_pixel(4, 0), &Rgba([0, 0, 255, 255]));
        assert_eq!(sheet.get_pixel(7, 3)[3], 0, "unused cell area stays transparent");
    }

    #[test]
    fn undecodable_tile_names_its_url() {
        let tiles = vec![tile("broken", 2, 2)];
        let layout = plan_layout(&tiles).unwrap();
        let err = draw_sheet(&layout, &tiles, &[Bytes::from_static(b"nope")], later()).unwrap_err();
        match err {
            BuildError::Decode { url, .. } => assert_eq!(url, "https://cdn/broken.png"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn expired_deadline_stops_before_decoding() {
        let tiles = vec![tile("late", 2, 2)];
        let layout = plan_layout(&tiles).unwrap();
        let expired = Instant::now() - Duration::from_millis(1);

        // The buffer is not an image, so reaching the decoder would give `Decode`.
        let err = draw_sheet(&layout, &tiles, &[Bytes::from_static(b"nope")], expired).unwrap_err();
        assert!(matches!(err, BuildError::Timeout("sprite composition")), "{err}");
    }

    #[test]
    fn sheet_budget_counts_pixels() {
        let layout = plan_layout(&[tile("a", 100, 100), tile("b", 100, 100)]).unwrap();
        assert!(check_sheet_budget(&layout, 20_000).is_ok());
        match check_sheet_budget(&layout, 19_999).unwrap_err() {
            BuildError::SheetTooLarge { width, height, limit } => {
                assert_eq!((width, height, limit), (200, 100, 19_999));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
