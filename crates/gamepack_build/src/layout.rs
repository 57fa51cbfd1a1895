use gamepack_core::prelude::*;

/// One image asset as it enters a sprite build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub asset_id: String,
    pub label: String,
    pub width: u32,
    pub height: u32,
    /// Resolved transform URL the tile image is fetched from.
    pub url: String,
}

/// Places tiles on a uniform, near-square grid.
///
/// Every cell is as large as the largest tile. Tiles fill the grid row-major
/// in input order, and each placement keeps the tile's own size. An empty
/// input yields an empty 0x0 layout; callers reject that case earlier.
///
/// Fails with [`BuildError::SheetTooLarge`] when a sheet side would not fit
/// in `u32`. Every frame offset is below its sheet side, so offsets never
/// overflow once the sides fit.
pub fn plan_layout(tiles: &[Tile]) -> Result<SpriteLayout, BuildError> {
    let n = tiles.len() as u32;
    let cell_width = tiles.iter().map(|t| t.width).max().unwrap_or(0);
    let cell_height = tiles.iter().map(|t| t.height).max().unwrap_or(0);

    let columns = ceil_sqrt(n);
    let rows = if columns == 0 { 0 } else { n.div_ceil(columns) };

    let width = u64::from(columns) * u64::from(cell_width);
    let height = u64::from(rows) * u64::from(cell_height);
    let (Ok(sheet_width), Ok(sheet_height)) = (u32::try_from(width), u32::try_from(height))
    else {
        return Err(BuildError::SheetTooLarge {
            width,
            height,
            limit: u64::from(u32::MAX),
        });
    };

    let placements = tiles
        .iter()
        .enumerate()
        .map(|(index, tile)| {
            let index = index as u32;
            Placement {
                label: tile.label.clone(),
                frame: Frame {
                    x: (index % columns) * cell_width,
                    y: (index / columns) * cell_height,
                    w: tile.width,
                    h: tile.height,
                },
            }
        })
        .collect();

    Ok(SpriteLayout {
        columns,
        rows,
        cell_width,
        cell_height,
        sheet_width,
        sheet_height,
        placements,
    })
}

fn ceil_sqrt(n: u32) -> u32 {
    let mut root = (n as f64).sqrt() as u32;
    while root * root < n {
        root += 1;
    }
    root
}
