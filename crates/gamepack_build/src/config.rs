use std::time::Duration;

#[derive(Clone, Debug)]
pub struct BuildConfig {
    /// Bound for each tile download and for the sheet re-download.
    ///
    /// Defaults to 15 seconds.
    pub fetch_timeout: Duration,
    /// Bound for the whole compose step (fetch fan-out and composition).
    ///
    /// Defaults to 60 seconds.
    pub compose_timeout: Duration,
    /// Bound for a whole sprite or bundle build, publishing included.
    ///
    /// Defaults to 120 seconds.
    pub build_timeout: Duration,
    /// How many tile downloads may be in flight at once.
    ///
    /// Defaults to 8.
    pub max_concurrent_fetches: usize,
    /// The published sheet id is `<sprite_prefix><game code>`.
    ///
    /// Defaults to `sprite_`.
    pub sprite_prefix: String,
    /// Overrides the scheme and host of transformed URLs.
    ///
    /// Defaults to the origin URL's own scheme and host.
    pub delivery_root: Option<String>,
    /// Upper bound on `sheet_width * sheet_height`, checked before any tile
    /// is fetched.
    ///
    /// Defaults to 64 megapixels (256 MiB of RGBA).
    pub max_sheet_pixels: u64,
    /// Fail a sprite build when two image assets share a label.
    ///
    /// Defaults to `true`. When `false` the later asset wins the frame entry.
    pub reject_duplicate_labels: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(15),
            compose_timeout: Duration::from_secs(60),
            build_timeout: Duration::from_secs(120),
            max_concurrent_fetches: 8,
            sprite_prefix: "sprite_".to_string(),
            delivery_root: None,
            max_sheet_pixels: 64 * 1024 * 1024,
            reject_duplicate_labels: true,
        }
    }
}
