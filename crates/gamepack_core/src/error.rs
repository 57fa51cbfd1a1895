use thiserror::Error;

use crate::model::GameRef;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Record serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Record store error: {0}")]
    Generic(String),
}

/// A failed download of a tile or of the published sheet.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to fetch {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Timed out fetching {url}")]
    Timeout { url: String },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::Status { url, .. }
            | FetchError::Transport { url, .. }
            | FetchError::Timeout { url } => url,
        }
    }
}

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Sprite upload of '{public_id}' failed: {message}")]
    Upload { public_id: String, message: String },
}

/// Why an asset's delivery URL could not be transformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("is missing public_id")]
    MissingPublicId,

    #[error("is missing format")]
    MissingFormat,

    #[error("has neither a target nor an origin size")]
    MissingSize,

    #[error("has an unparseable url: {0}")]
    InvalidUrl(String),

    #[error("has a url without a namespace segment")]
    MissingNamespace,
}

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Provide id or code")]
    MissingReference,

    #[error("Game not found ({0})")]
    GameNotFound(GameRef),

    #[error("No image assets for game '{0}'")]
    NoImageAssets(String),

    #[error("Asset {asset_id} {reason}")]
    DataIntegrity {
        asset_id: String,
        reason: ResolveError,
    },

    #[error("Asset {asset_id} reuses sprite label '{label}'")]
    DuplicateLabel { label: String, asset_id: String },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    /// The planned sheet does not fit in `u32` pixels per side or exceeds the
    /// configured pixel budget.
    #[error("Sprite sheet of {width}x{height} px exceeds the limit of {limit} px")]
    SheetTooLarge { width: u64, height: u64, limit: u64 },

    #[error("Could not decode image from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Image processing error: {0}")]
    Image(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Timed out during {0}")]
    Timeout(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl BuildError {
    pub fn integrity(asset_id: impl Into<String>, reason: ResolveError) -> Self {
        Self::DataIntegrity {
            asset_id: asset_id.into(),
            reason,
        }
    }

    /// Short machine-readable name, used as the `error` field of API bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            BuildError::MissingReference => "input",
            BuildError::GameNotFound(_) => "not_found",
            BuildError::NoImageAssets(_) => "no_image_assets",
            BuildError::DataIntegrity { .. } | BuildError::DuplicateLabel { .. } => {
                "data_integrity"
            }
            BuildError::Fetch(_) => "upstream_fetch",
            BuildError::Publish(_) => "upstream_publish",
            BuildError::SheetTooLarge { .. } => "sheet_too_large",
            BuildError::Decode { .. } => "decode",
            BuildError::Image(_) => "image",
            BuildError::Archive(_) => "archive",
            BuildError::Timeout(_) => "timeout",
            BuildError::Store(_) => "store",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_asset_or_url() {
        let err = BuildError::integrity("a-17", ResolveError::MissingPublicId);
        assert_eq!(err.to_string(), "Asset a-17 is missing public_id");

        let err = BuildError::from(FetchError::Status {
            url: "https://cdn/x.png".into(),
            status: 404,
        });
        assert_eq!(err.to_string(), "HTTP 404 from https://cdn/x.png");
        assert_eq!(err.kind(), "upstream_fetch");
    }

    #[test]
    fn oversized_sheet_reports_dimensions() {
        let err = BuildError::SheetTooLarge {
            width: 10_000,
            height: 20_000,
            limit: 1_000,
        };
        assert_eq!(
            err.to_string(),
            "Sprite sheet of 10000x20000 px exceeds the limit of 1000 px"
        );
        assert_eq!(err.kind(), "sheet_too_large");
    }

    #[test]
    fn fetch_error_exposes_url() {
        let err = FetchError::Timeout {
            url: "https://cdn/y.png".into(),
        };
        assert_eq!(err.url(), "https://cdn/y.png");
    }
}
