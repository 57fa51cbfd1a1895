//! Delivery URL derivation for stored assets.
//!
//! A transformed URL has the shape
//! `<root>/<namespace>/<resource_type>/upload/w_<W>,h_<H>,c_fit/<public_id>.<format>`,
//! where `namespace` is the first path segment of the origin URL. Keeping it
//! keeps the transformed asset on the same account as the original.

use gamepack_core::prelude::*;
use url::Url;

#[derive(Debug, Clone, Default)]
pub struct UrlResolver {
    delivery_root: Option<String>,
}

impl UrlResolver {
    /// Uses the origin URL's scheme and host as the delivery root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the delivery root e.g. `https://res.cloudinary.com`.
    pub fn with_delivery_root(root: impl Into<String>) -> Self {
        let root = root.into().trim_end_matches('/').to_string();
        Self {
            delivery_root: Some(root).filter(|r| !r.is_empty()),
        }
    }

    /// Derives the transformed URL, or reports which input is missing.
    pub fn resolve(&self, asset: &GameAsset) -> Result<String, ResolveError> {
        let public_id = asset
            .metadata
            .public_id()
            .ok_or(ResolveError::MissingPublicId)?;
        let format = asset.format().ok_or(ResolveError::MissingFormat)?;
        let size = asset.effective_size().ok_or(ResolveError::MissingSize)?;

        let origin = Url::parse(&asset.url).map_err(|e| ResolveError::InvalidUrl(e.to_string()))?;
        if origin.host_str().is_none() {
            return Err(ResolveError::InvalidUrl(format!(
                "'{}' has no host",
                asset.url
            )));
        }

        let mut segments = origin
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect::<Vec<_>>())
            .unwrap_or_default()
            .into_iter();
        let namespace = segments.next().ok_or(ResolveError::MissingNamespace)?;
        let resource_type = resource_type(
            asset.metadata.resource_type(),
            segments.next(),
            &asset.kind,
        );

        let root = match &self.delivery_root {
            Some(root) => root.clone(),
            None => origin.origin().ascii_serialization(),
        };

        Ok(format!(
            "{root}/{namespace}/{resource_type}/upload/w_{},h_{},c_fit/{public_id}.{format}",
            size.width, size.height
        ))
    }

    /// The pack variant: falls back to the origin URL when no transform applies.
    pub fn resolve_or_original(&self, asset: &GameAsset) -> String {
        self.resolve(asset).unwrap_or_else(|_| asset.url.clone())
    }
}

/// Resource type precedence: explicit metadata, then the origin's second
/// path segment, then a default derived from the asset kind.
pub fn resource_type<'a>(
    explicit: Option<&'a str>,
    path_segment: Option<&'a str>,
    kind: &AssetKind,
) -> &'a str {
    explicit
        .or(path_segment)
        .unwrap_or(match kind {
            AssetKind::Video => "video",
            _ => "image",
        })
}
