//! Image CDN URLs for asset references.
//!
//! Asset references look like `image-{assetId}-{width}x{height}-{ext}`; the
//! CDN serves them at `{cdn}/images/{project}/{dataset}/{assetId}-{width}x{height}.{ext}`
//! and resizes according to query parameters.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fit {
    Clip,
    Crop,
    Fill,
    #[default]
    Max,
    Min,
    Scale,
}

impl Fit {
    fn as_str(self) -> &'static str {
        match self {
            Fit::Clip => "clip",
            Fit::Crop => "crop",
            Fit::Fill => "fill",
            Fit::Max => "max",
            Fit::Min => "min",
            Fit::Scale => "scale",
        }
    }
}

/// Requested rendition. Unset dimensions keep the source size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageTransform {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fit: Fit,
}

impl ImageTransform {
    /// Square crop used for catalog cards.
    #[must_use]
    pub fn card() -> Self {
        Self {
            width: Some(600),
            height: Some(600),
            fit: Fit::Crop,
        }
    }

    /// Large rendition used by the lightbox.
    #[must_use]
    pub fn detail() -> Self {
        Self {
            width: Some(1600),
            height: None,
            fit: Fit::Max,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImageUrlBuilder {
    cdn_base: String,
    project_id: String,
    dataset: String,
}

impl ImageUrlBuilder {
    #[must_use]
    pub fn new(cdn_base: &str, project_id: &str, dataset: &str) -> Self {
        Self {
            cdn_base: cdn_base.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            dataset: dataset.to_string(),
        }
    }

    /// Renderable URL for `reference`.
    ///
    /// Absolute `http(s)` URLs pass through untouched. Returns `None` when
    /// the reference is not a recognizable asset id.
    #[must_use]
    pub fn url(&self, reference: &str, transform: ImageTransform) -> Option<String> {
        let reference = reference.trim();
        if reference.starts_with("https://") || reference.starts_with("http://") {
            return Some(reference.to_string());
        }

        let (asset_id, dimensions, ext) = parse_reference(reference)?;
        let mut url = format!(
            "{}/images/{}/{}/{asset_id}-{dimensions}.{ext}",
            self.cdn_base, self.project_id, self.dataset
        );

        let mut params = Vec::with_capacity(4);
        if let Some(w) = transform.width {
            params.push(format!("w={w}"));
        }
        if let Some(h) = transform.height {
            params.push(format!("h={h}"));
        }
        if transform.width.is_some() || transform.height.is_some() {
            params.push(format!("fit={}", transform.fit.as_str()));
        }
        params.push("auto=format".to_string());

        url.push('?');
        url.push_str(&params.join("&"));
        Some(url)
    }
}

/// Splits `image-{id}-{w}x{h}-{ext}` into its parts.
fn parse_reference(reference: &str) -> Option<(&str, &str, &str)> {
    let rest = reference.strip_prefix("image-")?;
    let (rest, ext) = rest.rsplit_once('-')?;
    let (asset_id, dimensions) = rest.rsplit_once('-')?;

    let (w, h) = dimensions.split_once('x')?;
    let numeric = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if asset_id.is_empty() || ext.is_empty() || !numeric(w) || !numeric(h) {
        return None;
    }
    Some((asset_id, dimensions, ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> ImageUrlBuilder {
        ImageUrlBuilder::new("https://cdn.sanity.io/", "abc123", "production")
    }

    #[test]
    fn builds_cdn_url_with_transform() {
        let url = builder()
            .url("image-Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000-jpg", ImageTransform::card())
            .expect("url");
        assert_eq!(
            url,
            "https://cdn.sanity.io/images/abc123/production/Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000.jpg?w=600&h=600&fit=crop&auto=format"
        );
    }

    #[test]
    fn no_dimensions_means_no_fit() {
        let url = builder()
            .url("image-abc-10x20-png", ImageTransform::default())
            .expect("url");
        assert!(url.ends_with("abc-10x20.png?auto=format"), "{url}");
    }

    #[test]
    fn absolute_urls_pass_through() {
        let url = builder().url("https://example.com/ring.png", ImageTransform::detail());
        assert_eq!(url.as_deref(), Some("https://example.com/ring.png"));
    }

    #[test]
    fn malformed_references_are_rejected() {
        for bad in ["", "file-abc-pdf", "image-abc-jpg", "image-abc-10xY-jpg", "image--10x10-jpg"] {
            assert!(builder().url(bad, ImageTransform::card()).is_none(), "accepted {bad:?}");
        }
    }
}
