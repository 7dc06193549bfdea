//! Embedded-image resolution for mounted markup.
//!
//! The rasterizer cannot reach the network, so remote `<image>` references
//! are fetched up front (bounded by a per-image timeout) and inlined as
//! data URIs before layout. A reference that cannot be fetched either fails
//! the templated path (strict policy, the default) or is replaced with a
//! neutral placeholder (placeholder policy).

use crate::models::{ImageErrorPolicy, ImagePolicy};
use base64::Engine as _;
use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;
use std::time::Duration;

/// 1x1 transparent PNG; composites to the page background.
const PLACEHOLDER_DATA_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==";

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("Failed to fetch image {url}: {reason}")]
    Fetch { url: String, reason: String },
}

fn image_href_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // href or xlink:href inside an <image> element
        Regex::new(r#"<image\b[^>]*?(?:xlink:)?href\s*=\s*"([^"]+)""#)
            .expect("static pattern compiles")
    })
}

/// Resolves remote image references in SVG markup.
pub struct ImageLoader {
    client: reqwest::Client,
    policy: ImageErrorPolicy,
    timeout: Duration,
}

impl ImageLoader {
    pub fn new(policy: &ImagePolicy) -> Self {
        Self {
            client: reqwest::Client::new(),
            policy: policy.on_error,
            timeout: Duration::from_secs(policy.timeout_secs),
        }
    }

    /// Wait for every embedded image: fetch each remote reference and inline
    /// it. Markup without remote references passes through untouched.
    pub async fn resolve(&self, markup: &str) -> Result<String, ImageError> {
        let refs: Vec<(Range<usize>, String)> = image_href_re()
            .captures_iter(markup)
            .filter_map(|caps| {
                let group = caps.get(1)?;
                let url = group.as_str();
                if url.starts_with("http://") || url.starts_with("https://") {
                    Some((group.range(), url.to_string()))
                } else {
                    // data: URIs and relative refs need no resolution
                    None
                }
            })
            .collect();

        if refs.is_empty() {
            return Ok(markup.to_string());
        }

        let mut resolved = String::with_capacity(markup.len());
        let mut cursor = 0;
        for (range, url) in refs {
            let replacement = match self.fetch_data_uri(&url).await {
                Ok(data_uri) => data_uri,
                Err(e) => match self.policy {
                    ImageErrorPolicy::Strict => return Err(e),
                    ImageErrorPolicy::Placeholder => {
                        tracing::warn!(url = %url, error = %e, "Substituting image placeholder");
                        PLACEHOLDER_DATA_URI.to_string()
                    }
                },
            };

            resolved.push_str(&markup[cursor..range.start]);
            resolved.push_str(&replacement);
            cursor = range.end;
        }
        resolved.push_str(&markup[cursor..]);

        Ok(resolved)
    }

    async fn fetch_data_uri(&self, url: &str) -> Result<String, ImageError> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ImageError::Fetch {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .unwrap_or_else(|| guess_mime(url).to_string());

        let bytes = response.bytes().await.map_err(|e| ImageError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        tracing::debug!(url = %url, bytes = bytes.len(), mime = %mime, "Inlined embedded image");

        Ok(format!(
            "data:{mime};base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&bytes)
        ))
    }
}

fn guess_mime(url: &str) -> &'static str {
    let path = url.split('?').next().unwrap_or(url);
    match path.rsplit('.').next() {
        Some(ext) if ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg") => {
            "image/jpeg"
        }
        Some(ext) if ext.eq_ignore_ascii_case("gif") => "image/gif",
        _ => "image/png",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loader(policy: ImageErrorPolicy) -> ImageLoader {
        ImageLoader::new(&ImagePolicy {
            on_error: policy,
            timeout_secs: 2,
        })
    }

    #[tokio::test]
    async fn test_markup_without_images_passes_through() {
        let markup = "<svg><rect width=\"10\" height=\"10\"/></svg>";
        let resolved = loader(ImageErrorPolicy::Strict).resolve(markup).await.unwrap();
        assert_eq!(resolved, markup);
    }

    #[tokio::test]
    async fn test_data_uri_left_untouched() {
        let markup = format!("<svg><image href=\"{PLACEHOLDER_DATA_URI}\"/></svg>");
        let resolved = loader(ImageErrorPolicy::Strict).resolve(&markup).await.unwrap();
        assert_eq!(resolved, markup);
    }

    #[tokio::test]
    async fn test_strict_policy_fails_on_unreachable_image() {
        // Port 9 (discard) on localhost is not listening
        let markup = "<svg><image href=\"http://127.0.0.1:9/logo.png\"/></svg>";
        let result = loader(ImageErrorPolicy::Strict).resolve(markup).await;
        assert!(matches!(result, Err(ImageError::Fetch { .. })));
    }

    #[tokio::test]
    async fn test_placeholder_policy_substitutes_and_proceeds() {
        let markup = "<svg><image href=\"http://127.0.0.1:9/logo.png\"/></svg>";
        let resolved = loader(ImageErrorPolicy::Placeholder)
            .resolve(markup)
            .await
            .unwrap();
        assert!(resolved.contains(PLACEHOLDER_DATA_URI));
        assert!(!resolved.contains("127.0.0.1"));
    }

    #[tokio::test]
    async fn test_xlink_href_also_resolved() {
        let markup = "<svg><image xlink:href=\"http://127.0.0.1:9/a.png\" width=\"10\"/></svg>";
        let resolved = loader(ImageErrorPolicy::Placeholder)
            .resolve(markup)
            .await
            .unwrap();
        assert!(resolved.contains(PLACEHOLDER_DATA_URI));
    }

    #[test]
    fn test_guess_mime() {
        assert_eq!(guess_mime("http://x/y/logo.JPG"), "image/jpeg");
        assert_eq!(guess_mime("http://x/y/logo.gif?v=2"), "image/gif");
        assert_eq!(guess_mime("http://x/y/logo"), "image/png");
    }
}
