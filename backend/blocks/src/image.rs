//! Image payload checks for image blocks.

use answerkit_core::{ContentError, DEFAULT_IMAGE_MAX_BYTES};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Limits applied when an image payload is set on a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImagePolicy {
    /// Largest decoded payload, in bytes.
    pub max_bytes: usize,
    /// Whether plain `http(s)` URLs are accepted in place of inline data.
    pub allow_remote: bool,
}

impl Default for ImagePolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_IMAGE_MAX_BYTES,
            allow_remote: true,
        }
    }
}

impl ImagePolicy {
    /// Validates a data URI or URL; returns the decoded size for data URIs.
    pub fn check(&self, payload: &str) -> Result<usize, ContentError> {
        let payload = payload.trim();
        if let Some(rest) = payload.strip_prefix("data:") {
            return self.check_data_uri(rest);
        }
        let lower = payload.to_ascii_lowercase();
        if self.allow_remote && (lower.starts_with("https://") || lower.starts_with("http://")) {
            return Ok(0);
        }
        Err(ContentError::UnsupportedImageSource)
    }

    fn check_data_uri(&self, rest: &str) -> Result<usize, ContentError> {
        let (header, data) = rest
            .split_once(',')
            .ok_or(ContentError::UnsupportedImageSource)?;
        let mut params = header.split(';');
        let mime = params.next().unwrap_or_default().to_ascii_lowercase();
        if !mime.starts_with("image/") {
            return Err(ContentError::NotAnImage(if mime.is_empty() {
                "no media type".to_string()
            } else {
                mime
            }));
        }

        let size = if params.any(|p| p.eq_ignore_ascii_case("base64")) {
            let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
            STANDARD
                .decode(compact.as_bytes())
                .map_err(|e| ContentError::InvalidBase64(e.to_string()))?
                .len()
        } else {
            data.len()
        };

        if size > self.max_bytes {
            return Err(ContentError::ImageTooLarge {
                size,
                limit: self.max_bytes,
            });
        }
        Ok(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_small_png() {
        let policy = ImagePolicy::default();
        assert_eq!(policy.check("data:image/png;base64,iVBORw0KGgo=").unwrap(), 8);
    }

    #[test]
    fn rejects_non_images() {
        let err = ImagePolicy::default()
            .check("data:text/html;base64,PHA+")
            .unwrap_err();
        assert!(matches!(err, ContentError::NotAnImage(m) if m == "text/html"));
    }

    #[test]
    fn rejects_oversized_payloads() {
        let policy = ImagePolicy {
            max_bytes: 4,
            allow_remote: true,
        };
        let err = policy.check("data:image/gif;base64,R0lGODlh").unwrap_err();
        assert!(matches!(err, ContentError::ImageTooLarge { size: 6, limit: 4 }));
    }

    #[test]
    fn rejects_bad_base64() {
        let err = ImagePolicy::default()
            .check("data:image/png;base64,***")
            .unwrap_err();
        assert!(matches!(err, ContentError::InvalidBase64(_)));
    }

    #[test]
    fn remote_urls_follow_policy() {
        assert!(ImagePolicy::default().check("https://cdn.example.com/a.png").is_ok());
        let local_only = ImagePolicy {
            allow_remote: false,
            ..Default::default()
        };
        assert!(matches!(
            local_only.check("https://cdn.example.com/a.png"),
            Err(ContentError::UnsupportedImageSource)
        ));
        assert!(ImagePolicy::default().check("javascript:alert(1)").is_err());
    }
}
