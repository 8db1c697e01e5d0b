//! Synthesis service endpoint.
//!
//! The base URL comes from [`ServiceConfig`](crate::config::ServiceConfig) and
//! is parsed once; every request path is derived from it.

use reqwest::Url;
use thiserror::Error;

/// Errors raised while parsing the configured endpoint base.
#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("invalid endpoint URL {url:?}: {reason}")]
    Parse { url: String, reason: String },

    #[error("endpoint must use http or https, got {0:?}")]
    Scheme(String),

    #[error("endpoint {0:?} cannot carry a path")]
    NotABase(String),
}

/// Parsed base URL of the synthesis service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: Url,
}

impl Endpoint {
    pub fn parse(base: &str) -> Result<Self, EndpointError> {
        let base = Url::parse(base.trim()).map_err(|e| EndpointError::Parse {
            url: base.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(base.scheme(), "http" | "https") {
            return Err(EndpointError::Scheme(base.scheme().to_string()));
        }
        if base.cannot_be_a_base() {
            return Err(EndpointError::NotABase(base.to_string()));
        }

        Ok(Self { base })
    }

    /// The base URL without a trailing slash.
    pub fn base(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    /// `POST` target for synthesis requests.
    pub fn synthesis_url(&self) -> Url {
        self.join(&["api", "tts"])
    }

    /// Retrieval URL of a synthesized artifact.
    pub fn audio_url(&self, file_id: &str) -> Url {
        self.join(&["api", "audio", file_id])
    }

    pub fn health_url(&self) -> Url {
        self.join(&["api", "health"])
    }

    fn join(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // `parse` rejected cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.set_query(None);
        url.set_fragment(None);
        url
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.base())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_service_paths() {
        let ep = Endpoint::parse("http://localhost:5000").unwrap();
        assert_eq!(ep.synthesis_url().as_str(), "http://localhost:5000/api/tts");
        assert_eq!(
            ep.audio_url("abc123").as_str(),
            "http://localhost:5000/api/audio/abc123"
        );
        assert_eq!(ep.health_url().as_str(), "http://localhost:5000/api/health");
    }

    #[test]
    fn trailing_slash_is_ignored() {
        let ep = Endpoint::parse("http://localhost:5000/").unwrap();
        assert_eq!(ep.base(), "http://localhost:5000");
        assert_eq!(ep.synthesis_url().as_str(), "http://localhost:5000/api/tts");
    }

    #[test]
    fn keeps_path_prefix() {
        let ep = Endpoint::parse("https://example.com/voice/").unwrap();
        assert_eq!(
            ep.audio_url("x").as_str(),
            "https://example.com/voice/api/audio/x"
        );
    }

    #[test]
    fn identifier_is_percent_encoded() {
        let ep = Endpoint::parse("http://localhost:5000").unwrap();
        assert_eq!(
            ep.audio_url("a/b c").as_str(),
            "http://localhost:5000/api/audio/a%2Fb%20c"
        );
    }

    #[test]
    fn rejects_bad_urls() {
        assert!(matches!(
            Endpoint::parse("not a url"),
            Err(EndpointError::Parse { .. })
        ));
        assert!(matches!(
            Endpoint::parse("ftp://example.com"),
            Err(EndpointError::Scheme(_))
        ));
    }
}
