use std::fmt;

use thiserror::Error;
use url::Url;

use crate::models::NewsCandidate;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("URL cannot be empty")]
    EmptyUrl,
    #[error("Malformed URL: {0}")]
    MalformedUrl(String),
    #[error("URL must have a host")]
    MissingHost,
    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
    #[error("Title cannot be empty")]
    EmptyTitle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    fn default_port(self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Http => write!(f, "http"),
            Scheme::Https => write!(f, "https"),
        }
    }
}

/// Canonical form of a news item URL, used as the store's unique key.
/// Guarantees: HTTP/HTTPS scheme, non-empty lowercase host.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalUrl {
    pub scheme: Scheme,

    pub host: String,

    /// only non-default ports
    pub port: Option<u16>,

    /// no trailing slash except root
    pub path: String,

    /// raw query, parameter order preserved (`?v=` ids are significant)
    pub query: Option<String>,
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.host)?;

        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }

        write!(f, "{}", self.path)?;

        if let Some(query) = &self.query {
            write!(f, "?{query}")?;
        }

        Ok(())
    }
}

impl TryFrom<Url> for CanonicalUrl {
    type Error = ValidationError;

    fn try_from(url: Url) -> Result<Self, Self::Error> {
        let scheme = match url.scheme() {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            scheme => return Err(ValidationError::UnsupportedScheme(scheme.to_string())),
        };

        let host = match url.host_str() {
            Some(host) if !host.is_empty() => host.to_lowercase(),
            _ => return Err(ValidationError::MissingHost),
        };

        let port = url.port().filter(|&p| p != scheme.default_port());

        let path = match url.path() {
            "" | "/" => "/".to_string(),
            path => path.strip_suffix('/').unwrap_or(path).to_string(),
        };

        let query = url
            .query()
            .filter(|q| !q.is_empty())
            .map(|q| q.to_string());

        Ok(CanonicalUrl {
            scheme,
            host,
            port,
            path,
            query,
        })
    }
}

pub fn validate_url(url_str: &str) -> Result<CanonicalUrl, ValidationError> {
    let url_str = url_str.trim();
    if url_str.is_empty() {
        return Err(ValidationError::EmptyUrl);
    }

    let url =
        Url::parse(url_str).map_err(|_| ValidationError::MalformedUrl(url_str.to_string()))?;
    CanonicalUrl::try_from(url)
}

pub fn normalize_url(url_str: &str) -> Result<String, ValidationError> {
    Ok(validate_url(url_str)?.to_string())
}

/// Checks the fields the store requires and returns the canonical URL to key on.
pub fn validate_candidate(candidate: &NewsCandidate) -> Result<String, ValidationError> {
    if candidate.title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    normalize_url(&candidate.url)
}
