// ABOUTME: Error types for Mangetsu including ErrorCode enum, ScrapeError struct and the Miss value.
// ABOUTME: Miss is the expected "no usable data" outcome of a strategy; ScrapeError is a real failure.

use std::fmt;

/// Error codes representing the categories of failures that cross the API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidUrl,
    Fetch,
    Timeout,
    NotFound,
    UnknownSource,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidUrl => "invalid URL",
            ErrorCode::Fetch => "fetch error",
            ErrorCode::Timeout => "timeout",
            ErrorCode::NotFound => "not found",
            ErrorCode::UnknownSource => "unknown source",
        };
        write!(f, "{}", s)
    }
}

/// The main error type for catalog operations.
#[derive(Debug, thiserror::Error)]
pub struct ScrapeError {
    pub code: ErrorCode,
    pub url: String,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for ScrapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mangetsu: {} {}: {}", self.op, self.url, self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl ScrapeError {
    /// Create an InvalidUrl error.
    pub fn invalid_url(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code: ErrorCode::InvalidUrl,
            url: url.into(),
            op: op.into(),
            source,
        }
    }

    /// Create a Fetch error.
    pub fn fetch(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code: ErrorCode::Fetch,
            url: url.into(),
            op: op.into(),
            source,
        }
    }

    /// Create a Timeout error.
    pub fn timeout(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code: ErrorCode::Timeout,
            url: url.into(),
            op: op.into(),
            source,
        }
    }

    /// Create a NotFound error.
    pub fn not_found(url: impl Into<String>, op: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::NotFound,
            url: url.into(),
            op: op.into(),
            source: None,
        }
    }

    /// Create an UnknownSource error.
    pub fn unknown_source(source_id: impl Into<String>, op: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::UnknownSource,
            url: source_id.into(),
            op: op.into(),
            source: None,
        }
    }

    /// Returns true if this is a NotFound error.
    pub fn is_not_found(&self) -> bool {
        self.code == ErrorCode::NotFound
    }

    /// Returns true if this is a Fetch error.
    pub fn is_fetch(&self) -> bool {
        self.code == ErrorCode::Fetch
    }

    /// Returns true if this is a Timeout error.
    pub fn is_timeout(&self) -> bool {
        self.code == ErrorCode::Timeout
    }

    /// Returns true if this is an InvalidUrl error.
    pub fn is_invalid_url(&self) -> bool {
        self.code == ErrorCode::InvalidUrl
    }

    /// Returns true if this is an UnknownSource error.
    pub fn is_unknown_source(&self) -> bool {
        self.code == ErrorCode::UnknownSource
    }
}

/// A strategy's explicit "no usable data" outcome.
///
/// Miss is a value, not an error: it drives chain advancement and is never
/// surfaced to callers. Transport carries the underlying failure so the
/// executor can distinguish it in telemetry, but for chain purposes all
/// variants behave identically.
#[derive(Debug)]
pub enum Miss {
    /// The fetch succeeded but the expected top-level container was absent
    /// under every known key or selector.
    NoContainer,
    /// The container was present but held zero usable elements.
    Empty,
    /// The transport itself failed (network error, non-2xx).
    Transport(ScrapeError),
}

impl Miss {
    /// Returns true if this miss was caused by a transport failure.
    pub fn is_transport(&self) -> bool {
        matches!(self, Miss::Transport(_))
    }
}

impl fmt::Display for Miss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Miss::NoContainer => write!(f, "no container"),
            Miss::Empty => write!(f, "empty result"),
            Miss::Transport(err) => write!(f, "transport failure: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_includes_op_and_url() {
        let err = ScrapeError::not_found("manga/solo-max", "Detail");
        assert_eq!(format!("{}", err), "mangetsu: Detail manga/solo-max: not found");
        assert!(err.is_not_found());
        assert!(!err.is_fetch());
    }

    #[test]
    fn error_display_includes_source() {
        let err = ScrapeError::fetch(
            "https://example.com",
            "List",
            Some(anyhow::anyhow!("connection refused")),
        );
        let s = format!("{}", err);
        assert!(s.contains("fetch error"));
        assert!(s.contains("connection refused"));
    }

    #[test]
    fn miss_transport_is_distinguished() {
        let miss = Miss::Transport(ScrapeError::fetch("https://x", "List", None));
        assert!(miss.is_transport());
        assert!(!Miss::Empty.is_transport());
        assert!(!Miss::NoContainer.is_transport());
    }
}
