//! Error types for the tb-client crate.
//!
//! This module provides [`ListingError`], returned by every remote call.

use std::time::Duration;

/// Errors that can occur while talking to the listing API.
///
/// `ListingError` is [`Clone`] so that one failed fetch can be handed to
/// every caller attached to it.
///
/// # Error Recovery Strategy
///
/// - **Network** ([`ListingError::Network`]): transient; retry by refreshing
/// - **Rate limit** ([`ListingError::RateLimit`]): transient; back off first
/// - **Server status** ([`ListingError::Status`]): transient for 5xx only
/// - **Auth** ([`ListingError::Auth`], [`ListingError::TokenRejected`]): fatal
///   until the token is replaced
/// - **Schema** ([`ListingError::Schema`]): the torrent is skipped; when the
///   response envelope itself is malformed the whole fetch fails
/// - **Incomplete** ([`ListingError::IncompleteListing`],
///   [`ListingError::PageLimit`]): the previous snapshot is kept
///
/// Nothing here is retried internally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListingError {
    /// The request did not complete (connect failure, reset, timeout).
    #[error("network error: {message}")]
    Network {
        /// Description of the failure.
        message: String,
    },

    /// The API rejected the credentials with an HTTP status.
    #[error("authentication failed (HTTP {status}): {message}")]
    Auth {
        /// HTTP status code (401 or 403).
        status: u16,
        /// Server-provided detail, if any.
        message: String,
    },

    /// The API asked the client to slow down.
    #[error("rate limited by the API{}", retry_hint(*retry_after))]
    RateLimit {
        /// Delay requested by the server, if it sent one.
        retry_after: Option<Duration>,
    },

    /// Any other non-success HTTP status.
    #[error("API returned HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Server-provided detail, if any.
        message: String,
    },

    /// The API answered `success: false` with a token error code.
    #[error("API rejected the token ({code}): {message}")]
    TokenRejected {
        /// The `error` code, e.g. `BAD_TOKEN`.
        code: String,
        /// The `detail` field of the response, or the code.
        message: String,
    },

    /// The API answered with `success: false`.
    #[error("API rejected the request: {message}")]
    Rejected {
        /// The `detail` or `error` field of the response.
        message: String,
    },

    /// A required field is missing or has the wrong type.
    #[error("schema error in {location}: missing or invalid '{field}'")]
    Schema {
        /// Torrent id, `#index` when the id itself is unusable, or
        /// `response` for the envelope.
        location: String,
        /// The offending field.
        field: String,
    },

    /// The server reported more torrents than it delivered.
    #[error("incomplete listing: server reported {reported} torrents but delivered {delivered}")]
    IncompleteListing {
        /// Total reported by the server.
        reported: usize,
        /// Torrents actually received.
        delivered: usize,
    },

    /// Pagination did not end within the configured page limit.
    #[error("listing still had more pages after {pages} requests")]
    PageLimit {
        /// Pages fetched before giving up.
        pages: usize,
    },
}

/// `error` codes the API sends for a missing or invalid token.
const TOKEN_ERROR_CODES: &[&str] = &["AUTH_ERROR", "BAD_TOKEN", "NO_AUTH"];

fn retry_hint(retry_after: Option<Duration>) -> String {
    retry_after.map_or_else(String::new, |d| format!(", retry after {}s", d.as_secs()))
}

impl ListingError {
    /// Creates a new [`ListingError::Network`] error.
    #[inline]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Error for a `success: false` response, from its `error` code and
    /// `detail` text. Token error codes become [`ListingError::TokenRejected`].
    pub fn rejected(code: Option<&str>, detail: Option<&str>) -> Self {
        let message = detail.or(code).unwrap_or("no detail given").to_owned();
        match code {
            Some(code) if TOKEN_ERROR_CODES.contains(&code) => Self::TokenRejected {
                code: code.to_owned(),
                message,
            },
            _ => Self::Rejected { message },
        }
    }

    /// Creates a new [`ListingError::Schema`] error.
    #[inline]
    pub fn schema(location: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Schema {
            location: location.into(),
            field: field.into(),
        }
    }

    /// Returns `true` if retrying later may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Network { .. } | Self::RateLimit { .. } => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Auth { .. }
            | Self::TokenRejected { .. }
            | Self::Rejected { .. }
            | Self::Schema { .. }
            | Self::IncompleteListing { .. }
            | Self::PageLimit { .. } => false,
        }
    }

    /// Returns `true` if the session cannot continue without new credentials.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. } | Self::TokenRejected { .. })
    }

    /// Returns `true` for data-integrity faults in what the API sent.
    #[must_use]
    pub const fn is_schema(&self) -> bool {
        matches!(self, Self::Schema { .. })
    }
}

impl From<reqwest::Error> for ListingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network("request timed out")
        } else if err.is_decode() {
            Self::schema("response", "body")
        } else {
            Self::network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_is_transient() {
        let err = ListingError::network("connection reset");
        assert!(err.is_transient());
        assert!(!err.is_auth());
        assert_eq!(err.to_string(), "network error: connection reset");
    }

    #[test]
    fn test_auth_is_fatal() {
        let err = ListingError::Auth {
            status: 401,
            message: "invalid token".to_owned(),
        };
        assert!(err.is_auth());
        assert!(!err.is_transient());
        assert!(err.to_string().contains("HTTP 401"));
    }

    #[test]
    fn test_token_error_codes_are_auth() {
        let err = ListingError::rejected(Some("BAD_TOKEN"), Some("Token is invalid."));
        assert!(err.is_auth());
        assert!(!err.is_transient());
        assert_eq!(err.to_string(), "API rejected the token (BAD_TOKEN): Token is invalid.");

        assert!(ListingError::rejected(Some("NO_AUTH"), None).is_auth());

        let err = ListingError::rejected(Some("DATABASE_ERROR"), None);
        assert!(!err.is_auth());
        assert_eq!(err.to_string(), "API rejected the request: DATABASE_ERROR");
        assert_eq!(
            ListingError::rejected(None, None).to_string(),
            "API rejected the request: no detail given"
        );
    }

    #[test]
    fn test_rate_limit_display() {
        let err = ListingError::RateLimit {
            retry_after: Some(Duration::from_secs(30)),
        };
        assert!(err.is_transient());
        assert_eq!(err.to_string(), "rate limited by the API, retry after 30s");

        let err = ListingError::RateLimit { retry_after: None };
        assert_eq!(err.to_string(), "rate limited by the API");
    }

    #[test]
    fn test_status_transience_by_class() {
        let server = ListingError::Status {
            status: 503,
            message: String::new(),
        };
        let client = ListingError::Status {
            status: 404,
            message: String::new(),
        };
        assert!(server.is_transient());
        assert!(!client.is_transient());
    }

    #[test]
    fn test_schema_display() {
        let err = ListingError::schema("1509", "files[2].size");
        assert!(err.is_schema());
        assert!(!err.is_transient());
        assert_eq!(
            err.to_string(),
            "schema error in 1509: missing or invalid 'files[2].size'"
        );
    }

    #[test]
    fn test_incomplete_display() {
        let err = ListingError::IncompleteListing {
            reported: 10,
            delivered: 7,
        };
        assert!(err.to_string().contains("reported 10"));
        assert!(err.to_string().contains("delivered 7"));
    }
}
