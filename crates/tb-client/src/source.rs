//! The page-fetching seam between the listing client and the network.

use std::future::Future;

use serde_json::Value;

use crate::error::ListingError;

/// One page request against the torrent listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Maximum number of torrents to return.
    pub limit: usize,
    /// Index of the first torrent to return.
    pub offset: usize,
    /// Ask the server to skip its own cache.
    pub bypass_cache: bool,
}

/// One page of the torrent listing, not yet normalized.
///
/// Torrents stay as raw JSON so that a malformed torrent can be skipped on
/// its own instead of failing the whole page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingPage {
    /// Torrent objects in server order.
    pub torrents: Vec<Value>,
    /// Total number of torrents, if the server reported one.
    pub total: Option<usize>,
}

impl ListingPage {
    /// Extracts a page from a listing response body.
    ///
    /// Accepts the API envelope (`{"success": true, "data": [...]}`) as well
    /// as a bare array. `data: null` is an empty page.
    pub fn from_body(body: Value) -> Result<Self, ListingError> {
        match body {
            Value::Array(torrents) => Ok(Self {
                torrents,
                total: None,
            }),
            Value::Object(mut map) => {
                if map.get("success").and_then(Value::as_bool) == Some(false) {
                    let text = |key: &str| map.get(key).and_then(Value::as_str);
                    return Err(ListingError::rejected(text("error"), text("detail")));
                }
                let total = map
                    .get("total")
                    .and_then(Value::as_u64)
                    .and_then(|t| usize::try_from(t).ok());
                match map.remove("data") {
                    Some(Value::Array(torrents)) => Ok(Self { torrents, total }),
                    Some(Value::Null) => Ok(Self {
                        torrents: Vec::new(),
                        total,
                    }),
                    _ => Err(ListingError::schema("response", "data")),
                }
            }
            _ => Err(ListingError::schema("response", "data")),
        }
    }
}

/// A source of listing pages.
///
/// [`crate::TorBoxApi`] talks to the real API; [`crate::FixtureSource`] serves a
/// saved response. Implementations perform exactly one request per call and
/// never retry.
pub trait PageSource: Send + Sync + 'static {
    /// Fetches one page.
    fn fetch_page(
        &self,
        request: PageRequest,
    ) -> impl Future<Output = Result<ListingPage, ListingError>> + Send;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_from_body_envelope() {
        let page = ListingPage::from_body(json!({
            "success": true,
            "data": [{"id": 1}, {"id": 2}],
        }))
        .unwrap();
        assert_eq!(page.torrents.len(), 2);
        assert_eq!(page.total, None);
    }

    #[test]
    fn test_from_body_bare_array_and_null() {
        let page = ListingPage::from_body(json!([{"id": 1}])).unwrap();
        assert_eq!(page.torrents.len(), 1);

        let page = ListingPage::from_body(json!({"success": true, "data": null})).unwrap();
        assert!(page.torrents.is_empty());
    }

    #[test]
    fn test_from_body_reads_total() {
        let page = ListingPage::from_body(json!({"data": [], "total": 12})).unwrap();
        assert_eq!(page.total, Some(12));
    }

    #[test]
    fn test_from_body_bad_token_is_auth() {
        let err = ListingPage::from_body(json!({
            "success": false,
            "error": "BAD_TOKEN",
            "detail": "Token is invalid.",
        }))
        .unwrap_err();
        assert!(err.is_auth());
        assert_eq!(
            err,
            ListingError::TokenRejected {
                code: "BAD_TOKEN".to_owned(),
                message: "Token is invalid.".to_owned()
            }
        );
    }

    #[test]
    fn test_from_body_rejected() {
        let err = ListingPage::from_body(json!({
            "success": false,
            "error": "DATABASE_ERROR",
            "detail": "Try again later.",
        }))
        .unwrap_err();
        assert!(!err.is_auth());
        assert_eq!(
            err,
            ListingError::Rejected {
                message: "Try again later.".to_owned()
            }
        );
    }

    #[test]
    fn test_from_body_missing_data() {
        let err = ListingPage::from_body(json!({"success": true})).unwrap_err();
        assert_eq!(err, ListingError::schema("response", "data"));

        let err = ListingPage::from_body(json!("nope")).unwrap_err();
        assert!(err.is_schema());
    }
}
