//! HTTP access to the TorBox API.

use std::fmt;
use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tb_core::{ApiConfig, TorrentId};
use tracing::{debug, trace};

use crate::error::ListingError;
use crate::source::{ListingPage, PageRequest, PageSource};

/// Timeout for stream-link requests, which are small and should be quick.
const LINK_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest server message kept in an error.
const MAX_MESSAGE_LEN: usize = 200;

/// A TorBox API client authenticated with a bearer token.
///
/// The token is used as given; decoding or prompting for it is the caller's
/// job.
///
/// # Examples
///
/// ```no_run
/// use tb_client::{ListingClient, TorBoxApi};
/// use tb_core::ApiConfig;
///
/// # async fn example() -> Result<(), tb_client::ListingError> {
/// let config = ApiConfig::default();
/// let api = TorBoxApi::new(&config, "my-token")?;
/// let client = ListingClient::new(api, config);
/// let report = client.fetch_all().await?;
/// println!("{} torrents", report.records.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TorBoxApi {
    http: Client,
    base_url: String,
    token: String,
}

impl fmt::Debug for TorBoxApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TorBoxApi")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct LinkResponse {
    #[serde(default)]
    success: bool,
    data: Option<String>,
    error: Option<String>,
    detail: Option<String>,
}

impl TorBoxApi {
    /// Creates a client for `config.base_url` using `token`.
    pub fn new(config: &ApiConfig, token: impl Into<String>) -> Result<Self, ListingError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("torbox-browse/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            token: token.into(),
        })
    }

    /// Returns the base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Requests a streamable download link for one file of a torrent.
    pub async fn request_download_link(
        &self,
        torrent_id: &TorrentId,
        file_id: u64,
    ) -> Result<String, ListingError> {
        let url = format!("{}/torrents/requestdl", self.base_url);
        let file_id = file_id.to_string();
        debug!(torrent_id = %torrent_id, file_id = %file_id, "Requesting download link");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .timeout(LINK_TIMEOUT)
            .query(&[
                ("token", self.token.as_str()),
                ("torrent_id", torrent_id.as_str()),
                ("file_id", file_id.as_str()),
            ])
            .send()
            .await?;
        let body: LinkResponse = check_status(response).await?.json().await?;

        match body {
            LinkResponse {
                success: true,
                data: Some(link),
                ..
            } if !link.is_empty() => Ok(link),
            LinkResponse {
                success: false,
                error,
                detail,
                ..
            } => Err(ListingError::rejected(error.as_deref(), detail.as_deref())),
            LinkResponse { .. } => Err(ListingError::schema("requestdl", "data")),
        }
    }
}

impl PageSource for TorBoxApi {
    async fn fetch_page(&self, request: PageRequest) -> Result<ListingPage, ListingError> {
        let url = format!("{}/torrents/mylist", self.base_url);
        trace!(offset = request.offset, limit = request.limit, "Fetching listing page");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[
                ("limit", request.limit.to_string()),
                ("offset", request.offset.to_string()),
                ("bypass_cache", request.bypass_cache.to_string()),
            ])
            .send()
            .await?;
        let body: Value = check_status(response).await?.json().await?;
        ListingPage::from_body(body)
    }
}

/// Maps non-success statuses onto [`ListingError`] variants.
async fn check_status(response: Response) -> Result<Response, ListingError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = retry_after(response.headers());
    let mut message = response.text().await.unwrap_or_default();
    if message.len() > MAX_MESSAGE_LEN {
        let cut = (0..=MAX_MESSAGE_LEN)
            .rev()
            .find(|i| message.is_char_boundary(*i))
            .unwrap_or(0);
        message.truncate(cut);
    }

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ListingError::Auth {
            status: status.as_u16(),
            message,
        },
        StatusCode::TOO_MANY_REQUESTS => ListingError::RateLimit { retry_after },
        _ => ListingError::Status {
            status: status.as_u16(),
            message,
        },
    })
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
