//! Sheets API client with connection pooling

use std::sync::Arc;
use std::time::{Duration, Instant};

use teburu_core::Spreadsheet;
use url::Url;

use crate::auth::{Authenticator, Credentials};
use crate::config::SheetsClientConfig;
use crate::error::{SheetsError, SheetsResult};
use crate::model::ApiSpreadsheet;
use crate::SHEET_FIELDS;

const POOL_MAX_IDLE_PER_HOST: usize = 10;
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
const USER_AGENT: &str = concat!("teburu/", env!("CARGO_PKG_VERSION"));

/// Async Sheets API client. Cloning is cheap and shares the connection pool.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use teburu_sheets::{Credentials, SheetsClient, SheetsClientConfig, range};
///
/// let client = SheetsClient::new(
///     SheetsClientConfig::new().timeout(Duration::from_secs(10)),
///     Credentials::ApiKey("AIza...".into()),
/// )?;
/// let grid = client.get_ranges("1BxiMVs0XRA5", &range::list_ranges("Sheet1")).await?;
/// ```
#[derive(Clone)]
pub struct SheetsClient {
    inner: Arc<SheetsClientInner>,
}

struct SheetsClientInner {
    client: reqwest::Client,
    config: SheetsClientConfig,
    auth: Authenticator,
}

impl SheetsClient {
    /// Create a new client with the given configuration and credentials
    pub fn new(config: SheetsClientConfig, credentials: Credentials) -> SheetsResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
            .pool_idle_timeout(POOL_IDLE_TIMEOUT)
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()?;

        Ok(Self {
            inner: Arc::new(SheetsClientInner {
                client,
                config,
                auth: Authenticator::new(credentials),
            }),
        })
    }

    /// Get the API root
    pub fn base_url(&self) -> &str {
        &self.inner.config.base_url
    }

    pub fn credentials(&self) -> &Credentials {
        self.inner.auth.credentials()
    }

    /// Build the `spreadsheets.get` URL for a set of ranges
    pub fn spreadsheet_url(&self, spreadsheet_id: &str, ranges: &[String]) -> SheetsResult<Url> {
        let mut url = Url::parse(&self.inner.config.base_url)?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", spreadsheet_id]);

        {
            let mut query = url.query_pairs_mut();
            for range in ranges {
                query.append_pair("ranges", range);
            }
            query.append_pair("fields", SHEET_FIELDS);
            if let Some(key) = self.inner.auth.api_key() {
                query.append_pair("key", key);
            }
        }

        Ok(url)
    }

    /// Fetch the cell values and hyperlinks of `ranges`
    pub async fn get_ranges(
        &self,
        spreadsheet_id: &str,
        ranges: &[String],
    ) -> SheetsResult<Spreadsheet> {
        let start = Instant::now();
        let url = self.spreadsheet_url(spreadsheet_id, ranges)?;

        let mut request = self.inner.client.get(url);
        if let Some(token) = self.inner.auth.bearer_token(&self.inner.client).await? {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        let latency_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(
            spreadsheet_id,
            ranges = ranges.len(),
            status = status.as_u16(),
            latency_ms,
            "sheets fetch"
        );

        if !status.is_success() {
            return Err(SheetsError::from_api_response(status.as_u16(), &body));
        }

        let payload: ApiSpreadsheet = serde_json::from_slice(&body)
            .map_err(|e| SheetsError::Json(format!("Failed to parse spreadsheet: {}", e)))?;

        Ok(payload.into())
    }
}

impl std::fmt::Debug for SheetsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsClient")
            .field("base_url", &self.inner.config.base_url)
            .field("timeout", &self.inner.config.timeout)
            .field("credentials", &self.inner.auth.credentials().kind())
            .finish()
    }
}
