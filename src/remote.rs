//! HTTP client for the game server.
//!
//! [`CanvasApi`] is the seam the painter and the scheduler talk through;
//! [`RemoteCanvas`] implements it against the live JSON API.

use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::account::Account;
use crate::error::{Error, Result};

/// Color reported for a pixel whose read failed for a non-auth reason.
pub const FALLBACK_COLOR: &str = "#000000";

/// Result of reading one pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PixelRead {
    Color(String),
    /// The server no longer accepts this account's session.
    Unauthorized,
}

/// Result of one paint request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaintOutcome {
    Painted,
    EnergyExhausted,
    Unauthorized,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MiningStatus {
    #[serde(rename = "userBalance", default)]
    pub user_balance: f64,
}

/// The remote operations needed to keep a canvas region in sync.
///
/// Every call carries the account's authorization header. None of them
/// fail hard: reads fall back to [`FALLBACK_COLOR`], paints report
/// [`PaintOutcome::Failed`], and claim/status errors are handed back for
/// the caller to log and drop.
pub trait CanvasApi: Send + Sync {
    fn get_pixel<'a>(&'a self, pixel: i64, account: &'a Account) -> BoxFuture<'a, PixelRead>;

    fn set_pixel<'a>(
        &'a self,
        pixel: i64,
        color: &'a str,
        account: &'a Account,
    ) -> BoxFuture<'a, PaintOutcome>;

    fn claim<'a>(&'a self, account: &'a Account) -> BoxFuture<'a, Result<()>>;

    fn status<'a>(&'a self, account: &'a Account) -> BoxFuture<'a, Result<MiningStatus>>;
}

/// Re-send policy for transport-level failures. HTTP error statuses are
/// never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            delay: Duration::from_millis(600),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PixelResponse {
    pixel: PixelInfo,
}

#[derive(Debug, Deserialize)]
struct PixelInfo {
    color: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RepaintRequest<'a> {
    pixel_id: i64,
    new_color: &'a str,
}

pub struct RemoteCanvas {
    client: reqwest::Client,
    base_url: Url,
    retry: RetryPolicy,
}

impl std::fmt::Debug for RemoteCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteCanvas")
            .field("base_url", &self.base_url.as_str())
            .field("retry", &self.retry)
            .finish()
    }
}

impl RemoteCanvas {
    pub fn new(mut base_url: Url, timeout: Duration, retry: RetryPolicy) -> Result<Self> {
        // Url::join drops the last segment unless the base ends in a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            retry,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|err| Error::Config(format!("bad endpoint {path}: {err}")))
    }

    async fn send<F>(&self, build: F) -> Result<reqwest::Response>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            match build().send().await {
                Ok(response) => return Ok(response),
                Err(err) if attempt < self.retry.retries => {
                    attempt += 1;
                    debug!(attempt, error = %err, "retrying request");
                    tokio::time::sleep(self.retry.delay).await;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    async fn read_color(&self, pixel: i64, account: &Account) -> Result<PixelRead> {
        let url = self.endpoint(&format!("image/get/{pixel}"))?;
        let auth = account.authorization();
        let response = self
            .send(|| self.client.get(url.clone()).header("authorization", &auth))
            .await?;
        match response.status() {
            StatusCode::UNAUTHORIZED => Ok(PixelRead::Unauthorized),
            status if status.is_success() => {
                let body: PixelResponse = response
                    .json()
                    .await
                    .map_err(|err| Error::Decode(err.to_string()))?;
                Ok(PixelRead::Color(body.pixel.color))
            }
            status => Err(Error::Status(status.as_u16())),
        }
    }

    async fn repaint(&self, pixel: i64, color: &str, account: &Account) -> Result<PaintOutcome> {
        let url = self.endpoint("repaint/start")?;
        let auth = account.authorization();
        let body = RepaintRequest {
            pixel_id: pixel,
            new_color: color,
        };
        let response = self
            .send(|| {
                self.client
                    .post(url.clone())
                    .header("authorization", &auth)
                    .json(&body)
            })
            .await?;
        Ok(match response.status() {
            StatusCode::BAD_REQUEST => PaintOutcome::EnergyExhausted,
            StatusCode::UNAUTHORIZED => PaintOutcome::Unauthorized,
            status if status.is_success() => PaintOutcome::Painted,
            status => PaintOutcome::Failed(format!("unexpected HTTP status {}", status.as_u16())),
        })
    }

    async fn mining_claim(&self, account: &Account) -> Result<()> {
        let url = self.endpoint("mining/claim")?;
        let auth = account.authorization();
        let response = self
            .send(|| self.client.get(url.clone()).header("authorization", &auth))
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status.as_u16()));
        }
        Ok(())
    }

    async fn mining_status(&self, account: &Account) -> Result<MiningStatus> {
        let url = self.endpoint("mining/status")?;
        let auth = account.authorization();
        let response = self
            .send(|| self.client.get(url.clone()).header("authorization", &auth))
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status.as_u16()));
        }
        response
            .json()
            .await
            .map_err(|err| Error::Decode(err.to_string()))
    }
}

impl CanvasApi for RemoteCanvas {
    fn get_pixel<'a>(&'a self, pixel: i64, account: &'a Account) -> BoxFuture<'a, PixelRead> {
        async move {
            match self.read_color(pixel, account).await {
                Ok(read) => read,
                Err(err) => {
                    warn!(pixel, error = %err, "error fetching pixel color");
                    PixelRead::Color(FALLBACK_COLOR.to_string())
                }
            }
        }
        .boxed()
    }

    fn set_pixel<'a>(
        &'a self,
        pixel: i64,
        color: &'a str,
        account: &'a Account,
    ) -> BoxFuture<'a, PaintOutcome> {
        async move {
            self.repaint(pixel, color, account)
                .await
                .unwrap_or_else(|err| PaintOutcome::Failed(err.to_string()))
        }
        .boxed()
    }

    fn claim<'a>(&'a self, account: &'a Account) -> BoxFuture<'a, Result<()>> {
        self.mining_claim(account).boxed()
    }

    fn status<'a>(&'a self, account: &'a Account) -> BoxFuture<'a, Result<MiningStatus>> {
        self.mining_status(account).boxed()
    }
}
