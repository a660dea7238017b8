//! TOML configuration. Every field has a default, so an empty file is valid.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::coords::CanvasGeometry;
use crate::error::{Error, Result};
use crate::image::{Palette, DEFAULT_SKIP_MARKER};
use crate::painter::Pacing;
use crate::remote::RetryPolicy;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub canvas: CanvasConfig,
    pub image: ImageConfig,
    pub pacing: PacingConfig,
    pub schedule: ScheduleConfig,
    /// Newline-delimited file of init-data tokens.
    pub accounts_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
    /// Per-request timeout.
    pub timeout_ms: u64,
    /// Re-sends after a transport failure.
    pub retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://notpx.app/api/v1".into(),
            timeout_ms: 10_000,
            retries: 3,
            retry_delay_ms: 600,
        }
    }
}

/// Canvas dimensions and where the image's top-left corner goes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: i64,
    pub height: i64,
    pub origin_x: i64,
    pub origin_y: i64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 1000,
            origin_x: 830,
            origin_y: 250,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub path: PathBuf,
    pub skip_marker: char,
    pub palette: BTreeMap<String, String>,
}

impl Default for ImageConfig {
    fn default() -> Self {
        let palette = [("#", "#000000"), (".", "#3690EA"), ("*", "#ffffff")]
            .into_iter()
            .map(|(code, color)| (code.to_string(), color.to_string()))
            .collect();
        Self {
            path: PathBuf::from("image.txt"),
            skip_marker: DEFAULT_SKIP_MARKER,
            palette,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub base_ms: u64,
    pub jitter_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            base_ms: 50,
            jitter_ms: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Minimum length of one pass over all accounts.
    pub cycle_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self { cycle_secs: 3600 }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            canvas: CanvasConfig::default(),
            image: ImageConfig::default(),
            pacing: PacingConfig::default(),
            schedule: ScheduleConfig::default(),
            accounts_path: PathBuf::from("data.txt"),
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.canvas.width <= 0 || self.canvas.height <= 0 {
            return Err(Error::Config(format!(
                "canvas dimensions must be positive, got {}x{}",
                self.canvas.width, self.canvas.height
            )));
        }
        if self.schedule.cycle_secs == 0 {
            return Err(Error::Config("schedule.cycle_secs must be at least 1".into()));
        }
        self.base_url()?;
        self.palette()?;
        Ok(())
    }

    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.server.base_url)
            .map_err(|e| Error::Config(format!("invalid base_url: {e}")))
    }

    pub fn palette(&self) -> Result<Palette> {
        Palette::from_table(&self.image.palette)
    }

    pub fn geometry(&self) -> CanvasGeometry {
        CanvasGeometry::new(
            self.canvas.width,
            self.canvas.height,
            self.canvas.origin_x,
            self.canvas.origin_y,
        )
    }

    pub fn pacing(&self) -> Pacing {
        Pacing {
            base: Duration::from_millis(self.pacing.base_ms),
            jitter: Duration::from_millis(self.pacing.jitter_ms),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.server.retries,
            delay: Duration::from_millis(self.server.retry_delay_ms),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.server.timeout_ms)
    }

    pub fn cycle_period(&self) -> Duration {
        Duration::from_secs(self.schedule.cycle_secs)
    }
}
