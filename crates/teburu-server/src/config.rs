//! Server configuration
//!
//! Loaded from a YAML file, then overridden by `TEBURU_*` environment
//! variables. A missing file is created with the defaults.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use teburu_sheets::{Credentials, SheetsClientConfig};

use crate::cache::CacheConfig;
use crate::rate_limit::RateLimitConfig;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OAuth `authorized_user` credentials file
    pub credentials_file: String,
    /// API key for public sheets
    pub api_key: String,
    /// Pre-issued OAuth access token
    pub access_token: String,
    /// Allow cross-origin requests
    pub cors: bool,
    /// Listen address; `:PORT` binds all interfaces
    pub bind: String,
    /// Requests per second per client; 0 disables rate limiting
    pub rate_limit: f64,
    /// Cache full responses
    pub cache: bool,
    /// How long a cached response is served
    #[serde(with = "go_duration")]
    pub cache_ttl: Duration,
    /// Total time allowed for one Sheets API call
    #[serde(with = "go_duration")]
    pub fetch_timeout: Duration,
    /// Time allowed to open a connection to the Sheets API
    #[serde(with = "go_duration")]
    pub connect_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credentials_file: "./creds.json".to_string(),
            api_key: String::new(),
            access_token: String::new(),
            cors: true,
            bind: ":8753".to_string(),
            rate_limit: 5.0,
            cache: false,
            cache_ttl: Duration::from_secs(5 * 60),
            fetch_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Which middleware to install
#[derive(Debug, Clone, Default)]
pub struct MiddlewareConfig {
    pub cors: bool,
    pub rate_limit: Option<RateLimitConfig>,
    pub cache: Option<CacheConfig>,
}

impl Config {
    /// Load configuration from `path`, writing the defaults there if the file
    /// does not exist, then apply environment overrides.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(raw) => serde_yaml::from_str(&raw)
                .with_context(|| format!("invalid config file {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Config::default();
                if let Err(e) = config.write(path) {
                    tracing::warn!("Could not write default config to {}: {}", path.display(), e);
                }
                config
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()));
            }
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        tracing::info!(file = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Write this configuration as YAML
    pub fn write(&self, path: &Path) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Apply `TEBURU_*` overrides from a variable lookup
    pub fn apply_env<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("TEBURU_CREDENTIALS_FILE") {
            self.credentials_file = v;
        }
        if let Some(v) = lookup("TEBURU_API_KEY") {
            self.api_key = v;
        }
        if let Some(v) = lookup("TEBURU_ACCESS_TOKEN") {
            self.access_token = v;
        }
        if let Some(v) = lookup("TEBURU_BIND") {
            self.bind = v;
        }
        if let Some(v) = lookup("TEBURU_CORS") {
            self.cors = parse_bool(&v).context("TEBURU_CORS")?;
        }
        if let Some(v) = lookup("TEBURU_RATE_LIMIT") {
            self.rate_limit = v.trim().parse().context("TEBURU_RATE_LIMIT")?;
        }
        if let Some(v) = lookup("TEBURU_CACHE") {
            self.cache = parse_bool(&v).context("TEBURU_CACHE")?;
        }
        if let Some(v) = lookup("TEBURU_CACHE_TTL") {
            self.cache_ttl = go_duration::parse(&v).context("TEBURU_CACHE_TTL")?;
        }
        if let Some(v) = lookup("TEBURU_FETCH_TIMEOUT") {
            self.fetch_timeout = go_duration::parse(&v).context("TEBURU_FETCH_TIMEOUT")?;
        }
        if let Some(v) = lookup("TEBURU_CONNECT_TIMEOUT") {
            self.connect_timeout = go_duration::parse(&v).context("TEBURU_CONNECT_TIMEOUT")?;
        }
        Ok(())
    }

    /// Address to hand to the listener
    pub fn listen_addr(&self) -> String {
        if self.bind.starts_with(':') {
            format!("0.0.0.0{}", self.bind)
        } else {
            self.bind.clone()
        }
    }

    /// Pick credentials: access token, then API key, then the credentials file.
    /// A missing credentials file means anonymous access.
    pub fn credentials(&self) -> anyhow::Result<Credentials> {
        if !self.access_token.is_empty() {
            return Ok(Credentials::AccessToken(self.access_token.clone()));
        }
        if !self.api_key.is_empty() {
            return Ok(Credentials::ApiKey(self.api_key.clone()));
        }
        if !self.credentials_file.is_empty() {
            let path = Path::new(&self.credentials_file);
            if path.exists() {
                return Credentials::from_file(path)
                    .with_context(|| format!("failed to load credentials from {}", path.display()));
            }
            tracing::warn!(
                "Credentials file {} not found, using anonymous access",
                path.display()
            );
        }
        Ok(Credentials::None)
    }

    /// Sheets client settings
    pub fn sheets_client(&self) -> SheetsClientConfig {
        SheetsClientConfig::new()
            .timeout(self.fetch_timeout)
            .connect_timeout(self.connect_timeout)
    }

    pub fn middleware(&self) -> MiddlewareConfig {
        MiddlewareConfig {
            cors: self.cors,
            rate_limit: (self.rate_limit > 0.0)
                .then(|| RateLimitConfig::per_second(self.rate_limit)),
            cache: self.cache.then(|| CacheConfig::new(self.cache_ttl)),
        }
    }
}

fn parse_bool(s: &str) -> anyhow::Result<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("invalid boolean: {}", other),
    }
}

/// Durations written the Go way: `1h30m`, `5m0s`, `250ms`
pub mod go_duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(s: &str) -> anyhow::Result<Duration> {
        let s = s.trim();
        if s == "0" {
            return Ok(Duration::ZERO);
        }
        if s.is_empty() {
            anyhow::bail!("empty duration");
        }

        let mut total = Duration::ZERO;
        let mut rest = s;
        while !rest.is_empty() {
            let digits = rest
                .find(|c: char| !(c.is_ascii_digit() || c == '.'))
                .ok_or_else(|| anyhow::anyhow!("missing unit in duration {:?}", s))?;
            if digits == 0 {
                anyhow::bail!("invalid duration {:?}", s);
            }
            let value: f64 = rest[..digits].parse()?;
            rest = &rest[digits..];

            let unit_len = rest
                .find(|c: char| c.is_ascii_digit() || c == '.')
                .unwrap_or(rest.len());
            let seconds_per_unit = match &rest[..unit_len] {
                "h" => 3600.0,
                "m" => 60.0,
                "s" => 1.0,
                "ms" => 0.001,
                "us" | "µs" => 0.000_001,
                "ns" => 0.000_000_001,
                unit => anyhow::bail!("unknown unit {:?} in duration {:?}", unit, s),
            };
            rest = &rest[unit_len..];
            total = Duration::try_from_secs_f64(value * seconds_per_unit)
                .ok()
                .and_then(|part| total.checked_add(part))
                .ok_or_else(|| anyhow::anyhow!("duration out of range: {:?}", s))?;
        }
        Ok(total)
    }

    pub fn format(d: Duration) -> String {
        let total = d.as_secs();
        let millis = d.subsec_millis();
        if total == 0 {
            return if millis == 0 {
                "0s".to_string()
            } else {
                format!("{}ms", millis)
            };
        }

        let (hours, minutes, seconds) = (total / 3600, total % 3600 / 60, total % 60);
        let mut out = String::new();
        if hours > 0 {
            out.push_str(&format!("{}h", hours));
        }
        if hours > 0 || minutes > 0 {
            out.push_str(&format!("{}m", minutes));
        }
        if millis > 0 {
            out.push_str(&format!("{}.{:03}s", seconds, millis));
        } else {
            out.push_str(&format!("{}s", seconds));
        }
        out
    }

    pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(*d))
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Seconds(u64),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => parse(&s).map_err(serde::de::Error::custom),
            Raw::Seconds(secs) => Ok(Duration::from_secs(secs)),
        }
    }
}
