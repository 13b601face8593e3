//! Process configuration.
//!
//! Read once at startup from command-line flags, falling back to environment
//! variables (optionally seeded from a `.env` file). After that it is never
//! mutated: [`UpstreamConfig`] is narrowed out of it and moved into the
//! upstream client.

use std::fmt;
use std::io::ErrorKind;
use std::str::FromStr;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use url::Url;

use crate::error::Error;

pub const DEFAULT_UPSTREAM_URL: &str = "https://imdb8.p.rapidapi.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug, Parser)]
#[command(name = "marquee")]
#[command(about = "JSON proxy for movie search and title details", version)]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "MARQUEE_BIND", default_value = "0.0.0.0:3000")]
    pub bind: String,

    /// Credential for the upstream movie API.
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<Credential>,

    /// Base URL of the upstream movie API.
    #[arg(long, env = "UPSTREAM_URL", default_value = DEFAULT_UPSTREAM_URL)]
    pub upstream_url: String,

    /// Value for the upstream host header. Defaults to the host of `--upstream-url`.
    #[arg(long, env = "UPSTREAM_HOST")]
    pub upstream_host: Option<String>,

    /// Upstream request timeout in milliseconds.
    #[arg(long, env = "UPSTREAM_TIMEOUT_MS", default_value_t = 10_000)]
    pub upstream_timeout_ms: u64,

    #[arg(long, env = "MARQUEE_LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Json,
}

impl Config {
    /// Loads `.env` (if present) and then parses flags and environment.
    pub fn load() -> Result<Self, Error> {
        load_dotenv()?;
        Ok(Self::parse())
    }

    pub fn upstream(&self) -> Result<UpstreamConfig, Error> {
        let mut upstream = UpstreamConfig::new(&self.upstream_url, self.api_key.clone())?
            .with_timeout(Duration::from_millis(self.upstream_timeout_ms));
        if let Some(host) = &self.upstream_host {
            upstream = upstream.with_host(host.clone());
        }
        Ok(upstream)
    }
}

fn load_dotenv() -> Result<(), Error> {
    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(dotenvy::Error::Io(err)) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

// ── Credential ────────────────────────────────────────────────────────────────

/// The upstream API key. `Debug` never prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl FromStr for Credential {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

// ── UpstreamConfig ────────────────────────────────────────────────────────────

/// Everything the upstream client needs, fixed for the process lifetime.
#[derive(Clone, Debug)]
pub struct UpstreamConfig {
    credential: Option<Credential>,
    base_url: String,
    host: String,
    timeout: Duration,
}

impl UpstreamConfig {
    /// Validates `base_url` and derives the host header from it.
    ///
    /// A blank credential counts as absent.
    pub fn new(base_url: &str, credential: Option<Credential>) -> Result<Self, Error> {
        let parsed = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid upstream url `{base_url}`: {e}")))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| Error::Config(format!("upstream url `{base_url}` has no host")))?
            .to_owned();

        Ok(Self {
            credential: credential.filter(|c| !c.expose().trim().is_empty()),
            base_url: base_url.trim_end_matches('/').to_owned(),
            host,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_host(mut self, host: String) -> Self {
        self.host = host;
        self
    }

    pub fn credential(&self) -> Option<&Credential> { self.credential.as_ref() }
    pub fn host(&self) -> &str { &self.host }
    pub fn timeout(&self) -> Duration { self.timeout }

    /// `{base_url}/{endpoint}`.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "marquee",
            "--bind", "127.0.0.1:8080",
            "--api-key", "secret",
            "--upstream-url", "http://localhost:9000/",
            "--upstream-timeout-ms", "250",
            "--log-format", "json",
        ])
        .unwrap();

        assert_eq!(config.bind, "127.0.0.1:8080");
        assert_eq!(config.log_format, LogFormat::Json);

        let upstream = config.upstream().unwrap();
        assert_eq!(upstream.credential(), Some(&Credential::new("secret")));
        assert_eq!(upstream.host(), "localhost");
        assert_eq!(upstream.timeout(), Duration::from_millis(250));
        assert_eq!(upstream.endpoint_url("auto-complete"), "http://localhost:9000/auto-complete");
    }

    #[test]
    fn host_override() {
        let config = Config::try_parse_from([
            "marquee",
            "--upstream-url", "http://127.0.0.1:9000",
            "--upstream-host", "imdb8.p.rapidapi.com",
        ])
        .unwrap();
        assert_eq!(config.upstream().unwrap().host(), "imdb8.p.rapidapi.com");
    }

    #[test]
    fn default_upstream() {
        let upstream = UpstreamConfig::new(DEFAULT_UPSTREAM_URL, None).unwrap();
        assert_eq!(upstream.host(), "imdb8.p.rapidapi.com");
        assert_eq!(upstream.timeout(), Duration::from_secs(10));
        assert_eq!(
            upstream.endpoint_url("title/get-overview-details"),
            "https://imdb8.p.rapidapi.com/title/get-overview-details",
        );
    }

    #[test]
    fn blank_credential_is_absent() {
        let upstream = UpstreamConfig::new(DEFAULT_UPSTREAM_URL, Some(Credential::new("  "))).unwrap();
        assert!(upstream.credential().is_none());
    }

    #[test]
    fn rejects_bad_url() {
        assert!(matches!(UpstreamConfig::new("not a url", None), Err(Error::Config(_))));
    }

    #[test]
    fn credential_debug_is_redacted() {
        assert_eq!(format!("{:?}", Credential::new("secret")), "Credential(***)");
    }
}
