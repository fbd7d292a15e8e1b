//! Scrape configuration read from the host's XML input envelope.
//!
//! The host writes a document like the one below to stdin. Parameters are
//! looked up by name across every stanza.
//!
//! ```xml
//! <input>
//!   <server_host>myhost</server_host>
//!   <configuration>
//!     <stanza name="prometheus://node">
//!       <param name="URI">http://localhost:9100/metrics</param>
//!       <param name="match">{job="node"},{job="api"}</param>
//!     </stanza>
//!   </configuration>
//! </input>
//! ```

use std::io::{self, Read};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration")]
    Read(#[from] io::Error),
    #[error("malformed configuration envelope")]
    Envelope(#[from] quick_xml::DeError),
    #[error("configuration has no URI parameter")]
    MissingUri,
    #[error("invalid timeout {0:?}, expected a positive number of seconds")]
    InvalidTimeout(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeConfig {
    pub uri: String,
    pub match_expressions: Vec<String>,
    pub insecure_skip_verify: bool,
    pub timeout: Duration,
    // Forwarded to the host untouched.
    pub index: Option<String>,
    pub sourcetype: Option<String>,
    pub host: Option<String>,
}

impl ScrapeConfig {
    pub fn new(uri: impl Into<String>) -> Self {
        ScrapeConfig {
            uri: uri.into(),
            match_expressions: Vec::new(),
            insecure_skip_verify: false,
            timeout: DEFAULT_TIMEOUT,
            index: None,
            sourcetype: None,
            host: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct Input {
    #[serde(default)]
    configuration: Configuration,
}

#[derive(Debug, Default, Deserialize)]
struct Configuration {
    #[serde(default, rename = "stanza")]
    stanzas: Vec<Stanza>,
}

#[derive(Debug, Deserialize)]
struct Stanza {
    #[serde(rename = "@name", default)]
    name: String,
    #[serde(default, rename = "param")]
    params: Vec<Param>,
}

#[derive(Debug, Deserialize)]
struct Param {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "$text", default)]
    value: String,
}

pub fn from_reader(mut reader: impl Read) -> Result<ScrapeConfig, ConfigError> {
    let mut envelope = String::new();
    reader.read_to_string(&mut envelope)?;
    resolve(&envelope)
}

pub fn resolve(envelope: &str) -> Result<ScrapeConfig, ConfigError> {
    let input: Input = quick_xml::de::from_str(envelope)?;

    let mut uri = None;
    let mut config = ScrapeConfig::new(String::new());
    for stanza in &input.configuration.stanzas {
        log::debug!("Reading stanza {:?}", stanza.name);
        for param in &stanza.params {
            let value = param.value.trim();
            match param.name.as_str() {
                "URI" => uri = Some(value.to_string()).filter(|u| !u.is_empty()),
                "match" => config.match_expressions.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|m| !m.is_empty())
                        .map(String::from),
                ),
                "insecureSkipVerify" => {
                    config.insecure_skip_verify = parse_bool(value).unwrap_or_else(|| {
                        log::warn!("Ignoring insecureSkipVerify={value:?}, not a boolean");
                        false
                    })
                }
                "timeout" => config.timeout = parse_timeout(value)?,
                "index" => config.index = non_empty(value),
                "sourcetype" => config.sourcetype = non_empty(value),
                "host" => config.host = non_empty(value),
                other => log::debug!("Ignoring unknown parameter {other:?}"),
            }
        }
    }

    config.uri = uri.ok_or(ConfigError::MissingUri)?;
    Ok(config)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout(value.to_string())),
    }
}

fn non_empty(value: &str) -> Option<String> {
    Some(value.to_string()).filter(|v| !v.is_empty())
}
