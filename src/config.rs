//! Process configuration
//!
//! Everything is read from the environment once at startup and handed to the
//! components that need it; nothing here is global.

use std::env;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

pub const DEFAULT_PORT: u16 = 3000;

/// Substrings that make a text message answer with the product list.
pub const DEFAULT_TRIGGERS: [&str; 3] = ["煤油暖爐", "大日", "Dainichi"];

const ACCESS_TOKEN_VAR: &str = "LINE_CHANNEL_ACCESS_TOKEN";
const CHANNEL_SECRET_VAR: &str = "LINE_CHANNEL_SECRET";

/// What a webhook batch does when one of its events fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchFailurePolicy {
    /// Failed events are reported in the response array, the rest still succeed.
    #[default]
    Isolate,
    /// Any failed event turns the whole batch into a 500 with an empty body.
    /// This is the all-or-nothing contract the bot originally shipped with.
    FailFast,
}

impl FromStr for BatchFailurePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "isolate" => Ok(Self::Isolate),
            "fail-fast" | "failfast" => Ok(Self::FailFast),
            other => Err(Error::Config(format!(
                "BATCH_FAILURE_POLICY must be `isolate` or `fail-fast`, got `{}`",
                other
            ))),
        }
    }
}

/// Channel access token. Debug output never shows the value.
#[derive(Clone)]
pub struct ChannelToken(String);

impl ChannelToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn from_env() -> Result<Self> {
        required(ACCESS_TOKEN_VAR).map(Self)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ChannelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ChannelToken(***)")
    }
}

/// Base URLs of the messaging platform.
#[derive(Debug, Clone)]
pub struct ApiEndpoints {
    pub api_base: String,
    /// Host used for binary uploads (rich-menu images).
    pub data_base: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            api_base: "https://api.line.me".to_string(),
            data_base: "https://api-data.line.me".to_string(),
        }
    }
}

/// Reply routing settings for the event handler.
#[derive(Debug, Clone)]
pub struct HandlerConfig {
    pub triggers: Vec<String>,
    pub batch_policy: BatchFailurePolicy,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            triggers: DEFAULT_TRIGGERS.iter().map(|t| t.to_string()).collect(),
            batch_policy: BatchFailurePolicy::default(),
        }
    }
}

#[derive(Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub access_token: ChannelToken,
    pub channel_secret: String,
    pub handler: HandlerConfig,
    pub endpoints: ApiEndpoints,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let access_token = ChannelToken::from_env()?;
        let channel_secret = required(CHANNEL_SECRET_VAR)?;

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| Error::Config(format!("PORT is not a valid port: `{}`", raw)))?,
            Err(_) => DEFAULT_PORT,
        };

        let mut handler = HandlerConfig::default();
        if let Ok(raw) = env::var("REPLY_TRIGGERS") {
            handler.triggers = triggers_from_env_value(&raw)?;
        }
        if let Ok(raw) = env::var("BATCH_FAILURE_POLICY") {
            handler.batch_policy = raw.parse()?;
        }

        Ok(Self {
            port,
            access_token,
            channel_secret,
            handler,
            endpoints: ApiEndpoints::default(),
        })
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("port", &self.port)
            .field("access_token", &self.access_token)
            .field("channel_secret", &"***")
            .field("handler", &self.handler)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

fn required(key: &str) -> Result<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::Config(format!("Missing env {}", key))),
    }
}

/// Comma-separated list, order kept, blank entries dropped.
pub fn parse_triggers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// `REPLY_TRIGGERS` that is set but names no trigger is a configuration error.
fn triggers_from_env_value(raw: &str) -> Result<Vec<String>> {
    let triggers = parse_triggers(raw);
    if triggers.is_empty() {
        return Err(Error::Config(format!(
            "REPLY_TRIGGERS is set but contains no trigger: `{}`",
            raw
        )));
    }
    Ok(triggers)
}
