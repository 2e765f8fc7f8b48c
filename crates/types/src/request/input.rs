use crate::request::{ModelKind, RequestError};
use serde::{Deserialize, Serialize};
use snowy_constants::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};

const fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

const fn default_max_tokens() -> u64 {
    DEFAULT_MAX_TOKENS as u64
}

/// The caller supplied part of a generation request.
///
/// Fields are kept loosely typed so that requests assembled from untrusted
/// text (CLI flags, JSON bodies) go through one validation step before
/// anything is hashed or signed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateInput {
    /// Model name, one of the [`ModelKind`] wire names.
    pub model: String,
    /// The prompt. Must not be empty.
    pub prompt: String,
    /// Sampling temperature. Must be finite.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Maximum number of tokens to generate. Must fit in 32 bits.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u64,
    /// Request time in unix milliseconds. Defaults to the current time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl GenerateInput {
    /// Create an input with default temperature and token limit.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timestamp: None,
        }
    }

    /// Set the temperature.
    pub const fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the token limit.
    pub const fn with_max_tokens(mut self, max_tokens: u64) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Pin the request timestamp, in unix milliseconds.
    pub const fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Validate the input, filling in the timestamp with `now_millis` if it
    /// is absent.
    pub(crate) fn validate(&self, now_millis: i64) -> Result<ValidatedInput, RequestError> {
        let model = self
            .model
            .parse::<ModelKind>()
            .map_err(|e| RequestError::invalid_input("model", e.to_string()))?;

        if self.prompt.is_empty() {
            return Err(RequestError::invalid_input("prompt", "must not be empty"));
        }

        if !self.temperature.is_finite() {
            return Err(RequestError::invalid_input("temperature", "must be a finite number"));
        }

        let max_tokens = u32::try_from(self.max_tokens)
            .map_err(|_| RequestError::invalid_input("maxTokens", "must fit in 32 bits"))?;

        Ok(ValidatedInput {
            model,
            prompt: self.prompt.clone(),
            temperature: self.temperature,
            max_tokens,
            timestamp: self.timestamp.unwrap_or(now_millis),
        })
    }
}

/// A [`GenerateInput`] that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ValidatedInput {
    pub(crate) model: ModelKind,
    pub(crate) prompt: String,
    pub(crate) temperature: f64,
    pub(crate) max_tokens: u32,
    pub(crate) timestamp: i64,
}
