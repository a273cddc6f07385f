//! Hook generation inputs and parsed output.

use hookforge_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Maximum accepted topic length, in characters.
pub const TOPIC_MAX_CHARS: usize = 200;

/// Sampling temperature used when none is configured.
pub const DEFAULT_SAMPLING_TEMPERATURE: f32 = 0.8;

/// Trimmed, non-empty topic supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic(NonEmptyString);

impl Topic {
    /// Creates a validated topic.
    pub fn new(value: impl AsRef<str>) -> AppResult<Self> {
        let trimmed = value.as_ref().trim();
        let topic = NonEmptyString::new(trimmed).map_err(|_| {
            AppError::Validation("Missing topic. Provide a non-empty 'topic' string.".to_owned())
        })?;

        if trimmed.chars().count() > TOPIC_MAX_CHARS {
            return Err(AppError::Validation(format!(
                "topic must be at most {TOPIC_MAX_CHARS} characters"
            )));
        }

        Ok(Self(topic))
    }

    /// Returns the topic text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Renders the generation prompt for this topic.
    #[must_use]
    pub fn hook_prompt(&self) -> String {
        format!(
            "You are a social media virality expert. Generate 5 short, attention-grabbing video \
             hooks for a vertical video app (like TikTok or Reels). The hooks must be under 15 \
             words and related to the following topic: \"{}\". Format each hook on a new line.",
            self.as_str()
        )
    }
}

/// Sampling temperature accepted by the text generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingTemperature(f32);

impl SamplingTemperature {
    /// Creates a temperature in the inclusive range `0.0..=2.0`.
    pub fn new(value: f32) -> AppResult<Self> {
        if !(0.0..=2.0).contains(&value) {
            return Err(AppError::Validation(format!(
                "sampling temperature must be between 0.0 and 2.0, got {value}"
            )));
        }

        Ok(Self(value))
    }

    /// Returns the raw value.
    #[must_use]
    pub fn value(&self) -> f32 {
        self.0
    }
}

impl Default for SamplingTemperature {
    fn default() -> Self {
        Self(DEFAULT_SAMPLING_TEMPERATURE)
    }
}

/// Ordered hooks parsed from generated text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookList(Vec<String>);

impl HookList {
    /// Splits generated text into trimmed, non-empty lines.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(ToOwned::to_owned)
                .collect(),
        )
    }

    /// Returns the hooks in generation order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Returns whether no hooks were produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the list and returns the hooks.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}
