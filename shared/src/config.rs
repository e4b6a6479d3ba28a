use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_SCREENSHOT_LIMIT: usize = 100;
pub const MIN_SCREENSHOT_LIMIT: usize = 1;
pub const MAX_SCREENSHOT_LIMIT: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Most recent screenshots kept; older ones drop off the front.
    pub screenshot_limit: usize,
    /// Show a toast when the screenshot list cannot be fetched.
    pub surface_fetch_errors: bool,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            screenshot_limit: DEFAULT_SCREENSHOT_LIMIT,
            surface_fetch_errors: true,
        }
    }
}

impl ReviewConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_SCREENSHOT_LIMIT..=MAX_SCREENSHOT_LIMIT).contains(&self.screenshot_limit) {
            return Err(ConfigError::ScreenshotLimitOutOfRange {
                value: self.screenshot_limit,
                min: MIN_SCREENSHOT_LIMIT,
                max: MAX_SCREENSHOT_LIMIT,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ReviewConfig::default();
        assert_eq!(config.screenshot_limit, 100);
        assert!(config.surface_fetch_errors);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: ReviewConfig = serde_json::from_str(r#"{"screenshot_limit": 5}"#).unwrap();
        assert_eq!(config.screenshot_limit, 5);
        assert!(config.surface_fetch_errors);
    }

    #[test]
    fn zero_limit_rejected() {
        let config = ReviewConfig {
            screenshot_limit: 0,
            ..ReviewConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ScreenshotLimitOutOfRange { value: 0, .. })
        ));
    }
}
