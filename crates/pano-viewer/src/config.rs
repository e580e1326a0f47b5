//! Viewer configuration
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//!
//! ```toml
//! thumbnail_cap = 8
//!
//! [loader]
//! viewpoint_timeout_ms = 10000
//! flicker_hold_ms = 200
//!
//! [loader.policy]
//! medium_concurrency = 3
//! full_ring_on_high = true
//!
//! [loader.thresholds]
//! cardinal_min_coverage = 75.0
//! ```

use pano_loader::LoaderConfig;
use pano_navigator::DEFAULT_THUMBNAIL_CAP;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// Accepted per-viewpoint timeout range
pub const VIEWPOINT_TIMEOUT_RANGE_MS: RangeInclusive<u64> = 8_000..=15_000;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Not valid TOML for this schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Parsed but out of range
    #[error("{field}: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

/// Viewer tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Loader, policy and classifier tuning
    pub loader: LoaderConfig,
    /// Thumbnails shown in the grid
    pub thumbnail_cap: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            loader: LoaderConfig::default(),
            thumbnail_cap: DEFAULT_THUMBNAIL_CAP,
        }
    }
}

impl ViewerConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With loader configuration
    #[inline]
    #[must_use]
    pub fn with_loader(mut self, loader: LoaderConfig) -> Self {
        self.loader = loader;
        self
    }

    /// With thumbnail cap
    #[inline]
    #[must_use]
    pub fn with_thumbnail_cap(mut self, cap: usize) -> Self {
        self.thumbnail_cap = cap;
        self
    }

    /// Parse and validate TOML
    ///
    /// # Errors
    /// `ConfigError::Parse` or `ConfigError::Invalid`
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// `ConfigError::Io` when the file cannot be read, else as [`Self::from_toml_str`]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.display(), "loaded viewer config");
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// `ConfigError::Invalid` naming the first offending field
    pub fn validate(&self) -> Result<(), ConfigError> {
        let timeout = self.loader.viewpoint_timeout_ms;
        if !VIEWPOINT_TIMEOUT_RANGE_MS.contains(&timeout) {
            return Err(ConfigError::Invalid {
                field: "loader.viewpoint_timeout_ms",
                reason: format!(
                    "{timeout} outside {}..={}",
                    VIEWPOINT_TIMEOUT_RANGE_MS.start(),
                    VIEWPOINT_TIMEOUT_RANGE_MS.end()
                ),
            });
        }
        if self.thumbnail_cap == 0 {
            return Err(ConfigError::Invalid {
                field: "thumbnail_cap",
                reason: "must be at least 1".to_string(),
            });
        }
        let thresholds = &self.loader.thresholds;
        for (field, value) in [
            ("loader.thresholds.cardinal_min_coverage", thresholds.cardinal_min_coverage),
            ("loader.thresholds.smart_min_coverage", thresholds.smart_min_coverage),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{value} is not a percentage"),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_default() {
        let config = ViewerConfig::from_toml_str("").unwrap();
        assert_eq!(config.thumbnail_cap, 8);
        assert_eq!(config.loader.viewpoint_timeout_ms, 10_000);
        assert_eq!(config.loader.policy.medium_concurrency, 2);
    }

    #[test]
    fn nested_tables_override() {
        let config = ViewerConfig::from_toml_str(
            r"
            thumbnail_cap = 4

            [loader]
            flicker_hold_ms = 50

            [loader.policy]
            medium_concurrency = 3
            full_ring_on_high = true

            [loader.thresholds]
            smart_min_coverage = 50.0
            ",
        )
        .unwrap();
        assert_eq!(config.thumbnail_cap, 4);
        assert_eq!(config.loader.flicker_hold_ms, 50);
        assert_eq!(config.loader.policy.medium_concurrency, 3);
        assert!(config.loader.policy.full_ring_on_high);
        assert!((config.loader.thresholds.smart_min_coverage - 50.0).abs() < f64::EPSILON);
        assert!((config.loader.thresholds.cardinal_min_coverage - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_out_of_range_timeout() {
        let err = ViewerConfig::from_toml_str("[loader]\nviewpoint_timeout_ms = 500").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "loader.viewpoint_timeout_ms",
                ..
            }
        ));
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(
            ViewerConfig::from_toml_str("thumbnail_cap = \"many\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ViewerConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }
}
