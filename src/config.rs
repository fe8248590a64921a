//! Configuration for the blank-space engine.
//!
//! The detection, extraction and mutation stages are pure functions and need
//! no configuration. The few knobs that do exist (insert width, upload limit,
//! export glyph) live in [`EngineConfig`], built via its
//! [`EngineConfigBuilder`] so callers only set what they care about.

use crate::error::BlankFillError;
use serde::{Deserialize, Serialize};

/// Engine-wide settings used by ingest, insert and export.
///
/// # Example
/// ```rust
/// use blankfill::EngineConfig;
///
/// let config = EngineConfig::builder()
///     .insert_width(12)
///     .unfilled_char('.')
///     .build()
///     .unwrap();
/// assert_eq!(config.insert_width, 12);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Logical width of blanks created by Insert. Default: 10.
    pub insert_width: usize,

    /// Largest upload accepted by ingest, in bytes. Default: 10 MiB.
    pub max_upload_bytes: usize,

    /// Run the Pattern Detector over ingested markup. Default: true.
    ///
    /// Turn this off for markup that already carries blank-space markers
    /// and must not gain new ones.
    pub detect_on_ingest: bool,

    /// Glyph repeated `length` times for unfilled blanks in text and word
    /// exports. Default: `_`.
    pub unfilled_char: char,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            insert_width: 10,
            max_upload_bytes: 10 * 1024 * 1024,
            detect_on_ingest: true,
            unfilled_char: '_',
        }
    }
}

impl EngineConfig {
    /// Create a new builder for `EngineConfig`.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`EngineConfig`].
#[derive(Debug)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    pub fn insert_width(mut self, width: usize) -> Self {
        self.config.insert_width = width.max(1);
        self
    }

    pub fn max_upload_bytes(mut self, bytes: usize) -> Self {
        self.config.max_upload_bytes = bytes;
        self
    }

    pub fn detect_on_ingest(mut self, v: bool) -> Self {
        self.config.detect_on_ingest = v;
        self
    }

    pub fn unfilled_char(mut self, c: char) -> Self {
        self.config.unfilled_char = c;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<EngineConfig, BlankFillError> {
        let c = &self.config;
        if c.max_upload_bytes == 0 {
            return Err(BlankFillError::InvalidConfig(
                "Upload limit must be ≥ 1 byte".into(),
            ));
        }
        if c.unfilled_char.is_control() {
            return Err(BlankFillError::InvalidConfig(format!(
                "Unfilled glyph must be printable, got {:?}",
                c.unfilled_char
            )));
        }
        Ok(self.config)
    }
}
