// Mon Oct 19 2026 - Alex

use crate::engine::mailbox::DEFAULT_PROMPT_TIMEOUT;
use crate::pattern::scanner::{
    DEFAULT_AND_WINDOW, DEFAULT_CHUNK_SIZE, DEFAULT_CONTEXT_BYTES, DEFAULT_MAX_RESULTS, DEFAULT_REGEX_OVERLAP,
};
use crate::pattern::{CombineOp, CompressionFilter, PatternKind, ScanOptions, SearchFilter};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Pattern list, one pattern per line.
    pub pattern: Option<String>,
    pub pattern_kind: PatternKind,
    pub combine_op: CombineOp,
    pub case_sensitive: bool,
    pub alignment: usize,
    pub context_bytes: usize,
    /// Zero disables the cap.
    pub max_results: usize,
    pub chunk_size: usize,
    pub regex_overlap: usize,
    pub and_window: usize,
    pub prompt_timeout_secs: u64,
    pub filter: FilterConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub min_size: usize,
    pub max_size: Option<usize>,
    pub min_tiles: usize,
    pub max_tiles: Option<usize>,
    pub alignment: usize,
    pub include_compressed: bool,
    pub include_uncompressed: bool,
    pub confidence_threshold: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_size: 0,
            max_size: None,
            min_tiles: 0,
            max_tiles: None,
            alignment: 1,
            include_compressed: true,
            include_uncompressed: true,
            confidence_threshold: 0.0,
        }
    }
}

impl FilterConfig {
    pub fn to_filter(&self) -> SearchFilter {
        let mut compression = CompressionFilter::empty();
        compression.set(CompressionFilter::COMPRESSED, self.include_compressed);
        compression.set(CompressionFilter::UNCOMPRESSED, self.include_uncompressed);

        SearchFilter::new()
            .with_size_range(self.min_size, self.max_size.unwrap_or(usize::MAX))
            .with_tile_range(self.min_tiles, self.max_tiles.unwrap_or(usize::MAX))
            .with_alignment(self.alignment)
            .with_compression(compression)
            .with_confidence_threshold(self.confidence_threshold)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            pattern: None,
            pattern_kind: PatternKind::Hex,
            combine_op: CombineOp::Single,
            case_sensitive: true,
            alignment: 1,
            context_bytes: DEFAULT_CONTEXT_BYTES,
            max_results: DEFAULT_MAX_RESULTS,
            chunk_size: DEFAULT_CHUNK_SIZE,
            regex_overlap: DEFAULT_REGEX_OVERLAP,
            and_window: DEFAULT_AND_WINDOW,
            prompt_timeout_secs: DEFAULT_PROMPT_TIMEOUT.as_secs(),
            filter: FilterConfig::default(),
        }
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate().map_err(ConfigError::Invalid)?;
        log::debug!("Loaded search config from {}", path.display());
        Ok(config)
    }

    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.pattern = Some(pattern.to_string());
        self
    }

    pub fn with_pattern_kind(mut self, kind: PatternKind) -> Self {
        self.pattern_kind = kind;
        self
    }

    pub fn with_combine_op(mut self, op: CombineOp) -> Self {
        self.combine_op = op;
        self
    }

    pub fn with_case_sensitive(mut self, enabled: bool) -> Self {
        self.case_sensitive = enabled;
        self
    }

    pub fn with_alignment(mut self, alignment: usize) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_context_bytes(mut self, bytes: usize) -> Self {
        self.context_bytes = bytes;
        self
    }

    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }

    pub fn with_prompt_timeout(mut self, timeout: Duration) -> Self {
        self.prompt_timeout_secs = timeout.as_secs();
        self
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions::new()
            .with_chunk_size(self.chunk_size)
            .with_overlap(self.regex_overlap)
            .with_context_bytes(self.context_bytes)
            .with_max_results(self.max_results)
            .with_and_window(self.and_window)
    }

    pub fn prompt_timeout(&self) -> Duration {
        Duration::from_secs(self.prompt_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.alignment == 0 {
            return Err("alignment must be greater than 0".to_string());
        }
        if self.chunk_size == 0 {
            return Err("chunk_size must be greater than 0".to_string());
        }
        if self.and_window == 0 {
            return Err("and_window must be greater than 0".to_string());
        }
        if self.filter.alignment == 0 {
            return Err("filter.alignment must be greater than 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.filter.confidence_threshold) {
            return Err("filter.confidence_threshold must be between 0.0 and 1.0".to_string());
        }
        if let Some(max) = self.filter.max_size {
            if max < self.filter.min_size {
                return Err("filter.max_size must not be below filter.min_size".to_string());
            }
        }
        if let Some(max) = self.filter.max_tiles {
            if max < self.filter.min_tiles {
                return Err("filter.max_tiles must not be below filter.min_tiles".to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_validate() {
        let config = SearchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scan_options(), ScanOptions::default());
        assert_eq!(config.prompt_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_validate_rejects_zero_alignment() {
        assert!(SearchConfig::new().with_alignment(0).validate().is_err());
    }

    #[test]
    fn test_load_partial_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "pattern": "AB CD", "pattern_kind": "regex", "combine_op": "and",
                 "filter": {{ "include_compressed": false }} }}"#
        )
        .unwrap();

        let config = SearchConfig::load(file.path()).unwrap();
        assert_eq!(config.pattern.as_deref(), Some("AB CD"));
        assert_eq!(config.pattern_kind, PatternKind::Regex);
        assert_eq!(config.combine_op, CombineOp::And);
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);

        let filter = config.filter.to_filter();
        assert_eq!(filter.compression, CompressionFilter::UNCOMPRESSED);
    }

    #[test]
    fn test_load_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "chunk_size": 0 }}"#).unwrap();
        assert!(matches!(SearchConfig::load(file.path()), Err(ConfigError::Invalid(_))));
    }
}
