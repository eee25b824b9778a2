// Mon Oct 19 2026 - Alex

use crate::pattern::SearchResult;
use crate::utils::is_aligned;
use bitflags::bitflags;

bitflags! {
    /// Which results pass on compression status.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CompressionFilter: u8 {
        const COMPRESSED = 0b01;
        const UNCOMPRESSED = 0b10;
    }
}

impl Default for CompressionFilter {
    fn default() -> Self {
        CompressionFilter::all()
    }
}

/// Accept/reject rules applied to every result before it is reported.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchFilter {
    pub min_size: usize,
    pub max_size: usize,
    pub min_tiles: usize,
    pub max_tiles: usize,
    pub alignment: usize,
    pub compression: CompressionFilter,
    pub confidence_threshold: f64,
}

impl SearchFilter {
    pub fn new() -> Self {
        Self {
            min_size: 0,
            max_size: usize::MAX,
            min_tiles: 0,
            max_tiles: usize::MAX,
            alignment: 1,
            compression: CompressionFilter::all(),
            confidence_threshold: 0.0,
        }
    }

    pub fn with_size_range(mut self, min: usize, max: usize) -> Self {
        self.min_size = min;
        self.max_size = max;
        self
    }

    pub fn with_tile_range(mut self, min: usize, max: usize) -> Self {
        self.min_tiles = min;
        self.max_tiles = max;
        self
    }

    pub fn with_alignment(mut self, alignment: usize) -> Self {
        self.alignment = alignment.max(1);
        self
    }

    pub fn with_compression(mut self, compression: CompressionFilter) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn accepts(&self, result: &SearchResult) -> bool {
        if result.size() < self.min_size || result.size() > self.max_size {
            return false;
        }
        if result.tile_count() < self.min_tiles || result.tile_count() > self.max_tiles {
            return false;
        }
        if !is_aligned(result.offset(), self.alignment) {
            return false;
        }

        let wanted = if result.is_compressed() {
            CompressionFilter::COMPRESSED
        } else {
            CompressionFilter::UNCOMPRESSED
        };
        if !self.compression.contains(wanted) {
            return false;
        }

        result.confidence() >= self.confidence_threshold
    }
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::PatternKind;

    fn result(offset: usize, size: usize) -> SearchResult {
        SearchResult::new(offset, size, "AB", PatternKind::Hex)
    }

    #[test]
    fn test_default_accepts_everything() {
        let filter = SearchFilter::default();
        assert!(filter.accepts(&result(3, 1)));
        assert!(filter.accepts(&result(0, 0x10000)));
    }

    #[test]
    fn test_size_and_tile_ranges() {
        let filter = SearchFilter::new().with_size_range(4, 8);
        assert!(!filter.accepts(&result(0, 3)));
        assert!(filter.accepts(&result(0, 4)));
        assert!(!filter.accepts(&result(0, 9)));

        let filter = SearchFilter::new().with_tile_range(2, 4);
        assert!(!filter.accepts(&result(0, 4)));
        assert!(filter.accepts(&result(0, 4).with_tile_count(3)));
    }

    #[test]
    fn test_alignment() {
        let filter = SearchFilter::new().with_alignment(0x20);
        assert!(filter.accepts(&result(0x40, 2)));
        assert!(!filter.accepts(&result(0x41, 2)));
    }

    #[test]
    fn test_compression_flags() {
        let packed = result(0, 64).with_compressed_size(20);
        let raw = result(0, 64);

        let only_raw = SearchFilter::new().with_compression(CompressionFilter::UNCOMPRESSED);
        assert!(only_raw.accepts(&raw));
        assert!(!only_raw.accepts(&packed));

        let none = SearchFilter::new().with_compression(CompressionFilter::empty());
        assert!(!none.accepts(&raw));
    }

    #[test]
    fn test_confidence_threshold() {
        let filter = SearchFilter::new().with_confidence_threshold(0.5);
        assert!(filter.accepts(&result(0, 1)));
        assert!(!filter.accepts(&result(0, 1).with_confidence(0.4)));
    }
}
