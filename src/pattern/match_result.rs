// Mon Oct 19 2026 - Alex

use crate::pattern::PatternKind;
use crate::utils::hex_string;
use serde::Serialize;

/// One pattern's hit inside an AND window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubMatch {
    pub pattern: String,
    pub offset: usize,
    pub size: usize,
    /// Decoded text for regex sub-matches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Per-mode payload attached to a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchDetail {
    PatternMatch,
    RegexMatch { decoded_text: String },
    AndMatch { sub_matches: Vec<SubMatch> },
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    offset: usize,
    size: usize,
    tile_count: usize,
    compressed_size: usize,
    confidence: f64,
    pattern: String,
    pattern_kind: PatternKind,
    context_start: usize,
    #[serde(serialize_with = "serialize_hex")]
    context: Vec<u8>,
    #[serde(serialize_with = "serialize_hex")]
    match_bytes: Vec<u8>,
    detail: MatchDetail,
}

fn serialize_hex<S: serde::Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex_string(data))
}

impl SearchResult {
    /// Pattern hits are raw and uncompressed, so `compressed_size == size`,
    /// one tile, full confidence.
    pub fn new(offset: usize, size: usize, pattern: &str, pattern_kind: PatternKind) -> Self {
        Self {
            offset,
            size,
            tile_count: 1,
            compressed_size: size,
            confidence: 1.0,
            pattern: pattern.to_string(),
            pattern_kind,
            context_start: offset,
            context: Vec::new(),
            match_bytes: Vec::new(),
            detail: MatchDetail::PatternMatch,
        }
    }

    pub fn with_context(mut self, start: usize, context: &[u8]) -> Self {
        self.context_start = start;
        self.context = context.to_vec();
        self
    }

    pub fn with_match_bytes(mut self, bytes: &[u8]) -> Self {
        self.match_bytes = bytes.to_vec();
        self
    }

    pub fn with_detail(mut self, detail: MatchDetail) -> Self {
        self.detail = detail;
        self
    }

    pub fn with_tile_count(mut self, tile_count: usize) -> Self {
        self.tile_count = tile_count;
        self
    }

    pub fn with_compressed_size(mut self, compressed_size: usize) -> Self {
        self.compressed_size = compressed_size;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn tile_count(&self) -> usize {
        self.tile_count
    }

    pub fn compressed_size(&self) -> usize {
        self.compressed_size
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed_size < self.size
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn pattern_kind(&self) -> PatternKind {
        self.pattern_kind
    }

    pub fn context_start(&self) -> usize {
        self.context_start
    }

    pub fn context(&self) -> &[u8] {
        &self.context
    }

    pub fn match_bytes(&self) -> &[u8] {
        &self.match_bytes
    }

    pub fn detail(&self) -> &MatchDetail {
        &self.detail
    }

    pub fn decoded_text(&self) -> Option<&str> {
        match &self.detail {
            MatchDetail::RegexMatch { decoded_text } => Some(decoded_text),
            _ => None,
        }
    }

    pub fn sub_matches(&self) -> &[SubMatch] {
        match &self.detail {
            MatchDetail::AndMatch { sub_matches } => sub_matches,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_raw_match() {
        let result = SearchResult::new(0x100, 5, "00 01", PatternKind::Hex);
        assert_eq!(result.tile_count(), 1);
        assert_eq!(result.compressed_size(), 5);
        assert!(!result.is_compressed());
        assert_eq!(result.confidence(), 1.0);
        assert_eq!(result.detail(), &MatchDetail::PatternMatch);
        assert!(result.sub_matches().is_empty());
    }

    #[test]
    fn test_serializes_tagged_detail() {
        let result = SearchResult::new(4, 2, "AB CD", PatternKind::Hex)
            .with_match_bytes(&[0xAB, 0xCD])
            .with_detail(MatchDetail::AndMatch {
                sub_matches: vec![SubMatch {
                    pattern: "AB CD".into(),
                    offset: 4,
                    size: 2,
                    text: None,
                }],
            });

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["match_bytes"], "abcd");
        assert_eq!(json["pattern_kind"], "hex");
        assert_eq!(json["detail"]["type"], "and_match");
        assert_eq!(json["detail"]["sub_matches"][0]["offset"], 4);
    }

    #[test]
    fn test_confidence_clamped() {
        let result = SearchResult::new(0, 1, "x", PatternKind::Regex).with_confidence(3.0);
        assert_eq!(result.confidence(), 1.0);
    }
}
