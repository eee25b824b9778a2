// Mon Oct 19 2026 - Alex

use crate::pattern::PatternError;
use itertools::Itertools;
use regex::bytes::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MASK_EXACT: u8 = 0xFF;
pub const MASK_WILDCARD: u8 = 0x00;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    #[default]
    Hex,
    Regex,
}

impl PatternKind {
    pub fn name(&self) -> &'static str {
        match self {
            PatternKind::Hex => "hex",
            PatternKind::Regex => "regex",
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombineOp {
    #[default]
    Single,
    Or,
    And,
}

impl fmt::Display for CombineOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombineOp::Single => write!(f, "single"),
            CombineOp::Or => write!(f, "or"),
            CombineOp::And => write!(f, "and"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternFlags {
    pub case_sensitive: bool,
    pub alignment: usize,
}

impl Default for PatternFlags {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            alignment: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Matcher {
    /// `bytes[i]` is zero wherever `mask[i]` is a wildcard, so a position
    /// matches when `data[i] & mask[i] == bytes[i]`.
    Hex { bytes: Vec<u8>, mask: Vec<u8> },
    Regex(Regex),
}

/// A compiled pattern. Immutable once built by the compiler.
#[derive(Debug, Clone)]
pub struct BytePattern {
    matcher: Matcher,
    text: String,
    flags: PatternFlags,
}

impl BytePattern {
    pub fn hex(bytes: Vec<u8>, mask: Vec<u8>, text: &str, flags: PatternFlags) -> Result<Self, PatternError> {
        if bytes.len() != mask.len() {
            return Err(PatternError::MaskLength {
                bytes: bytes.len(),
                mask: mask.len(),
            });
        }
        let bytes = bytes.iter().zip(mask.iter()).map(|(b, m)| b & m).collect();
        Ok(Self {
            matcher: Matcher::Hex { bytes, mask },
            text: text.to_string(),
            flags,
        })
    }

    pub fn regex(regex: Regex, text: &str, flags: PatternFlags) -> Self {
        Self {
            matcher: Matcher::Regex(regex),
            text: text.to_string(),
            flags,
        }
    }

    pub fn kind(&self) -> PatternKind {
        match self.matcher {
            Matcher::Hex { .. } => PatternKind::Hex,
            Matcher::Regex(_) => PatternKind::Regex,
        }
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn flags(&self) -> PatternFlags {
        self.flags
    }

    pub fn alignment(&self) -> usize {
        self.flags.alignment.max(1)
    }

    /// Byte length for hex patterns; `None` for regex.
    pub fn fixed_len(&self) -> Option<usize> {
        match self.matcher {
            Matcher::Hex { ref bytes, .. } => Some(bytes.len()),
            Matcher::Regex(_) => None,
        }
    }

    /// Hex match at `offset`. Always false for regex patterns and for
    /// positions where the pattern would run off the end of `data`.
    pub fn matches_at(&self, data: &[u8], offset: usize) -> bool {
        let Matcher::Hex { ref bytes, ref mask } = self.matcher else {
            return false;
        };
        let Some(window) = offset
            .checked_add(bytes.len())
            .and_then(|end| data.get(offset..end))
        else {
            return false;
        };
        window
            .iter()
            .zip(mask.iter())
            .zip(bytes.iter())
            .all(|((&d, &m), &b)| d & m == b)
    }

    /// First match starting at or after `from`, as `(start, end)`.
    /// Hex patterns report every position, overlapping or not.
    pub fn find_from(&self, data: &[u8], from: usize) -> Option<(usize, usize)> {
        match self.matcher {
            Matcher::Hex { ref bytes, .. } => {
                let len = bytes.len();
                if len == 0 || data.len() < len {
                    return None;
                }
                (from..=data.len() - len)
                    .find(|&i| self.matches_at(data, i))
                    .map(|i| (i, i + len))
            }
            Matcher::Regex(ref re) => {
                if from > data.len() {
                    return None;
                }
                let mut pos = from;
                while let Some(m) = re.find_at(data, pos) {
                    if !m.is_empty() {
                        return Some((m.start(), m.end()));
                    }
                    pos = m.end() + 1;
                    if pos > data.len() {
                        break;
                    }
                }
                None
            }
        }
    }

    pub fn to_hex_string(&self) -> String {
        match self.matcher {
            Matcher::Hex { ref bytes, ref mask } => bytes
                .iter()
                .zip(mask.iter())
                .map(|(b, &m)| {
                    if m == MASK_EXACT {
                        format!("{:02X}", b)
                    } else {
                        "??".to_string()
                    }
                })
                .join(" "),
            Matcher::Regex(ref re) => re.as_str().to_string(),
        }
    }
}

impl fmt::Display for BytePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind(), self.to_hex_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(bytes: &[u8], mask: &[u8]) -> BytePattern {
        BytePattern::hex(bytes.to_vec(), mask.to_vec(), "test", PatternFlags::default()).unwrap()
    }

    #[test]
    fn test_wildcard_position_ignored() {
        let pattern = hex(&[0x00, 0x01, 0x02, 0x00, 0xFF], &[0xFF, 0xFF, 0xFF, 0x00, 0xFF]);
        for value in 0..=255u8 {
            assert!(pattern.matches_at(&[0x00, 0x01, 0x02, value, 0xFF], 0));
        }
        assert!(!pattern.matches_at(&[0x00, 0x01, 0x03, 0x7E, 0xFF], 0));
        assert!(!pattern.matches_at(&[0x00, 0x01, 0x02, 0x7E, 0xFE], 0));
    }

    #[test]
    fn test_matches_at_end_of_data() {
        let pattern = hex(&[0xAB, 0xCD], &[0xFF, 0xFF]);
        assert!(pattern.matches_at(&[0x00, 0xAB, 0xCD], 1));
        assert!(!pattern.matches_at(&[0x00, 0xAB, 0xCD], 2));
        assert!(!pattern.matches_at(&[0x00, 0xAB, 0xCD], usize::MAX));
    }

    #[test]
    fn test_hex_rejects_mismatched_mask() {
        let err = BytePattern::hex(vec![0xAB, 0xCD], vec![0xFF], "AB CD", PatternFlags::default()).unwrap_err();
        assert!(matches!(err, PatternError::MaskLength { bytes: 2, mask: 1 }));
        assert_eq!(err.line(), None);
    }

    #[test]
    fn test_find_from_regex_skips_empty() {
        let re = Regex::new("A*").unwrap();
        let pattern = BytePattern::regex(re, "A*", PatternFlags::default());
        assert_eq!(pattern.find_from(b"xxAAy", 0), Some((2, 4)));
        assert_eq!(pattern.find_from(b"xxAAy", 4), None);
    }

    #[test]
    fn test_to_hex_string() {
        let pattern = hex(&[0x12, 0x99, 0xFF], &[0xFF, 0x00, 0xFF]);
        assert_eq!(pattern.to_hex_string(), "12 ?? FF");
        assert_eq!(pattern.kind(), PatternKind::Hex);
        assert_eq!(pattern.fixed_len(), Some(3));
    }
}
