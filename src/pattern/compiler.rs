// Mon Oct 19 2026 - Alex

use crate::pattern::{BytePattern, CombineOp, PatternError, PatternFlags, PatternKind, MASK_EXACT, MASK_WILDCARD};
use regex::bytes::RegexBuilder;

/// Turns pattern text into matchers.
///
/// Input is a pattern list: one pattern per line, blank lines ignored.
/// Line numbers in errors are 1-based positions in the original text.
#[derive(Debug, Clone)]
pub struct PatternCompiler {
    kind: PatternKind,
    flags: PatternFlags,
}

impl PatternCompiler {
    pub fn new(kind: PatternKind) -> Self {
        Self {
            kind,
            flags: PatternFlags::default(),
        }
    }

    pub fn case_sensitive(mut self, enabled: bool) -> Self {
        self.flags.case_sensitive = enabled;
        self
    }

    pub fn alignment(mut self, alignment: usize) -> Self {
        self.flags.alignment = alignment;
        self
    }

    pub fn compile(&self, source: &str) -> Result<Vec<BytePattern>, PatternError> {
        if self.flags.alignment == 0 {
            return Err(PatternError::InvalidAlignment(0));
        }

        let patterns = source
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| self.compile_line(line.trim(), i + 1))
            .collect::<Result<Vec<_>, _>>()?;

        if patterns.is_empty() {
            return Err(PatternError::Empty);
        }

        Ok(patterns)
    }

    /// Compiles a list and resolves how it is combined. `Single` keeps only
    /// the first pattern; `Or`/`And` over one pattern degrade to `Single`.
    pub fn compile_set(&self, source: &str, op: CombineOp) -> Result<PatternSet, PatternError> {
        let mut patterns = self.compile(source)?;

        let op = match op {
            CombineOp::Single if patterns.len() > 1 => {
                log::warn!(
                    "Single-pattern search given {} patterns, using the first",
                    patterns.len()
                );
                patterns.truncate(1);
                CombineOp::Single
            }
            _ if patterns.len() == 1 => CombineOp::Single,
            other => other,
        };

        Ok(PatternSet { patterns, op })
    }

    pub fn compile_line(&self, line: &str, line_no: usize) -> Result<BytePattern, PatternError> {
        match self.kind {
            PatternKind::Hex => self.compile_hex(line, line_no),
            PatternKind::Regex => self.compile_regex(line, line_no),
        }
    }

    fn compile_hex(&self, line: &str, line_no: usize) -> Result<BytePattern, PatternError> {
        let mut bytes = Vec::new();
        let mut mask = Vec::new();

        for token in line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
        {
            match token {
                "?" | "??" => {
                    bytes.push(0);
                    mask.push(MASK_WILDCARD);
                }
                _ => {
                    bytes.push(parse_hex_token(token, line_no)?);
                    mask.push(MASK_EXACT);
                }
            }
        }

        if bytes.is_empty() {
            return Err(PatternError::Empty);
        }
        if mask.iter().all(|&m| m == MASK_WILDCARD) {
            return Err(PatternError::AllWildcards(line_no));
        }

        BytePattern::hex(bytes, mask, line, self.flags)
    }

    fn compile_regex(&self, line: &str, line_no: usize) -> Result<BytePattern, PatternError> {
        let regex = RegexBuilder::new(line)
            .case_insensitive(!self.flags.case_sensitive)
            .unicode(false)
            .build()
            .map_err(|source| PatternError::Regex { line: line_no, source })?;

        Ok(BytePattern::regex(regex, line, self.flags))
    }
}

fn parse_hex_token(token: &str, line_no: usize) -> Result<u8, PatternError> {
    let syntax = |reason: &str| PatternError::Syntax {
        token: token.to_string(),
        line: line_no,
        reason: reason.to_string(),
    };

    if token.len() != 2 {
        return Err(syntax("expected two hex digits or '??'"));
    }
    if !token.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(syntax("non-hex character"));
    }
    u8::from_str_radix(token, 16).map_err(|_| syntax("non-hex character"))
}

/// Compiled patterns plus the resolved combine operation.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<BytePattern>,
    op: CombineOp,
}

impl PatternSet {
    pub fn patterns(&self) -> &[BytePattern] {
        &self.patterns
    }

    pub fn op(&self) -> CombineOp {
        self.op
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Matcher;

    #[test]
    fn test_hex_with_wildcards() {
        let compiler = PatternCompiler::new(PatternKind::Hex);
        let patterns = compiler.compile("00 01 02 ?? FF").unwrap();
        assert_eq!(patterns.len(), 1);

        match patterns[0].matcher() {
            Matcher::Hex { bytes, mask } => {
                assert_eq!(bytes, &vec![0x00, 0x01, 0x02, 0x00, 0xFF]);
                assert_eq!(mask, &vec![0xFF, 0xFF, 0xFF, 0x00, 0xFF]);
            }
            _ => panic!("expected hex matcher"),
        }
    }

    #[test]
    fn test_hex_commas_and_single_question_mark() {
        let compiler = PatternCompiler::new(PatternKind::Hex);
        let patterns = compiler.compile("ab,cd, ? ,EF").unwrap();
        assert_eq!(patterns[0].to_hex_string(), "AB CD ?? EF");
    }

    #[test]
    fn test_bad_token_reports_line() {
        let compiler = PatternCompiler::new(PatternKind::Hex);
        let err = compiler.compile("AB CD\n\n12 3G").unwrap_err();
        match err {
            PatternError::Syntax { token, line, .. } => {
                assert_eq!(token, "3G");
                assert_eq!(line, 3);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_wrong_length_and_sign_rejected() {
        let compiler = PatternCompiler::new(PatternKind::Hex);
        assert!(matches!(compiler.compile("ABC"), Err(PatternError::Syntax { .. })));
        assert!(matches!(compiler.compile("+1"), Err(PatternError::Syntax { .. })));
        assert!(matches!(compiler.compile("???"), Err(PatternError::Syntax { .. })));
    }

    #[test]
    fn test_all_wildcards_rejected() {
        let compiler = PatternCompiler::new(PatternKind::Hex);
        assert!(matches!(compiler.compile("?? ??"), Err(PatternError::AllWildcards(1))));
    }

    #[test]
    fn test_empty_source() {
        let compiler = PatternCompiler::new(PatternKind::Hex);
        assert!(matches!(compiler.compile("  \n\t\n"), Err(PatternError::Empty)));
    }

    #[test]
    fn test_zero_alignment_rejected() {
        let compiler = PatternCompiler::new(PatternKind::Hex).alignment(0);
        assert!(matches!(compiler.compile("AB"), Err(PatternError::InvalidAlignment(0))));
    }

    #[test]
    fn test_regex_error_wraps_diagnostic() {
        let compiler = PatternCompiler::new(PatternKind::Regex);
        let err = compiler.compile("ok\n(unclosed").unwrap_err();
        assert_eq!(err.line(), Some(2));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_regex_case_insensitive() {
        let compiler = PatternCompiler::new(PatternKind::Regex).case_sensitive(false);
        let patterns = compiler.compile("kirby").unwrap();
        assert_eq!(patterns[0].find_from(b"..KIRBY..", 0), Some((2, 7)));

        let strict = PatternCompiler::new(PatternKind::Regex).compile("kirby").unwrap();
        assert_eq!(strict[0].find_from(b"..KIRBY..", 0), None);
    }

    #[test]
    fn test_regex_matches_raw_bytes() {
        let compiler = PatternCompiler::new(PatternKind::Regex);
        let patterns = compiler.compile(r"\xFF\x00").unwrap();
        assert_eq!(patterns[0].find_from(&[0x10, 0xFF, 0x00], 0), Some((1, 3)));
    }

    #[test]
    fn test_set_resolves_op() {
        let compiler = PatternCompiler::new(PatternKind::Hex);

        let set = compiler.compile_set("AB\nCD", CombineOp::Single).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.op(), CombineOp::Single);

        let set = compiler.compile_set("AB", CombineOp::And).unwrap();
        assert_eq!(set.op(), CombineOp::Single);

        let set = compiler.compile_set("AB\nCD", CombineOp::Or).unwrap();
        assert_eq!(set.op(), CombineOp::Or);
        assert_eq!(set.len(), 2);
    }
}
