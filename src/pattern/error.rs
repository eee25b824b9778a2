// Mon Oct 19 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PatternError {
    #[error("Invalid token '{token}' on line {line}: {reason}")]
    Syntax {
        token: String,
        line: usize,
        reason: String,
    },
    #[error("Invalid regex on line {line}: {source}")]
    Regex {
        line: usize,
        #[source]
        source: regex::Error,
    },
    #[error("Pattern on line {0} has no fixed bytes")]
    AllWildcards(usize),
    #[error("No patterns specified")]
    Empty,
    #[error("Invalid alignment: {0}")]
    InvalidAlignment(usize),
    #[error("Pattern has {bytes} bytes but {mask} mask entries")]
    MaskLength { bytes: usize, mask: usize },
}

impl PatternError {
    /// 1-based line of the offending pattern, when there is one.
    pub fn line(&self) -> Option<usize> {
        match self {
            PatternError::Syntax { line, .. } => Some(*line),
            PatternError::Regex { line, .. } => Some(*line),
            PatternError::AllWildcards(line) => Some(*line),
            PatternError::Empty | PatternError::InvalidAlignment(_) | PatternError::MaskLength { .. } => None,
        }
    }
}
