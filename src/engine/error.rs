// Mon Oct 19 2026 - Alex

use crate::memory::MemoryError;
use crate::pattern::PatternError;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error(transparent)]
    Memory(#[from] MemoryError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Search cancelled")]
    Cancelled,
    #[error("Timed out waiting for {0}")]
    Timeout(String),
}

/// Coarse error categories reported to controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    PatternSyntax,
    Io,
    Cancelled,
    Timeout,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::PatternSyntax => "pattern syntax",
            ErrorKind::Io => "i/o",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Timeout => "timeout",
        };
        f.write_str(name)
    }
}

impl SearchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SearchError::Pattern(PatternError::InvalidAlignment(_) | PatternError::MaskLength { .. }) => {
                ErrorKind::InvalidInput
            }
            SearchError::Pattern(_) => ErrorKind::PatternSyntax,
            SearchError::Memory(MemoryError::InvalidInput(_)) => ErrorKind::InvalidInput,
            SearchError::Memory(_) => ErrorKind::Io,
            SearchError::InvalidInput(_) => ErrorKind::InvalidInput,
            SearchError::Cancelled => ErrorKind::Cancelled,
            SearchError::Timeout(_) => ErrorKind::Timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let err: SearchError = PatternError::Empty.into();
        assert_eq!(err.kind(), ErrorKind::PatternSyntax);

        let err: SearchError = PatternError::InvalidAlignment(0).into();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: SearchError = MemoryError::Io(io).into();
        assert_eq!(err.kind(), ErrorKind::Io);

        assert_eq!(SearchError::Cancelled.kind(), ErrorKind::Cancelled);
    }
}
