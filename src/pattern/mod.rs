// Mon Oct 19 2026 - Alex

pub mod combinator;
pub mod compiler;
pub mod error;
pub mod filter;
pub mod match_result;
pub mod pattern;
pub mod scanner;

pub use compiler::{PatternCompiler, PatternSet};
pub use error::PatternError;
pub use filter::{CompressionFilter, SearchFilter};
pub use match_result::{MatchDetail, SearchResult, SubMatch};
pub use pattern::{BytePattern, CombineOp, Matcher, PatternFlags, PatternKind, MASK_EXACT, MASK_WILDCARD};
pub use scanner::{ChunkedScanner, CollectingSink, ScanOptions, ScanOutcome, ScanSink, ScanSummary};

/// Compiles `source` and scans `data` in one step, collecting every result.
pub fn search_bytes(
    data: &[u8],
    source: &str,
    kind: PatternKind,
    op: CombineOp,
    options: ScanOptions,
) -> Result<Vec<SearchResult>, PatternError> {
    let set = PatternCompiler::new(kind).compile_set(source, op)?;
    let mut sink = CollectingSink::new();
    ChunkedScanner::new(options).scan(data, &set, &mut sink);
    Ok(sink.results)
}
