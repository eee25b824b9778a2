// Mon Oct 19 2026 - Alex

use crate::memory::{ByteSource, ByteView};
use crate::pattern::combinator;
use crate::pattern::{BytePattern, CombineOp, MatchDetail, PatternSet, SearchResult};
use crate::utils::{align_up, escape_bytes};

pub const DEFAULT_CHUNK_SIZE: usize = 0x10000;
pub const DEFAULT_REGEX_OVERLAP: usize = 1024;
pub const DEFAULT_CONTEXT_BYTES: usize = 16;
pub const DEFAULT_MAX_RESULTS: usize = 1000;
pub const DEFAULT_AND_WINDOW: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    pub chunk_size: usize,
    pub overlap: usize,
    pub context_bytes: usize,
    /// Zero means unlimited.
    pub max_results: usize,
    pub and_window: usize,
}

impl ScanOptions {
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_REGEX_OVERLAP,
            context_bytes: DEFAULT_CONTEXT_BYTES,
            max_results: DEFAULT_MAX_RESULTS,
            and_window: DEFAULT_AND_WINDOW,
        }
    }

    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    pub fn with_overlap(mut self, overlap: usize) -> Self {
        self.overlap = overlap;
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

    pub fn with_and_window(mut self, window: usize) -> Self {
        self.and_window = window.max(1);
        self
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiver for everything a scan produces.
pub trait ScanSink {
    fn is_cancelled(&self) -> bool;

    fn progress(&mut self, current: usize, total: usize);

    /// Offers a result. Returns `false` when the sink rejected it, in which
    /// case it does not count toward `max_results`.
    fn result(&mut self, result: SearchResult) -> bool;

    /// Called once `accepted` results hit the cap. Returning `true` grants
    /// another `max_results` worth of results instead of stopping.
    fn limit_reached(&mut self, _accepted: usize) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    Completed,
    LimitReached,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    pub outcome: ScanOutcome,
    pub results: usize,
    pub bytes_scanned: usize,
}

/// In-memory sink that keeps every result it is offered.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub results: Vec<SearchResult>,
    pub progress: Vec<(usize, usize)>,
    cancel_after: Option<usize>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports cancellation once `count` results have been collected.
    pub fn cancel_after(mut self, count: usize) -> Self {
        self.cancel_after = Some(count);
        self
    }
}

impl ScanSink for CollectingSink {
    fn is_cancelled(&self) -> bool {
        self.cancel_after
            .map(|limit| self.results.len() >= limit)
            .unwrap_or(false)
    }

    fn progress(&mut self, current: usize, total: usize) {
        self.progress.push((current, total));
    }

    fn result(&mut self, result: SearchResult) -> bool {
        self.results.push(result);
        true
    }
}

/// Wraps a sink with the result cap and progress bookkeeping shared by
/// every scan mode.
pub(crate) struct Emitter<'a> {
    sink: &'a mut dyn ScanSink,
    accepted: usize,
    max_results: usize,
    limit: usize,
    scanned: usize,
}

impl<'a> Emitter<'a> {
    pub(crate) fn new(sink: &'a mut dyn ScanSink, max_results: usize) -> Self {
        Self {
            sink,
            accepted: 0,
            max_results,
            limit: max_results,
            scanned: 0,
        }
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.sink.is_cancelled()
    }

    pub(crate) fn progress(&mut self, current: usize, total: usize) {
        self.scanned = current;
        self.sink.progress(current, total);
    }

    /// `Some` when the scan has to stop after this result.
    pub(crate) fn emit(&mut self, result: SearchResult) -> Option<ScanOutcome> {
        if self.sink.result(result) {
            self.accepted += 1;
            if self.limit > 0 && self.accepted >= self.limit {
                if self.sink.limit_reached(self.accepted) {
                    self.limit = self.accepted + self.max_results;
                } else {
                    return Some(ScanOutcome::LimitReached);
                }
            }
        }
        None
    }

    pub(crate) fn finish(self, outcome: ScanOutcome) -> ScanSummary {
        match outcome {
            ScanOutcome::Completed => log::debug!("Scan completed with {} results", self.accepted),
            ScanOutcome::LimitReached => log::info!("Result limit of {} reached", self.limit),
            ScanOutcome::Cancelled => log::info!("Scan cancelled after {} bytes", self.scanned),
        }
        ScanSummary {
            outcome,
            results: self.accepted,
            bytes_scanned: self.scanned,
        }
    }
}

/// Per-pattern position carried from one chunk to the next. For hex it is
/// the next candidate start, for regex the end of the last accepted match
/// (or the start of a match deferred to the next chunk).
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PatternCursor {
    next: usize,
}

impl PatternCursor {
    pub(crate) fn at(offset: usize) -> Self {
        Self { next: offset }
    }
}

/// Streams a byte image in fixed-size chunks.
#[derive(Debug, Clone, Default)]
pub struct ChunkedScanner {
    options: ScanOptions,
}

impl ChunkedScanner {
    pub fn new(options: ScanOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    pub fn scan_source(
        &self,
        source: &dyn ByteSource,
        from: usize,
        set: &PatternSet,
        sink: &mut dyn ScanSink,
    ) -> ScanSummary {
        log::debug!("Scanning {} from {:#x} ({} bytes)", source.label(), from, source.len());
        self.scan_from(source.bytes(), from, set, sink)
    }

    pub fn scan(&self, data: &[u8], set: &PatternSet, sink: &mut dyn ScanSink) -> ScanSummary {
        self.scan_from(data, 0, set, sink)
    }

    /// Scans `data[from..]`. Offsets and context windows stay absolute.
    pub fn scan_from(&self, data: &[u8], from: usize, set: &PatternSet, sink: &mut dyn ScanSink) -> ScanSummary {
        let mut emitter = Emitter::new(sink, self.options.max_results);
        let outcome = match set.op() {
            CombineOp::Single | CombineOp::Or => combinator::scan_any(self, data, from, set.patterns(), &mut emitter),
            CombineOp::And => combinator::scan_all(self, data, from, set.patterns(), &mut emitter),
        };
        emitter.finish(outcome)
    }

    /// Chunk boundaries `[start, end)` covering `from..total`.
    pub(crate) fn chunks(&self, from: usize, total: usize) -> impl Iterator<Item = (usize, usize)> {
        let size = self.options.chunk_size.max(1);
        (from..total).step_by(size).map(move |start| (start, start.saturating_add(size).min(total)))
    }

    pub(crate) fn scan_chunk(
        &self,
        data: &[u8],
        pattern: &BytePattern,
        cursor: &mut PatternCursor,
        chunk: (usize, usize),
        emitter: &mut Emitter<'_>,
    ) -> Option<ScanOutcome> {
        match pattern.fixed_len() {
            Some(len) => self.scan_hex_chunk(data, pattern, len, cursor, chunk, emitter),
            None => self.scan_regex_chunk(data, pattern, cursor, chunk, emitter),
        }
    }

    /// Candidate starts lie in `[chunk_start, chunk_end)`; the compare may
    /// read past `chunk_end`.
    fn scan_hex_chunk(
        &self,
        data: &[u8],
        pattern: &BytePattern,
        len: usize,
        cursor: &mut PatternCursor,
        (chunk_start, chunk_end): (usize, usize),
        emitter: &mut Emitter<'_>,
    ) -> Option<ScanOutcome> {
        if len == 0 || data.len() < len {
            return None;
        }
        let last_start = data.len() - len;
        let align = pattern.alignment();
        let mut pos = align_up(cursor.next.max(chunk_start), align);

        while pos < chunk_end && pos <= last_start {
            if pattern.matches_at(data, pos) {
                if emitter.is_cancelled() {
                    cursor.next = pos;
                    return Some(ScanOutcome::Cancelled);
                }
                let result = self.package(data, pattern, pos, pos + len);
                pos = align_up(pos + len, align);
                if let Some(stop) = emitter.emit(result) {
                    cursor.next = pos;
                    return Some(stop);
                }
            } else {
                pos += align;
            }
        }

        cursor.next = pos;
        None
    }

    /// The haystack reaches `overlap` bytes back into the previous chunk.
    /// Anything starting before the cursor was already handled there.
    fn scan_regex_chunk(
        &self,
        data: &[u8],
        pattern: &BytePattern,
        cursor: &mut PatternCursor,
        (chunk_start, chunk_end): (usize, usize),
        emitter: &mut Emitter<'_>,
    ) -> Option<ScanOutcome> {
        let overlap = self.options.overlap;
        let hay_start = chunk_start.saturating_sub(overlap);
        let haystack = &data[hay_start..chunk_end];
        let is_last = chunk_end >= data.len();
        let align = pattern.alignment();
        let mut from = cursor.next.max(hay_start) - hay_start;

        while let Some((start, end)) = pattern.find_from(haystack, from) {
            let abs_start = hay_start + start;
            let abs_end = hay_start + end;

            // May continue past the chunk; let the next haystack decide.
            if !is_last && end == haystack.len() && abs_start >= chunk_end.saturating_sub(overlap) {
                cursor.next = abs_start;
                return None;
            }

            if abs_start % align != 0 {
                from = start + 1;
                continue;
            }

            if emitter.is_cancelled() {
                cursor.next = abs_start;
                return Some(ScanOutcome::Cancelled);
            }

            cursor.next = abs_end;
            from = end;
            let result = self.package(data, pattern, abs_start, abs_end);
            if let Some(stop) = emitter.emit(result) {
                return Some(stop);
            }
        }

        None
    }

    pub(crate) fn package(&self, data: &[u8], pattern: &BytePattern, start: usize, end: usize) -> SearchResult {
        let view = ByteView::new(data);
        let bytes = view.clipped(start, end - start);
        let context = self.options.context_bytes;
        let (context_start, context_bytes) = view.window(start, end - start, context, context);

        let detail = match pattern.fixed_len() {
            Some(_) => MatchDetail::PatternMatch,
            None => MatchDetail::RegexMatch {
                decoded_text: escape_bytes(bytes),
            },
        };

        SearchResult::new(start, end - start, pattern.text(), pattern.kind())
            .with_context(context_start, context_bytes)
            .with_match_bytes(bytes)
            .with_detail(detail)
    }
}
