// Mon Oct 19 2026 - Alex

use crate::config::SearchConfig;
use crate::engine::error::{ErrorKind, SearchError};
use crate::engine::mailbox::{PromptAnswer, PromptKind, PromptRequest};
use crate::engine::session::{ScanSession, SessionState};
use crate::memory::{ByteSource, MmapSource};
use crate::pattern::{
    ChunkedScanner, CombineOp, PatternCompiler, PatternKind, ScanOptions, ScanOutcome, ScanSink, SearchFilter,
    SearchResult,
};
use crate::utils::logging::ScopedTimer;
use crate::utils::parse_offset;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Defaults shared by every session a coordinator starts.
#[derive(Debug, Clone, Default)]
pub struct SearchContext {
    config: SearchConfig,
}

impl SearchContext {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }
}

/// Where a scan begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOffset {
    At(usize),
    /// Ask the controller for a reference offset before scanning.
    Ask,
}

#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub source: PathBuf,
    pub pattern: String,
    pub kind: PatternKind,
    pub op: CombineOp,
    pub filter: SearchFilter,
    pub case_sensitive: bool,
    pub alignment: usize,
    pub start: StartOffset,
    /// Ask before stopping at the result cap and report empty searches.
    pub interactive: bool,
}

impl SearchRequest {
    pub fn new<P: Into<PathBuf>>(source: P, pattern: &str) -> Self {
        Self {
            source: source.into(),
            pattern: pattern.to_string(),
            kind: PatternKind::Hex,
            op: CombineOp::Single,
            filter: SearchFilter::default(),
            case_sensitive: true,
            alignment: 1,
            start: StartOffset::At(0),
            interactive: false,
        }
    }

    pub fn from_config<P: Into<PathBuf>>(source: P, config: &SearchConfig) -> Result<Self, SearchError> {
        let pattern = config
            .pattern
            .as_deref()
            .ok_or_else(|| SearchError::InvalidInput("no pattern configured".to_string()))?;

        Ok(Self::new(source, pattern)
            .with_kind(config.pattern_kind)
            .with_op(config.combine_op)
            .with_filter(config.filter.to_filter())
            .with_case_sensitive(config.case_sensitive)
            .with_alignment(config.alignment))
    }

    pub fn with_kind(mut self, kind: PatternKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_op(mut self, op: CombineOp) -> Self {
        self.op = op;
        self
    }

    pub fn with_filter(mut self, filter: SearchFilter) -> Self {
        self.filter = filter;
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

    pub fn with_start(mut self, start: StartOffset) -> Self {
        self.start = start;
        self
    }

    pub fn interactive(mut self, enabled: bool) -> Self {
        self.interactive = enabled;
        self
    }
}

/// Everything a session reports, in the order it happened.
#[derive(Debug, Clone)]
pub enum SearchEvent {
    Progress { current: usize, total: usize },
    ResultFound(SearchResult),
    Prompt(PromptRequest),
    /// Results were already delivered one by one as `ResultFound`.
    Completed { results: usize, limit_reached: bool },
    Cancelled { results: usize },
    Failed { kind: ErrorKind, message: String },
}

impl SearchEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SearchEvent::Completed { .. } | SearchEvent::Cancelled { .. } | SearchEvent::Failed { .. }
        )
    }
}

/// Starts searches on background threads. Sessions are independent and
/// never reused.
#[derive(Debug, Clone, Default)]
pub struct SearchCoordinator {
    context: Arc<SearchContext>,
    last_id: Arc<AtomicU64>,
}

impl SearchCoordinator {
    pub fn new(context: SearchContext) -> Self {
        Self {
            context: Arc::new(context),
            last_id: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn context(&self) -> &SearchContext {
        &self.context
    }

    pub fn start(&self, request: SearchRequest) -> SessionHandle {
        let config = self.context.config();
        let id = self.last_id.fetch_add(1, Ordering::Relaxed) + 1;
        let session = Arc::new(ScanSession::new(id, config.prompt_timeout()));
        session.transition(SessionState::Running);

        let (tx, rx) = mpsc::channel();
        let options = config.scan_options();
        let worker = session.clone();
        let thread = thread::spawn(move || run_session(&worker, &request, options, &tx));

        SessionHandle {
            session,
            events: rx,
            thread: Some(thread),
        }
    }

    pub fn cancel(&self, handle: &SessionHandle) {
        handle.cancel();
    }
}

fn run_session(session: &ScanSession, request: &SearchRequest, options: ScanOptions, tx: &Sender<SearchEvent>) {
    let _timer = ScopedTimer::new(&format!("search session {}", session.id()));
    log::info!(
        "Session {}: {} {} search in {}",
        session.id(),
        request.op,
        request.kind,
        request.source.display()
    );

    let event = match execute(session, request, options, tx) {
        Ok((ScanOutcome::Cancelled, _)) | Err(SearchError::Cancelled) => {
            session.transition(SessionState::Cancelled);
            SearchEvent::Cancelled {
                results: session.result_count(),
            }
        }
        Ok((outcome, results)) => {
            session.transition(SessionState::Completed);
            log::info!("Session {}: {} results", session.id(), results);
            SearchEvent::Completed {
                results,
                limit_reached: outcome == ScanOutcome::LimitReached,
            }
        }
        Err(e) => {
            session.transition(SessionState::Failed);
            log::error!("Session {} failed: {}", session.id(), e);
            SearchEvent::Failed {
                kind: e.kind(),
                message: e.to_string(),
            }
        }
    };

    let _ = tx.send(event);
}

fn execute(
    session: &ScanSession,
    request: &SearchRequest,
    options: ScanOptions,
    tx: &Sender<SearchEvent>,
) -> Result<(ScanOutcome, usize), SearchError> {
    let set = PatternCompiler::new(request.kind)
        .case_sensitive(request.case_sensitive)
        .alignment(request.alignment)
        .compile_set(&request.pattern, request.op)?;
    let source = MmapSource::open(&request.source)?;

    if session.is_cancelled() {
        return Err(SearchError::Cancelled);
    }

    let from = resolve_start(session, request, &source, tx);
    let mut sink = SessionSink {
        session,
        tx,
        filter: &request.filter,
        interactive: request.interactive,
        accepted: 0,
    };

    let summary = ChunkedScanner::new(options).scan_source(&source, from, &set, &mut sink);
    if session.is_cancelled() {
        // A prompt answered by cancellation still ends the scan as cancelled.
        return Err(SearchError::Cancelled);
    }

    if request.interactive && summary.outcome == ScanOutcome::Completed && sink.accepted == 0 {
        session.mailbox().ask(PromptKind::Info, "Search", "No matches found", |r| {
            tx.send(SearchEvent::Prompt(r)).is_ok()
        });
    }

    Ok((summary.outcome, sink.accepted))
}

fn resolve_start(session: &ScanSession, request: &SearchRequest, source: &dyn ByteSource, tx: &Sender<SearchEvent>) -> usize {
    let offset = match request.start {
        StartOffset::At(offset) => offset,
        StartOffset::Ask => {
            let answer = session.mailbox().ask(
                PromptKind::Input,
                "Reference offset",
                "Enter the offset to search from (hex)",
                |r| tx.send(SearchEvent::Prompt(r)).is_ok(),
            );
            match answer.as_ref().and_then(PromptAnswer::text).and_then(parse_offset) {
                Some(offset) => offset,
                None => {
                    log::warn!("No usable start offset given, scanning from 0");
                    0
                }
            }
        }
    };

    if offset > source.len() {
        log::warn!("Start offset {:#x} is past the end of {}", offset, source.label());
    }
    offset.min(source.len())
}

/// Forwards scan output to the controller, dropping filtered results.
struct SessionSink<'a> {
    session: &'a ScanSession,
    tx: &'a Sender<SearchEvent>,
    filter: &'a SearchFilter,
    interactive: bool,
    accepted: usize,
}

impl ScanSink for SessionSink<'_> {
    fn is_cancelled(&self) -> bool {
        self.session.is_cancelled()
    }

    fn progress(&mut self, current: usize, total: usize) {
        self.session.set_progress(current, total);
        let _ = self.tx.send(SearchEvent::Progress { current, total });
    }

    fn result(&mut self, result: SearchResult) -> bool {
        if !self.filter.accepts(&result) {
            return false;
        }
        self.session.record_result();
        self.accepted += 1;
        let _ = self.tx.send(SearchEvent::ResultFound(result));
        true
    }

    fn limit_reached(&mut self, accepted: usize) -> bool {
        if !self.interactive {
            return false;
        }
        let tx = self.tx;
        self.session
            .mailbox()
            .ask(
                PromptKind::Question,
                "Result limit reached",
                &format!("Found {} results. Continue searching?", accepted),
                |r| tx.send(SearchEvent::Prompt(r)).is_ok(),
            )
            .map(|answer| answer.is_yes())
            .unwrap_or(false)
    }
}

/// Controller's side of a running session.
pub struct SessionHandle {
    session: Arc<ScanSession>,
    events: Receiver<SearchEvent>,
    thread: Option<thread::JoinHandle<()>>,
}

impl SessionHandle {
    pub fn id(&self) -> u64 {
        self.session.id()
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn progress(&self) -> (usize, usize) {
        self.session.progress()
    }

    pub fn result_count(&self) -> usize {
        self.session.result_count()
    }

    pub fn cancel(&self) {
        self.session.cancel();
    }

    /// Answers the prompt with id `id`; `None` means dismissed.
    pub fn answer(&self, id: u64, answer: Option<PromptAnswer>) -> bool {
        self.session.mailbox().answer(id, answer)
    }

    pub fn events(&self) -> &Receiver<SearchEvent> {
        &self.events
    }

    /// Blocks for the next event; `None` once the session is finished and
    /// every event has been read.
    pub fn next_event(&self) -> Option<SearchEvent> {
        self.events.recv().ok()
    }

    /// Collects events up to and including the terminal one.
    pub fn drain(&self, timeout: Duration) -> Result<Vec<SearchEvent>, SearchError> {
        let deadline = Instant::now() + timeout;
        let mut events = Vec::new();
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.events.recv_timeout(remaining) {
                Ok(event) => {
                    let done = event.is_terminal();
                    events.push(event);
                    if done {
                        return Ok(events);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    return Err(SearchError::Timeout(format!("session {}", self.id())));
                }
                Err(RecvTimeoutError::Disconnected) => return Ok(events),
            }
        }
    }

    /// Joins the worker and returns the terminal state.
    pub fn wait(mut self) -> SessionState {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("Search worker {} panicked", self.session.id());
                self.session.transition(SessionState::Failed);
            }
        }
        self.session.state()
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        // Controller gone: stop the worker, including one blocked on a prompt.
        self.session.cancel();
    }
}
