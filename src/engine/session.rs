// Mon Oct 19 2026 - Alex

use crate::engine::mailbox::PromptMailbox;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Completed | SessionState::Cancelled | SessionState::Failed)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Running => "running",
            SessionState::Completed => "completed",
            SessionState::Cancelled => "cancelled",
            SessionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// State of one search run, shared between the worker thread and its
/// handle. A fresh session is built for every search.
#[derive(Debug)]
pub struct ScanSession {
    id: u64,
    state: Mutex<SessionState>,
    cancel: CancelToken,
    mailbox: PromptMailbox,
    current: AtomicUsize,
    total: AtomicUsize,
    results: AtomicUsize,
}

impl ScanSession {
    pub fn new(id: u64, prompt_timeout: Duration) -> Self {
        let cancel = CancelToken::new();
        Self {
            id,
            state: Mutex::new(SessionState::Idle),
            mailbox: PromptMailbox::new(cancel.clone()).with_timeout(prompt_timeout),
            cancel,
            current: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
            results: AtomicUsize::new(0),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    /// Moves to `next` unless the session already reached a terminal state.
    pub fn transition(&self, next: SessionState) -> bool {
        let mut state = self.state.lock();
        if state.is_terminal() {
            return false;
        }
        log::debug!("Session {}: {} -> {}", self.id, *state, next);
        *state = next;
        true
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Raises the flag and wakes any worker blocked on a prompt. Only
    /// meaningful while running.
    pub fn cancel(&self) {
        if self.state() != SessionState::Running {
            return;
        }
        log::info!("Cancelling session {}", self.id);
        self.mailbox.cancel();
    }

    pub fn mailbox(&self) -> &PromptMailbox {
        &self.mailbox
    }

    pub fn set_progress(&self, current: usize, total: usize) {
        self.current.store(current, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
    }

    pub fn progress(&self) -> (usize, usize) {
        (self.current.load(Ordering::Relaxed), self.total.load(Ordering::Relaxed))
    }

    pub fn record_result(&self) -> usize {
        self.results.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn result_count(&self) -> usize {
        self.results.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_state_is_final() {
        let session = ScanSession::new(1, Duration::from_secs(1));
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.transition(SessionState::Running));
        assert!(session.transition(SessionState::Completed));
        assert!(!session.transition(SessionState::Running));
        assert_eq!(session.state(), SessionState::Completed);
    }

    #[test]
    fn test_cancel_only_while_running() {
        let session = ScanSession::new(1, Duration::from_secs(1));
        session.cancel();
        assert!(!session.is_cancelled());

        session.transition(SessionState::Running);
        session.cancel();
        assert!(session.is_cancelled());
    }
}
