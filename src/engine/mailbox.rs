// Mon Oct 19 2026 - Alex

use crate::engine::session::CancelToken;
use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

pub const DEFAULT_PROMPT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    /// Free-text answer.
    Input,
    /// Yes/no answer.
    Question,
    /// Notification only; never waits.
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub id: u64,
    pub kind: PromptKind,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptAnswer {
    Text(String),
    Yes,
    No,
}

impl PromptAnswer {
    pub fn is_yes(&self) -> bool {
        matches!(self, PromptAnswer::Yes)
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            PromptAnswer::Text(text) => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Slot {
    pending: Option<u64>,
    answered: bool,
    answer: Option<PromptAnswer>,
    next_id: u64,
}

impl Slot {
    fn clear(&mut self) -> Option<PromptAnswer> {
        self.pending = None;
        self.answered = false;
        self.answer.take()
    }
}

/// Single-slot request/response channel between a scan worker and its
/// controller.
///
/// The worker posts a request and blocks until the controller answers,
/// the session is cancelled, or the timeout expires. The last two both
/// come back as `None`. At most one request may be outstanding.
#[derive(Debug)]
pub struct PromptMailbox {
    slot: Mutex<Slot>,
    ready: Condvar,
    cancel: CancelToken,
    timeout: Duration,
}

impl PromptMailbox {
    pub fn new(cancel: CancelToken) -> Self {
        Self {
            slot: Mutex::new(Slot::default()),
            ready: Condvar::new(),
            cancel,
            timeout: DEFAULT_PROMPT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Id of the request currently waiting for an answer.
    pub fn pending(&self) -> Option<u64> {
        self.slot.lock().pending
    }

    /// Posts a request through `post` and waits for the answer. `post`
    /// returns `false` when nobody is listening, which counts as no answer.
    pub fn ask<F>(&self, kind: PromptKind, title: &str, message: &str, post: F) -> Option<PromptAnswer>
    where
        F: FnOnce(PromptRequest) -> bool,
    {
        if self.cancel.is_cancelled() {
            return None;
        }

        let mut slot = self.slot.lock();
        if let Some(outstanding) = slot.pending {
            log::error!("Prompt '{}' posted while request {} is outstanding", title, outstanding);
            debug_assert!(false, "only one outstanding prompt per session");
            return None;
        }

        let id = slot.next_id;
        slot.next_id += 1;
        let request = PromptRequest {
            id,
            kind,
            title: title.to_string(),
            message: message.to_string(),
        };

        if kind == PromptKind::Info {
            drop(slot);
            post(request);
            return None;
        }

        slot.pending = Some(id);
        slot.answered = false;
        slot.answer = None;

        // Posting under the lock: an answer cannot land before the wait.
        if !post(request) {
            slot.clear();
            return None;
        }

        let deadline = Instant::now() + self.timeout;
        loop {
            if self.cancel.is_cancelled() {
                slot.clear();
                return None;
            }
            if slot.answered {
                return slot.clear();
            }
            if self.ready.wait_until(&mut slot, deadline).timed_out() {
                if slot.answered && !self.cancel.is_cancelled() {
                    return slot.clear();
                }
                log::warn!("Prompt '{}' timed out after {:?}", title, self.timeout);
                slot.clear();
                return None;
            }
        }
    }

    /// Deposits the controller's answer for request `id`. Stale or unknown
    /// ids are ignored and return `false`.
    pub fn answer(&self, id: u64, answer: Option<PromptAnswer>) -> bool {
        let mut slot = self.slot.lock();
        if slot.pending != Some(id) || slot.answered {
            log::debug!("Ignoring answer for prompt {}", id);
            return false;
        }
        slot.answer = answer;
        slot.answered = true;
        self.ready.notify_all();
        true
    }

    /// Cancels the owning session and wakes a blocked worker immediately.
    pub fn cancel(&self) {
        self.cancel.cancel();
        let mut slot = self.slot.lock();
        slot.answer = None;
        self.ready.notify_all();
    }
}
