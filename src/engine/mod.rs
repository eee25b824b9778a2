// Mon Oct 19 2026 - Alex

pub mod coordinator;
pub mod error;
pub mod mailbox;
pub mod session;

pub use coordinator::{SearchContext, SearchCoordinator, SearchEvent, SearchRequest, SessionHandle, StartOffset};
pub use error::{ErrorKind, SearchError};
pub use mailbox::{PromptAnswer, PromptKind, PromptMailbox, PromptRequest, DEFAULT_PROMPT_TIMEOUT};
pub use session::{CancelToken, ScanSession, SessionState};
