// Mon Oct 19 2026 - Alex

pub mod access;
pub mod dump;
pub mod error;
pub mod mmap;
pub mod traits;

pub use access::ByteView;
pub use dump::{DumpKind, MemoryDump};
pub use error::MemoryError;
pub use mmap::MmapSource;
pub use traits::ByteSource;
