// Mon Oct 19 2026 - Alex

pub mod config;
pub mod engine;
pub mod graphics;
pub mod memory;
pub mod pattern;
pub mod utils;

pub use config::SearchConfig;
pub use engine::{SearchCoordinator, SearchEvent, SearchRequest, SessionHandle, SessionState};
pub use graphics::{PaletteBank, PixelCanvas, Rgb};
pub use memory::{ByteSource, MemoryDump, MmapSource};
pub use pattern::{PatternCompiler, SearchFilter, SearchResult};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
