pub mod config;
pub mod error;
pub mod models;
pub mod resolver;
pub mod scanner;
pub mod score;
pub mod selector;
pub mod store;

pub use config::AppConfig;
pub use error::MarqueeError;
pub use models::{ResolvedResult, ScoredCandidate};
pub use resolver::Resolver;
pub use scanner::{resolve_library, scan_library, BatchEntry, BatchReport};
pub use selector::{ExactTierPick, Tier};
pub use store::ResultStore;
