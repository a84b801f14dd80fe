pub mod error;
pub mod keywords;
pub mod store;
pub mod types;

pub use error::MemoryError;
pub use keywords::{extract_keywords, session_reference, STOP_WORDS};
pub use store::MemoryStore;
pub use types::{Memory, MemoryStats, SessionObservation};
