pub mod builder;
pub mod error;
pub mod index;
pub mod persist;
pub mod scheduler;
pub mod search;
pub mod source;
pub mod tokenizer;

pub use builder::{BuildStats, IndexBuilder};
pub use error::{Result, SearchError};
pub use index::{DocId, IndexSnapshot, InvertedIndex, Posting, RelativeIndex};
pub use scheduler::{TaskHandle, TaskScheduler};
pub use search::SearchServer;
pub use source::DocumentSource;
