// Service exports
pub mod cache;
pub mod corpus;
pub mod embedding;

pub use cache::{CacheKey, CacheStats, EmbeddingCache};
pub use corpus::{Corpus, CorpusError};
pub use embedding::{EmbeddingClient, RetryPolicy};
