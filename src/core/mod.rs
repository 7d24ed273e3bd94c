// Core algorithm exports
pub mod distance;
pub mod embedding;
pub mod explanation;
pub mod extraction;
pub mod matcher;
pub mod pipeline;
pub mod scoring;

pub use distance::{days_since, estimate_distance_km};
pub use embedding::{CorpusVectors, EmbeddingBackend, EmbeddingError, EmbeddingProvider};
pub use explanation::{should_notify, Explainer, Explanation};
pub use extraction::{ExtractedAttributes, Extractor};
pub use matcher::Matcher;
pub use pipeline::{Pipeline, PipelineError};
pub use scoring::{calculate_match_score, DimensionScores};
