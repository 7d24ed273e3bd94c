//! Pet Match - lost-pet and sighting matching service
//!
//! A report flows through three stages: extraction into a structured
//! description, similarity search over a fixed corpus, and a template-driven
//! explanation with recommended next steps.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Matcher, Pipeline, PipelineError};
pub use models::{CandidateRecord, ConfidenceLevel, FinalOutput, MatchResult, PetDescription, ReportRequest, ScoringWeights};
pub use services::Corpus;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let matcher = Matcher::default();
        assert_eq!(*matcher.weights(), ScoringWeights::default());
        assert!(Corpus::default().is_empty());
    }
}
