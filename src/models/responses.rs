use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::domain::{PetDescription, ValidationError};
use super::matching::{MatchResult, MatchStrategy};

/// Upper bound on the recommendations handed to the user
pub const MAX_RECOMMENDATIONS: usize = 6;

const MIN_EXPLANATION_CHARS: usize = 20;

/// Metadata about one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingMetadata {
    pub request_id: Uuid,
    pub strategy: MatchStrategy,
    pub total_matches_found: usize,
    pub matches_above_threshold: usize,
    pub processing_time_ms: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Final output presented to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalOutput {
    pub enriched_profile: PetDescription,
    pub matches: MatchResult,
    pub explanation: String,
    pub recommended_actions: Vec<String>,
    pub confidence_summary: String,
    pub processing_metadata: ProcessingMetadata,
}

impl FinalOutput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.enriched_profile.validate()?;
        self.matches.validate()?;

        if self.explanation.trim().chars().count() < MIN_EXPLANATION_CHARS {
            return Err(ValidationError::InvalidOutput(format!(
                "explanation must be at least {} characters",
                MIN_EXPLANATION_CHARS
            )));
        }
        if self.recommended_actions.iter().any(|a| a.trim().is_empty()) {
            return Err(ValidationError::InvalidOutput(
                "recommended actions cannot be empty".into(),
            ));
        }
        if self.recommended_actions.len() > MAX_RECOMMENDATIONS {
            return Err(ValidationError::InvalidOutput(format!(
                "at most {} recommended actions are allowed",
                MAX_RECOMMENDATIONS
            )));
        }
        Ok(())
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub corpus_size: usize,
    pub embeddings_enabled: bool,
    pub timestamp: DateTime<Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
