use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use uuid::Uuid;

use crate::core::{
    embedding::EmbeddingBackend,
    explanation::Explainer,
    extraction::Extractor,
    matcher::Matcher,
};
use crate::models::{FinalOutput, MatchResult, PetDescription, ProcessingMetadata, ReportRequest, ValidationError};
use crate::services::Corpus;

/// Failures that stop a pipeline run, one variant per stage boundary
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("Invalid input: {0}")]
    InvalidInput(ValidationError),

    #[error("Invalid match result: {0}")]
    InvalidMatchResult(ValidationError),

    #[error("Invalid output: {0}")]
    InvalidOutput(ValidationError),
}

/// Extraction, matching and explanation wired over a shared corpus
///
/// Each stage's output is validated before the next stage sees it.
pub struct Pipeline {
    extractor: Extractor,
    matcher: Matcher,
    explainer: Explainer,
    corpus: Arc<Corpus>,
    embeddings: Option<Arc<EmbeddingBackend>>,
    use_embeddings: bool,
}

impl Pipeline {
    pub fn new(corpus: Arc<Corpus>, matcher: Matcher, explainer: Explainer) -> Self {
        Self {
            extractor: Extractor::new(),
            matcher,
            explainer,
            corpus,
            embeddings: None,
            use_embeddings: false,
        }
    }

    /// Enable the embedding strategy with a prepared backend
    pub fn with_embeddings(mut self, backend: Arc<EmbeddingBackend>) -> Self {
        self.embeddings = Some(backend);
        self.use_embeddings = true;
        self
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn embeddings_enabled(&self) -> bool {
        self.use_embeddings && self.embeddings.is_some()
    }

    /// Matching stage only, for an already structured description
    pub async fn search(&self, query: PetDescription) -> Result<MatchResult, PipelineError> {
        let query = query
            .into_validated()
            .map_err(PipelineError::InvalidInput)?;

        self.run_matching(&query).await
    }

    /// Run all three stages on a raw report
    pub async fn process(&self, request: ReportRequest) -> Result<FinalOutput, PipelineError> {
        let request_id = Uuid::new_v4();
        let started_at = Utc::now();
        let timer = Instant::now();

        tracing::info!(
            "[{}] Processing {} report from {}",
            request_id,
            request.report_type,
            request.location.canton
        );

        let profile = self
            .extractor
            .extract(&request)
            .map_err(PipelineError::InvalidInput)?;

        let matches = self.run_matching(&profile).await?;
        let explanation = self.explainer.explain(&profile, &matches);

        if !explanation.notify_match_ids.is_empty() {
            tracing::info!(
                "[{}] Matches worth notifying: {}",
                request_id,
                explanation.notify_match_ids.join(", ")
            );
        }

        let metadata = ProcessingMetadata {
            request_id,
            strategy: matches.strategy,
            total_matches_found: matches.total_candidates_found,
            matches_above_threshold: matches
                .count_above_threshold(self.explainer.similarity_threshold()),
            processing_time_ms: timer.elapsed().as_millis() as u64,
            started_at,
            finished_at: Utc::now(),
        };

        let output = FinalOutput {
            enriched_profile: profile,
            matches,
            explanation: explanation.explanation,
            recommended_actions: explanation.recommended_actions,
            confidence_summary: explanation.confidence_summary,
            processing_metadata: metadata,
        };
        output.validate().map_err(PipelineError::InvalidOutput)?;

        tracing::info!(
            "[{}] Done in {}ms: confidence {}, {} above threshold",
            request_id,
            output.processing_metadata.processing_time_ms,
            output.matches.confidence_level,
            output.processing_metadata.matches_above_threshold
        );

        Ok(output)
    }

    async fn run_matching(&self, query: &PetDescription) -> Result<MatchResult, PipelineError> {
        let result = self
            .matcher
            .find_matches(
                query,
                self.corpus.records(),
                self.use_embeddings,
                self.embeddings.as_deref(),
            )
            .await;

        result.validate().map_err(PipelineError::InvalidMatchResult)?;
        Ok(result)
    }
}
