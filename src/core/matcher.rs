use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use crate::core::{
    distance::{days_since, estimate_distance_km},
    embedding::EmbeddingBackend,
    scoring::{calculate_match_score, matching_reasons, score_dimensions, DimensionScores},
};
use crate::models::{CandidateRecord, MatchCandidate, MatchResult, MatchStrategy, PetDescription, ScoringWeights};

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Strategy selection (embedding when enabled and available)
/// 2. Scoring every corpus record
/// 3. Reasons, distance and age per candidate
/// 4. Stable ranking by descending score
///
/// Matching never fails: any embedding problem degrades to the heuristic.
#[derive(Debug, Clone)]
pub struct Matcher {
    weights: ScoringWeights,
}

impl Matcher {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn with_default_weights() -> Self {
        Self {
            weights: ScoringWeights::default(),
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Find matches for a description across the whole corpus
    ///
    /// # Arguments
    /// * `query` - The validated description to match
    /// * `records` - Every corpus record, in corpus order
    /// * `use_embeddings` - Whether to try the embedding strategy first
    /// * `backend` - Provider and precomputed vectors for that strategy
    ///
    /// # Returns
    /// MatchResult with every record ranked by similarity
    pub async fn find_matches(
        &self,
        query: &PetDescription,
        records: &[CandidateRecord],
        use_embeddings: bool,
        backend: Option<&EmbeddingBackend>,
    ) -> MatchResult {
        self.find_matches_at(query, records, use_embeddings, backend, Utc::now())
            .await
    }

    /// Same as [`Matcher::find_matches`] with an explicit clock
    pub async fn find_matches_at(
        &self,
        query: &PetDescription,
        records: &[CandidateRecord],
        use_embeddings: bool,
        backend: Option<&EmbeddingBackend>,
        now: DateTime<Utc>,
    ) -> MatchResult {
        if use_embeddings {
            match backend {
                Some(backend) => match backend.score_corpus(query, records.len()).await {
                    Ok(scores) => {
                        tracing::debug!(
                            "Scored {} records with embedding model {}",
                            scores.len(),
                            backend.model_name()
                        );
                        return self.rank(query, records, Some(scores.as_slice()), now);
                    }
                    Err(e) => {
                        tracing::warn!("Embedding strategy failed, using heuristic: {}", e);
                    }
                },
                None => {
                    tracing::debug!("Embeddings requested but no backend configured");
                }
            }
        }

        self.find_matches_heuristic(query, records, now)
    }

    /// Score every record with the weighted heuristic only
    pub fn find_matches_heuristic(
        &self,
        query: &PetDescription,
        records: &[CandidateRecord],
        now: DateTime<Utc>,
    ) -> MatchResult {
        self.rank(query, records, None, now)
    }

    /// Build, sort and wrap candidates
    ///
    /// `embedding_scores` replaces the heuristic score position by position
    /// when present. Reasons always come from the heuristic dimensions.
    fn rank(
        &self,
        query: &PetDescription,
        records: &[CandidateRecord],
        embedding_scores: Option<&[f64]>,
        now: DateTime<Utc>,
    ) -> MatchResult {
        let strategy = match embedding_scores {
            Some(_) => MatchStrategy::Embedding,
            None => MatchStrategy::Heuristic,
        };

        let mut candidates: Vec<MatchCandidate> = records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let (score, dimensions) = match embedding_scores.and_then(|s| s.get(index)) {
                    Some(score) => (*score, score_dimensions(query, &record.pet_description)),
                    None => calculate_match_score(query, &record.pet_description, &self.weights),
                };
                build_candidate(query, record, score, &dimensions, now)
            })
            .collect();

        // sort_by is stable, ties keep corpus order
        candidates.sort_by(|a, b| {
            b.similarity_score
                .partial_cmp(&a.similarity_score)
                .unwrap_or(Ordering::Equal)
        });

        tracing::debug!(
            "Ranked {} candidates with {:?} strategy",
            candidates.len(),
            strategy
        );

        MatchResult::from_ranked(candidates, records.len(), strategy, now)
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

fn build_candidate(
    query: &PetDescription,
    record: &CandidateRecord,
    score: f64,
    dimensions: &DimensionScores,
    now: DateTime<Utc>,
) -> MatchCandidate {
    let candidate = &record.pet_description;

    MatchCandidate {
        match_id: record.report_id.clone(),
        report_type: record.report_type,
        similarity_score: score,
        matching_reasons: matching_reasons(query, candidate, dimensions),
        location_distance_km: Some(estimate_distance_km(
            &query.last_seen_location,
            &candidate.last_seen_location,
        )),
        days_since_report: Some(days_since(record.report_date, now)),
        contact_available: record.has_contact(),
    }
}
