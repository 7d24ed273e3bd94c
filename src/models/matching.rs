use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::domain::{ReportKind, ValidationError};

/// Confidence tier derived from the top candidate's score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
    None,
}

impl ConfidenceLevel {
    pub const HIGH_THRESHOLD: f64 = 0.8;
    pub const MEDIUM_THRESHOLD: f64 = 0.6;

    /// Classify a single top score
    pub fn from_score(score: f64) -> Self {
        if score >= Self::HIGH_THRESHOLD {
            ConfidenceLevel::High
        } else if score >= Self::MEDIUM_THRESHOLD {
            ConfidenceLevel::Medium
        } else if score > 0.0 {
            ConfidenceLevel::Low
        } else {
            ConfidenceLevel::None
        }
    }

    /// Classify the top score of a run, `None` when nothing was searched
    pub fn from_top_score(score: Option<f64>) -> Self {
        score.map(Self::from_score).unwrap_or(ConfidenceLevel::None)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low",
            ConfidenceLevel::None => "none",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which scoring strategy produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    Heuristic,
    Embedding,
}

/// One corpus record scored against the query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub match_id: String,
    pub report_type: ReportKind,
    pub similarity_score: f64,
    #[serde(default)]
    pub matching_reasons: Vec<String>,
    #[serde(default)]
    pub location_distance_km: Option<f64>,
    #[serde(default)]
    pub days_since_report: Option<i64>,
    #[serde(default)]
    pub contact_available: bool,
}

/// Output of one matching run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub candidates: Vec<MatchCandidate>,
    pub top_match: Option<MatchCandidate>,
    pub confidence_level: ConfidenceLevel,
    pub total_candidates_found: usize,
    pub search_timestamp: DateTime<Utc>,
    pub strategy: MatchStrategy,
}

impl MatchResult {
    /// Build a result from candidates already sorted by descending score
    pub fn from_ranked(
        candidates: Vec<MatchCandidate>,
        total_candidates_found: usize,
        strategy: MatchStrategy,
        search_timestamp: DateTime<Utc>,
    ) -> Self {
        let top_match = candidates.first().cloned();
        let confidence_level =
            ConfidenceLevel::from_top_score(top_match.as_ref().map(|m| m.similarity_score));

        Self {
            candidates,
            top_match,
            confidence_level,
            total_candidates_found,
            search_timestamp,
            strategy,
        }
    }

    /// Candidates at or above a presentation threshold, in rank order
    pub fn above_threshold(&self, threshold: f64) -> impl Iterator<Item = &MatchCandidate> {
        self.candidates
            .iter()
            .filter(move |c| c.similarity_score >= threshold)
    }

    pub fn count_above_threshold(&self, threshold: f64) -> usize {
        self.above_threshold(threshold).count()
    }

    /// Check the ranking invariants before handing the result downstream
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(bad) = self
            .candidates
            .iter()
            .find(|c| !(0.0..=1.0).contains(&c.similarity_score))
        {
            return Err(ValidationError::InconsistentResult(format!(
                "score {} of {} is outside [0, 1]",
                bad.similarity_score, bad.match_id
            )));
        }

        if self
            .candidates
            .windows(2)
            .any(|pair| pair[0].similarity_score < pair[1].similarity_score)
        {
            return Err(ValidationError::InconsistentResult(
                "candidates are not sorted by descending score".into(),
            ));
        }

        if self.top_match.as_ref() != self.candidates.first() {
            return Err(ValidationError::InconsistentResult(
                "top match is not the highest ranked candidate".into(),
            ));
        }

        let expected = ConfidenceLevel::from_top_score(
            self.top_match.as_ref().map(|m| m.similarity_score),
        );
        if self.confidence_level != expected {
            return Err(ValidationError::InconsistentResult(format!(
                "confidence {} does not match top score (expected {})",
                self.confidence_level, expected
            )));
        }

        Ok(())
    }
}

/// Weights of the heuristic similarity dimensions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub species: f64,
    pub size: f64,
    pub colors: f64,
    pub features: f64,
    pub location: f64,
}

impl ScoringWeights {
    pub fn total(&self) -> f64 {
        self.species + self.size + self.colors + self.features + self.location
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            species: 0.30,
            size: 0.20,
            colors: 0.20,
            features: 0.20,
            location: 0.10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, score: f64) -> MatchCandidate {
        MatchCandidate {
            match_id: id.to_string(),
            report_type: ReportKind::Lost,
            similarity_score: score,
            matching_reasons: vec![],
            location_distance_km: None,
            days_since_report: None,
            contact_available: false,
        }
    }

    #[test]
    fn test_confidence_tiers() {
        assert_eq!(ConfidenceLevel::from_score(0.9), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(0.8), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(0.7), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_score(0.6), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_score(0.3), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::from_score(0.0), ConfidenceLevel::None);
        assert_eq!(ConfidenceLevel::from_top_score(None), ConfidenceLevel::None);
    }

    #[test]
    fn test_from_ranked_picks_first() {
        let result = MatchResult::from_ranked(
            vec![candidate("a", 0.72), candidate("b", 0.4)],
            2,
            MatchStrategy::Heuristic,
            Utc::now(),
        );

        assert_eq!(result.top_match.as_ref().unwrap().match_id, "a");
        assert_eq!(result.confidence_level, ConfidenceLevel::Medium);
        assert_eq!(result.count_above_threshold(0.6), 1);
        assert!(result.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unsorted() {
        let result = MatchResult::from_ranked(
            vec![candidate("a", 0.2), candidate("b", 0.5)],
            2,
            MatchStrategy::Heuristic,
            Utc::now(),
        );

        assert!(matches!(
            result.validate(),
            Err(ValidationError::InconsistentResult(_))
        ));
    }

    #[test]
    fn test_validate_rejects_out_of_range_score() {
        let result = MatchResult::from_ranked(
            vec![candidate("a", 1.2)],
            1,
            MatchStrategy::Heuristic,
            Utc::now(),
        );

        assert!(result.validate().is_err());
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        let weights = ScoringWeights::default();
        assert!((weights.total() - 1.0).abs() < 1e-9);
    }
}
