use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::core::scoring::round_score;
use crate::models::{CandidateRecord, PetDescription};

/// Errors that can occur while producing or comparing embeddings
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned status {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Embedding call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Corpus vectors cover {0} records but the corpus holds a different number")]
    MissingVectors(usize),

    #[error("Embedding provider unavailable: {0}")]
    Unavailable(String),
}

impl EmbeddingError {
    /// Transport failures, throttling and server errors are worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            EmbeddingError::RequestError(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            EmbeddingError::ApiError { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Text-to-vector collaborator
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    fn model_name(&self) -> &str;
}

/// Deterministic text rendering of a description, fed to the provider
///
/// The same template is used for corpus records and queries so both sides
/// land in the same region of the embedding space.
pub fn description_text(pet: &PetDescription) -> String {
    let mut text = format!("A {} {}", pet.size, pet.species);

    if let Some(breed) = &pet.breed {
        text.push_str(&format!(", breed {}", breed));
    }

    text.push_str(&format!(". Colors: {}.", pet.colors.join(", ")));

    if !pet.distinctive_features.is_empty() {
        text.push_str(&format!(
            " Distinctive features: {}.",
            pet.distinctive_features.join(", ")
        ));
    }

    if let Some(age) = &pet.approximate_age {
        text.push_str(&format!(" Age: {}.", age));
    }

    let location = &pet.last_seen_location;
    text.push_str(&format!(
        " Last seen in {}, {}, {}.",
        location.district, location.canton, location.province
    ));

    text
}

/// Cosine similarity of two equally sized vectors, 0 when either is all zeros
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Cosine similarity mapped onto a match score: negatives floor to 0, capped at 1
#[inline]
pub fn similarity_score(a: &[f32], b: &[f32]) -> f64 {
    round_score(cosine_similarity(a, b).clamp(0.0, 1.0))
}

/// Reject vectors carrying NaN or infinite components
pub fn ensure_finite(vector: &[f32]) -> Result<(), EmbeddingError> {
    match vector.iter().position(|x| !x.is_finite()) {
        Some(i) => Err(EmbeddingError::InvalidResponse(format!(
            "Non-finite embedding component at index {}",
            i
        ))),
        None => Ok(()),
    }
}

/// Precomputed vectors for the corpus, aligned by position with its records
#[derive(Debug, Clone, Default)]
pub struct CorpusVectors {
    vectors: Vec<Vec<f32>>,
    dimensions: usize,
}

impl CorpusVectors {
    /// Embed every record with the provider
    pub async fn build(
        records: &[CandidateRecord],
        provider: &dyn EmbeddingProvider,
    ) -> Result<Self, EmbeddingError> {
        let mut vectors = Vec::with_capacity(records.len());

        for record in records {
            let text = description_text(&record.pet_description);
            vectors.push(provider.embed(&text).await?);
        }

        tracing::info!(
            "Embedded {} corpus records with model {}",
            vectors.len(),
            provider.model_name()
        );

        Self::from_vectors(vectors)
    }

    /// Wrap vectors computed elsewhere, rejecting mixed dimensions and non-finite values
    pub fn from_vectors(vectors: Vec<Vec<f32>>) -> Result<Self, EmbeddingError> {
        let dimensions = vectors.first().map(|v| v.len()).unwrap_or(0);

        for vector in &vectors {
            ensure_finite(vector)?;
        }

        if let Some(bad) = vectors.iter().find(|v| v.len() != dimensions) {
            return Err(EmbeddingError::DimensionMismatch {
                expected: dimensions,
                actual: bad.len(),
            });
        }

        Ok(Self { vectors, dimensions })
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn get(&self, index: usize) -> Option<&[f32]> {
        self.vectors.get(index).map(Vec::as_slice)
    }
}

/// Provider plus corpus vectors, everything the embedding strategy needs
#[derive(Clone)]
pub struct EmbeddingBackend {
    provider: Arc<dyn EmbeddingProvider>,
    vectors: Arc<CorpusVectors>,
    timeout: Duration,
}

impl EmbeddingBackend {
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        vectors: Arc<CorpusVectors>,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            vectors,
            timeout,
        }
    }

    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    pub fn vectors(&self) -> &CorpusVectors {
        &self.vectors
    }

    /// Embed a query description, bounded by the backend timeout
    pub async fn embed_query(&self, query: &PetDescription) -> Result<Vec<f32>, EmbeddingError> {
        let text = description_text(query);

        tokio::time::timeout(self.timeout, self.provider.embed(&text))
            .await
            .map_err(|_| EmbeddingError::Timeout(self.timeout))?
    }

    /// Score every corpus record against the query, in corpus order
    ///
    /// An empty corpus returns immediately without calling the provider.
    pub async fn score_corpus(
        &self,
        query: &PetDescription,
        corpus_len: usize,
    ) -> Result<Vec<f64>, EmbeddingError> {
        if self.vectors.len() != corpus_len {
            return Err(EmbeddingError::MissingVectors(self.vectors.len()));
        }
        if corpus_len == 0 {
            return Ok(Vec::new());
        }

        let query_vector = self.embed_query(query).await?;
        if query_vector.len() != self.vectors.dimensions() {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.vectors.dimensions(),
                actual: query_vector.len(),
            });
        }
        ensure_finite(&query_vector)?;

        Ok(self
            .vectors
            .vectors
            .iter()
            .map(|v| similarity_score(&query_vector, v))
            .collect())
    }
}

impl std::fmt::Debug for EmbeddingBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingBackend")
            .field("model", &self.provider.model_name())
            .field("vectors", &self.vectors.len())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Location, Province, Size, Species};

    /// Maps a description to a tiny bag-of-words vector
    struct KeywordProvider;

    #[async_trait]
    impl EmbeddingProvider for KeywordProvider {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            let text = text.to_lowercase();
            Ok(["dog", "cat", "white", "black"]
                .iter()
                .map(|w| if text.contains(w) { 1.0 } else { 0.0 })
                .collect())
        }

        fn model_name(&self) -> &str {
            "keyword-test"
        }
    }

    struct SlowProvider;

    #[async_trait]
    impl EmbeddingProvider for SlowProvider {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(vec![1.0])
        }

        fn model_name(&self) -> &str {
            "slow-test"
        }
    }

    fn pet(species: Species, colors: &[&str]) -> PetDescription {
        PetDescription {
            species,
            size: Size::Medium,
            colors: colors.iter().map(|c| c.to_string()).collect(),
            distinctive_features: vec!["red collar".into()],
            breed: Some("mixed".into()),
            approximate_age: None,
            last_seen_location: Location::new(Province::SanJose, "Escazú", "San Rafael").unwrap(),
            last_seen_date: None,
        }
    }

    #[test]
    fn test_description_text_is_deterministic() {
        let text = description_text(&pet(Species::Dog, &["white", "brown"]));
        assert_eq!(
            text,
            "A medium dog, breed mixed. Colors: white, brown. \
             Distinctive features: red collar. Last seen in San Rafael, Escazú, San José."
        );
        assert_eq!(text, description_text(&pet(Species::Dog, &["white", "brown"])));
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-9);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-9);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_negative_similarity_floors_to_zero() {
        assert_eq!(similarity_score(&[1.0, 0.0], &[-1.0, 0.0]), 0.0);
        assert_eq!(similarity_score(&[2.0, 2.0], &[1.0, 1.0]), 1.0);
    }

    #[test]
    fn test_from_vectors_rejects_mixed_dimensions() {
        let result = CorpusVectors::from_vectors(vec![vec![1.0, 0.0], vec![1.0]]);
        assert!(matches!(
            result,
            Err(EmbeddingError::DimensionMismatch { expected: 2, actual: 1 })
        ));
    }

    #[tokio::test]
    async fn test_score_corpus_ranks_similar_first() {
        let corpus = vec![pet(Species::Cat, &["black"]), pet(Species::Dog, &["white"])];
        let vectors = CorpusVectors::from_vectors(vec![
            KeywordProvider.embed(&description_text(&corpus[0])).await.unwrap(),
            KeywordProvider.embed(&description_text(&corpus[1])).await.unwrap(),
        ])
        .unwrap();

        let backend = EmbeddingBackend::new(
            Arc::new(KeywordProvider),
            Arc::new(vectors),
            Duration::from_secs(1),
        );

        let scores = backend
            .score_corpus(&pet(Species::Dog, &["white"]), 2)
            .await
            .unwrap();

        assert_eq!(scores.len(), 2);
        assert_eq!(scores[1], 1.0);
        assert!(scores[0] < scores[1]);
    }

    #[tokio::test]
    async fn test_vector_count_mismatch_is_an_error() {
        let backend = EmbeddingBackend::new(
            Arc::new(KeywordProvider),
            Arc::new(CorpusVectors::default()),
            Duration::from_secs(1),
        );

        let result = backend.score_corpus(&pet(Species::Dog, &["white"]), 3).await;
        assert!(matches!(result, Err(EmbeddingError::MissingVectors(0))));
    }

    #[tokio::test]
    async fn test_query_dimension_mismatch_is_an_error() {
        let vectors = CorpusVectors::from_vectors(vec![vec![1.0, 0.0]]).unwrap();
        let backend = EmbeddingBackend::new(
            Arc::new(KeywordProvider),
            Arc::new(vectors),
            Duration::from_secs(1),
        );

        let result = backend.score_corpus(&pet(Species::Dog, &["white"]), 1).await;
        assert!(matches!(
            result,
            Err(EmbeddingError::DimensionMismatch { expected: 2, actual: 4 })
        ));
    }

    struct NanProvider;

    #[async_trait]
    impl EmbeddingProvider for NanProvider {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            Ok(vec![f32::NAN, 1.0])
        }

        fn model_name(&self) -> &str {
            "nan-test"
        }
    }

    #[test]
    fn test_from_vectors_rejects_non_finite() {
        assert!(matches!(
            CorpusVectors::from_vectors(vec![vec![1.0, 0.0], vec![f32::INFINITY, 0.0]]),
            Err(EmbeddingError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_non_finite_query_is_an_error() {
        let vectors = CorpusVectors::from_vectors(vec![vec![1.0, 0.0]]).unwrap();
        let backend = EmbeddingBackend::new(
            Arc::new(NanProvider),
            Arc::new(vectors),
            Duration::from_secs(1),
        );

        let result = backend.score_corpus(&pet(Species::Dog, &["white"]), 1).await;
        assert!(matches!(result, Err(EmbeddingError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let vectors = CorpusVectors::from_vectors(vec![vec![1.0]]).unwrap();
        let backend = EmbeddingBackend::new(
            Arc::new(SlowProvider),
            Arc::new(vectors),
            Duration::from_millis(10),
        );

        let result = backend.score_corpus(&pet(Species::Dog, &["white"]), 1).await;
        assert!(matches!(result, Err(EmbeddingError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_build_embeds_every_record() {
        let now = chrono::Utc::now();
        let records: Vec<CandidateRecord> = ["A", "B"]
            .iter()
            .map(|id| CandidateRecord {
                report_id: id.to_string(),
                report_type: crate::models::ReportKind::Lost,
                pet_description: pet(Species::Dog, &["white"]),
                raw_description: String::new(),
                contact_info: None,
                report_date: now,
            })
            .collect();

        let vectors = CorpusVectors::build(&records, &KeywordProvider).await.unwrap();
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors.dimensions(), 4);
        assert!(vectors.get(1).is_some());
        assert!(vectors.get(2).is_none());
    }
}
