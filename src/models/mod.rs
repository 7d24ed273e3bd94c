// Model exports
pub mod domain;
pub mod matching;
pub mod requests;
pub mod responses;

pub use domain::{CandidateRecord, GeoPoint, Location, PetDescription, Province, ReportKind, Size, Species, ValidationError};
pub use matching::{ConfidenceLevel, MatchCandidate, MatchResult, MatchStrategy, ScoringWeights};
pub use requests::{ImageDescriptor, LocationInput, ReportRequest};
pub use responses::{ErrorResponse, FinalOutput, HealthResponse, ProcessingMetadata, MAX_RECOMMENDATIONS};
