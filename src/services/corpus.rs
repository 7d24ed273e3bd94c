use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

use crate::models::{CandidateRecord, ReportKind};

/// Errors that can occur while loading the corpus
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("Failed to read corpus file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse corpus JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// On-disk layout of the mock data store
#[derive(Debug, Default, Deserialize)]
struct CorpusFile {
    #[serde(default)]
    lost_pets: Vec<Value>,
    #[serde(default)]
    sightings: Vec<Value>,
}

/// Read-only collection of lost-pet and sighting reports
///
/// Built once at startup and shared behind an `Arc`. Record order is stable:
/// lost reports first, then sightings, each in file order.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    records: Vec<CandidateRecord>,
}

impl Corpus {
    /// Build a corpus from already parsed records
    ///
    /// Records that fail validation or reuse an id are skipped with a warning.
    pub fn from_records(records: impl IntoIterator<Item = CandidateRecord>) -> Self {
        let mut seen = HashSet::new();
        let mut accepted = Vec::new();

        for record in records {
            if record.report_id.trim().is_empty() {
                tracing::warn!("Skipping corpus record without an id");
                continue;
            }

            let pet_description = match record.pet_description.clone().into_validated() {
                Ok(description) => description,
                Err(e) => {
                    tracing::warn!("Skipping corpus record {}: {}", record.report_id, e);
                    continue;
                }
            };

            if !seen.insert(record.report_id.clone()) {
                tracing::warn!("Skipping duplicate corpus record {}", record.report_id);
                continue;
            }

            accepted.push(CandidateRecord {
                pet_description,
                ..record
            });
        }

        Self { records: accepted }
    }

    /// Load the corpus from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CorpusError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let corpus = Self::from_json_str(&raw)?;

        tracing::info!(
            "Loaded {} corpus records ({} lost, {} sightings) from {}",
            corpus.len(),
            corpus.lost().count(),
            corpus.sightings().count(),
            path.display()
        );

        Ok(corpus)
    }

    /// Parse the `{"lost_pets": [...], "sightings": [...]}` layout
    pub fn from_json_str(raw: &str) -> Result<Self, CorpusError> {
        let file: CorpusFile = serde_json::from_str(raw)?;

        let lost = parse_section(file.lost_pets, ReportKind::Lost);
        let sightings = parse_section(file.sightings, ReportKind::Sighting);

        Ok(Self::from_records(lost.chain(sightings)))
    }

    pub fn records(&self) -> &[CandidateRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by id
    pub fn get(&self, report_id: &str) -> Option<&CandidateRecord> {
        self.records.iter().find(|r| r.report_id == report_id)
    }

    pub fn lost(&self) -> impl Iterator<Item = &CandidateRecord> {
        self.records
            .iter()
            .filter(|r| r.report_type == ReportKind::Lost)
    }

    pub fn sightings(&self) -> impl Iterator<Item = &CandidateRecord> {
        self.records
            .iter()
            .filter(|r| r.report_type == ReportKind::Sighting)
    }
}

/// Deserialize one section, dropping malformed entries and kind mismatches
fn parse_section(
    values: Vec<Value>,
    kind: ReportKind,
) -> impl Iterator<Item = CandidateRecord> {
    values
        .into_iter()
        .enumerate()
        .filter_map(move |(index, value)| {
            match serde_json::from_value::<CandidateRecord>(value) {
                Ok(record) if record.report_type == kind => Some(record),
                Ok(record) => {
                    tracing::warn!(
                        "Skipping record {} filed as {} under the {} section",
                        record.report_id,
                        record.report_type,
                        kind
                    );
                    None
                }
                Err(e) => {
                    tracing::warn!("Skipping malformed {} record #{}: {}", kind, index, e);
                    None
                }
            }
        })
}
