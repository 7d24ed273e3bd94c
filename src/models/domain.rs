use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised when a value fails validation at a pipeline stage boundary
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Unknown province '{0}', must be one of: San José, Alajuela, Cartago, Heredia, Guanacaste, Puntarenas, Limón")]
    UnknownProvince(String),

    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    #[error("At least one color must be provided")]
    NoColors,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Inconsistent match result: {0}")]
    InconsistentResult(String),

    #[error("Invalid output: {0}")]
    InvalidOutput(String),
}

/// Pet species
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Dog,
    Cat,
    Other,
}

impl Species {
    pub fn as_str(&self) -> &'static str {
        match self {
            Species::Dog => "dog",
            Species::Cat => "cat",
            Species::Other => "other",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Species {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dog" | "perro" | "perra" | "canine" => Ok(Species::Dog),
            "cat" | "gato" | "gata" | "feline" => Ok(Species::Cat),
            "other" | "otro" => Ok(Species::Other),
            _ => Err(ValidationError::InvalidRequest(format!("unknown species '{}'", s))),
        }
    }
}

/// Pet size category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Size {
    Small,
    Medium,
    Large,
}

impl Size {
    pub fn as_str(&self) -> &'static str {
        match self {
            Size::Small => "small",
            Size::Medium => "medium",
            Size::Large => "large",
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Size {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "small" | "pequeño" | "pequeña" => Ok(Size::Small),
            "medium" | "mediano" | "mediana" => Ok(Size::Medium),
            "large" | "grande" => Ok(Size::Large),
            _ => Err(ValidationError::InvalidRequest(format!("unknown size '{}'", s))),
        }
    }
}

/// The seven provinces of Costa Rica
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Province {
    SanJose,
    Alajuela,
    Cartago,
    Heredia,
    Guanacaste,
    Puntarenas,
    Limon,
}

impl Province {
    pub const ALL: [Province; 7] = [
        Province::SanJose,
        Province::Alajuela,
        Province::Cartago,
        Province::Heredia,
        Province::Guanacaste,
        Province::Puntarenas,
        Province::Limon,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Province::SanJose => "San José",
            Province::Alajuela => "Alajuela",
            Province::Cartago => "Cartago",
            Province::Heredia => "Heredia",
            Province::Guanacaste => "Guanacaste",
            Province::Puntarenas => "Puntarenas",
            Province::Limon => "Limón",
        }
    }
}

/// Lowercase and strip the accents used in province names so that
/// "San Jose" and "san josé" resolve to the same province
fn fold_province_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' => 'u',
            other => other,
        })
        .collect()
}

impl fmt::Display for Province {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Province {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded = fold_province_name(s);
        Province::ALL
            .iter()
            .copied()
            .find(|p| fold_province_name(p.name()) == folded)
            .ok_or_else(|| ValidationError::UnknownProvince(s.to_string()))
    }
}

impl TryFrom<String> for Province {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Province> for String {
    fn from(value: Province) -> Self {
        value.name().to_string()
    }
}

/// Geographic point, carried for display only
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Location of a report within Costa Rica
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub province: Province,
    pub canton: String,
    pub district: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<GeoPoint>,
}

impl Location {
    /// Build a location, trimming canton and district and rejecting empty ones
    pub fn new(
        province: Province,
        canton: impl Into<String>,
        district: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let location = Self {
            province,
            canton: canton.into().trim().to_string(),
            district: district.into().trim().to_string(),
            additional_details: None,
            coordinates: None,
        };
        location.validate()?;
        Ok(location)
    }

    pub fn with_details(mut self, details: Option<String>) -> Self {
        self.additional_details = details
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        self
    }

    pub fn with_coordinates(mut self, coordinates: Option<GeoPoint>) -> Self {
        self.coordinates = coordinates;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.canton.trim().is_empty() {
            return Err(ValidationError::EmptyField("canton"));
        }
        if self.district.trim().is_empty() {
            return Err(ValidationError::EmptyField("district"));
        }
        Ok(())
    }

    fn normalized(mut self) -> Self {
        self.canton = self.canton.trim().to_string();
        self.district = self.district.trim().to_string();
        self
    }
}

/// Structured pet description produced by the extraction stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetDescription {
    pub species: Species,
    pub size: Size,
    pub colors: Vec<String>,
    #[serde(default)]
    pub distinctive_features: Vec<String>,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub approximate_age: Option<String>,
    pub last_seen_location: Location,
    #[serde(default)]
    pub last_seen_date: Option<NaiveDate>,
}

impl PetDescription {
    /// Lowercase colors, trim features and drop empty entries
    pub fn normalized(mut self) -> Self {
        self.colors = self
            .colors
            .iter()
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .collect();
        self.distinctive_features = self
            .distinctive_features
            .iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();
        self.breed = non_blank(self.breed);
        self.approximate_age = non_blank(self.approximate_age);
        self.last_seen_location = self.last_seen_location.normalized();
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.colors.is_empty() {
            return Err(ValidationError::NoColors);
        }
        if self.colors.iter().any(|c| c.trim().is_empty()) {
            return Err(ValidationError::EmptyField("color"));
        }
        if self.distinctive_features.iter().any(|f| f.trim().is_empty()) {
            return Err(ValidationError::EmptyField("distinctive feature"));
        }
        self.last_seen_location.validate()
    }

    /// Normalize and validate in one step
    pub fn into_validated(self) -> Result<Self, ValidationError> {
        let description = self.normalized();
        description.validate()?;
        Ok(description)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Kind of report in the corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Lost,
    Sighting,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Lost => "lost",
            ReportKind::Sighting => "sighting",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lost-pet or sighting report from the corpus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub report_id: String,
    pub report_type: ReportKind,
    pub pet_description: PetDescription,
    #[serde(default)]
    pub raw_description: String,
    #[serde(default)]
    pub contact_info: Option<String>,
    pub report_date: DateTime<Utc>,
}

impl CandidateRecord {
    /// Whether the reporter left a usable contact
    pub fn has_contact(&self) -> bool {
        self.contact_info
            .as_deref()
            .map(|c| !c.trim().is_empty())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn escazu() -> Location {
        Location::new(Province::SanJose, "Escazú", "San Rafael").unwrap()
    }

    #[test]
    fn test_province_parsing() {
        assert_eq!("San José".parse::<Province>().unwrap(), Province::SanJose);
        assert_eq!("san jose".parse::<Province>().unwrap(), Province::SanJose);
        assert_eq!("Limon".parse::<Province>().unwrap(), Province::Limon);
        assert!(matches!(
            "Madrid".parse::<Province>(),
            Err(ValidationError::UnknownProvince(_))
        ));
    }

    #[test]
    fn test_province_serializes_as_name() {
        let json = serde_json::to_string(&Province::Limon).unwrap();
        assert_eq!(json, "\"Limón\"");
        let parsed: Province = serde_json::from_str("\"Heredia\"").unwrap();
        assert_eq!(parsed, Province::Heredia);
        assert!(serde_json::from_str::<Province>("\"Texas\"").is_err());
    }

    #[test]
    fn test_location_rejects_empty_canton() {
        let result = Location::new(Province::SanJose, "  ", "San Rafael");
        assert_eq!(result, Err(ValidationError::EmptyField("canton")));
    }

    #[test]
    fn test_location_trims_fields() {
        let location = Location::new(Province::Heredia, " Barva ", " San Pablo").unwrap();
        assert_eq!(location.canton, "Barva");
        assert_eq!(location.district, "San Pablo");
    }

    #[test]
    fn test_description_normalization() {
        let description = PetDescription {
            species: Species::Dog,
            size: Size::Medium,
            colors: vec![" White ".into(), "".into(), "BROWN".into()],
            distinctive_features: vec!["  red collar ".into(), "   ".into()],
            breed: Some("  ".into()),
            approximate_age: None,
            last_seen_location: escazu(),
            last_seen_date: None,
        }
        .into_validated()
        .unwrap();

        assert_eq!(description.colors, vec!["white", "brown"]);
        assert_eq!(description.distinctive_features, vec!["red collar"]);
        assert_eq!(description.breed, None);
    }

    #[test]
    fn test_description_requires_color() {
        let description = PetDescription {
            species: Species::Cat,
            size: Size::Small,
            colors: vec!["  ".into()],
            distinctive_features: vec![],
            breed: None,
            approximate_age: None,
            last_seen_location: escazu(),
            last_seen_date: None,
        };

        assert_eq!(description.into_validated(), Err(ValidationError::NoColors));
    }

    #[test]
    fn test_species_and_size_parsing() {
        assert_eq!("Perro".parse::<Species>().unwrap(), Species::Dog);
        assert_eq!("cat".parse::<Species>().unwrap(), Species::Cat);
        assert!("dragon".parse::<Species>().is_err());
        assert_eq!("grande".parse::<Size>().unwrap(), Size::Large);
    }

    #[test]
    fn test_has_contact() {
        let mut record = CandidateRecord {
            report_id: "LOST-001".into(),
            report_type: ReportKind::Lost,
            pet_description: PetDescription {
                species: Species::Dog,
                size: Size::Large,
                colors: vec!["black".into()],
                distinctive_features: vec![],
                breed: None,
                approximate_age: None,
                last_seen_location: escazu(),
                last_seen_date: None,
            },
            raw_description: String::new(),
            contact_info: Some("  ".into()),
            report_date: Utc::now(),
        };
        assert!(!record.has_contact());

        record.contact_info = Some("8888-1234".into());
        assert!(record.has_contact());
    }
}
