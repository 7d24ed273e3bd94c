use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::domain::{GeoPoint, ReportKind};

/// Attributes an external vision model already extracted from one image
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageDescriptor {
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub distinctive_features: Vec<String>,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub approximate_age: Option<String>,
}

/// Location as typed by the user, before province validation
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LocationInput {
    #[validate(length(min = 1))]
    pub province: String,
    #[validate(length(min = 1))]
    pub canton: String,
    #[validate(length(min = 1))]
    pub district: String,
    #[serde(default)]
    pub additional_details: Option<String>,
    #[serde(default)]
    pub coordinates: Option<GeoPoint>,
}

/// Raw lost-pet or sighting report submitted by a user
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReportRequest {
    #[validate(length(min = 10))]
    pub description: String,
    #[serde(default)]
    #[validate(length(max = 5))]
    pub images: Vec<ImageDescriptor>,
    #[validate(nested)]
    pub location: LocationInput,
    #[serde(default)]
    pub last_seen_date: Option<NaiveDate>,
    #[serde(default)]
    pub contact_info: Option<String>,
    #[serde(default = "default_report_type")]
    pub report_type: ReportKind,
}

fn default_report_type() -> ReportKind {
    ReportKind::Lost
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(description: &str, images: usize) -> ReportRequest {
        ReportRequest {
            description: description.to_string(),
            images: vec![ImageDescriptor::default(); images],
            location: LocationInput {
                province: "San José".into(),
                canton: "Escazú".into(),
                district: "San Rafael".into(),
                additional_details: None,
                coordinates: None,
            },
            last_seen_date: None,
            contact_info: None,
            report_type: ReportKind::Lost,
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(request("My dog is missing since yesterday", 2).validate().is_ok());
    }

    #[test]
    fn test_short_description_rejected() {
        assert!(request("lost dog", 0).validate().is_err());
    }

    #[test]
    fn test_too_many_images_rejected() {
        assert!(request("Test description with enough characters", 6)
            .validate()
            .is_err());
    }

    #[test]
    fn test_report_type_defaults_to_lost() {
        let json = r#"{
            "description": "Small black cat with a white chest",
            "location": {"province": "Heredia", "canton": "Barva", "district": "San Pablo"}
        }"#;
        let parsed: ReportRequest = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.report_type, ReportKind::Lost);
        assert!(parsed.images.is_empty());
    }
}
