use crate::models::{ConfidenceLevel, MatchCandidate, MatchResult, PetDescription, ReportKind, MAX_RECOMMENDATIONS};

/// Scores at or above this always warrant a notification
pub const NOTIFY_SCORE: f64 = 0.75;
/// Nearby candidates notify from this score
pub const NOTIFY_NEARBY_SCORE: f64 = 0.6;
/// Recent sightings notify from this score
pub const NOTIFY_SIGHTING_SCORE: f64 = 0.65;
pub const NEARBY_KM: f64 = 5.0;
pub const RECENT_SIGHTING_DAYS: i64 = 7;

const FEATURES_IN_ADVICE: usize = 3;

/// Text handed back to the user for one matching run
#[derive(Debug, Clone, PartialEq)]
pub struct Explanation {
    pub explanation: String,
    pub recommended_actions: Vec<String>,
    pub confidence_summary: String,
    /// Candidates significant enough to notify the owner about, in rank order
    pub notify_match_ids: Vec<String>,
}

/// Template-driven explanation of a match result
#[derive(Debug, Clone)]
pub struct Explainer {
    similarity_threshold: f64,
}

impl Explainer {
    pub fn new(similarity_threshold: f64) -> Self {
        Self {
            similarity_threshold,
        }
    }

    pub fn similarity_threshold(&self) -> f64 {
        self.similarity_threshold
    }

    pub fn explain(&self, pet: &PetDescription, result: &MatchResult) -> Explanation {
        Explanation {
            explanation: self.explanation_text(pet, result),
            recommended_actions: self.recommendations(pet, result),
            confidence_summary: confidence_summary(result.confidence_level).to_string(),
            notify_match_ids: result
                .candidates
                .iter()
                .filter(|c| should_notify(c))
                .map(|c| c.match_id.clone())
                .collect(),
        }
    }

    /// Next steps for the user, keyed on the confidence tier
    pub fn recommendations(&self, pet: &PetDescription, result: &MatchResult) -> Vec<String> {
        let mut actions: Vec<String> = Vec::new();

        match (result.confidence_level, result.top_match.as_ref()) {
            (ConfidenceLevel::High, Some(top)) => {
                actions.push(format!(
                    "Contact the reporter of {} immediately, this is a strong match",
                    top.match_id
                ));
                actions.push("Bring photos of your pet when meeting to verify identity".into());
                actions.push("Ask specific questions about distinctive features to confirm".into());
                actions.push("Be prepared to provide proof of ownership if the pet is found".into());

                if top.report_type == ReportKind::Sighting {
                    actions.push(format!(
                        "Visit the sighting location ({}) as soon as possible",
                        pet.last_seen_location.canton
                    ));
                }
            }
            (ConfidenceLevel::Medium, top) => {
                actions.push(
                    "Review the potential matches carefully and contact reporters for more details"
                        .into(),
                );
                actions.push("Ask for additional photos or descriptions to verify".into());
                actions.push("Continue active searching in the reported areas".into());
                actions.push("Post your pet's information on local lost pet groups".into());

                if let Some(distance) = top.and_then(|t| t.location_distance_km) {
                    if distance < NEARBY_KM {
                        actions.push(format!(
                            "Focus search efforts within {:.1} km of the last known location",
                            distance
                        ));
                    }
                }
            }
            (ConfidenceLevel::Low, _) => {
                actions.push("The matches found have low similarity, continue searching".into());
                actions.push("Expand your search radius to nearby areas".into());
                actions.push(
                    "Post detailed descriptions and clear photos on multiple platforms".into(),
                );
                actions.push(
                    "Contact local animal control and shelters with your pet's description".into(),
                );
                actions.push("Consider offering a reward to increase community engagement".into());
            }
            _ => {
                actions.push("Continue monitoring for new sightings in your area".into());
                actions.push("Post on local social media groups and pet recovery pages".into());
                actions.push("Visit nearby shelters and veterinary clinics".into());
                actions.push("Put up physical flyers in the neighborhood".into());
                actions.push("Check back regularly as new reports are added daily".into());
            }
        }

        if !pet.distinctive_features.is_empty() {
            let features: Vec<&str> = pet
                .distinctive_features
                .iter()
                .take(FEATURES_IN_ADVICE)
                .map(String::as_str)
                .collect();
            actions.push(format!(
                "When posting, emphasize distinctive features: {}",
                features.join(", ")
            ));
        }

        actions.truncate(MAX_RECOMMENDATIONS);
        actions
    }

    /// Summary paragraph of the run
    pub fn explanation_text(&self, pet: &PetDescription, result: &MatchResult) -> String {
        let top = match result.top_match.as_ref() {
            Some(top) if result.confidence_level != ConfidenceLevel::None => top,
            _ => {
                return format!(
                    "No matches found yet for this {} {}. We'll keep searching and notify you of new reports in {}.",
                    pet.size, pet.species, pet.last_seen_location.canton
                );
            }
        };

        let strength = match result.confidence_level {
            ConfidenceLevel::High => "strong",
            ConfidenceLevel::Medium => "moderate",
            _ => "weak",
        };

        let mut text = format!(
            "Searched {} reports and found {} potential matches above the {:.0}% threshold, with {} overall similarity. ",
            result.total_candidates_found,
            result.count_above_threshold(self.similarity_threshold),
            self.similarity_threshold * 100.0,
            strength
        );

        text.push_str(&format!(
            "The top match ({}) has a {:.0}% similarity score",
            top.match_id,
            top.similarity_score * 100.0
        ));
        if let Some(distance) = top.location_distance_km {
            text.push_str(&format!(" and is located {:.1} km away", distance));
        }
        text.push_str(". Review the details and contact the reporter if it looks promising.");

        text
    }
}

impl Default for Explainer {
    fn default() -> Self {
        Self::new(ConfidenceLevel::MEDIUM_THRESHOLD)
    }
}

pub fn confidence_summary(level: ConfidenceLevel) -> &'static str {
    match level {
        ConfidenceLevel::High => "High confidence match found! This could be your pet.",
        ConfidenceLevel::Medium => "Moderate confidence matches found. Worth investigating further.",
        ConfidenceLevel::Low => "Low confidence matches. Continue searching and monitoring.",
        ConfidenceLevel::None => "No strong matches found yet. Keep searching and check back regularly.",
    }
}

/// Whether a candidate is significant enough to notify the owner
pub fn should_notify(candidate: &MatchCandidate) -> bool {
    let score = candidate.similarity_score;

    if score >= NOTIFY_SCORE {
        return true;
    }

    let nearby = candidate
        .location_distance_km
        .map(|d| d < NEARBY_KM)
        .unwrap_or(false);
    if score >= NOTIFY_NEARBY_SCORE && nearby {
        return true;
    }

    let recent_sighting = candidate.report_type == ReportKind::Sighting
        && candidate
            .days_since_report
            .map(|d| d <= RECENT_SIGHTING_DAYS)
            .unwrap_or(false);

    recent_sighting && score >= NOTIFY_SIGHTING_SCORE
}
