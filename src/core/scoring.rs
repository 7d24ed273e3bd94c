use std::collections::HashSet;

use crate::models::{Location, PetDescription, ScoringWeights};

/// Per-dimension similarity, each value in [0, 1] before weighting
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DimensionScores {
    pub species: f64,
    pub size: f64,
    pub colors: f64,
    pub features: f64,
    pub location: f64,
}

impl DimensionScores {
    /// Weighted sum of the dimensions, clamped to [0, 1]
    pub fn weighted(&self, weights: &ScoringWeights) -> f64 {
        let total = self.species * weights.species
            + self.size * weights.size
            + self.colors * weights.colors
            + self.features * weights.features
            + self.location * weights.location;

        total.clamp(0.0, 1.0)
    }
}

/// Calculate the heuristic similarity (0-1) between a query and a candidate
///
/// Scoring formula:
/// score = (
///     species_match * 0.30 +      # exact species
///     size_match * 0.20 +         # exact size
///     color_jaccard * 0.20 +      # overlap of color sets
///     feature_jaccard * 0.20 +    # overlap of features, substring-aware
///     location_score * 0.10       # 1.0 same canton, 0.5 same province
/// )
///
/// The score is rounded to three decimals.
pub fn calculate_match_score(
    query: &PetDescription,
    candidate: &PetDescription,
    weights: &ScoringWeights,
) -> (f64, DimensionScores) {
    let dimensions = score_dimensions(query, candidate);
    (round_score(dimensions.weighted(weights)), dimensions)
}

/// Score every dimension independently
pub fn score_dimensions(query: &PetDescription, candidate: &PetDescription) -> DimensionScores {
    DimensionScores {
        species: exact(query.species == candidate.species),
        size: exact(query.size == candidate.size),
        colors: color_similarity(&query.colors, &candidate.colors),
        features: feature_similarity(&query.distinctive_features, &candidate.distinctive_features),
        location: location_score(&query.last_seen_location, &candidate.last_seen_location),
    }
}

/// Round a score to three decimals
#[inline]
pub fn round_score(score: f64) -> f64 {
    (score * 1000.0).round() / 1000.0
}

#[inline]
fn exact(equal: bool) -> f64 {
    if equal {
        1.0
    } else {
        0.0
    }
}

/// Jaccard similarity of two color lists, compared case-insensitively
pub fn color_similarity(query: &[String], candidate: &[String]) -> f64 {
    let query = unique_lowercase(query);
    let candidate = unique_lowercase(candidate);
    if query.is_empty() || candidate.is_empty() {
        return 0.0;
    }

    let shared = query.iter().filter(|c| candidate.contains(c)).count();
    jaccard(shared, query.len(), candidate.len())
}

/// Colors present in both lists, in query order
pub fn shared_colors(query: &[String], candidate: &[String]) -> Vec<String> {
    let candidate = unique_lowercase(candidate);
    unique_lowercase(query)
        .into_iter()
        .filter(|c| candidate.contains(c))
        .collect()
}

/// Jaccard similarity of two feature lists
///
/// Two features are shared when one contains the other after lowercasing.
/// Each candidate feature pairs with at most one query feature, so the
/// intersection never exceeds the smaller set.
pub fn feature_similarity(query: &[String], candidate: &[String]) -> f64 {
    let query_len = unique_lowercase(query).len();
    let candidate_len = unique_lowercase(candidate).len();
    if query_len == 0 || candidate_len == 0 {
        return 0.0;
    }

    let shared = shared_features(query, candidate).len();
    jaccard(shared, query_len, candidate_len)
}

/// Query features that pair with a candidate feature, in query order
pub fn shared_features(query: &[String], candidate: &[String]) -> Vec<String> {
    let candidate = unique_lowercase(candidate);
    let mut used = vec![false; candidate.len()];
    let mut shared = Vec::new();

    for feature in unique_lowercase(query) {
        let paired = (0..candidate.len())
            .find(|&i| !used[i] && features_overlap(&feature, &candidate[i]));
        if let Some(i) = paired {
            used[i] = true;
            shared.push(feature);
        }
    }

    shared
}

#[inline]
fn features_overlap(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty() && (a.contains(b) || b.contains(a))
}

/// Location proximity: 1.0 for the same canton, 0.5 for the same province only
#[inline]
pub fn location_score(query: &Location, candidate: &Location) -> f64 {
    if query.province != candidate.province {
        0.0
    } else if query.canton == candidate.canton {
        1.0
    } else {
        0.5
    }
}

#[inline]
fn jaccard(shared: usize, left: usize, right: usize) -> f64 {
    let union = left + right - shared;
    if union == 0 {
        return 0.0;
    }
    shared as f64 / union as f64
}

/// Trimmed, lowercased, de-duplicated entries in first-seen order
fn unique_lowercase(values: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty() && seen.insert(v.clone()))
        .collect()
}

/// Human-readable reasons for the dimensions that scored above zero
///
/// Reasons follow a fixed order: species, size, colors, features, location.
pub fn matching_reasons(
    query: &PetDescription,
    candidate: &PetDescription,
    dimensions: &DimensionScores,
) -> Vec<String> {
    let mut reasons = Vec::new();

    if dimensions.species > 0.0 {
        reasons.push(format!("Same species ({})", query.species));
    }

    if dimensions.size > 0.0 {
        reasons.push(format!("Same size ({})", query.size));
    }

    if dimensions.colors > 0.0 {
        let colors = shared_colors(&query.colors, &candidate.colors);
        reasons.push(format!("Matching colors: {}", colors.join(", ")));
    }

    if dimensions.features > 0.0 {
        let features = shared_features(&query.distinctive_features, &candidate.distinctive_features);
        reasons.push(format!("Similar features: {}", features.join(", ")));
    }

    let location = &query.last_seen_location;
    if dimensions.location >= 1.0 {
        reasons.push(format!("Same area ({})", location.canton));
    } else if dimensions.location > 0.0 {
        reasons.push(format!("Same province ({})", location.province));
    }

    reasons
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Province, Size, Species};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn description(
        species: Species,
        size: Size,
        colors: &[&str],
        features: &[&str],
        province: Province,
        canton: &str,
    ) -> PetDescription {
        PetDescription {
            species,
            size,
            colors: strings(colors),
            distinctive_features: strings(features),
            breed: None,
            approximate_age: None,
            last_seen_location: Location::new(province, canton, "Centro").unwrap(),
            last_seen_date: None,
        }
    }

    #[test]
    fn test_color_jaccard() {
        let a = strings(&["white", "brown"]);
        let b = strings(&["Brown", "black"]);

        // {brown} / {white, brown, black}
        assert!((color_similarity(&a, &b) - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(color_similarity(&a, &a), 1.0);
        assert_eq!(color_similarity(&a, &[]), 0.0);
    }

    #[test]
    fn test_feature_substring_overlap() {
        let query = strings(&["Red collar", "black spot on left ear"]);
        let candidate = strings(&["red collar with a bell", "limps"]);

        assert_eq!(shared_features(&query, &candidate), vec!["red collar"]);
        // 1 shared / (2 + 2 - 1)
        assert!((feature_similarity(&query, &candidate) - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_feature_pairing_is_one_to_one() {
        let query = strings(&["spot", "black spot"]);
        let candidate = strings(&["black spot on ear"]);

        assert_eq!(shared_features(&query, &candidate).len(), 1);
        assert!(feature_similarity(&query, &candidate) <= 1.0);
    }

    #[test]
    fn test_location_score() {
        let a = Location::new(Province::SanJose, "Escazú", "San Rafael").unwrap();
        let b = Location::new(Province::SanJose, "Escazú", "San Antonio").unwrap();
        let c = Location::new(Province::SanJose, "Santa Ana", "Pozos").unwrap();
        let d = Location::new(Province::Alajuela, "Escazú", "San Rafael").unwrap();

        assert_eq!(location_score(&a, &b), 1.0);
        assert_eq!(location_score(&a, &c), 0.5);
        assert_eq!(location_score(&a, &d), 0.0);
    }

    #[test]
    fn test_identical_descriptions_score_one() {
        let pet = description(
            Species::Dog,
            Size::Medium,
            &["white", "brown"],
            &["red collar"],
            Province::SanJose,
            "Escazú",
        );

        let (score, _) = calculate_match_score(&pet, &pet, &ScoringWeights::default());
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_species_only_scores_point_three() {
        let query = description(Species::Dog, Size::Small, &["white"], &["scar"], Province::SanJose, "Escazú");
        let candidate = description(Species::Dog, Size::Large, &["black"], &["limps"], Province::Limon, "Talamanca");

        let (score, dimensions) = calculate_match_score(&query, &candidate, &ScoringWeights::default());
        assert_eq!(score, 0.3);
        assert_eq!(
            matching_reasons(&query, &candidate, &dimensions),
            vec!["Same species (dog)"]
        );
    }

    #[test]
    fn test_reasons_follow_fixed_order() {
        let query = description(
            Species::Cat,
            Size::Small,
            &["black", "white"],
            &["white chest"],
            Province::Heredia,
            "Barva",
        );
        let candidate = description(
            Species::Cat,
            Size::Small,
            &["black"],
            &["white chest patch"],
            Province::Heredia,
            "Belén",
        );

        let dimensions = score_dimensions(&query, &candidate);
        let reasons = matching_reasons(&query, &candidate, &dimensions);

        assert_eq!(
            reasons,
            vec![
                "Same species (cat)",
                "Same size (small)",
                "Matching colors: black",
                "Similar features: white chest",
                "Same province (Heredia)",
            ]
        );
    }

    #[test]
    fn test_no_overlap_has_no_reasons() {
        let query = description(Species::Dog, Size::Small, &["white"], &[], Province::SanJose, "Escazú");
        let candidate = description(Species::Cat, Size::Large, &["black"], &[], Province::Limon, "Talamanca");

        let (score, dimensions) = calculate_match_score(&query, &candidate, &ScoringWeights::default());
        assert_eq!(score, 0.0);
        assert!(matching_reasons(&query, &candidate, &dimensions).is_empty());
    }

    #[test]
    fn test_score_is_clamped() {
        let heavy = ScoringWeights {
            species: 1.0,
            size: 1.0,
            colors: 1.0,
            features: 1.0,
            location: 1.0,
        };
        let pet = description(Species::Dog, Size::Medium, &["white"], &["scar"], Province::SanJose, "Escazú");

        let (score, _) = calculate_match_score(&pet, &pet, &heavy);
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_round_score() {
        assert_eq!(round_score(0.7999999999999999), 0.8);
        assert_eq!(round_score(0.12345), 0.123);
    }
}
