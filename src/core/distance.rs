use chrono::{DateTime, Utc};

use crate::models::Location;

/// Placeholder distance when both reports name the same district
pub const SAME_DISTRICT_KM: f64 = 0.5;
/// Same canton, different district
pub const SAME_CANTON_KM: f64 = 3.0;
/// Same province, different canton
pub const SAME_PROVINCE_KM: f64 = 15.0;
/// Different provinces
pub const OTHER_PROVINCE_KM: f64 = 50.0;

/// Estimate the distance between two locations in kilometers
///
/// Corpus records carry no reliable coordinates, so this walks the
/// province/canton/district hierarchy and returns a fixed value per level.
/// The figure is shown to users and never feeds the similarity score.
#[inline]
pub fn estimate_distance_km(a: &Location, b: &Location) -> f64 {
    if a.province != b.province {
        OTHER_PROVINCE_KM
    } else if a.canton != b.canton {
        SAME_PROVINCE_KM
    } else if a.district != b.district {
        SAME_CANTON_KM
    } else {
        SAME_DISTRICT_KM
    }
}

/// Whole days elapsed since a report was filed, never negative
#[inline]
pub fn days_since(reported_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - reported_at).num_days().max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Province;
    use chrono::Duration;

    fn location(province: Province, canton: &str, district: &str) -> Location {
        Location::new(province, canton, district).unwrap()
    }

    #[test]
    fn test_distance_hierarchy() {
        let home = location(Province::SanJose, "Escazú", "San Rafael");

        let same = location(Province::SanJose, "Escazú", "San Rafael");
        let district = location(Province::SanJose, "Escazú", "San Antonio");
        let canton = location(Province::SanJose, "Santa Ana", "Pozos");
        let province = location(Province::Cartago, "Cartago", "Oriental");

        assert_eq!(estimate_distance_km(&home, &same), SAME_DISTRICT_KM);
        assert_eq!(estimate_distance_km(&home, &district), SAME_CANTON_KM);
        assert_eq!(estimate_distance_km(&home, &canton), SAME_PROVINCE_KM);
        assert_eq!(estimate_distance_km(&home, &province), OTHER_PROVINCE_KM);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = location(Province::Heredia, "Barva", "San Pablo");
        let b = location(Province::Heredia, "Belén", "La Ribera");

        assert_eq!(estimate_distance_km(&a, &b), estimate_distance_km(&b, &a));
    }

    #[test]
    fn test_days_since() {
        let now = Utc::now();
        assert_eq!(days_since(now - Duration::days(3), now), 3);
        assert_eq!(days_since(now - Duration::hours(5), now), 0);
        // Reports dated in the future clamp to zero
        assert_eq!(days_since(now + Duration::days(2), now), 0);
    }
}
