use std::collections::HashSet;

use crate::config;
use crate::models::UserProfileRow;
use crate::services::geo;

/// Why a candidate was rejected. Logged for observability, never shown to
/// the end user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    SelfMatch,
    OnboardingIncomplete,
    DiscoveryDisabled,
    Incognito,
    AlreadySwiped,
    Blocked,
    CandidateAgeOutsideViewerRange,
    ViewerAgeOutsideCandidateRange,
    CandidateGenderMismatch,
    ViewerGenderMismatch,
    TooFar,
}

impl Violation {
    pub fn as_str(self) -> &'static str {
        match self {
            Violation::SelfMatch => "self_match",
            Violation::OnboardingIncomplete => "onboarding_incomplete",
            Violation::DiscoveryDisabled => "discovery_disabled",
            Violation::Incognito => "incognito",
            Violation::AlreadySwiped => "already_swiped",
            Violation::Blocked => "blocked",
            Violation::CandidateAgeOutsideViewerRange => "candidate_age_outside_viewer_range",
            Violation::ViewerAgeOutsideCandidateRange => "viewer_age_outside_candidate_range",
            Violation::CandidateGenderMismatch => "candidate_gender_mismatch",
            Violation::ViewerGenderMismatch => "viewer_gender_mismatch",
            Violation::TooFar => "too_far",
        }
    }
}

/// Hard pass/fail gating for one viewer/candidate pair. Every violated
/// constraint is collected; an empty list means eligible. Scoring is the
/// expensive path, so the ranker calls this first and skips scoring on any
/// violation.
pub fn check(
    viewer: &UserProfileRow,
    candidate: &UserProfileRow,
    swiped_ids: &HashSet<String>,
    blocked_ids: &HashSet<String>,
    max_distance_override: Option<i64>,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    if candidate.user_id == viewer.user_id {
        violations.push(Violation::SelfMatch);
    }
    if !candidate.is_onboarded() {
        violations.push(Violation::OnboardingIncomplete);
    }
    if !candidate.is_discoverable() {
        violations.push(Violation::DiscoveryDisabled);
    }
    if candidate.is_incognito() {
        violations.push(Violation::Incognito);
    }
    if swiped_ids.contains(&candidate.user_id) {
        violations.push(Violation::AlreadySwiped);
    }
    if blocked_ids.contains(&candidate.user_id) {
        violations.push(Violation::Blocked);
    }

    // Both parties' stated preferences must be satisfied.
    if !age_within_bounds(candidate.age, viewer.min_age, viewer.max_age) {
        violations.push(Violation::CandidateAgeOutsideViewerRange);
    }
    if !age_within_bounds(viewer.age, candidate.min_age, candidate.max_age) {
        violations.push(Violation::ViewerAgeOutsideCandidateRange);
    }
    if !gender_accepted(viewer.gender_preference.as_deref(), candidate.gender.as_deref()) {
        violations.push(Violation::CandidateGenderMismatch);
    }
    if !gender_accepted(candidate.gender_preference.as_deref(), viewer.gender.as_deref()) {
        violations.push(Violation::ViewerGenderMismatch);
    }

    // Missing coordinates on either side means "distance unknown", which
    // never excludes; only an explicit over-limit distance does.
    let max_distance = max_distance_override.or(viewer.max_distance_km);
    if let (Some(max_km), Some((vlat, vlon)), Some((clat, clon))) =
        (max_distance, viewer.location(), candidate.location())
    {
        if geo::haversine_km(vlat, vlon, clat, clon) > max_km as f64 {
            violations.push(Violation::TooFar);
        }
    }

    violations
}

// Unset bounds default to the maximally broad range.
fn age_within_bounds(age: Option<i64>, min_age: Option<i64>, max_age: Option<i64>) -> bool {
    let Some(age) = age else {
        // No recorded age: only an explicitly configured bound can exclude,
        // and with nothing to compare we let the candidate through.
        return true;
    };
    let min = min_age.unwrap_or(config::DEFAULT_MIN_AGE);
    let max = max_age.unwrap_or(config::DEFAULT_MAX_AGE);
    age >= min && age <= max
}

fn gender_accepted(preference: Option<&str>, gender: Option<&str>) -> bool {
    let preference = preference.map(str::trim).filter(|p| !p.is_empty());
    let Some(preference) = preference else {
        return true;
    };
    if preference.eq_ignore_ascii_case("any") {
        return true;
    }
    match gender.map(str::trim).filter(|g| !g.is_empty()) {
        Some(gender) => preference.eq_ignore_ascii_case(gender),
        // Candidate never stated a gender; an explicit preference cannot
        // match it, so this fails closed.
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::profile;

    fn no_history() -> (HashSet<String>, HashSet<String>) {
        (HashSet::new(), HashSet::new())
    }

    #[test]
    fn fully_compatible_pair_is_eligible() {
        let viewer = profile("viewer");
        let candidate = profile("candidate");
        let (swiped, blocked) = no_history();
        assert!(check(&viewer, &candidate, &swiped, &blocked, None).is_empty());
    }

    #[test]
    fn self_is_never_eligible() {
        let viewer = profile("viewer");
        let (swiped, blocked) = no_history();
        assert_eq!(
            check(&viewer, &viewer.clone(), &swiped, &blocked, None),
            vec![Violation::SelfMatch]
        );
    }

    #[test]
    fn incomplete_or_hidden_candidates_fail() {
        let viewer = profile("viewer");
        let (swiped, blocked) = no_history();

        let mut candidate = profile("candidate");
        candidate.onboarding_completed = Some(0);
        assert!(check(&viewer, &candidate, &swiped, &blocked, None)
            .contains(&Violation::OnboardingIncomplete));

        let mut candidate = profile("candidate");
        candidate.discovery_enabled = Some(0);
        assert!(check(&viewer, &candidate, &swiped, &blocked, None)
            .contains(&Violation::DiscoveryDisabled));

        let mut candidate = profile("candidate");
        candidate.incognito_mode = Some(1);
        assert!(
            check(&viewer, &candidate, &swiped, &blocked, None).contains(&Violation::Incognito)
        );
    }

    #[test]
    fn swiped_and_blocked_candidates_fail() {
        let viewer = profile("viewer");
        let candidate = profile("candidate");

        let swiped: HashSet<String> = ["candidate".to_string()].into();
        assert!(check(&viewer, &candidate, &swiped, &HashSet::new(), None)
            .contains(&Violation::AlreadySwiped));

        let blocked: HashSet<String> = ["candidate".to_string()].into();
        assert!(check(&viewer, &candidate, &HashSet::new(), &blocked, None)
            .contains(&Violation::Blocked));
    }

    #[test]
    fn age_gate_is_bidirectional() {
        let (swiped, blocked) = no_history();

        // Viewer wants 25-35, candidate is 40.
        let mut viewer = profile("viewer");
        viewer.min_age = Some(25);
        viewer.max_age = Some(35);
        let mut candidate = profile("candidate");
        candidate.age = Some(40);
        assert!(check(&viewer, &candidate, &swiped, &blocked, None)
            .contains(&Violation::CandidateAgeOutsideViewerRange));

        // Candidate wants 18-25, viewer is 30.
        let mut viewer = profile("viewer");
        viewer.age = Some(30);
        let mut candidate = profile("candidate");
        candidate.min_age = Some(18);
        candidate.max_age = Some(25);
        assert!(check(&viewer, &candidate, &swiped, &blocked, None)
            .contains(&Violation::ViewerAgeOutsideCandidateRange));
    }

    #[test]
    fn unset_preferences_default_to_broad_bounds() {
        let (swiped, blocked) = no_history();
        let viewer = profile("viewer");
        let mut candidate = profile("candidate");
        candidate.age = Some(99);
        assert!(check(&viewer, &candidate, &swiped, &blocked, None).is_empty());

        let mut teen = profile("teen");
        teen.age = Some(17);
        assert!(check(&viewer, &teen, &swiped, &blocked, None)
            .contains(&Violation::CandidateAgeOutsideViewerRange));
    }

    #[test]
    fn gender_gate_is_bidirectional_and_case_insensitive() {
        let (swiped, blocked) = no_history();

        let mut viewer = profile("viewer");
        viewer.gender_preference = Some("Female".to_string());
        let mut candidate = profile("candidate");
        candidate.gender = Some("female".to_string());
        assert!(check(&viewer, &candidate, &swiped, &blocked, None).is_empty());

        candidate.gender = Some("male".to_string());
        assert!(check(&viewer, &candidate, &swiped, &blocked, None)
            .contains(&Violation::CandidateGenderMismatch));

        let mut viewer = profile("viewer");
        viewer.gender = Some("male".to_string());
        let mut candidate = profile("candidate");
        candidate.gender_preference = Some("female".to_string());
        assert!(check(&viewer, &candidate, &swiped, &blocked, None)
            .contains(&Violation::ViewerGenderMismatch));
    }

    #[test]
    fn any_preference_accepts_everyone() {
        let (swiped, blocked) = no_history();
        let mut viewer = profile("viewer");
        viewer.gender_preference = Some("any".to_string());
        let mut candidate = profile("candidate");
        candidate.gender = Some("non_binary".to_string());
        assert!(check(&viewer, &candidate, &swiped, &blocked, None).is_empty());
    }

    #[test]
    fn distance_gate_fails_closed_on_explicit_mismatch() {
        let (swiped, blocked) = no_history();
        let mut viewer = profile("viewer");
        viewer.max_distance_km = Some(10);
        viewer.latitude = Some(52.3676);
        viewer.longitude = Some(4.9041);

        // Utrecht is ~35 km from Amsterdam.
        let mut candidate = profile("candidate");
        candidate.latitude = Some(52.0907);
        candidate.longitude = Some(5.1214);
        assert!(
            check(&viewer, &candidate, &swiped, &blocked, None).contains(&Violation::TooFar)
        );
    }

    #[test]
    fn missing_location_never_excludes() {
        let (swiped, blocked) = no_history();
        let mut viewer = profile("viewer");
        viewer.max_distance_km = Some(10);
        viewer.latitude = Some(52.3676);
        viewer.longitude = Some(4.9041);

        let candidate = profile("candidate");
        assert!(check(&viewer, &candidate, &swiped, &blocked, None).is_empty());
    }

    #[test]
    fn caller_distance_override_wins() {
        let (swiped, blocked) = no_history();
        let mut viewer = profile("viewer");
        viewer.max_distance_km = Some(500);
        viewer.latitude = Some(52.3676);
        viewer.longitude = Some(4.9041);

        let mut candidate = profile("candidate");
        candidate.latitude = Some(52.0907);
        candidate.longitude = Some(5.1214);

        assert!(check(&viewer, &candidate, &swiped, &blocked, None).is_empty());
        assert!(check(&viewer, &candidate, &swiped, &blocked, Some(10))
            .contains(&Violation::TooFar));
    }
}
