use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::warn;

use crate::models::{Grade, ScoreBreakdown, SubScore, UserProfileRow};
use crate::services::scoring::{astrology, questionnaire};

/// Score used when neither calculator has anything to work with.
pub const NEUTRAL_SCORE: i64 = 50;

/// Compute the full breakdown for one pair of profiles. Never fails: a
/// calculator fault is logged and treated as "sub-score unavailable".
pub fn score_pair(a: &UserProfileRow, b: &UserProfileRow) -> ScoreBreakdown {
    let questionnaire = run_calculator("questionnaire", &a.user_id, &b.user_id, || {
        let answers_a = questionnaire::parse_answers(a.questionnaire_json.as_deref());
        let answers_b = questionnaire::parse_answers(b.questionnaire_json.as_deref());
        questionnaire::score(&answers_a, &answers_b)
    });
    let attribute = run_calculator("astrology", &a.user_id, &b.user_id, || {
        let chart_a = astrology::parse_chart(a.natal_chart_json.as_deref());
        let chart_b = astrology::parse_chart(b.natal_chart_json.as_deref());
        astrology::score(&chart_a, &chart_b)
    });
    combine(questionnaire, attribute)
}

/// Fixed 50/50 weighting when both sub-scores are present; a single
/// available sub-score stands alone; neither falls back to the neutral
/// default. The neutral default is graded C regardless of the thresholds:
/// "we know nothing" is not an F.
pub fn combine(questionnaire: Option<SubScore>, attribute: Option<SubScore>) -> ScoreBreakdown {
    let overall = match (questionnaire, attribute) {
        (Some(q), Some(a)) => (0.5 * q.score as f64 + 0.5 * a.score as f64).round() as i64,
        (Some(q), None) => q.score,
        (None, Some(a)) => a.score,
        (None, None) => {
            return ScoreBreakdown {
                overall_score: NEUTRAL_SCORE,
                overall_grade: Grade::C,
                questionnaire: None,
                attribute: None,
                is_recommended: false,
            };
        }
    };
    ScoreBreakdown::from_overall(overall, questionnaire, attribute)
}

// The calculators are pure; a panic here means malformed per-user data hit
// an untested path. That must never abort ranking for the other candidates.
fn run_calculator<F>(name: &'static str, user_a: &str, user_b: &str, compute: F) -> Option<SubScore>
where
    F: FnOnce() -> Option<SubScore>,
{
    match catch_unwind(AssertUnwindSafe(compute)) {
        Ok(result) => result,
        Err(_) => {
            warn!(
                calculator = name,
                user_a, user_b, "calculator failed, treating sub-score as unavailable"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Grade;

    #[test]
    fn both_scores_are_weighted_evenly() {
        let result = combine(Some(SubScore::new(80)), Some(SubScore::new(60)));
        assert_eq!(result.overall_score, 70);
        assert_eq!(result.overall_grade, Grade::C);
        assert!(result.is_recommended);
    }

    #[test]
    fn halves_round_to_nearest() {
        let result = combine(Some(SubScore::new(71)), Some(SubScore::new(72)));
        assert_eq!(result.overall_score, 72);
    }

    #[test]
    fn single_score_stands_alone() {
        let q = combine(Some(SubScore::new(93)), None);
        assert_eq!(q.overall_score, 93);
        assert_eq!(q.overall_grade, Grade::A);
        assert!(q.attribute.is_none());

        let a = combine(None, Some(SubScore::new(42)));
        assert_eq!(a.overall_score, 42);
        assert_eq!(a.overall_grade, Grade::F);
    }

    #[test]
    fn neither_score_falls_back_to_neutral() {
        let result = combine(None, None);
        assert_eq!(result.overall_score, 50);
        assert_eq!(result.overall_grade, Grade::C);
        assert!(!result.is_recommended);
        assert!(result.questionnaire.is_none());
        assert!(result.attribute.is_none());
    }

    #[test]
    fn overall_grade_ignores_sub_grades() {
        // A and F sub-grades average to a C-range overall; the grade comes
        // from the overall score, not from the letters.
        let result = combine(Some(SubScore::new(95)), Some(SubScore::new(45)));
        assert_eq!(result.overall_score, 70);
        assert_eq!(result.overall_grade, Grade::C);
        assert_eq!(result.questionnaire.unwrap().grade, Grade::A);
        assert_eq!(result.attribute.unwrap().grade, Grade::F);
    }

    #[test]
    fn calculator_panic_degrades_to_unavailable() {
        let result = run_calculator("questionnaire", "a", "b", || panic!("bad data"));
        assert!(result.is_none());
    }
}
