use serde::Serialize;

use crate::config;

/// Letter grade derived from a 0-100 score via fixed thresholds, shared by
/// every calculator and by the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn for_score(score: i64) -> Grade {
        match score {
            s if s >= 90 => Grade::A,
            s if s >= 80 => Grade::B,
            s if s >= 70 => Grade::C,
            s if s >= 60 => Grade::D,
            _ => Grade::F,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }

    pub fn parse(raw: &str) -> Option<Grade> {
        match raw.trim() {
            "A" => Some(Grade::A),
            "B" => Some(Grade::B),
            "C" => Some(Grade::C),
            "D" => Some(Grade::D),
            "F" => Some(Grade::F),
            _ => None,
        }
    }
}

/// One calculator's contribution: a 0-100 score plus its grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubScore {
    pub score: i64,
    pub grade: Grade,
}

impl SubScore {
    pub fn new(score: i64) -> SubScore {
        let score = score.clamp(0, 100);
        SubScore {
            score,
            grade: Grade::for_score(score),
        }
    }
}

/// Aggregated result for one unordered user pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub overall_score: i64,
    pub overall_grade: Grade,
    pub questionnaire: Option<SubScore>,
    pub attribute: Option<SubScore>,
    pub is_recommended: bool,
}

impl ScoreBreakdown {
    pub fn from_overall(
        overall_score: i64,
        questionnaire: Option<SubScore>,
        attribute: Option<SubScore>,
    ) -> ScoreBreakdown {
        let overall_score = overall_score.clamp(0, 100);
        ScoreBreakdown {
            overall_score,
            overall_grade: Grade::for_score(overall_score),
            questionnaire,
            attribute,
            is_recommended: overall_score >= config::RECOMMENDATION_THRESHOLD,
        }
    }
}

/// Raw cache-table row. `is_fresh` is computed in SQL against the configured
/// freshness window so "present-but-stale" stays distinguishable from absent.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CompatibilityScoreRow {
    pub user_a_id: String,
    pub user_b_id: String,
    pub overall_score: i64,
    pub questionnaire_score: Option<i64>,
    pub attribute_score: Option<i64>,
    pub overall_grade: String,
    pub questionnaire_grade: Option<String>,
    pub attribute_grade: Option<String>,
    pub is_recommended: i64,
    pub calculated_at: String,
    pub is_fresh: i64,
}

/// Cache read result handed to the scoring path.
#[derive(Debug, Clone)]
pub struct CachedScore {
    pub breakdown: ScoreBreakdown,
    pub calculated_at: String,
    pub is_fresh: bool,
}

impl From<CompatibilityScoreRow> for CachedScore {
    fn from(row: CompatibilityScoreRow) -> CachedScore {
        // Stored grades are authoritative (the neutral default is graded C,
        // which the threshold function alone would not reproduce).
        let sub = |score: Option<i64>, grade: &Option<String>| {
            score.map(|s| {
                let s = s.clamp(0, 100);
                SubScore {
                    score: s,
                    grade: grade
                        .as_deref()
                        .and_then(Grade::parse)
                        .unwrap_or_else(|| Grade::for_score(s)),
                }
            })
        };
        let overall_score = row.overall_score.clamp(0, 100);
        let breakdown = ScoreBreakdown {
            overall_score,
            overall_grade: Grade::parse(&row.overall_grade)
                .unwrap_or_else(|| Grade::for_score(overall_score)),
            questionnaire: sub(row.questionnaire_score, &row.questionnaire_grade),
            attribute: sub(row.attribute_score, &row.attribute_grade),
            is_recommended: row.is_recommended == 1,
        };
        CachedScore {
            breakdown,
            calculated_at: row.calculated_at,
            is_fresh: row.is_fresh == 1,
        }
    }
}
