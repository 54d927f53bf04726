use serde_json::Value;

use crate::models::SubScore;

/// Lowest Likert value; answers live on 1..=5.
const LIKERT_MIN: i64 = 1;
const LIKERT_MAX: i64 = 5;
const LIKERT_NEUTRAL: i64 = 3;

/// Questions beyond this index are ignored.
const MAX_QUESTIONS: usize = 25;

/// Target group size; the question list is partitioned into max(1, n/5)
/// groups with the remainder spread over the leading groups.
const GROUP_SIZE: usize = 5;

/// Normalize a stored questionnaire JSON array to canonical 1-5 integers.
/// Accepted entry shapes: a number, a Likert label, a numeric string, or an
/// object wrapping one of those under "value"/"answer". Anything else is
/// neutral. An absent or malformed document yields an empty sequence.
pub fn parse_answers(raw: Option<&str>) -> Vec<i64> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Vec::new();
    };
    let Ok(Value::Array(entries)) = serde_json::from_str::<Value>(raw) else {
        return Vec::new();
    };
    entries.iter().map(normalize_answer).collect()
}

fn normalize_answer(entry: &Value) -> i64 {
    match entry {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64))
            .map(|v| v.clamp(LIKERT_MIN, LIKERT_MAX))
            .unwrap_or(LIKERT_NEUTRAL),
        Value::String(s) => normalize_label(s),
        Value::Object(map) => map
            .get("value")
            .or_else(|| map.get("answer"))
            .map(normalize_answer)
            .unwrap_or(LIKERT_NEUTRAL),
        _ => LIKERT_NEUTRAL,
    }
}

fn normalize_label(raw: &str) -> i64 {
    let label = raw.trim().to_uppercase();
    match label.as_str() {
        "STRONGLY_DISAGREE" => 1,
        "DISAGREE" => 2,
        "NEUTRAL" => 3,
        "AGREE" => 4,
        "STRONGLY_AGREE" => 5,
        _ => label
            .parse::<i64>()
            .map(|v| v.clamp(LIKERT_MIN, LIKERT_MAX))
            .unwrap_or(LIKERT_NEUTRAL),
    }
}

/// Score two normalized answer sequences. Returns `None` when either side
/// has no answers at all (the aggregator falls back to its neutral default).
pub fn score(answers_a: &[i64], answers_b: &[i64]) -> Option<SubScore> {
    if answers_a.is_empty() || answers_b.is_empty() {
        return None;
    }

    // Pair question-by-question; a side missing an answer counts as neutral.
    let question_count = answers_a.len().max(answers_b.len()).min(MAX_QUESTIONS);
    let mut question_scores = Vec::with_capacity(question_count);
    for i in 0..question_count {
        let a = answers_a.get(i).copied().unwrap_or(LIKERT_NEUTRAL);
        let b = answers_b.get(i).copied().unwrap_or(LIKERT_NEUTRAL);
        let divergence = (a - b).abs();
        question_scores.push(4 - divergence);
    }

    let group_scores = group_means(&question_scores);
    let overall = group_scores.iter().sum::<f64>() / group_scores.len() as f64;
    Some(SubScore::new(overall.round() as i64))
}

// Per-group mean question score, normalized to 0-100.
fn group_means(question_scores: &[i64]) -> Vec<f64> {
    let n = question_scores.len();
    let group_count = (n / GROUP_SIZE).max(1);
    let base = n / group_count;
    let remainder = n % group_count;

    let mut means = Vec::with_capacity(group_count);
    let mut start = 0;
    for g in 0..group_count {
        let size = base + usize::from(g < remainder);
        let group = &question_scores[start..start + size];
        let mean = group.iter().sum::<i64>() as f64 / group.len() as f64;
        means.push(mean / 4.0 * 100.0);
        start += size;
    }
    means
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Grade;
    use serde_json::json;

    #[test]
    fn parses_numbers_labels_strings_and_objects() {
        let raw = json!([5, "AGREE", "2", {"value": 1}, {"answer": "STRONGLY_AGREE"}]).to_string();
        assert_eq!(parse_answers(Some(&raw)), vec![5, 4, 2, 1, 5]);
    }

    #[test]
    fn unknown_entries_default_to_neutral() {
        let raw = json!(["whatever", null, [1], {"other": 2}, 7, 0]).to_string();
        assert_eq!(parse_answers(Some(&raw)), vec![3, 3, 3, 3, 5, 1]);
    }

    #[test]
    fn absent_or_malformed_documents_yield_empty() {
        assert!(parse_answers(None).is_empty());
        assert!(parse_answers(Some("")).is_empty());
        assert!(parse_answers(Some("not json")).is_empty());
        assert!(parse_answers(Some("{\"a\":1}")).is_empty());
    }

    #[test]
    fn empty_side_yields_none() {
        assert!(score(&[], &[3, 3]).is_none());
        assert!(score(&[3, 3], &[]).is_none());
    }

    #[test]
    fn maximal_disagreement_scores_zero() {
        // Five questions, one group, divergence 4 everywhere.
        let result = score(&[5, 5, 5, 5, 5], &[1, 1, 1, 1, 1]).unwrap();
        assert_eq!(result.score, 0);
        assert_eq!(result.grade, Grade::F);
    }

    #[test]
    fn identical_answers_score_hundred() {
        let answers: Vec<i64> = [3, 4, 2, 5, 1].repeat(5);
        assert_eq!(answers.len(), 25);
        let result = score(&answers, &answers).unwrap();
        assert_eq!(result.score, 100);
        assert_eq!(result.grade, Grade::A);
    }

    #[test]
    fn scoring_is_symmetric_and_deterministic() {
        let a = vec![1, 2, 3, 4, 5, 5, 4];
        let b = vec![2, 2, 5, 1, 3, 4, 4];
        let first = score(&a, &b).unwrap();
        assert_eq!(score(&b, &a).unwrap(), first);
        assert_eq!(score(&a, &b).unwrap(), first);
    }

    #[test]
    fn shorter_side_is_padded_with_neutral() {
        // B has answered only 1 of 5 questions; the rest compare against 3.
        let result = score(&[3, 3, 3, 3, 3], &[3]).unwrap();
        assert_eq!(result.score, 100);
    }

    #[test]
    fn questions_beyond_twenty_five_are_ignored() {
        let mut a = vec![3; 25];
        let mut b = vec![3; 25];
        a.extend([5; 10]);
        b.extend([1; 10]);
        assert_eq!(score(&a, &b).unwrap().score, 100);
    }

    #[test]
    fn group_partitioning_spreads_remainder() {
        // 13 questions -> 2 groups of 7 and 6.
        let scores = vec![4; 13];
        assert_eq!(group_means(&scores), vec![100.0, 100.0]);
        // Fewer than 5 questions still form one group.
        assert_eq!(group_means(&[0, 4]).len(), 1);
    }

    #[test]
    fn scores_stay_in_bounds() {
        for (a, b) in [(1, 5), (5, 1), (1, 1), (5, 5), (2, 4)] {
            let s = score(&[a; 7], &[b; 7]).unwrap();
            assert!((0..=100).contains(&s.score));
        }
    }
}
