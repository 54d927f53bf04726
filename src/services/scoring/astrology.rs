use serde_json::Value;

use crate::models::SubScore;

// Placement weights; renormalized over the placements both users have.
const WEIGHT_SUN: i64 = 40;
const WEIGHT_MOON: i64 = 35;
const WEIGHT_RISING: i64 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl Sign {
    pub fn parse(raw: &str) -> Option<Sign> {
        match raw.trim().to_lowercase().as_str() {
            "aries" => Some(Sign::Aries),
            "taurus" => Some(Sign::Taurus),
            "gemini" => Some(Sign::Gemini),
            "cancer" => Some(Sign::Cancer),
            "leo" => Some(Sign::Leo),
            "virgo" => Some(Sign::Virgo),
            "libra" => Some(Sign::Libra),
            "scorpio" => Some(Sign::Scorpio),
            "sagittarius" => Some(Sign::Sagittarius),
            "capricorn" => Some(Sign::Capricorn),
            "aquarius" => Some(Sign::Aquarius),
            "pisces" => Some(Sign::Pisces),
            _ => None,
        }
    }

    fn index(self) -> i64 {
        match self {
            Sign::Aries => 0,
            Sign::Taurus => 1,
            Sign::Gemini => 2,
            Sign::Cancer => 3,
            Sign::Leo => 4,
            Sign::Virgo => 5,
            Sign::Libra => 6,
            Sign::Scorpio => 7,
            Sign::Sagittarius => 8,
            Sign::Capricorn => 9,
            Sign::Aquarius => 10,
            Sign::Pisces => 11,
        }
    }
}

/// The placements the attribute calculator compares. Anything the stored
/// chart document does not carry (or carries with an unknown sign name)
/// stays `None` and is skipped with its weight renormalized away.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NatalChart {
    pub sun: Option<Sign>,
    pub moon: Option<Sign>,
    pub rising: Option<Sign>,
}

impl NatalChart {
    pub fn is_empty(&self) -> bool {
        self.sun.is_none() && self.moon.is_none() && self.rising.is_none()
    }
}

/// Normalize a stored natal-chart JSON object. Placement values may be a
/// plain sign name or an object with a "sign" field.
pub fn parse_chart(raw: Option<&str>) -> NatalChart {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return NatalChart::default();
    };
    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(raw) else {
        return NatalChart::default();
    };

    let placement = |keys: &[&str]| {
        keys.iter()
            .find_map(|key| map.get(*key))
            .and_then(parse_placement)
    };

    NatalChart {
        sun: placement(&["sun"]),
        moon: placement(&["moon"]),
        rising: placement(&["rising", "ascendant"]),
    }
}

fn parse_placement(value: &Value) -> Option<Sign> {
    match value {
        Value::String(s) => Sign::parse(s),
        Value::Object(map) => map.get("sign").and_then(parse_placement),
        _ => None,
    }
}

// Affinity by the angular distance between two signs on the wheel. The
// distance is symmetric, so the whole calculator is symmetric by
// construction. Trines (4 apart) rate highest, squares (3 apart) lowest.
fn sign_affinity(a: Sign, b: Sign) -> i64 {
    let raw = (a.index() - b.index()).abs();
    let distance = raw.min(12 - raw);
    match distance {
        0 => 90,
        1 => 45,
        2 => 80,
        3 => 35,
        4 => 100,
        5 => 50,
        _ => 65,
    }
}

/// Score two charts. Returns `None` when the users share no recognized
/// placement (the aggregator falls back to its neutral default).
pub fn score(chart_a: &NatalChart, chart_b: &NatalChart) -> Option<SubScore> {
    let pairs = [
        (chart_a.sun, chart_b.sun, WEIGHT_SUN),
        (chart_a.moon, chart_b.moon, WEIGHT_MOON),
        (chart_a.rising, chart_b.rising, WEIGHT_RISING),
    ];

    let mut weighted_sum = 0i64;
    let mut weight_total = 0i64;
    for (a, b, weight) in pairs {
        let (Some(a), Some(b)) = (a, b) else {
            continue;
        };
        weighted_sum += sign_affinity(a, b) * weight;
        weight_total += weight;
    }

    if weight_total == 0 {
        return None;
    }
    let score = weighted_sum as f64 / weight_total as f64;
    Some(SubScore::new(score.round() as i64))
}
