pub mod compatibility;
pub mod match_candidate;
pub mod user_profiles;

pub use compatibility::{CachedScore, CompatibilityScoreRow, Grade, ScoreBreakdown, SubScore};
pub use match_candidate::{MatchCandidateResult, MatchPage};
pub use user_profiles::UserProfileRow;
