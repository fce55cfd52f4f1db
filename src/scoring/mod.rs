//! Per-repository activity, popularity, freshness and overall scores.

mod scorer;

pub use scorer::{ScoreInputs, Scores, activity_score, freshness_score, popularity_score, score};
