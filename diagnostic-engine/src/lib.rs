//! Questionnaire scoring and recipe recommendation.
//!
//! Pure functions over a fixed symptom table; no I/O and no shared state.
//!
//! ```
//! use diagnostic_engine::{AnswerSet, diagnose};
//!
//! let answers: AnswerSet = ["M6", "M7", "F4", "F5", "F8"]
//!     .into_iter()
//!     .map(|id| (id.to_string(), true))
//!     .collect();
//! let d = diagnose(&answers);
//! assert_eq!(d.recommendation.primary_recipe, "Rhythm Circulation Steam");
//! ```

pub mod categories;
pub mod recommendation;
pub mod scores;

pub use categories::{
    DEFAULT_RECIPE, DETOX_STEAM, FineCategory, MacroGroup, RESTFUL_SLEEP_STEAM,
    RHYTHM_CIRCULATION_STEAM,
};
pub use recommendation::{
    Diagnosis, INSUFFICIENT_DATA, Recommendation, Thresholds, diagnose, get_recommendation,
    get_recommendation_with,
};
pub use scores::{AnswerSet, CategoryScoreMap, MacroScores, calculate_scores, macro_scores};
