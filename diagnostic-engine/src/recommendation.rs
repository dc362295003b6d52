//! Macro scores → recipe recommendation.
//!
//! Rules, first match wins:
//! 1. total ≤ `insufficient_total` → ask the user to retake the questionnaire;
//! 2. gap between the top two groups ≥ `single_gap` → one recipe;
//! 3. gap ≤ `dual_gap` → top two recipes combined;
//! 4. anything else → [`DEFAULT_RECIPE`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::categories::DEFAULT_RECIPE;
use crate::scores::{AnswerSet, CategoryScoreMap, MacroScores, calculate_scores};

/// Primary recipe value when there is too little input to recommend anything.
pub const INSUFFICIENT_DATA: &str = "insufficient-data";

pub const INSUFFICIENT_DATA_LOGIC: &str = "too few checked items — retake with more answers";
pub const DEFAULT_LOGIC: &str = "default";

pub const CONFIDENCE_INSUFFICIENT: f64 = 0.1;
pub const CONFIDENCE_SINGLE: f64 = 0.8;
pub const CONFIDENCE_DUAL: f64 = 0.9;
pub const CONFIDENCE_DEFAULT: f64 = 0.5;

/// Decision thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Totals at or below this are insufficient.
    pub insufficient_total: u32,
    /// Minimum top-vs-second gap for a single recipe.
    pub single_gap: u32,
    /// Maximum top-vs-second gap for a combined recipe.
    pub dual_gap: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            insufficient_total: 3,
            single_gap: 2,
            dual_gap: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub primary_recipe: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_recipe: Option<String>,
    pub logic: String,
    pub confidence: f64,
}

impl Recommendation {
    pub fn is_insufficient(&self) -> bool {
        self.primary_recipe == INSUFFICIENT_DATA
    }
}

/// Applies [`Thresholds::default`].
pub fn get_recommendation(scores: &MacroScores) -> Recommendation {
    get_recommendation_with(scores, &Thresholds::default())
}

pub fn get_recommendation_with(scores: &MacroScores, t: &Thresholds) -> Recommendation {
    let total = scores.total();
    if total <= t.insufficient_total {
        debug!(total, "insufficient answers");
        return Recommendation {
            primary_recipe: INSUFFICIENT_DATA.to_string(),
            secondary_recipe: None,
            logic: INSUFFICIENT_DATA_LOGIC.to_string(),
            confidence: CONFIDENCE_INSUFFICIENT,
        };
    }

    let [(top, top_score), (second, second_score), _] = scores.ranked();
    let gap = top_score - second_score;

    let rec = if gap >= t.single_gap {
        Recommendation {
            primary_recipe: top.recipe().to_string(),
            secondary_recipe: None,
            logic: format!(
                "{top} scores highest, {gap} points ahead of the next group: single recipe"
            ),
            confidence: CONFIDENCE_SINGLE,
        }
    } else if gap <= t.dual_gap {
        Recommendation {
            primary_recipe: top.recipe().to_string(),
            secondary_recipe: Some(second.recipe().to_string()),
            logic: format!(
                "{top} and {second} are within {} point(s) of each other: combined recipes",
                t.dual_gap
            ),
            confidence: CONFIDENCE_DUAL,
        }
    } else {
        Recommendation {
            primary_recipe: DEFAULT_RECIPE.to_string(),
            secondary_recipe: None,
            logic: DEFAULT_LOGIC.to_string(),
            confidence: CONFIDENCE_DEFAULT,
        }
    };

    debug!(
        a = scores.a,
        b = scores.b,
        c = scores.c,
        gap,
        primary = %rec.primary_recipe,
        confidence = rec.confidence,
        "recommendation"
    );
    rec
}

/// Everything the scorer derives from one answer set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    pub fine: CategoryScoreMap,
    pub macro_scores: MacroScores,
    pub recommendation: Recommendation,
}

/// Scores `answers` and recommends with the default thresholds.
pub fn diagnose(answers: &AnswerSet) -> Diagnosis {
    let fine = calculate_scores(answers);
    let macro_scores = fine.combine();
    let recommendation = get_recommendation(&macro_scores);
    Diagnosis {
        fine,
        macro_scores,
        recommendation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::{
        DETOX_STEAM, FineCategory, RESTFUL_SLEEP_STEAM, RHYTHM_CIRCULATION_STEAM,
    };

    #[test]
    fn totals_up_to_three_are_insufficient() {
        for s in [
            MacroScores::new(0, 0, 0),
            MacroScores::new(3, 0, 0),
            MacroScores::new(1, 1, 1),
        ] {
            let r = get_recommendation(&s);
            assert!(r.is_insufficient());
            assert_eq!(r.confidence, CONFIDENCE_INSUFFICIENT);
            assert_eq!(r.secondary_recipe, None);
        }
        let r = get_recommendation(&MacroScores::new(4, 0, 0));
        assert!(!r.is_insufficient());
        assert_eq!(r.primary_recipe, RHYTHM_CIRCULATION_STEAM);
    }

    #[test]
    fn gap_of_two_gives_single_recipe() {
        let r = get_recommendation(&MacroScores::new(5, 3, 0));
        assert_eq!(r.primary_recipe, RHYTHM_CIRCULATION_STEAM);
        assert_eq!(r.secondary_recipe, None);
        assert_eq!(r.confidence, 0.8);

        let r = get_recommendation(&MacroScores::new(0, 1, 6));
        assert_eq!(r.primary_recipe, RESTFUL_SLEEP_STEAM);
    }

    #[test]
    fn gap_of_one_gives_dual_recipe() {
        let r = get_recommendation(&MacroScores::new(4, 3, 0));
        assert_eq!(r.primary_recipe, RHYTHM_CIRCULATION_STEAM);
        assert_eq!(r.secondary_recipe.as_deref(), Some(DETOX_STEAM));
        assert_eq!(r.confidence, 0.9);
    }

    #[test]
    fn ties_follow_group_order() {
        let r = get_recommendation(&MacroScores::new(0, 3, 3));
        assert_eq!(r.primary_recipe, DETOX_STEAM);
        assert_eq!(r.secondary_recipe.as_deref(), Some(RESTFUL_SLEEP_STEAM));

        let r = get_recommendation(&MacroScores::new(2, 2, 2));
        assert_eq!(r.primary_recipe, RHYTHM_CIRCULATION_STEAM);
        assert_eq!(r.secondary_recipe.as_deref(), Some(DETOX_STEAM));
    }

    #[test]
    fn gap_between_thresholds_falls_back_to_default() {
        let t = Thresholds {
            insufficient_total: 3,
            single_gap: 4,
            dual_gap: 1,
        };
        let r = get_recommendation_with(&MacroScores::new(0, 6, 3), &t);
        assert_eq!(r.primary_recipe, DEFAULT_RECIPE);
        assert_eq!(r.logic, DEFAULT_LOGIC);
        assert_eq!(r.confidence, CONFIDENCE_DEFAULT);
    }

    #[test]
    fn all_hormonal_items_recommend_group_a() {
        let answers: AnswerSet = FineCategory::Hormonal
            .symptom_ids()
            .iter()
            .map(|id| (id.to_string(), true))
            .collect();
        let d = diagnose(&answers);
        assert_eq!(d.macro_scores, MacroScores::new(4, 0, 0));
        assert_eq!(d.fine.get(FineCategory::Hormonal), 4);
        assert_eq!(d.recommendation.primary_recipe, RHYTHM_CIRCULATION_STEAM);
        assert_eq!(d.recommendation.confidence, 0.8);
    }

    #[test]
    fn serializes_camel_case_and_omits_missing_secondary() {
        let r = get_recommendation(&MacroScores::new(6, 0, 0));
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["primaryRecipe"], RHYTHM_CIRCULATION_STEAM);
        assert!(v.get("secondaryRecipe").is_none());
        let back: Recommendation = serde_json::from_value(v).unwrap();
        assert_eq!(back, r);
    }
}
