//! Pure scoring: every call builds fresh maps, nothing is carried between calls.

use std::collections::BTreeMap;
use std::ops::Add;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::categories::{FineCategory, MacroGroup};

/// Questionnaire answers: symptom id → checked.
pub type AnswerSet = BTreeMap<String, bool>;

/// Count of checked items per fine category; every category is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryScoreMap(BTreeMap<FineCategory, u32>);

impl CategoryScoreMap {
    pub fn get(&self, category: FineCategory) -> u32 {
        self.0.get(&category).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FineCategory, u32)> + '_ {
        self.0.iter().map(|(c, n)| (*c, *n))
    }

    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }

    /// Sums fine categories into their macro groups.
    pub fn combine(&self) -> MacroScores {
        let [a, b, c] =
            MacroGroup::ALL.map(|g| g.members().map(|cat| self.get(cat)).sum::<u32>());
        MacroScores::new(a, b, c)
    }
}

/// Counts, per fine category, how many of its ids are `true` in `answers`.
/// Unknown ids and `false` answers are ignored.
pub fn calculate_scores(answers: &AnswerSet) -> CategoryScoreMap {
    let mut map: BTreeMap<FineCategory, u32> =
        FineCategory::ALL.into_iter().map(|c| (c, 0)).collect();
    for (id, _) in answers.iter().filter(|(_, checked)| **checked) {
        match FineCategory::of_symptom(id) {
            Some(category) => *map.entry(category).or_default() += 1,
            None => debug!(id = %id, "answer outside the symptom table ignored"),
        }
    }
    CategoryScoreMap(map)
}

/// Macro group scores, the only input of the recommendation step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroScores {
    pub a: u32,
    pub b: u32,
    pub c: u32,
}

impl MacroScores {
    pub fn new(a: u32, b: u32, c: u32) -> Self {
        Self { a, b, c }
    }

    pub fn get(&self, group: MacroGroup) -> u32 {
        match group {
            MacroGroup::A => self.a,
            MacroGroup::B => self.b,
            MacroGroup::C => self.c,
        }
    }

    pub fn total(&self) -> u32 {
        self.a + self.b + self.c
    }

    /// Groups by descending score; equal scores keep A, B, C order.
    pub fn ranked(&self) -> [(MacroGroup, u32); 3] {
        let mut out = MacroGroup::ALL.map(|g| (g, self.get(g)));
        out.sort_by(|l, r| r.1.cmp(&l.1));
        out
    }
}

impl Add for MacroScores {
    type Output = MacroScores;

    fn add(self, rhs: MacroScores) -> MacroScores {
        MacroScores {
            a: self.a + rhs.a,
            b: self.b + rhs.b,
            c: self.c + rhs.c,
        }
    }
}

/// `calculate_scores` followed by `combine`.
pub fn macro_scores(answers: &AnswerSet) -> MacroScores {
    calculate_scores(answers).combine()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn answers(ids: &[&str]) -> AnswerSet {
        ids.iter().map(|id| (id.to_string(), true)).collect()
    }

    fn all_ids() -> Vec<&'static str> {
        FineCategory::ALL
            .into_iter()
            .flat_map(|c| c.symptom_ids().iter().copied())
            .collect()
    }

    #[test]
    fn counts_only_true_known_ids() {
        let mut a = answers(&["M1", "M2", "F6", "Z1"]);
        a.insert("M6".into(), false);
        let s = calculate_scores(&a);
        assert_eq!(s.get(FineCategory::AutonomicNervous), 2);
        assert_eq!(s.get(FineCategory::BloodStagnation), 1);
        assert_eq!(s.get(FineCategory::Hormonal), 0);
        assert_eq!(s.total(), 3);
        assert_eq!(s.iter().count(), 8);
    }

    #[test]
    fn qi_items_all_count_toward_qi() {
        let s = calculate_scores(&answers(&["F1", "F2", "F3"]));
        assert_eq!(s.get(FineCategory::Qi), 3);
        assert_eq!(s.combine(), MacroScores::new(0, 0, 3));
    }

    #[test]
    fn combine_follows_macro_membership() {
        let m = macro_scores(&answers(&["M6", "F4", "F6", "M10", "F8", "M1", "F12", "F1"]));
        assert_eq!(m, MacroScores::new(3, 2, 3));
        assert_eq!(m.total(), 8);
    }

    #[test]
    fn calls_do_not_share_state() {
        let first = calculate_scores(&answers(&["M1", "M2"]));
        let second = calculate_scores(&answers(&["F8"]));
        assert_eq!(first.get(FineCategory::AutonomicNervous), 2);
        assert_eq!(second.get(FineCategory::AutonomicNervous), 0);
        assert_eq!(second.get(FineCategory::Water), 1);
    }

    #[test]
    fn ranked_is_stable_on_ties() {
        let r = MacroScores::new(2, 5, 2).ranked();
        assert_eq!(r, [(MacroGroup::B, 5), (MacroGroup::A, 2), (MacroGroup::C, 2)]);
        let r = MacroScores::default().ranked();
        assert_eq!(r.map(|(g, _)| g), MacroGroup::ALL);
    }

    proptest! {
        #[test]
        fn macro_scores_are_additive_over_disjoint_sets(
            picks in prop::collection::vec(0u8..4, 27)
        ) {
            let ids = all_ids();
            let (mut left, mut right, mut union) =
                (AnswerSet::new(), AnswerSet::new(), AnswerSet::new());
            for (id, pick) in ids.iter().zip(picks) {
                match pick {
                    1 => {
                        left.insert(id.to_string(), true);
                        union.insert(id.to_string(), true);
                    }
                    2 => {
                        right.insert(id.to_string(), true);
                        union.insert(id.to_string(), true);
                    }
                    3 => {
                        left.insert(id.to_string(), false);
                    }
                    _ => {}
                }
            }
            prop_assert_eq!(macro_scores(&left) + macro_scores(&right), macro_scores(&union));
        }

        #[test]
        fn macro_total_equals_checked_known_ids(picks in prop::collection::vec(any::<bool>(), 27)) {
            let ids = all_ids();
            let set: AnswerSet = ids.iter().zip(&picks).map(|(id, b)| (id.to_string(), *b)).collect();
            let checked = picks.iter().filter(|b| **b).count() as u32;
            prop_assert_eq!(macro_scores(&set).total(), checked);
        }
    }
}
