//! Fixed symptom table: questionnaire ids → fine category → macro group → recipe.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fine-grained constitution category a questionnaire item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FineCategory {
    AutonomicNervous,
    Hormonal,
    Immune,
    Qi,
    Blood,
    BloodStagnation,
    Water,
    Essence,
}

impl FineCategory {
    pub const ALL: [FineCategory; 8] = [
        FineCategory::AutonomicNervous,
        FineCategory::Hormonal,
        FineCategory::Immune,
        FineCategory::Qi,
        FineCategory::Blood,
        FineCategory::BloodStagnation,
        FineCategory::Water,
        FineCategory::Essence,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FineCategory::AutonomicNervous => "autonomic-nervous",
            FineCategory::Hormonal => "hormonal",
            FineCategory::Immune => "immune",
            FineCategory::Qi => "qi",
            FineCategory::Blood => "blood",
            FineCategory::BloodStagnation => "blood-stagnation",
            FineCategory::Water => "water",
            FineCategory::Essence => "essence",
        }
    }

    /// Questionnaire ids counted toward this category. Groups are disjoint.
    pub fn symptom_ids(self) -> &'static [&'static str] {
        match self {
            FineCategory::AutonomicNervous => &["M1", "M2", "M3", "M4", "M5"],
            FineCategory::Hormonal => &["M6", "M7", "M8", "M9"],
            FineCategory::Immune => &["M10", "M11"],
            FineCategory::Qi => &["F1", "F2", "F3"],
            FineCategory::Blood => &["F4", "F5", "F7"],
            FineCategory::BloodStagnation => &["F6"],
            FineCategory::Water => &["F8", "F9", "F10", "F11"],
            FineCategory::Essence => &["F12", "F13", "F14", "F15", "F16"],
        }
    }

    pub fn macro_group(self) -> MacroGroup {
        match self {
            FineCategory::Hormonal | FineCategory::Blood | FineCategory::BloodStagnation => {
                MacroGroup::A
            }
            FineCategory::Immune | FineCategory::Water => MacroGroup::B,
            FineCategory::AutonomicNervous | FineCategory::Essence | FineCategory::Qi => {
                MacroGroup::C
            }
        }
    }

    /// Category of a questionnaire id, `None` for ids outside the table.
    pub fn of_symptom(id: &str) -> Option<FineCategory> {
        Self::ALL
            .into_iter()
            .find(|c| c.symptom_ids().iter().any(|s| *s == id))
    }
}

impl fmt::Display for FineCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The three units a recommendation is made on.
///
/// - `A`: hormonal + blood + blood-stagnation
/// - `B`: immune + water
/// - `C`: autonomic-nervous + essence + qi
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MacroGroup {
    A,
    B,
    C,
}

pub const RHYTHM_CIRCULATION_STEAM: &str = "Rhythm Circulation Steam";
pub const DETOX_STEAM: &str = "Detox Steam";
pub const RESTFUL_SLEEP_STEAM: &str = "Restful Sleep Steam";

/// Recipe returned when no rule applies.
pub const DEFAULT_RECIPE: &str = RHYTHM_CIRCULATION_STEAM;

impl MacroGroup {
    /// Tie order: earlier groups win equal scores.
    pub const ALL: [MacroGroup; 3] = [MacroGroup::A, MacroGroup::B, MacroGroup::C];

    pub fn recipe(self) -> &'static str {
        match self {
            MacroGroup::A => RHYTHM_CIRCULATION_STEAM,
            MacroGroup::B => DETOX_STEAM,
            MacroGroup::C => RESTFUL_SLEEP_STEAM,
        }
    }

    pub fn members(self) -> impl Iterator<Item = FineCategory> {
        FineCategory::ALL
            .into_iter()
            .filter(move |c| c.macro_group() == self)
    }
}

impl fmt::Display for MacroGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MacroGroup::A => "group A",
            MacroGroup::B => "group B",
            MacroGroup::C => "group C",
        };
        f.write_str(label)
    }
}
