//! Deterministic rule-based records used when generation fails.
//!
//! Symptoms are matched case-insensitively against fixed keyword tables in
//! priority order; the first table with a hit decides the record.

use crate::schema::DiagnosisRecord;

/// Profiles the fallback can produce, in match priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackProfile {
    StressCare,
    WomensHealth,
    CirculationCare,
    GeneralMaintenance,
}

const STRESS_KEYWORDS: &[&str] = &["stress", "anxiety", "anxious", "ストレス", "不安"];
const PAIN_KEYWORDS: &[&str] = &["pain", "menstrual", "period", "痛み", "生理"];
const COLD_KEYWORDS: &[&str] = &["cold", "chill", "fatigue", "tired", "冷え", "疲労"];

impl FallbackProfile {
    pub fn classify(symptoms: &[String]) -> Self {
        let text = symptoms.join(" ").to_lowercase();
        let has = |keys: &[&str]| keys.iter().any(|k| text.contains(k));

        if has(STRESS_KEYWORDS) {
            FallbackProfile::StressCare
        } else if has(PAIN_KEYWORDS) {
            FallbackProfile::WomensHealth
        } else if has(COLD_KEYWORDS) {
            FallbackProfile::CirculationCare
        } else {
            FallbackProfile::GeneralMaintenance
        }
    }

    pub fn record(self) -> DiagnosisRecord {
        match self {
            FallbackProfile::StressCare => build(
                "Stress and mental care",
                "Signs of physical and mental tension. Relaxation is recommended.",
                &["chamomile", "lavender", "passion flower", "lemon balm"],
                &["relaxation", "better sleep quality", "stress relief", "calmer nerves"],
                "Keep a regular sleep rhythm and set aside quiet time before bed.",
                "Steam for 15-20 minutes about an hour before bed, breathing the aroma slowly.",
                "2-3 weeks of continuous use",
                "daily",
                "If pregnant or breastfeeding, consult a doctor before use.",
            ),
            FallbackProfile::WomensHealth => build(
                "Hormonal balance and women's health",
                "Hormonal balance needs support. Gentle natural care can help.",
                &["rose", "clary sage", "geranium", "chaste tree"],
                &["hormonal balance", "menstrual pain relief", "skin care", "emotional stability"],
                "Eat balanced meals, move moderately and get enough sleep.",
                "Use for 20 minutes daily starting one week before your period, somewhere warm.",
                "1-2 months",
                "daily",
                "Avoid use while pregnant or breastfeeding.",
            ),
            FallbackProfile::CirculationCare => build(
                "Cold sensitivity and circulation care",
                "Signs of a chilled body and poor circulation. Warming care should help.",
                &["ginger", "cinnamon", "clove", "rosemary"],
                &["better circulation", "higher metabolism", "less chill", "more energy"],
                "Eat warming foods, take longer baths and add light exercise.",
                "Take a 20-30 minute steam before bathing; pairing it with a foot bath works well.",
                "effects usually noticeable after 2-3 weeks",
                "3-4 times a week",
                "If you have high blood pressure, consult a doctor before use.",
            ),
            FallbackProfile::GeneralMaintenance => build(
                "General wellness maintenance",
                "Overall maintenance and refreshment are recommended.",
                &["chamomile", "lavender", "rosemary", "nettle"],
                &["refreshment", "antioxidant support", "immune support", "relaxation"],
                "Keep balanced daily habits and make regular self-care part of your routine.",
                "Steam for 15-20 minutes whenever you want to relax.",
                "ongoing use recommended",
                "2-3 times a week",
                "Adjust how often you use it to how you feel.",
            ),
        }
    }
}

/// Fully populated fallback record for `symptoms`.
pub fn fallback_record(symptoms: &[String]) -> DiagnosisRecord {
    FallbackProfile::classify(symptoms).record()
}

#[allow(clippy::too_many_arguments)]
fn build(
    category: &str,
    status_summary: &str,
    herbs: &[&str],
    benefits: &[&str],
    advice: &str,
    instructions: &str,
    duration: &str,
    frequency: &str,
    precautions: &str,
) -> DiagnosisRecord {
    let owned = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect();
    DiagnosisRecord {
        category: category.to_string(),
        status_summary: status_summary.to_string(),
        recommended_herbs: owned(herbs),
        benefits: owned(benefits),
        advice: advice.to_string(),
        instructions: instructions.to_string(),
        duration: duration.to_string(),
        frequency: frequency.to_string(),
        precautions: precautions.to_string(),
    }
}
