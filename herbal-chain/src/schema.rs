//! Structured reply schema and the recipe card derived from it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ChainError, Result};

/// Generation output every caller receives, from the model or the fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DiagnosisRecord {
    pub category: String,
    pub status_summary: String,
    pub recommended_herbs: Vec<String>,
    pub benefits: Vec<String>,
    pub advice: String,
    pub instructions: String,
    pub duration: String,
    pub frequency: String,
    pub precautions: String,
}

impl DiagnosisRecord {
    /// Every string non-blank and both lists non-empty with non-blank items.
    pub fn validate(&self) -> Result<()> {
        let scalars = [
            ("category", &self.category),
            ("statusSummary", &self.status_summary),
            ("advice", &self.advice),
            ("instructions", &self.instructions),
            ("duration", &self.duration),
            ("frequency", &self.frequency),
            ("precautions", &self.precautions),
        ];
        for (field, value) in scalars {
            if value.trim().is_empty() {
                return Err(ChainError::EmptyField { field });
            }
        }
        let lists = [
            ("recommendedHerbs", &self.recommended_herbs),
            ("benefits", &self.benefits),
        ];
        for (field, items) in lists {
            if items.is_empty() || items.iter().any(|s| s.trim().is_empty()) {
                return Err(ChainError::EmptyField { field });
            }
        }
        Ok(())
    }
}

/// Parses a model reply into a validated record.
///
/// A single surrounding code fence is tolerated; any other extra text,
/// unknown keys, missing keys or empty values are rejected.
///
/// # Errors
/// [`ChainError::Parse`] for malformed or mis-shaped JSON,
/// [`ChainError::EmptyField`] for blank values.
pub fn parse_diagnosis(raw: &str) -> Result<DiagnosisRecord> {
    let clean = cleanup_json_like(raw);
    let record: DiagnosisRecord = serde_json::from_str(&clean)?;
    record.validate()?;
    debug!(category = %record.category, herbs = record.recommended_herbs.len(), "parsed diagnosis");
    Ok(record)
}

/// Trim common code-fence wrappers around JSON.
fn cleanup_json_like(s: &str) -> String {
    let mut t = s.trim().to_string();
    if t.starts_with("```") {
        t = t
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .to_string();
        if let Some(pos) = t.rfind("```") {
            t.truncate(pos);
        }
    }
    t.trim().to_string()
}

/// Card shown in the chat window next to a diagnosis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub benefits: Vec<String>,
    pub instructions: String,
}

impl Recipe {
    /// The single card derived 1:1 from a record.
    pub fn from_diagnosis(d: &DiagnosisRecord) -> Self {
        Self {
            id: "1".to_string(),
            name: format!("{} blend", d.category),
            description: d.status_summary.clone(),
            ingredients: d.recommended_herbs.clone(),
            benefits: d.benefits.clone(),
            instructions: d.instructions.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "category": "Circulation care",
        "statusSummary": "Cold hands and low energy point to sluggish circulation.",
        "recommendedHerbs": ["ginger", "cinnamon", "mugwort"],
        "benefits": ["warming", "better circulation"],
        "advice": "Eat warm meals and keep your feet warm.",
        "instructions": "Steam for 20 minutes before bathing.",
        "duration": "2-3 weeks",
        "frequency": "3-4 times a week",
        "precautions": "Consult a doctor if you have high blood pressure."
    }"#;

    #[test]
    fn parses_plain_and_fenced_replies() {
        let plain = parse_diagnosis(VALID).unwrap();
        assert_eq!(plain.category, "Circulation care");
        assert_eq!(plain.recommended_herbs.len(), 3);

        let fenced = parse_diagnosis(&format!("```json\n{VALID}\n```")).unwrap();
        assert_eq!(fenced, plain);
    }

    #[test]
    fn rejects_prose_unknown_and_missing_fields() {
        assert!(matches!(
            parse_diagnosis("Here is your recipe: ginger tea"),
            Err(ChainError::Parse(_))
        ));

        let extra = VALID.replacen('{', r#"{"mood": "calm","#, 1);
        assert!(matches!(parse_diagnosis(&extra), Err(ChainError::Parse(_))));

        let missing = VALID.replace(r#""duration": "2-3 weeks","#, "");
        assert!(matches!(parse_diagnosis(&missing), Err(ChainError::Parse(_))));
    }

    #[test]
    fn rejects_empty_values() {
        let blank = VALID.replace("3-4 times a week", " ");
        assert!(matches!(
            parse_diagnosis(&blank),
            Err(ChainError::EmptyField { field: "frequency" })
        ));

        let no_herbs = VALID.replace(r#"["ginger", "cinnamon", "mugwort"]"#, "[]");
        assert!(matches!(
            parse_diagnosis(&no_herbs),
            Err(ChainError::EmptyField { field: "recommendedHerbs" })
        ));
    }

    #[test]
    fn recipe_card_mirrors_record() {
        let d = parse_diagnosis(VALID).unwrap();
        let r = Recipe::from_diagnosis(&d);
        assert_eq!(r.id, "1");
        assert_eq!(r.name, "Circulation care blend");
        assert_eq!(r.description, d.status_summary);
        assert_eq!(r.ingredients, d.recommended_herbs);
        assert_eq!(r.benefits, d.benefits);
        assert_eq!(r.instructions, d.instructions);
    }
}
