//! Corpus document model.

use serde::{Deserialize, Serialize};

/// Kind of corpus entry; untyped entries are general knowledge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    #[default]
    General,
    Recipe,
    Symptom,
}

/// Structured metadata attached to a document.
///
/// Serialized form is also what metadata scoring tokenizes, so field order
/// here is the order terms appear in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    #[serde(rename = "type", default)]
    pub kind: DocumentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub symptoms: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub herbs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub benefits: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symptom_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_recipe: Option<String>,
}

impl DocumentMetadata {
    /// True when `category`, any symptom or any herb equals one of `wanted`.
    pub fn matches_any(&self, wanted: &[&str]) -> bool {
        let hit = |s: &str| wanted.iter().any(|w| *w == s);
        self.category.as_deref().is_some_and(hit)
            || self.symptoms.iter().any(|s| hit(s))
            || self.herbs.iter().any(|h| hit(h))
    }
}

/// One immutable corpus entry; `id` is unique corpus-wide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

impl Document {
    pub fn kind(&self) -> DocumentKind {
        self.metadata.kind
    }
}

/// Document scored against one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievalResult {
    pub document: Document,
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untyped_json_is_general_and_type_key_is_renamed() {
        let doc: Document = serde_json::from_str(
            r#"{"id":"x","content":"c","metadata":{"category":"digestive","herbs":["fennel"]}}"#,
        )
        .unwrap();
        assert_eq!(doc.kind(), DocumentKind::General);

        let v = serde_json::to_value(&doc.metadata).unwrap();
        assert_eq!(v["type"], "general");
        assert!(v.get("symptoms").is_none());
    }

    #[test]
    fn matches_any_checks_category_symptoms_and_herbs() {
        let meta = DocumentMetadata {
            category: Some("circulation".into()),
            symptoms: vec!["fatigue".into()],
            herbs: vec!["ginger".into()],
            ..Default::default()
        };
        assert!(meta.matches_any(&["circulation"]));
        assert!(meta.matches_any(&["fatigue"]));
        assert!(meta.matches_any(&["mint", "ginger"]));
        assert!(!meta.matches_any(&["Ginger"]));
        assert!(!meta.matches_any(&[]));
    }
}
