//! Retrieval step of the augmented strategy and the context block it feeds
//! into the prompt.

use diagnostic_engine::{AnswerSet, Diagnosis, Recommendation, diagnose};
use herb_knowledge::{Document, DocumentKind, RetrievalResult, Retriever};
use tracing::info;

/// Symptom entries kept in the context block.
pub const MAX_SYMPTOM_DOCS: usize = 3;
/// General entries kept in the context block.
pub const MAX_GENERAL_DOCS: usize = 2;

/// Output of [`retrieve_context`].
#[derive(Debug, Clone)]
pub struct RetrievedContext {
    pub diagnosis: Diagnosis,
    pub context: String,
    pub sources: Vec<Document>,
}

/// Ids of answers set to `true`, in key order.
pub fn active_answers(answers: &AnswerSet) -> Vec<&str> {
    answers
        .iter()
        .filter(|(_, checked)| **checked)
        .map(|(k, _)| k.as_str())
        .collect()
}

/// Query used for retrieval: recommended recipe(s) followed by checked ids.
pub fn diagnosis_query(rec: &Recommendation, answers: &AnswerSet) -> String {
    let mut terms: Vec<&str> = vec![rec.primary_recipe.as_str()];
    if let Some(second) = rec.secondary_recipe.as_deref() {
        terms.push(second);
    }
    terms.extend(active_answers(answers));
    terms.join(" ")
}

/// Scores the answers, retrieves the top `k` documents for the resulting
/// recommendation and renders them into a context block.
pub fn retrieve_context(documents: &[Document], answers: &AnswerSet, k: usize) -> RetrievedContext {
    let diagnosis = diagnose(answers);
    let query = diagnosis_query(&diagnosis.recommendation, answers);
    let results = Retriever::new(documents).similarity_search(&query, k);

    let avg_score = if results.is_empty() {
        0.0
    } else {
        results.iter().map(|r| r.score).sum::<f64>() / results.len() as f64
    };
    info!(
        hits = results.len(),
        avg_score,
        primary = %diagnosis.recommendation.primary_recipe,
        "knowledge retrieved"
    );

    let (recipes, symptoms, general) = split_by_kind(&results);
    let context = build_diagnostic_context(&recipes, &symptoms, &general, &diagnosis.recommendation);
    let sources = results.into_iter().map(|r| r.document).collect();

    RetrievedContext {
        diagnosis,
        context,
        sources,
    }
}

fn split_by_kind(
    results: &[RetrievalResult],
) -> (Vec<&RetrievalResult>, Vec<&RetrievalResult>, Vec<&RetrievalResult>) {
    let (mut recipes, mut symptoms, mut general) = (Vec::new(), Vec::new(), Vec::new());
    for r in results {
        match r.document.kind() {
            DocumentKind::Recipe => recipes.push(r),
            DocumentKind::Symptom => symptoms.push(r),
            DocumentKind::General => general.push(r),
        }
    }
    (recipes, symptoms, general)
}

/// Diagnosis summary block, then every recipe entry, the first
/// [`MAX_SYMPTOM_DOCS`] symptom entries and the first [`MAX_GENERAL_DOCS`]
/// general entries. Empty sections are left out.
pub fn build_diagnostic_context(
    recipes: &[&RetrievalResult],
    symptoms: &[&RetrievalResult],
    general: &[&RetrievalResult],
    rec: &Recommendation,
) -> String {
    let mut out = String::new();

    out.push_str("[Diagnosis]\n");
    out.push_str(&format!("Recommended recipe: {}\n", rec.primary_recipe));
    if let Some(second) = &rec.secondary_recipe {
        out.push_str(&format!("Combined with: {second}\n"));
    }
    out.push_str(&format!("Rationale: {}\n", rec.logic));
    out.push_str(&format!("Confidence: {:.0}%\n\n", rec.confidence * 100.0));

    push_section(&mut out, "[Recipe details]", recipes);
    push_section(&mut out, "[Related symptoms]", &symptoms[..symptoms.len().min(MAX_SYMPTOM_DOCS)]);
    push_section(&mut out, "[Reference]", &general[..general.len().min(MAX_GENERAL_DOCS)]);

    out
}

fn push_section(out: &mut String, header: &str, hits: &[&RetrievalResult]) {
    if hits.is_empty() {
        return;
    }
    out.push_str(header);
    out.push('\n');
    for h in hits {
        out.push_str(&h.document.content);
        out.push_str("\n\n");
    }
}

#[cfg(test)]
mod tests {
    use herb_knowledge::DocumentMetadata;

    use super::*;

    fn hit(id: &str, kind: DocumentKind) -> RetrievalResult {
        RetrievalResult {
            document: Document {
                id: id.into(),
                content: format!("content of {id}"),
                metadata: DocumentMetadata {
                    kind,
                    ..Default::default()
                },
            },
            score: 1.0,
        }
    }

    fn refs(xs: &[RetrievalResult]) -> Vec<&RetrievalResult> {
        xs.iter().collect()
    }

    fn rec(secondary: Option<&str>) -> Recommendation {
        Recommendation {
            primary_recipe: "Detox Steam".into(),
            secondary_recipe: secondary.map(str::to_string),
            logic: "close race".into(),
            confidence: 0.9,
        }
    }

    #[test]
    fn sections_are_capped_and_ordered() {
        let r = [hit("r1", DocumentKind::Recipe), hit("r2", DocumentKind::Recipe)];
        let s: Vec<_> = (1..=5).map(|i| hit(&format!("s{i}"), DocumentKind::Symptom)).collect();
        let g: Vec<_> = (1..=4).map(|i| hit(&format!("g{i}"), DocumentKind::General)).collect();

        let ctx = build_diagnostic_context(&refs(&r), &refs(&s), &refs(&g), &rec(Some("Restful Sleep Steam")));

        assert!(ctx.starts_with("[Diagnosis]\nRecommended recipe: Detox Steam\n"));
        assert!(ctx.contains("Combined with: Restful Sleep Steam\n"));
        assert!(ctx.contains("Confidence: 90%\n"));
        assert!(ctx.contains("content of r2"));
        assert!(ctx.contains("content of s3") && !ctx.contains("content of s4"));
        assert!(ctx.contains("content of g2") && !ctx.contains("content of g3"));

        let recipe_at = ctx.find("[Recipe details]").unwrap();
        let symptom_at = ctx.find("[Related symptoms]").unwrap();
        let general_at = ctx.find("[Reference]").unwrap();
        assert!(recipe_at < symptom_at && symptom_at < general_at);
    }

    #[test]
    fn empty_sections_are_omitted() {
        let ctx = build_diagnostic_context(&[], &[], &[], &rec(None));
        assert!(!ctx.contains("Combined with"));
        assert!(!ctx.contains("[Recipe details]"));
        assert!(!ctx.contains("[Related symptoms]"));
        assert!(!ctx.contains("[Reference]"));
    }

    #[test]
    fn query_lists_recipes_then_checked_ids() {
        let answers: AnswerSet = [("M1", true), ("F8", false), ("M10", true)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        assert_eq!(
            diagnosis_query(&rec(Some("Restful Sleep Steam")), &answers),
            "Detox Steam Restful Sleep Steam M1 M10"
        );
    }
}
