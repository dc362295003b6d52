//! Prompt builders for the diagnosis and chat chains.

use ai_llm_service::ChatMessage;
use diagnostic_engine::AnswerSet;

use crate::context::active_answers;

/// `{system, user}` pair sent to the generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

impl PromptPair {
    pub fn into_messages(self) -> [ChatMessage; 2] {
        [ChatMessage::system(self.system), ChatMessage::user(self.user)]
    }
}

const RECORD_SCHEMA: &str = r#"{
  "category": "diagnosis category name",
  "statusSummary": "summary of the current state (50-80 characters)",
  "recommendedHerbs": ["main herb 1", "main herb 2", "main herb 3", "supporting herb 4"],
  "benefits": ["expected effect 1", "expected effect 2", "expected effect 3"],
  "advice": "concrete lifestyle advice (100-150 characters)",
  "instructions": "detailed steam recipe usage (80-120 characters)",
  "duration": "recommended period of use",
  "frequency": "how often to use",
  "precautions": "precautions"
}"#;

/// Augmented prompts: expert persona, retrieved knowledge, reply schema.
pub fn build_augmented_prompt(context: &str, symptoms: &[String], answers: &AnswerSet) -> PromptPair {
    let system = format!(
        "You are an expert in East Asian medicine and herbal therapy. Use the knowledge \
         base below to propose the best steam-herb recipe and advice for the user's symptoms.\n\
         \n\
         Knowledge base:\n\
         {context}\n\
         Reply with exactly one JSON object in this format and nothing else:\n\
         {RECORD_SCHEMA}\n\
         \n\
         Important:\n\
         - Make clear this is wellness support, not a medical diagnosis.\n\
         - Recommend consulting a doctor if pregnant, breastfeeding or under treatment.\n\
         - Allow for individual differences.\n"
    );

    let checked = active_answers(answers)
        .into_iter()
        .map(|k| format!("✓ {k}"))
        .collect::<Vec<_>>()
        .join("\n");
    let user = format!(
        "[User symptoms]\n{}\n\n[Checked answers]\n{checked}\n\n\
         Based on the symptoms and answers above, please propose the best steam-herb recipe.\n",
        symptoms.join(", ")
    );

    PromptPair { system, user }
}

/// Minimal prompts used when retrieval is disabled.
pub fn build_direct_prompt(symptoms: &[String]) -> PromptPair {
    PromptPair {
        system: format!(
            "You are a health and herbal expert. Give the best advice for the user's symptoms. \
             Reply with exactly one JSON object in this format and nothing else:\n{RECORD_SCHEMA}\n"
        ),
        user: format!("Symptoms: {}", symptoms.join(", ")),
    }
}

pub const CHAT_SYSTEM: &str = r#"
You are a friendly and knowledgeable wellness advisor.
You answer questions about herbs, natural remedies and health with care.

Style:
- warm and approachable tone
- expert but easy-to-follow explanations
- cautious advice that puts safety first
- no medical diagnosis, general wellness information only

When answering:
- keep it short and clear
- give concrete, practical tips
- add precautions when needed
- stay within about 150 characters
"#;

/// Chat prompts; `current` is the category and herbs of a previous diagnosis.
pub fn build_chat_prompt(message: &str, current: Option<(&str, &[String])>) -> PromptPair {
    let mut user = String::new();
    if let Some((category, herbs)) = current {
        user.push_str(&format!(
            "Current state: {category}\nRecommended herbs: {}\n\n",
            herbs.join(", ")
        ));
    }
    user.push_str(&format!(
        "User question: {}\n\nPlease answer the question above in an expert yet friendly way.",
        message.trim()
    ));
    PromptPair {
        system: CHAT_SYSTEM.to_string(),
        user,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn augmented_prompt_embeds_context_schema_and_checked_answers() {
        let answers: AnswerSet = [("M1", true), ("M2", false), ("F8", true)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let p = build_augmented_prompt("CTX-BLOCK", &["insomnia".into(), "stress".into()], &answers);

        assert!(p.system.contains("CTX-BLOCK"));
        assert!(p.system.contains("\"statusSummary\""));
        assert!(p.system.contains("not a medical diagnosis"));
        assert!(p.user.contains("insomnia, stress"));
        assert!(p.user.contains("✓ F8\n✓ M1"));
        assert!(!p.user.contains("M2"));
    }

    #[test]
    fn direct_prompt_lists_symptoms() {
        let p = build_direct_prompt(&["cold hands".into(), "fatigue".into()]);
        assert_eq!(p.user, "Symptoms: cold hands, fatigue");
        assert!(p.system.starts_with("You are a health and herbal expert."));
    }

    #[test]
    fn chat_prompt_with_and_without_diagnosis() {
        let herbs = vec!["ginger".to_string(), "cinnamon".to_string()];
        let with = build_chat_prompt(" Can I use it daily? ", Some(("Circulation care", &herbs)));
        assert!(with.user.starts_with("Current state: Circulation care\nRecommended herbs: ginger, cinnamon"));
        assert!(with.user.contains("User question: Can I use it daily?\n"));

        let without = build_chat_prompt("hello", None);
        assert!(without.user.starts_with("User question: hello"));
        let [sys, user] = without.into_messages();
        assert_eq!(sys.content, CHAT_SYSTEM);
        assert_eq!(user.role, ai_llm_service::ChatRole::User);
    }
}
