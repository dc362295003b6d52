//! Corpus sources: the hand-authored built-ins plus optional JSON-lines files.
//!
//! Built-in sources are loaded in this order:
//! 1. general herbal knowledge entries
//! 2. recipe entries (one per steam recipe)
//! 3. symptom-mapping entries (one per questionnaire item)

use std::path::PathBuf;

use tracing::debug;

use crate::error::{KnowledgeError, Result};
use crate::models::{Document, DocumentKind, DocumentMetadata};

/// Where a batch of documents comes from.
#[derive(Debug, Clone)]
pub enum CorpusSource {
    Knowledge,
    Recipes,
    Symptoms,
    /// One JSON [`Document`] per non-blank line.
    JsonLines(PathBuf),
    /// Documents supplied by the caller.
    Inline(Vec<Document>),
}

impl CorpusSource {
    /// The three hand-authored sources, in load order.
    pub fn builtin() -> Vec<CorpusSource> {
        vec![
            CorpusSource::Knowledge,
            CorpusSource::Recipes,
            CorpusSource::Symptoms,
        ]
    }

    pub fn name(&self) -> String {
        match self {
            CorpusSource::Knowledge => "knowledge".into(),
            CorpusSource::Recipes => "recipes".into(),
            CorpusSource::Symptoms => "symptoms".into(),
            CorpusSource::JsonLines(p) => format!("jsonl:{}", p.display()),
            CorpusSource::Inline(_) => "inline".into(),
        }
    }

    /// Loads every document of this source.
    ///
    /// # Errors
    /// Only file-backed sources fail: unreadable file, a line that is not a
    /// document, or a document with an empty id.
    pub async fn load(&self) -> Result<Vec<Document>> {
        match self {
            CorpusSource::Knowledge => Ok(knowledge_entries()),
            CorpusSource::Recipes => Ok(recipe_entries()),
            CorpusSource::Symptoms => Ok(symptom_entries()),
            CorpusSource::Inline(docs) => Ok(docs.clone()),
            CorpusSource::JsonLines(path) => load_jsonl(path).await,
        }
    }
}

async fn load_jsonl(path: &PathBuf) -> Result<Vec<Document>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| KnowledgeError::Io {
            path: path.clone(),
            source,
        })?;

    let mut out = Vec::new();
    for (idx, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let doc: Document =
            serde_json::from_str(line).map_err(|source| KnowledgeError::Parse {
                path: path.clone(),
                line: idx + 1,
                source,
            })?;
        if doc.id.trim().is_empty() {
            return Err(KnowledgeError::EmptyId {
                path: path.clone(),
                line: idx + 1,
            });
        }
        out.push(doc);
    }

    debug!(path = %path.display(), docs = out.len(), "jsonl corpus parsed");
    Ok(out)
}

/* ------------------------------------------------------------------------- */
/* Built-in data                                                             */
/* ------------------------------------------------------------------------- */

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn general(
    id: &str,
    category: &str,
    content: &str,
    symptoms: &[&str],
    herbs: &[&str],
    benefits: &[&str],
) -> Document {
    Document {
        id: id.to_string(),
        content: content.trim().to_string(),
        metadata: DocumentMetadata {
            kind: DocumentKind::General,
            category: Some(category.to_string()),
            symptoms: strings(symptoms),
            herbs: strings(herbs),
            benefits: strings(benefits),
            ..Default::default()
        },
    }
}

/// General herbal knowledge entries.
pub fn knowledge_entries() -> Vec<Document> {
    vec![
        general(
            "stress_management",
            "mental_health",
            "Stress management and mental health.
Chronic stress is hard to avoid and often shows up as poor sleep, irritability, anxiety and loss of focus.
Recommended herbs:
- Chamomile: calming, strongly relaxing
- Lavender: soothes the nervous system and improves sleep quality
- Passion flower: eases anxiety and keeps the mind steady
- Lemon balm: relieves tension and stabilizes mood
Use: 15-20 minutes of steam one hour before bed, breathing the aroma deeply.
Caution: consult a doctor first when pregnant or breastfeeding.",
            &["stress", "anxiety", "insomnia", "irritability"],
            &["chamomile", "lavender", "passion_flower", "lemon_balm"],
            &["relaxation", "sleep_improvement", "anxiety_reduction"],
        ),
        general(
            "womens_health",
            "womens_health",
            "Women's health and hormonal balance.
Menstrual cycles, PMS and menopause bring hormonal swings with many symptoms; a natural approach can help rebalance them.
Recommended herbs:
- Rose: supports female hormones and the skin
- Clary sage: estrogen-like action, eases PMS
- Geranium: hormonal balance and emotional stability
- Chaste tree: supports progesterone production
Use: 20 minutes daily starting one week before menstruation, relaxed and warm.
Effects: less menstrual pain, milder PMS, better skin, steadier mood.",
            &["menstrual_irregularity", "pms", "menopause", "hormonal_imbalance"],
            &["rose", "clary_sage", "geranium", "chaste_tree"],
            &["hormone_balance", "menstrual_relief", "skin_health"],
        ),
        general(
            "circulation_warming",
            "circulation",
            "Circulation and relief from feeling cold.
Cold sensitivity mostly comes from poor circulation and leads to fatigue, swelling and slower metabolism. Warming herbs heat the body from the inside.
Recommended herbs:
- Ginger: boosts circulation and body temperature, aids digestion
- Cinnamon: widens peripheral vessels, raises metabolism
- Clove: warming and antioxidant
- Rosemary: boosts circulation and concentration
Use: 20-30 minutes of steam before bathing; combines well with a foot bath.
Timeline: noticeable after 2-3 weeks of regular use, especially in winter.",
            &["cold_sensitivity", "poor_circulation", "fatigue", "swelling"],
            &["ginger", "cinnamon", "clove", "rosemary"],
            &["circulation_improvement", "warming", "metabolism_boost"],
        ),
        general(
            "detox_beauty",
            "detox_beauty",
            "Detox and beauty.
Accumulated waste shows up as rough or dull skin and tiredness. Diuretic and antioxidant herbs help the body cleanse itself.
Recommended herbs:
- Dandelion: liver detox, diuretic
- Nettle: blood cleansing, minerals
- Rose hip: rich in vitamin C, antioxidant
- Hibiscus: antioxidant, good for the skin
Use: 25 minutes of steam on an empty stomach with plenty of water.
Frequency: 2-3 times a week; avoid overuse.",
            &["skin_problems", "fatigue", "constipation", "dullness"],
            &["dandelion", "nettle", "rose_hip", "hibiscus"],
            &["detoxification", "skin_improvement", "antioxidant"],
        ),
        general(
            "digestive_health",
            "digestive",
            "Digestive health support.
Indigestion, constipation and an upset stomach lower quality of life. These herbs aid digestion and gut health.
Recommended herbs:
- Peppermint: aids digestion, calms the stomach
- Fennel: relieves intestinal gas
- Ginger: activates the gut, eases nausea
- Chamomile: soothes the stomach, anti-inflammatory
Use: 15 minutes of steam at least 30 minutes after a meal, ideally with an abdominal massage.
Effects: better digestion, constipation relief, less bloating.",
            &["indigestion", "constipation", "bloating", "nausea"],
            &["peppermint", "fennel", "ginger", "chamomile"],
            &["digestion_improvement", "constipation_relief", "gut_health"],
        ),
    ]
}

struct RecipeEntry {
    id: &'static str,
    title: &'static str,
    categories: &'static [&'static str],
    symptoms: &'static [&'static str],
    description: &'static str,
    herbs: &'static [&'static str],
}

const RECIPES: &[RecipeEntry] = &[
    RecipeEntry {
        id: "recipe_001",
        title: "Rhythm Circulation Steam",
        categories: &["hormonal", "blood", "blood-stagnation"],
        symptoms: &[
            "irregular periods",
            "menopause symptoms",
            "stiff shoulders",
            "cold sensitivity",
            "blood stagnation",
            "light menstrual flow",
            "frequent sighing",
            "low motivation",
            "pale complexion",
            "dry skin",
        ],
        description: "Steam care that promotes blood flow and balances hormones. Suited to irregular cycles, menopausal discomfort and blood-deficient or stagnant types.",
        herbs: &["mugwort", "angelica root", "safflower", "rose", "citrus peel"],
    },
    RecipeEntry {
        id: "recipe_002",
        title: "Detox Steam",
        categories: &["immune", "water", "spleen-deficiency"],
        symptoms: &[
            "swelling",
            "hay fever",
            "allergies",
            "water metabolism imbalance",
            "frequent urination",
            "too much or too little sweat",
            "tooth marks on the tongue",
            "thirst without wanting to drink",
        ],
        description: "Steam care that flushes excess water and waste and rebalances immunity. Recommended when water circulation is sluggish.",
        herbs: &["mugwort", "motherwort", "peach leaf", "rosemary"],
    },
    RecipeEntry {
        id: "recipe_003",
        title: "Restful Sleep Steam",
        categories: &["autonomic-nervous", "essence", "qi", "stress"],
        symptoms: &[
            "insomnia",
            "nervous tension",
            "tinnitus",
            "vivid dreams",
            "aging",
            "trouble falling asleep",
            "easily tense",
            "emotional ups and downs",
            "sensitivity to sound and light",
            "hard mornings",
            "tiring easily",
            "weak lower back and knees",
        ],
        description: "Steam care that settles the autonomic nervous system and invites deep relaxation. Recommended for stress, fatigue and age-related discomfort.",
        herbs: &["mugwort", "ginkgo leaf", "angelica root", "chamomile", "loquat leaf"],
    },
];

/// One document per steam recipe.
pub fn recipe_entries() -> Vec<Document> {
    RECIPES
        .iter()
        .map(|r| Document {
            id: r.id.to_string(),
            content: format!(
                "{title}\nCategories: {cats}\nTarget symptoms: {symptoms}\nDescription: {desc}\nHerbs: {herbs}\nEntry type: recipe",
                title = r.title,
                cats = r.categories.join(", "),
                symptoms = r.symptoms.join(", "),
                desc = r.description,
                herbs = r.herbs.join(", "),
            ),
            metadata: DocumentMetadata {
                kind: DocumentKind::Recipe,
                title: Some(r.title.to_string()),
                categories: strings(r.categories),
                symptoms: strings(r.symptoms),
                herbs: strings(r.herbs),
                ..Default::default()
            },
        })
        .collect()
}

/// `(id, text, category, recipe)` for every questionnaire item.
const SYMPTOMS: &[(&str, &str, &str, &str)] = &[
    ("M1", "Trouble falling asleep and waking during the night", "autonomic-nervous", "Restful Sleep Steam"),
    ("M2", "Tense easily and cannot stop worrying", "autonomic-nervous", "Restful Sleep Steam"),
    ("M3", "Struggle with mornings and feel foggy", "autonomic-nervous", "Restful Sleep Steam"),
    ("M4", "Sudden irritability or tears, emotionally unstable", "autonomic-nervous", "Restful Sleep Steam"),
    ("M5", "Sensitive to sound and light", "autonomic-nervous", "Restful Sleep Steam"),
    ("M6", "Menstrual rhythm is irregular", "hormonal", "Rhythm Circulation Steam"),
    ("M7", "Bothered by menopause symptoms such as hot flushes or irritability", "hormonal", "Rhythm Circulation Steam"),
    ("M8", "Breast tenderness or mood swings before menstruation", "hormonal", "Rhythm Circulation Steam"),
    ("M9", "Strong menstrual pain or periods that suddenly got heavier", "hormonal", "Rhythm Circulation Steam"),
    ("M10", "Hay fever, rhinitis or atopic skin", "immune", "Detox Steam"),
    ("M11", "Allergy or autoimmune related discomfort", "immune", "Detox Steam"),
    ("F1", "Tire easily and sluggishness does not go away", "qi", "Restful Sleep Steam"),
    ("F2", "Sigh often and lack motivation", "qi", "Rhythm Circulation Steam"),
    ("F3", "Bloated belly and gas builds up easily", "qi", "Rhythm Circulation Steam"),
    ("F4", "Pale complexion and skin dries easily", "blood", "Rhythm Circulation Steam"),
    ("F5", "Light or pale menstrual flow", "blood", "Rhythm Circulation Steam"),
    ("F6", "Stiff shoulders, cold sensitivity or clots in menstrual blood", "blood-stagnation", "Rhythm Circulation Steam"),
    ("F7", "Lips or nails look whitish", "blood", "Rhythm Circulation Steam"),
    ("F8", "Swell easily and the body feels heavy", "water", "Detox Steam"),
    ("F9", "Frequent urination, sweating too much or too little", "water", "Detox Steam"),
    ("F10", "Tooth marks show along the edge of the tongue", "water", "Detox Steam"),
    ("F11", "Thirsty but do not want to drink water", "water", "Detox Steam"),
    ("F12", "Worried about hair loss or grey hair", "essence", "Restful Sleep Steam"),
    ("F13", "Light sleep with many dreams", "essence", "Restful Sleep Steam"),
    ("F14", "Feel aging or declining fertility", "essence", "Restful Sleep Steam"),
    ("F15", "Tinnitus, hearing loss or dizziness", "essence", "Restful Sleep Steam"),
    ("F16", "Weak or heavy lower back and knees", "essence", "Restful Sleep Steam"),
];

/// One document per questionnaire item.
pub fn symptom_entries() -> Vec<Document> {
    SYMPTOMS
        .iter()
        .map(|(id, text, category, recipe)| Document {
            id: id.to_string(),
            content: format!(
                "Symptom ID: {id}\nSymptom: {text}\nThis symptom relates to an imbalance of {category}, and {recipe} is considered effective care.\nFrom an Eastern medicine view, {category} discomfort signals that the body has lost its balance, and a suitable herbal steam can help restore it."
            ),
            metadata: DocumentMetadata {
                kind: DocumentKind::Symptom,
                category: Some(category.to_string()),
                symptoms: vec![text.to_string()],
                symptom_id: Some(id.to_string()),
                recommended_recipe: Some(recipe.to_string()),
                ..Default::default()
            },
        })
        .collect()
}
