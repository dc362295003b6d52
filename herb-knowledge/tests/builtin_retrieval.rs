use std::path::PathBuf;

use herb_knowledge::{CorpusSource, DocumentKind, KnowledgeStore, Retriever};

fn temp_jsonl(name: &str, body: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("herb-knowledge-{}-{name}", std::process::id()));
    std::fs::write(&path, body).unwrap();
    path
}

#[tokio::test]
async fn warming_query_ranks_circulation_entry_first() {
    let store = KnowledgeStore::default();
    let docs = store.initialize().await;

    let hits = Retriever::new(docs).similarity_search("ginger cinnamon circulation warming", 3);

    assert!(!hits.is_empty());
    assert_eq!(hits[0].document.id, "circulation_warming");
    assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
}

#[tokio::test]
async fn herb_query_finds_the_recipe() {
    let store = KnowledgeStore::default();
    let docs = store.initialize().await;

    let hits = Retriever::new(docs).similarity_search("mugwort angelica safflower", 5);
    let top = &hits[0].document;
    assert_eq!(top.kind(), DocumentKind::Recipe);
    assert_eq!(top.metadata.title.as_deref(), Some("Rhythm Circulation Steam"));
}

#[tokio::test]
async fn recipe_name_query_prefers_entries_tied_to_that_recipe() {
    let store = KnowledgeStore::default();
    let docs = store.initialize().await;

    // Short symptom entries naming the recipe outrank the longer recipe entry.
    let hits = Retriever::new(docs).similarity_search("Detox Steam", 5);
    assert_eq!(hits.len(), 5);
    for hit in &hits {
        let meta = &hit.document.metadata;
        assert!(
            meta.recommended_recipe.as_deref() == Some("Detox Steam")
                || meta.title.as_deref() == Some("Detox Steam"),
            "unexpected hit {}",
            hit.document.id
        );
    }
}

#[tokio::test]
async fn category_retrieval_filters_symptom_entries() {
    let store = KnowledgeStore::default();
    let docs = store.initialize().await;

    let hits = Retriever::new(docs).retrieve_by_category("symptom imbalance water", &["water"], 3);
    assert!(!hits.is_empty() && hits.len() <= 3);
    assert!(
        hits.iter()
            .all(|h| h.document.metadata.category.as_deref() == Some("water"))
    );
}

#[tokio::test]
async fn extra_jsonl_source_is_appended_and_duplicates_skipped() {
    let path = temp_jsonl(
        "extra.jsonl",
        concat!(
            r#"{"id":"sleep_tea","content":"Linden and lemon balm evening steam","metadata":{"category":"sleep","herbs":["linden"]}}"#,
            "\n\n",
            r#"{"id":"M1","content":"shadowed","metadata":{"type":"symptom"}}"#,
            "\n"
        ),
    );
    let store = KnowledgeStore::with_extra([CorpusSource::JsonLines(path.clone())]);
    let docs = store.initialize().await;

    assert_eq!(docs.len(), 36);
    assert_eq!(docs.last().map(|d| d.id.as_str()), Some("sleep_tea"));
    let m1 = docs.iter().find(|d| d.id == "M1").unwrap();
    assert_ne!(m1.content, "shadowed");

    let hits = Retriever::new(docs).retrieve_by_category("linden evening", &["linden"], 5);
    assert_eq!(hits.len(), 1);

    std::fs::remove_file(path).ok();
}

#[tokio::test]
async fn malformed_jsonl_source_contributes_nothing() {
    let path = temp_jsonl("broken.jsonl", "{ not a document }\n");
    let store = KnowledgeStore::with_extra([CorpusSource::JsonLines(path.clone())]);
    assert_eq!(store.initialize().await.len(), 35);
    std::fs::remove_file(path).ok();
}
