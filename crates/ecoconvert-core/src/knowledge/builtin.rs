use super::schema::KnowledgeBase;
use std::sync::LazyLock;

const KNOWLEDGE_BASE_JSON: &str = include_str!("../../data/knowledge-base.json");

static KNOWLEDGE_BASE: LazyLock<KnowledgeBase> = LazyLock::new(|| {
    serde_json::from_str(KNOWLEDGE_BASE_JSON).expect("embedded knowledge-base.json is valid")
});

/// The knowledge base shipped with the crate.
pub fn knowledge_base() -> &'static KnowledgeBase {
    &KNOWLEDGE_BASE
}
