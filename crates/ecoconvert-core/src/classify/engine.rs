use crate::knowledge::schema::KnowledgeBase;
use crate::model::{
    AnalysisResult, CategoryDetail, KeywordMatch, MatchTarget, Prediction, WasteCategory,
};

/// Map classifier predictions onto the waste taxonomy.
///
/// A prediction marks the image as waste when its lowercased label contains
/// any indicator keyword. Categories are collected from every label and every
/// category keyword, deduplicated in first-match order. Waste with no category
/// hit falls back to `Unknown`.
pub fn classify(predictions: &[Prediction], kb: &KnowledgeBase) -> AnalysisResult {
    let mut matches = Vec::new();

    let indicator = find_indicator(predictions, kb);
    let is_waste = indicator.is_some();
    if let Some(hit) = indicator {
        matches.push(hit);
    }

    let mut waste_categories = Vec::new();
    for prediction in predictions {
        let label = prediction.label.to_lowercase();
        for (category, entry) in kb.categories.iter() {
            for keyword in &entry.keywords {
                if !label.contains(keyword.as_str()) {
                    continue;
                }
                tracing::debug!(
                    label = %prediction.label,
                    %keyword,
                    %category,
                    "category keyword hit"
                );
                matches.push(KeywordMatch {
                    label: prediction.label.clone(),
                    keyword: keyword.clone(),
                    target: MatchTarget::Category(category),
                });
                if !waste_categories.contains(&category) {
                    waste_categories.push(category);
                }
            }
        }
    }

    if waste_categories.is_empty() && is_waste {
        waste_categories.push(WasteCategory::Unknown);
    }

    let category_details = waste_categories
        .iter()
        .map(|&category| {
            let entry = kb.entry(category);
            CategoryDetail {
                category,
                description: entry.description.clone(),
                energy_efficiency: entry.energy_efficiency.clone(),
            }
        })
        .collect();

    let recommendations = waste_categories
        .iter()
        .flat_map(|&category| kb.methods(category).iter().cloned())
        .collect();

    AnalysisResult {
        predictions: predictions.to_vec(),
        is_waste,
        waste_categories,
        category_details,
        recommendations,
        matches,
    }
}

/// First (prediction, indicator keyword) hit, scanning predictions in order.
fn find_indicator(predictions: &[Prediction], kb: &KnowledgeBase) -> Option<KeywordMatch> {
    predictions.iter().find_map(|prediction| {
        let label = prediction.label.to_lowercase();
        kb.indicator_keywords()
            .find(|keyword| label.contains(keyword))
            .map(|keyword| KeywordMatch {
                label: prediction.label.clone(),
                keyword: keyword.to_string(),
                target: MatchTarget::Indicator,
            })
    })
}
