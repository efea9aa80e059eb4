//! View models projected from an [`AnalysisResult`].
//!
//! Every projection is pure and tolerates results without category details.

use crate::knowledge::METRIC_SCALE_MAX;
use crate::model::{AnalysisResult, MatchTarget, Prediction, WasteCategory};
use serde::Serialize;

/// Predictions shown in the ranked chart.
pub const TOP_PREDICTIONS: usize = 5;
/// Full mark of the efficiency profile axes.
pub const PROFILE_SCALE_MAX: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionSlice {
    pub name: String,
    /// Number of distinct prediction labels that hit the category.
    pub count: usize,
    /// Percentage of all category hits.
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergyBar {
    pub name: String,
    pub potential_energy: u8,
    pub conversion_efficiency: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewView {
    pub distribution: Vec<DistributionSlice>,
    pub energy: Vec<EnergyBar>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileAxis {
    pub axis: &'static str,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EfficiencyProfile {
    pub name: String,
    pub axes: Vec<ProfileAxis>,
    pub potential_energy: String,
    pub conversion_efficiency: String,
    pub best_methods: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EfficiencyView {
    pub profiles: Vec<EfficiencyProfile>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRow {
    pub rank: usize,
    pub label: String,
    /// Confidence as a percentage with one decimal.
    pub percent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionsView {
    /// Most confident predictions with short labels.
    pub top: Vec<PredictionRow>,
    /// Every prediction with its full label.
    pub all: Vec<PredictionRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickSummary {
    pub is_waste: bool,
    pub categories: Vec<String>,
    pub top_prediction: Option<PredictionRow>,
    pub recommendation_count: usize,
}

pub fn overview(result: &AnalysisResult) -> OverviewView {
    let counts: Vec<(WasteCategory, usize)> = result
        .waste_categories
        .iter()
        .map(|&category| (category, label_hits(result, category).max(1)))
        .collect();
    let total: usize = counts.iter().map(|(_, n)| n).sum();

    let distribution = counts
        .into_iter()
        .map(|(category, count)| DistributionSlice {
            name: category.title(),
            count,
            share: count as f64 * 100.0 / total as f64,
        })
        .collect();

    let energy = result
        .category_details
        .iter()
        .map(|detail| EnergyBar {
            name: detail.category.title(),
            potential_energy: detail.energy_efficiency.metrics.potential_energy,
            conversion_efficiency: detail.energy_efficiency.metrics.conversion_efficiency,
        })
        .collect();

    OverviewView {
        distribution,
        energy,
    }
}

fn label_hits(result: &AnalysisResult, category: WasteCategory) -> usize {
    let mut labels: Vec<&str> = result
        .matches
        .iter()
        .filter(|m| m.target == MatchTarget::Category(category))
        .map(|m| m.label.as_str())
        .collect();
    labels.sort_unstable();
    labels.dedup();
    labels.len()
}

/// Convert a 0-100 knowledge-base metric to the profile scale.
fn to_profile_scale(value: u8) -> f64 {
    f64::from(value) * PROFILE_SCALE_MAX / f64::from(METRIC_SCALE_MAX)
}

pub fn efficiency(result: &AnalysisResult) -> EfficiencyView {
    let profiles = result
        .category_details
        .iter()
        .map(|detail| {
            let text = &detail.energy_efficiency;
            let m = &text.metrics;
            EfficiencyProfile {
                name: detail.category.title(),
                axes: vec![
                    ProfileAxis {
                        axis: "Energy Potential",
                        value: to_profile_scale(m.potential_energy),
                    },
                    ProfileAxis {
                        axis: "Conversion Efficiency",
                        value: to_profile_scale(m.conversion_efficiency),
                    },
                    // Lower complexity and footprint are better, so both are inverted.
                    ProfileAxis {
                        axis: "Processing Complexity",
                        value: PROFILE_SCALE_MAX - to_profile_scale(m.processing_complexity),
                    },
                    ProfileAxis {
                        axis: "Carbon Footprint",
                        value: PROFILE_SCALE_MAX - to_profile_scale(m.carbon_footprint),
                    },
                    ProfileAxis {
                        axis: "Resource Recovery",
                        value: to_profile_scale(m.resource_recovery),
                    },
                ],
                potential_energy: text.potential_energy.clone(),
                conversion_efficiency: text.conversion_efficiency.clone(),
                best_methods: text.best_methods.clone(),
            }
        })
        .collect();
    EfficiencyView { profiles }
}

/// First comma-separated part of a classifier label ("tabby, tabby cat" -> "tabby").
pub fn short_label(label: &str) -> &str {
    label.split(',').next().unwrap_or(label).trim()
}

fn row(rank: usize, label: &str, prediction: &Prediction) -> PredictionRow {
    PredictionRow {
        rank,
        label: label.to_string(),
        percent: prediction.percent(1),
    }
}

pub fn predictions(result: &AnalysisResult) -> PredictionsView {
    let top = result
        .top_predictions(TOP_PREDICTIONS)
        .into_iter()
        .enumerate()
        .map(|(i, p)| row(i + 1, short_label(&p.label), p))
        .collect();
    let all = result
        .predictions
        .iter()
        .enumerate()
        .map(|(i, p)| row(i + 1, &p.label, p))
        .collect();
    PredictionsView { top, all }
}

pub fn quick_summary(result: &AnalysisResult) -> QuickSummary {
    QuickSummary {
        is_waste: result.is_waste,
        categories: result
            .waste_categories
            .iter()
            .map(|c| c.title())
            .collect(),
        top_prediction: result
            .top_predictions(1)
            .first()
            .map(|p| row(1, &p.label, p)),
        recommendation_count: result.recommendations.len(),
    }
}
