use serde::{Deserialize, Serialize};
use std::fmt;

/// One classifier output: a label and its confidence in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(alias = "className")]
    pub label: String,
    #[serde(alias = "probability")]
    pub confidence: f64,
}

impl Prediction {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }

    /// Confidence as a percentage string with the given precision.
    pub fn percent(&self, decimals: usize) -> String {
        format!("{:.*}", decimals, self.confidence * 100.0)
    }
}

/// The fixed waste taxonomy. Declaration order is the keyword scan order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WasteCategory {
    Organic,
    Plastic,
    Metal,
    Glass,
    Electronic,
    Textile,
    Hazardous,
    Unknown,
}

impl WasteCategory {
    /// Every category, in scan order.
    pub const ALL: [WasteCategory; 8] = [
        WasteCategory::Organic,
        WasteCategory::Plastic,
        WasteCategory::Metal,
        WasteCategory::Glass,
        WasteCategory::Electronic,
        WasteCategory::Textile,
        WasteCategory::Hazardous,
        WasteCategory::Unknown,
    ];

    pub fn id(self) -> &'static str {
        match self {
            WasteCategory::Organic => "organic",
            WasteCategory::Plastic => "plastic",
            WasteCategory::Metal => "metal",
            WasteCategory::Glass => "glass",
            WasteCategory::Electronic => "electronic",
            WasteCategory::Textile => "textile",
            WasteCategory::Hazardous => "hazardous",
            WasteCategory::Unknown => "unknown",
        }
    }

    /// Display name with an upper-case first letter ("Organic").
    pub fn title(self) -> String {
        let id = self.id();
        let mut chars = id.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn from_str_loose(s: &str) -> Option<WasteCategory> {
        let lower = s.trim().to_lowercase();
        WasteCategory::ALL.into_iter().find(|c| c.id() == lower)
    }
}

impl fmt::Display for WasteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Numeric efficiency profile, all values on a 0-100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EfficiencyMetrics {
    pub potential_energy: u8,
    pub conversion_efficiency: u8,
    /// Higher means harder to process.
    pub processing_complexity: u8,
    /// Higher means a larger footprint.
    pub carbon_footprint: u8,
    pub resource_recovery: u8,
}

impl EfficiencyMetrics {
    pub fn values(&self) -> [u8; 5] {
        [
            self.potential_energy,
            self.conversion_efficiency,
            self.processing_complexity,
            self.carbon_footprint,
            self.resource_recovery,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyEfficiency {
    pub potential_energy: String,
    pub conversion_efficiency: String,
    pub best_methods: String,
    pub carbon_footprint: String,
    pub resource_recovery: String,
    pub metrics: EfficiencyMetrics,
}

/// Descriptive record for one detected category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDetail {
    pub category: WasteCategory,
    pub description: String,
    pub energy_efficiency: EnergyEfficiency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyConversionMethod {
    pub method: String,
    pub description: String,
    pub efficiency: String,
    pub waste_types: String,
    pub environmental_benefits: String,
}

/// What a keyword hit contributed to the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "category")]
pub enum MatchTarget {
    /// Hit in the general waste-indicator set.
    Indicator,
    Category(WasteCategory),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordMatch {
    pub label: String,
    pub keyword: String,
    pub target: MatchTarget,
}

/// Outcome of mapping classifier predictions onto the waste taxonomy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub predictions: Vec<Prediction>,
    pub is_waste: bool,
    /// Detected categories in first-match order, without duplicates.
    pub waste_categories: Vec<WasteCategory>,
    pub category_details: Vec<CategoryDetail>,
    pub recommendations: Vec<EnergyConversionMethod>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<KeywordMatch>,
}

impl AnalysisResult {
    /// The `n` most confident predictions. Ties keep producer order.
    pub fn top_predictions(&self, n: usize) -> Vec<&Prediction> {
        let mut ranked: Vec<&Prediction> = self.predictions.iter().collect();
        ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        ranked.truncate(n);
        ranked
    }

    /// Reports and detail views are only offered for waste.
    pub fn has_report(&self) -> bool {
        self.is_waste
    }

    pub fn category_list(&self) -> String {
        self.waste_categories
            .iter()
            .map(|c| c.id())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
