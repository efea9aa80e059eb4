use crate::model::{EnergyConversionMethod, EnergyEfficiency, WasteCategory};
use serde::{Deserialize, Serialize};

/// Static editorial data mapping labels to waste categories and advice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBase {
    pub name: String,
    pub version: String,
    /// General waste words that do not point at a specific category.
    pub waste_indicators: Vec<String>,
    pub categories: CategoryTable,
}

/// Keywords, description and methods for one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryEntry {
    /// Lowercase substrings matched against classifier labels.
    #[serde(default)]
    pub keywords: Vec<String>,
    pub description: String,
    pub energy_efficiency: EnergyEfficiency,
    pub methods: Vec<EnergyConversionMethod>,
}

/// One entry per category. Every field is required, so a loaded table is
/// always complete.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryTable {
    pub organic: CategoryEntry,
    pub plastic: CategoryEntry,
    pub metal: CategoryEntry,
    pub glass: CategoryEntry,
    pub electronic: CategoryEntry,
    pub textile: CategoryEntry,
    pub hazardous: CategoryEntry,
    pub unknown: CategoryEntry,
}

impl CategoryTable {
    pub fn get(&self, category: WasteCategory) -> &CategoryEntry {
        match category {
            WasteCategory::Organic => &self.organic,
            WasteCategory::Plastic => &self.plastic,
            WasteCategory::Metal => &self.metal,
            WasteCategory::Glass => &self.glass,
            WasteCategory::Electronic => &self.electronic,
            WasteCategory::Textile => &self.textile,
            WasteCategory::Hazardous => &self.hazardous,
            WasteCategory::Unknown => &self.unknown,
        }
    }

    /// Entries paired with their category, in scan order.
    pub fn iter(&self) -> impl Iterator<Item = (WasteCategory, &CategoryEntry)> {
        WasteCategory::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}

impl KnowledgeBase {
    pub fn entry(&self, category: WasteCategory) -> &CategoryEntry {
        self.categories.get(category)
    }

    pub fn methods(&self, category: WasteCategory) -> &[EnergyConversionMethod] {
        &self.entry(category).methods
    }

    /// General indicators followed by every category keyword.
    pub fn indicator_keywords(&self) -> impl Iterator<Item = &str> {
        self.waste_indicators.iter().map(String::as_str).chain(
            self.categories
                .iter()
                .flat_map(|(_, entry)| entry.keywords.iter().map(String::as_str)),
        )
    }
}
