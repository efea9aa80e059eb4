use ecoconvert_core::error::EcoConvertError;
use ecoconvert_core::model::AnalysisResult;
use ecoconvert_core::presentation::{EfficiencyView, OverviewView, PredictionsView, QuickSummary};
use serde::Serialize;

/// Everything `analyze -o json` prints. Views are included on request.
#[derive(Serialize)]
pub struct AnalysisOutput<'a> {
    pub summary: QuickSummary,
    pub result: &'a AnalysisResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<OverviewView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub efficiency: Option<EfficiencyView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predictions: Option<PredictionsView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
}

pub fn print<T: Serialize>(value: &T) -> Result<(), EcoConvertError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
