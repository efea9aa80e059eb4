use super::document::ReportDocument;
use super::layout::{
    LayoutState, LineHeight, TextStyle, BODY_X, MARGIN, SECTION_HEADER_HEIGHT, SECTION_SPACING,
};
use crate::model::{AnalysisResult, CategoryDetail, EnergyConversionMethod};
use chrono::{Datelike, NaiveDateTime};

pub const BRAND_TITLE: &str = "ECOCONVERT LABS";
pub const REPORT_SUBTITLE: &str = "Waste Analysis Report";
pub const RECOMMENDATIONS_SUBTITLE: &str = "Recommended Energy Conversion Methods";
pub const RECOMMENDATIONS_CONTINUED: &str = "Recommendations (Continued)";

/// Predictions listed in the report.
pub const REPORT_PREDICTIONS: usize = 5;

const BODY: TextStyle = TextStyle::regular(12.0);
const PREDICTION: TextStyle = TextStyle::regular(11.0);
const DETAIL: TextStyle = TextStyle::regular(10.0);
const CATEGORY_NAME: TextStyle = TextStyle::bold(12.0);

/// Space kept free before starting a category or method block.
const BLOCK_SPACE: f64 = 120.0;
/// Space kept free before the efficiency lines of a block.
const FIELDS_SPACE: f64 = 60.0;

pub fn footer_text(generated_at: NaiveDateTime) -> String {
    format!(
        "\u{a9} {} EcoConvert Labs - Turning Waste into Sustainable Energy",
        generated_at.year()
    )
}

/// "January 5, 2025 at 3:07 PM"
pub fn format_timestamp(generated_at: NaiveDateTime) -> String {
    generated_at.format("%B %-d, %Y at %-I:%M %p").to_string()
}

/// Lay out the full report for a waste result.
pub fn render(result: &AnalysisResult, generated_at: NaiveDateTime) -> ReportDocument {
    let mut layout = LayoutState::begin(BRAND_TITLE, REPORT_SUBTITLE, footer_text(generated_at));

    layout.line(
        &format!("Generated on: {}", format_timestamp(generated_at)),
        TextStyle::regular(10.0),
        MARGIN,
        LineHeight::Heading,
    );

    summary(&mut layout, result);
    predictions(&mut layout, result);
    details(&mut layout, &result.category_details);

    layout.new_page(RECOMMENDATIONS_SUBTITLE);
    layout.set_continuation(RECOMMENDATIONS_CONTINUED);
    for (i, method) in result.recommendations.iter().enumerate() {
        recommendation(&mut layout, i, method);
    }

    layout.finish()
}

fn summary(layout: &mut LayoutState, result: &AnalysisResult) {
    layout.section_header("ANALYSIS SUMMARY");
    let detected = if result.is_waste { "Yes" } else { "No" };
    layout.line(
        &format!("Waste Detected: {detected}"),
        BODY,
        BODY_X,
        LineHeight::Normal,
    );
    if !result.waste_categories.is_empty() {
        layout.wrapped(&format!("Categories: {}", result.category_list()), BODY);
    }
    layout.advance(SECTION_SPACING);
}

fn predictions(layout: &mut LayoutState, result: &AnalysisResult) {
    let top = result.top_predictions(REPORT_PREDICTIONS);
    layout.need_space(SECTION_HEADER_HEIGHT + LineHeight::Normal.points());
    layout.section_header("AI PREDICTIONS");
    for (i, prediction) in top.iter().enumerate() {
        layout.line(
            &format!("{}. {}: {}%", i + 1, prediction.label, prediction.percent(2)),
            PREDICTION,
            BODY_X,
            LineHeight::Normal,
        );
    }
    layout.advance(SECTION_SPACING);
}

fn details(layout: &mut LayoutState, details: &[CategoryDetail]) {
    if details.is_empty() {
        return;
    }
    layout.need_space(50.0);
    layout.section_header("WASTE CATEGORY DETAILS");

    for detail in details {
        let efficiency = &detail.energy_efficiency;
        layout.need_space(BLOCK_SPACE);
        layout.line(
            &detail.category.id().to_uppercase(),
            CATEGORY_NAME,
            BODY_X,
            LineHeight::Heading,
        );
        layout.wrapped(&detail.description, DETAIL);
        layout.advance(LineHeight::Small.points());

        layout.need_space(FIELDS_SPACE);
        layout.wrapped(
            &format!("Potential Energy: {}", efficiency.potential_energy),
            DETAIL,
        );
        layout.advance(LineHeight::Small.points());

        layout.need_space(LineHeight::Normal.points());
        layout.wrapped(
            &format!("Conversion Efficiency: {}", efficiency.conversion_efficiency),
            DETAIL,
        );
        layout.advance(LineHeight::Small.points());

        layout.need_space(LineHeight::Normal.points());
        layout.wrapped(&format!("Best Methods: {}", efficiency.best_methods), DETAIL);
        layout.advance(SECTION_SPACING);
    }
}

fn recommendation(layout: &mut LayoutState, index: usize, method: &EnergyConversionMethod) {
    layout.need_space(BLOCK_SPACE);
    layout.section_header(&format!(
        "METHOD {}: {}",
        index + 1,
        method.method.to_uppercase()
    ));
    layout.wrapped(&method.description, DETAIL);
    layout.advance(LineHeight::Small.points());

    layout.need_space(FIELDS_SPACE);
    layout.wrapped(&format!("Efficiency: {}", method.efficiency), DETAIL);
    layout.advance(LineHeight::Small.points());
    layout.wrapped(&format!("Waste Types: {}", method.waste_types), DETAIL);
    layout.advance(LineHeight::Small.points());
    layout.wrapped(
        &format!("Environmental Benefits: {}", method.environmental_benefits),
        DETAIL,
    );
    layout.advance(SECTION_SPACING + 10.0);
}
