use ecoconvert_core::model::AnalysisResult;
use ecoconvert_core::presentation::{
    EfficiencyView, OverviewView, PredictionsView, QuickSummary, PROFILE_SCALE_MAX,
};

const BAR_WIDTH: usize = 20;

/// Horizontal bar of `value` out of `max`, `BAR_WIDTH` cells wide.
pub fn bar(value: f64, max: f64) -> String {
    let ratio = if max > 0.0 { (value / max).clamp(0.0, 1.0) } else { 0.0 };
    let filled = (ratio * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

pub fn print_summary(summary: &QuickSummary) {
    println!("=== Analysis ===\n");
    println!(
        "  Waste detected: {}",
        if summary.is_waste { "Yes" } else { "No" }
    );
    if let Some(top) = &summary.top_prediction {
        println!("  Top prediction: {} ({}%)", top.label, top.percent);
    }
    if summary.is_waste {
        println!("  Categories: {}", summary.categories.join(", "));
        println!("  Recommended methods: {}", summary.recommendation_count);
    } else {
        println!("  No waste keywords matched; no category details or report available.");
    }
    println!();
}

pub fn print_predictions(view: &PredictionsView, full: bool) {
    println!("=== Predictions ===\n");
    let width = view.top.iter().map(|r| r.label.len()).max().unwrap_or(10);
    for row in &view.top {
        let value: f64 = row.percent.parse().unwrap_or(0.0);
        println!(
            "  {}. {:<width$}  {:>5}%  {}",
            row.rank,
            row.label,
            row.percent,
            bar(value, 100.0),
            width = width
        );
    }
    println!();

    if full {
        println!("  All predictions:");
        for row in &view.all {
            println!("    {:>2}. {} ({}%)", row.rank, row.label, row.percent);
        }
        println!();
    }
}

pub fn print_overview(view: &OverviewView) {
    println!("=== Overview ===\n");
    if view.distribution.is_empty() {
        println!("  No waste categories detected.\n");
        return;
    }

    println!("  Category distribution:");
    for slice in &view.distribution {
        println!(
            "    {:<12} {:>2}  {:>5.1}%  {}",
            slice.name,
            slice.count,
            slice.share,
            bar(slice.share, 100.0)
        );
    }
    println!();

    println!("  Energy potential / conversion efficiency (0-100):");
    for item in &view.energy {
        println!(
            "    {:<12} potential  {:>3}  {}",
            item.name,
            item.potential_energy,
            bar(f64::from(item.potential_energy), 100.0)
        );
        println!(
            "    {:<12} efficiency {:>3}  {}",
            "",
            item.conversion_efficiency,
            bar(f64::from(item.conversion_efficiency), 100.0)
        );
    }
    println!();
}

pub fn print_efficiency(view: &EfficiencyView) {
    println!("=== Efficiency ===\n");
    if view.profiles.is_empty() {
        println!("  No category details available.\n");
        return;
    }

    for profile in &view.profiles {
        println!("  {}", profile.name);
        for axis in &profile.axes {
            println!(
                "    {:<22} {:>4.1}  {}",
                axis.axis,
                axis.value,
                bar(axis.value, PROFILE_SCALE_MAX)
            );
        }
        println!("    Potential energy: {}", profile.potential_energy);
        println!("    Conversion efficiency: {}", profile.conversion_efficiency);
        println!("    Best methods: {}", profile.best_methods);
        println!();
    }
}

pub fn print_recommendations(result: &AnalysisResult) {
    if result.recommendations.is_empty() {
        return;
    }
    println!("=== Recommended conversion methods ===\n");
    for (i, method) in result.recommendations.iter().enumerate() {
        println!("  {}. {}", i + 1, method.method);
        println!("     {}", method.description);
        println!("     Efficiency: {}", method.efficiency);
        println!();
    }
}

/// Keyword hits behind the verdict, for `--verbose`.
pub fn print_matches(result: &AnalysisResult) {
    if result.matches.is_empty() {
        return;
    }
    println!("  Keyword matches:");
    for m in &result.matches {
        let target = match m.target {
            ecoconvert_core::model::MatchTarget::Indicator => "waste indicator".to_string(),
            ecoconvert_core::model::MatchTarget::Category(c) => c.title(),
        };
        println!("    '{}' contains '{}' -> {}", m.label, m.keyword, target);
    }
    println!();
}
