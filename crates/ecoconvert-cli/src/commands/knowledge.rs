use super::Context;
use ecoconvert_core::error::EcoConvertError;
use ecoconvert_core::knowledge::schema::KnowledgeBase;
use ecoconvert_core::model::WasteCategory;
use std::collections::BTreeMap;
use std::path::Path;

pub fn list(ctx: &Context) -> Result<(), EcoConvertError> {
    let kb = ctx.knowledge_base()?;
    println!("{} (v{})\n", kb.name, kb.version);
    println!("Waste categories:\n");
    for (category, entry) in kb.categories.iter() {
        println!(
            "  {:<12} {:>2} keywords, {} methods",
            category.id(),
            entry.keywords.len(),
            entry.methods.len()
        );
    }
    println!();
    println!("General waste indicators: {}", kb.waste_indicators.join(", "));
    Ok(())
}

pub fn explain(category: &str, ctx: &Context) -> Result<(), EcoConvertError> {
    let category = WasteCategory::from_str_loose(category).ok_or_else(|| {
        let known: Vec<&str> = WasteCategory::ALL.iter().map(|c| c.id()).collect();
        EcoConvertError::InvalidInput {
            name: category.to_string(),
            reason: format!("unknown category. Available: {}", known.join(", ")),
        }
    })?;
    let kb = ctx.knowledge_base()?;
    let entry = kb.entry(category);
    let efficiency = &entry.energy_efficiency;

    println!("{}\n", category.title());
    println!("{}\n", entry.description);

    if entry.keywords.is_empty() {
        println!("Keywords: none (used when waste matches no other category)\n");
    } else {
        println!("Keywords: {}\n", entry.keywords.join(", "));
    }

    println!("Energy profile:");
    println!("  Potential energy:      {}", efficiency.potential_energy);
    println!("  Conversion efficiency: {}", efficiency.conversion_efficiency);
    println!("  Best methods:          {}", efficiency.best_methods);
    println!("  Carbon footprint:      {}", efficiency.carbon_footprint);
    println!("  Resource recovery:     {}", efficiency.resource_recovery);
    println!();

    let m = &efficiency.metrics;
    println!("Metrics (0-100):");
    println!("  potential_energy       {:>3}", m.potential_energy);
    println!("  conversion_efficiency  {:>3}", m.conversion_efficiency);
    println!("  processing_complexity  {:>3}", m.processing_complexity);
    println!("  carbon_footprint       {:>3}", m.carbon_footprint);
    println!("  resource_recovery      {:>3}", m.resource_recovery);
    println!();

    println!("Conversion methods:\n");
    for (i, method) in entry.methods.iter().enumerate() {
        println!("  {}. {}", i + 1, method.method);
        println!("     {}", method.description);
        println!("     Efficiency: {}", method.efficiency);
        println!("     Waste types: {}", method.waste_types);
        println!("     Environmental benefits: {}", method.environmental_benefits);
        println!();
    }

    Ok(())
}

pub fn validate(file: &Path) -> Result<(), EcoConvertError> {
    let kb = ecoconvert_core::knowledge::load_knowledge_base(file)?;

    let methods: usize = kb.categories.iter().map(|(_, e)| e.methods.len()).sum();
    println!("Knowledge base '{}' (v{}) is valid.", kb.name, kb.version);
    println!("  Categories: {}", WasteCategory::ALL.len());
    println!("  Conversion methods: {methods}");

    let warnings = warnings(&kb);
    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in &warnings {
            println!("  - {}", w);
        }
    }

    Ok(())
}

/// Legal but surprising content: shared keywords and unreachable categories.
fn warnings(kb: &KnowledgeBase) -> Vec<String> {
    let mut owners: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (category, entry) in kb.categories.iter() {
        for keyword in &entry.keywords {
            owners.entry(keyword.as_str()).or_default().push(category.id());
        }
    }

    let mut warnings: Vec<String> = owners
        .into_iter()
        .filter(|(_, categories)| categories.len() > 1)
        .map(|(keyword, categories)| {
            format!(
                "keyword '{}' is shared by {}; labels containing it match all of them",
                keyword,
                categories.join(", ")
            )
        })
        .collect();

    for (category, entry) in kb.categories.iter() {
        if entry.keywords.is_empty() && category != WasteCategory::Unknown {
            warnings.push(format!(
                "category '{category}' has no keywords and can never be detected"
            ));
        }
    }
    warnings
}
