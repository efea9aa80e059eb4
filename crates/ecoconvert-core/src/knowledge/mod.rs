pub mod builtin;
pub mod schema;

use crate::error::EcoConvertError;
use schema::KnowledgeBase;
use std::path::Path;

/// Highest value allowed for any efficiency metric.
pub const METRIC_SCALE_MAX: u8 = 100;

/// Load a knowledge base from a JSON file.
pub fn load_knowledge_base(path: &Path) -> Result<KnowledgeBase, EcoConvertError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| EcoConvertError::KnowledgeBaseLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    let kb: KnowledgeBase =
        serde_json::from_str(&content).map_err(|e| EcoConvertError::KnowledgeBaseLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_knowledge_base(&kb)?;
    tracing::info!(path = %path.display(), name = %kb.name, "loaded knowledge base");
    Ok(kb)
}

/// Parse a knowledge base from a JSON string (no file path context).
pub fn parse_knowledge_base_str(json: &str) -> Result<KnowledgeBase, EcoConvertError> {
    let kb: KnowledgeBase = serde_json::from_str(json)?;
    validate_knowledge_base(&kb)?;
    Ok(kb)
}

/// Validate that a knowledge base is well-formed.
pub fn validate_knowledge_base(kb: &KnowledgeBase) -> Result<(), EcoConvertError> {
    for keyword in &kb.waste_indicators {
        check_keyword(keyword, "waste_indicators")?;
    }

    for (category, entry) in kb.categories.iter() {
        for keyword in &entry.keywords {
            check_keyword(keyword, category.id())?;
        }

        if entry.description.trim().is_empty() {
            return Err(EcoConvertError::KnowledgeBaseInvalid(format!(
                "category '{category}' has an empty description"
            )));
        }

        if entry.methods.is_empty() {
            return Err(EcoConvertError::KnowledgeBaseInvalid(format!(
                "category '{category}' has no conversion methods"
            )));
        }

        if let Some(method) = entry.methods.iter().find(|m| m.method.trim().is_empty()) {
            return Err(EcoConvertError::KnowledgeBaseInvalid(format!(
                "category '{category}' has a method without a name ({})",
                method.description
            )));
        }

        if let Some(value) = entry
            .energy_efficiency
            .metrics
            .values()
            .into_iter()
            .find(|v| *v > METRIC_SCALE_MAX)
        {
            return Err(EcoConvertError::KnowledgeBaseInvalid(format!(
                "category '{category}' has metric {value} outside 0-{METRIC_SCALE_MAX}"
            )));
        }
    }

    Ok(())
}

fn check_keyword(keyword: &str, owner: &str) -> Result<(), EcoConvertError> {
    if keyword.trim().is_empty() {
        return Err(EcoConvertError::KnowledgeBaseInvalid(format!(
            "'{owner}' contains an empty keyword"
        )));
    }
    if keyword.chars().any(char::is_uppercase) {
        return Err(EcoConvertError::KnowledgeBaseInvalid(format!(
            "keyword '{keyword}' in '{owner}' must be lowercase"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn builtin_json() -> Value {
        serde_json::to_value(builtin::knowledge_base()).unwrap()
    }

    #[test]
    fn test_parse_builtin_round_trip() {
        let kb = parse_knowledge_base_str(&builtin_json().to_string()).unwrap();
        assert_eq!(kb.version, builtin::knowledge_base().version);
    }

    #[test]
    fn test_missing_category_rejected() {
        let mut json = builtin_json();
        json["categories"].as_object_mut().unwrap().remove("textile");
        assert!(parse_knowledge_base_str(&json.to_string()).is_err());
    }

    #[test]
    fn test_extra_category_rejected() {
        let mut json = builtin_json();
        let organic = json["categories"]["organic"].clone();
        json["categories"]["compost"] = organic;
        assert!(parse_knowledge_base_str(&json.to_string()).is_err());
    }

    #[test]
    fn test_uppercase_keyword_rejected() {
        let mut json = builtin_json();
        json["categories"]["metal"]["keywords"][0] = Value::from("Can");
        let err = parse_knowledge_base_str(&json.to_string()).unwrap_err();
        assert!(err.to_string().contains("lowercase"));
    }

    #[test]
    fn test_empty_methods_rejected() {
        let mut json = builtin_json();
        json["categories"]["glass"]["methods"] = Value::Array(vec![]);
        assert!(parse_knowledge_base_str(&json.to_string()).is_err());
    }

    #[test]
    fn test_metric_out_of_scale_rejected() {
        let mut json = builtin_json();
        json["categories"]["plastic"]["energy_efficiency"]["metrics"]["potential_energy"] =
            Value::from(150);
        assert!(parse_knowledge_base_str(&json.to_string()).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.json");
        std::fs::write(&path, builtin_json().to_string()).unwrap();
        let kb = load_knowledge_base(&path).unwrap();
        assert!(!kb.waste_indicators.is_empty());

        let missing = dir.path().join("missing.json");
        let err = load_knowledge_base(&missing).unwrap_err();
        assert!(matches!(err, EcoConvertError::KnowledgeBaseLoad { .. }));
    }
}
