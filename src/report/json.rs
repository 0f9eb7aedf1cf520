use crate::maturity::MaturitySchema;
use crate::types::report::MidsReport;
use serde_json::{json, Map, Value};

pub fn to_json(report: &MidsReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

pub fn schema_to_json(schema: &MaturitySchema) -> Result<String, serde_json::Error> {
    let mut levels = Vec::with_capacity(schema.levels.len());
    for level in &schema.levels {
        let mut elements = Map::new();
        for element in &level.elements {
            elements.insert(element.name.to_string(), serde_json::to_value(&element.predicate)?);
        }
        levels.push(json!({
            "level": level.level,
            "elements": Value::Object(elements),
        }));
    }

    serde_json::to_string_pretty(&json!({
        "version": schema.version,
        "levels": levels,
    }))
}
