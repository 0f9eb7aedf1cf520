use crate::maturity::MaturitySchema;
use crate::types::report::{fraction, MidsReport};

pub fn to_markdown(report: &MidsReport) -> String {
    let mut output = String::new();
    output.push_str("# MIDS Report\n\n");
    match &report.dataset_title {
        Some(title) => output.push_str(&format!("Dataset: {} ({})\n", title, report.dataset_key)),
        None => output.push_str(&format!("Dataset: {}\n", report.dataset_key)),
    }
    output.push_str(&format!("Records: {}\n", report.total));
    match report.achieved_level() {
        Some(level) => output.push_str(&format!("Achieved level: MIDS {level}\n")),
        None => output.push_str("Achieved level: none\n"),
    }
    output.push_str(&format!(
        "Schema: {} (generated {})\n\n",
        report.schema_version, report.generated_at
    ));

    output.push_str("## Cumulative Levels\n\n");
    for (level, (count, share)) in report
        .cumulative
        .iter()
        .zip(report.level_fractions())
        .enumerate()
    {
        output.push_str(&format!(
            "- MIDS {level}: {count} ({:.1}%)\n",
            share * 100.0
        ));
    }
    output.push('\n');

    output.push_str("## Elements\n");
    for (level, elements) in report.per_element.iter().enumerate() {
        output.push_str(&format!("\n### MIDS {level}\n\n"));
        if elements.is_empty() {
            output.push_str("- none\n");
            continue;
        }
        for (name, count) in elements.iter() {
            output.push_str(&format!(
                "- {name}: {count} ({:.1}%)\n",
                fraction(count, report.total) * 100.0
            ));
        }
    }

    output
}

pub fn schema_to_markdown(schema: &MaturitySchema) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    output.push_str(&format!("# MIDS Schema {}\n", schema.version));
    for level in &schema.levels {
        output.push_str(&format!("\n## MIDS {}\n\n", level.level));
        for element in &level.elements {
            output.push_str(&format!(
                "- {}: `{}`\n",
                element.name,
                serde_json::to_string(&element.predicate)?
            ));
        }
    }
    Ok(output)
}
