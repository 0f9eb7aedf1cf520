pub mod json;
pub mod md;

use crate::error::MidsError;
use crate::maturity::MaturitySchema;
use crate::types::report::MidsReport;

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Json,
    Md,
}

pub fn render(report: &MidsReport, format: OutputFormat) -> Result<String, MidsError> {
    match format {
        OutputFormat::Json => json::to_json(report).map_err(MidsError::Json),
        OutputFormat::Md => Ok(md::to_markdown(report)),
    }
}

pub fn render_schema(schema: &MaturitySchema, format: OutputFormat) -> Result<String, MidsError> {
    match format {
        OutputFormat::Json => json::schema_to_json(schema).map_err(MidsError::Json),
        OutputFormat::Md => md::schema_to_markdown(schema).map_err(MidsError::Json),
    }
}
