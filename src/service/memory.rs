use std::path::Path;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{scoped_predicate, RecordCountService};
use crate::error::{MidsError, Result};
use crate::maturity::predicate::Predicate;

/// Counts records held in memory, e.g. a local occurrence export.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordService {
    records: Vec<Map<String, Value>>,
}

impl InMemoryRecordService {
    pub fn new(records: Vec<Map<String, Value>>) -> Self {
        Self { records }
    }

    /// Loads a JSON array of record objects.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let parsed: Value = serde_json::from_str(&content)
            .map_err(|e| MidsError::Records(format!("{}: {}", path.display(), e)))?;
        let Value::Array(items) = parsed else {
            return Err(MidsError::Records(format!(
                "{}: expected a JSON array of records",
                path.display()
            )));
        };

        let mut records = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            match item {
                Value::Object(record) => records.push(record),
                _ => {
                    return Err(MidsError::Records(format!(
                        "{}: record {index} is not an object",
                        path.display()
                    )))
                }
            }
        }
        Ok(Self::new(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl RecordCountService for InMemoryRecordService {
    async fn count(&self, dataset_key: &str, predicate: Option<&Predicate>) -> Result<u64> {
        let scoped = scoped_predicate(dataset_key, predicate);
        let matching = self
            .records
            .iter()
            .filter(|record| scoped.matches(record))
            .count();
        Ok(matching as u64)
    }
}
