//! MIDS level aggregation over a [`RecordCountService`].
//!
//! Two strategies share one schema:
//!
//! - **cumulative**: level *n* requires every element of levels `0..=n`, so
//!   the counts never increase from one level to the next. Queries are issued
//!   one level at a time because each builds on the previous level's
//!   predicates.
//! - **per element**: every element is counted on its own. The queries are
//!   independent and run concurrently, up to `max_concurrent_requests` at once.
//!
//! A failed query aborts the whole calculation and its error is returned as is.

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info};

use super::predicate::{and, Predicate};
use super::schema::MaturitySchema;
use crate::error::Result;
use crate::service::RecordCountService;
use crate::types::report::{Count, ElementCounts, MidsReport};

pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 6;

pub struct ComplianceCalculator<'a, S: RecordCountService + ?Sized> {
    schema: &'a MaturitySchema,
    service: &'a S,
    max_concurrent_requests: usize,
}

impl<'a, S: RecordCountService + ?Sized> ComplianceCalculator<'a, S> {
    pub fn new(schema: &'a MaturitySchema, service: &'a S) -> Self {
        Self {
            schema,
            service,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
        }
    }

    /// Caps in-flight per-element queries. `1` issues them one by one.
    pub fn with_max_concurrent_requests(mut self, limit: usize) -> Self {
        self.max_concurrent_requests = limit.max(1);
        self
    }

    /// Number of records in the dataset, without any element filter.
    pub async fn dataset_total(&self, dataset_key: &str) -> Result<Count> {
        self.service.count(dataset_key, None).await
    }

    /// Records meeting every element up to and including each level.
    pub async fn cumulative_counts(&self, dataset_key: &str) -> Result<Vec<Count>> {
        let mut accumulated: Vec<Predicate> = Vec::new();
        let mut counts = Vec::with_capacity(self.schema.levels.len());

        for level in &self.schema.levels {
            accumulated.extend(level.predicates().cloned());
            let predicate = and(accumulated.iter().cloned());
            let count = self.service.count(dataset_key, Some(&predicate)).await?;
            debug!(
                dataset_key,
                level = level.level,
                predicates = accumulated.len(),
                count,
                "cumulative level count"
            );
            counts.push(count);
        }

        info!(dataset_key, ?counts, "cumulative counts complete");
        Ok(counts)
    }

    /// Records meeting each element on its own, grouped by level.
    pub async fn per_element_counts(&self, dataset_key: &str) -> Result<Vec<ElementCounts>> {
        let queries = self.schema.levels.iter().flat_map(|level| {
            level
                .elements
                .iter()
                .map(move |element| (level.level, element))
        });

        let results: Vec<(u8, &str, Count)> = stream::iter(queries)
            .map(|(level, element)| async move {
                let count = self
                    .service
                    .count(dataset_key, Some(&element.predicate))
                    .await?;
                debug!(dataset_key, level, element = element.name, count, "element count");
                Ok::<_, crate::error::MidsError>((level, element.name, count))
            })
            .buffered(self.max_concurrent_requests)
            .try_collect()
            .await?;

        let mut results = results.into_iter();
        let per_level = self
            .schema
            .levels
            .iter()
            .map(|level| {
                let entries = results
                    .by_ref()
                    .take(level.elements.len())
                    .map(|(_, name, count)| (name.to_string(), count))
                    .collect();
                ElementCounts::new(entries)
            })
            .collect();

        info!(
            dataset_key,
            elements = self.schema.element_count(),
            "per-element counts complete"
        );
        Ok(per_level)
    }

    /// Total, cumulative and per-element counts for one dataset.
    pub async fn report(&self, dataset_key: &str, title: Option<String>) -> Result<MidsReport> {
        let total = self.dataset_total(dataset_key).await?;
        let cumulative = self.cumulative_counts(dataset_key).await?;
        let per_element = self.per_element_counts(dataset_key).await?;

        Ok(MidsReport {
            dataset_key: dataset_key.to_string(),
            dataset_title: title,
            schema_version: self.schema.version.to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            total,
            cumulative,
            per_element,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MidsError;
    use crate::maturity::predicate::{exists, or};
    use crate::maturity::schema::{mids, Element, MaturityLevel};
    use crate::service::memory::InMemoryRecordService;
    use async_trait::async_trait;
    use serde_json::{json, Map, Value};
    use std::sync::Mutex;

    /// Answers every query through `respond` and records what was asked.
    struct ScriptedService<F> {
        respond: F,
        calls: Mutex<Vec<Option<Predicate>>>,
    }

    impl<F> ScriptedService<F>
    where
        F: Fn(usize, Option<&Predicate>) -> Result<Count> + Send + Sync,
    {
        fn new(respond: F) -> Self {
            Self {
                respond,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<Option<Predicate>> {
            self.calls.lock().expect("call log lock").clone()
        }
    }

    #[async_trait]
    impl<F> RecordCountService for ScriptedService<F>
    where
        F: Fn(usize, Option<&Predicate>) -> Result<Count> + Send + Sync,
    {
        async fn count(&self, _dataset_key: &str, predicate: Option<&Predicate>) -> Result<Count> {
            let index = {
                let mut calls = self.calls.lock().expect("call log lock");
                calls.push(predicate.cloned());
                calls.len() - 1
            };
            (self.respond)(index, predicate)
        }
    }

    fn and_children(predicate: Option<&Predicate>) -> usize {
        match predicate {
            Some(Predicate::And { children }) => children.len(),
            _ => 0,
        }
    }

    fn transport_failure() -> MidsError {
        MidsError::Api {
            status: 503,
            body: "unavailable".to_string(),
        }
    }

    #[tokio::test]
    async fn every_record_matching_gives_full_counts() {
        let service = ScriptedService::new(|_, _| Ok(100));
        let calculator = ComplianceCalculator::new(mids(), &service);
        let counts = calculator.cumulative_counts("X").await.expect("counts");
        assert_eq!(counts, vec![100, 100, 100, 100]);
    }

    #[tokio::test]
    async fn empty_dataset_gives_zero_counts() {
        let service = ScriptedService::new(|_, _| Ok(0));
        let calculator = ComplianceCalculator::new(mids(), &service);
        let counts = calculator.cumulative_counts("X").await.expect("counts");
        assert_eq!(counts, vec![0, 0, 0, 0]);
    }

    #[tokio::test]
    async fn cumulative_issues_one_query_per_level_with_growing_and() {
        let service = ScriptedService::new(|_, _| Ok(1));
        let calculator = ComplianceCalculator::new(mids(), &service);
        calculator.cumulative_counts("X").await.expect("counts");

        let sizes: Vec<usize> = service
            .calls()
            .iter()
            .map(|call| and_children(call.as_ref()))
            .collect();
        assert_eq!(sizes, vec![2, 7, 13, 18]);
    }

    #[tokio::test]
    async fn combined_level_zero_differs_from_single_elements() {
        // 50 for any single element, 10 once both level 0 elements are combined.
        let service = ScriptedService::new(|_, predicate| match predicate {
            None => Ok(50),
            Some(Predicate::And { children }) if children.len() == 2 => Ok(10),
            Some(_) => Ok(50),
        });
        let calculator = ComplianceCalculator::new(mids(), &service);

        let cumulative = calculator.cumulative_counts("X").await.expect("cumulative");
        assert_eq!(cumulative[0], 10);

        let per_element = calculator.per_element_counts("X").await.expect("per element");
        assert_eq!(per_element[0].get("PhysicalSpecimenID"), Some(50));
        assert_eq!(per_element[0].get("Organization"), Some(50));
    }

    #[tokio::test]
    async fn cumulative_failure_stops_before_later_levels() {
        let service = ScriptedService::new(|index, _| {
            if index == 2 {
                Err(transport_failure())
            } else {
                Ok(5)
            }
        });
        let calculator = ComplianceCalculator::new(mids(), &service);

        let err = calculator
            .cumulative_counts("X")
            .await
            .expect_err("level 2 failure should abort");
        assert!(matches!(err, MidsError::Api { status: 503, .. }));
        assert_eq!(service.calls().len(), 3);
    }

    #[tokio::test]
    async fn per_element_counts_cover_every_element_in_schema_order() {
        let service = ScriptedService::new(|_, _| Ok(7));
        let calculator =
            ComplianceCalculator::new(mids(), &service).with_max_concurrent_requests(4);

        let per_element = calculator.per_element_counts("X").await.expect("per element");
        let sizes: Vec<usize> = per_element.iter().map(|counts| counts.iter().count()).collect();
        assert_eq!(sizes, vec![2, 5, 6, 5]);
        assert_eq!(service.calls().len(), 18);

        for (counts, level) in per_element.iter().zip(&mids().levels) {
            let expected: Vec<&str> = level.elements.iter().map(|element| element.name).collect();
            let names: Vec<&str> = counts.iter().map(|(name, _)| name).collect();
            assert_eq!(names, expected);
        }
    }

    #[tokio::test]
    async fn per_element_queries_are_not_accumulated() {
        let service = ScriptedService::new(|_, _| Ok(1));
        let calculator =
            ComplianceCalculator::new(mids(), &service).with_max_concurrent_requests(1);
        calculator.per_element_counts("X").await.expect("per element");

        let expected: Vec<Option<Predicate>> = mids()
            .levels
            .iter()
            .flat_map(|level| level.predicates().cloned().map(Some))
            .collect();
        assert_eq!(service.calls(), expected);
    }

    #[tokio::test]
    async fn per_element_failure_returns_no_partial_result() {
        let service = ScriptedService::new(|index, _| {
            if index == 9 {
                Err(transport_failure())
            } else {
                Ok(3)
            }
        });
        let calculator =
            ComplianceCalculator::new(mids(), &service).with_max_concurrent_requests(1);
        let result = calculator.per_element_counts("X").await;
        assert!(matches!(result, Err(MidsError::Api { .. })));
    }

    #[tokio::test]
    async fn substituted_schema_drives_aggregation() {
        let schema = MaturitySchema::new(
            "test",
            vec![
                MaturityLevel {
                    level: 0,
                    elements: vec![Element {
                        name: "A",
                        predicate: exists("A"),
                    }],
                },
                MaturityLevel {
                    level: 1,
                    elements: vec![Element {
                        name: "BorC",
                        predicate: or([exists("B"), exists("C")]),
                    }],
                },
            ],
        );
        let records: Vec<Map<String, Value>> = [
            json!({"DATASET_KEY": "X", "A": 1, "B": 1}),
            json!({"DATASET_KEY": "X", "A": 1}),
            json!({"DATASET_KEY": "X", "C": 1}),
            json!({"DATASET_KEY": "Y", "A": 1, "C": 1}),
        ]
        .into_iter()
        .filter_map(|record| record.as_object().cloned())
        .collect();
        let service = InMemoryRecordService::new(records);
        let calculator = ComplianceCalculator::new(&schema, &service);

        assert_eq!(calculator.dataset_total("X").await.expect("total"), 3);
        assert_eq!(
            calculator.cumulative_counts("X").await.expect("cumulative"),
            vec![2, 1]
        );
        let per_element = calculator.per_element_counts("X").await.expect("per element");
        assert_eq!(per_element[0].get("A"), Some(2));
        assert_eq!(per_element[1].get("BorC"), Some(2));
    }

    #[tokio::test]
    async fn cumulative_counts_never_increase() {
        let records: Vec<Map<String, Value>> = [
            json!({"DATASET_KEY": "X", "CATALOG_NUMBER": "1", "INSTITUTION_CODE": "K",
                   "SCIENTIFIC_NAME": "Quercus", "BASIS_OF_RECORD": "PRESERVED_SPECIMEN",
                   "PREPARATIONS": "sheet", "LICENSE": "CC0", "MODIFIED": "2020"}),
            json!({"DATASET_KEY": "X", "CATALOG_NUMBER": "2", "INSTITUTION_CODE": "K"}),
            json!({"DATASET_KEY": "X", "OCCURRENCE_ID": "3"}),
        ]
        .into_iter()
        .filter_map(|record| record.as_object().cloned())
        .collect();
        let service = InMemoryRecordService::new(records);
        let calculator = ComplianceCalculator::new(mids(), &service);

        let counts = calculator.cumulative_counts("X").await.expect("cumulative");
        assert_eq!(counts, vec![2, 1, 0, 0]);
        assert!(counts.windows(2).all(|pair| pair[0] >= pair[1]));
    }

    #[tokio::test]
    async fn report_collects_total_and_both_strategies() {
        let service = ScriptedService::new(|_, predicate| match predicate {
            None => Ok(20),
            Some(_) => Ok(5),
        });
        let calculator = ComplianceCalculator::new(mids(), &service);

        let report = calculator
            .report("X", Some("Herbarium".to_string()))
            .await
            .expect("report");
        assert_eq!(report.total, 20);
        assert_eq!(report.cumulative.len(), 4);
        assert_eq!(report.per_element.len(), 4);
        assert_eq!(report.schema_version, mids().version);
        assert_eq!(service.calls().len(), 1 + 4 + 18);
    }
}
