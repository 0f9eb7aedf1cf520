//! Record counting collaborators.
//!
//! - [`RecordCountService`]: counts records of one dataset matching a predicate
//! - [`gbif::GbifClient`]: GBIF occurrence search API
//! - [`memory::InMemoryRecordService`]: evaluates predicates over loaded records

pub mod gbif;
pub mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::maturity::predicate::{and, equals, Predicate};

/// Field holding the dataset key on every occurrence record.
pub const DATASET_KEY_FIELD: &str = "DATASET_KEY";

#[async_trait]
pub trait RecordCountService: Send + Sync {
    /// Number of records in `dataset_key` matching `predicate`.
    ///
    /// `None` counts every record of the dataset. The key is passed through
    /// untouched; an unknown key is the service's business.
    async fn count(&self, dataset_key: &str, predicate: Option<&Predicate>) -> Result<u64>;
}

/// `AND(DATASET_KEY == dataset_key, predicate)`, or just the dataset filter
/// wrapped in an `AND` when there is no predicate.
pub fn scoped_predicate(dataset_key: &str, predicate: Option<&Predicate>) -> Predicate {
    let dataset = equals(DATASET_KEY_FIELD, dataset_key);
    match predicate {
        Some(predicate) => and([dataset, predicate.clone()]),
        None => and([dataset]),
    }
}
