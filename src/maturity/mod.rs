pub mod calculator;
pub mod predicate;
pub mod schema;

pub use calculator::ComplianceCalculator;
pub use schema::MaturitySchema;
