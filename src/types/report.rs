use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

pub type Count = u64;

/// Per-element counts of one level, in schema order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementCounts(Vec<(String, Count)>);

impl ElementCounts {
    pub fn new(entries: Vec<(String, Count)>) -> Self {
        Self(entries)
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<Count> {
        self.0
            .iter()
            .find(|(element, _)| element == name)
            .map(|(_, count)| *count)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Count)> {
        self.0.iter().map(|(name, count)| (name.as_str(), *count))
    }
}

impl Serialize for ElementCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, count) in &self.0 {
            map.serialize_entry(name, count)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MidsReport {
    pub dataset_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_title: Option<String>,
    pub schema_version: String,
    pub generated_at: String,
    pub total: Count,
    pub cumulative: Vec<Count>,
    pub per_element: Vec<ElementCounts>,
}

impl MidsReport {
    /// Share of the dataset reaching each level, 0.0 for an empty dataset.
    pub fn level_fractions(&self) -> Vec<f64> {
        self.cumulative
            .iter()
            .map(|count| fraction(*count, self.total))
            .collect()
    }

    /// Highest level every record of the dataset satisfies.
    pub fn achieved_level(&self) -> Option<usize> {
        if self.total == 0 {
            return None;
        }
        self.cumulative
            .iter()
            .take_while(|count| **count == self.total)
            .count()
            .checked_sub(1)
    }
}

pub fn fraction(count: Count, total: Count) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}
