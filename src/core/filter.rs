use crate::domain::model::RawRecord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Equality filters over raw fields, applied before the preview transform.
///
/// Entries with an empty expected value are inactive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordFilter {
    pub criteria: BTreeMap<String, String>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &str, value: &str) -> Self {
        self.criteria.insert(field.to_string(), value.to_string());
        self
    }

    /// Parse a `field=value` pair as given on the command line.
    pub fn parse_pair(pair: &str) -> Option<(String, String)> {
        let (field, value) = pair.split_once('=')?;
        let field = field.trim();
        if field.is_empty() {
            return None;
        }
        Some((field.to_string(), value.trim().to_string()))
    }

    pub fn active(&self) -> impl Iterator<Item = (&String, &String)> {
        self.criteria.iter().filter(|(_, value)| !value.is_empty())
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    pub fn matches(&self, record: &RawRecord) -> bool {
        self.active()
            .all(|(field, expected)| record.text(field) == *expected)
    }

    pub fn apply(&self, records: Vec<RawRecord>) -> Vec<RawRecord> {
        if self.active_count() == 0 {
            return records;
        }
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

/// Field names of the first record, in vendor order.
pub fn available_fields(records: &[RawRecord]) -> Vec<String> {
    records
        .first()
        .map(|r| r.fields().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Sorted distinct values per field, for building filter choices.
pub fn field_values(records: &[RawRecord]) -> BTreeMap<String, Vec<String>> {
    let mut values: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for field in available_fields(records) {
        let distinct = records.iter().map(|r| r.text(&field)).collect();
        values.insert(field, distinct);
    }
    values
        .into_iter()
        .map(|(field, set)| (field, set.into_iter().collect()))
        .collect()
}
