use std::collections::BTreeMap;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub const YEAR: &str = "year";
pub const ITEM: &str = "item";
pub const VALUE: &str = "value";
pub const UNIT: &str = "unit";
pub const FLAG: &str = "flag";
pub const NOTE: &str = "note";

/// Normalize a raw header cell so fields can be addressed by a stable name.
///
/// Steps run in this order: trim, lower-case, spaces become underscores,
/// literal `#` characters are removed. `" Item Code "` becomes `item_code`,
/// `"#Year"` becomes `year`.
pub fn normalize_column_name(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .replace(' ', "_")
        .replace('#', "")
}

// ---------------------------------------------------------------------------
// IndicatorRecord – one row of the source table
// ---------------------------------------------------------------------------

/// A single observation of one indicator in one year (or year period).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorRecord {
    /// Indicator name, shared by every observation of that indicator.
    pub item: String,
    /// Four-digit calendar year, taken from the start of the period string.
    pub year: i32,
    /// Finite value, or `None` when the source cell was not numeric.
    pub value: Option<f64>,
    pub unit: String,
    /// Provenance marker, e.g. `E` (estimated) or `X` (official figure).
    pub flag: String,
    pub note: Option<String>,
    /// Any other columns, keyed by normalized name, text kept as-is.
    #[serde(skip)]
    pub extra: BTreeMap<String, String>,
}

#[cfg(test)]
impl IndicatorRecord {
    /// Bare record with empty unit/flag and no note.
    pub fn new(item: impl Into<String>, year: i32, value: Option<f64>) -> Self {
        Self {
            item: item.into(),
            year,
            value,
            unit: String::new(),
            flag: String::new(),
            note: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flag = flag.into();
        self
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The loaded table. Never mutated after construction; every query returns a
/// new sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<IndicatorRecord>,
    /// Normalized column names in source order.
    column_names: Vec<String>,
}

impl Dataset {
    pub fn new(records: Vec<IndicatorRecord>, column_names: Vec<String>) -> Self {
        Self {
            records,
            column_names,
        }
    }

    /// Build a dataset with the standard column set, for synthetic data.
    #[cfg(test)]
    pub fn from_records(records: Vec<IndicatorRecord>) -> Self {
        let column_names = [YEAR, ITEM, VALUE, UNIT, FLAG, NOTE]
            .iter()
            .map(|c| c.to_string())
            .collect();
        Self::new(records, column_names)
    }

    pub fn records(&self) -> &[IndicatorRecord] {
        &self.records
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
