use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Record – one row of the source table
// ---------------------------------------------------------------------------

/// A single reported move event (one row of the source CSV) after
/// normalisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Stated ("as of") date; `None` when the source value is not a date.
    pub date: Option<NaiveDate>,
    /// Event year.
    pub year: i32,
    /// Event month.
    pub month: u32,
    /// Number of moves this row stands for.
    pub count: u64,
    pub sex: String,
    /// Age-group code, stringified so numeric and text codings compare equal.
    pub age_group: String,
    pub origin: String,
    pub quarter: String,
    /// Administrative district ("Kreis").
    pub district: String,
}

/// Label shown for an empty categorical cell.
pub const MISSING_LABEL: &str = "(missing)";

/// Human readable form of a categorical label.
pub fn display_label(label: &str) -> &str {
    if label.is_empty() {
        MISSING_LABEL
    } else {
        label
    }
}

// ---------------------------------------------------------------------------
// FilterOptions – the values a user can pick from
// ---------------------------------------------------------------------------

/// Choices offered by the filter panel, derived once from the full dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// Smallest and largest event year, `None` for an empty dataset.
    pub year_bounds: Option<(i32, i32)>,
    /// Sex labels in first-seen order.
    pub sexes: Vec<String>,
    /// Origin labels in first-seen order.
    pub origins: Vec<String>,
    /// Age-group labels, sorted.
    pub age_groups: Vec<String>,
}

impl FilterOptions {
    fn from_records(records: &[Record]) -> Self {
        let year_bounds = records.iter().fold(None, |acc, r| match acc {
            None => Some((r.year, r.year)),
            Some((lo, hi)) => Some((r.year.min(lo), r.year.max(hi))),
        });

        let age_groups: BTreeSet<&str> = records.iter().map(|r| r.age_group.as_str()).collect();

        FilterOptions {
            year_bounds,
            sexes: first_seen(records.iter().map(|r| r.sex.as_str())),
            origins: first_seen(records.iter().map(|r| r.origin.as_str())),
            age_groups: age_groups.into_iter().map(str::to_string).collect(),
        }
    }
}

fn first_seen<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    /// All records in file order.
    pub records: Vec<Record>,
    pub options: FilterOptions,
}

impl Dataset {
    /// Build the dataset and its filter options from loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let options = FilterOptions::from_records(&records);
        Dataset { records, options }
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
