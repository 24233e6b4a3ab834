use std::collections::BTreeSet;

use super::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// Filter selection: what the user has picked in the side panel
// ---------------------------------------------------------------------------

/// The active filters. A record must satisfy every one of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    /// Inclusive event-year range.
    pub year_range: (i32, i32),
    pub sexes: BTreeSet<String>,
    pub origins: BTreeSet<String>,
    pub age_groups: BTreeSet<String>,
}

impl FilterSelection {
    /// Everything selected: the full year range and every label.
    pub fn all(dataset: &Dataset) -> Self {
        let opts = &dataset.options;
        FilterSelection {
            year_range: opts.year_bounds.unwrap_or((0, 0)),
            sexes: opts.sexes.iter().cloned().collect(),
            origins: opts.origins.iter().cloned().collect(),
            age_groups: opts.age_groups.iter().cloned().collect(),
        }
    }

    /// Whether a single record passes all predicates.
    ///
    /// An empty label set matches nothing.
    pub fn matches(&self, record: &Record) -> bool {
        let (lo, hi) = self.year_range;
        lo <= record.year
            && record.year <= hi
            && self.sexes.contains(&record.sex)
            && self.origins.contains(&record.origin)
            && self.age_groups.contains(&record.age_group)
    }
}

// ---------------------------------------------------------------------------
// FilteredSet
// ---------------------------------------------------------------------------

/// The records passing a selection, in dataset order.
#[derive(Debug, Clone)]
pub struct FilteredSet<'a> {
    records: Vec<&'a Record>,
}

impl<'a> FilteredSet<'a> {
    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        self.records.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Apply `selection` to every record of `dataset`.
pub fn filter<'a>(dataset: &'a Dataset, selection: &FilterSelection) -> FilteredSet<'a> {
    FilteredSet {
        records: dataset
            .records
            .iter()
            .filter(|r| selection.matches(r))
            .collect(),
    }
}
