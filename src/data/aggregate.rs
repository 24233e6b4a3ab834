use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use chrono::NaiveDate;

use super::filter::FilteredSet;
use super::model::Record;

// ---------------------------------------------------------------------------
// Generic group-and-sum
// ---------------------------------------------------------------------------

/// One group of an aggregate view: a key and the summed move count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group<K> {
    pub key: K,
    pub count: u64,
}

/// Group `filtered` by `key` and sum `count` per group.
///
/// Groups come back in first-encountered order. Keys are compared by plain
/// equality, so empty labels and `None` dates form groups of their own.
/// Sums saturate at `u64::MAX`.
pub fn group_sum<K, F>(filtered: &FilteredSet<'_>, key: F) -> Vec<Group<K>>
where
    K: Eq + Hash + Clone,
    F: Fn(&Record) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<Group<K>> = Vec::new();

    for record in filtered.iter() {
        let k = key(record);
        match index.get(&k) {
            Some(&i) => groups[i].count = groups[i].count.saturating_add(record.count),
            None => {
                index.insert(k.clone(), groups.len());
                groups.push(Group {
                    key: k,
                    count: record.count,
                });
            }
        }
    }
    groups
}

/// Sort descending by count and keep the first `n`. The sort is stable, so
/// equal counts keep first-encountered order.
fn top_n<K>(mut groups: Vec<Group<K>>, n: usize) -> Vec<Group<K>> {
    groups.sort_by(|a, b| b.count.cmp(&a.count));
    groups.truncate(n);
    groups
}

fn sorted_by_key<K: Ord>(mut groups: Vec<Group<K>>) -> Vec<Group<K>> {
    groups.sort_by(|a, b| a.key.cmp(&b.key));
    groups
}

// ---------------------------------------------------------------------------
// Named views
// ---------------------------------------------------------------------------

/// Sum of `count` over the whole set, saturating at `u64::MAX`.
pub fn total(filtered: &FilteredSet<'_>) -> u64 {
    filtered
        .iter()
        .fold(0u64, |acc, r| acc.saturating_add(r.count))
}

/// The year with the most moves and its sum. Ties keep the earliest-seen
/// year; `None` when no year has any moves.
pub fn peak_year(filtered: &FilteredSet<'_>) -> Option<(i32, u64)> {
    group_sum(filtered, |r| r.year)
        .into_iter()
        .fold(None, |best: Option<Group<i32>>, g| match best {
            Some(b) if b.count >= g.count => Some(b),
            _ if g.count == 0 => None,
            _ => Some(g),
        })
        .map(|g| (g.key, g.count))
}

/// Whether an origin label denotes a move from abroad ("Ausland").
pub fn is_foreign(origin: &str) -> bool {
    origin.to_lowercase().contains("ausl")
}

/// Moves whose origin is abroad.
pub fn foreign_total(filtered: &FilteredSet<'_>) -> u64 {
    filtered
        .iter()
        .filter(|r| is_foreign(&r.origin))
        .fold(0u64, |acc, r| acc.saturating_add(r.count))
}

/// Number of distinct quarters with at least one record.
pub fn active_quarters(filtered: &FilteredSet<'_>) -> usize {
    filtered
        .iter()
        .map(|r| r.quarter.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Moves per stated date, ascending. Records without a date share one
/// leading point.
pub fn monthly_series(filtered: &FilteredSet<'_>) -> Vec<Group<Option<NaiveDate>>> {
    sorted_by_key(group_sum(filtered, |r| r.date))
}

pub fn top_quarters(filtered: &FilteredSet<'_>, n: usize) -> Vec<Group<String>> {
    top_n(group_sum(filtered, |r| r.quarter.clone()), n)
}

pub fn top_districts(filtered: &FilteredSet<'_>, n: usize) -> Vec<Group<String>> {
    top_n(group_sum(filtered, |r| r.district.clone()), n)
}

/// Moves per (year, origin).
pub fn by_origin_by_year(filtered: &FilteredSet<'_>) -> Vec<Group<(i32, String)>> {
    sorted_by_key(group_sum(filtered, |r| (r.year, r.origin.clone())))
}

/// Moves per (year, age group, sex).
pub fn by_age_sex_year(filtered: &FilteredSet<'_>) -> Vec<Group<(i32, String, String)>> {
    sorted_by_key(group_sum(filtered, |r| {
        (r.year, r.age_group.clone(), r.sex.clone())
    }))
}

// ---------------------------------------------------------------------------
// Dashboard: every view for one selection
// ---------------------------------------------------------------------------

/// How many rows the ranking tables keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewLimits {
    pub top_quarters: usize,
    pub top_districts: usize,
}

impl Default for ViewLimits {
    fn default() -> Self {
        Self {
            top_quarters: 10,
            top_districts: 20,
        }
    }
}

/// All aggregate views shown for a non-empty selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardViews {
    pub rows: usize,
    pub total: u64,
    pub monthly: Vec<Group<Option<NaiveDate>>>,
    pub top_quarters: Vec<Group<String>>,
    pub origin_by_year: Vec<Group<(i32, String)>>,
    pub age_sex_year: Vec<Group<(i32, String, String)>>,
    pub top_districts: Vec<Group<String>>,
    pub peak_year: Option<(i32, u64)>,
    /// Moves from abroad, see [`is_foreign`].
    pub foreign: u64,
    pub active_quarters: usize,
}

/// Result of recomputing the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardOutcome {
    /// The selection matched nothing; no view was computed.
    Empty,
    Ready(DashboardViews),
}

impl DashboardViews {
    /// Compute every view. The monthly series is built first and an empty
    /// series stops the computation.
    pub fn compute(filtered: &FilteredSet<'_>, limits: &ViewLimits) -> DashboardOutcome {
        let monthly = monthly_series(filtered);
        if monthly.is_empty() {
            return DashboardOutcome::Empty;
        }

        DashboardOutcome::Ready(DashboardViews {
            rows: filtered.len(),
            total: total(filtered),
            monthly,
            top_quarters: top_quarters(filtered, limits.top_quarters),
            origin_by_year: by_origin_by_year(filtered),
            age_sex_year: by_age_sex_year(filtered),
            top_districts: top_districts(filtered, limits.top_districts),
            peak_year: peak_year(filtered),
            foreign: foreign_total(filtered),
            active_quarters: active_quarters(filtered),
        })
    }

    /// Share of moves from abroad, in percent; 0 when there are no moves.
    pub fn foreign_share(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.foreign as f64 / self.total as f64 * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filter, FilterSelection};
    use crate::data::model::tests::record;
    use crate::data::model::Dataset;

    fn with_district(district: &str, count: u64) -> Record {
        let mut r = record(2020, "weiblich", "Schweiz", "20", count);
        r.district = district.to_string();
        r
    }

    fn everything(ds: &Dataset) -> FilteredSet<'_> {
        filter(ds, &FilterSelection::all(ds))
    }

    #[test]
    fn total_sums_counts() {
        let ds = Dataset::from_records(vec![
            record(2020, "weiblich", "Schweiz", "20", 3),
            record(2020, "weiblich", "Schweiz", "20", 5),
            record(2020, "weiblich", "Schweiz", "20", 0),
        ]);
        assert_eq!(total(&everything(&ds)), 8);
    }

    #[test]
    fn huge_counts_saturate_instead_of_overflowing() {
        let ds = Dataset::from_records(vec![
            record(2020, "weiblich", "Schweiz", "20", u64::MAX),
            record(2020, "weiblich", "Schweiz", "20", u64::MAX),
        ]);
        let set = everything(&ds);

        assert_eq!(total(&set), u64::MAX);
        let DashboardOutcome::Ready(views) = DashboardViews::compute(&set, &ViewLimits::default())
        else {
            panic!("expected views");
        };
        assert_eq!(views.monthly[0].count, u64::MAX);
        assert_eq!(views.top_districts[0].count, u64::MAX);
    }

    #[test]
    fn peak_year_prefers_first_seen_on_ties() {
        let ds = Dataset::from_records(vec![
            record(2017, "weiblich", "Schweiz", "20", 4),
            record(2015, "weiblich", "Schweiz", "20", 6),
            record(2016, "weiblich", "Schweiz", "20", 9),
            record(2017, "weiblich", "Schweiz", "20", 5),
        ]);
        assert_eq!(peak_year(&everything(&ds)), Some((2017, 9)));

        let zeros = Dataset::from_records(vec![record(2015, "weiblich", "Schweiz", "20", 0)]);
        assert_eq!(peak_year(&everything(&zeros)), None);
    }

    #[test]
    fn foreign_share_and_active_quarters() {
        let mut a = record(2020, "weiblich", "Ausland", "20", 3);
        a.quarter = "Enge".to_string();
        let mut b = record(2020, "weiblich", "Schweiz", "20", 1);
        b.quarter = "Seefeld".to_string();
        let mut c = record(2020, "männlich", "ausland (EU)", "40", 0);
        c.quarter = "Enge".to_string();
        let ds = Dataset::from_records(vec![a, b, c]);
        let set = everything(&ds);

        assert_eq!(foreign_total(&set), 3);
        assert_eq!(active_quarters(&set), 2);

        let DashboardOutcome::Ready(views) = DashboardViews::compute(&set, &ViewLimits::default())
        else {
            panic!("expected views");
        };
        assert_eq!(views.foreign, 3);
        assert_eq!(views.active_quarters, 2);
        assert!((views.foreign_share() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn foreign_share_is_zero_without_moves() {
        let ds = Dataset::from_records(vec![record(2020, "weiblich", "Ausland", "20", 0)]);
        let DashboardOutcome::Ready(views) =
            DashboardViews::compute(&everything(&ds), &ViewLimits::default())
        else {
            panic!("expected views");
        };
        assert_eq!(views.foreign_share(), 0.0);
        assert_eq!(views.peak_year, None);
    }

    #[test]
    fn group_sum_keeps_first_seen_order() {
        let ds = Dataset::from_records(vec![
            with_district("Kreis 3", 1),
            with_district("Kreis 1", 2),
            with_district("Kreis 3", 4),
        ]);
        let groups = group_sum(&everything(&ds), |r| r.district.clone());
        assert_eq!(
            groups,
            vec![
                Group { key: "Kreis 3".to_string(), count: 5 },
                Group { key: "Kreis 1".to_string(), count: 2 },
            ]
        );
    }

    #[test]
    fn top_districts_returns_all_when_fewer_than_limit() {
        let records: Vec<Record> = (1..=15)
            .map(|i| with_district(&format!("Kreis {i}"), i * 10))
            .collect();
        let ds = Dataset::from_records(records);

        let top = top_districts(&everything(&ds), 20);
        assert_eq!(top.len(), 15);
        assert_eq!(top[0].key, "Kreis 15");
        assert_eq!(top[14].key, "Kreis 1");
        assert!(top.windows(2).all(|w| w[0].count >= w[1].count));
    }

    #[test]
    fn top_n_truncates_and_breaks_ties_by_first_seen() {
        let ds = Dataset::from_records(vec![
            with_district("Kreis 7", 5),
            with_district("Kreis 2", 9),
            with_district("Kreis 4", 5),
            with_district("Kreis 9", 1),
        ]);
        let top = top_districts(&everything(&ds), 3);
        let keys: Vec<&str> = top.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["Kreis 2", "Kreis 7", "Kreis 4"]);
    }

    #[test]
    fn top_quarters_defaults_to_ten() {
        let records: Vec<Record> = (0..12)
            .map(|i| {
                let mut r = record(2020, "weiblich", "Schweiz", "20", i + 1);
                r.quarter = format!("Quartier {i}");
                r
            })
            .collect();
        let ds = Dataset::from_records(records);
        let limits = ViewLimits::default();
        let top = top_quarters(&everything(&ds), limits.top_quarters);
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].key, "Quartier 11");
    }

    #[test]
    fn monthly_series_is_sorted_by_date() {
        let mut a = record(2020, "weiblich", "Schweiz", "20", 1);
        a.date = NaiveDate::from_ymd_opt(2020, 3, 31);
        let mut b = record(2020, "weiblich", "Schweiz", "20", 2);
        b.date = NaiveDate::from_ymd_opt(2020, 1, 31);
        let mut c = record(2020, "weiblich", "Schweiz", "20", 4);
        c.date = NaiveDate::from_ymd_opt(2020, 3, 31);
        let mut d = record(2020, "weiblich", "Schweiz", "20", 8);
        d.date = None;
        let ds = Dataset::from_records(vec![a, b, c, d]);

        let series = monthly_series(&everything(&ds));
        assert_eq!(series.len(), 3);
        assert!(series.windows(2).all(|w| w[0].key <= w[1].key));
        assert_eq!(series[0], Group { key: None, count: 8 });
        assert_eq!(series[2].count, 5);
    }

    #[test]
    fn multi_key_views_group_and_sort() {
        let ds = Dataset::from_records(vec![
            record(2016, "Male", "Schweiz", "20", 1),
            record(2015, "Female", "Ausland", "40", 2),
            record(2016, "Male", "Schweiz", "20", 3),
            record(2015, "Male", "Ausland", "40", 4),
        ]);
        let set = everything(&ds);

        let by_origin = by_origin_by_year(&set);
        assert_eq!(
            by_origin,
            vec![
                Group { key: (2015, "Ausland".to_string()), count: 6 },
                Group { key: (2016, "Schweiz".to_string()), count: 4 },
            ]
        );

        let by_age = by_age_sex_year(&set);
        assert_eq!(by_age.len(), 3);
        assert_eq!(
            by_age[0].key,
            (2015, "40".to_string(), "Female".to_string())
        );
        assert_eq!(by_age[2], Group {
            key: (2016, "20".to_string(), "Male".to_string()),
            count: 4,
        });
    }

    #[test]
    fn empty_selection_short_circuits() {
        let ds = Dataset::from_records(vec![record(2020, "weiblich", "Schweiz", "20", 3)]);
        let mut sel = FilterSelection::all(&ds);
        sel.sexes.clear();
        let set = filter(&ds, &sel);

        assert!(monthly_series(&set).is_empty());
        assert_eq!(
            DashboardViews::compute(&set, &ViewLimits::default()),
            DashboardOutcome::Empty
        );
    }

    #[test]
    fn dashboard_contains_every_view() {
        let ds = Dataset::from_records(vec![
            record(2019, "weiblich", "Schweiz", "20", 3),
            record(2020, "männlich", "Ausland", "40", 5),
        ]);
        let set = everything(&ds);
        let DashboardOutcome::Ready(views) = DashboardViews::compute(&set, &ViewLimits::default())
        else {
            panic!("expected views");
        };
        assert_eq!(views.rows, 2);
        assert_eq!(views.total, 8);
        assert_eq!(views.monthly.len(), 2);
        assert_eq!(views.top_quarters.len(), 1);
        assert_eq!(views.origin_by_year.len(), 2);
        assert_eq!(views.age_sex_year.len(), 2);
        assert_eq!(views.top_districts[0].count, 8);
    }
}
