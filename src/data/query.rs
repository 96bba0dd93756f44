use std::collections::{BTreeSet, HashSet};

use super::model::{Dataset, IndicatorRecord};

// ---------------------------------------------------------------------------
// Selection helpers
// ---------------------------------------------------------------------------

/// Distinct indicator names in order of first appearance.
pub fn list_indicators(dataset: &Dataset) -> Vec<String> {
    let mut seen = HashSet::new();
    dataset
        .records()
        .iter()
        .filter(|r| seen.insert(r.item.as_str()))
        .map(|r| r.item.clone())
        .collect()
}

/// Global `(min, max)` year over the whole dataset, used to bound the year
/// range control. `None` only when the dataset is empty.
pub fn year_bounds(dataset: &Dataset) -> Option<(i32, i32)> {
    let mut years = dataset.records().iter().map(|r| r.year);
    let first = years.next()?;
    Some(years.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y))))
}

// ---------------------------------------------------------------------------
// Window filter
// ---------------------------------------------------------------------------

/// Records of exactly `item` with `low <= year <= high`, sorted by year.
///
/// The sort is stable, so duplicate years keep their source order. An
/// inverted window (`low > high`) yields an empty sequence.
pub fn filter_by_indicator_and_range(
    dataset: &Dataset,
    item: &str,
    low: i32,
    high: i32,
) -> Vec<IndicatorRecord> {
    let mut window: Vec<IndicatorRecord> = dataset
        .records()
        .iter()
        .filter(|r| r.item == item && (low..=high).contains(&r.year))
        .cloned()
        .collect();
    window.sort_by_key(|r| r.year);
    window
}

// ---------------------------------------------------------------------------
// Related indicators
// ---------------------------------------------------------------------------

/// Substring used to find dietary energy supply series.
pub const DIETARY_ENERGY_SUPPLY: &str = "dietary energy supply";
/// Substring used to find GDP series.
pub const GROSS_DOMESTIC_PRODUCT: &str = "gross domestic product";
/// Substring shared by the child nutrition indicators.
pub const CHILDREN: &str = "children";

/// Case-insensitive substring predicate over the indicator name.
pub fn item_contains(needle: &str) -> impl Fn(&IndicatorRecord) -> bool {
    let needle = needle.to_lowercase();
    move |r: &IndicatorRecord| r.item.to_lowercase().contains(&needle)
}

/// All records (every year) matching `predicate`, in source order.
pub fn related_indicators<P>(dataset: &Dataset, predicate: P) -> Vec<IndicatorRecord>
where
    P: Fn(&IndicatorRecord) -> bool,
{
    dataset
        .records()
        .iter()
        .filter(|r| predicate(*r))
        .cloned()
        .collect()
}

/// Distinct names of the indicators matching `needle`, first-appearance order.
pub fn related_indicator_names(dataset: &Dataset, needle: &str) -> Vec<String> {
    let matches = item_contains(needle);
    let mut seen = HashSet::new();
    dataset
        .records()
        .iter()
        .filter(|r| matches(*r))
        .filter(|r| seen.insert(r.item.as_str()))
        .map(|r| r.item.clone())
        .collect()
}

/// Records of any of `items` inside `[low, high]`, sorted by year.
pub fn filter_by_indicators_and_range(
    dataset: &Dataset,
    items: &BTreeSet<String>,
    low: i32,
    high: i32,
) -> Vec<IndicatorRecord> {
    let mut window: Vec<IndicatorRecord> = dataset
        .records()
        .iter()
        .filter(|r| items.contains(&r.item) && (low..=high).contains(&r.year))
        .cloned()
        .collect();
    window.sort_by_key(|r| r.year);
    window
}

// ---------------------------------------------------------------------------
// Alignment
// ---------------------------------------------------------------------------

/// Restrict `secondary` to the years present in `primary`.
///
/// No interpolation or fill: secondary records in other years are dropped and
/// primary years missing from `secondary` simply have no partner. Secondary
/// order is preserved.
pub fn align_by_year(
    primary: &[IndicatorRecord],
    secondary: &[IndicatorRecord],
) -> Vec<IndicatorRecord> {
    let years: HashSet<i32> = primary.iter().map(|r| r.year).collect();
    secondary
        .iter()
        .filter(|r| years.contains(&r.year))
        .cloned()
        .collect()
}
