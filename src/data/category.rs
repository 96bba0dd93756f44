use std::collections::BTreeSet;
use std::fmt;

use super::model::{Dataset, IndicatorRecord};
use super::query::{
    align_by_year, filter_by_indicators_and_range, item_contains, related_indicator_names,
    related_indicators, CHILDREN, DIETARY_ENERGY_SUPPLY, GROSS_DOMESTIC_PRODUCT,
};

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Which comparison view an indicator gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorCategory {
    Undernourishment,
    DietaryEnergy,
    ChildNutrition,
    Other,
}

/// Substring tests in priority order; the first hit wins.
const RULES: [(&str, IndicatorCategory); 3] = [
    ("undernourishment", IndicatorCategory::Undernourishment),
    ("dietary energy", IndicatorCategory::DietaryEnergy),
    ("children", IndicatorCategory::ChildNutrition),
];

/// Classify an indicator by case-insensitive substring match on its name.
pub fn classify(item: &str) -> IndicatorCategory {
    let lower = item.to_lowercase();
    RULES
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map_or(IndicatorCategory::Other, |(_, category)| *category)
}

impl IndicatorCategory {
    /// Short explanation shown next to the comparison chart.
    pub fn blurb(self) -> Option<&'static str> {
        match self {
            IndicatorCategory::Undernourishment => Some(
                "This indicator measures food deprivation. Lower values indicate improvement in food security.",
            ),
            IndicatorCategory::DietaryEnergy => Some(
                "This indicator measures the amount of food available per person. Higher values generally indicate better food security.",
            ),
            IndicatorCategory::ChildNutrition => Some(
                "This indicator measures child nutrition status, which is a critical aspect of food security.",
            ),
            IndicatorCategory::Other => None,
        }
    }
}

impl fmt::Display for IndicatorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IndicatorCategory::Undernourishment => "undernourishment",
            IndicatorCategory::DietaryEnergy => "dietary energy",
            IndicatorCategory::ChildNutrition => "child nutrition",
            IndicatorCategory::Other => "other",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Comparison series
// ---------------------------------------------------------------------------

/// One named line of a comparison chart, sorted by year.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub unit: String,
    pub records: Vec<IndicatorRecord>,
}

impl Series {
    /// Axis label: the name, with the unit in parentheses when known.
    pub fn label(&self) -> String {
        if self.unit.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.unit)
        }
    }
}

/// Everything a comparison chart needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    /// Current window on one axis, an auxiliary indicator on the other.
    DualAxis {
        title: &'static str,
        primary: Series,
        secondary: Vec<Series>,
        secondary_axis: &'static str,
    },
    /// Several child nutrition indicators side by side.
    MultiSeries {
        title: &'static str,
        series: Vec<Series>,
    },
}

/// Inputs for [`build_comparison`].
pub struct ComparisonRequest<'a> {
    pub selected: &'a str,
    pub window: &'a [IndicatorRecord],
    /// Child indicators picked for side-by-side display.
    pub child_selection: &'a BTreeSet<String>,
    pub low: i32,
    pub high: i32,
}

/// Group records into one series per indicator, first-appearance order.
fn group_series(records: Vec<IndicatorRecord>) -> Vec<Series> {
    let mut series: Vec<Series> = Vec::new();
    for record in records {
        match series.iter_mut().find(|s| s.name == record.item) {
            Some(s) => s.records.push(record),
            None => series.push(Series {
                name: record.item.clone(),
                unit: record.unit.clone(),
                records: vec![record],
            }),
        }
    }
    for s in &mut series {
        s.records.sort_by_key(|r| r.year);
    }
    series
}

fn dual_axis(
    dataset: &Dataset,
    req: &ComparisonRequest<'_>,
    needle: &str,
    title: &'static str,
    secondary_axis: &'static str,
) -> Option<Comparison> {
    let auxiliary = related_indicators(dataset, item_contains(needle));
    if auxiliary.is_empty() {
        log::warn!("no '{needle}' records to compare with '{}'", req.selected);
        return None;
    }
    let aligned = align_by_year(req.window, &auxiliary);
    Some(Comparison::DualAxis {
        title,
        primary: Series {
            name: req.selected.to_string(),
            unit: req.window.first().map(|r| r.unit.clone()).unwrap_or_default(),
            records: req.window.to_vec(),
        },
        secondary: group_series(aligned),
        secondary_axis,
    })
}

/// Build the comparison chart for the selected indicator's category, or
/// `None` when the category has none or the auxiliary data is missing.
pub fn build_comparison(
    dataset: &Dataset,
    category: IndicatorCategory,
    req: &ComparisonRequest<'_>,
) -> Option<Comparison> {
    match category {
        IndicatorCategory::Undernourishment => dual_axis(
            dataset,
            req,
            DIETARY_ENERGY_SUPPLY,
            "Undernourishment vs. Dietary Energy Supply",
            "Dietary Energy Supply (kcal/cap/d)",
        ),
        IndicatorCategory::DietaryEnergy => dual_axis(
            dataset,
            req,
            GROSS_DOMESTIC_PRODUCT,
            "Dietary Energy Supply vs. Economic Development",
            "GDP per capita (Int$)",
        ),
        IndicatorCategory::ChildNutrition => {
            if related_indicator_names(dataset, CHILDREN).len() < 2 {
                return None;
            }
            let records =
                filter_by_indicators_and_range(dataset, req.child_selection, req.low, req.high);
            if records.is_empty() {
                return None;
            }
            Some(Comparison::MultiSeries {
                title: "Child Nutrition Indicators Comparison",
                series: group_series(records),
            })
        }
        IndicatorCategory::Other => None,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::data::query::filter_by_indicator_and_range;

    #[test]
    fn classifies_by_name() {
        assert_eq!(
            classify("Prevalence of undernourishment (%)"),
            IndicatorCategory::Undernourishment
        );
        assert_eq!(
            classify("Children under 5 stunted (%)"),
            IndicatorCategory::ChildNutrition
        );
        assert_eq!(classify("GDP per capita"), IndicatorCategory::Other);
        assert_eq!(
            classify("Average DIETARY ENERGY supply adequacy"),
            IndicatorCategory::DietaryEnergy
        );
    }

    #[test]
    fn earlier_rule_wins() {
        assert_eq!(
            classify("Undernourishment among children"),
            IndicatorCategory::Undernourishment
        );
        assert_eq!(
            classify("Dietary energy of children"),
            IndicatorCategory::DietaryEnergy
        );
    }

    #[test]
    fn series_label_includes_unit() {
        let series = Series {
            name: "Prevalence of undernourishment".into(),
            unit: "%".into(),
            records: Vec::new(),
        };
        assert_eq!(series.label(), "Prevalence of undernourishment (%)");
    }

    #[test]
    fn only_other_has_no_blurb() {
        assert!(IndicatorCategory::Other.blurb().is_none());
        assert!(IndicatorCategory::ChildNutrition.blurb().is_some());
    }

    fn rec(item: &str, year: i32, value: f64) -> IndicatorRecord {
        IndicatorRecord::new(item, year, Some(value))
    }

    fn dataset() -> Dataset {
        Dataset::from_records(vec![
            rec("Prevalence of undernourishment (percent)", 2018, 10.0),
            rec("Prevalence of undernourishment (percent)", 2019, 12.0),
            rec("Dietary energy supply used in the estimation (kcal/cap/day)", 2017, 2000.0),
            rec("Dietary energy supply used in the estimation (kcal/cap/day)", 2019, 2050.0),
            rec("Dietary energy supply used in the estimation (kcal/cap/day)", 2018, 2040.0),
            rec("Percentage of children under 5 years affected by wasting", 2018, 3.0),
            rec("Percentage of children under 5 years of age who are stunted", 2018, 23.0),
            rec("Percentage of children under 5 years of age who are stunted", 2015, 27.0),
        ])
    }

    #[test]
    fn undernourishment_pairs_with_aligned_energy_supply() {
        let ds = dataset();
        let item = "Prevalence of undernourishment (percent)";
        let window = filter_by_indicator_and_range(&ds, item, 2000, 2030);
        let none = BTreeSet::new();
        let req = ComparisonRequest {
            selected: item,
            window: &window,
            child_selection: &none,
            low: 2000,
            high: 2030,
        };

        match build_comparison(&ds, classify(item), &req) {
            Some(Comparison::DualAxis {
                primary, secondary, ..
            }) => {
                assert_eq!(primary.records, window);
                assert_eq!(secondary.len(), 1);
                let years: Vec<i32> = secondary[0].records.iter().map(|r| r.year).collect();
                assert_eq!(years, vec![2018, 2019]);
            }
            other => panic!("expected dual axis comparison, got {other:?}"),
        }
    }

    #[test]
    fn missing_gdp_skips_comparison() {
        let ds = dataset();
        let item = "Dietary energy supply used in the estimation (kcal/cap/day)";
        let window = filter_by_indicator_and_range(&ds, item, 2000, 2030);
        let none = BTreeSet::new();
        let req = ComparisonRequest {
            selected: item,
            window: &window,
            child_selection: &none,
            low: 2000,
            high: 2030,
        };
        assert_eq!(build_comparison(&ds, IndicatorCategory::DietaryEnergy, &req), None);
    }

    #[test]
    fn child_comparison_uses_selection_and_window() {
        let ds = dataset();
        let stunted = "Percentage of children under 5 years of age who are stunted";
        let window = filter_by_indicator_and_range(&ds, stunted, 2016, 2030);
        let selection: BTreeSet<String> = [
            stunted.to_string(),
            "Percentage of children under 5 years affected by wasting".to_string(),
        ]
        .into_iter()
        .collect();
        let req = ComparisonRequest {
            selected: stunted,
            window: &window,
            child_selection: &selection,
            low: 2016,
            high: 2030,
        };

        match build_comparison(&ds, IndicatorCategory::ChildNutrition, &req) {
            Some(Comparison::MultiSeries { series, .. }) => {
                let names: Vec<&str> = series.iter().map(|s| s.name.as_str()).collect();
                assert_eq!(
                    names,
                    vec![
                        "Percentage of children under 5 years affected by wasting",
                        stunted,
                    ]
                );
                assert!(series.iter().all(|s| s.records.iter().all(|r| r.year >= 2016)));
            }
            other => panic!("expected multi series comparison, got {other:?}"),
        }
    }

    #[test]
    fn single_child_indicator_has_no_comparison() {
        let ds = Dataset::from_records(vec![rec("Children under 5 stunted (%)", 2018, 23.0)]);
        let item = "Children under 5 stunted (%)";
        let window = filter_by_indicator_and_range(&ds, item, 2000, 2030);
        let selection: BTreeSet<String> = [item.to_string()].into_iter().collect();
        let req = ComparisonRequest {
            selected: item,
            window: &window,
            child_selection: &selection,
            low: 2000,
            high: 2030,
        };
        assert_eq!(build_comparison(&ds, IndicatorCategory::ChildNutrition, &req), None);
    }
}
