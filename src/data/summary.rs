use super::model::IndicatorRecord;

/// The three headline metrics of a window.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Summary {
    /// Value of the last record in the window; absent when the window is
    /// empty or that record has no value.
    pub latest_value: Option<f64>,
    /// Change between the first and last record, in percent.
    pub percent_change: Option<f64>,
    /// Number of records ("years of data"), not distinct years.
    pub observation_count: usize,
}

/// Derive the headline metrics from a year-sorted window.
///
/// Percent change uses the first and the last record only. When either
/// endpoint is absent, the first is zero, or there are fewer than two records
/// the change is not applicable; interior records are never substituted.
pub fn summarize(window: &[IndicatorRecord]) -> Summary {
    let latest_value = window.last().and_then(|r| r.value);

    let percent_change = match window {
        [first, .., last] => match (first.value, last.value) {
            (Some(a), Some(b)) if a != 0.0 => Some((b - a) / a * 100.0).filter(|c| c.is_finite()),
            _ => None,
        },
        _ => None,
    };

    Summary {
        latest_value,
        percent_change,
        observation_count: window.len(),
    }
}
