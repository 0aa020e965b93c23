use chrono::{Duration, Local, NaiveDate};

use crate::{Exercise, TestEntry, Variant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

impl From<std::ops::RangeInclusive<NaiveDate>> for Interval {
    fn from(value: std::ops::RangeInclusive<NaiveDate>) -> Self {
        Interval {
            first: *value.start(),
            last: *value.end(),
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
pub enum DefaultInterval {
    All,
    _1Y = 365,
    _6M = 182,
    _3M = 91,
}

#[must_use]
pub fn init_interval(dates: &[NaiveDate], default_interval: DefaultInterval) -> Interval {
    let today = Local::now().date_naive();
    let mut first = dates.iter().copied().min().unwrap_or(today);
    let last = dates.iter().copied().max().unwrap_or(today);

    if default_interval != DefaultInterval::All
        && last >= today - Duration::days(default_interval as i64)
    {
        first = today - Duration::days(default_interval as i64);
    }

    Interval { first, last: today }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricPoint {
    pub date: NaiveDate,
    pub value: f32,
    pub variant: Option<Variant>,
}

/// History of one exercise in chronological order of `tests`.
///
/// Entries without a positive value are not part of the history.
#[must_use]
pub fn metric_history(tests: &[TestEntry], exercise: Exercise) -> Vec<MetricPoint> {
    tests
        .iter()
        .map(|t| MetricPoint {
            date: t.date,
            value: t.value(exercise),
            variant: t.metric(exercise).and_then(|m| m.variant),
        })
        .filter(|p| p.value > 0.)
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    pub min: f32,
    pub max: f32,
    pub first: f32,
    pub last: f32,
    pub delta: f32,
    /// Change from first to last in percent, `None` if the first value is zero.
    pub pct: Option<f32>,
    pub size: usize,
}

#[must_use]
pub fn calculate_stats(points: &[MetricPoint]) -> Option<Stats> {
    let values = points
        .iter()
        .map(|p| p.value)
        .filter(|v| *v > 0.)
        .collect::<Vec<_>>();

    let first = *values.first()?;
    let last = *values.last()?;
    let delta = last - first;

    Some(Stats {
        min: values.iter().copied().fold(f32::MAX, f32::min),
        max: values.iter().copied().fold(f32::MIN, f32::max),
        first,
        last,
        delta,
        pct: if first == 0. {
            None
        } else {
            Some(delta / first * 100.)
        },
        size: values.len(),
    })
}

/// Direction of the change of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    /// More than 5 % improvement
    Strong,
    Moderate,
    Negative,
}

impl Trend {
    #[must_use]
    pub fn from_pct(pct: Option<f32>) -> Self {
        match pct {
            Some(pct) if pct > 5. => Trend::Strong,
            Some(pct) if pct > 0. => Trend::Moderate,
            _ => Trend::Negative,
        }
    }
}
