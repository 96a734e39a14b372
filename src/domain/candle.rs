//! Candle with indicator fields attached, and helpers over sorted candle slices.

use crate::domain::error::ScanError;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
    pub fast_ma: f64,
    pub slow_ma: f64,
    /// Average true range. Non-finite or non-positive means "undefined".
    pub volatility: f64,
    pub plus_di: f64,
    pub minus_di: f64,
    /// Indicator columns the scan does not read (e.g. `adx`).
    pub extra: BTreeMap<String, f64>,
}

impl Candle {
    /// True when the fast average lies inside `[low, high]`.
    pub fn touches_fast_ma(&self) -> bool {
        self.low <= self.fast_ma && self.fast_ma <= self.high
    }

    /// Fast/slow gap as a raw price distance.
    pub fn ma_gap(&self) -> f64 {
        (self.fast_ma - self.slow_ma).abs()
    }

    pub fn usable_volatility(&self) -> Option<f64> {
        (self.volatility.is_finite() && self.volatility > 0.0).then_some(self.volatility)
    }
}

/// Inclusive timestamp range used to select the analysis window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.start <= ts && ts <= self.end
    }
}

/// Sub-slice of `series` whose timestamps fall inside `range`.
///
/// `series` must be sorted ascending; an empty or inverted range yields an
/// empty slice.
pub fn window<'a>(series: &'a [Candle], range: &DateRange) -> &'a [Candle] {
    let lo = series.partition_point(|c| c.timestamp < range.start);
    let hi = series.partition_point(|c| c.timestamp <= range.end);
    if lo >= hi { &[] } else { &series[lo..hi] }
}

/// Most recent candle whose timestamp is at or before `ts`.
pub fn at_or_before(series: &[Candle], ts: NaiveDateTime) -> Option<&Candle> {
    let idx = series.partition_point(|c| c.timestamp <= ts);
    idx.checked_sub(1).map(|i| &series[i])
}

/// Fails on the first timestamp that does not strictly increase.
pub fn validate_series(series: &[Candle]) -> Result<(), ScanError> {
    for (i, pair) in series.windows(2).enumerate() {
        if pair[1].timestamp <= pair[0].timestamp {
            return Err(ScanError::UnorderedSeries {
                index: i + 1,
                timestamp: pair[1].timestamp.to_string(),
            });
        }
    }
    Ok(())
}
