//! Entry filters that can veto a touch candidate without touching scan state.

use crate::domain::candle::{Candle, at_or_before};
use crate::domain::crossover::Direction;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

/// Read-only predicate consulted before an entry is committed.
pub trait EntryFilter {
    fn name(&self) -> &'static str;

    fn permits(
        &self,
        direction: Direction,
        timestamp: NaiveDateTime,
        aux: Option<&[Candle]>,
    ) -> bool;
}

/// Higher-timeframe +DI/-DI alignment.
///
/// Uses the latest auxiliary candle at or before the candidate. With no aux
/// series, or no aux candle that early, the filter passes.
#[derive(Debug, Clone)]
pub struct DirectionalFilter {
    pub min_diff: f64,
}

impl DirectionalFilter {
    pub const NAME: &'static str = "directional";

    pub fn new(min_diff: f64) -> Self {
        Self { min_diff }
    }
}

impl EntryFilter for DirectionalFilter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn permits(
        &self,
        direction: Direction,
        timestamp: NaiveDateTime,
        aux: Option<&[Candle]>,
    ) -> bool {
        let Some(candle) = aux.and_then(|series| at_or_before(series, timestamp)) else {
            return true;
        };
        let spread = match direction {
            Direction::Long => candle.plus_di - candle.minus_di,
            Direction::Short => candle.minus_di - candle.plus_di,
        };
        spread >= self.min_diff
    }
}

/// Run-scoped counters, returned with the detection result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub rejected: BTreeMap<&'static str, usize>,
    pub breakeven_activations: usize,
}

impl FilterStats {
    pub fn rejected_by(&self, filter: &str) -> usize {
        self.rejected.get(filter).copied().unwrap_or(0)
    }

    pub fn total_rejected(&self) -> usize {
        self.rejected.values().sum()
    }
}

#[derive(Default)]
pub struct FilterChain {
    filters: Vec<Box<dyn EntryFilter>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, filter: impl EntryFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Names of every filter that rejects the candidate; empty means accepted.
    ///
    /// All filters are evaluated so the per-filter counts do not depend on
    /// the order they were added in.
    pub fn rejections(
        &self,
        direction: Direction,
        timestamp: NaiveDateTime,
        aux: Option<&[Candle]>,
    ) -> Vec<&'static str> {
        self.filters
            .iter()
            .filter(|f| !f.permits(direction, timestamp, aux))
            .map(|f| f.name())
            .collect()
    }
}
