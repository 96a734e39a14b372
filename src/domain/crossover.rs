//! Moving-average crossover detection and the scan state machine.
//!
//! The detector walks the candle window once and moves between three states:
//!
//! - `Idle`: no crossover recorded yet, or the last trade was stopped out.
//! - `Armed(dir)`: a crossover in `dir` was seen; waiting for the averages to
//!   separate by at least the minimum pip distance.
//! - `Separated(dir)`: separation reached; the next candle whose range touches
//!   the fast average is an entry candidate.
//!
//! Transitions are pure functions of the current state and a [`ScanEvent`].

use crate::domain::candle::Candle;
use crate::domain::instrument::InstrumentScale;
use crate::domain::setup::ExitReason;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Long => Direction::Short,
            Direction::Short => Direction::Long,
        }
    }

    /// Signed pip result of moving from `entry` to `exit`.
    pub fn signed_pips(self, entry: f64, exit: f64, scale: &InstrumentScale) -> f64 {
        match self {
            Direction::Long => scale.to_pips(exit - entry),
            Direction::Short => scale.to_pips(entry - exit),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Long => "LONG",
            Direction::Short => "SHORT",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Crossover of the fast average through the slow one at index `i`.
///
/// Index 0 has no predecessor and never crosses.
pub fn detect_cross(series: &[Candle], i: usize) -> Option<Direction> {
    if i == 0 || i >= series.len() {
        return None;
    }
    let prev = &series[i - 1];
    let curr = &series[i];

    if prev.fast_ma <= prev.slow_ma && curr.fast_ma > curr.slow_ma {
        return Some(Direction::Long);
    }
    if prev.fast_ma >= prev.slow_ma && curr.fast_ma < curr.slow_ma {
        return Some(Direction::Short);
    }
    None
}

pub fn separation_pips(candle: &Candle, scale: &InstrumentScale) -> f64 {
    scale.to_pips(candle.ma_gap())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Armed(Direction),
    Separated(Direction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanEvent {
    CrossDetected(Direction),
    SeparationMet,
    TouchDetected,
    ExitFired(ExitReason),
}

impl ScanState {
    pub fn direction(self) -> Option<Direction> {
        match self {
            ScanState::Idle => None,
            ScanState::Armed(d) | ScanState::Separated(d) => Some(d),
        }
    }

    pub fn is_separated(self) -> bool {
        matches!(self, ScanState::Separated(_))
    }

    pub fn on(self, event: ScanEvent) -> ScanState {
        match (self, event) {
            (_, ScanEvent::CrossDetected(d)) => ScanState::Armed(d),
            (ScanState::Armed(d), ScanEvent::SeparationMet) => ScanState::Separated(d),
            (state, ScanEvent::SeparationMet) => state,
            (state, ScanEvent::TouchDetected) => state,
            (_, ScanEvent::ExitFired(ExitReason::StopLoss | ExitReason::BreakEven)) => {
                ScanState::Idle
            }
            // The reversal cross that closed the trade becomes the new signal.
            (state, ScanEvent::ExitFired(ExitReason::CrossReversal)) => match state.direction() {
                Some(d) => ScanState::Armed(d.opposite()),
                None => state,
            },
            (state, ScanEvent::ExitFired(ExitReason::EndOfData)) => state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn ma_candle(hour: u32, fast_ma: f64, slow_ma: f64) -> Candle {
        Candle {
            timestamp: NaiveDate::from_ymd_opt(2025, 10, 1)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            open: fast_ma,
            high: fast_ma + 0.0010,
            low: fast_ma - 0.0010,
            close: fast_ma,
            volume: 100,
            fast_ma,
            slow_ma,
            volatility: 0.0010,
            plus_di: 20.0,
            minus_di: 20.0,
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn bullish_cross() {
        let s = vec![ma_candle(0, 1.1000, 1.1002), ma_candle(1, 1.1003, 1.1002)];
        assert_eq!(detect_cross(&s, 1), Some(Direction::Long));
    }

    #[test]
    fn bearish_cross() {
        let s = vec![ma_candle(0, 1.1003, 1.1002), ma_candle(1, 1.1001, 1.1002)];
        assert_eq!(detect_cross(&s, 1), Some(Direction::Short));
    }

    #[test]
    fn touching_then_leaving_counts_as_cross() {
        // equal at i-1, strictly above at i
        let s = vec![ma_candle(0, 1.1000, 1.1000), ma_candle(1, 1.1001, 1.1000)];
        assert_eq!(detect_cross(&s, 1), Some(Direction::Long));
        let s = vec![ma_candle(0, 1.1000, 1.1000), ma_candle(1, 1.0999, 1.1000)];
        assert_eq!(detect_cross(&s, 1), Some(Direction::Short));
    }

    #[test]
    fn no_cross_when_order_holds() {
        let s = vec![ma_candle(0, 1.1003, 1.1002), ma_candle(1, 1.1005, 1.1002)];
        assert_eq!(detect_cross(&s, 1), None);
        let s = vec![ma_candle(0, 1.1003, 1.1002), ma_candle(1, 1.1002, 1.1002)];
        assert_eq!(detect_cross(&s, 1), None);
    }

    #[test]
    fn first_and_out_of_bounds_index_never_cross() {
        let s = vec![ma_candle(0, 1.1000, 1.1002), ma_candle(1, 1.1003, 1.1002)];
        assert_eq!(detect_cross(&s, 0), None);
        assert_eq!(detect_cross(&s, 2), None);
    }

    #[test]
    fn separation_in_pips() {
        let c = ma_candle(0, 1.1010, 1.1004);
        let pips = separation_pips(&c, &InstrumentScale::MAJOR);
        assert!((pips - 6.0).abs() < 1e-6);
    }

    #[test]
    fn signed_pips_convention() {
        let scale = InstrumentScale::MAJOR;
        assert!((Direction::Long.signed_pips(1.1000, 1.1015, &scale) - 15.0).abs() < 1e-6);
        assert!((Direction::Short.signed_pips(1.1000, 1.1015, &scale) + 15.0).abs() < 1e-6);
    }

    #[test]
    fn cross_rearms_from_any_state() {
        let long = ScanEvent::CrossDetected(Direction::Long);
        assert_eq!(ScanState::Idle.on(long), ScanState::Armed(Direction::Long));
        assert_eq!(
            ScanState::Separated(Direction::Short).on(long),
            ScanState::Armed(Direction::Long)
        );
    }

    #[test]
    fn separation_only_from_armed() {
        assert_eq!(
            ScanState::Armed(Direction::Short).on(ScanEvent::SeparationMet),
            ScanState::Separated(Direction::Short)
        );
        assert_eq!(ScanState::Idle.on(ScanEvent::SeparationMet), ScanState::Idle);
        assert_eq!(
            ScanState::Separated(Direction::Long).on(ScanEvent::SeparationMet),
            ScanState::Separated(Direction::Long)
        );
    }

    #[test]
    fn exit_transitions() {
        let sep = ScanState::Separated(Direction::Long);
        assert_eq!(sep.on(ScanEvent::ExitFired(ExitReason::StopLoss)), ScanState::Idle);
        assert_eq!(sep.on(ScanEvent::ExitFired(ExitReason::BreakEven)), ScanState::Idle);
        assert_eq!(
            sep.on(ScanEvent::ExitFired(ExitReason::CrossReversal)),
            ScanState::Armed(Direction::Short)
        );
        assert_eq!(sep.on(ScanEvent::ExitFired(ExitReason::EndOfData)), sep);
        assert_eq!(sep.on(ScanEvent::TouchDetected), sep);
    }
}
