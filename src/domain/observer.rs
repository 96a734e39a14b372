//! Hooks the detector calls at each scan transition.

use crate::domain::candle::{Candle, DateRange};
use crate::domain::crossover::Direction;
use crate::domain::setup::SetupRecord;

/// All methods default to no-ops so observers implement only what they need.
pub trait ScanObserver {
    fn on_cross(&mut self, _candle: &Candle, _direction: Direction) {}

    fn on_separation(&mut self, _candle: &Candle, _direction: Direction, _pips: f64) {}

    fn on_touch_checked(&mut self, _candle: &Candle, _touched: bool) {}

    fn on_filter_rejected(&mut self, _candle: &Candle, _direction: Direction, _filter: &str) {}

    fn on_entry(&mut self, _candle: &Candle, _direction: Direction, _entry_price: f64) {}

    fn on_exit(&mut self, _record: &SetupRecord) {}
}

pub struct NoopObserver;

impl ScanObserver for NoopObserver {}

/// Reports transitions through the `log` facade.
///
/// Transitions on candles inside the trace window go out at `info`,
/// everything else at `debug`.
#[derive(Debug, Clone, Default)]
pub struct LogObserver {
    trace: Option<DateRange>,
}

impl LogObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trace_window(mut self, range: DateRange) -> Self {
        self.trace = Some(range);
        self
    }

    fn level(&self, candle: &Candle) -> log::Level {
        match self.trace {
            Some(range) if range.contains(candle.timestamp) => log::Level::Info,
            _ => log::Level::Debug,
        }
    }
}

impl ScanObserver for LogObserver {
    fn on_cross(&mut self, candle: &Candle, direction: Direction) {
        log::log!(
            self.level(candle),
            "cross {} at {} (fast={:.5} slow={:.5})",
            direction,
            candle.timestamp,
            candle.fast_ma,
            candle.slow_ma
        );
    }

    fn on_separation(&mut self, candle: &Candle, direction: Direction, pips: f64) {
        log::log!(
            self.level(candle),
            "separation {:.2} pips at {} ({})",
            pips,
            candle.timestamp,
            direction
        );
    }

    fn on_touch_checked(&mut self, candle: &Candle, touched: bool) {
        log::log!(
            self.level(candle),
            "touch check at {}: fast={:.5} high={:.5} low={:.5} -> {}",
            candle.timestamp,
            candle.fast_ma,
            candle.high,
            candle.low,
            if touched { "touch" } else { "no touch" }
        );
    }

    fn on_filter_rejected(&mut self, candle: &Candle, direction: Direction, filter: &str) {
        log::log!(
            self.level(candle),
            "{} entry at {} rejected by {} filter",
            direction,
            candle.timestamp,
            filter
        );
    }

    fn on_entry(&mut self, candle: &Candle, direction: Direction, entry_price: f64) {
        log::info!("entry {} at {} @ {:.5}", direction, candle.timestamp, entry_price);
    }

    fn on_exit(&mut self, record: &SetupRecord) {
        log::info!(
            "exit #{} at {} ({}): {:+.1} pips",
            record.setup_id,
            record.exit_time,
            record.exit_reason,
            record.pips
        );
    }
}
