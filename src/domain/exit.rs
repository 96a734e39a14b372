//! Forward trade simulation with a fixed exit priority.
//!
//! Per candle, in order: stop-loss, break-even after a deep retracement,
//! opposite crossover. If nothing fires the trade closes on the last candle.

use crate::domain::candle::Candle;
use crate::domain::crossover::{Direction, detect_cross};
use crate::domain::instrument::{InstrumentScale, round_pips};
use crate::domain::setup::{ExitReason, Outcome};
use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq)]
pub struct ExitOutcome {
    pub exit_index: usize,
    pub exit_time: NaiveDateTime,
    /// Unrounded exit price.
    pub exit_price: f64,
    pub reason: ExitReason,
    pub outcome: Outcome,
    /// Signed pips, rounded to one decimal.
    pub pips: f64,
    pub candles_held: usize,
    /// The deep-retracement flag was set at some point during the trade.
    pub breakeven_armed: bool,
}

#[derive(Debug, Clone)]
pub struct ExitSimulator {
    scale: InstrumentScale,
    stop_loss_pips: f64,
    breakeven_multiplier: Option<f64>,
}

impl ExitSimulator {
    pub fn new(scale: InstrumentScale, stop_loss_pips: f64) -> Self {
        Self {
            scale,
            stop_loss_pips,
            breakeven_multiplier: None,
        }
    }

    /// Enables the break-even rule with the given volatility multiplier.
    pub fn with_breakeven(mut self, multiplier: f64) -> Self {
        self.breakeven_multiplier = Some(multiplier);
        self
    }

    pub fn stop_price(&self, direction: Direction, entry_price: f64) -> f64 {
        let distance = self.scale.to_price(self.stop_loss_pips);
        match direction {
            Direction::Long => entry_price - distance,
            Direction::Short => entry_price + distance,
        }
    }

    /// Walks forward from `entry_index` until an exit fires. Returns `None`
    /// when `entry_index` is outside the series.
    pub fn simulate(
        &self,
        series: &[Candle],
        entry_index: usize,
        direction: Direction,
        entry_price: f64,
    ) -> Option<ExitOutcome> {
        if entry_index >= series.len() {
            return None;
        }
        let stop = self.stop_price(direction, entry_price);
        let mut deep_retracement = false;

        for (i, candle) in series.iter().enumerate().skip(entry_index) {
            let stopped = match direction {
                Direction::Long => candle.low <= stop,
                Direction::Short => candle.high >= stop,
            };
            if stopped {
                return Some(self.close(
                    i,
                    candle,
                    entry_index,
                    direction,
                    entry_price,
                    stop,
                    ExitReason::StopLoss,
                    deep_retracement,
                ));
            }

            if i == entry_index {
                continue;
            }

            if let (Some(multiplier), Some(volatility)) =
                (self.breakeven_multiplier, candle.usable_volatility())
            {
                let returned = match direction {
                    Direction::Long => candle.high >= entry_price,
                    Direction::Short => candle.low <= entry_price,
                };
                if deep_retracement && returned {
                    return Some(ExitOutcome {
                        exit_index: i,
                        exit_time: candle.timestamp,
                        exit_price: entry_price,
                        reason: ExitReason::BreakEven,
                        outcome: Outcome::BreakEven,
                        pips: 0.0,
                        candles_held: i - entry_index,
                        breakeven_armed: true,
                    });
                }

                let adverse = match direction {
                    Direction::Long => entry_price - candle.low,
                    Direction::Short => candle.high - entry_price,
                };
                if adverse / volatility >= multiplier {
                    deep_retracement = true;
                }
            }

            if detect_cross(series, i) == Some(direction.opposite()) {
                return Some(self.close(
                    i,
                    candle,
                    entry_index,
                    direction,
                    entry_price,
                    candle.close,
                    ExitReason::CrossReversal,
                    deep_retracement,
                ));
            }
        }

        // End-of-data counts the final candle as held.
        let last_index = series.len() - 1;
        let last = &series[last_index];
        Some(ExitOutcome {
            candles_held: series.len() - entry_index,
            ..self.close(
                last_index,
                last,
                entry_index,
                direction,
                entry_price,
                last.close,
                ExitReason::EndOfData,
                deep_retracement,
            )
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn close(
        &self,
        index: usize,
        candle: &Candle,
        entry_index: usize,
        direction: Direction,
        entry_price: f64,
        exit_price: f64,
        reason: ExitReason,
        breakeven_armed: bool,
    ) -> ExitOutcome {
        let raw_pips = direction.signed_pips(entry_price, exit_price, &self.scale);
        let outcome = match reason {
            ExitReason::StopLoss => Outcome::Loss,
            _ => Outcome::from_pips(raw_pips),
        };
        ExitOutcome {
            exit_index: index,
            exit_time: candle.timestamp,
            exit_price,
            reason,
            outcome,
            pips: round_pips(raw_pips),
            candles_held: index - entry_index,
            breakeven_armed,
        }
    }
}
