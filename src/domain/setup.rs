//! Completed trade record produced for every confirmed entry.

use crate::domain::crossover::Direction;
use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExitReason {
    StopLoss,
    BreakEven,
    CrossReversal,
    EndOfData,
}

impl ExitReason {
    pub const ALL: [ExitReason; 4] = [
        ExitReason::StopLoss,
        ExitReason::BreakEven,
        ExitReason::CrossReversal,
        ExitReason::EndOfData,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ExitReason::StopLoss => "Stop Loss",
            ExitReason::BreakEven => "Break Even",
            ExitReason::CrossReversal => "EMA Cross Reversal",
            ExitReason::EndOfData => "End of Data",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
    BreakEven,
}

impl Outcome {
    /// Win on strictly positive pips, loss otherwise.
    pub fn from_pips(pips: f64) -> Self {
        if pips > 0.0 { Outcome::Win } else { Outcome::Loss }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Win => "WIN",
            Outcome::Loss => "LOSS",
            Outcome::BreakEven => "BE",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetupRecord {
    pub setup_id: usize,
    pub entry_time: NaiveDateTime,
    pub direction: Direction,
    pub entry_price: f64,
    pub stop_loss_price: f64,
    pub exit_time: NaiveDateTime,
    pub exit_price: f64,
    pub exit_reason: ExitReason,
    pub outcome: Outcome,
    pub pips: f64,
    pub candles_held: usize,
}
