//! Summary statistics over a list of setup records.

use super::setup::{ExitReason, Outcome, SetupRecord};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_setups: usize,
    pub wins: usize,
    pub losses: usize,
    pub breakevens: usize,
    pub win_rate: f64,
    pub total_pips: f64,
    pub avg_pips: f64,
    pub avg_winner: f64,
    pub avg_loser: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub avg_candles_held: f64,
    pub exits: BTreeMap<ExitReason, usize>,
}

impl Summary {
    pub fn compute(setups: &[SetupRecord]) -> Self {
        let mut wins = 0usize;
        let mut losses = 0usize;
        let mut breakevens = 0usize;
        let mut total_pips = 0.0_f64;
        let mut win_pips = 0.0_f64;
        let mut loss_pips = 0.0_f64;
        let mut largest_win = 0.0_f64;
        let mut largest_loss = 0.0_f64;
        let mut total_held = 0usize;
        let mut exits = BTreeMap::new();

        for setup in setups {
            total_pips += setup.pips;
            total_held += setup.candles_held;
            *exits.entry(setup.exit_reason).or_insert(0) += 1;

            match setup.outcome {
                Outcome::Win => {
                    wins += 1;
                    win_pips += setup.pips;
                    if setup.pips > largest_win {
                        largest_win = setup.pips;
                    }
                }
                Outcome::Loss => {
                    losses += 1;
                    loss_pips += setup.pips;
                    if setup.pips < largest_loss {
                        largest_loss = setup.pips;
                    }
                }
                Outcome::BreakEven => breakevens += 1,
            }
        }

        let total_setups = setups.len();
        let mean = |sum: f64, n: usize| if n > 0 { sum / n as f64 } else { 0.0 };

        Summary {
            total_setups,
            wins,
            losses,
            breakevens,
            win_rate: mean(wins as f64, total_setups),
            total_pips,
            avg_pips: mean(total_pips, total_setups),
            avg_winner: mean(win_pips, wins),
            avg_loser: mean(loss_pips, losses),
            largest_win,
            largest_loss,
            avg_candles_held: mean(total_held as f64, total_setups),
            exits,
        }
    }

    pub fn exits_by(&self, reason: ExitReason) -> usize {
        self.exits.get(&reason).copied().unwrap_or(0)
    }
}
