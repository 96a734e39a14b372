//! Relative Strength Index with Wilder smoothing.
//!
//! The first averages are plain means of the first n gains and losses; after
//! that avg = (prev * (n-1) + current) / n. RSI = 100 - 100 / (1 + gain/loss),
//! and 100 when the average loss is zero.
//!
//! Warmup: the first n bars are invalid (n price changes are needed).

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

fn rsi_from(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

pub fn calculate_rsi(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.is_empty() {
        return IndicatorSeries::empty(IndicatorType::Rsi(period));
    }

    let n = period as f64;
    let mut values = Vec::with_capacity(bars.len());
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        if i > 0 {
            let change = bar.close - bars[i - 1].close;
            let gain = change.max(0.0);
            let loss = (-change).max(0.0);
            if i <= period {
                avg_gain += gain;
                avg_loss += loss;
                if i == period {
                    avg_gain /= n;
                    avg_loss /= n;
                }
            } else {
                avg_gain = (avg_gain * (n - 1.0) + gain) / n;
                avg_loss = (avg_loss * (n - 1.0) + loss) / n;
            }
        }

        let valid = i >= period;
        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            valid,
            value: IndicatorValue::Simple(if valid { rsi_from(avg_gain, avg_loss) } else { 0.0 }),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}
