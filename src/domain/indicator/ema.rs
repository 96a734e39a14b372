//! Exponential Moving Average.
//!
//! k = 2/(n+1), seed with first SMA, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_ema(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.is_empty() {
        return IndicatorSeries::empty(IndicatorType::Ema(period));
    }

    let mut values = Vec::with_capacity(bars.len());
    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = 0.0;
    let mut sum = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        let valid = i + 1 >= period;
        if i + 1 < period {
            sum += bar.close;
        } else if i + 1 == period {
            sum += bar.close;
            ema = sum / period as f64;
        } else {
            ema = bar.close * k + ema * (1.0 - k);
        }
        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            valid,
            value: IndicatorValue::Simple(if valid { ema } else { 0.0 }),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(period),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_bars::from_closes;

    #[test]
    fn ema_warmup() {
        let series = calculate_ema(&from_closes(&[10.0, 20.0, 30.0, 40.0, 50.0]), 3);
        assert!(!series.values[0].valid);
        assert!(!series.values[1].valid);
        assert!(series.values[2..].iter().all(|p| p.valid));
    }

    #[test]
    fn ema_period_1_tracks_close() {
        let series = calculate_ema(&from_closes(&[10.0, 20.0, 30.0]), 1);
        assert!(series.values.iter().all(|p| p.valid));
        assert!((series.values[1].value.simple() - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_seed_is_sma() {
        let series = calculate_ema(&from_closes(&[10.0, 20.0, 30.0]), 3);
        assert!((series.values[2].value.simple() - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_recursive_calculation() {
        let series = calculate_ema(&from_closes(&[10.0, 20.0, 30.0, 40.0, 50.0]), 3);

        let k = 2.0 / 4.0;
        let sma = 20.0;
        let ema_3 = 40.0 * k + sma * (1.0 - k);
        let ema_4 = 50.0 * k + ema_3 * (1.0 - k);

        assert!((series.values[3].value.simple() - ema_3).abs() < f64::EPSILON);
        assert!((series.values[4].value.simple() - ema_4).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_indicator_type() {
        let series = calculate_ema(&from_closes(&[10.0, 20.0, 30.0]), 5);
        assert_eq!(series.indicator_type, IndicatorType::Ema(5));
        assert!(series.values.iter().all(|p| !p.valid));
    }

    #[test]
    fn ema_empty_or_zero_period() {
        assert!(calculate_ema(&[], 3).values.is_empty());
        assert!(calculate_ema(&from_closes(&[10.0, 20.0]), 0).values.is_empty());
    }
}
