//! MACD: line = EMA(fast) - EMA(slow), signal = EMA(signal) of the line
//! (seeded with the mean of its first `signal` values), histogram = line - signal.
//!
//! Warmup: max(fast, slow) + signal - 2 bars are invalid.

use crate::domain::indicator::ema::calculate_ema;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_macd(bars: &[OhlcvBar], fast: usize, slow: usize, signal: usize) -> IndicatorSeries {
    let indicator_type = IndicatorType::Macd { fast, slow, signal };
    if bars.is_empty() || fast == 0 || slow == 0 || signal == 0 {
        return IndicatorSeries::empty(indicator_type);
    }

    let fast_ema = calculate_ema(bars, fast);
    let slow_ema = calculate_ema(bars, slow);
    let k = 2.0 / (signal as f64 + 1.0);

    let mut values = Vec::with_capacity(bars.len());
    let mut seen = 0;
    let mut seed_sum = 0.0;
    let mut signal_ema = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        let line = match (fast_ema.valid_at(i), slow_ema.valid_at(i)) {
            (Some(f), Some(s)) => Some(f.simple() - s.simple()),
            _ => None,
        };

        let (valid, line) = match line {
            Some(line) => {
                seen += 1;
                if seen < signal {
                    seed_sum += line;
                } else if seen == signal {
                    seed_sum += line;
                    signal_ema = seed_sum / signal as f64;
                } else {
                    signal_ema = line * k + signal_ema * (1.0 - k);
                }
                (seen >= signal, line)
            }
            None => (false, 0.0),
        };

        let signal_value = if valid { signal_ema } else { 0.0 };
        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            valid,
            value: IndicatorValue::Macd {
                line,
                signal: signal_value,
                histogram: line - signal_value,
            },
        });
    }

    IndicatorSeries {
        indicator_type,
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_bars::from_closes;

    fn rising(count: usize) -> Vec<OhlcvBar> {
        from_closes(&(0..count).map(|i| 1.10 + i as f64 * 0.001).collect::<Vec<_>>())
    }

    fn parts(value: IndicatorValue) -> (f64, f64, f64) {
        match value {
            IndicatorValue::Macd {
                line,
                signal,
                histogram,
            } => (line, signal, histogram),
            other => panic!("expected MACD value, got {other:?}"),
        }
    }

    #[test]
    fn macd_warmup() {
        let series = calculate_macd(&rising(20), 3, 6, 4);
        let first_valid = 6 + 4 - 2;
        assert!(series.values[..first_valid].iter().all(|p| !p.valid));
        assert!(series.values[first_valid..].iter().all(|p| p.valid));
    }

    #[test]
    fn macd_line_is_fast_minus_slow() {
        let bars = rising(12);
        let series = calculate_macd(&bars, 3, 5, 2);
        let fast = calculate_ema(&bars, 3);
        let slow = calculate_ema(&bars, 5);
        for i in 4..bars.len() {
            let (line, _, _) = parts(series.values[i].value);
            let expected = fast.values[i].value.simple() - slow.values[i].value.simple();
            assert!((line - expected).abs() < 1e-12, "line mismatch at {i}");
        }
    }

    #[test]
    fn macd_signal_seed_and_step() {
        let bars = rising(10);
        let series = calculate_macd(&bars, 2, 4, 3);
        let lines: Vec<f64> = series.values.iter().map(|p| parts(p.value).0).collect();

        let seed = (lines[3] + lines[4] + lines[5]) / 3.0;
        assert!((parts(series.values[5].value).1 - seed).abs() < 1e-12);

        let k = 2.0 / 4.0;
        let next = lines[6] * k + seed * (1.0 - k);
        assert!((parts(series.values[6].value).1 - next).abs() < 1e-12);
    }

    #[test]
    fn macd_histogram_is_line_minus_signal() {
        let series = calculate_macd(&rising(40), 12, 26, 9);
        for p in series.values.iter().filter(|p| p.valid) {
            let (line, signal, histogram) = parts(p.value);
            assert!((histogram - (line - signal)).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn macd_zero_period_or_empty() {
        let bars = rising(5);
        assert!(calculate_macd(&bars, 0, 26, 9).values.is_empty());
        assert!(calculate_macd(&bars, 12, 0, 9).values.is_empty());
        assert!(calculate_macd(&bars, 12, 26, 0).values.is_empty());
        assert!(calculate_macd(&[], 12, 26, 9).values.is_empty());
        assert_eq!(
            calculate_macd(&bars, 5, 10, 3).indicator_type,
            IndicatorType::Macd {
                fast: 5,
                slow: 10,
                signal: 3
            }
        );
    }
}
