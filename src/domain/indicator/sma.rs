//! Simple moving average of bar volume.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_volume_sma(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.is_empty() {
        return IndicatorSeries::empty(IndicatorType::VolumeSma(period));
    }

    let mut values = Vec::with_capacity(bars.len());
    let mut sum = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        sum += bar.volume as f64;
        if i >= period {
            sum -= bars[i - period].volume as f64;
        }
        let valid = i + 1 >= period;
        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            valid,
            value: IndicatorValue::Simple(if valid { sum / period as f64 } else { 0.0 }),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::VolumeSma(period),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_bars::from_closes;

    fn with_volumes(volumes: &[i64]) -> Vec<OhlcvBar> {
        let mut bars = from_closes(&vec![1.1; volumes.len()]);
        for (bar, &v) in bars.iter_mut().zip(volumes) {
            bar.volume = v;
        }
        bars
    }

    #[test]
    fn volume_sma_window() {
        let series = calculate_volume_sma(&with_volumes(&[10, 20, 30, 40, 50]), 3);
        assert!(!series.values[0].valid);
        assert!(!series.values[1].valid);
        assert!((series.values[2].value.simple() - 20.0).abs() < f64::EPSILON);
        assert!((series.values[3].value.simple() - 30.0).abs() < f64::EPSILON);
        assert!((series.values[4].value.simple() - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn volume_sma_empty_or_zero_period() {
        assert!(calculate_volume_sma(&[], 3).values.is_empty());
        assert!(calculate_volume_sma(&with_volumes(&[1, 2]), 0).values.is_empty());
    }
}
