//! Directional Movement Index (+DI, -DI, ADX), Wilder smoothing.
//!
//! +DM = up move when it beats the down move and is positive, else 0; -DM
//! mirrors. TR, +DM and -DM are smoothed from index 1, seeded with the mean of
//! their first n values, so DI is first defined at index n. ADX is the Wilder
//! average of DX seeded with the mean of the first n DX values, first defined
//! at index 2n-1. Points are valid once ADX is.

use crate::domain::indicator::atr::true_ranges;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

struct Wilder {
    period: usize,
    seen: usize,
    sum: f64,
    value: f64,
}

impl Wilder {
    fn new(period: usize) -> Self {
        Self {
            period,
            seen: 0,
            sum: 0.0,
            value: 0.0,
        }
    }

    fn push(&mut self, x: f64) -> Option<f64> {
        self.seen += 1;
        if self.seen < self.period {
            self.sum += x;
            return None;
        }
        if self.seen == self.period {
            self.sum += x;
            self.value = self.sum / self.period as f64;
        } else {
            self.value = (self.value * (self.period - 1) as f64 + x) / self.period as f64;
        }
        Some(self.value)
    }
}

pub fn calculate_dmi(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.len() < 2 {
        return IndicatorSeries::empty(IndicatorType::Dmi(period));
    }

    let tr = true_ranges(bars);
    let mut tr_avg = Wilder::new(period);
    let mut plus_avg = Wilder::new(period);
    let mut minus_avg = Wilder::new(period);
    let mut adx_avg = Wilder::new(period);

    let mut values = Vec::with_capacity(bars.len());
    values.push(IndicatorPoint {
        timestamp: bars[0].timestamp,
        valid: false,
        value: IndicatorValue::Directional {
            plus_di: 0.0,
            minus_di: 0.0,
            adx: 0.0,
        },
    });

    for i in 1..bars.len() {
        let up = bars[i].high - bars[i - 1].high;
        let down = bars[i - 1].low - bars[i].low;
        let plus_dm = if up > down && up > 0.0 { up } else { 0.0 };
        let minus_dm = if down > up && down > 0.0 { down } else { 0.0 };

        let smoothed = (
            tr_avg.push(tr[i]),
            plus_avg.push(plus_dm),
            minus_avg.push(minus_dm),
        );

        let mut point = IndicatorValue::Directional {
            plus_di: 0.0,
            minus_di: 0.0,
            adx: 0.0,
        };
        let mut valid = false;

        if let (Some(tr_s), Some(plus_s), Some(minus_s)) = smoothed {
            let (plus_di, minus_di) = if tr_s > 0.0 {
                (100.0 * plus_s / tr_s, 100.0 * minus_s / tr_s)
            } else {
                (0.0, 0.0)
            };
            let di_sum = plus_di + minus_di;
            let dx = if di_sum > 0.0 {
                100.0 * (plus_di - minus_di).abs() / di_sum
            } else {
                0.0
            };
            if let Some(adx) = adx_avg.push(dx) {
                valid = true;
                point = IndicatorValue::Directional {
                    plus_di,
                    minus_di,
                    adx,
                };
            }
        }

        values.push(IndicatorPoint {
            timestamp: bars[i].timestamp,
            valid,
            value: point,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Dmi(period),
        values,
    }
}
