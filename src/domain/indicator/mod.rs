//! Technical indicators attached to raw bars before the scan.
//!
//! - `IndicatorPoint`: one point of an indicator time series
//! - `IndicatorValue`: the shape of a point's value
//! - `IndicatorType`: indicator identity + parameters
//! - `IndicatorSeries`: a time series of indicator values
//!
//! [`attach_indicators`] combines the series into [`Candle`]s.

pub mod atr;
pub mod dmi;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

use crate::domain::candle::Candle;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone)]
pub struct IndicatorPoint {
    pub timestamp: NaiveDateTime,
    pub valid: bool,
    pub value: IndicatorValue,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorValue {
    Simple(f64),
    Directional { plus_di: f64, minus_di: f64, adx: f64 },
    Macd { line: f64, signal: f64, histogram: f64 },
}

impl IndicatorValue {
    pub fn simple(&self) -> f64 {
        match self {
            IndicatorValue::Simple(v) => *v,
            IndicatorValue::Directional { adx, .. } => *adx,
            IndicatorValue::Macd { line, .. } => *line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Ema(usize),
    Atr(usize),
    Dmi(usize),
    Rsi(usize),
    Macd { fast: usize, slow: usize, signal: usize },
    VolumeSma(usize),
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub(crate) fn empty(indicator_type: IndicatorType) -> Self {
        Self {
            indicator_type,
            values: Vec::new(),
        }
    }

    fn valid_at(&self, i: usize) -> Option<IndicatorValue> {
        self.values.get(i).filter(|p| p.valid).map(|p| p.value)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::Dmi(period) => write!(f, "DMI({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::VolumeSma(period) => write!(f, "VolumeSMA({})", period),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorParams {
    pub fast_period: usize,
    pub slow_period: usize,
    /// Long trend EMA, attached as `ema200`.
    pub long_period: usize,
    pub atr_period: usize,
    pub dmi_period: usize,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub volume_sma_period: usize,
    /// Multiplier applied to ATR before it becomes the candle's volatility.
    pub atr_adjustment: f64,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            fast_period: 20,
            slow_period: 50,
            long_period: 200,
            atr_period: 20,
            dmi_period: 14,
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            volume_sma_period: 20,
            atr_adjustment: 0.99,
        }
    }
}

impl IndicatorParams {
    /// Bars needed before the first candle with every indicator valid.
    pub fn warmup(&self) -> usize {
        let dmi = self.dmi_period * 2;
        let rsi = self.rsi_period + 1;
        let macd = self.macd_fast.max(self.macd_slow) + self.macd_signal - 1;
        [
            self.fast_period,
            self.slow_period,
            self.long_period,
            self.atr_period,
            dmi,
            rsi,
            macd,
            self.volume_sma_period,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

/// Computes all indicators over `bars` and returns candles for the rows where
/// every indicator is valid. Warm-up rows are dropped.
pub fn attach_indicators(bars: &[OhlcvBar], params: &IndicatorParams) -> Vec<Candle> {
    let fast = ema::calculate_ema(bars, params.fast_period);
    let slow = ema::calculate_ema(bars, params.slow_period);
    let atr = atr::calculate_atr(bars, params.atr_period);
    let dmi = dmi::calculate_dmi(bars, params.dmi_period);
    let long = ema::calculate_ema(bars, params.long_period);
    let rsi = rsi::calculate_rsi(bars, params.rsi_period);
    let macd = macd::calculate_macd(bars, params.macd_fast, params.macd_slow, params.macd_signal);
    let volume_sma = sma::calculate_volume_sma(bars, params.volume_sma_period);

    bars.iter()
        .enumerate()
        .filter_map(|(i, bar)| {
            let fast_ma = fast.valid_at(i)?.simple();
            let slow_ma = slow.valid_at(i)?.simple();
            let volatility = atr.valid_at(i)?.simple() * params.atr_adjustment;
            let IndicatorValue::Directional {
                plus_di,
                minus_di,
                adx,
            } = dmi.valid_at(i)?
            else {
                return None;
            };
            let IndicatorValue::Macd {
                line,
                signal,
                histogram,
            } = macd.valid_at(i)?
            else {
                return None;
            };

            let extra = BTreeMap::from([
                ("adx".to_string(), adx),
                ("ema200".to_string(), long.valid_at(i)?.simple()),
                ("rsi".to_string(), rsi.valid_at(i)?.simple()),
                ("macd".to_string(), line),
                ("macd_signal".to_string(), signal),
                ("macd_histogram".to_string(), histogram),
                ("volume_sma".to_string(), volume_sma.valid_at(i)?.simple()),
            ]);

            Some(Candle {
                timestamp: bar.timestamp,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                volume: bar.volume,
                fast_ma,
                slow_ma,
                volatility,
                plus_di,
                minus_di,
                extra,
            })
        })
        .collect()
}

/// Range of one indicator column over a processed series.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorStats {
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
    pub last: f64,
}

fn column(candle: &Candle, key: &str) -> Option<f64> {
    match key {
        "fast_ma" => Some(candle.fast_ma),
        "slow_ma" => Some(candle.slow_ma),
        "volatility" => Some(candle.volatility),
        "plus_di" => Some(candle.plus_di),
        "minus_di" => Some(candle.minus_di),
        _ => candle.extra.get(key).copied(),
    }
}

const SUMMARY_COLUMNS: [(&str, &str); 11] = [
    ("EMA fast", "fast_ma"),
    ("EMA slow", "slow_ma"),
    ("EMA long", "ema200"),
    ("ATR", "volatility"),
    ("ADX", "adx"),
    ("+DI", "plus_di"),
    ("-DI", "minus_di"),
    ("RSI", "rsi"),
    ("MACD", "macd"),
    ("MACD signal", "macd_signal"),
    ("MACD hist", "macd_histogram"),
];

/// Min, max and last value per indicator. Columns absent from every candle
/// are left out.
pub fn indicator_summary(candles: &[Candle]) -> Vec<IndicatorStats> {
    SUMMARY_COLUMNS
        .iter()
        .filter_map(|&(name, key)| {
            let values: Vec<f64> = candles.iter().filter_map(|c| column(c, key)).collect();
            let last = *values.last()?;
            Some(IndicatorStats {
                name,
                min: values.iter().copied().fold(f64::INFINITY, f64::min),
                max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                last,
            })
        })
        .collect()
}
