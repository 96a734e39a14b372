#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::{BTreeMap, HashMap};
use trendscan::domain::candle::{Candle, DateRange};
use trendscan::domain::error::ScanError;
pub use trendscan::domain::ohlcv::OhlcvBar;
use trendscan::domain::timeframe::Timeframe;
use trendscan::ports::data_port::DataPort;

pub struct MockDataPort {
    pub data: HashMap<(String, Timeframe), Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, timeframe: Timeframe, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert((symbol.to_string(), timeframe), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<OhlcvBar>, ScanError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(ScanError::Data {
                reason: reason.clone(),
            });
        }
        match self.data.get(&(symbol.to_string(), timeframe)) {
            Some(bars) if !bars.is_empty() => Ok(bars.clone()),
            _ => Err(ScanError::NoData {
                symbol: symbol.to_string(),
                timeframe: timeframe.to_string(),
            }),
        }
    }
}

pub fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 10, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

pub fn at_hour(hour: usize) -> NaiveDateTime {
    base_time() + chrono::Duration::hours(hour as i64)
}

pub fn whole_range() -> DateRange {
    DateRange::new(base_time(), at_hour(24 * 365))
}

/// Candle with the given averages and range; volatility 10 pips, +DI above -DI.
pub fn candle(hour: usize, fast_ma: f64, slow_ma: f64, low: f64, high: f64, close: f64) -> Candle {
    Candle {
        timestamp: at_hour(hour),
        open: close,
        high,
        low,
        close,
        volume: 100,
        fast_ma,
        slow_ma,
        volatility: 0.0010,
        plus_di: 25.0,
        minus_di: 15.0,
        extra: BTreeMap::new(),
    }
}

/// Hourly bars oscillating around 1.10 so the averages cross repeatedly.
pub fn wave_bars(count: usize, period: f64) -> Vec<OhlcvBar> {
    (0..count)
        .map(|i| {
            let t = i as f64;
            let close = 1.1000 + 0.0040 * (t / period).sin() + 0.0005 * (t / 3.0).cos();
            let open = close - 0.0002 * (t / 5.0).sin();
            OhlcvBar {
                timestamp: at_hour(i),
                open,
                high: open.max(close) + 0.0006,
                low: open.min(close) - 0.0006,
                close,
                volume: 1000 + i as i64,
            }
        })
        .collect()
}

pub fn raw_csv(bars: &[OhlcvBar]) -> String {
    let mut out = String::from("datetime,open,high,low,close,volume\n");
    for b in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.timestamp.format("%Y-%m-%d %H:%M:%S"),
            b.open,
            b.high,
            b.low,
            b.close,
            b.volume
        ));
    }
    out
}
