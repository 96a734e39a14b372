//! CSV file adapter: raw bar input, processed series and setup results output.

use crate::domain::candle::{Candle, DateRange};
use crate::domain::error::ScanError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::setup::SetupRecord;
use crate::domain::timeframe::{Timeframe, parse_timestamp};
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;
use std::fs;
use std::path::{Path, PathBuf};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SETUP_HEADER: [&str; 11] = [
    "setup_id",
    "entry_date",
    "direction",
    "entry_price",
    "sl_price",
    "exit_date",
    "exit_price",
    "exit_reason",
    "outcome",
    "pips",
    "candles_held",
];

pub struct CsvAdapter {
    data_dir: PathBuf,
    results_dir: PathBuf,
}

impl CsvAdapter {
    pub fn new(data_dir: PathBuf, results_dir: PathBuf) -> Self {
        Self {
            data_dir,
            results_dir,
        }
    }

    pub fn raw_path(&self, symbol: &str, timeframe: Timeframe) -> PathBuf {
        self.data_dir
            .join(format!("{}_{}_raw.csv", symbol.to_uppercase(), timeframe))
    }

    pub fn processed_path(&self, symbol: &str, timeframe: Timeframe) -> PathBuf {
        self.results_dir
            .join(format!("{}_{}_processed.csv", symbol.to_uppercase(), timeframe))
    }

    pub fn results_path(&self, symbol: &str, timeframe: Timeframe, range: &DateRange) -> PathBuf {
        self.results_dir.join(format!(
            "{}_{}_results_{}_{}.csv",
            symbol.to_uppercase(),
            timeframe,
            range.start.format("%Y%m%d"),
            range.end.format("%Y%m%d"),
        ))
    }

    fn writer(&self, path: &Path) -> Result<csv::Writer<fs::File>, ScanError> {
        fs::create_dir_all(&self.results_dir)?;
        Ok(csv::Writer::from_path(path)?)
    }
}

fn column(headers: &csv::StringRecord, names: &[&str], path: &Path) -> Result<usize, ScanError> {
    headers
        .iter()
        .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
        .ok_or_else(|| ScanError::Data {
            reason: format!("{}: missing column {}", path.display(), names[0]),
        })
}

fn field<'r>(record: &'r csv::StringRecord, idx: usize, name: &str, row: usize) -> Result<&'r str, ScanError> {
    record
        .get(idx)
        .map(str::trim)
        .ok_or_else(|| ScanError::InvalidValue {
            field: name.to_string(),
            value: String::new(),
            row,
        })
}

fn parse_price(record: &csv::StringRecord, idx: usize, name: &str, row: usize) -> Result<f64, ScanError> {
    let raw = field(record, idx, name, row)?;
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ScanError::InvalidValue {
            field: name.to_string(),
            value: raw.to_string(),
            row,
        })
}

fn parse_volume(record: &csv::StringRecord, idx: usize, row: usize) -> Result<i64, ScanError> {
    let raw = field(record, idx, "volume", row)?;
    raw.parse::<i64>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v as i64))
        .ok_or_else(|| ScanError::InvalidValue {
            field: "volume".to_string(),
            value: raw.to_string(),
            row,
        })
}

impl DataPort for CsvAdapter {
    fn fetch_bars(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<OhlcvBar>, ScanError> {
        let path = self.raw_path(symbol, timeframe);
        if !path.exists() {
            return Err(ScanError::NoData {
                symbol: symbol.to_uppercase(),
                timeframe: timeframe.to_string(),
            });
        }

        let mut rdr = csv::Reader::from_path(&path)?;
        let headers = rdr.headers()?.clone();
        let ts_col = column(&headers, &["datetime", "time", "timestamp"], &path)?;
        let open_col = column(&headers, &["open"], &path)?;
        let high_col = column(&headers, &["high"], &path)?;
        let low_col = column(&headers, &["low"], &path)?;
        let close_col = column(&headers, &["close"], &path)?;
        let volume_col = column(&headers, &["volume", "tick_volume"], &path)?;

        let mut bars = Vec::new();
        for (idx, result) in rdr.records().enumerate() {
            let record = result?;
            let row = idx + 1;

            let raw_ts = field(&record, ts_col, "datetime", row)?;
            let timestamp = parse_timestamp(raw_ts).ok_or_else(|| ScanError::InvalidValue {
                field: "datetime".to_string(),
                value: raw_ts.to_string(),
                row,
            })?;

            bars.push(OhlcvBar {
                timestamp,
                open: parse_price(&record, open_col, "open", row)?,
                high: parse_price(&record, high_col, "high", row)?,
                low: parse_price(&record, low_col, "low", row)?,
                close: parse_price(&record, close_col, "close", row)?,
                volume: parse_volume(&record, volume_col, row)?,
            });
        }

        if bars.is_empty() {
            return Err(ScanError::NoData {
                symbol: symbol.to_uppercase(),
                timeframe: timeframe.to_string(),
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        log::debug!("read {} bars from {}", bars.len(), path.display());
        Ok(bars)
    }
}

impl ReportPort for CsvAdapter {
    fn write_setups(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        range: &DateRange,
        setups: &[SetupRecord],
    ) -> Result<PathBuf, ScanError> {
        let path = self.results_path(symbol, timeframe, range);
        let mut wtr = self.writer(&path)?;
        wtr.write_record(SETUP_HEADER)?;

        for s in setups {
            wtr.write_record([
                s.setup_id.to_string(),
                s.entry_time.format(TIMESTAMP_FORMAT).to_string(),
                s.direction.as_str().to_string(),
                s.entry_price.to_string(),
                s.stop_loss_price.to_string(),
                s.exit_time.format(TIMESTAMP_FORMAT).to_string(),
                s.exit_price.to_string(),
                s.exit_reason.label().to_string(),
                s.outcome.as_str().to_string(),
                format!("{:.1}", s.pips),
                s.candles_held.to_string(),
            ])?;
        }

        wtr.flush()?;
        Ok(path)
    }

    fn write_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        candles: &[Candle],
    ) -> Result<PathBuf, ScanError> {
        let path = self.processed_path(symbol, timeframe);
        let mut wtr = self.writer(&path)?;

        let extra_keys: Vec<String> = candles
            .first()
            .map(|c| c.extra.keys().cloned().collect())
            .unwrap_or_default();

        let mut header: Vec<String> = [
            "datetime",
            "open",
            "high",
            "low",
            "close",
            "volume",
            "fast_ma",
            "slow_ma",
            "volatility",
            "plus_di",
            "minus_di",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        header.extend(extra_keys.iter().cloned());
        wtr.write_record(&header)?;

        for c in candles {
            let mut row = vec![
                c.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                c.open.to_string(),
                c.high.to_string(),
                c.low.to_string(),
                c.close.to_string(),
                c.volume.to_string(),
                c.fast_ma.to_string(),
                c.slow_ma.to_string(),
                c.volatility.to_string(),
                c.plus_di.to_string(),
                c.minus_di.to_string(),
            ];
            row.extend(
                extra_keys
                    .iter()
                    .map(|k| c.extra.get(k).map(|v| v.to_string()).unwrap_or_default()),
            );
            wtr.write_record(&row)?;
        }

        wtr.flush()?;
        Ok(path)
    }
}
