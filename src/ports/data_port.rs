//! Data access port trait.

use crate::domain::error::ScanError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::timeframe::Timeframe;
use chrono::NaiveDateTime;

pub trait DataPort {
    /// Raw bars for one symbol and timeframe, oldest first.
    fn fetch_bars(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<OhlcvBar>, ScanError>;

    /// First timestamp, last timestamp and bar count, or `None` when no data exists.
    fn get_data_range(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, ScanError> {
        let bars = match self.fetch_bars(symbol, timeframe) {
            Ok(bars) => bars,
            Err(ScanError::NoData { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Ok(Some((first.timestamp, last.timestamp, bars.len()))),
            _ => Ok(None),
        }
    }
}
