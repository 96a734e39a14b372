//! Report output port trait.

use crate::domain::candle::{Candle, DateRange};
use crate::domain::error::ScanError;
use crate::domain::setup::SetupRecord;
use crate::domain::timeframe::Timeframe;
use std::path::PathBuf;

/// Port for persisting detection results. Both methods return the written path.
pub trait ReportPort {
    fn write_setups(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        range: &DateRange,
        setups: &[SetupRecord],
    ) -> Result<PathBuf, ScanError>;

    fn write_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        candles: &[Candle],
    ) -> Result<PathBuf, ScanError>;
}
