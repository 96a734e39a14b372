//! Parameters of one detection run, as assembled from configuration.

use crate::domain::candle::DateRange;
use crate::domain::detector::DetectorConfig;
use crate::domain::indicator::IndicatorParams;
use crate::domain::timeframe::Timeframe;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub aux_timeframe: Timeframe,
    pub data_dir: PathBuf,
    pub results_dir: PathBuf,
    pub range: DateRange,
    pub indicators: IndicatorParams,
    pub detector: DetectorConfig,
    /// Scan transitions inside this window are logged at info level.
    pub trace: Option<DateRange>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_config() -> RunConfig {
        let start = NaiveDate::from_ymd_opt(2025, 9, 23).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 11, 16).unwrap().and_hms_opt(0, 0, 0).unwrap();
        RunConfig {
            symbol: "EURUSD".into(),
            timeframe: Timeframe::H1,
            aux_timeframe: Timeframe::H4,
            data_dir: PathBuf::from("Data"),
            results_dir: PathBuf::from("results"),
            range: DateRange::new(start, end),
            indicators: IndicatorParams::default(),
            detector: DetectorConfig::default(),
            trace: None,
        }
    }

    #[test]
    fn config_with_breakeven() {
        let c = RunConfig {
            detector: DetectorConfig {
                use_breakeven_by_volatility: true,
                breakeven_volatility_multiplier: 1.5,
                ..DetectorConfig::default()
            },
            ..sample_config()
        };
        assert!(c.detector.use_breakeven_by_volatility);
        assert_eq!(c.detector.breakeven_volatility_multiplier, 1.5);
        assert_eq!(c.detector.stop_loss_pips, 20.0);
    }

    #[test]
    fn default_detector_values() {
        let c = sample_config();
        assert_eq!(c.detector.min_separation_pips, 3.0);
        assert!(!c.detector.use_directional_filter);
        assert!(!c.detector.use_volatility_target);
        assert_eq!(c.indicators.fast_period, 20);
        assert_eq!(c.indicators.slow_period, 50);
    }
}
