//! Configuration validation.
//!
//! Validates all config fields before a detection run.

use crate::domain::error::ScanError;
use crate::domain::timeframe::Timeframe;
use crate::ports::config_port::ConfigPort;

pub fn validate_run_config(config: &dyn ConfigPort) -> Result<(), ScanError> {
    validate_data_section(config)?;
    validate_analysis_dates(config)?;
    validate_indicators(config)?;
    validate_strategy(config)?;
    validate_trace_window(config)?;
    Ok(())
}

fn validate_data_section(config: &dyn ConfigPort) -> Result<(), ScanError> {
    config.require_string("data", "symbol")?;
    for key in ["timeframe", "aux_timeframe"] {
        if let Some(raw) = config.get_string("data", key) {
            raw.parse::<Timeframe>()
                .map_err(|e| ScanError::invalid("data", key, e.to_string()))?;
        }
    }
    Ok(())
}

fn validate_analysis_dates(config: &dyn ConfigPort) -> Result<(), ScanError> {
    let start = config
        .get_timestamp("analysis", "start_date")?
        .ok_or_else(|| missing("analysis", "start_date"))?;
    let end = config
        .get_timestamp("analysis", "end_date")?
        .ok_or_else(|| missing("analysis", "end_date"))?;

    if start > end {
        return Err(ScanError::invalid(
            "analysis",
            "start_date",
            "start_date must not be after end_date",
        ));
    }
    Ok(())
}

fn validate_indicators(config: &dyn ConfigPort) -> Result<(), ScanError> {
    for key in [
        "fast_period",
        "slow_period",
        "long_period",
        "atr_period",
        "dmi_period",
        "rsi_period",
        "macd_fast",
        "macd_slow",
        "macd_signal",
        "volume_sma_period",
    ] {
        if config.get_int("indicators", key, 1) < 1 {
            return Err(ScanError::invalid("indicators", key, format!("{key} must be at least 1")));
        }
    }

    let fast = config.get_int("indicators", "fast_period", 20);
    let slow = config.get_int("indicators", "slow_period", 50);
    if fast >= slow {
        return Err(ScanError::invalid(
            "indicators",
            "fast_period",
            "fast_period must be shorter than slow_period",
        ));
    }

    if config.get_int("indicators", "macd_fast", 12) >= config.get_int("indicators", "macd_slow", 26) {
        return Err(ScanError::invalid(
            "indicators",
            "macd_fast",
            "macd_fast must be shorter than macd_slow",
        ));
    }

    if config.get_double("indicators", "atr_adjustment", 0.99) <= 0.0 {
        return Err(ScanError::invalid(
            "indicators",
            "atr_adjustment",
            "atr_adjustment must be positive",
        ));
    }
    Ok(())
}

fn validate_strategy(config: &dyn ConfigPort) -> Result<(), ScanError> {
    if config.get_double("strategy", "min_separation_pips", 3.0) < 0.0 {
        return Err(ScanError::invalid(
            "strategy",
            "min_separation_pips",
            "min_separation_pips must be non-negative",
        ));
    }

    if config.get_double("strategy", "stop_loss_pips", 20.0) <= 0.0 {
        return Err(ScanError::invalid(
            "strategy",
            "stop_loss_pips",
            "stop_loss_pips must be positive",
        ));
    }

    if config.get_bool("strategy", "use_directional_filter", false)
        && config.get_double("strategy", "directional_min_diff", 5.0) < 0.0
    {
        return Err(ScanError::invalid(
            "strategy",
            "directional_min_diff",
            "directional_min_diff must be non-negative",
        ));
    }

    if config.get_bool("strategy", "use_breakeven_by_volatility", false)
        && config.get_double("strategy", "breakeven_volatility_multiplier", 1.0) <= 0.0
    {
        return Err(ScanError::invalid(
            "strategy",
            "breakeven_volatility_multiplier",
            "breakeven_volatility_multiplier must be positive",
        ));
    }

    if config.get_bool("strategy", "use_volatility_target", false)
        && config.get_double("strategy", "target_volatility_multiplier", 2.0) <= 0.0
    {
        return Err(ScanError::invalid(
            "strategy",
            "target_volatility_multiplier",
            "target_volatility_multiplier must be positive",
        ));
    }
    Ok(())
}

fn validate_trace_window(config: &dyn ConfigPort) -> Result<(), ScanError> {
    let start = config.get_timestamp("debug", "trace_start")?;
    let end = config.get_timestamp("debug", "trace_end")?;
    match (start, end) {
        (Some(s), Some(e)) if s > e => Err(ScanError::invalid(
            "debug",
            "trace_start",
            "trace_start must not be after trace_end",
        )),
        (Some(_), None) => Err(missing("debug", "trace_end")),
        (None, Some(_)) => Err(missing("debug", "trace_start")),
        _ => Ok(()),
    }
}

fn missing(section: &str, key: &str) -> ScanError {
    ScanError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    }
}
