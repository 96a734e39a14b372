//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::candle::{Candle, DateRange, validate_series};
use crate::domain::config_validation::validate_run_config;
use crate::domain::detector::{DetectionRun, DetectorConfig, SetupDetector};
use crate::domain::error::ScanError;
use crate::domain::filter::{DirectionalFilter, FilterStats};
use crate::domain::indicator::{IndicatorParams, attach_indicators, indicator_summary};
use crate::domain::instrument::InstrumentScale;
use crate::domain::observer::LogObserver;
use crate::domain::run_config::RunConfig;
use crate::domain::setup::{ExitReason, SetupRecord};
use crate::domain::summary::Summary;
use crate::domain::timeframe::{Timeframe, parse_timestamp};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "trendscan", about = "Moving-average crossover setup detector")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Detect setups over the configured analysis window
    Detect {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        /// Print results without writing CSV files
        #[arg(long)]
        no_write: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show pip scale for a symbol, and its data range when a config is given
    SymbolInfo {
        #[arg(long)]
        symbol: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Detect {
            config,
            symbol,
            start,
            end,
            no_write,
        } => run_detect(
            &config,
            symbol.as_deref(),
            start.as_deref(),
            end.as_deref(),
            no_write,
        ),
        Command::Validate { config } => run_validate(&config),
        Command::SymbolInfo { symbol, config } => run_symbol_info(&symbol, config.as_deref()),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn fail(err: ScanError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

fn timeframe(config: &dyn ConfigPort, key: &str, default: Timeframe) -> Result<Timeframe, ScanError> {
    match config.get_string("data", key) {
        Some(raw) => raw
            .parse::<Timeframe>()
            .map_err(|e| ScanError::invalid("data", key, e.to_string())),
        None => Ok(default),
    }
}

fn period(config: &dyn ConfigPort, key: &str, default: usize) -> Result<usize, ScanError> {
    let value = config.get_int("indicators", key, default as i64);
    usize::try_from(value)
        .ok()
        .filter(|&v| v > 0)
        .ok_or_else(|| ScanError::invalid("indicators", key, format!("{key} must be at least 1")))
}

pub fn build_run_config(config: &dyn ConfigPort) -> Result<RunConfig, ScanError> {
    let symbol = config.require_string("data", "symbol")?.to_uppercase();

    let start = config
        .get_timestamp("analysis", "start_date")?
        .ok_or_else(|| ScanError::ConfigMissing {
            section: "analysis".into(),
            key: "start_date".into(),
        })?;
    let end = config
        .get_timestamp("analysis", "end_date")?
        .ok_or_else(|| ScanError::ConfigMissing {
            section: "analysis".into(),
            key: "end_date".into(),
        })?;

    let trace = match (
        config.get_timestamp("debug", "trace_start")?,
        config.get_timestamp("debug", "trace_end")?,
    ) {
        (Some(s), Some(e)) => Some(DateRange::new(s, e)),
        _ => None,
    };

    let defaults = IndicatorParams::default();
    let indicators = IndicatorParams {
        fast_period: period(config, "fast_period", defaults.fast_period)?,
        slow_period: period(config, "slow_period", defaults.slow_period)?,
        long_period: period(config, "long_period", defaults.long_period)?,
        atr_period: period(config, "atr_period", defaults.atr_period)?,
        dmi_period: period(config, "dmi_period", defaults.dmi_period)?,
        rsi_period: period(config, "rsi_period", defaults.rsi_period)?,
        macd_fast: period(config, "macd_fast", defaults.macd_fast)?,
        macd_slow: period(config, "macd_slow", defaults.macd_slow)?,
        macd_signal: period(config, "macd_signal", defaults.macd_signal)?,
        volume_sma_period: period(config, "volume_sma_period", defaults.volume_sma_period)?,
        atr_adjustment: config.get_double("indicators", "atr_adjustment", defaults.atr_adjustment),
    };

    let d = DetectorConfig::default();
    let detector = DetectorConfig {
        min_separation_pips: config.get_double("strategy", "min_separation_pips", d.min_separation_pips),
        stop_loss_pips: config.get_double("strategy", "stop_loss_pips", d.stop_loss_pips),
        use_directional_filter: config.get_bool("strategy", "use_directional_filter", d.use_directional_filter),
        directional_min_diff: config.get_double("strategy", "directional_min_diff", d.directional_min_diff),
        use_breakeven_by_volatility: config.get_bool(
            "strategy",
            "use_breakeven_by_volatility",
            d.use_breakeven_by_volatility,
        ),
        breakeven_volatility_multiplier: config.get_double(
            "strategy",
            "breakeven_volatility_multiplier",
            d.breakeven_volatility_multiplier,
        ),
        use_volatility_target: config.get_bool("strategy", "use_volatility_target", d.use_volatility_target),
        target_volatility_multiplier: config.get_double(
            "strategy",
            "target_volatility_multiplier",
            d.target_volatility_multiplier,
        ),
    };

    Ok(RunConfig {
        symbol,
        timeframe: timeframe(config, "timeframe", Timeframe::H1)?,
        aux_timeframe: timeframe(config, "aux_timeframe", Timeframe::H4)?,
        data_dir: PathBuf::from(config.get_string("data", "data_dir").unwrap_or_else(|| "Data".into())),
        results_dir: PathBuf::from(
            config
                .get_string("data", "results_dir")
                .unwrap_or_else(|| "results".into()),
        ),
        range: DateRange::new(start, end),
        indicators,
        detector,
        trace,
    })
}

/// Applies command-line overrides on top of a config-built run.
pub fn apply_overrides(
    mut run_config: RunConfig,
    symbol: Option<&str>,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<RunConfig, ScanError> {
    if let Some(s) = symbol.map(str::trim).filter(|s| !s.is_empty()) {
        run_config.symbol = s.to_uppercase();
    }
    if let Some(raw) = start {
        run_config.range.start = parse_timestamp(raw)
            .ok_or_else(|| ScanError::invalid("analysis", "start_date", format!("invalid timestamp {raw:?}")))?;
    }
    if let Some(raw) = end {
        run_config.range.end = parse_timestamp(raw)
            .ok_or_else(|| ScanError::invalid("analysis", "end_date", format!("invalid timestamp {raw:?}")))?;
    }
    if run_config.range.start > run_config.range.end {
        return Err(ScanError::invalid(
            "analysis",
            "start_date",
            "start_date must not be after end_date",
        ));
    }
    Ok(run_config)
}

/// Output of one detection pipeline run.
#[derive(Debug)]
pub struct PipelineOutput {
    /// The full processed series, warm-up rows removed.
    pub candles: Vec<Candle>,
    pub run: DetectionRun,
    pub summary: Summary,
}

fn load_candles(
    data_port: &dyn DataPort,
    symbol: &str,
    timeframe: Timeframe,
    params: &IndicatorParams,
) -> Result<Vec<Candle>, ScanError> {
    let bars = data_port.fetch_bars(symbol, timeframe)?;
    let minimum = params.warmup() + 1;
    if bars.len() < minimum {
        return Err(ScanError::InsufficientData {
            symbol: symbol.to_string(),
            bars: bars.len(),
            minimum,
        });
    }

    let candles = attach_indicators(&bars, params);
    validate_series(&candles)?;
    log::info!(
        "{} {}: {} bars, {} candles after warm-up",
        symbol,
        timeframe,
        bars.len(),
        candles.len()
    );
    for stats in indicator_summary(&candles) {
        log::info!(
            "{} {} {}: min {:.5} | max {:.5} | last {:.5}",
            symbol,
            timeframe,
            stats.name,
            stats.min,
            stats.max,
            stats.last
        );
    }
    Ok(candles)
}

pub fn run_detection_pipeline(
    data_port: &dyn DataPort,
    run_config: &RunConfig,
) -> Result<PipelineOutput, ScanError> {
    let symbol = run_config.symbol.as_str();
    let candles = load_candles(data_port, symbol, run_config.timeframe, &run_config.indicators)?;

    let aux = if run_config.detector.use_directional_filter {
        match load_candles(data_port, symbol, run_config.aux_timeframe, &run_config.indicators) {
            Ok(series) => Some(series),
            Err(ScanError::NoData { .. } | ScanError::InsufficientData { .. }) => {
                log::warn!(
                    "no usable {} {} data; {} filter will pass every entry",
                    symbol,
                    run_config.aux_timeframe,
                    DirectionalFilter::NAME
                );
                None
            }
            Err(e) => return Err(e),
        }
    } else {
        None
    };

    let scale = InstrumentScale::for_symbol(symbol);
    log::info!("{}: {}", symbol, scale.description());

    let detector = SetupDetector::new(scale, run_config.detector.clone());
    let mut observer = match run_config.trace {
        Some(window) => LogObserver::new().with_trace_window(window),
        None => LogObserver::new(),
    };

    let run = detector.detect_with_observer(&candles, &run_config.range, aux.as_deref(), &mut observer);
    log::info!(
        "scanned {} candles from {} to {}",
        run.candles_scanned,
        run_config.range.start,
        run_config.range.end
    );

    let summary = Summary::compute(&run.setups);
    Ok(PipelineOutput {
        candles,
        run,
        summary,
    })
}

pub fn print_setups(setups: &[SetupRecord]) {
    if setups.is_empty() {
        eprintln!("\nNo setups found");
        return;
    }

    eprintln!("\n=== Detected Setups: {} ===", setups.len());
    for s in setups {
        eprintln!("\nSetup #{} - {}", s.setup_id, s.direction);
        eprintln!("  Entry:  {} @ {}", s.entry_time, s.entry_price);
        eprintln!("  Stop:   {}", s.stop_loss_price);
        eprintln!("  Exit:   {} @ {}", s.exit_time, s.exit_price);
        eprintln!(
            "  Result: {} | {:+.1} pips | {} candles",
            s.outcome, s.pips, s.candles_held
        );
        eprintln!("  Exit reason: {}", s.exit_reason);
    }
}

pub fn print_summary(symbol: &str, range: &DateRange, summary: &Summary, stats: &FilterStats) {
    eprintln!("\n=== Executive Summary: {} ===", symbol);
    eprintln!("Period:           {} to {}", range.start.date(), range.end.date());
    eprintln!("Total Setups:     {}", summary.total_setups);
    eprintln!(
        "Wins / Losses:    {} / {} ({} break-even)",
        summary.wins, summary.losses, summary.breakevens
    );
    eprintln!("Win Rate:         {:.1}%", summary.win_rate * 100.0);
    eprintln!("Total Pips:       {:+.1}", summary.total_pips);
    eprintln!("Avg per Trade:    {:+.1}", summary.avg_pips);
    eprintln!("Avg Winner:       {:+.1}", summary.avg_winner);
    eprintln!("Avg Loser:        {:+.1}", summary.avg_loser);
    eprintln!("Largest Win:      {:+.1}", summary.largest_win);
    eprintln!("Largest Loss:     {:+.1}", summary.largest_loss);
    eprintln!("Avg Hold:         {:.1} candles", summary.avg_candles_held);

    if summary.total_setups > 0 {
        eprintln!("\n=== Exits ===");
        for reason in ExitReason::ALL {
            let count = summary.exits_by(reason);
            if count > 0 {
                eprintln!("  {:<20}{}", reason.label(), count);
            }
        }
    }

    if stats.total_rejected() > 0 || stats.breakeven_activations > 0 {
        eprintln!("\n=== Filters ===");
        for (name, count) in &stats.rejected {
            eprintln!("  {:<20}{} rejected", name, count);
        }
        eprintln!("  {:<20}{}", "break-even armed", stats.breakeven_activations);
    }
}

fn run_detect(
    config_path: &Path,
    symbol: Option<&str>,
    start: Option<&str>,
    end: Option<&str>,
    no_write: bool,
) -> ExitCode {
    // Stage 1: Load and validate config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_run_config(&adapter) {
        return fail(e);
    }

    // Stage 2: Build run parameters
    let run_config = match build_run_config(&adapter).and_then(|c| apply_overrides(c, symbol, start, end)) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };

    // Stage 3: Load data, compute indicators, detect
    eprintln!(
        "Scanning {} {} from {} to {}",
        run_config.symbol, run_config.timeframe, run_config.range.start, run_config.range.end
    );
    let csv = CsvAdapter::new(run_config.data_dir.clone(), run_config.results_dir.clone());
    let output = match run_detection_pipeline(&csv, &run_config) {
        Ok(o) => o,
        Err(e) => return fail(e),
    };

    // Stage 4: Console report
    print_setups(&output.run.setups);
    print_summary(
        &run_config.symbol,
        &run_config.range,
        &output.summary,
        &output.run.stats,
    );

    if no_write {
        return ExitCode::SUCCESS;
    }

    // Stage 5: Write processed series and results
    match csv.write_candles(&run_config.symbol, run_config.timeframe, &output.candles) {
        Ok(path) => eprintln!("\nProcessed data written to: {}", path.display()),
        Err(e) => return fail(e),
    }

    if output.run.setups.is_empty() {
        return ExitCode::SUCCESS;
    }

    match csv.write_setups(
        &run_config.symbol,
        run_config.timeframe,
        &run_config.range,
        &output.run.setups,
    ) {
        Ok(path) => {
            eprintln!("Results written to: {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let run_config = match validate_run_config(&adapter).and_then(|()| build_run_config(&adapter)) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };

    let d = &run_config.detector;
    eprintln!("Configuration is valid.");
    eprintln!("  Symbol:      {} {}", run_config.symbol, run_config.timeframe);
    eprintln!(
        "  Window:      {} to {}",
        run_config.range.start, run_config.range.end
    );
    eprintln!(
        "  Averages:    EMA({}) / EMA({})",
        run_config.indicators.fast_period, run_config.indicators.slow_period
    );
    eprintln!("  Separation:  {} pips", d.min_separation_pips);
    eprintln!("  Stop loss:   {} pips", d.stop_loss_pips);
    if d.use_directional_filter {
        eprintln!(
            "  Directional: {} DI diff >= {}",
            run_config.aux_timeframe, d.directional_min_diff
        );
    }
    if d.use_breakeven_by_volatility {
        eprintln!("  Break-even:  {}x volatility", d.breakeven_volatility_multiplier);
    }
    if d.use_volatility_target {
        eprintln!("warning: use_volatility_target is reserved and has no effect");
    }
    ExitCode::SUCCESS
}

fn run_symbol_info(symbol: &str, config_path: Option<&Path>) -> ExitCode {
    let symbol = symbol.trim().to_uppercase();
    let scale = InstrumentScale::for_symbol(&symbol);
    println!("Symbol:      {}", symbol);
    println!("Pip factor:  {}", scale.pip_factor);
    println!("Decimals:    {}", scale.decimals);
    println!("Scale:       {}", scale.description());

    let Some(path) = config_path else {
        return ExitCode::SUCCESS;
    };
    let adapter = match load_config(path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let data_dir = adapter
        .get_string("data", "data_dir")
        .unwrap_or_else(|| "Data".into());
    let csv = CsvAdapter::new(PathBuf::from(data_dir), PathBuf::new());

    for tf in [Timeframe::M15, Timeframe::M30, Timeframe::H1, Timeframe::H4, Timeframe::H6, Timeframe::D1] {
        match csv.get_data_range(&symbol, tf) {
            Ok(Some((first, last, count))) => {
                println!("{:<4} {} to {} ({} bars)", tf.as_str(), first, last, count)
            }
            Ok(None) => {}
            Err(e) => return fail(e),
        }
    }
    ExitCode::SUCCESS
}
