//! Setup detection run: drives the crossover state machine over the analysis
//! window, hands confirmed entries to the exit simulator and collects the
//! resulting trade records.

use crate::domain::candle::{Candle, DateRange, window};
use crate::domain::crossover::{ScanEvent, ScanState, detect_cross, separation_pips};
use crate::domain::exit::ExitSimulator;
use crate::domain::filter::{DirectionalFilter, FilterChain, FilterStats};
use crate::domain::instrument::InstrumentScale;
use crate::domain::observer::{NoopObserver, ScanObserver};
use crate::domain::setup::{ExitReason, SetupRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    pub min_separation_pips: f64,
    pub stop_loss_pips: f64,
    pub use_directional_filter: bool,
    pub directional_min_diff: f64,
    pub use_breakeven_by_volatility: bool,
    pub breakeven_volatility_multiplier: f64,
    /// Reserved: not part of the exit chain.
    pub use_volatility_target: bool,
    /// Reserved: not part of the exit chain.
    pub target_volatility_multiplier: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_separation_pips: 3.0,
            stop_loss_pips: 20.0,
            use_directional_filter: false,
            directional_min_diff: 5.0,
            use_breakeven_by_volatility: false,
            breakeven_volatility_multiplier: 1.0,
            use_volatility_target: false,
            target_volatility_multiplier: 2.0,
        }
    }
}

/// Everything one detection run produces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionRun {
    pub setups: Vec<SetupRecord>,
    pub stats: FilterStats,
    /// Candles inside the analysis window.
    pub candles_scanned: usize,
}

pub struct SetupDetector {
    scale: InstrumentScale,
    config: DetectorConfig,
    filters: FilterChain,
    simulator: ExitSimulator,
}

impl SetupDetector {
    pub fn new(scale: InstrumentScale, config: DetectorConfig) -> Self {
        let mut filters = FilterChain::new();
        if config.use_directional_filter {
            filters = filters.with(DirectionalFilter::new(config.directional_min_diff));
        }
        let mut simulator = ExitSimulator::new(scale, config.stop_loss_pips);
        if config.use_breakeven_by_volatility {
            simulator = simulator.with_breakeven(config.breakeven_volatility_multiplier);
        }
        Self {
            scale,
            config,
            filters,
            simulator,
        }
    }

    /// Replaces the filter chain built from the configuration.
    pub fn with_filters(mut self, filters: FilterChain) -> Self {
        self.filters = filters;
        self
    }

    pub fn scale(&self) -> InstrumentScale {
        self.scale
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn detect(&self, series: &[Candle], range: &DateRange, aux: Option<&[Candle]>) -> DetectionRun {
        self.detect_with_observer(series, range, aux, &mut NoopObserver)
    }

    pub fn detect_with_observer(
        &self,
        series: &[Candle],
        range: &DateRange,
        aux: Option<&[Candle]>,
        observer: &mut dyn ScanObserver,
    ) -> DetectionRun {
        let candles = window(series, range);
        let mut run = DetectionRun {
            candles_scanned: candles.len(),
            ..DetectionRun::default()
        };

        let mut state = ScanState::Idle;
        let mut i = 1;

        while i < candles.len() {
            let candle = &candles[i];

            if let Some(direction) = detect_cross(candles, i) {
                state = state.on(ScanEvent::CrossDetected(direction));
                observer.on_cross(candle, direction);
                i += 1;
                continue;
            }

            if let ScanState::Armed(direction) = state {
                let pips = separation_pips(candle, &self.scale);
                if pips >= self.config.min_separation_pips {
                    state = state.on(ScanEvent::SeparationMet);
                    observer.on_separation(candle, direction, pips);
                }
            }

            let ScanState::Separated(direction) = state else {
                i += 1;
                continue;
            };

            let touched = candle.touches_fast_ma();
            observer.on_touch_checked(candle, touched);
            if !touched {
                i += 1;
                continue;
            }
            state = state.on(ScanEvent::TouchDetected);

            let rejected = self.filters.rejections(direction, candle.timestamp, aux);
            if !rejected.is_empty() {
                for name in rejected {
                    *run.stats.rejected.entry(name).or_default() += 1;
                    observer.on_filter_rejected(candle, direction, name);
                }
                i += 1;
                continue;
            }

            let entry_price = candle.fast_ma;
            observer.on_entry(candle, direction, entry_price);

            let Some(exit) = self.simulator.simulate(candles, i, direction, entry_price) else {
                break;
            };
            if exit.breakeven_armed {
                run.stats.breakeven_activations += 1;
            }

            let record = SetupRecord {
                setup_id: run.setups.len() + 1,
                entry_time: candle.timestamp,
                direction,
                entry_price: self.scale.round_price(entry_price),
                stop_loss_price: self
                    .scale
                    .round_price(self.simulator.stop_price(direction, entry_price)),
                exit_time: exit.exit_time,
                exit_price: self.scale.round_price(exit.exit_price),
                exit_reason: exit.reason,
                outcome: exit.outcome,
                pips: exit.pips,
                candles_held: exit.candles_held,
            };
            observer.on_exit(&record);
            run.setups.push(record);

            if exit.reason == ExitReason::EndOfData {
                break;
            }
            state = state.on(ScanEvent::ExitFired(exit.reason));
            i = exit.exit_index + 1;
        }

        run
    }
}
