//! Pip scale of the traded symbol.

const TWO_DECIMAL_PAIRS: [&str; 7] = [
    "USDJPY", "EURJPY", "GBPJPY", "AUDJPY", "CHFJPY", "CADJPY", "NZDJPY",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstrumentScale {
    pub pip_factor: f64,
    pub decimals: u32,
}

impl InstrumentScale {
    pub const MAJOR: InstrumentScale = InstrumentScale {
        pip_factor: 10_000.0,
        decimals: 4,
    };

    pub const JPY: InstrumentScale = InstrumentScale {
        pip_factor: 100.0,
        decimals: 2,
    };

    pub fn for_symbol(symbol: &str) -> Self {
        let upper = symbol.to_uppercase();
        if TWO_DECIMAL_PAIRS.contains(&upper.as_str()) {
            Self::JPY
        } else {
            Self::MAJOR
        }
    }

    pub fn description(&self) -> &'static str {
        if self.decimals == 2 {
            "JPY pair (2 decimals)"
        } else {
            "Major pair (4 decimals)"
        }
    }

    pub fn to_pips(&self, price_distance: f64) -> f64 {
        price_distance * self.pip_factor
    }

    pub fn to_price(&self, pips: f64) -> f64 {
        pips / self.pip_factor
    }

    pub fn round_price(&self, price: f64) -> f64 {
        let m = 10f64.powi(self.decimals as i32);
        (price * m).round() / m
    }
}

/// Pips are reported with one decimal.
pub fn round_pips(pips: f64) -> f64 {
    (pips * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn jpy_pairs_use_two_decimals() {
        for symbol in ["USDJPY", "eurjpy", "GbpJpy", "NZDJPY"] {
            assert_eq!(InstrumentScale::for_symbol(symbol), InstrumentScale::JPY);
        }
    }

    #[test]
    fn majors_use_four_decimals() {
        for symbol in ["EURUSD", "gbpusd", "AUDNZD", "JPYUSD"] {
            assert_eq!(InstrumentScale::for_symbol(symbol), InstrumentScale::MAJOR);
        }
    }

    #[test]
    fn descriptions() {
        assert_eq!(InstrumentScale::JPY.description(), "JPY pair (2 decimals)");
        assert_eq!(InstrumentScale::MAJOR.description(), "Major pair (4 decimals)");
    }

    #[test]
    fn pip_conversion() {
        assert_relative_eq!(InstrumentScale::MAJOR.to_pips(0.0020), 20.0, epsilon = 1e-9);
        assert_relative_eq!(InstrumentScale::JPY.to_pips(0.20), 20.0, epsilon = 1e-9);
        assert_relative_eq!(InstrumentScale::MAJOR.to_price(20.0), 0.0020, epsilon = 1e-12);
    }

    #[test]
    fn price_rounding() {
        assert_eq!(InstrumentScale::MAJOR.round_price(1.123_46), 1.1235);
        assert_eq!(InstrumentScale::JPY.round_price(151.236), 151.24);
    }

    #[test]
    fn pip_rounding() {
        assert_eq!(round_pips(-19.999_999_9), -20.0);
        assert_eq!(round_pips(15.04), 15.0);
        assert_eq!(round_pips(0.0), 0.0);
    }
}
