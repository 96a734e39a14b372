//! Raw OHLCV bar as read from the data source, before indicators are attached.

use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl OhlcvBar {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_bar() -> OhlcvBar {
        OhlcvBar {
            timestamp: NaiveDate::from_ymd_opt(2025, 10, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            open: 1.1000,
            high: 1.1020,
            low: 1.1000,
            close: 1.1010,
            volume: 1_200,
        }
    }

    #[test]
    fn true_range_hl_dominates() {
        let bar = sample_bar();
        assert!((bar.true_range(1.1010) - 0.0020).abs() < 1e-12);
    }

    #[test]
    fn true_range_gap_up() {
        let bar = sample_bar();
        // |1.1020 - 1.0970| = 0.0050
        assert!((bar.true_range(1.0970) - 0.0050).abs() < 1e-12);
    }

    #[test]
    fn true_range_gap_down() {
        let bar = sample_bar();
        // |1.1000 - 1.1060| = 0.0060
        assert!((bar.true_range(1.1060) - 0.0060).abs() < 1e-12);
    }
}
