//! Configuration access port trait.

use crate::domain::error::ScanError;
use crate::domain::timeframe::parse_timestamp;
use chrono::NaiveDateTime;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;

    fn require_string(&self, section: &str, key: &str) -> Result<String, ScanError> {
        self.get_string(section, key)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ScanError::ConfigMissing {
                section: section.to_string(),
                key: key.to_string(),
            })
    }

    /// `Ok(None)` when the key is absent, an error when it does not parse.
    fn get_timestamp(&self, section: &str, key: &str) -> Result<Option<NaiveDateTime>, ScanError> {
        match self.get_string(section, key) {
            None => Ok(None),
            Some(raw) => parse_timestamp(&raw).map(Some).ok_or_else(|| {
                ScanError::invalid(
                    section,
                    key,
                    format!("invalid timestamp {raw:?} (expected YYYY-MM-DD[ HH:MM[:SS]])"),
                )
            }),
        }
    }
}
