//! Rate-limited warnings for conditions that can recur every timestep.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::FloatValue;

/// Tracks a warning that is reported in full once and counted afterwards.
///
/// Later occurrences log at debug level only; the count and the range of
/// offending values are kept for an end-of-run summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecurringWarning {
    message: String,
    count: usize,
    min: Option<FloatValue>,
    max: Option<FloatValue>,
}

impl RecurringWarning {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// Record an occurrence with its offending value.
    pub fn record(&mut self, value: FloatValue) {
        self.count += 1;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));

        if self.count == 1 {
            warn!("{} (value={:.5})", self.message, value);
        } else {
            debug!(
                "{} (value={:.5}, occurrence {})",
                self.message, value, self.count
            );
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Smallest and largest recorded values.
    pub fn range(&self) -> Option<(FloatValue, FloatValue)> {
        self.min.zip(self.max)
    }

    /// Summary line, or `None` if the warning never fired.
    pub fn summary(&self) -> Option<String> {
        let (min, max) = self.range()?;
        Some(format!(
            "{}: {} occurrences, min={:.5}, max={:.5}",
            self.message, self.count, min, max
        ))
    }
}
