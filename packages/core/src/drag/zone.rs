//! Hover zone classification
//!
//! The vertical extent of a hovered row is split into three bands: the top
//! band drops before the row, the bottom band after it, and whatever is left
//! in the middle drops inside it as a child.

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Where a drop onto the hovered row would land
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HoverZone {
    /// Sibling, immediately before the candidate
    Before,
    /// Sibling, immediately after the candidate
    After,
    /// Child of the candidate
    Inside,
    /// Candidate is the dragged node or one of its descendants
    Invalid,
}

impl HoverZone {
    pub fn is_valid(self) -> bool {
        !matches!(self, Self::Invalid)
    }
}

/// Vertical bounding box of a rendered row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub top: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    /// Pointer offset as a fraction of the row height, clamped to `[0, 1]`
    ///
    /// A degenerate (zero or negative height) row reports the midpoint.
    pub fn fraction(&self, pointer_y: f64) -> f64 {
        if self.height.is_nan() || self.height <= 0.0 {
            return 0.5;
        }
        ((pointer_y - self.top) / self.height).clamp(0.0, 1.0)
    }
}

/// Band sizes, as fractions of the row height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneConfig {
    /// Top band mapped to `Before` (default: 0.25)
    pub before_fraction: f64,
    /// Bottom band mapped to `After` (default: 0.25)
    pub after_fraction: f64,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            before_fraction: 0.25,
            after_fraction: 0.25,
        }
    }
}

impl ZoneConfig {
    pub fn with_before(mut self, fraction: f64) -> Self {
        self.before_fraction = fraction;
        self
    }

    pub fn with_after(mut self, fraction: f64) -> Self {
        self.after_fraction = fraction;
        self
    }

    /// Reject fractions outside `[0, 1]` or bands that overlap
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("before_fraction", self.before_fraction),
            ("after_fraction", self.after_fraction),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::invalid(
                    name,
                    format!("{} is outside [0, 1]", value),
                ));
            }
        }

        if self.before_fraction + self.after_fraction > 1.0 {
            return Err(ConfigError::invalid(
                "after_fraction",
                format!(
                    "bands overlap: {} + {} exceeds 1",
                    self.before_fraction, self.after_fraction
                ),
            ));
        }

        Ok(())
    }

    /// Classify a pointer position inside `bounds`
    ///
    /// Never returns `Invalid`; legality is the controller's concern.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use deftree_core::drag::{Bounds, HoverZone, ZoneConfig};
    /// let zones = ZoneConfig::default();
    /// let row = Bounds::new(100.0, 40.0);
    ///
    /// assert_eq!(zones.classify(row, 102.0), HoverZone::Before);
    /// assert_eq!(zones.classify(row, 120.0), HoverZone::Inside);
    /// assert_eq!(zones.classify(row, 139.0), HoverZone::After);
    /// ```
    pub fn classify(&self, bounds: Bounds, pointer_y: f64) -> HoverZone {
        let fraction = bounds.fraction(pointer_y);
        if fraction < self.before_fraction {
            HoverZone::Before
        } else if fraction >= 1.0 - self.after_fraction {
            HoverZone::After
        } else {
            HoverZone::Inside
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bands() {
        let zones = ZoneConfig::default();
        let row = Bounds::new(0.0, 100.0);

        assert_eq!(zones.classify(row, 0.0), HoverZone::Before);
        assert_eq!(zones.classify(row, 24.9), HoverZone::Before);
        assert_eq!(zones.classify(row, 25.0), HoverZone::Inside);
        assert_eq!(zones.classify(row, 74.9), HoverZone::Inside);
        assert_eq!(zones.classify(row, 75.0), HoverZone::After);
        assert_eq!(zones.classify(row, 100.0), HoverZone::After);
    }

    #[test]
    fn test_pointer_outside_row_is_clamped() {
        let zones = ZoneConfig::default();
        let row = Bounds::new(50.0, 20.0);

        assert_eq!(zones.classify(row, -10.0), HoverZone::Before);
        assert_eq!(zones.classify(row, 500.0), HoverZone::After);
    }

    #[test]
    fn test_degenerate_row_drops_inside() {
        let zones = ZoneConfig::default();
        assert_eq!(zones.classify(Bounds::new(10.0, 0.0), 10.0), HoverZone::Inside);
    }

    #[test]
    fn test_halves_without_inside_band() {
        let zones = ZoneConfig::default().with_before(0.5).with_after(0.5);
        assert!(zones.validate().is_ok());

        let row = Bounds::new(0.0, 10.0);
        assert_eq!(zones.classify(row, 4.0), HoverZone::Before);
        assert_eq!(zones.classify(row, 6.0), HoverZone::After);
    }

    #[test]
    fn test_validate_rejects_bad_fractions() {
        assert!(ZoneConfig::default().validate().is_ok());
        assert!(ZoneConfig::default().with_before(-0.1).validate().is_err());
        assert!(ZoneConfig::default().with_after(1.5).validate().is_err());
        assert!(ZoneConfig::default()
            .with_before(0.6)
            .with_after(0.6)
            .validate()
            .is_err());
    }
}
