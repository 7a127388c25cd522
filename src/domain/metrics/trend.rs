//! First-versus-last trend classification over a sampled window.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    /// Compares the first and last value of a window; a relative change
    /// beyond `threshold_pct` percent counts as a trend.
    pub fn classify(first: f64, last: f64, threshold_pct: f64) -> Self {
        if first == 0.0 {
            return if last > 0.0 {
                Trend::Increasing
            } else {
                Trend::Stable
            };
        }
        let change_pct = (last - first) / first * 100.0;
        if change_pct > threshold_pct {
            Trend::Increasing
        } else if change_pct < -threshold_pct {
            Trend::Decreasing
        } else {
            Trend::Stable
        }
    }

    /// Classifies the endpoints of a series, `Stable` when it is too short.
    pub fn of_series(values: &[f64], threshold_pct: f64) -> Self {
        match (values.first(), values.last()) {
            (Some(&first), Some(&last)) if values.len() >= 2 => {
                Self::classify(first, last, threshold_pct)
            }
            _ => Trend::Stable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_beyond_threshold_is_a_trend() {
        assert_eq!(Trend::classify(100.0, 130.0, 20.0), Trend::Increasing);
        assert_eq!(Trend::classify(100.0, 70.0, 20.0), Trend::Decreasing);
        assert_eq!(Trend::classify(100.0, 110.0, 20.0), Trend::Stable);
    }

    #[test]
    fn zero_baseline_never_divides() {
        assert_eq!(Trend::classify(0.0, 5.0, 20.0), Trend::Increasing);
        assert_eq!(Trend::classify(0.0, 0.0, 20.0), Trend::Stable);
    }

    #[test]
    fn short_series_is_stable() {
        assert_eq!(Trend::of_series(&[], 10.0), Trend::Stable);
        assert_eq!(Trend::of_series(&[42.0], 10.0), Trend::Stable);
        assert_eq!(Trend::of_series(&[10.0, 20.0], 10.0), Trend::Increasing);
    }
}
