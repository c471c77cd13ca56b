use serde::{Deserialize, Serialize};
use std::fmt;

/// Escalating severity scale shared by threshold checks and alerts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    /// Map a value against ascending medium/high/critical limits.
    ///
    /// Returns the highest severity whose limit is exceeded.
    pub fn from_limits(value: f64, medium: f64, high: f64, critical: f64) -> Option<Severity> {
        if value > critical {
            Some(Severity::Critical)
        } else if value > high {
            Some(Severity::High)
        } else if value > medium {
            Some(Severity::Medium)
        } else {
            None
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_limits_picks_highest_crossed() {
        assert_eq!(Severity::from_limits(2999.0, 3000.0, 5000.0, 10000.0), None);
        assert_eq!(Severity::from_limits(3000.0, 3000.0, 5000.0, 10000.0), None);
        assert_eq!(
            Severity::from_limits(3001.0, 3000.0, 5000.0, 10000.0),
            Some(Severity::Medium)
        );
        assert_eq!(
            Severity::from_limits(7000.0, 3000.0, 5000.0, 10000.0),
            Some(Severity::High)
        );
        assert_eq!(
            Severity::from_limits(12000.0, 3000.0, 5000.0, 10000.0),
            Some(Severity::Critical)
        );
    }

    #[test]
    fn test_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::Medium > Severity::Low);
    }
}
