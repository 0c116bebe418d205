//! Signal Availability
//!
//! Every checker reports whether its data source could be consulted at
//! all. A missing or permission-denied source is `Unavailable` and must
//! never be confused with "measured and clean" or "measured and
//! suspicious" - it contributes no score, only a gap note in the verdict.

use serde::{Deserialize, Serialize};

/// Tri-state availability of a signal source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    /// Source has not been consulted yet
    Unknown,
    /// Source exists but could not be read (permission, missing file,
    /// timeout) - explicitly NOT a threat signal
    Unavailable,
    /// Source was consulted and produced a result (possibly empty)
    Available,
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::Unknown => "unknown",
            Availability::Unavailable => "unavailable",
            Availability::Available => "available",
        }
    }
}

impl Default for Availability {
    fn default() -> Self {
        Availability::Unknown
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unknown() {
        assert_eq!(Availability::default(), Availability::Unknown);
        assert!(!Availability::default().is_available());
    }

    #[test]
    fn test_only_available_counts() {
        assert!(Availability::Available.is_available());
        assert!(!Availability::Unavailable.is_available());
    }
}
