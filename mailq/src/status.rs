//! Nagios/Sensu check outcomes.

use std::fmt;

/// Check result in increasing order of badness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Status {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Status {
    /// Classifies a message count against inclusive thresholds. Critical
    /// wins when both are reached.
    pub fn from_count(count: usize, warning: usize, critical: usize) -> Self {
        match count {
            _ if count >= critical => Status::Critical,
            _ if count >= warning => Status::Warning,
            _ => Status::Ok,
        }
    }

    pub fn exit_code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::Warning => 1,
            Status::Critical => 2,
            Status::Unknown => 3,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Ok => "OK",
            Status::Warning => "WARNING",
            Status::Critical => "CRITICAL",
            Status::Unknown => "UNKNOWN",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_inclusive() {
        assert_eq!(Status::from_count(0, 1, 5), Status::Ok);
        assert_eq!(Status::from_count(1, 1, 5), Status::Warning);
        assert_eq!(Status::from_count(4, 1, 5), Status::Warning);
        assert_eq!(Status::from_count(5, 1, 5), Status::Critical);
    }

    #[test]
    fn critical_takes_precedence() {
        assert_eq!(Status::from_count(10, 1, 5), Status::Critical);
        // degenerate operator input: identical thresholds go critical
        assert_eq!(Status::from_count(3, 3, 3), Status::Critical);
    }

    #[test]
    fn exit_codes() {
        assert_eq!(Status::Ok.exit_code(), 0);
        assert_eq!(Status::Warning.exit_code(), 1);
        assert_eq!(Status::Critical.exit_code(), 2);
        assert_eq!(Status::Unknown.exit_code(), 3);
    }
}
