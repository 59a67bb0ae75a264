//! Externally pushed status reports.
//!
//! # Responsibilities
//! - Parse the state token of an inbound report
//! - Map each report to its fixed announcement
//!
//! # Design Decisions
//! - Reports are operator overrides, not samples: they bypass the flap
//!   filter and never touch its counters
//! - A report can contradict the poll loop's confirmed state; the two
//!   sources are not reconciled

use std::fmt;
use std::str::FromStr;

use crate::health::state::{OFFLINE_MESSAGE, ONLINE_MESSAGE};

/// Announcement for a `testing` report.
pub const TESTING_MESSAGE: &str = "🔧 Testing Minecraft server status...\n";

/// State carried by an inbound report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExternalReport {
    Up,
    Down,
    Testing,
}

impl ExternalReport {
    pub fn as_str(self) -> &'static str {
        match self {
            ExternalReport::Up => "up",
            ExternalReport::Down => "down",
            ExternalReport::Testing => "testing",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ExternalReport::Up => ONLINE_MESSAGE,
            ExternalReport::Down => OFFLINE_MESSAGE,
            ExternalReport::Testing => TESTING_MESSAGE,
        }
    }
}

impl fmt::Display for ExternalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized state token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid status type: {0}")]
pub struct InvalidReport(pub String);

impl FromStr for ExternalReport {
    type Err = InvalidReport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(ExternalReport::Up),
            "down" => Ok(ExternalReport::Down),
            "testing" => Ok(ExternalReport::Testing),
            other => Err(InvalidReport(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("up".parse(), Ok(ExternalReport::Up));
        assert_eq!("testing".parse(), Ok(ExternalReport::Testing));
        assert_eq!(
            "UP".parse::<ExternalReport>(),
            Err(InvalidReport("UP".into()))
        );
    }

    #[test]
    fn test_messages_match_poll_announcements() {
        assert_eq!(ExternalReport::Up.message(), ONLINE_MESSAGE);
        assert_eq!(ExternalReport::Down.message(), OFFLINE_MESSAGE);
        assert_eq!(ExternalReport::Testing.message(), TESTING_MESSAGE);
    }
}
