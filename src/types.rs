//! Shared domain types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wire values accepted for urgency, in ascending order.
pub const URGENCY_LEVELS: &[&str] = &["Low", "Medium", "High"];

/// How urgently a blood request has to be fulfilled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "Low",
            Urgency::Medium => "Medium",
            Urgency::High => "High",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Urgency {
    type Err = String;

    /// Lenient parse for command-line use; the wire format stays exact.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Urgency::Low),
            "medium" => Ok(Urgency::Medium),
            "high" => Ok(Urgency::High),
            _ => Err(format!(
                "Invalid urgency: {} (must be one of {})",
                s,
                URGENCY_LEVELS.join(", ")
            )),
        }
    }
}
