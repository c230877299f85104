//! # Classifier
//! Threshold ladders that turn counts into ordinal labels.
//!
//! Every ladder is checked most severe first and the first match wins.
//! Inequalities are part of the contract: `high > 5` and `customers >= 3`
//! are not interchangeable with their off-by-one neighbours.

use serde::Serialize;
use std::fmt;

/// Overall security posture for an incident collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum SecurityPosture {
    Good,
    High,
    Critical,
}

/// Threat level of a single source IP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ThreatLevel {
    #[serde(rename = "Low Risk")]
    LowRisk,
    Suspicious,
    #[serde(rename = "High Risk")]
    HighRisk,
}

/// Risk level of a network segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum SegmentRisk {
    Medium,
    High,
    Critical,
}

/// Any critical incident is critical; more than five high ones is high.
pub fn security_posture(critical: usize, high: usize) -> SecurityPosture {
    if critical > 0 {
        SecurityPosture::Critical
    } else if high > 5 {
        SecurityPosture::High
    } else {
        SecurityPosture::Good
    }
}

/// Breadth (distinct customers hit) outranks volume (incident count).
pub fn threat_level(distinct_customers: usize, incidents: usize) -> ThreatLevel {
    if distinct_customers >= 3 {
        ThreatLevel::HighRisk
    } else if incidents >= 5 {
        ThreatLevel::Suspicious
    } else {
        ThreatLevel::LowRisk
    }
}

pub fn segment_risk(critical_incidents: usize, incidents: usize) -> SegmentRisk {
    if critical_incidents > 0 {
        SegmentRisk::Critical
    } else if incidents > 10 {
        SegmentRisk::High
    } else {
        SegmentRisk::Medium
    }
}

/// Human-readable churn risk factors for one customer.
///
/// Absent or unparsable inputs never raise a factor.
pub fn customer_risk_factors(
    support_tickets: Option<f64>,
    security_incidents: Option<f64>,
    nps: Option<f64>,
) -> Vec<&'static str> {
    let mut out = Vec::new();
    if support_tickets.is_some_and(|n| n > 10.0) {
        out.push("High support volume");
    }
    if security_incidents.is_some_and(|n| n > 5.0) {
        out.push("Multiple security incidents");
    }
    if nps.is_some_and(|n| n < 6.0) {
        out.push("Low satisfaction");
    }
    out
}

impl fmt::Display for SecurityPosture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurityPosture::Good => write!(f, "Good"),
            SecurityPosture::High => write!(f, "High"),
            SecurityPosture::Critical => write!(f, "Critical"),
        }
    }
}

impl fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreatLevel::LowRisk => write!(f, "Low Risk"),
            ThreatLevel::Suspicious => write!(f, "Suspicious"),
            ThreatLevel::HighRisk => write!(f, "High Risk"),
        }
    }
}
