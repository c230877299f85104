//! # KPI Aggregator
//! Scalar rollups over one or more record collections.
//!
//! Parse-failure policy, applied uniformly:
//! - **sums**: an absent or unparsable value contributes `0`;
//! - **averages**: an absent or unparsable value is excluded from both the
//!   numerator and the denominator; no included rows → `0`;
//! - **rates**: `numerator / denominator * 100` as a 2-decimal string, or the
//!   number `0` when the denominator is zero.

use serde::{Serialize, Serializer};

use crate::classify::{security_posture, SecurityPosture};
use crate::record::Record;

/// A value rendered with a fixed number of decimals, or a bare `0` when undefined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fixed {
    Zero,
    Value { value: f64, places: usize },
}

impl Fixed {
    pub fn new(value: f64, places: usize) -> Self {
        Fixed::Value { value, places }
    }

    /// Numeric view used for ordering; `Zero` is `0.0`.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Fixed::Zero => 0.0,
            Fixed::Value { value, places } => round_to(value, places),
        }
    }
}

impl Serialize for Fixed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Fixed::Zero => serializer.serialize_u8(0),
            Fixed::Value { value, places } => {
                serializer.serialize_str(&format!("{:.*}", places, value))
            }
        }
    }
}

impl std::fmt::Display for Fixed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Fixed::Zero => write!(f, "0"),
            Fixed::Value { value, places } => write!(f, "{:.*}", places, value),
        }
    }
}

fn round_to(value: f64, places: usize) -> f64 {
    let p = 10f64.powi(places as i32);
    (value * p).round() / p
}

/// Rows whose `field` equals `value` exactly.
pub fn count_where(records: &[Record], field: &str, value: &str) -> usize {
    records.iter().filter(|r| r.is(field, value)).count()
}

/// Sum of `field` as floats; absent or unparsable rows add `0`.
pub fn sum_field(records: &[Record], field: &str) -> f64 {
    records.iter().filter_map(|r| r.number(field)).sum()
}

/// Mean of `field` over rows where it parses as a float.
pub fn average_field(records: &[Record], field: &str) -> f64 {
    mean(records.iter().filter_map(|r| r.number(field)))
}

/// Mean of `field` read by its leading integer (scores like NPS).
pub fn average_int_field(records: &[Record], field: &str) -> f64 {
    mean(records.iter().filter_map(|r| r.integer(field)).map(|n| n as f64))
}

/// Percentage with 2 decimals, `Fixed::Zero` when there is nothing to divide by.
pub fn rate(numerator: usize, denominator: usize) -> Fixed {
    if denominator == 0 {
        return Fixed::Zero;
    }
    Fixed::new(numerator as f64 / denominator as f64 * 100.0, 2)
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n > 0 {
        sum / n as f64
    } else {
        0.0
    }
}

/// Executive dashboard rollup across all four collections.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardKpis {
    pub total_customers: usize,
    pub high_risk_customers: usize,
    #[serde(rename = "totalMRR")]
    pub total_mrr: f64,
    pub revenue_at_risk: f64,
    pub resolved_tickets: usize,
    pub total_tickets: usize,
    pub avg_resolution_time: f64,
    pub escalated_tickets: usize,
    pub escalation_rate: Fixed,
    pub critical_incidents: usize,
    pub total_incidents: usize,
    #[serde(rename = "avgNPS")]
    pub avg_nps: f64,
    pub high_renewal: usize,
}

impl DashboardKpis {
    pub fn compute(
        customers: &[Record],
        tickets: &[Record],
        incidents: &[Record],
        feedback: &[Record],
    ) -> Self {
        let high_risk: Vec<Record> = customers
            .iter()
            .filter(|c| c.is("risk_score", "high"))
            .cloned()
            .collect();
        let escalated = count_where(tickets, "escalated", "TRUE");

        Self {
            total_customers: customers.len(),
            high_risk_customers: high_risk.len(),
            total_mrr: sum_field(customers, "monthly_recurring_revenue"),
            revenue_at_risk: sum_field(&high_risk, "monthly_recurring_revenue"),
            resolved_tickets: count_where(tickets, "status", "Resolved"),
            total_tickets: tickets.len(),
            avg_resolution_time: average_field(tickets, "resolution_time_hours"),
            escalated_tickets: escalated,
            escalation_rate: rate(escalated, tickets.len()),
            critical_incidents: count_where(incidents, "severity", "Critical"),
            total_incidents: incidents.len(),
            avg_nps: average_int_field(feedback, "nps_score"),
            high_renewal: count_where(feedback, "likelihood_to_renew", "High"),
        }
    }
}

/// Security operations rollup over the incident log.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityKpis {
    pub total_incidents: usize,
    pub critical_incidents: usize,
    pub high_incidents: usize,
    pub prevention_rate: Fixed,
    pub alert_coverage: Fixed,
    pub critical_rate: Fixed,
    pub security_posture: SecurityPosture,
}

impl SecurityKpis {
    pub fn compute(incidents: &[Record]) -> Self {
        let total = incidents.len();
        let critical = count_where(incidents, "Severity Level", "Critical");
        let high = count_where(incidents, "Severity Level", "High");
        let prevented = count_where(incidents, "Action Taken", "Blocked");
        let alerted = count_where(incidents, "Alerts/Warnings", "Alert Triggered");

        Self {
            total_incidents: total,
            critical_incidents: critical,
            high_incidents: high,
            prevention_rate: rate(prevented, total),
            alert_coverage: rate(alerted, total),
            critical_rate: rate(critical, total),
            security_posture: security_posture(critical, high),
        }
    }
}
