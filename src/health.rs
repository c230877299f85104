//! # Health Score
//! Per-customer composite score (0..=100) over support, security and
//! feedback signals.
//!
//! Each customer gets five normalized components:
//!
//! | component      | source                               | normalization           |
//! |----------------|--------------------------------------|-------------------------|
//! | sentiment      | mean feedback `nps_score`            | `(nps + 10) * 5`        |
//! | incidents      | security incident count              | `max(0, 100 - 10 * n)`  |
//! | resolution     | mean ticket `resolution_time_hours`  | `max(0, 100 - 2 * h)`   |
//! | backlog        | tickets minus escalated tickets      | `max(0, 100 - 5 * b)`   |
//! | SLA adherence  | `100 - escalated / tickets * 100`    | as is                   |
//!
//! A customer with no rows in a collection takes `0` for every raw input
//! from it. That includes SLA adherence, so a customer without tickets
//! scores 0 on that component.

use serde::Serialize;
use std::collections::HashMap;

use crate::grouping::partition;
use crate::record::Record;

pub const SENTIMENT_WEIGHT: f64 = 0.20;
pub const INCIDENT_WEIGHT: f64 = 0.15;
pub const RESOLUTION_WEIGHT: f64 = 0.20;
pub const BACKLOG_WEIGHT: f64 = 0.15;
pub const SLA_WEIGHT: f64 = 0.30;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerHealth {
    pub customer_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    pub avg_resolution_time: f64,
    pub tickets: usize,
    pub escalated: usize,
    pub backlog: usize,
    pub sla_adherence: f64,
    pub incident_volume: usize,
    pub sentiment: f64,
    /// Weighted sum, clamped to `0..=100` and rounded to 2 decimals.
    pub health_score: f64,
}

#[derive(Debug, Default, Clone, Copy)]
struct SupportStats {
    avg_resolution_time: f64,
    tickets: usize,
    escalated: usize,
}

impl SupportStats {
    fn from_tickets(tickets: &[&Record]) -> Self {
        let hours: Vec<f64> = tickets
            .iter()
            .filter_map(|t| t.number("resolution_time_hours"))
            .collect();
        Self {
            avg_resolution_time: mean(&hours),
            tickets: tickets.len(),
            escalated: tickets.iter().filter(|t| t.is("escalated", "TRUE")).count(),
        }
    }

    fn backlog(&self) -> usize {
        self.tickets - self.escalated
    }

    fn sla_adherence(&self) -> f64 {
        if self.tickets == 0 {
            return 0.0;
        }
        100.0 - self.escalated as f64 / self.tickets as f64 * 100.0
    }
}

/// One score per customer row, in customer order.
pub fn health_scores(
    customers: &[Record],
    tickets: &[Record],
    incidents: &[Record],
    feedback: &[Record],
) -> Vec<CustomerHealth> {
    let support: HashMap<String, SupportStats> = partition(tickets, |t| t.key("customer_id"))
        .into_iter()
        .map(|(id, rows)| (id, SupportStats::from_tickets(&rows)))
        .collect();

    let incident_volume: HashMap<String, usize> = partition(incidents, |i| i.key("customer_id"))
        .into_iter()
        .map(|(id, rows)| (id, rows.len()))
        .collect();

    let sentiment: HashMap<String, f64> = partition(feedback, |f| f.key("customer_id"))
        .into_iter()
        .map(|(id, rows)| {
            let scores: Vec<f64> = rows.iter().filter_map(|f| f.number("nps_score")).collect();
            (id, mean(&scores))
        })
        .collect();

    customers
        .iter()
        .map(|c| {
            let id = c.key("customer_id");
            let s = support.get(id).copied().unwrap_or_default();
            let incidents = incident_volume.get(id).copied().unwrap_or(0);
            let nps = sentiment.get(id).copied().unwrap_or(0.0);

            let score = composite(
                nps,
                incidents,
                s.avg_resolution_time,
                s.backlog(),
                s.sla_adherence(),
            );

            CustomerHealth {
                customer_id: id.to_string(),
                company_name: c.present("company_name").map(str::to_string),
                avg_resolution_time: s.avg_resolution_time,
                tickets: s.tickets,
                escalated: s.escalated,
                backlog: s.backlog(),
                sla_adherence: s.sla_adherence(),
                incident_volume: incidents,
                sentiment: nps,
                health_score: (score * 100.0).round() / 100.0,
            }
        })
        .collect()
}

/// Weighted composite of the raw inputs, clamped to `0..=100`.
pub fn composite(
    nps: f64,
    incidents: usize,
    resolution_hours: f64,
    backlog: usize,
    sla_adherence: f64,
) -> f64 {
    let sentiment_norm = (nps + 10.0) * 5.0;
    let incident_norm = (100.0 - incidents as f64 * 10.0).max(0.0);
    let resolution_norm = (100.0 - resolution_hours * 2.0).max(0.0);
    let backlog_norm = (100.0 - backlog as f64 * 5.0).max(0.0);

    (sentiment_norm * SENTIMENT_WEIGHT
        + incident_norm * INCIDENT_WEIGHT
        + resolution_norm * RESOLUTION_WEIGHT
        + backlog_norm * BACKLOG_WEIGHT
        + sla_adherence * SLA_WEIGHT)
        .clamp(0.0, 100.0)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(id: &str) -> Record {
        Record::from_pairs([("customer_id", id), ("company_name", "Acme")])
    }

    fn ticket(customer: &str, hours: &str, escalated: &str) -> Record {
        Record::from_pairs([
            ("customer_id", customer),
            ("resolution_time_hours", hours),
            ("escalated", escalated),
        ])
    }

    fn one(customer: &str, field: &str, value: &str) -> Record {
        Record::from_pairs([("customer_id", customer), (field, value)])
    }

    #[test]
    fn weights_sum_to_one() {
        let total = SENTIMENT_WEIGHT + INCIDENT_WEIGHT + RESOLUTION_WEIGHT + BACKLOG_WEIGHT + SLA_WEIGHT;
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn per_customer_components() {
        let customers = vec![customer("C1"), customer("C2")];
        let tickets = vec![
            ticket("C1", "10", "TRUE"),
            ticket("C1", "30", "FALSE"),
            ticket("C1", "n/a", "FALSE"),
        ];
        let incidents = vec![one("C1", "Attack Type", "DDoS"), one("C1", "Attack Type", "DDoS")];
        let feedback = vec![one("C1", "nps_score", "4"), one("C1", "nps_score", "6")];

        let scores = health_scores(&customers, &tickets, &incidents, &feedback);
        assert_eq!(scores.len(), 2);

        let c1 = &scores[0];
        assert_eq!(c1.company_name.as_deref(), Some("Acme"));
        // unparsable hours are left out of the mean but still count as a ticket
        assert_eq!(c1.avg_resolution_time, 20.0);
        assert_eq!(c1.tickets, 3);
        assert_eq!(c1.escalated, 1);
        assert_eq!(c1.backlog, 2);
        assert_eq!(c1.incident_volume, 2);
        assert_eq!(c1.sentiment, 5.0);
        // 75*.2 + 80*.15 + 60*.2 + 90*.15 + 66.67*.3
        assert_eq!(c1.health_score, 72.5);
    }

    #[test]
    fn customer_without_activity() {
        let scores = health_scores(&[customer("C9")], &[], &[], &[]);
        let c = &scores[0];
        assert_eq!(c.tickets, 0);
        assert_eq!(c.sla_adherence, 0.0);
        // 50*.2 + 100*.15 + 100*.2 + 100*.15 + 0
        assert_eq!(c.health_score, 60.0);
    }

    #[test]
    fn score_is_clamped() {
        assert_eq!(composite(50.0, 0, 0.0, 0, 100.0), 100.0);
        assert_eq!(composite(-100.0, 20, 500.0, 40, 0.0), 0.0);
    }

    #[test]
    fn keeps_customer_order_and_blank_ids() {
        let customers = vec![customer("B"), customer("A"), Record::from_pairs([("company_name", "NoId")])];
        let ids: Vec<String> = health_scores(&customers, &[], &[], &[])
            .into_iter()
            .map(|c| c.customer_id)
            .collect();
        assert_eq!(ids, vec!["B", "A", ""]);
    }

    #[test]
    fn serialized_shape() {
        let scores = health_scores(&[Record::from_pairs([("customer_id", "C1")])], &[], &[], &[]);
        let v = serde_json::to_value(&scores[0]).unwrap();
        assert_eq!(v["customerId"], "C1");
        assert!(v.get("companyName").is_none());
        assert_eq!(v["healthScore"], 60.0);
        assert_eq!(v["incidentVolume"], 0);
    }
}
