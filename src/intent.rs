//! # Intent Router
//! Keyword-routed canned analyses for the chat endpoint.
//!
//! A question is lowercased and whitespace-condensed, then checked against
//! [`INTENTS`] from top to bottom. The first matching row wins, so the
//! table order *is* the precedence: a question mentioning both "high risk"
//! and "nps" is a high-risk question. No match → [`QueryResult::General`].
//!
//! Matchers (all substring tests on the normalized question):
//! - `Any(words)`:  at least one word occurs
//! - `All(words)`:  every word occurs
//! - `AnyOf(ms)` / `AllOf(ms)`: OR / AND over nested matchers
//!
//! Each intent runs its own filter/sort/slice over the loaded collections
//! and writes a summary naming the top one or two rows. Summaries leave out
//! whatever rows are missing instead of failing.

use serde::Serialize;
use std::collections::HashMap;

use crate::classify::customer_risk_factors;
use crate::grouping::{partition, rank};
use crate::kpi::Fixed;
use crate::record::{Datasets, Record};

/// Rows returned per chat answer.
pub const TOP_N: usize = 5;

/// NPS at or below this is "low satisfaction".
pub const LOW_NPS: i64 = 5;

pub const GENERAL_SUMMARY: &str = "I can help analyze customer health, support efficiency, and security incidents. Try asking about \"highest risk customers\", \"resolution time drivers\", or \"security patterns\".";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    Any(&'static [&'static str]),
    All(&'static [&'static str]),
    AnyOf(&'static [Matcher]),
    AllOf(&'static [Matcher]),
}

impl Matcher {
    /// `question` must already be normalized.
    pub fn matches(&self, question: &str) -> bool {
        match *self {
            Matcher::Any(words) => words.iter().any(|w| question.contains(w)),
            Matcher::All(words) => words.iter().all(|w| question.contains(w)),
            Matcher::AnyOf(ms) => ms.iter().any(|m| m.matches(question)),
            Matcher::AllOf(ms) => ms.iter().all(|m| m.matches(question)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    HighRisk,
    ResolutionTime,
    SecurityPatterns,
    Satisfaction,
    General,
}

/// Ordered dispatch table. Do not reorder without meaning to change precedence.
pub const INTENTS: &[(Intent, Matcher)] = &[
    (
        Intent::HighRisk,
        Matcher::Any(&["highest risk customers", "high risk"]),
    ),
    (
        Intent::ResolutionTime,
        // "resolution time" OR ("driving" AND "time")
        Matcher::AnyOf(&[
            Matcher::Any(&["resolution time"]),
            Matcher::All(&["driving", "time"]),
        ]),
    ),
    (
        Intent::SecurityPatterns,
        Matcher::AllOf(&[
            Matcher::Any(&["security"]),
            Matcher::Any(&["pattern", "trend"]),
        ]),
    ),
    (
        Intent::Satisfaction,
        Matcher::Any(&["satisfaction", "nps", "feedback"]),
    ),
];

/// Lowercase + collapse runs of whitespace to one space.
pub fn normalize_question(question: &str) -> String {
    question
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// First intent whose matcher accepts the question, else `General`.
pub fn classify(question: &str) -> Intent {
    let q = normalize_question(question);
    INTENTS
        .iter()
        .find(|(_, m)| m.matches(&q))
        .map(|(intent, _)| *intent)
        .unwrap_or(Intent::General)
}

/// Route `question` and run the matching analysis over `data`.
pub fn answer(question: &str, data: &Datasets) -> QueryResult {
    match classify(question) {
        Intent::HighRisk => high_risk(&data.customers),
        Intent::ResolutionTime => resolution_time(&data.tickets),
        Intent::SecurityPatterns => security_patterns(&data.incidents),
        Intent::Satisfaction => satisfaction(&data.customers),
        Intent::General => QueryResult::General {
            summary: GENERAL_SUMMARY.to_string(),
        },
    }
}

/* ----------------------------
Result shapes
---------------------------- */

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum QueryResult {
    HighRiskAnalysis {
        data: Vec<RiskyCustomer>,
        summary: String,
    },
    ResolutionAnalysis {
        data: Vec<CategoryResolution>,
        summary: String,
    },
    SecurityPatterns {
        data: Vec<CustomerIncidents>,
        summary: String,
    },
    SatisfactionAnalysis {
        data: Vec<CustomerSatisfaction>,
        summary: String,
    },
    General {
        summary: String,
    },
}

impl QueryResult {
    /// Wire name of the analysis (`"high-risk-analysis"`, ...).
    pub fn kind(&self) -> &'static str {
        match self {
            QueryResult::HighRiskAnalysis { .. } => "high-risk-analysis",
            QueryResult::ResolutionAnalysis { .. } => "resolution-analysis",
            QueryResult::SecurityPatterns { .. } => "security-patterns",
            QueryResult::SatisfactionAnalysis { .. } => "satisfaction-analysis",
            QueryResult::General { .. } => "general",
        }
    }

    pub fn summary(&self) -> &str {
        match self {
            QueryResult::HighRiskAnalysis { summary, .. }
            | QueryResult::ResolutionAnalysis { summary, .. }
            | QueryResult::SecurityPatterns { summary, .. }
            | QueryResult::SatisfactionAnalysis { summary, .. }
            | QueryResult::General { summary } => summary,
        }
    }

    /// Number of ranked rows carried.
    pub fn len(&self) -> usize {
        match self {
            QueryResult::HighRiskAnalysis { data, .. } => data.len(),
            QueryResult::ResolutionAnalysis { data, .. } => data.len(),
            QueryResult::SecurityPatterns { data, .. } => data.len(),
            QueryResult::SatisfactionAnalysis { data, .. } => data.len(),
            QueryResult::General { .. } => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskyCustomer {
    pub id: String,
    pub mrr: String,
    pub risk_factors: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResolution {
    #[serde(rename = "type")]
    pub category: String,
    /// Mean hours with one decimal, `0` when no ticket has a resolution time.
    pub avg_time: Fixed,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerIncidents {
    pub customer_id: String,
    pub total: usize,
    pub critical: usize,
    pub types: HashMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSatisfaction {
    pub id: String,
    pub nps: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renewal_likelihood: Option<String>,
    pub support_tickets: i64,
    pub security_incidents: i64,
}

/* ----------------------------
Intent handlers
---------------------------- */

fn high_risk(customers: &[Record]) -> QueryResult {
    let data: Vec<RiskyCustomer> = customers
        .iter()
        .filter(|c| c.is("risk_score", "high"))
        .take(TOP_N)
        .map(|c| RiskyCustomer {
            id: c.key("customer_id").to_string(),
            mrr: c.key("monthly_recurring_revenue").to_string(),
            risk_factors: customer_risk_factors(
                c.number("support_tickets_count"),
                c.number("security_incidents_count"),
                c.number("nps_score"),
            ),
        })
        .collect();

    let summary = match data.as_slice() {
        [] => "No customers are currently flagged as high risk.".to_string(),
        [first, rest @ ..] => {
            let mut s = format!(
                "Found {} highest risk customers. {} (MRR {}) leads the list",
                data.len(),
                first.id,
                first.mrr
            );
            if let Some(second) = rest.first() {
                s.push_str(&format!(", followed by {} (MRR {})", second.id, second.mrr));
            }
            s.push_str(". Key risk factors: high support volume, security incidents, and low satisfaction scores.");
            s
        }
    };

    QueryResult::HighRiskAnalysis { data, summary }
}

fn resolution_time(tickets: &[Record]) -> QueryResult {
    let groups = partition(tickets, |t| {
        t.get("category")
            .filter(|c| !c.is_empty())
            .unwrap_or("General")
    });

    let rows: Vec<CategoryResolution> = groups
        .into_iter()
        .map(|(category, members)| {
            // tickets without a usable resolution time do not count
            let hours: Vec<f64> = members
                .iter()
                .filter_map(|t| t.number("resolution_time_hours"))
                .collect();
            let avg_time = if hours.is_empty() {
                Fixed::Zero
            } else {
                Fixed::new(hours.iter().sum::<f64>() / hours.len() as f64, 1)
            };
            CategoryResolution {
                category,
                avg_time,
                count: hours.len(),
            }
        })
        .collect();

    let data = rank(
        rows,
        |a, b| b.avg_time.as_f64().total_cmp(&a.avg_time.as_f64()),
        Some(TOP_N),
    );

    let summary = match data.as_slice() {
        [] => "No support tickets were found to analyze resolution times.".to_string(),
        [first, rest @ ..] => {
            let mut s = format!(
                "{} tickets have the highest avg resolution time at {} hours",
                first.category, first.avg_time
            );
            if let Some(second) = rest.first() {
                s.push_str(&format!(
                    ", followed by {} at {} hours",
                    second.category, second.avg_time
                ));
            }
            s.push('.');
            s
        }
    };

    QueryResult::ResolutionAnalysis { data, summary }
}

fn security_patterns(incidents: &[Record]) -> QueryResult {
    let rows: Vec<CustomerIncidents> = partition(incidents, |i| i.key("customer_id"))
        .into_iter()
        .map(|(customer_id, members)| {
            let mut types: HashMap<String, usize> = HashMap::new();
            for i in &members {
                *types.entry(i.key("Attack Type").to_string()).or_default() += 1;
            }
            CustomerIncidents {
                customer_id,
                total: members.len(),
                critical: members
                    .iter()
                    .filter(|i| i.is("Severity Level", "Critical"))
                    .count(),
                types,
            }
        })
        .collect();

    let data = rank(
        rows,
        |a, b| b.critical.cmp(&a.critical).then(b.total.cmp(&a.total)),
        Some(TOP_N),
    );

    let summary = match data.as_slice() {
        [] => "No security incidents were found.".to_string(),
        [first, rest @ ..] => {
            let mut s = format!(
                "Customer {} tops the security risk list with {} critical incidents out of {}",
                first.customer_id, first.critical, first.total
            );
            if let Some(second) = rest.first() {
                s.push_str(&format!(
                    ", followed by {} with {} critical",
                    second.customer_id, second.critical
                ));
            }
            s.push('.');
            let common = most_common(incidents, "Attack Type", 3);
            if !common.is_empty() {
                s.push_str(&format!(
                    " Most common attack types: {}.",
                    common.join(", ")
                ));
            }
            s
        }
    };

    QueryResult::SecurityPatterns { data, summary }
}

fn satisfaction(customers: &[Record]) -> QueryResult {
    let mut rows: Vec<CustomerSatisfaction> = customers
        .iter()
        .map(|c| CustomerSatisfaction {
            id: c.key("customer_id").to_string(),
            nps: c.integer("nps_score").unwrap_or(0),
            renewal_likelihood: c.get("likelihood_to_renew").map(str::to_string),
            support_tickets: c.integer("support_tickets_count").unwrap_or(0),
            security_incidents: c.integer("security_incidents_count").unwrap_or(0),
        })
        .collect();
    rows.sort_by_key(|c| c.nps);

    let data: Vec<CustomerSatisfaction> = rows
        .into_iter()
        .filter(|c| c.nps <= LOW_NPS)
        .take(TOP_N)
        .collect();

    let mut summary = format!(
        "{} customers have low satisfaction (NPS ≤ {}).",
        data.len(),
        LOW_NPS
    );
    if let [first, rest @ ..] = data.as_slice() {
        summary.push_str(&format!(" Lowest is {} at NPS {}", first.id, first.nps));
        if let Some(second) = rest.first() {
            summary.push_str(&format!(", followed by {} at {}", second.id, second.nps));
        }
        summary.push_str(
            ". Common factors: high support ticket volume and security incidents.",
        );
    }

    QueryResult::SatisfactionAnalysis { data, summary }
}

/// Up to `n` most frequent non-empty values of `field`; ties alphabetical.
fn most_common(records: &[Record], field: &str, n: usize) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for r in records {
        if let Some(v) = r.get(field).filter(|v| !v.is_empty()) {
            *counts.entry(v).or_default() += 1;
        }
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(n)
        .map(|(v, _)| v.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(id: &str, risk: &str, nps: &str) -> Record {
        Record::from_pairs([
            ("customer_id", id),
            ("risk_score", risk),
            ("monthly_recurring_revenue", "5000"),
            ("nps_score", nps),
            ("support_tickets_count", "12"),
            ("security_incidents_count", "1"),
            ("likelihood_to_renew", "Low"),
        ])
    }

    fn ticket(category: &str, hours: &str) -> Record {
        Record::from_pairs([("category", category), ("resolution_time_hours", hours)])
    }

    fn incident(customer: &str, sev: &str, attack: &str) -> Record {
        Record::from_pairs([
            ("customer_id", customer),
            ("Severity Level", sev),
            ("Attack Type", attack),
        ])
    }

    #[test]
    fn precedence_follows_table_order() {
        assert_eq!(classify("nps for high risk accounts?"), Intent::HighRisk);
        assert_eq!(classify("high risk accounts by NPS?"), Intent::HighRisk);
        assert_eq!(
            classify("what are the highest risk customers?"),
            Intent::HighRisk
        );
        assert_eq!(
            classify("security trend and resolution time"),
            Intent::ResolutionTime
        );
        assert_eq!(
            classify("Show me security patterns with feedback"),
            Intent::SecurityPatterns
        );
    }

    #[test]
    fn resolution_predicate_is_a_or_b_and_c() {
        assert_eq!(classify("What is driving ticket time?"), Intent::ResolutionTime);
        assert_eq!(classify("average Resolution   Time"), Intent::ResolutionTime);
        // "driving" alone is not enough
        assert_eq!(classify("what is driving churn"), Intent::General);
    }

    #[test]
    fn security_needs_both_words() {
        assert_eq!(classify("security"), Intent::General);
        assert_eq!(classify("patterns"), Intent::General);
        assert_eq!(classify("SECURITY PATTERNS"), Intent::SecurityPatterns);
    }

    #[test]
    fn empty_or_odd_text_is_general() {
        for q in ["", "   ", "🤖🤖", "\u{0}\u{1}"] {
            let r = answer(q, &Datasets::default());
            assert_eq!(r.kind(), "general");
            assert_eq!(r.summary(), GENERAL_SUMMARY);
        }
    }

    #[test]
    fn high_risk_caps_at_five_and_names_top_two() {
        let data = Datasets {
            customers: (0..8)
                .map(|i| customer(&format!("CUST_{i:03}"), "high", "4"))
                .chain(std::iter::once(customer("CUST_LOW", "low", "9")))
                .collect(),
            ..Default::default()
        };
        let r = answer("what are the highest risk customers?", &data);
        assert_eq!(r.kind(), "high-risk-analysis");
        assert_eq!(r.len(), TOP_N);
        assert!(r.summary().contains("CUST_000"));
        assert!(r.summary().contains("CUST_001"));

        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["type"], "high-risk-analysis");
        assert_eq!(
            v["data"][0]["riskFactors"],
            serde_json::json!(["High support volume", "Low satisfaction"])
        );
    }

    #[test]
    fn high_risk_with_one_customer_degrades() {
        let data = Datasets {
            customers: vec![customer("ONLY", "high", "8")],
            ..Default::default()
        };
        let r = answer("high risk", &data);
        assert_eq!(r.len(), 1);
        assert!(r.summary().contains("ONLY"));
        assert!(!r.summary().contains("followed by"));
    }

    #[test]
    fn resolution_groups_sorts_and_formats() {
        let data = Datasets {
            tickets: vec![
                ticket("Billing", "10"),
                ticket("Billing", "NULL"),
                ticket("", "30"),
                ticket("Outage", "40"),
                ticket("Outage", "45"),
                ticket("Billing", "20"),
                ticket("Onboarding", ""),
            ],
            ..Default::default()
        };
        let r = answer("what's driving long resolution time?", &data);
        let QueryResult::ResolutionAnalysis { data: rows, summary } = &r else {
            panic!("expected resolution analysis, got {}", r.kind());
        };
        let names: Vec<&str> = rows.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["Outage", "General", "Billing", "Onboarding"]);
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[2].count, 2);
        assert_eq!(rows[3].avg_time, Fixed::Zero);

        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["data"][0]["avgTime"], "42.5");
        assert_eq!(v["data"][0]["type"], "Outage");
        assert_eq!(v["data"][3]["avgTime"], 0);
        assert_eq!(
            summary,
            "Outage tickets have the highest avg resolution time at 42.5 hours, followed by General at 30.0 hours."
        );
    }

    #[test]
    fn resolution_without_tickets() {
        let r = answer("resolution time", &Datasets::default());
        assert_eq!(r.kind(), "resolution-analysis");
        assert!(r.is_empty());
    }

    #[test]
    fn security_sorts_by_critical_then_total() {
        let data = Datasets {
            incidents: vec![
                incident("A", "High", "DDoS"),
                incident("A", "High", "DDoS"),
                incident("A", "High", "Malware"),
                incident("B", "Critical", "Malware"),
                incident("C", "Critical", "Intrusion"),
                incident("C", "Low", "DDoS"),
            ],
            ..Default::default()
        };
        let r = answer("any security trends?", &data);
        let QueryResult::SecurityPatterns { data: rows, summary } = &r else {
            panic!("expected security patterns, got {}", r.kind());
        };
        let ids: Vec<&str> = rows.iter().map(|c| c.customer_id.as_str()).collect();
        assert_eq!(ids, vec!["C", "B", "A"]);
        assert_eq!(rows[2].types["DDoS"], 2);
        assert!(summary.starts_with("Customer C tops the security risk list with 1 critical"));
        assert!(summary.contains("followed by B"));
        assert!(summary.ends_with("Most common attack types: DDoS, Malware, Intrusion."));
    }

    #[test]
    fn satisfaction_lists_lowest_nps() {
        let data = Datasets {
            customers: vec![
                customer("HAPPY", "low", "9"),
                customer("MEH", "low", "5"),
                customer("SAD", "low", "2"),
                customer("UNKNOWN", "low", "n/a"),
            ],
            ..Default::default()
        };
        let r = answer("Show NPS feedback", &data);
        let QueryResult::SatisfactionAnalysis { data: rows, summary } = &r else {
            panic!("expected satisfaction, got {}", r.kind());
        };
        let ids: Vec<&str> = rows.iter().map(|c| c.id.as_str()).collect();
        // unparsable NPS counts as 0
        assert_eq!(ids, vec!["UNKNOWN", "SAD", "MEH"]);
        assert!(rows.iter().all(|c| c.nps <= LOW_NPS));
        assert!(summary.starts_with("3 customers have low satisfaction"));
    }

    #[test]
    fn satisfaction_omits_missing_renewal_column() {
        let data = Datasets {
            customers: vec![Record::from_pairs([("customer_id", "X"), ("nps_score", "1")])],
            ..Default::default()
        };
        let v = serde_json::to_value(answer("satisfaction", &data)).unwrap();
        assert!(v["data"][0].get("renewalLikelihood").is_none());
        assert_eq!(v["data"][0]["supportTickets"], 0);
    }

    #[test]
    fn blank_nps_is_not_low_satisfaction() {
        // blank, NULL and non-numeric scores are unknown, not zero;
        // only a real score below 6 raises the factor
        let data = Datasets {
            customers: vec![
                customer("BLANK", "high", ""),
                customer("NULLED", "high", "NULL"),
                customer("TEXT", "high", "n/a"),
                customer("ZERO", "high", "0"),
            ],
            ..Datasets::default()
        };
        let QueryResult::HighRiskAnalysis { data: rows, .. } = answer("high risk", &data) else {
            panic!("expected high-risk analysis");
        };
        let low_sat: Vec<&str> = rows
            .iter()
            .filter(|c| c.risk_factors.contains(&"Low satisfaction"))
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(low_sat, vec!["ZERO"]);
        assert_eq!(rows[0].risk_factors, vec!["High support volume"]);
    }
}
