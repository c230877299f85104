// src/security.rs
//! Security incident groupings: per source IP and per network segment.
//!
//! Both views group the incident log with [`grouping::aggregate`], rank by
//! incident count (ties: more distinct customers first) and attach a label
//! from [`classify`].

use serde::Serialize;
use std::collections::HashMap;

use crate::classify::{segment_risk, threat_level, SegmentRisk, ThreatLevel};
use crate::error::Result;
use crate::grouping::{self, by_count_then_distinct, GroupSpec};
use crate::record::Record;

pub const SOURCE_IP: &str = "Source IP Address";
pub const NETWORK_SEGMENT: &str = "Network Segment";
pub const CUSTOMER_ID: &str = "customer_id";
pub const ATTACK_TYPE: &str = "Attack Type";
pub const SEVERITY: &str = "Severity Level";

/// Only the busiest sources are reported.
pub const IP_ANALYSIS_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IpProfile {
    pub ip: String,
    pub incidents: usize,
    /// Distinct customers targeted from this address.
    pub customers: usize,
    pub attack_types: HashMap<String, usize>,
    pub severities: HashMap<String, usize>,
    pub threat_level: ThreatLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentProfile {
    pub segment: String,
    pub incidents: usize,
    pub customers: usize,
    pub attack_types: HashMap<String, usize>,
    pub severities: HashMap<String, usize>,
    pub risk_level: SegmentRisk,
}

fn incident_spec(key: &str) -> GroupSpec {
    GroupSpec::by(key)
        .distinct(CUSTOMER_ID)
        .tally(ATTACK_TYPE)
        .tally(SEVERITY)
}

/// Top source IPs by incident volume, capped at [`IP_ANALYSIS_LIMIT`].
pub fn analyze_ips(incidents: &[Record]) -> Result<Vec<IpProfile>> {
    let groups = grouping::aggregate(incidents, &incident_spec(SOURCE_IP))?;
    let ranked = grouping::rank(
        groups,
        by_count_then_distinct(CUSTOMER_ID),
        Some(IP_ANALYSIS_LIMIT),
    );

    Ok(ranked
        .into_iter()
        .map(|g| {
            let customers = g.distinct_count(CUSTOMER_ID);
            IpProfile {
                threat_level: threat_level(customers, g.count),
                incidents: g.count,
                customers,
                attack_types: g.tally(ATTACK_TYPE),
                severities: g.tally(SEVERITY),
                ip: g.key,
            }
        })
        .collect())
}

/// Every network segment, busiest first.
pub fn analyze_network_segments(incidents: &[Record]) -> Result<Vec<SegmentProfile>> {
    let groups = grouping::aggregate(incidents, &incident_spec(NETWORK_SEGMENT))?;
    let ranked = grouping::rank(groups, by_count_then_distinct(CUSTOMER_ID), None);

    Ok(ranked
        .into_iter()
        .map(|g| SegmentProfile {
            risk_level: segment_risk(g.tally_of(SEVERITY, "Critical"), g.count),
            incidents: g.count,
            customers: g.distinct_count(CUSTOMER_ID),
            attack_types: g.tally(ATTACK_TYPE),
            severities: g.tally(SEVERITY),
            segment: g.key,
        })
        .collect())
}
