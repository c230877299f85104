// tests/common/mod.rs
//
// Shared CSV fixtures: writes the four exports into a temp dir and builds
// the API router over them.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use axum::Router;
use customer_health_analytics::{api, config::FileNames, loader::DataSource};
use tempfile::TempDir;

pub const BODY_LIMIT: usize = 1024 * 1024;

pub const CUSTOMERS: &str = "\
customer_id,risk_score,monthly_recurring_revenue,support_tickets_count,security_incidents_count,nps_score,likelihood_to_renew
CUST_001,high,5000,12,6,3,Low
CUST_002,low,2000,1,0,9,High
CUST_003,high,3000,2,1,4,Medium
CUST_004,high,1000,15,0,8,Low
";

pub const TICKETS: &str = "\
ticket_id,customer_id,category,status,resolution_time_hours,escalated
T1,CUST_001,Billing,Resolved,10,TRUE
T2,CUST_001,Technical,Open,30,FALSE
T3,CUST_002,Technical,Resolved,50,FALSE
T4,CUST_003,,Resolved,4,TRUE
";

pub const INCIDENTS: &str = "\
customer_id,Timestamp,Source IP Address,Attack Type,Severity Level,Action Taken,Alerts/Warnings,Network Segment,severity
CUST_001,2023-05-30 06:33:58,10.0.0.1,DDoS,Critical,Blocked,Alert Triggered,Segment A,Critical
CUST_002,2023-05-30 07:10:00,10.0.0.1,Malware,High,Logged,,Segment A,High
CUST_003,2023-05-31 06:00:00,10.0.0.1,DDoS,Medium,Blocked,Alert Triggered,Segment B,Medium
CUST_001,not a date,10.0.0.2,Intrusion,Low,Ignored,,Segment B,Low
";

pub const FEEDBACK: &str = "\
customer_id,nps_score,likelihood_to_renew
CUST_001,3,Low
CUST_002,9,High
CUST_003,8,High
";

pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    /// All four collections populated.
    pub fn full() -> Self {
        let f = Self::empty();
        f.write("customers.csv", CUSTOMERS);
        f.write("support_tickets.csv", TICKETS);
        f.write("security_incidents.csv", INCIDENTS);
        f.write("customer_feedback.csv", FEEDBACK);
        f
    }

    /// No files at all; every collection loads empty.
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    pub fn write(&self, name: &str, content: &str) {
        fs::write(self.dir.path().join(name), content).expect("write fixture");
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn router(&self) -> Router {
        let source = DataSource::new(self.path(), FileNames::default());
        api::router(api::AppState::new(source))
    }
}
