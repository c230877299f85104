//! # Records
//! Flat, schema-less rows as they come out of CSV exports.
//!
//! A [`Record`] shares its column list with every other row of the same
//! collection and keeps its values in column order. Lookups never panic:
//! an unknown column or a short row simply yields `None`.
//!
//! Numeric coercion lives here too so that every metric parses the same way.
//! Callers decide what an absent value means (zero vs. excluded); see the
//! call sites in `kpi` and `intent`.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::Arc;

/// Literal marker some exports write for "no value".
pub const MISSING: &str = "NULL";

/// A single row: shared column names + this row's values.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    columns: Arc<[String]>,
    values: Vec<String>,
}

impl Record {
    /// Build a row from shared columns. Extra values beyond the column list are dropped.
    pub fn new(columns: Arc<[String]>, mut values: Vec<String>) -> Self {
        values.truncate(columns.len());
        Self { columns, values }
    }

    /// Convenience constructor for ad-hoc rows (tests, fixtures).
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let (columns, values): (Vec<String>, Vec<String>) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self::new(columns.into(), values)
    }

    /// Raw value of `field`, `None` if the column is unknown or the row is short.
    pub fn get(&self, field: &str) -> Option<&str> {
        let idx = self.columns.iter().position(|c| c == field)?;
        self.values.get(idx).map(String::as_str)
    }

    /// Whether this row's schema carries `field` at all.
    pub fn has_field(&self, field: &str) -> bool {
        self.columns.iter().any(|c| c == field)
    }

    /// Value of `field` unless it is missing, blank, or the `NULL` marker.
    pub fn present(&self, field: &str) -> Option<&str> {
        self.get(field).filter(|v| is_present(v))
    }

    /// `true` when `field` holds exactly `expected`.
    pub fn is(&self, field: &str, expected: &str) -> bool {
        self.get(field) == Some(expected)
    }

    /// Present value parsed as a float; `None` if absent or not numeric.
    pub fn number(&self, field: &str) -> Option<f64> {
        self.present(field).and_then(parse_number)
    }

    /// Present value parsed by its leading integer prefix; `None` if absent or no digits.
    pub fn integer(&self, field: &str) -> Option<i64> {
        self.present(field).and_then(parse_leading_int)
    }

    /// Value of `field` as a grouping key. Missing values group under `""`.
    pub fn key(&self, field: &str) -> &str {
        self.get(field).unwrap_or("")
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (col, val) in self.columns.iter().zip(self.values.iter()) {
            map.serialize_entry(col, val)?;
        }
        map.end()
    }
}

/// The four collections the analyses read, already loaded.
#[derive(Debug, Clone, Default)]
pub struct Datasets {
    pub customers: Vec<Record>,
    pub tickets: Vec<Record>,
    pub incidents: Vec<Record>,
    pub feedback: Vec<Record>,
}

/// Non-empty after trimming and not the `NULL` marker.
pub fn is_present(raw: &str) -> bool {
    let t = raw.trim();
    !t.is_empty() && t != MISSING
}

/// Strict float parse. Rejects NaN/inf so averages stay finite.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Integer parse that reads the leading digits only: `"7.9"` → 7, `"12 tickets"` → 12.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let t = raw.trim_start();
    let (sign, rest) = match t.as_bytes().first() {
        Some(b'-') => (-1, &t[1..]),
        Some(b'+') => (1, &t[1..]),
        _ => (1, t),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    rest[..digits].parse::<i64>().ok().map(|n| sign * n)
}

/// `true` if at least one row of a non-empty collection carries `field`.
/// Empty collections accept every field.
pub fn collection_has_field(records: &[Record], field: &str) -> bool {
    records.is_empty() || records.iter().any(|r| r.has_field(field))
}
