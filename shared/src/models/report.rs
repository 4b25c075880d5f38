//! Analytics report payloads
//!
//! Every series is indexed by the `dates` vector of the same report.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// `?begin=2024-01-01&end=2024-01-31`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DateRangeQuery {
    pub begin: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TurnoverReport {
    pub dates: Vec<NaiveDate>,
    pub turnovers: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserReport {
    pub dates: Vec<NaiveDate>,
    /// Users created at or before the end of each day
    pub total_users: Vec<i64>,
    /// Users created between range start and the end of each day (cumulative)
    pub new_users: Vec<i64>,
    /// Users created within each day
    pub new_users_daily: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderReport {
    pub dates: Vec<NaiveDate>,
    pub order_counts: Vec<i64>,
    /// Completed orders per day
    pub valid_order_counts: Vec<i64>,
    pub total_order_count: i64,
    pub valid_order_count: i64,
    /// valid / total, 0.0 when there are no orders
    pub order_completion_rate: f64,
}

/// Best sellers, in rank order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SalesTopReport {
    pub names: Vec<String>,
    pub numbers: Vec<i64>,
}

/// Business figures for one window (a day, or a whole range)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct BusinessData {
    pub turnover: f64,
    pub valid_order_count: i64,
    pub order_completion_rate: f64,
    /// Average order value: turnover / valid orders
    pub unit_price: f64,
    pub new_users: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyBusinessRow {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub data: BusinessData,
}

/// Trailing business report handed to a document sink
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BusinessReport {
    pub begin: NaiveDate,
    pub end: NaiveDate,
    pub overview: BusinessData,
    pub days: Vec<DailyBusinessRow>,
}
