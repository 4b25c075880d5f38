//! Report computations
//!
//! Every report first expands `[begin, end]` into its calendar dates; each
//! date becomes a `[local midnight, next local midnight)` window in the
//! business time zone.

use chrono::{Duration, NaiveDate};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use shared::error::AppResult;
use shared::models::{
    BusinessData, BusinessReport, DailyBusinessRow, OrderReport, OrderStatus, SalesTopReport,
    TurnoverReport, UserReport,
};
use sqlx::SqlitePool;

use crate::db::repository::stats;
use crate::orders::money::{to_decimal, to_f64};
use crate::utils::time::{date_sequence, day_end_millis, day_start_millis};

/// Ranking length for best sellers
pub const TOP_N: i64 = 10;

/// Days covered by the trailing business report
const EXPORT_DAYS: i64 = 30;

#[derive(Debug, Clone)]
pub struct ReportService {
    pool: SqlitePool,
    tz: Tz,
}

impl ReportService {
    pub fn new(pool: SqlitePool, tz: Tz) -> Self {
        Self { pool, tz }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    fn window(&self, date: NaiveDate) -> (i64, i64) {
        (day_start_millis(date, self.tz), day_end_millis(date, self.tz))
    }

    /// Completed-order revenue per day
    pub async fn turnover(&self, begin: NaiveDate, end: NaiveDate) -> AppResult<TurnoverReport> {
        let dates = date_sequence(begin, end)?;
        let mut turnovers = Vec::with_capacity(dates.len());
        for date in &dates {
            let (start, end) = self.window(*date);
            let sum = stats::sum_amount(&self.pool, OrderStatus::Completed, start, end).await?;
            turnovers.push(round_money(sum));
        }
        Ok(TurnoverReport { dates, turnovers })
    }

    /// Total users, users new since `begin` (cumulative), and users new that day
    pub async fn user_growth(&self, begin: NaiveDate, end: NaiveDate) -> AppResult<UserReport> {
        let dates = date_sequence(begin, end)?;
        let range_start = day_start_millis(begin, self.tz);

        let mut total_users = Vec::with_capacity(dates.len());
        let mut new_users = Vec::with_capacity(dates.len());
        let mut new_users_daily = Vec::with_capacity(dates.len());
        for date in &dates {
            let (start, end) = self.window(*date);
            total_users.push(stats::count_users(&self.pool, None, end).await?);
            new_users.push(stats::count_users(&self.pool, Some(range_start), end).await?);
            new_users_daily.push(stats::count_users(&self.pool, Some(start), end).await?);
        }
        Ok(UserReport {
            dates,
            total_users,
            new_users,
            new_users_daily,
        })
    }

    /// Orders placed and orders completed per day, plus range totals
    pub async fn order_stats(&self, begin: NaiveDate, end: NaiveDate) -> AppResult<OrderReport> {
        let dates = date_sequence(begin, end)?;
        let mut order_counts = Vec::with_capacity(dates.len());
        let mut valid_order_counts = Vec::with_capacity(dates.len());
        for date in &dates {
            let (start, end) = self.window(*date);
            order_counts.push(stats::count_orders(&self.pool, start, end, None).await?);
            valid_order_counts.push(
                stats::count_orders(&self.pool, start, end, Some(OrderStatus::Completed)).await?,
            );
        }

        let total_order_count: i64 = order_counts.iter().sum();
        let valid_order_count: i64 = valid_order_counts.iter().sum();
        Ok(OrderReport {
            dates,
            order_counts,
            valid_order_counts,
            total_order_count,
            valid_order_count,
            order_completion_rate: completion_rate(valid_order_count, total_order_count),
        })
    }

    /// Best sellers by quantity over the whole range. Ties rank by name.
    pub async fn top_sales(&self, begin: NaiveDate, end: NaiveDate) -> AppResult<SalesTopReport> {
        // Validates the range even though the ranking is not per day
        date_sequence(begin, end)?;
        let start = day_start_millis(begin, self.tz);
        let end = day_end_millis(end, self.tz);

        let rows = stats::top_sales(&self.pool, start, end, TOP_N).await?;
        let (names, numbers): (Vec<String>, Vec<i64>) = rows.into_iter().unzip();
        Ok(SalesTopReport { names, numbers })
    }

    /// Business figures for `[start_ms, end_ms)`
    pub async fn business_data(&self, start_ms: i64, end_ms: i64) -> AppResult<BusinessData> {
        let turnover = round_money(
            stats::sum_amount(&self.pool, OrderStatus::Completed, start_ms, end_ms).await?,
        );
        let total = stats::count_orders(&self.pool, start_ms, end_ms, None).await?;
        let valid =
            stats::count_orders(&self.pool, start_ms, end_ms, Some(OrderStatus::Completed)).await?;
        let new_users = stats::count_users(&self.pool, Some(start_ms), end_ms).await?;

        let unit_price = if valid > 0 {
            to_f64(to_decimal(turnover) / Decimal::from(valid))
        } else {
            0.0
        };

        Ok(BusinessData {
            turnover,
            valid_order_count: valid,
            order_completion_rate: completion_rate(valid, total),
            unit_price,
            new_users,
        })
    }

    /// Figures for one calendar day
    pub async fn business_day(&self, date: NaiveDate) -> AppResult<BusinessData> {
        let (start, end) = self.window(date);
        self.business_data(start, end).await
    }

    /// Trailing report: the 30 days ending yesterday, relative to `today`
    pub async fn business_report(&self, today: NaiveDate) -> AppResult<BusinessReport> {
        let begin = today - Duration::days(EXPORT_DAYS);
        let end = today - Duration::days(1);

        let overview = self
            .business_data(day_start_millis(begin, self.tz), day_end_millis(end, self.tz))
            .await?;

        let dates = date_sequence(begin, end)?;
        let mut days = Vec::with_capacity(dates.len());
        for date in dates {
            days.push(DailyBusinessRow {
                date,
                data: self.business_day(date).await?,
            });
        }

        tracing::debug!(%begin, %end, rows = days.len(), "Business report computed");
        Ok(BusinessReport {
            begin,
            end,
            overview,
            days,
        })
    }
}

/// valid / total; 0.0 for an empty window
fn completion_rate(valid: i64, total: i64) -> f64 {
    if total == 0 {
        0.0
    } else {
        valid as f64 / total as f64
    }
}

fn round_money(value: f64) -> f64 {
    to_f64(to_decimal(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{fixtures, DbService};
    use crate::utils::ErrorCode;

    const SHANGHAI: Tz = chrono_tz::Asia::Shanghai;
    const HOUR: i64 = 3_600_000;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn noon(date: &str) -> i64 {
        day_start_millis(d(date), SHANGHAI) + 12 * HOUR
    }

    async fn seed(pool: &SqlitePool, id: i64, status: OrderStatus, at: i64, amount: f64) {
        fixtures::seed_order(pool, &fixtures::order(id, status, at, amount)).await;
    }

    async fn service() -> (ReportService, SqlitePool) {
        let db = DbService::memory().await.unwrap();
        (ReportService::new(db.pool.clone(), SHANGHAI), db.pool)
    }

    #[tokio::test]
    async fn test_turnover_counts_completed_only() {
        let (svc, pool) = service().await;
        seed(&pool, 1, OrderStatus::Completed, noon("2024-01-01"), 4.0).await;
        seed(&pool, 2, OrderStatus::Completed, noon("2024-01-01"), 6.0).await;
        seed(&pool, 3, OrderStatus::Cancelled, noon("2024-01-02"), 99.0).await;
        seed(&pool, 4, OrderStatus::Completed, noon("2024-01-03"), 8.0).await;

        let report = svc.turnover(d("2024-01-01"), d("2024-01-03")).await.unwrap();
        assert_eq!(
            report.dates,
            vec![d("2024-01-01"), d("2024-01-02"), d("2024-01-03")]
        );
        assert_eq!(report.turnovers, vec![10.0, 0.0, 8.0]);
    }

    #[tokio::test]
    async fn test_day_window_edges() {
        let (svc, pool) = service().await;
        let start = day_start_millis(d("2024-01-02"), SHANGHAI);
        // Last millisecond of Jan 1, first of Jan 2, last of Jan 2
        seed(&pool, 1, OrderStatus::Completed, start - 1, 1.0).await;
        seed(&pool, 2, OrderStatus::Completed, start, 2.0).await;
        seed(&pool, 3, OrderStatus::Completed, start + 24 * HOUR - 1, 4.0).await;

        let report = svc.turnover(d("2024-01-01"), d("2024-01-03")).await.unwrap();
        assert_eq!(report.turnovers, vec![1.0, 6.0, 0.0]);
    }

    #[tokio::test]
    async fn test_single_day_range() {
        let (svc, _pool) = service().await;
        let report = svc.turnover(d("2024-02-29"), d("2024-02-29")).await.unwrap();
        assert_eq!(report.dates.len(), 1);
        assert_eq!(report.turnovers, vec![0.0]);
    }

    #[tokio::test]
    async fn test_invalid_ranges() {
        let (svc, _pool) = service().await;
        let err = svc.turnover(d("2024-01-03"), d("2024-01-01")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidDateRange);

        let err = svc.order_stats(d("2023-01-01"), d("2024-12-31")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidDateRange);

        let err = svc.top_sales(d("2024-01-03"), d("2024-01-01")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidDateRange);
    }

    #[tokio::test]
    async fn test_user_growth_series() {
        let (svc, pool) = service().await;
        fixtures::seed_user(&pool, 1, noon("2023-12-31")).await;
        fixtures::seed_user(&pool, 2, noon("2024-01-01")).await;
        fixtures::seed_user(&pool, 3, noon("2024-01-01")).await;
        fixtures::seed_user(&pool, 4, noon("2024-01-03")).await;

        let report = svc.user_growth(d("2024-01-01"), d("2024-01-03")).await.unwrap();
        assert_eq!(report.total_users, vec![3, 3, 4]);
        assert_eq!(report.new_users, vec![2, 2, 3]);
        assert_eq!(report.new_users_daily, vec![2, 0, 1]);
    }

    #[tokio::test]
    async fn test_order_stats_and_rate() {
        let (svc, pool) = service().await;
        seed(&pool, 1, OrderStatus::Completed, noon("2024-01-01"), 1.0).await;
        seed(&pool, 2, OrderStatus::Cancelled, noon("2024-01-01"), 1.0).await;
        seed(&pool, 3, OrderStatus::Completed, noon("2024-01-02"), 1.0).await;
        seed(&pool, 4, OrderStatus::PendingPayment, noon("2024-01-02"), 1.0).await;

        let report = svc.order_stats(d("2024-01-01"), d("2024-01-02")).await.unwrap();
        assert_eq!(report.order_counts, vec![2, 2]);
        assert_eq!(report.valid_order_counts, vec![1, 1]);
        assert_eq!(report.total_order_count, 4);
        assert_eq!(report.valid_order_count, 2);
        assert_eq!(report.order_completion_rate, 0.5);
    }

    #[tokio::test]
    async fn test_empty_range_has_zero_rate() {
        let (svc, _pool) = service().await;
        let report = svc.order_stats(d("2024-01-01"), d("2024-01-07")).await.unwrap();
        assert_eq!(report.total_order_count, 0);
        assert_eq!(report.order_completion_rate, 0.0);
    }

    #[tokio::test]
    async fn test_top_sales_ranking() {
        let (svc, pool) = service().await;
        seed(&pool, 1, OrderStatus::Completed, noon("2024-01-01"), 1.0).await;
        seed(&pool, 2, OrderStatus::Completed, noon("2024-01-02"), 1.0).await;
        // Outside the range
        seed(&pool, 3, OrderStatus::Completed, noon("2024-01-05"), 1.0).await;

        fixtures::seed_detail(&pool, 10, 1, "A", 3).await;
        fixtures::seed_detail(&pool, 11, 1, "B", 4).await;
        fixtures::seed_detail(&pool, 12, 2, "A", 2).await;
        fixtures::seed_detail(&pool, 13, 2, "B", 2).await;
        fixtures::seed_detail(&pool, 14, 2, "C", 1).await;
        fixtures::seed_detail(&pool, 15, 3, "C", 50).await;

        let report = svc.top_sales(d("2024-01-01"), d("2024-01-02")).await.unwrap();
        assert_eq!(report.names, vec!["B", "A", "C"]);
        assert_eq!(report.numbers, vec![6, 5, 1]);
    }

    #[tokio::test]
    async fn test_top_sales_truncates_and_breaks_ties_by_name() {
        let (svc, pool) = service().await;
        seed(&pool, 1, OrderStatus::Completed, noon("2024-01-01"), 1.0).await;
        for i in 0..12 {
            fixtures::seed_detail(&pool, 100 + i, 1, &format!("item-{:02}", 11 - i), 1).await;
        }

        let report = svc.top_sales(d("2024-01-01"), d("2024-01-01")).await.unwrap();
        assert_eq!(report.names.len(), TOP_N as usize);
        assert_eq!(report.names[0], "item-00");
        assert_eq!(report.names[9], "item-09");
    }

    #[tokio::test]
    async fn test_business_data() {
        let (svc, pool) = service().await;
        seed(&pool, 1, OrderStatus::Completed, noon("2024-01-01"), 10.0).await;
        seed(&pool, 2, OrderStatus::Completed, noon("2024-01-01"), 5.0).await;
        seed(&pool, 3, OrderStatus::Cancelled, noon("2024-01-01"), 7.0).await;
        fixtures::seed_user(&pool, 1, noon("2024-01-01")).await;

        let data = svc.business_day(d("2024-01-01")).await.unwrap();
        assert_eq!(data.turnover, 15.0);
        assert_eq!(data.valid_order_count, 2);
        assert_eq!(data.unit_price, 7.5);
        assert!((data.order_completion_rate - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(data.new_users, 1);

        let empty = svc.business_day(d("2024-01-02")).await.unwrap();
        assert_eq!(empty, BusinessData::default());
    }

    #[tokio::test]
    async fn test_business_report_covers_trailing_thirty_days() {
        let (svc, pool) = service().await;
        // Yesterday and 30 days ago are in; today and 31 days ago are out
        seed(&pool, 1, OrderStatus::Completed, noon("2024-03-30"), 3.0).await;
        seed(&pool, 2, OrderStatus::Completed, noon("2024-03-01"), 4.0).await;
        seed(&pool, 3, OrderStatus::Completed, noon("2024-03-31"), 50.0).await;
        seed(&pool, 4, OrderStatus::Completed, noon("2024-02-29"), 60.0).await;

        let report = svc.business_report(d("2024-03-31")).await.unwrap();
        assert_eq!(report.begin, d("2024-03-01"));
        assert_eq!(report.end, d("2024-03-30"));
        assert_eq!(report.days.len(), 30);
        assert_eq!(report.days[0].date, d("2024-03-01"));
        assert_eq!(report.days[0].data.turnover, 4.0);
        assert_eq!(report.days[29].data.turnover, 3.0);
        assert_eq!(report.overview.turnover, 7.0);
        assert_eq!(report.overview.valid_order_count, 2);
    }
}
