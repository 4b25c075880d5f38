//! Lifecycle sweeper
//!
//! 两个周期任务：
//! - 支付超时：PENDING_PAYMENT 超过阈值 → CANCELLED
//! - 配送完成：DELIVERY_IN_PROGRESS 超过阈值 → COMPLETED
//!
//! 每条订单用 status 做 compare-and-set，重复执行或与人工操作并发都不会覆盖。
//! 单条失败只记日志，不影响同批次其余订单。

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult};
use shared::models::OrderStatus;
use shared::util::now_millis;
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::core::config::SweeperConfig;
use crate::db::repository::order::{self as order_repo, OrderClock, TransitionPatch};
use crate::utils::{stamp, Operation};

pub const TIMEOUT_CANCEL_REASON: &str = "Order timed out";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepKind {
    PaymentTimeout,
    DeliveryCompletion,
}

impl SweepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PaymentTimeout => "payment_timeout",
            Self::DeliveryCompletion => "delivery_completion",
        }
    }

    fn statuses(&self) -> (OrderStatus, OrderStatus) {
        match self {
            Self::PaymentTimeout => (OrderStatus::PendingPayment, OrderStatus::Cancelled),
            Self::DeliveryCompletion => (OrderStatus::DeliveryInProgress, OrderStatus::Completed),
        }
    }
}

impl std::fmt::Display for SweepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SweepKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "payment_timeout" => Ok(Self::PaymentTimeout),
            "delivery_completion" => Ok(Self::DeliveryCompletion),
            other => Err(AppError::invalid_request(format!("unknown sweep kind: {other}"))),
        }
    }
}

/// Result of one pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepOutcome {
    pub kind: SweepKind,
    pub cutoff: i64,
    /// Candidates found by the scan
    pub scanned: usize,
    pub transitioned: usize,
    /// Already moved by someone else between scan and update
    pub skipped: usize,
    pub failed: usize,
}

pub struct LifecycleSweeper {
    pool: SqlitePool,
    config: SweeperConfig,
    payment_guard: Mutex<()>,
    delivery_guard: Mutex<()>,
}

impl LifecycleSweeper {
    pub fn new(pool: SqlitePool, config: SweeperConfig) -> Self {
        Self {
            pool,
            config,
            payment_guard: Mutex::new(()),
            delivery_guard: Mutex::new(()),
        }
    }

    pub async fn run_payment_timeout(&self, now: i64) -> AppResult<Option<SweepOutcome>> {
        self.run(SweepKind::PaymentTimeout, now).await
    }

    pub async fn run_delivery_completion(&self, now: i64) -> AppResult<Option<SweepOutcome>> {
        self.run(SweepKind::DeliveryCompletion, now).await
    }

    /// One pass of `kind` as of `now`.
    ///
    /// Returns `Ok(None)` without doing anything when a pass of the same
    /// kind is still running.
    pub async fn run(&self, kind: SweepKind, now: i64) -> AppResult<Option<SweepOutcome>> {
        let guard = match kind {
            SweepKind::PaymentTimeout => &self.payment_guard,
            SweepKind::DeliveryCompletion => &self.delivery_guard,
        };
        let Ok(_running) = guard.try_lock() else {
            tracing::debug!(sweep = %kind, "Previous sweep still running, skipping");
            return Ok(None);
        };
        self.sweep(kind, now).await.map(Some)
    }

    async fn sweep(&self, kind: SweepKind, now: i64) -> AppResult<SweepOutcome> {
        let (from, to) = kind.statuses();
        let (timeout, clock) = match kind {
            SweepKind::PaymentTimeout => (self.config.payment_timeout, OrderClock::OrderTime),
            SweepKind::DeliveryCompletion => {
                (self.config.delivery_timeout, self.config.delivery_clock)
            }
        };
        let cutoff = now - timeout.as_millis() as i64;

        let stale = order_repo::find_stale(&self.pool, from, cutoff, clock).await?;
        let mut outcome = SweepOutcome {
            kind,
            cutoff,
            scanned: stale.len(),
            transitioned: 0,
            skipped: 0,
            failed: 0,
        };

        for order in &stale {
            let mut patch = patch_for(kind, now);
            stamp(&mut patch, Operation::Update, None, now);
            match order_repo::transition(&self.pool, order.id, from, to, &patch).await {
                Ok(true) => {
                    outcome.transitioned += 1;
                    tracing::info!(
                        sweep = %kind,
                        order_id = order.id,
                        number = %order.number,
                        %to,
                        "Order swept"
                    );
                }
                Ok(false) => outcome.skipped += 1,
                Err(e) => {
                    outcome.failed += 1;
                    tracing::warn!(
                        sweep = %kind,
                        order_id = order.id,
                        error = %e,
                        "Failed to sweep order"
                    );
                }
            }
        }

        Ok(outcome)
    }

    /// Periodic loop until `shutdown` fires. Missed ticks are skipped rather
    /// than bursting to catch up.
    pub async fn run_loop(self: Arc<Self>, kind: SweepKind, shutdown: CancellationToken) {
        let period = self.period(kind);
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!(sweep = %kind, period_secs = period.as_secs(), "Sweeper started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!(sweep = %kind, "Sweeper stopped");
                    break;
                }
                _ = ticker.tick() => {
                    match self.run(kind, now_millis()).await {
                        Ok(Some(o)) if o.transitioned > 0 || o.failed > 0 => {
                            tracing::info!(
                                sweep = %kind,
                                scanned = o.scanned,
                                transitioned = o.transitioned,
                                skipped = o.skipped,
                                failed = o.failed,
                                "Sweep finished"
                            );
                        }
                        Ok(_) => {}
                        Err(e) => tracing::error!(sweep = %kind, error = %e, "Sweep scan failed"),
                    }
                }
            }
        }
    }

    fn period(&self, kind: SweepKind) -> Duration {
        match kind {
            SweepKind::PaymentTimeout => self.config.payment_interval,
            SweepKind::DeliveryCompletion => self.config.delivery_interval,
        }
    }
}

fn patch_for(kind: SweepKind, now: i64) -> TransitionPatch {
    match kind {
        SweepKind::PaymentTimeout => TransitionPatch {
            cancel_reason: Some(TIMEOUT_CANCEL_REASON.to_string()),
            cancel_time: Some(now),
            ..Default::default()
        },
        SweepKind::DeliveryCompletion => TransitionPatch {
            delivery_time: Some(now),
            ..Default::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{fixtures, DbService};
    use shared::models::Order;

    const MIN: i64 = 60_000;
    const NOW: i64 = 1_704_067_200_000;

    async fn sweeper_with(config: SweeperConfig) -> (LifecycleSweeper, SqlitePool) {
        let db = DbService::memory().await.unwrap();
        (LifecycleSweeper::new(db.pool.clone(), config), db.pool)
    }

    async fn seed(pool: &SqlitePool, id: i64, status: OrderStatus, order_time: i64) {
        fixtures::seed_order(pool, &fixtures::order(id, status, order_time, 10.0)).await;
    }

    async fn status_of(pool: &SqlitePool, id: i64) -> Order {
        order_repo::find_by_id(pool, id).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_payment_timeout_cancels_only_stale() {
        let (sweeper, pool) = sweeper_with(SweeperConfig::default()).await;
        seed(&pool, 1, OrderStatus::PendingPayment, NOW - 20 * MIN).await;
        seed(&pool, 2, OrderStatus::PendingPayment, NOW - 5 * MIN).await;
        seed(&pool, 3, OrderStatus::ToBeConfirmed, NOW - 60 * MIN).await;

        let outcome = sweeper.run_payment_timeout(NOW).await.unwrap().unwrap();
        assert_eq!(outcome.scanned, 1);
        assert_eq!(outcome.transitioned, 1);
        assert_eq!(outcome.failed, 0);

        let cancelled = status_of(&pool, 1).await;
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(cancelled.cancel_reason.as_deref(), Some(TIMEOUT_CANCEL_REASON));
        assert_eq!(cancelled.cancel_time, Some(NOW));
        assert_eq!(cancelled.updated_by, None);

        assert_eq!(status_of(&pool, 2).await.status, OrderStatus::PendingPayment);
        assert_eq!(status_of(&pool, 3).await.status, OrderStatus::ToBeConfirmed);
    }

    #[tokio::test]
    async fn test_sweep_is_idempotent() {
        let (sweeper, pool) = sweeper_with(SweeperConfig::default()).await;
        seed(&pool, 1, OrderStatus::PendingPayment, NOW - 20 * MIN).await;

        sweeper.run_payment_timeout(NOW).await.unwrap().unwrap();
        let first = status_of(&pool, 1).await;

        let again = sweeper.run_payment_timeout(NOW + MIN).await.unwrap().unwrap();
        assert_eq!(again.scanned, 0);
        assert_eq!(again.transitioned, 0);
        let second = status_of(&pool, 1).await;
        assert_eq!(first.cancel_time, second.cancel_time);
        assert_eq!(first.updated_at, second.updated_at);
    }

    #[tokio::test]
    async fn test_failed_order_does_not_stop_the_batch() {
        let (sweeper, pool) = sweeper_with(SweeperConfig::default()).await;
        seed(&pool, 1, OrderStatus::PendingPayment, NOW - 30 * MIN).await;
        seed(&pool, 2, OrderStatus::PendingPayment, NOW - 25 * MIN).await;
        seed(&pool, 3, OrderStatus::PendingPayment, NOW - 20 * MIN).await;
        sqlx::query(
            "CREATE TEMP TRIGGER reject_order_2 BEFORE UPDATE ON orders \
             WHEN OLD.id = 2 BEGIN SELECT RAISE(ABORT, 'row locked'); END",
        )
        .execute(&pool)
        .await
        .unwrap();

        let outcome = sweeper.run_payment_timeout(NOW).await.unwrap().unwrap();
        assert_eq!(outcome.scanned, 3);
        assert_eq!(outcome.transitioned, 2);
        assert_eq!(outcome.failed, 1);

        assert_eq!(status_of(&pool, 1).await.status, OrderStatus::Cancelled);
        assert_eq!(status_of(&pool, 2).await.status, OrderStatus::PendingPayment);
        assert_eq!(status_of(&pool, 3).await.status, OrderStatus::Cancelled);

        // Next run picks it up once the row is writable again
        sqlx::query("DROP TRIGGER reject_order_2").execute(&pool).await.unwrap();
        let retry = sweeper.run_payment_timeout(NOW).await.unwrap().unwrap();
        assert_eq!(retry.transitioned, 1);
        assert_eq!(status_of(&pool, 2).await.status, OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_boundary_is_exclusive() {
        let (sweeper, pool) = sweeper_with(SweeperConfig::default()).await;
        seed(&pool, 1, OrderStatus::PendingPayment, NOW - 15 * MIN).await;

        let outcome = sweeper.run_payment_timeout(NOW).await.unwrap().unwrap();
        assert_eq!(outcome.transitioned, 0);
        let outcome = sweeper.run_payment_timeout(NOW + 1).await.unwrap().unwrap();
        assert_eq!(outcome.transitioned, 1);
    }

    #[tokio::test]
    async fn test_delivery_completion_by_order_time() {
        let (sweeper, pool) = sweeper_with(SweeperConfig::default()).await;
        let mut late = fixtures::order(1, OrderStatus::DeliveryInProgress, NOW - 90 * MIN, 10.0);
        late.dispatched_at = Some(NOW - 10 * MIN);
        fixtures::seed_order(&pool, &late).await;
        seed(&pool, 2, OrderStatus::DeliveryInProgress, NOW - 30 * MIN).await;
        seed(&pool, 3, OrderStatus::Confirmed, NOW - 90 * MIN).await;

        let outcome = sweeper.run_delivery_completion(NOW).await.unwrap().unwrap();
        assert_eq!(outcome.transitioned, 1);

        let done = status_of(&pool, 1).await;
        assert_eq!(done.status, OrderStatus::Completed);
        assert_eq!(done.delivery_time, Some(NOW));
        assert_eq!(status_of(&pool, 2).await.status, OrderStatus::DeliveryInProgress);
        assert_eq!(status_of(&pool, 3).await.status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_delivery_completion_by_dispatch_time() {
        let config = SweeperConfig {
            delivery_clock: OrderClock::DispatchTime,
            ..Default::default()
        };
        let (sweeper, pool) = sweeper_with(config).await;
        // Ordered long ago but dispatched recently
        let mut recent = fixtures::order(1, OrderStatus::DeliveryInProgress, NOW - 90 * MIN, 10.0);
        recent.dispatched_at = Some(NOW - 10 * MIN);
        fixtures::seed_order(&pool, &recent).await;
        // No dispatch time recorded: falls back to order time
        seed(&pool, 2, OrderStatus::DeliveryInProgress, NOW - 90 * MIN).await;

        let outcome = sweeper.run_delivery_completion(NOW).await.unwrap().unwrap();
        assert_eq!(outcome.scanned, 1);
        assert_eq!(status_of(&pool, 1).await.status, OrderStatus::DeliveryInProgress);
        assert_eq!(status_of(&pool, 2).await.status, OrderStatus::Completed);
    }

    #[tokio::test]
    async fn test_overlapping_run_is_skipped() {
        let (sweeper, _pool) = sweeper_with(SweeperConfig::default()).await;
        let held = sweeper.payment_guard.lock().await;

        assert!(sweeper.run_payment_timeout(NOW).await.unwrap().is_none());
        // The other sweep has its own guard
        assert!(sweeper.run_delivery_completion(NOW).await.unwrap().is_some());

        drop(held);
        assert!(sweeper.run_payment_timeout(NOW).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_loop_stops_on_shutdown() {
        let config = SweeperConfig {
            payment_interval: Duration::from_millis(10),
            ..Default::default()
        };
        let (sweeper, pool) = sweeper_with(config).await;
        seed(&pool, 1, OrderStatus::PendingPayment, now_millis() - 20 * MIN).await;

        let token = CancellationToken::new();
        let sweeper = Arc::new(sweeper);
        let handle = tokio::spawn(sweeper.run_loop(SweepKind::PaymentTimeout, token.clone()));
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(status_of(&pool, 1).await.status, OrderStatus::Cancelled);
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("payment_timeout".parse::<SweepKind>().unwrap(), SweepKind::PaymentTimeout);
        assert_eq!(
            "delivery_completion".parse::<SweepKind>().unwrap(),
            SweepKind::DeliveryCompletion
        );
        assert!("nightly".parse::<SweepKind>().is_err());
    }
}
