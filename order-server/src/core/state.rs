use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::cart::CartService;
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::core::{Config, Result, UserLocks};
use crate::db::DbService;
use crate::orders::{LifecycleSweeper, OrderService, SweepKind, TimestampNumbers};
use crate::reports::{CsvReportSink, ReportService, ReportSink};
use crate::services::{SqliteAddressBook, SqliteCatalog};

/// How often idle per-user locks are dropped
const LOCK_PRUNE_INTERVAL: Duration = Duration::from_secs(600);

/// 服务器状态 - 持有所有服务的共享引用
///
/// 所有字段都是 `Clone` 且廉价（内部为 `Arc` / 连接池句柄），
/// 直接作为 axum 的 `State` 使用。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | pool | SQLite 连接池 |
/// | jwt_service | JWT 认证服务 |
/// | carts | 购物车 |
/// | orders | 下单与状态流转 |
/// | sweeper | 超时取消 / 自动完成 |
/// | reports | 报表统计 |
/// | export_sink | 报表导出格式 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
    pub locks: Arc<UserLocks>,
    pub carts: CartService,
    pub orders: OrderService,
    pub sweeper: Arc<LifecycleSweeper>,
    pub reports: ReportService,
    pub export_sink: Arc<dyn ReportSink>,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 1. 工作目录 (确保存在)
    /// 2. 数据库 (打开并执行迁移)
    /// 3. 各服务
    pub async fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = DbService::new(&config.database_path.to_string_lossy()).await?;
        Ok(Self::from_parts(config.clone(), db.pool))
    }

    /// Wire every service over an already-migrated pool
    pub fn from_parts(config: Config, pool: SqlitePool) -> Self {
        let locks = Arc::new(UserLocks::new());
        let catalog = Arc::new(SqliteCatalog::new(pool.clone()));
        let addresses = Arc::new(SqliteAddressBook::new(pool.clone()));

        let carts = CartService::new(pool.clone(), catalog, locks.clone());
        let orders = OrderService::new(
            pool.clone(),
            addresses,
            Arc::new(TimestampNumbers),
            locks.clone(),
        );
        let sweeper = Arc::new(LifecycleSweeper::new(pool.clone(), config.sweeper));
        let reports = ReportService::new(pool.clone(), config.timezone);
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        Self {
            config,
            pool,
            jwt_service,
            locks,
            carts,
            orders,
            sweeper,
            reports,
            export_sink: Arc::new(CsvReportSink),
        }
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    /// 启动后台任务：两个 sweeper 与锁表清理
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();
        let token = tasks.shutdown_token();

        tasks.spawn(
            "payment_timeout_sweep",
            TaskKind::Periodic,
            self.sweeper
                .clone()
                .run_loop(SweepKind::PaymentTimeout, token.clone()),
        );
        tasks.spawn(
            "delivery_completion_sweep",
            TaskKind::Periodic,
            self.sweeper
                .clone()
                .run_loop(SweepKind::DeliveryCompletion, token.clone()),
        );

        let locks = self.locks.clone();
        tasks.spawn("user_lock_prune", TaskKind::Periodic, async move {
            let mut ticker = tokio::time::interval(LOCK_PRUNE_INTERVAL);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let pruned = locks.prune();
                        if pruned > 0 {
                            tracing::debug!(
                                pruned,
                                remaining = locks.len(),
                                "Pruned idle user locks"
                            );
                        }
                    }
                }
            }
        });

        tasks.log_summary();
        tasks
    }
}
