use std::path::PathBuf;
use std::time::Duration;

use chrono_tz::Tz;

use crate::auth::{JwtConfig, JwtError};
use crate::db::repository::order::OrderClock;

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、日志) |
/// | DATABASE_PATH | $WORK_DIR/orders.db | SQLite 文件 |
/// | HTTP_PORT | 8080 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | TIMEZONE | Asia/Shanghai | 业务时区 (报表按天切分) |
/// | LOG_JSON | false | JSON 日志 |
/// | PAYMENT_TIMEOUT_MINUTES | 15 | 待支付超时取消 |
/// | DELIVERY_TIMEOUT_MINUTES | 60 | 派送中自动完成 |
/// | PAYMENT_SWEEP_INTERVAL_SECS | 60 | 超时取消扫描间隔 |
/// | DELIVERY_SWEEP_INTERVAL_SECS | 300 | 自动完成扫描间隔 |
/// | DELIVERY_CLOCK | order_time | 自动完成计时起点: order_time / dispatch_time |
/// | SHUTDOWN_TIMEOUT_MS | 10000 | 优雅关闭超时 |
/// | JWT_SECRET | (random in dev) | JWT 密钥 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/takeout HTTP_PORT=9000 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: PathBuf,
    pub database_path: PathBuf,
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    /// Business time zone for day boundaries
    pub timezone: Tz,
    pub log_json: bool,
    pub jwt: JwtConfig,
    pub sweeper: SweeperConfig,
    pub shutdown_timeout_ms: u64,
}

/// Lifecycle sweeper thresholds and schedules
#[derive(Debug, Clone, Copy)]
pub struct SweeperConfig {
    /// PENDING_PAYMENT orders older than this are cancelled
    pub payment_timeout: Duration,
    /// DELIVERY_IN_PROGRESS orders older than this are completed
    pub delivery_timeout: Duration,
    pub payment_interval: Duration,
    pub delivery_interval: Duration,
    pub delivery_clock: OrderClock,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            payment_timeout: Duration::from_secs(15 * 60),
            delivery_timeout: Duration::from_secs(60 * 60),
            payment_interval: Duration::from_secs(60),
            delivery_interval: Duration::from_secs(300),
            delivery_clock: OrderClock::OrderTime,
        }
    }
}

/// Parse an env var, warning (not failing) on garbage
fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Invalid config value, using default");
            default
        }),
        Err(_) => default,
    }
}

fn parse_clock(raw: &str) -> Option<OrderClock> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "order_time" => Some(OrderClock::OrderTime),
        "dispatch_time" => Some(OrderClock::DispatchTime),
        _ => None,
    }
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// Only a missing JWT secret in production is fatal; every other bad
    /// value falls back to its default.
    pub fn from_env() -> Result<Self, JwtError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let work_dir = PathBuf::from(std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()));
        let database_path = std::env::var("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| work_dir.join("orders.db"));

        let defaults = SweeperConfig::default();
        let delivery_clock = match std::env::var("DELIVERY_CLOCK") {
            Ok(raw) => parse_clock(&raw).unwrap_or_else(|| {
                tracing::warn!(value = %raw, "Unknown DELIVERY_CLOCK, using order_time");
                defaults.delivery_clock
            }),
            Err(_) => defaults.delivery_clock,
        };
        let sweeper = SweeperConfig {
            payment_timeout: Duration::from_secs(60 * env_or("PAYMENT_TIMEOUT_MINUTES", 15u64)),
            delivery_timeout: Duration::from_secs(60 * env_or("DELIVERY_TIMEOUT_MINUTES", 60u64)),
            payment_interval: Duration::from_secs(
                env_or("PAYMENT_SWEEP_INTERVAL_SECS", 60u64).max(1),
            ),
            delivery_interval: Duration::from_secs(
                env_or("DELIVERY_SWEEP_INTERVAL_SECS", 300u64).max(1),
            ),
            delivery_clock,
        };

        let is_production = environment == "production";
        Ok(Self {
            jwt: JwtConfig::from_env(is_production)?,
            work_dir,
            database_path,
            http_port: env_or("HTTP_PORT", 8080),
            environment,
            timezone: env_or("TIMEZONE", chrono_tz::Asia::Shanghai),
            log_json: env_or("LOG_JSON", false),
            sweeper,
            shutdown_timeout_ms: env_or("SHUTDOWN_TIMEOUT_MS", 10_000),
        })
    }

    /// Self-contained config rooted at `work_dir`, ignoring the environment.
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<PathBuf>, http_port: u16) -> Self {
        let work_dir = work_dir.into();
        Self {
            database_path: work_dir.join("orders.db"),
            work_dir,
            http_port,
            environment: "development".into(),
            timezone: chrono_tz::Asia::Shanghai,
            log_json: false,
            jwt: JwtConfig::default(),
            sweeper: SweeperConfig::default(),
            shutdown_timeout_ms: 10_000,
        }
    }

    pub fn log_dir(&self) -> PathBuf {
        self.work_dir.join("logs")
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
