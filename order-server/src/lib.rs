//! Takeout Order Server - 外卖订单核心服务
//!
//! # 架构概述
//!
//! - **购物车** (`cart`): 按 (用户, 商品, 口味) 合并的待下单条目
//! - **订单** (`orders`): 下单事务、状态机、超时 sweeper
//! - **报表** (`reports`): 营业额 / 用户 / 订单 / 销量排行与导出
//! - **数据库** (`db`): SQLite (sqlx) 存储与迁移
//! - **认证** (`auth`): JWT bearer token
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! order-server/src/
//! ├── core/          # 配置、状态、错误、后台任务
//! ├── auth/          # JWT 认证、管理员校验
//! ├── services/      # 目录与地址簿 (外部协作方接口)
//! ├── cart/          # 购物车
//! ├── orders/        # 下单、状态流转、sweeper
//! ├── reports/       # 统计与导出
//! ├── api/           # HTTP 路由和处理器
//! ├── utils/         # 日志、时区、审计字段
//! └── db/            # 数据库层
//! ```

pub mod api;
pub mod auth;
pub mod cart;
pub mod core;
pub mod db;
pub mod orders;
pub mod reports;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

pub fn print_banner() {
    println!(
        r#"
  ____          _
 / __ \________/ /__  _____
/ / / / ___/ __  / _ \/ ___/
/ /_/ / /  / /_/ /  __/ /
\____/_/   \__,_/\___/_/
    "#
    );
}
