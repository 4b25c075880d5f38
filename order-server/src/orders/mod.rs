//! Orders (订单)
//!
//! - [`OrderService`] - 下单与状态流转
//! - [`LifecycleSweeper`] - 超时取消 / 自动完成
//! - [`money`] - 金额计算
//! - [`number`] - 订单号生成

pub mod money;
pub mod number;
pub mod service;
pub mod sweeper;

pub use number::{OrderNumberSource, TimestampNumbers};
pub use service::OrderService;
pub use sweeper::{LifecycleSweeper, SweepKind, SweepOutcome};
