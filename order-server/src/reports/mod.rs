//! Analytics (报表统计)
//!
//! 只读聚合：营业额、用户增长、订单完成率、销量排行，以及近 30 日运营报表导出。

pub mod engine;
pub mod export;

pub use engine::{ReportService, TOP_N};
pub use export::{CsvReportSink, RenderedReport, ReportSink};
