//! Reports API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::Deserialize;
use shared::models::{BusinessData, OrderReport, SalesTopReport, TurnoverReport, UserReport};
use shared::util::now_millis;

use crate::core::ServerState;
use crate::orders::{SweepKind, SweepOutcome};
use crate::utils::time;
use crate::utils::{AppError, AppResult};

/// Raw query; parsed here so bad dates get the usual error envelope
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub begin: String,
    pub end: String,
}

impl RangeQuery {
    fn parse(&self) -> AppResult<(NaiveDate, NaiveDate)> {
        Ok((time::parse_date(&self.begin)?, time::parse_date(&self.end)?))
    }
}

pub async fn turnover(
    State(state): State<ServerState>,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<TurnoverReport>> {
    let (begin, end) = query.parse()?;
    Ok(Json(state.reports.turnover(begin, end).await?))
}

pub async fn users(
    State(state): State<ServerState>,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<UserReport>> {
    let (begin, end) = query.parse()?;
    Ok(Json(state.reports.user_growth(begin, end).await?))
}

pub async fn orders(
    State(state): State<ServerState>,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<OrderReport>> {
    let (begin, end) = query.parse()?;
    Ok(Json(state.reports.order_stats(begin, end).await?))
}

pub async fn top10(
    State(state): State<ServerState>,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<SalesTopReport>> {
    let (begin, end) = query.parse()?;
    Ok(Json(state.reports.top_sales(begin, end).await?))
}

/// 今日运营数据（工作台）
pub async fn business_today(State(state): State<ServerState>) -> AppResult<Json<BusinessData>> {
    let today = time::today(state.reports.timezone());
    Ok(Json(state.reports.business_day(today).await?))
}

/// 近 30 日运营报表（不含今天），以附件形式下载
pub async fn export(State(state): State<ServerState>) -> AppResult<Response> {
    let today = time::today(state.reports.timezone());
    let report = state.reports.business_report(today).await?;
    let rendered = state.export_sink.render(&report)?;

    tracing::info!(
        file = %rendered.file_name,
        bytes = rendered.body.len(),
        "Business report exported"
    );

    let disposition = format!("attachment; filename=\"{}\"", rendered.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, rendered.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        rendered.body,
    )
        .into_response())
}

/// 手动触发一次 sweep；同类 sweep 正在运行时返回冲突
pub async fn run_sweep(
    State(state): State<ServerState>,
    Path(kind): Path<String>,
) -> AppResult<Json<SweepOutcome>> {
    let kind: SweepKind = kind.parse()?;
    match state.sweeper.run(kind, now_millis()).await? {
        Some(outcome) => Ok(Json(outcome)),
        None => Err(AppError::conflict(format!("{kind} sweep already running"))),
    }
}
