//! Business report rendering
//!
//! The engine computes [`BusinessReport`]; a [`ReportSink`] owns the file
//! format. The bundled sink writes CSV: a header block with the range and
//! overview, then one row per day.

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{BusinessData, BusinessReport};

/// A rendered document ready to hand to the client
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub file_name: String,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

pub trait ReportSink: Send + Sync {
    fn render(&self, report: &BusinessReport) -> AppResult<RenderedReport>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvReportSink;

const COLUMNS: [&str; 6] = [
    "date",
    "turnover",
    "valid_order_count",
    "order_completion_rate",
    "unit_price",
    "new_users",
];

impl ReportSink for CsvReportSink {
    fn render(&self, report: &BusinessReport) -> AppResult<RenderedReport> {
        let mut wtr = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());

        let begin = report.begin.to_string();
        let end = report.end.to_string();
        wtr.write_record(["business report", begin.as_str(), end.as_str()])
            .map_err(export_failed)?;
        wtr.write_record(COLUMNS).map_err(export_failed)?;
        wtr.write_record(figures("overview", &report.overview))
            .map_err(export_failed)?;
        for day in &report.days {
            wtr.write_record(figures(&day.date.to_string(), &day.data))
                .map_err(export_failed)?;
        }

        let body = wtr
            .into_inner()
            .map_err(|e| AppError::with_message(ErrorCode::ExportFailed, e.to_string()))?;

        Ok(RenderedReport {
            file_name: format!("business-report-{}-{}.csv", report.begin, report.end),
            content_type: "text/csv; charset=utf-8",
            body,
        })
    }
}

fn figures(label: &str, data: &BusinessData) -> [String; 6] {
    [
        label.to_string(),
        format!("{:.2}", data.turnover),
        data.valid_order_count.to_string(),
        format!("{:.4}", data.order_completion_rate),
        format!("{:.2}", data.unit_price),
        data.new_users.to_string(),
    ]
}

fn export_failed(err: csv::Error) -> AppError {
    tracing::error!(error = %err, "Failed to write report");
    AppError::with_message(ErrorCode::ExportFailed, err.to_string())
}
