//! Domain service for the administrator's reports.
//!
//! Every call recomputes its aggregates from the current table contents.

use serde::Serialize;
use thiserror::Error;

use crate::db::BloqueoEntry;

/// Number of plates shown in the top-plates chart.
pub const TOP_PLATES_LIMIT: u64 = 10;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for ReportError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// One bar or slice of a chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountRow {
    pub label: String,
    pub count: i64,
}

impl From<(String, i64)> for CountRow {
    fn from((label, count): (String, i64)) -> Self {
        Self { label, count }
    }
}

/// Series handed to the charting library.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChartData {
    pub departamentos: Vec<CountRow>,
    /// Keys are `YYYY-MM-DD`.
    pub fechas: Vec<CountRow>,
    /// Ordered by count, highest first.
    pub placas: Vec<CountRow>,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub bloqueos: Vec<BloqueoEntry>,
    pub charts: ChartData,
}

/// Domain service trait for reporting.
#[async_trait::async_trait]
pub trait ReportService: Send + Sync {
    /// Every record with its author, in insertion order.
    async fn list_bloqueos(&self) -> Result<Vec<BloqueoEntry>, ReportError>;

    /// The three chart aggregates.
    async fn chart_data(&self) -> Result<ChartData, ReportError>;

    /// All records plus the chart aggregates.
    async fn build_dashboard(&self) -> Result<Dashboard, ReportError>;
}
