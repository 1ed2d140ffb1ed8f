//! `SeaORM` implementation of the `ReportService` trait.

use crate::db::{BloqueoEntry, Store};
use crate::services::report_service::{
    ChartData, CountRow, Dashboard, ReportError, ReportService, TOP_PLATES_LIMIT,
};
use async_trait::async_trait;

pub struct SeaOrmReportService {
    store: Store,
}

impl SeaOrmReportService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

fn to_rows(rows: Vec<(String, i64)>) -> Vec<CountRow> {
    rows.into_iter().map(CountRow::from).collect()
}

#[async_trait]
impl ReportService for SeaOrmReportService {
    async fn list_bloqueos(&self) -> Result<Vec<BloqueoEntry>, ReportError> {
        Ok(self.store.list_bloqueos().await?)
    }

    async fn chart_data(&self) -> Result<ChartData, ReportError> {
        let (departamentos, fechas, placas) = tokio::try_join!(
            self.store.count_bloqueos_by_department(),
            self.store.count_bloqueos_by_date(),
            self.store.top_plates(TOP_PLATES_LIMIT),
        )?;

        Ok(ChartData {
            departamentos: to_rows(departamentos),
            fechas: to_rows(fechas),
            placas: to_rows(placas),
        })
    }

    async fn build_dashboard(&self) -> Result<Dashboard, ReportError> {
        let (bloqueos, charts) = tokio::try_join!(self.list_bloqueos(), self.chart_data())?;
        Ok(Dashboard { bloqueos, charts })
    }
}
