pub mod auth_service;
pub use auth_service::{AuthError, AuthService, AuthSession};

pub mod auth_service_impl;
pub use auth_service_impl::SeaOrmAuthService;

pub mod record_service;
pub use record_service::{BloqueoForm, RecordError, RecordService};

pub mod record_service_impl;
pub use record_service_impl::SeaOrmRecordService;

pub mod report_service;
pub use report_service::{ChartData, CountRow, Dashboard, ReportError, ReportService};

pub mod report_service_impl;
pub use report_service_impl::SeaOrmReportService;
