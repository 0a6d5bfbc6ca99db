pub mod store;
pub use store::StudioStore;
pub mod dashboard_service;
pub use dashboard_service::DashboardService;
pub mod report_service;
pub use report_service::ReportService;
