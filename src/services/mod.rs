pub mod report_service;
pub mod stock_service;

pub use report_service::ReportService;
pub use stock_service::StockService;
