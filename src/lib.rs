pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;

pub use crate::config::AppConfig;
pub use db::create_pool;
pub use error::ReportError;
pub use service::ReportService;
