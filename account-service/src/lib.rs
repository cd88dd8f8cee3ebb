pub mod app;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod methods;
pub mod metrics;
pub mod model;
pub mod password;
pub mod service;
pub mod store;

pub use app::{build_app, router, AppState};
pub use config::{load_service_config, ServiceConfig};
pub use error::{ServiceError, ServiceResult};
pub use service::AccountService;
