pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;

pub use config::Config;
pub use db::{ResponseStore, StorageError, StorageInitError};
pub use domain::{NewResponse, PayloadError, ResponseRecord};
pub use error::AppError;
