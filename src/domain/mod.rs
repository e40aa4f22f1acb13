//! Domain types for submitted responses.

pub mod response;

pub use response::{NewResponse, PayloadError, ResponseRecord};
