//! Shared HTTP middleware for Filegate

pub mod request_id;

pub use request_id::{request_id_middleware, RequestId};
