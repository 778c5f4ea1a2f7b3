//! Infrastructure layer - Store, provider and service implementations

pub mod embedding;
pub mod http_client;
pub mod logging;
pub mod observability;
pub mod services;
pub mod vector_store;
