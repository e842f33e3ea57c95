//! Open-data ingestion feature
//!
//! Agreement export uploads and agreement resets.

pub mod commands;
pub mod routes;

pub use routes::open_data_routes;
