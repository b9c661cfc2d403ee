pub mod api_client;
pub mod auth;
pub mod charts;
pub mod report_store;
