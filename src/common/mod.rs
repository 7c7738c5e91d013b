pub mod api_client;
pub mod authenticator;
pub mod config;
pub mod csv_import;
pub mod metrics;
pub mod peloton_client;
pub mod storage;
pub mod summary;
pub mod throttle;
pub mod types;
