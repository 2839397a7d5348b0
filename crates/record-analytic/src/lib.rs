pub mod analytic;
pub mod config;
pub mod error;
pub mod telemetry;
