pub mod apis;
pub mod app;
pub mod config;
pub mod constants;
pub mod country;
pub mod error;
pub mod infra;
pub mod logging;
pub mod matching;
pub mod menu;
pub mod observability;
pub mod pipeline;
pub mod report;
pub mod types;
