pub mod run_config;
pub mod run_report;
