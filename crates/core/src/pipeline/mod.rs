pub mod capture_loop;
pub mod pipeline_config;
pub mod pipeline_logger;
pub mod presenter;
pub mod snapshot;
