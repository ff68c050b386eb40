pub mod classify;
pub mod config;
pub mod error;
pub mod filters;
pub mod metrics_consts;
pub mod pipeline;
pub mod sinks;
pub mod source;
pub mod types;
