mod fluentd_config;

pub use fluentd_config::*;
