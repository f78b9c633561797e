#![cfg_attr(coverage, feature(coverage_attribute))]
mod config;
mod datasource;
mod errors;
mod hashes;
mod mirror;
mod readiness;
mod source;
mod status;
mod workload;

pub use crate::config::{
    ConfigSourceKind,
    DatasourceConfig,
    MergePolicy,
};
pub use crate::datasource::{
    KubeInformerDatasource,
    NamespaceConfig,
};
pub use crate::errors::DatasourceError;
pub use crate::hashes::HashStore;
pub use crate::mirror::{
    ChangeNotifier,
    ChangeReceiver,
};
pub use crate::readiness::{
    ReadinessBarrier,
    ReadyCheck,
};
#[cfg(feature = "mock")]
pub use crate::source::MockConfigSource;
pub use crate::source::{
    ConfigMapSource,
    ConfigSource,
    CustomResourceSource,
    MigrationSource,
};
pub use crate::status::{
    StatusOutcome,
    StatusReconciler,
};
pub use crate::workload::{
    HostMount,
    MiniWorkload,
};

#[cfg(test)]
mod tests;
