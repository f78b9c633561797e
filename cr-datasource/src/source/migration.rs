use async_trait::async_trait;

use super::ConfigSource;
use crate::config::{
    ConfigSourceKind,
    MergePolicy,
};
use crate::readiness::ReadyCheck;

// Used while moving a cluster from ConfigMaps to FluentdConfigs: both sources are read for every
// namespace and the results are combined according to the configured merge policy.  An error from
// either source fails the fetch.
pub struct MigrationSource {
    legacy: Box<dyn ConfigSource>,
    custom: Box<dyn ConfigSource>,
    policy: MergePolicy,
}

impl MigrationSource {
    pub fn new(legacy: Box<dyn ConfigSource>, custom: Box<dyn ConfigSource>, policy: MergePolicy) -> MigrationSource {
        MigrationSource { legacy, custom, policy }
    }
}

#[async_trait]
impl ConfigSource for MigrationSource {
    fn kind(&self) -> ConfigSourceKind {
        ConfigSourceKind::Migration
    }

    async fn fetch_config(&self, namespace: &str) -> anyhow::Result<String> {
        let legacy = self.legacy.fetch_config(namespace).await?;
        let custom = self.custom.fetch_config(namespace).await?;
        Ok(self.policy.merge(legacy, custom))
    }

    fn is_ready(&self) -> bool {
        self.legacy.is_ready() && self.custom.is_ready()
    }

    fn ready_checks(&self) -> Vec<ReadyCheck> {
        let mut checks = self.legacy.ready_checks();
        checks.extend(self.custom.ready_checks());
        checks
    }
}
