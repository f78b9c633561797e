use async_trait::async_trait;
use cr_core::prelude::*;
use kube::runtime::reflector::Store;

use super::ConfigSource;
use crate::config::{
    ConfigSourceKind,
    join_fragments,
};
use crate::mirror::store_is_synced;
use crate::readiness::ReadyCheck;

// Reads configuration text out of FluentdConfig custom resources; every FluentdConfig in the
// namespace contributes, in name order.
pub struct CustomResourceSource {
    fluentd_configs: Store<FluentdConfig>,
}

impl CustomResourceSource {
    pub fn new(fluentd_configs: Store<FluentdConfig>) -> CustomResourceSource {
        CustomResourceSource { fluentd_configs }
    }
}

#[async_trait]
impl ConfigSource for CustomResourceSource {
    fn kind(&self) -> ConfigSourceKind {
        ConfigSourceKind::CustomResource
    }

    async fn fetch_config(&self, namespace: &str) -> anyhow::Result<String> {
        let mut objs: Vec<_> = self
            .fluentd_configs
            .state()
            .into_iter()
            .filter(|fdc| fdc.namespace().as_deref() == Some(namespace))
            .collect();
        objs.sort_by_key(|fdc| fdc.name_any());

        Ok(join_fragments(objs.iter().map(|fdc| fdc.spec.fluentconf.clone())))
    }

    fn is_ready(&self) -> bool {
        store_is_synced(&self.fluentd_configs)
    }

    fn ready_checks(&self) -> Vec<ReadyCheck> {
        vec![ReadyCheck::for_store(&self.fluentd_configs)]
    }
}
