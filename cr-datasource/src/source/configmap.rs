use std::sync::Arc;

use async_trait::async_trait;
use cr_core::errors::*;
use cr_core::prelude::*;
use kube::runtime::reflector::{
    ObjectRef,
    Store,
};
use tracing::*;

use super::ConfigSource;
use crate::config::{
    ConfigSourceKind,
    DatasourceConfig,
    join_fragments,
};
use crate::errors::DatasourceError;
use crate::mirror::store_is_synced;
use crate::readiness::ReadyCheck;

// Reads configuration text out of legacy ConfigMaps.  There are two ways to find the ConfigMaps
// for a namespace:
//
//   1. If a label selector was configured, the ConfigMap watcher only sees matching objects, so
//      every ConfigMap in the namespace contributes to the config.
//   2. Otherwise, the namespace can name its ConfigMap with an annotation; if it doesn't, we
//      look for the default name.  A missing default ConfigMap just means the namespace has no
//      config, but a missing _annotated_ ConfigMap is an error, since someone asked for it.
pub struct ConfigMapSource {
    namespaces: Store<corev1::Namespace>,
    configmaps: Store<corev1::ConfigMap>,

    configmap_annotation: String,
    default_configmap_name: String,
    configmap_key: String,
    use_selector: bool,
}

impl ConfigMapSource {
    pub fn new(
        config: &DatasourceConfig,
        namespaces: Store<corev1::Namespace>,
        configmaps: Store<corev1::ConfigMap>,
    ) -> ConfigMapSource {
        ConfigMapSource {
            namespaces,
            configmaps,
            configmap_annotation: config.configmap_annotation.clone(),
            default_configmap_name: config.default_configmap_name.clone(),
            configmap_key: config.configmap_key.clone(),
            use_selector: config.configmap_selector.is_some(),
        }
    }

    fn find_configmaps(&self, namespace: &str) -> anyhow::Result<Vec<Arc<corev1::ConfigMap>>> {
        if self.use_selector {
            let mut cms: Vec<_> = self
                .configmaps
                .state()
                .into_iter()
                .filter(|cm| cm.namespace().as_deref() == Some(namespace))
                .collect();
            cms.sort_by_key(|cm| cm.name_any());
            return Ok(cms);
        }

        let Some(ns_obj) = self.namespaces.get(&ObjectRef::new(namespace)) else {
            bail!(DatasourceError::namespace_not_found(namespace));
        };

        match ns_obj.annotations().get(&self.configmap_annotation) {
            Some(cm_name) => match self.configmaps.get(&ObjectRef::new(cm_name).within(namespace)) {
                Some(cm) => Ok(vec![cm]),
                None => bail!(DatasourceError::config_object_not_found(&format!("{namespace}/{cm_name}"))),
            },
            None => Ok(self
                .configmaps
                .get(&ObjectRef::new(&self.default_configmap_name).within(namespace))
                .into_iter()
                .collect()),
        }
    }
}

#[async_trait]
impl ConfigSource for ConfigMapSource {
    fn kind(&self) -> ConfigSourceKind {
        ConfigSourceKind::ConfigMap
    }

    async fn fetch_config(&self, namespace: &str) -> anyhow::Result<String> {
        let cms = self.find_configmaps(namespace)?;
        let fragments = cms.iter().filter_map(|cm| {
            let contents = cm.data.as_ref().and_then(|d| d.get(&self.configmap_key));
            if contents.is_none() {
                debug!("configmap {} has no {} key, skipping", cm.namespaced_name(), self.configmap_key);
            }
            contents.cloned()
        });
        Ok(join_fragments(fragments))
    }

    fn is_ready(&self) -> bool {
        store_is_synced(&self.configmaps)
    }

    fn ready_checks(&self) -> Vec<ReadyCheck> {
        vec![ReadyCheck::for_store(&self.configmaps)]
    }
}
