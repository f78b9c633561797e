mod configmap;
mod custom_resource;
mod migration;

use async_trait::async_trait;
use cr_core::prelude::*;
#[cfg(any(test, feature = "mock"))]
use mockall::automock;
use kube::runtime::reflector::Store;
use kube::runtime::watcher;
use tokio::task::JoinSet;

pub use self::configmap::ConfigMapSource;
pub use self::custom_resource::CustomResourceSource;
pub use self::migration::MigrationSource;
use crate::config::{
    ConfigSourceKind,
    DatasourceConfig,
};
use crate::mirror::{
    ChangeNotifier,
    spawn_reflector,
};
use crate::readiness::ReadyCheck;

// The contract shared by every backend that knows how to find the configuration text for a
// namespace.  Implementations only ever read from their own local caches; failures are returned
// to the caller and never retried here.
#[cfg_attr(any(test, feature = "mock"), automock)]
#[async_trait]
pub trait ConfigSource: Send + Sync {
    fn kind(&self) -> ConfigSourceKind;

    async fn fetch_config(&self, namespace: &str) -> anyhow::Result<String>;

    // Non-blocking: true once every cache this source reads from has synced
    fn is_ready(&self) -> bool;

    // The futures the readiness barrier should wait on before this source can be read from
    fn ready_checks(&self) -> Vec<ReadyCheck>;
}

// Builds the config source selected in the config, starting whatever watchers it needs on the
// datasource's JoinSet.  The namespace store is shared with the datasource itself.
pub(crate) fn build_config_source(
    config: &DatasourceConfig,
    client: &kube::Client,
    namespaces: &Store<corev1::Namespace>,
    js: &mut JoinSet<()>,
    notifier: &ChangeNotifier,
) -> Box<dyn ConfigSource> {
    match config.source {
        ConfigSourceKind::ConfigMap => Box::new(build_configmap_source(config, client, namespaces, js, notifier)),
        ConfigSourceKind::CustomResource => Box::new(build_custom_resource_source(client, js, notifier)),
        ConfigSourceKind::Migration => Box::new(MigrationSource::new(
            Box::new(build_configmap_source(config, client, namespaces, js, notifier)),
            Box::new(build_custom_resource_source(client, js, notifier)),
            config.merge_policy,
        )),
    }
}

fn build_configmap_source(
    config: &DatasourceConfig,
    client: &kube::Client,
    namespaces: &Store<corev1::Namespace>,
    js: &mut JoinSet<()>,
    notifier: &ChangeNotifier,
) -> ConfigMapSource {
    let mut wc = watcher::Config::default();
    if let Some(sel) = config.configmap_selector.as_deref() {
        wc = wc.labels(sel);
    }
    let api = kube::Api::<corev1::ConfigMap>::all(client.clone());
    let configmaps = spawn_reflector(js, api, wc, notifier.clone());
    ConfigMapSource::new(config, namespaces.clone(), configmaps)
}

fn build_custom_resource_source(
    client: &kube::Client,
    js: &mut JoinSet<()>,
    notifier: &ChangeNotifier,
) -> CustomResourceSource {
    let api = kube::Api::<FluentdConfig>::all(client.clone());
    let fluentd_configs = spawn_reflector(js, api, Default::default(), notifier.clone());
    CustomResourceSource::new(fluentd_configs)
}

#[cfg(test)]
mod tests;
