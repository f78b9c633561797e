use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clockabilly::UtcClock;
use cr_core::prelude::*;
use kube::runtime::reflector::{
    ObjectRef,
    Store,
};
use tokio::task::JoinSet;
use tracing::*;

use crate::config::DatasourceConfig;
use crate::errors::DatasourceError;
use crate::hashes::HashStore;
use crate::mirror::{
    ChangeNotifier,
    ChangeReceiver,
    spawn_reflector,
    store_is_synced,
};
use crate::readiness::ReadinessBarrier;
use crate::source::{
    ConfigSource,
    build_config_source,
};
use crate::status::{
    StatusOutcome,
    StatusReconciler,
};
use crate::workload::MiniWorkload;

// Everything the renderer needs to know about one namespace, as of a single pass.  Note that the
// config hash is the one recorded on the _previous_ pass, so the renderer can tell whether
// anything changed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NamespaceConfig {
    name: String,
    config_text: String,
    previous_config_hash: String,
    labels: BTreeMap<String, String>,
    mini_workloads: Vec<MiniWorkload>,
}

impl NamespaceConfig {
    pub fn new(
        name: &str,
        config_text: String,
        previous_config_hash: String,
        labels: BTreeMap<String, String>,
        mini_workloads: Vec<MiniWorkload>,
    ) -> NamespaceConfig {
        NamespaceConfig {
            name: name.into(),
            config_text,
            previous_config_hash,
            labels,
            mini_workloads,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config_text(&self) -> &str {
        &self.config_text
    }

    pub fn previous_config_hash(&self) -> &str {
        &self.previous_config_hash
    }

    pub fn labels(&self) -> &BTreeMap<String, String> {
        &self.labels
    }

    pub fn mini_workloads(&self) -> &[MiniWorkload] {
        &self.mini_workloads
    }
}

// The KubeInformerDatasource owns the local caches of namespaces and pods (plus whatever the
// selected config source watches), and joins them together into per-namespace snapshots.  The
// watcher tasks live on the JoinSet and are aborted when the datasource is dropped.
pub struct KubeInformerDatasource {
    config: DatasourceConfig,
    hashes: HashStore,
    source: Box<dyn ConfigSource>,
    namespaces: Store<corev1::Namespace>,
    pods: Store<corev1::Pod>,
    status: StatusReconciler,
    js: JoinSet<()>,
}

impl KubeInformerDatasource {
    // Starts all the watchers and then blocks until every local cache has synced.  If any of them
    // can't sync, this fails; we never hand back a datasource that could read from an empty cache.
    pub async fn new(client: kube::Client, config: DatasourceConfig) -> anyhow::Result<(Self, ChangeReceiver)> {
        let (notifier, change_rx) = ChangeNotifier::new(Arc::new(UtcClock));
        let mut js = JoinSet::new();

        let namespaces = spawn_reflector(
            &mut js,
            kube::Api::<corev1::Namespace>::all(client.clone()),
            Default::default(),
            notifier.clone(),
        );
        let pods = spawn_reflector(
            &mut js,
            kube::Api::<corev1::Pod>::all(client.clone()),
            Default::default(),
            notifier.clone(),
        );
        let source = build_config_source(&config, &client, &namespaces, &mut js, &notifier);
        info!("using {:?} config source", source.kind());

        let mut barrier = ReadinessBarrier::new()
            .with_store(&namespaces)
            .with_store(&pods)
            .with_checks(source.ready_checks());
        if let Some(secs) = config.cache_sync_timeout_secs {
            barrier = barrier.with_timeout(Duration::from_secs(secs));
        }
        barrier
            .wait()
            .await
            .context("failed to sync local cache with upstream Kubernetes API")?;
        info!("synced local cache with upstream Kubernetes API");

        Ok((Self::from_parts(client, config, namespaces, pods, source, js), change_rx))
    }

    pub(crate) fn from_parts(
        client: kube::Client,
        config: DatasourceConfig,
        namespaces: Store<corev1::Namespace>,
        pods: Store<corev1::Pod>,
        source: Box<dyn ConfigSource>,
        js: JoinSet<()>,
    ) -> Self {
        let status = StatusReconciler::new(client, &config.status_annotation);
        KubeInformerDatasource {
            config,
            hashes: HashStore::new(),
            source,
            namespaces,
            pods,
            status,
            js,
        }
    }

    // Builds one NamespaceConfig per in-scope namespace, in sorted order.  This is all-or-nothing:
    // if anything goes wrong for any namespace, no configs are returned at all, since a partial
    // list would cause the renderer to silently drop some namespace's configuration.
    pub async fn get_namespace_configs(&self) -> anyhow::Result<Vec<NamespaceConfig>> {
        let names = self.discover_namespaces();

        let mut ns_configs = Vec::with_capacity(names.len());
        for name in names {
            let Some(ns_obj) = self.namespaces.get(&ObjectRef::new(&name)) else {
                return Err(DatasourceError::namespace_not_found(&name));
            };

            let config_text = self
                .source
                .fetch_config(&name)
                .await
                .context(DatasourceError::FetchFailed(name.clone()))?;

            ns_configs.push(NamespaceConfig::new(
                &name,
                config_text,
                self.hashes.get(&name),
                ns_obj.labels().clone(),
                self.mini_workloads_for(&name),
            ));
        }

        Ok(ns_configs)
    }

    pub fn record_fingerprint(&mut self, namespace: &str, fingerprint: &str) {
        self.hashes.record(namespace, fingerprint);
    }

    pub async fn set_status(&self, namespace: &str, status: &str) -> StatusOutcome {
        self.status.set_status(namespace, status).await
    }

    // Non-blocking: true if the namespace and pod caches and the config source have all synced
    pub fn is_ready(&self) -> bool {
        store_is_synced(&self.namespaces) && store_is_synced(&self.pods) && self.source.is_ready()
    }

    pub async fn shutdown(&mut self) {
        self.js.shutdown().await;
    }

    // Uses the configured namespace list if there is one, otherwise everything in the cache
    pub(crate) fn discover_namespaces(&self) -> Vec<String> {
        let mut names: Vec<String> = if !self.config.namespaces.is_empty() {
            self.config.namespaces.clone()
        } else {
            self.namespaces.state().iter().map(|ns| ns.name_any()).collect()
        };
        names.sort();
        names
    }

    // The store hands back pods in arbitrary order, so sort them to keep snapshots stable
    fn mini_workloads_for(&self, namespace: &str) -> Vec<MiniWorkload> {
        let mut pods: Vec<_> = self
            .pods
            .state()
            .into_iter()
            .filter(|pod| pod.namespace().as_deref() == Some(namespace))
            .collect();
        pods.sort_by_key(|pod| pod.name_any());
        pods.iter().flat_map(|pod| MiniWorkload::from_pod(pod)).collect()
    }
}
