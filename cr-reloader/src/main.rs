mod fingerprint;

use clap::Parser;
use cr_core::errors::*;
use cr_core::logging;
use cr_core::prelude::*;
use cr_datasource::{
    ConfigSourceKind,
    DatasourceConfig,
    KubeInformerDatasource,
    MergePolicy,
};
use tracing::*;

use crate::fingerprint::fingerprint;

#[derive(Parser, Debug)]
struct Options {
    // Only inspect these namespaces; if empty, every namespace in the cluster is inspected
    #[arg(long, value_delimiter = ',')]
    namespaces: Vec<String>,

    #[arg(long, value_enum, default_value_t = ConfigSourceKind::default())]
    datasource: ConfigSourceKind,

    #[arg(long, value_enum, default_value_t = MergePolicy::default())]
    merge_policy: MergePolicy,

    #[arg(long, default_value = DEFAULT_STATUS_ANNOTATION_KEY)]
    status_annotation: String,

    #[arg(long, default_value = DEFAULT_CONFIGMAP_ANNOTATION_KEY)]
    configmap_annotation: String,

    #[arg(long, default_value = DEFAULT_CONFIGMAP_NAME)]
    default_configmap_name: String,

    #[arg(long, default_value = DEFAULT_CONFIGMAP_KEY)]
    configmap_key: String,

    #[arg(long)]
    configmap_selector: Option<String>,

    // Fail startup if the local caches haven't synced after this many seconds
    #[arg(long)]
    cache_sync_timeout_secs: Option<u64>,

    // If set, the datasource config is read from this YAML file and the flags above are ignored
    #[arg(short, long)]
    config_file: Option<String>,

    #[arg(short, long, default_value = "info")]
    verbosity: String,
}

impl Options {
    fn datasource_config(&self) -> anyhow::Result<DatasourceConfig> {
        if let Some(filename) = &self.config_file {
            return DatasourceConfig::load(filename);
        }

        Ok(DatasourceConfig {
            namespaces: self.namespaces.clone(),
            source: self.datasource,
            merge_policy: self.merge_policy,
            status_annotation: self.status_annotation.clone(),
            cache_sync_timeout_secs: self.cache_sync_timeout_secs,
            configmap_annotation: self.configmap_annotation.clone(),
            default_configmap_name: self.default_configmap_name.clone(),
            configmap_key: self.configmap_key.clone(),
            configmap_selector: self.configmap_selector.clone(),
        })
    }
}

// Stands in for the renderer: fingerprints each namespace's configuration, reports the ones that
// changed since the last pass, and records the new fingerprints.  A failed snapshot leaves the
// recorded fingerprints alone so the next pass starts from the same place.
async fn reconcile(ds: &mut KubeInformerDatasource) {
    let ns_configs = match ds.get_namespace_configs().await {
        Ok(ns_configs) => ns_configs,
        Err(err) => {
            skerr!(err, "could not build namespace configuration snapshot");
            return;
        },
    };

    let mut changed = 0;
    for nc in &ns_configs {
        let fp = fingerprint(nc);
        if fp != nc.previous_config_hash() {
            info!(
                "configuration for namespace {} changed ({} workload(s), fingerprint {fp})",
                nc.name(),
                nc.mini_workloads().len()
            );
            changed += 1;
        }
        ds.record_fingerprint(nc.name(), &fp);
        ds.set_status(nc.name(), "").await;
    }
    info!("reconciled {} namespace(s), {changed} changed", ns_configs.len());
}

#[instrument(ret, err)]
async fn run(args: Options) -> EmptyResult {
    let config = args.datasource_config()?;
    let client = kube::Client::try_default().await?;
    let (mut ds, mut changes) = KubeInformerDatasource::new(client, config).await?;

    reconcile(&mut ds).await;
    loop {
        tokio::select! {
            res = changes.recv() => match res {
                Some(ts) => {
                    debug!("change notification received (observed at {ts})");
                    reconcile(&mut ds).await;
                },
                None => {
                    warn!("change notification channel closed, exiting");
                    break;
                },
            },
            _ = tokio::signal::ctrl_c() => {
                info!("received interrupt, shutting down");
                break;
            },
        }
    }

    ds.shutdown().await;
    Ok(())
}

#[tokio::main]
async fn main() -> EmptyResult {
    let args = Options::parse();
    logging::setup(&args.verbosity);
    run(args).await
}

#[cfg(test)]
mod tests;
