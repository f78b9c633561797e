use std::fs::File;

use clap::ValueEnum;
use cr_core::prelude::*;
use serde::{
    Deserialize,
    Serialize,
};

// Where namespace-scoped configuration text lives.  This is chosen once when the datasource is
// constructed and never changes afterwards.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize, ValueEnum)]
pub enum ConfigSourceKind {
    #[default]
    #[serde(rename = "legacy", alias = "configmap")]
    #[value(name = "legacy", alias = "configmap")]
    ConfigMap,

    #[serde(rename = "crd", alias = "custom-resource")]
    #[value(name = "crd", alias = "custom-resource")]
    CustomResource,

    #[serde(rename = "migration")]
    #[value(name = "migration")]
    Migration,
}

// How the migration source combines the legacy ConfigMap text with the FluentdConfig text when a
// namespace has both.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MergePolicy {
    // Legacy text first, then custom resource text
    #[default]
    Concatenate,
    PreferCustomResource,
    PreferConfigMap,
}

impl MergePolicy {
    pub fn merge(&self, legacy: String, custom: String) -> String {
        match self {
            MergePolicy::Concatenate => join_fragments([legacy, custom]),
            MergePolicy::PreferCustomResource if custom.is_empty() => legacy,
            MergePolicy::PreferCustomResource => custom,
            MergePolicy::PreferConfigMap if legacy.is_empty() => custom,
            MergePolicy::PreferConfigMap => legacy,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatasourceConfig {
    // If non-empty, only these namespaces are inspected; otherwise every namespace is
    pub namespaces: Vec<String>,
    pub source: ConfigSourceKind,
    pub merge_policy: MergePolicy,
    pub status_annotation: String,

    // Give up on startup if the local caches haven't synced within this many seconds; if unset,
    // wait forever
    pub cache_sync_timeout_secs: Option<u64>,

    // Options for the legacy ConfigMap source
    pub configmap_annotation: String,
    pub default_configmap_name: String,
    pub configmap_key: String,
    pub configmap_selector: Option<String>,
}

impl Default for DatasourceConfig {
    fn default() -> Self {
        DatasourceConfig {
            namespaces: vec![],
            source: ConfigSourceKind::default(),
            merge_policy: MergePolicy::default(),
            status_annotation: DEFAULT_STATUS_ANNOTATION_KEY.into(),
            cache_sync_timeout_secs: None,
            configmap_annotation: DEFAULT_CONFIGMAP_ANNOTATION_KEY.into(),
            default_configmap_name: DEFAULT_CONFIGMAP_NAME.into(),
            configmap_key: DEFAULT_CONFIGMAP_KEY.into(),
            configmap_selector: None,
        }
    }
}

impl DatasourceConfig {
    pub fn load(filename: &str) -> anyhow::Result<DatasourceConfig> {
        Ok(serde_yaml::from_reader(File::open(filename)?)?)
    }
}

// Empty fragments are dropped so that a namespace with only one kind of config object doesn't end
// up with stray separators in its text.
pub(crate) fn join_fragments(fragments: impl IntoIterator<Item = String>) -> String {
    fragments
        .into_iter()
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>()
        .join(CONFIG_FRAGMENT_SEPARATOR)
}
