use kube::CustomResource;
use schemars::JsonSchema;
use serde::{
    Deserialize,
    Serialize,
};

// A FluentdConfig holds a fragment of log-router configuration for the namespace it lives in; all
// of the FluentdConfigs in a namespace are concatenated (in name order) by the reloader.
#[derive(Clone, CustomResource, Debug, Default, Deserialize, JsonSchema, Serialize)]
#[kube(group = "logs.vdp.vmware.com", version = "v1beta1", kind = "FluentdConfig", namespaced)]
#[kube(shortname = "fluentdconfig", shortname = "fdc")]
#[serde(rename_all = "camelCase")]
pub struct FluentdConfigSpec {
    #[serde(default)]
    pub fluentconf: String,
}
