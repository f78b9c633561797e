use std::collections::BTreeMap;

use cr_api::v1beta1::{
    FluentdConfig,
    FluentdConfigSpec,
};
use cr_core::constants::KUBERNETES_IO_METADATA_NAME_KEY;
use cr_core::klabel;
use k8s_openapi::api::core::v1 as corev1;
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;
use rstest::*;
use serde_json::json;

use crate::constants::*;

#[fixture]
pub fn test_namespace(#[default(TEST_NAMESPACE)] name: &str) -> corev1::Namespace {
    corev1::Namespace {
        metadata: metav1::ObjectMeta {
            name: Some(name.into()),
            labels: klabel!(KUBERNETES_IO_METADATA_NAME_KEY => name),
            resource_version: Some(TEST_RESOURCE_VERSION.into()),
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn test_namespace_with_annotations(name: &str, annotations: &[(&str, &str)]) -> corev1::Namespace {
    let mut ns = test_namespace(name);
    ns.metadata.annotations = Some(annotations.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect());
    ns
}

// A single-container pod with a hostPath volume mounted into the container, plus an unrelated
// emptyDir volume that should never show up in a workload projection.
#[fixture]
pub fn test_pod(#[default(TEST_NAMESPACE)] namespace: &str, #[default(TEST_POD)] name: &str) -> corev1::Pod {
    serde_json::from_value(json!({
        "metadata": {
            "name": name,
            "namespace": namespace,
            "uid": format!("{namespace}-{name}-uid"),
            "labels": {"app": name},
        },
        "spec": {
            "nodeName": TEST_NODE,
            "containers": [{
                "name": TEST_CONTAINER,
                "image": TEST_IMAGE,
                "volumeMounts": [
                    {"name": "varlog", "mountPath": "/var/log"},
                    {"name": "scratch", "mountPath": "/scratch"},
                ],
            }],
            "volumes": [
                {"name": "varlog", "hostPath": {"path": "/var/log/apps"}},
                {"name": "scratch", "emptyDir": {}},
            ],
        },
        "status": {
            "containerStatuses": [{
                "name": TEST_CONTAINER,
                "containerID": "containerd://0123456789abcdef",
                "image": TEST_IMAGE,
                "imageID": "",
                "ready": true,
                "restartCount": 0,
            }],
        },
    }))
    .expect("test pod fixture is valid")
}

#[fixture]
pub fn test_configmap(
    #[default(TEST_NAMESPACE)] namespace: &str,
    #[default(TEST_CONFIGMAP)] name: &str,
    #[default("<match **>\n  @type stdout\n</match>")] contents: &str,
) -> corev1::ConfigMap {
    corev1::ConfigMap {
        metadata: metav1::ObjectMeta {
            name: Some(name.into()),
            namespace: Some(namespace.into()),
            ..Default::default()
        },
        data: Some(BTreeMap::from([(TEST_CONFIGMAP_KEY.into(), contents.into())])),
        ..Default::default()
    }
}

#[fixture]
pub fn test_fluentd_config(
    #[default(TEST_NAMESPACE)] namespace: &str,
    #[default(TEST_FLUENTD_CONFIG)] name: &str,
    #[default("<match **>\n  @type null\n</match>")] contents: &str,
) -> FluentdConfig {
    let mut obj = FluentdConfig::new(name, FluentdConfigSpec { fluentconf: contents.into() });
    obj.metadata.namespace = Some(namespace.into());
    obj
}
