use std::collections::{
    BTreeMap,
    HashMap,
};

use cr_core::prelude::*;
use serde::Serialize;
use tracing::*;

#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostMount {
    pub host_path: String,
    pub mount_path: String,
}

// A compact, owned projection of one container in a running pod, carrying just the fields that
// the rendering stage uses for templating.  Everything here is copied out of the cached pod, so
// later changes to the cache can't leak into a snapshot that's already been handed out.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MiniWorkload {
    pub pod_id: String,
    pub pod_name: String,
    pub namespace: String,
    pub name: String,
    pub image: String,
    pub container_id: Option<String>,
    pub node_name: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub host_mounts: Vec<HostMount>,
}

impl MiniWorkload {
    pub fn from_pod(pod: &corev1::Pod) -> Vec<MiniWorkload> {
        let spec = match pod.spec() {
            Ok(spec) => spec,
            Err(err) => {
                debug!("skipping pod {}: {err}", pod.namespaced_name());
                return vec![];
            },
        };

        let host_paths: HashMap<&str, &str> = spec
            .volumes
            .iter()
            .flatten()
            .filter_map(|v| Some((v.name.as_str(), v.host_path.as_ref()?.path.as_str())))
            .collect();

        spec.containers
            .iter()
            .map(|container| MiniWorkload {
                pod_id: pod.uid().unwrap_or_default(),
                pod_name: pod.name_any(),
                namespace: pod.namespace().unwrap_or_default(),
                name: container.name.clone(),
                image: container.image.clone().unwrap_or_default(),
                container_id: pod.container_id_for(&container.name),
                node_name: spec.node_name.clone(),
                labels: pod.labels().clone(),
                host_mounts: container
                    .volume_mounts
                    .iter()
                    .flatten()
                    .filter_map(|vm| {
                        Some(HostMount {
                            host_path: host_paths.get(vm.name.as_str())?.to_string(),
                            mount_path: vm.mount_path.clone(),
                        })
                    })
                    .collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use cr_testutils::*;
    use rstest::*;

    use super::*;

    #[rstest]
    fn test_from_pod(test_pod: corev1::Pod) {
        let minis = MiniWorkload::from_pod(&test_pod);
        assert_eq!(
            minis,
            vec![MiniWorkload {
                pod_id: format!("{TEST_NAMESPACE}-{TEST_POD}-uid"),
                pod_name: TEST_POD.into(),
                namespace: TEST_NAMESPACE.into(),
                name: TEST_CONTAINER.into(),
                image: TEST_IMAGE.into(),
                container_id: Some("0123456789abcdef".into()),
                node_name: Some(TEST_NODE.into()),
                labels: BTreeMap::from([("app".into(), TEST_POD.into())]),
                host_mounts: vec![HostMount { host_path: "/var/log/apps".into(), mount_path: "/var/log".into() }],
            }]
        );
    }

    #[rstest]
    fn test_from_pod_no_spec() {
        let pod = corev1::Pod::default();
        assert!(MiniWorkload::from_pod(&pod).is_empty());
    }

    #[rstest]
    fn test_from_pod_is_a_copy(mut test_pod: corev1::Pod) {
        let minis = MiniWorkload::from_pod(&test_pod);
        test_pod.labels_mut().insert("app".into(), "changed".into());
        assert_eq!(minis[0].labels["app"], TEST_POD);
    }
}
