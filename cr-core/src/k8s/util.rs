use kube::Resource;
use kube::error::ErrorResponse;

use super::*;

const HTTP_NOT_FOUND: u16 = 404;
const HTTP_CONFLICT: u16 = 409;

impl<T: Resource> KubeResourceExt for T {
    fn namespaced_name(&self) -> String {
        match self.namespace() {
            Some(ns) => format!("{}/{}", ns, self.name_any()),
            None => self.name_any(),
        }
    }
}

impl PodExt for corev1::Pod {
    fn spec(&self) -> anyhow::Result<&corev1::PodSpec> {
        match self.spec.as_ref() {
            None => bail!(KubernetesError::field_not_found("pod spec")),
            Some(ps) => Ok(ps),
        }
    }

    // Container statuses are keyed by container name, and may not exist yet if the pod hasn't
    // been scheduled; the returned ID has the runtime scheme stripped off.
    fn container_id_for(&self, container_name: &str) -> Option<String> {
        self.status
            .as_ref()?
            .container_statuses
            .as_ref()?
            .iter()
            .find(|cs| cs.name == container_name)?
            .container_id
            .as_deref()
            .map(strip_runtime_prefix)
    }
}

// Container IDs come back from the kubelet as e.g. "containerd://abcd1234"; the rendering layer
// only wants the "abcd1234" bit.
pub fn strip_runtime_prefix(container_id: &str) -> String {
    match container_id.split_once("://") {
        Some((_, id)) => id.into(),
        None => container_id.into(),
    }
}

pub fn api_error_code(err: &kube::Error) -> Option<u16> {
    match err {
        kube::Error::Api(ErrorResponse { code, .. }) => Some(*code),
        _ => None,
    }
}

pub fn is_not_found(err: &kube::Error) -> bool {
    api_error_code(err) == Some(HTTP_NOT_FOUND)
}

// The apiserver returns 409 Conflict when an update carries a stale resourceVersion
pub fn is_conflict(err: &kube::Error) -> bool {
    api_error_code(err) == Some(HTTP_CONFLICT)
}
