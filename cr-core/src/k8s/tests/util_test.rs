use kube::error::ErrorResponse;
use serde_json::json;

use super::*;

fn api_error(code: u16, reason: &str) -> kube::Error {
    kube::Error::Api(ErrorResponse {
        status: "Failure".into(),
        message: format!("{reason} for testing"),
        reason: reason.into(),
        code,
    })
}

#[rstest]
#[case::containerd("containerd://abcd1234", "abcd1234")]
#[case::docker("docker://ffff", "ffff")]
#[case::bare("abcd1234", "abcd1234")]
#[case::empty("", "")]
fn test_strip_runtime_prefix(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(strip_runtime_prefix(input), expected);
}

#[rstest]
fn test_is_conflict() {
    assert!(is_conflict(&api_error(409, "Conflict")));
    assert!(!is_conflict(&api_error(404, "NotFound")));
    assert!(is_not_found(&api_error(404, "NotFound")));
    assert_eq!(api_error_code(&api_error(500, "InternalError")), Some(500));
}

#[rstest]
fn test_container_id_for() {
    let pod: corev1::Pod = serde_json::from_value(json!({
        "metadata": {"name": "the-pod", "namespace": "the-namespace"},
        "spec": {"containers": [{"name": "app"}, {"name": "sidecar"}]},
        "status": {
            "containerStatuses": [
                {
                    "name": "app",
                    "containerID": "containerd://0123abcd",
                    "image": "app:latest",
                    "imageID": "",
                    "ready": true,
                    "restartCount": 0,
                },
            ],
        },
    }))
    .unwrap();

    assert_eq!(pod.container_id_for("app"), Some("0123abcd".into()));
    assert_eq!(pod.container_id_for("sidecar"), None);
    assert_eq!(pod.namespaced_name(), "the-namespace/the-pod");
    assert_eq!(pod.spec().unwrap().containers.len(), 2);
}

#[rstest]
fn test_pod_spec_missing() {
    let pod = corev1::Pod::default();
    let err = pod.spec().unwrap_err().downcast::<KubernetesError>().unwrap();
    assert!(matches!(err, KubernetesError::FieldNotFound(_)));
}
