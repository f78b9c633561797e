pub const TEST_NAMESPACE: &str = "test-namespace";
pub const TEST_OTHER_NAMESPACE: &str = "other-namespace";
pub const TEST_POD: &str = "the-pod";
pub const TEST_CONTAINER: &str = "the-container";
pub const TEST_IMAGE: &str = "docker.foo:1234/the-image:latest";
pub const TEST_NODE: &str = "the-node";
pub const TEST_CONFIGMAP: &str = "fluentd-config";
pub const TEST_CONFIGMAP_KEY: &str = "fluent.conf";
pub const TEST_FLUENTD_CONFIG: &str = "the-fluentd-config";
pub const TEST_STATUS_ANNOTATION: &str = "logging.csp.vmware.com/fluentd-status";
pub const TEST_RESOURCE_VERSION: &str = "1234";
