// Well-known labels and annotations
pub const KUBERNETES_IO_METADATA_NAME_KEY: &str = "kubernetes.io/metadata.name";

// Annotations read or written by the reloader on namespace objects
pub const DEFAULT_STATUS_ANNOTATION_KEY: &str = "logging.csp.vmware.com/fluentd-status";
pub const DEFAULT_CONFIGMAP_ANNOTATION_KEY: &str = "logging.csp.vmware.com/fluentd-configmap";

// Legacy ConfigMap datasource defaults
pub const DEFAULT_CONFIGMAP_NAME: &str = "fluentd-config";
pub const DEFAULT_CONFIGMAP_KEY: &str = "fluent.conf";

// Separator used when several config objects contribute to one namespace
pub const CONFIG_FRAGMENT_SEPARATOR: &str = "\n";
