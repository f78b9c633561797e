use std::hash::{
    DefaultHasher,
    Hash,
    Hasher,
};

use cr_datasource::NamespaceConfig;

// A short digest of everything the renderer would consume for a namespace.  The previous hash is
// deliberately left out, since it's what this gets compared against.
pub fn fingerprint(nc: &NamespaceConfig) -> String {
    let mut hasher = DefaultHasher::new();
    nc.name().hash(&mut hasher);
    nc.config_text().hash(&mut hasher);
    nc.labels().hash(&mut hasher);
    nc.mini_workloads().hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}
