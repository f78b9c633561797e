use std::collections::HashMap;

// Tracks the fingerprint of the last successfully-rendered configuration for each namespace.
// Entries are never evicted; a deleted namespace just leaves a stale entry behind, and a process
// restart costs one extra render per namespace.
#[derive(Clone, Debug, Default)]
pub struct HashStore {
    hashes: HashMap<String, String>,
}

impl HashStore {
    pub fn new() -> HashStore {
        HashStore::default()
    }

    // A namespace with no recorded fingerprint gets the empty string
    pub fn get(&self, namespace: &str) -> String {
        self.hashes.get(namespace).cloned().unwrap_or_default()
    }

    pub fn record(&mut self, namespace: &str, fingerprint: &str) {
        self.hashes.insert(namespace.into(), fingerprint.into());
    }
}
