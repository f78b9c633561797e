use std::hash::Hash;
use std::time::Duration;

use cr_core::errors::*;
use futures::future::{
    BoxFuture,
    try_join_all,
};
use futures::FutureExt;
use kube::Resource;
use kube::runtime::reflector::Store;
use tracing::*;

use crate::errors::DatasourceError;
use crate::mirror::resource_kind;

// A named future that resolves once some cache has completed its initial sync, or fails if that
// cache can never sync.
pub struct ReadyCheck {
    name: String,
    fut: BoxFuture<'static, EmptyResult>,
}

impl ReadyCheck {
    pub fn new(name: &str, fut: BoxFuture<'static, EmptyResult>) -> ReadyCheck {
        ReadyCheck { name: name.into(), fut }
    }

    pub fn for_store<K>(store: &Store<K>) -> ReadyCheck
    where
        K: Resource + Clone + Send + Sync + 'static,
        K::DynamicType: Default + Eq + Hash + Clone + Send + Sync,
    {
        let name = resource_kind::<K>();
        let store = store.clone();
        let kind = name.clone();
        let fut = async move {
            store
                .wait_until_ready()
                .await
                .map_err(|_| DatasourceError::cache_sync_failed(&kind))
        };
        ReadyCheck { name, fut: fut.boxed() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

// One-shot startup gate: collects the readiness checks for every cache the datasource reads from,
// and then waits for all of them at once.  `wait` consumes the barrier, so it can't be re-checked
// later; once the caches have synced we assume they stay live.  The watchers retry forever, so
// without a timeout a cache that can never sync (e.g., a CRD that isn't installed) blocks here.
#[derive(Default)]
pub struct ReadinessBarrier {
    checks: Vec<ReadyCheck>,
    timeout: Option<Duration>,
}

impl ReadinessBarrier {
    pub fn new() -> ReadinessBarrier {
        ReadinessBarrier::default()
    }

    pub fn with_check(mut self, check: ReadyCheck) -> ReadinessBarrier {
        self.checks.push(check);
        self
    }

    pub fn with_checks(mut self, checks: impl IntoIterator<Item = ReadyCheck>) -> ReadinessBarrier {
        self.checks.extend(checks);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> ReadinessBarrier {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_store<K>(self, store: &Store<K>) -> ReadinessBarrier
    where
        K: Resource + Clone + Send + Sync + 'static,
        K::DynamicType: Default + Eq + Hash + Clone + Send + Sync,
    {
        self.with_check(ReadyCheck::for_store(store))
    }

    pub async fn wait(self) -> EmptyResult {
        let names: Vec<_> = self.checks.iter().map(|c| c.name.clone()).collect();
        info!("waiting for local caches to sync: {}", names.join(", "));

        let all_synced = try_join_all(self.checks.into_iter().map(|c| c.fut));
        match self.timeout {
            Some(timeout) => {
                tokio::time::timeout(timeout, all_synced)
                    .await
                    .map_err(|_| DatasourceError::cache_sync_timed_out(&names.join(", ")))??;
            },
            None => {
                all_synced.await?;
            },
        }
        Ok(())
    }
}
