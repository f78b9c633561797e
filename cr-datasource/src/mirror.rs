use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use clockabilly::{
    Clockable,
    DateTime,
    Utc,
};
use futures::{
    FutureExt,
    StreamExt,
};
use kube::Resource;
use kube::runtime::reflector::{
    self,
    ObjectRef,
    Store,
};
use kube::runtime::{
    WatchStreamExt,
    watcher,
};
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinSet;
use tracing::*;

pub type ChangeReceiver = mpsc::Receiver<DateTime<Utc>>;

// The channel only ever needs to hold one pending signal: if the caller hasn't picked up the last
// one yet, it's going to re-read the whole cache anyways.
const CHANGE_CHANNEL_CAPACITY: usize = 1;

// Pushes a timestamp to the caller whenever anything in a watched cache changes.  Multiple changes
// that happen before the caller reads the channel coalesce into a single signal.
#[derive(Clone)]
pub struct ChangeNotifier {
    tx: mpsc::Sender<DateTime<Utc>>,
    clock: Arc<dyn Clockable + Send + Sync>,
}

impl ChangeNotifier {
    pub fn new(clock: Arc<dyn Clockable + Send + Sync>) -> (ChangeNotifier, ChangeReceiver) {
        let (tx, rx) = mpsc::channel(CHANGE_CHANNEL_CAPACITY);
        (ChangeNotifier { tx, clock }, rx)
    }

    pub fn notify(&self) {
        match self.tx.try_send(self.clock.now()) {
            Ok(()) | Err(TrySendError::Full(_)) => (),
            Err(TrySendError::Closed(_)) => debug!("change receiver dropped, not sending notification"),
        }
    }
}

// Starts a watcher for K on the given JoinSet, reflecting everything it sees into a local store.
// The store is returned immediately; it is not safe to read from until the readiness barrier has
// been passed.  If the watcher task exits, the store's writer is dropped along with it, which is
// what lets the barrier fail instead of hanging on a cache that can never sync.
pub(crate) fn spawn_reflector<K>(
    js: &mut JoinSet<()>,
    api: kube::Api<K>,
    wc: watcher::Config,
    notifier: ChangeNotifier,
) -> Store<K>
where
    K: Resource + Clone + Debug + DeserializeOwned + Send + Sync + 'static,
    K::DynamicType: Default + Eq + Hash + Clone + Send + Sync,
{
    let kind = resource_kind::<K>();
    let (reader, writer) = reflector::store();
    let mut stream = watcher(api, wc).default_backoff().reflect(writer).touched_objects().boxed();

    js.spawn(async move {
        info!("starting {kind} watcher");
        while let Some(res) = stream.next().await {
            match res {
                Ok(obj) => {
                    debug!("observed change to {kind} {}", ObjectRef::from_obj(&obj));
                    notifier.notify();
                },
                Err(err) => warn!("{kind} watcher error: {err}"),
            }
        }
        warn!("{kind} watch stream ended");
    });

    reader
}

// Non-blocking check for whether the store has received its initial list from the apiserver
pub(crate) fn store_is_synced<K>(store: &Store<K>) -> bool
where
    K: Resource + Clone + 'static,
    K::DynamicType: Eq + Hash + Clone,
{
    store.wait_until_ready().now_or_never().is_some_and(|res| res.is_ok())
}

pub(crate) fn resource_kind<K>() -> String
where
    K: Resource,
    K::DynamicType: Default,
{
    K::kind(&Default::default()).to_string()
}

#[cfg(test)]
mod tests {
    use clockabilly::mock::MockUtcClock;
    use cr_core::prelude::*;
    use cr_testutils::*;
    use kube::runtime::watcher::Event;

    use super::*;

    #[tokio::test]
    async fn test_notifications_coalesce() {
        let clock = MockUtcClock::new(1234);
        let (notifier, mut rx) = ChangeNotifier::new(Arc::new(clock));
        notifier.notify();
        notifier.notify();
        notifier.notify();

        assert_eq!(rx.recv().await.unwrap().timestamp(), 1234);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_notify_receiver_dropped() {
        let (notifier, rx) = ChangeNotifier::new(Arc::new(clockabilly::UtcClock));
        drop(rx);
        notifier.notify();
    }

    #[test]
    fn test_store_is_synced() {
        let (reader, mut writer) = reflector::store::<corev1::Namespace>();
        assert!(!store_is_synced(&reader));

        writer.apply_watcher_event(&Event::Init);
        writer.apply_watcher_event(&Event::InitApply(test_namespace(TEST_NAMESPACE)));
        assert!(!store_is_synced(&reader));

        writer.apply_watcher_event(&Event::InitDone);
        assert!(store_is_synced(&reader));
        assert_eq!(resource_kind::<corev1::Namespace>(), "Namespace");
    }
}
