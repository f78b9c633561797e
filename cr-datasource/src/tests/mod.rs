mod datasource_test;
mod readiness_test;

use std::hash::Hash;

use cr_core::prelude::*;
use cr_testutils::*;
use kube::Resource;
use kube::runtime::reflector::{
    self,
    Store,
};
use kube::runtime::watcher::Event;
use rstest::*;
use tracing_test::traced_test;

use super::*;

// Builds a fully-synced store containing exactly the given objects, as if a watcher had just
// finished its initial list.
pub(crate) fn make_store<K>(objs: Vec<K>) -> Store<K>
where
    K: Resource + Clone + 'static,
    K::DynamicType: Default + Eq + Hash + Clone,
{
    let (reader, mut writer) = reflector::store();
    writer.apply_watcher_event(&Event::Init);
    for obj in objs {
        writer.apply_watcher_event(&Event::InitApply(obj));
    }
    writer.apply_watcher_event(&Event::InitDone);
    reader
}
