use std::time::Duration;

use cr_core::errors::*;
use futures::FutureExt;

use super::*;

#[rstest]
#[traced_test]
#[tokio::test]
async fn test_barrier_all_synced() {
    let namespaces = make_store(vec![test_namespace(TEST_NAMESPACE)]);
    let pods = make_store(vec![test_pod(TEST_NAMESPACE, TEST_POD)]);

    ReadinessBarrier::new()
        .with_store(&namespaces)
        .with_store(&pods)
        .wait()
        .await
        .unwrap();
    assert!(logs_contain("waiting for local caches to sync: Namespace, Pod"));
}

#[rstest]
#[tokio::test]
async fn test_barrier_waits_for_late_sync() {
    let (reader, mut writer) = reflector::store::<corev1::Pod>();
    let barrier = ReadinessBarrier::new().with_store(&reader);

    let sync = tokio::spawn(async move {
        tokio::task::yield_now().await;
        writer.apply_watcher_event(&Event::Init);
        writer.apply_watcher_event(&Event::InitApply(test_pod(TEST_NAMESPACE, TEST_POD)));
        writer.apply_watcher_event(&Event::InitDone);
        writer
    });

    barrier.wait().await.unwrap();
    assert_eq!(reader.state().len(), 1);
    sync.await.unwrap();
}

#[rstest]
#[tokio::test]
async fn test_barrier_fails_when_writer_dropped() {
    let namespaces = make_store(vec![test_namespace(TEST_NAMESPACE)]);
    let (pods, writer) = reflector::store::<corev1::Pod>();
    drop(writer);

    let err = ReadinessBarrier::new()
        .with_store(&namespaces)
        .with_store(&pods)
        .wait()
        .await
        .unwrap_err()
        .downcast::<DatasourceError>()
        .unwrap();
    assert!(matches!(err, DatasourceError::CacheSyncFailed(kind) if kind == "Pod"));
}

#[rstest]
#[tokio::test]
async fn test_barrier_custom_check_fails() {
    let check = ReadyCheck::new("fluentd-configs", async { Err::<(), _>(anyhow!("watch channel closed")) }.boxed());
    assert_eq!(check.name(), "fluentd-configs");

    let err = ReadinessBarrier::new().with_checks([check]).wait().await.unwrap_err();
    assert_eq!(err.to_string(), "watch channel closed");
}

#[rstest]
#[tokio::test]
async fn test_barrier_no_checks() {
    ReadinessBarrier::new().wait().await.unwrap();
}

#[rstest]
#[tokio::test]
async fn test_barrier_times_out() {
    let namespaces = make_store(vec![test_namespace(TEST_NAMESPACE)]);
    let (fluentd_configs, _writer) = reflector::store::<FluentdConfig>();

    let err = ReadinessBarrier::new()
        .with_store(&namespaces)
        .with_store(&fluentd_configs)
        .with_timeout(Duration::from_millis(50))
        .wait()
        .await
        .unwrap_err()
        .downcast::<DatasourceError>()
        .unwrap();
    assert!(matches!(err, DatasourceError::CacheSyncTimedOut(names) if names == "Namespace, FluentdConfig"));
}

#[rstest]
#[tokio::test]
async fn test_barrier_synced_before_timeout() {
    let pods = make_store(vec![test_pod(TEST_NAMESPACE, TEST_POD)]);
    ReadinessBarrier::new()
        .with_store(&pods)
        .with_timeout(Duration::from_secs(5))
        .wait()
        .await
        .unwrap();
}
