use std::sync::atomic::{
    AtomicBool,
    Ordering,
};

use assertables::*;
use httpmock::Method::*;
use tokio::task::JoinSet;

use super::*;
use crate::source::MockConfigSource;

fn build_datasource(
    config: DatasourceConfig,
    source: Box<dyn ConfigSource>,
    namespaces: Vec<corev1::Namespace>,
    pods: Vec<corev1::Pod>,
    client: kube::Client,
) -> KubeInformerDatasource {
    KubeInformerDatasource::from_parts(client, config, make_store(namespaces), make_store(pods), source, JoinSet::new())
}

fn offline_client() -> kube::Client {
    make_fake_apiserver().1
}

fn echo_source() -> Box<MockConfigSource> {
    let mut source = MockConfigSource::new();
    source
        .expect_fetch_config()
        .returning(|ns: &str| Ok(format!("# config for {ns}")));
    source.expect_is_ready().return_const(true);
    Box::new(source)
}

#[rstest]
#[tokio::test]
async fn test_get_namespace_configs_sorted_and_deterministic() {
    let namespaces = vec![test_namespace("zeta"), test_namespace("alpha"), test_namespace("mid")];
    let fluentd_configs = vec![
        test_fluentd_config("alpha", "second", "<match b>"),
        test_fluentd_config("alpha", "first", "<match a>"),
        test_fluentd_config("zeta", "only", "<match z>"),
    ];
    let pods = vec![test_pod("alpha", "pod-b"), test_pod("alpha", "pod-a"), test_pod("mid", "pod-c")];
    let source = Box::new(CustomResourceSource::new(make_store(fluentd_configs)));
    let ds = build_datasource(DatasourceConfig::default(), source, namespaces, pods, offline_client());

    let first = ds.get_namespace_configs().await.unwrap();
    let second = ds.get_namespace_configs().await.unwrap();
    assert_eq!(first, second);

    let names: Vec<_> = first.iter().map(|nc| nc.name()).collect();
    assert_eq!(names, vec!["alpha", "mid", "zeta"]);

    assert_eq!(first[0].config_text(), "<match a>\n<match b>");
    assert_eq!(first[1].config_text(), "");
    assert_eq!(first[2].config_text(), "<match z>");

    let alpha_pods: Vec<_> = first[0].mini_workloads().iter().map(|mw| mw.pod_name.as_str()).collect();
    assert_eq!(alpha_pods, vec!["pod-a", "pod-b"]);
    assert_eq!(first[1].mini_workloads().len(), 1);
    assert_is_empty!(first[2].mini_workloads());
    assert_eq!(first[0].labels()[KUBERNETES_IO_METADATA_NAME_KEY], "alpha");
}

#[rstest]
#[tokio::test]
async fn test_get_namespace_configs_all_or_nothing() {
    let mut source = MockConfigSource::new();
    source.expect_fetch_config().returning(|ns: &str| match ns {
        "ns-b" => Err(anyhow::anyhow!("transient read error")),
        "ns-c" => panic!("should not have fetched config past a failed namespace"),
        _ => Ok("# config".into()),
    });
    let namespaces = vec![test_namespace("ns-a"), test_namespace("ns-b"), test_namespace("ns-c")];
    let ds = build_datasource(DatasourceConfig::default(), Box::new(source), namespaces, vec![], offline_client());

    let err = ds.get_namespace_configs().await.unwrap_err();
    assert_eq!(err.root_cause().to_string(), "transient read error");
    let err = err.downcast::<DatasourceError>().unwrap();
    assert!(matches!(err, DatasourceError::FetchFailed(ns) if ns == "ns-b"));
}

#[rstest]
#[tokio::test]
async fn test_get_namespace_configs_fingerprint_carry_over() {
    let namespaces = vec![test_namespace("ns-a"), test_namespace("ns-b")];
    let mut ds = build_datasource(DatasourceConfig::default(), echo_source(), namespaces, vec![], offline_client());
    ds.record_fingerprint("ns-a", "h1");

    let configs = ds.get_namespace_configs().await.unwrap();
    assert_eq!(configs[0].name(), "ns-a");
    assert_eq!(configs[0].previous_config_hash(), "h1");
    assert_eq!(configs[1].name(), "ns-b");
    assert_eq!(configs[1].previous_config_hash(), "");
    assert_eq!(configs[1].config_text(), "# config for ns-b");
}

#[rstest]
#[tokio::test]
async fn test_failed_pass_keeps_fingerprints() {
    let failed_once = AtomicBool::new(false);
    let mut source = MockConfigSource::new();
    source.expect_fetch_config().returning(move |_: &str| {
        if failed_once.swap(true, Ordering::Relaxed) {
            Ok("# config".into())
        } else {
            Err(anyhow::anyhow!("not yet"))
        }
    });
    let mut ds =
        build_datasource(DatasourceConfig::default(), Box::new(source), vec![test_namespace("ns-a")], vec![], offline_client());
    ds.record_fingerprint("ns-a", "h1");

    assert_err!(ds.get_namespace_configs().await);
    let configs = ds.get_namespace_configs().await.unwrap();
    assert_eq!(configs[0].previous_config_hash(), "h1");
}

#[rstest]
#[tokio::test]
async fn test_get_namespace_configs_scope_honoring() {
    let config = DatasourceConfig { namespaces: vec!["b".into(), "a".into()], ..Default::default() };
    let namespaces = vec![test_namespace("a"), test_namespace("b"), test_namespace("c")];
    let ds = build_datasource(config, echo_source(), namespaces, vec![test_pod("c", "pod-c")], offline_client());

    assert_eq!(ds.discover_namespaces(), vec!["a".to_string(), "b".to_string()]);
    let names: Vec<_> = ds
        .get_namespace_configs()
        .await
        .unwrap()
        .iter()
        .map(|nc| nc.name().to_string())
        .collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[rstest]
#[tokio::test]
async fn test_get_namespace_configs_missing_namespace() {
    let config = DatasourceConfig { namespaces: vec!["a".into(), "ghost".into()], ..Default::default() };
    let ds = build_datasource(config, echo_source(), vec![test_namespace("a")], vec![], offline_client());

    let err = ds.get_namespace_configs().await.unwrap_err().downcast::<DatasourceError>().unwrap();
    assert!(matches!(err, DatasourceError::NamespaceNotFound(ns) if ns == "ghost"));
}

#[rstest]
#[tokio::test]
async fn test_get_namespace_configs_empty_cluster() {
    let ds = build_datasource(DatasourceConfig::default(), echo_source(), vec![], vec![], offline_client());
    assert_is_empty!(ds.get_namespace_configs().await.unwrap());
    assert!(ds.is_ready());
}

#[rstest]
#[case::all_synced(true, true, true)]
#[case::pods_not_synced(false, true, false)]
#[case::source_not_ready(true, false, false)]
#[tokio::test]
async fn test_is_ready(#[case] pods_synced: bool, #[case] source_ready: bool, #[case] expected: bool) {
    let (pods, mut writer) = reflector::store::<corev1::Pod>();
    if pods_synced {
        writer.apply_watcher_event(&Event::Init);
        writer.apply_watcher_event(&Event::InitDone);
    }
    let mut source = MockConfigSource::new();
    source.expect_is_ready().return_const(source_ready);

    let ds = KubeInformerDatasource::from_parts(
        offline_client(),
        DatasourceConfig::default(),
        make_store(vec![test_namespace(TEST_NAMESPACE)]),
        pods,
        Box::new(source),
        JoinSet::new(),
    );
    assert_eq!(ds.is_ready(), expected);
}

#[rstest]
#[traced_test]
#[tokio::test]
async fn test_datasource_set_status_delegates() {
    let (mut fake_apiserver, client) = make_fake_apiserver();
    let ns_obj = test_namespace(TEST_NAMESPACE);
    let put_resp = ns_obj.clone();
    fake_apiserver
        .handle(move |when, then| {
            when.method(GET).path(format!("/api/v1/namespaces/{TEST_NAMESPACE}"));
            then.json_body_obj(&ns_obj);
        })
        .handle(move |when, then| {
            when.method(PUT).path(format!("/api/v1/namespaces/{TEST_NAMESPACE}"));
            then.json_body_obj(&put_resp);
        })
        .build();
    let ds = build_datasource(DatasourceConfig::default(), echo_source(), vec![], vec![], client);

    // The namespace has no status annotation, so clearing is a no-op and setting is a write
    assert_eq!(ds.set_status(TEST_NAMESPACE, "").await, StatusOutcome::Unchanged);
    assert_eq!(ds.set_status(TEST_NAMESPACE, "ok").await, StatusOutcome::Written);
}
