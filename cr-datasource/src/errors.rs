use cr_core::errors::*;

err_impl! {DatasourceError,
    #[error("local cache for {0} could not be synchronized with the apiserver")]
    CacheSyncFailed(String),

    #[error("timed out waiting for local caches to sync: {0}")]
    CacheSyncTimedOut(String),

    #[error("namespace {0} not found")]
    NamespaceNotFound(String),

    #[error("config object {0} not found")]
    ConfigObjectNotFound(String),

    #[error("could not fetch configuration for namespace {0}")]
    FetchFailed(String),
}
