use std::collections::BTreeMap;

use cr_core::k8s::{
    is_conflict,
    is_not_found,
};
use cr_core::prelude::*;
use kube::api::PostParams;
use tracing::*;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StatusOutcome {
    Written,
    Unchanged,

    // Another writer updated the namespace between our read and our write.  Every reloader
    // instance re-runs the whole pipeline on the next change, so this is expected and harmless.
    Conflict,
    NamespaceMissing,
    Failed,
}

// Writes a status annotation back onto a namespace object.  This is advisory only: nothing that
// happens in here is ever surfaced as an error, and nothing is retried.
pub struct StatusReconciler {
    api: kube::Api<corev1::Namespace>,
    annotation: String,
}

impl StatusReconciler {
    pub fn new(client: kube::Client, annotation: &str) -> StatusReconciler {
        StatusReconciler {
            api: kube::Api::all(client),
            annotation: annotation.into(),
        }
    }

    // An empty status clears the annotation.  We read the namespace straight from the apiserver
    // rather than the local cache so that the write carries the latest resourceVersion.
    pub async fn set_status(&self, namespace: &str, status: &str) -> StatusOutcome {
        let mut ns_obj = match self.api.get(namespace).await {
            Ok(ns_obj) => ns_obj,
            Err(err) if is_not_found(&err) => {
                info!("cannot find namespace to update status for: {namespace}");
                return StatusOutcome::NamespaceMissing;
            },
            Err(err) => {
                info!("cannot read namespace {namespace} to update status: {err}");
                return StatusOutcome::Failed;
            },
        };

        if !apply_status_delta(ns_obj.annotations_mut(), &self.annotation, status) {
            debug!("status annotation on namespace {namespace} is already up to date");
            return StatusOutcome::Unchanged;
        }

        match self.api.replace(namespace, &PostParams::default(), &ns_obj).await {
            Ok(_) => {
                debug!("saved status annotation to namespace {namespace}: {status:?}");
                StatusOutcome::Written
            },
            Err(err) if is_conflict(&err) => {
                debug!("namespace {namespace} was modified by another writer, dropping status update");
                StatusOutcome::Conflict
            },
            Err(err) => {
                info!("cannot set status on namespace {namespace}: {err}");
                StatusOutcome::Failed
            },
        }
    }
}

// Adds the annotation if it's missing and the status is non-empty, removes it if it's present and
// the status is empty, and otherwise leaves things alone.  Returns true if anything changed.
pub(crate) fn apply_status_delta(annotations: &mut BTreeMap<String, String>, key: &str, status: &str) -> bool {
    match (annotations.contains_key(key), status.is_empty()) {
        (false, false) => {
            annotations.insert(key.into(), status.into());
            true
        },
        (true, true) => {
            annotations.remove(key);
            true
        },
        _ => false,
    }
}
