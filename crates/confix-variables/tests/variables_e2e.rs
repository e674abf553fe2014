//! End-to-end tests for scanning, resolving and rewriting documents.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use confix_variables::{
    rewrite, scan, LocalVariableProvider, ProviderVariableResolver, ResolutionMap,
    VariableError, VariablePath, VariableReplacer, VariableResolver, VariableResult,
};
use futures_util::future::BoxFuture;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

/// Resolver that records every call and answers every path with its
/// formatted reference in upper case.
#[derive(Default)]
struct RecordingResolver {
    calls: AtomicUsize,
    requested: Mutex<Vec<Vec<VariablePath>>>,
}

impl VariableResolver for RecordingResolver {
    fn resolve<'a>(
        &'a self,
        paths: &'a [VariablePath],
        _cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, VariableResult<ResolutionMap>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requested.lock().unwrap().push(paths.to_vec());
            Ok(paths
                .iter()
                .map(|p| (p.clone(), Value::String(p.path().to_uppercase())))
                .collect())
        })
    }

    fn list_variables<'a>(
        &'a self,
        _cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, VariableResult<Vec<VariablePath>>> {
        Box::pin(async { Ok(Vec::new()) })
    }
}

/// Resolver that never answers until cancelled.
struct PendingResolver {
    started: Arc<tokio::sync::Notify>,
}

impl VariableResolver for PendingResolver {
    fn resolve<'a>(
        &'a self,
        _paths: &'a [VariablePath],
        _cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, VariableResult<ResolutionMap>> {
        Box::pin(async move {
            self.started.notify_one();
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(ResolutionMap::new())
        })
    }

    fn list_variables<'a>(
        &'a self,
        _cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, VariableResult<Vec<VariablePath>>> {
        Box::pin(async { Ok(Vec::new()) })
    }
}

#[tokio::test]
async fn non_string_scalars_are_never_references() {
    let doc = json!({
        "int": 5,
        "float": 2.5,
        "bool": true,
        "null": null,
        "nested": [1, false, {"deep": 0}],
    });

    assert!(scan(&doc).is_empty());

    let recording = Arc::new(RecordingResolver::default());
    let replacer = VariableReplacer::new(recording.clone());
    let out = replacer.rewrite(&doc, &CancellationToken::new()).await.unwrap();

    assert_eq!(out, doc);
    assert_eq!(recording.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn duplicate_references_resolve_once() {
    let doc = json!({
        "a": "${var:x}",
        "b": ["${var:x}", {"c": "${var:x}"}],
        "d": "${var:y}",
    });

    let recording = Arc::new(RecordingResolver::default());
    let replacer = VariableReplacer::new(recording.clone());
    let out = replacer.rewrite(&doc, &CancellationToken::new()).await.unwrap();

    assert_eq!(recording.calls.load(Ordering::SeqCst), 1);
    let requested = recording.requested.lock().unwrap();
    let formatted: Vec<String> = requested[0].iter().map(ToString::to_string).collect();
    assert_eq!(formatted, vec!["${var:x}", "${var:y}"]);

    assert_eq!(
        out,
        json!({"a": "X", "b": ["X", {"c": "X"}], "d": "Y"})
    );
}

#[tokio::test]
async fn rewrite_is_pure() {
    let doc = json!({"a": "${var:x}", "list": ["${var:y}", 3]});
    let snapshot = doc.clone();

    let mut resolved = ResolutionMap::new();
    resolved.insert(VariablePath::parse("${var:x}").unwrap(), json!({"obj": true}));
    resolved.insert(VariablePath::parse("${var:y}").unwrap(), json!([1, 2]));

    let scanned = scan(&doc);
    let first = rewrite(&doc, &scanned, &resolved).unwrap();
    let second = rewrite(&doc, &scanned, &resolved).unwrap();

    assert_eq!(doc, snapshot);
    assert_eq!(first, second);
    assert_eq!(first, json!({"a": {"obj": true}, "list": [[1, 2], 3]}));
}

#[tokio::test]
async fn document_without_references_is_returned_unchanged() {
    let doc = json!({"name": "api", "port": 8080, "tags": ["a", "${not a ref}"]});
    let recording = Arc::new(RecordingResolver::default());
    let replacer = VariableReplacer::new(recording.clone());

    let out = replacer.rewrite(&doc, &CancellationToken::new()).await.unwrap();

    assert_eq!(out, doc);
    assert_eq!(recording.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cancellation_while_resolving_produces_no_document() {
    let started = Arc::new(tokio::sync::Notify::new());
    let replacer = VariableReplacer::new(Arc::new(PendingResolver {
        started: started.clone(),
    }));
    let cancel = CancellationToken::new();

    let doc = json!({"a": "${var:x}"});
    let task = {
        let cancel = cancel.clone();
        tokio::spawn(async move { replacer.rewrite(&doc, &cancel).await })
    };

    started.notified().await;
    cancel.cancel();

    let result = tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("rewrite should stop after cancellation")
        .unwrap();
    assert!(matches!(result, Err(VariableError::Cancelled)));
}

#[tokio::test]
async fn local_providers_materialize_a_document() {
    let resolver = ProviderVariableResolver::new()
        .with_provider(Arc::new(LocalVariableProvider::new(
            "var",
            json!({"x": "VALUE"}),
        )))
        .with_provider(Arc::new(LocalVariableProvider::new(
            "shared",
            json!({"db": {"host": "localhost", "port": 5432}}),
        )));
    let replacer = VariableReplacer::new(Arc::new(resolver));

    let doc = json!({"a": "${var:x}", "b": 5, "db": "${shared:db}", "port": "${shared:db.port}"});
    let out = replacer.rewrite(&doc, &CancellationToken::new()).await.unwrap();

    assert_eq!(
        out,
        json!({
            "a": "VALUE",
            "b": 5,
            "db": {"host": "localhost", "port": 5432},
            "port": 5432,
        })
    );
}

#[tokio::test]
async fn unresolved_reference_is_reported_by_path() {
    let resolver = ProviderVariableResolver::new().with_provider(Arc::new(
        LocalVariableProvider::new("var", json!({"x": 1})),
    ));
    let replacer = VariableReplacer::new(Arc::new(resolver));

    let err = replacer
        .rewrite(&json!(["${var:x}", "${var:nope}"]), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.path().map(ToString::to_string).as_deref(), Some("${var:nope}"));
}

#[tokio::test]
async fn unregistered_provider_is_reported_by_path() {
    let replacer = VariableReplacer::new(Arc::new(ProviderVariableResolver::new()));

    let err = replacer
        .rewrite(&json!({"db": {"pw": "${vault:db.password}"}}), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(&err, VariableError::UnknownProvider { provider, .. } if provider == "vault"));

    let err: confix_core::ConfixError = err.into();
    match err {
        confix_core::ConfixError::VariableResolution { path, .. } => {
            assert_eq!(path, "${vault:db.password}");
        }
        other => panic!("expected VariableResolution, got {other:?}"),
    }
}
