use snac_eac::{EacPipeline, ParseError, PipelineConfig, PipelineError};
use snac_model::{CollectingSink, LocalVocabulary, NameEntry, Operation, SourceDigest, Stage};
use snac_test_utils::{person, InMemoryStore, FULL_EAC};
use std::sync::Arc;
use tempfile::tempdir;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[tokio::test]
async fn file_ingress_and_egress() {
    init_tracing();
    let dir = tempdir().unwrap();
    let input = dir.path().join("record.xml");
    tokio::fs::write(&input, FULL_EAC).await.unwrap();

    let pipeline = EacPipeline::default();
    let outcome = pipeline.parse_file(&input).await.unwrap();
    assert!(outcome.ledger.is_empty());
    assert_eq!(outcome.metadata.size, FULL_EAC.len());
    assert_eq!(outcome.metadata.checksum, SourceDigest::compute(FULL_EAC.as_bytes()));
    assert_eq!(outcome.metadata.path, input);

    let output = dir.path().join("out.xml");
    let digest = pipeline
        .serialize_file(&outcome.constellation, &output)
        .await
        .unwrap();
    let written = tokio::fs::read(&output).await.unwrap();
    assert_eq!(digest, SourceDigest::compute(&written));

    let again = pipeline.parse_file(&output).await.unwrap();
    assert_eq!(again.constellation.ark, outcome.constellation.ark);
    assert_eq!(
        again.constellation.biog_hists,
        outcome.constellation.biog_hists
    );
}

#[tokio::test]
async fn oversized_file_is_rejected_before_parsing() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("big.xml");
    tokio::fs::write(&input, FULL_EAC).await.unwrap();

    let pipeline = EacPipeline::new(PipelineConfig::new().with_max_document_bytes(64));
    let err = pipeline.parse_file(&input).await.unwrap_err();
    assert!(matches!(err, ParseError::TooLarge { max: 64, .. }));
}

#[tokio::test]
async fn malformed_file_is_a_parse_error() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("broken.xml");
    tokio::fs::write(&input, "<eac-cpf><control>").await.unwrap();

    let err = EacPipeline::default().parse_file(&input).await.unwrap_err();
    assert!(matches!(err, ParseError::MalformedMarkup(_)));
}

#[tokio::test]
async fn commit_writes_valid_graphs() {
    init_tracing();
    let store = InMemoryStore::new();
    let pipeline = EacPipeline::default();

    let receipt = pipeline
        .commit(&store, &person("Smith, John"), "editor", "new record")
        .await
        .unwrap();
    assert_eq!(receipt.version, 1);
    let id = receipt.stored.meta.id.unwrap();

    let mut edit = receipt.stored.clone();
    edit.meta.operation = Operation::Update;
    edit.name_entries.push(NameEntry::new("Smith, J.", Some(10.0)));
    let receipt = pipeline.commit(&store, &edit, "editor", "add variant").await.unwrap();
    assert_eq!(receipt.version, 2);
    assert_eq!(store.versions(id), 2);
}

#[tokio::test]
async fn invalid_graph_never_reaches_the_store() {
    let store = InMemoryStore::new();
    let sink = Arc::new(CollectingSink::new());
    let pipeline = EacPipeline::with_collaborators(
        PipelineConfig::default(),
        Arc::new(LocalVocabulary::new()),
        sink.clone(),
    );

    let mut graph = person("Smith, John");
    graph.name_entries[0].meta.operation = Operation::Delete;

    let err = pipeline
        .commit(&store, &graph, "editor", "bad")
        .await
        .unwrap_err();
    match err {
        PipelineError::Validation(failure) => assert_eq!(failure.errors().len(), 1),
        other => panic!("unexpected: {other}"),
    }
    assert!(sink.for_stage(Stage::Store).is_empty());
    assert!(!sink.for_stage(Stage::Validate).is_empty());

    // Nothing was stored, so the first id is still unused
    let receipt = pipeline
        .commit(&store, &person("Smith, John"), "editor", "good")
        .await
        .unwrap();
    assert_eq!(receipt.stored.meta.id, Some(1));
}

#[tokio::test]
async fn store_conflict_is_surfaced_verbatim() {
    let store = InMemoryStore::new();
    let pipeline = EacPipeline::default();

    let first = pipeline
        .commit(&store, &person("Smith, John"), "a", "new")
        .await
        .unwrap();
    let mut stale = first.stored.clone();
    stale.meta.operation = Operation::Update;

    pipeline.commit(&store, &stale, "a", "first edit").await.unwrap();
    let err = pipeline
        .commit(&store, &stale, "b", "second edit")
        .await
        .unwrap_err();
    match err {
        PipelineError::Store(inner) => assert!(inner.is_conflict()),
        other => panic!("unexpected: {other}"),
    }
}
