mod common;

use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ragkeeper::adapters::sources::{JsonFileSource, VecSource};
use ragkeeper::domain::models::{Chunk, RagConfig};
use ragkeeper::domain::ports::{ChunkRepository, SourceError};
use indicatif::ProgressBar;
use ragkeeper::services::IngestionError;
use tokio::sync::watch;

use common::{
    dragon_docs, pipeline, rag_config, raw, repository, KeywordProvider, FAIL_MARKER,
    OVERFLOW_MARKER,
};

#[tokio::test]
async fn test_failed_item_is_isolated_and_saved_without_embedding() {
    let repo = repository().await;
    let provider = Arc::new(KeywordProvider::new());
    let pipeline = pipeline(repo.clone(), provider.clone(), &rag_config());

    let mut definitions = dragon_docs(12);
    definitions[6].text = format!("{FAIL_MARKER} dragon lore entry 7");

    let report = pipeline
        .load_all(&VecSource::new(definitions))
        .await
        .expect("load should succeed");

    assert_eq!(report.processed, 11);
    assert_eq!(report.failed, 1);
    assert_eq!(report.total_in_store, 12);
    assert_eq!(report.total_with_embedding, 11);
    assert!(!report.skipped);
    assert_eq!(provider.calls(), 12);

    let seventh = repo.find_by_external_id("doc-7").await.unwrap().unwrap();
    assert!(!seventh.has_embedding());
    let eighth = repo.find_by_external_id("doc-8").await.unwrap().unwrap();
    assert!(eighth.has_embedding());
}

#[tokio::test]
async fn test_non_finite_embedding_is_stored_without_vector() {
    let repo = repository().await;
    let pipeline = pipeline(repo.clone(), Arc::new(KeywordProvider::new()), &rag_config());

    let definitions = vec![
        raw("ok", "Dragon scales"),
        raw("overflow", &format!("{OVERFLOW_MARKER} dragon scales")),
    ];

    let report = pipeline.load_all(&VecSource::new(definitions)).await.unwrap();

    assert_eq!(report.processed, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.total_in_store, 2);
    assert_eq!(report.total_with_embedding, 1);
    let stored = repo.find_by_external_id("overflow").await.unwrap().unwrap();
    assert!(!stored.has_embedding());
}

#[tokio::test]
async fn test_second_load_is_skipped() {
    let repo = repository().await;
    let provider = Arc::new(KeywordProvider::new());
    let pipeline = pipeline(repo.clone(), provider.clone(), &rag_config());
    let source = VecSource::new(dragon_docs(3));

    pipeline.load_all(&source).await.unwrap();
    let second = pipeline.load_all(&source).await.unwrap();

    assert!(second.skipped);
    assert_eq!(second.attempted(), 0);
    assert_eq!(second.total_in_store, 3);
    assert_eq!(second.total_with_embedding, 3);
    assert_eq!(provider.calls(), 3);
    assert_eq!(repo.count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_empty_source_reports_nothing() {
    let repo = repository().await;
    let pipeline = pipeline(repo, Arc::new(KeywordProvider::new()), &rag_config());

    let report = pipeline.load_all(&VecSource::new(Vec::new())).await.unwrap();

    assert_eq!(report.attempted(), 0);
    assert_eq!(report.total_in_store, 0);
    assert!(!report.skipped);
}

#[tokio::test]
async fn test_invalid_and_duplicate_definitions_count_as_failed() {
    let repo = repository().await;
    let pipeline = pipeline(repo.clone(), Arc::new(KeywordProvider::new()), &rag_config());

    let definitions = vec![
        raw("a", "Dragon eggs hatch in fire."),
        raw("blank", "   "),
        raw("a", "Dragon armor needs scales."),
        raw("b", "Redstone repeaters delay signals."),
    ];

    let report = pipeline.load_all(&VecSource::new(definitions)).await.unwrap();

    assert_eq!(report.processed, 2);
    assert_eq!(report.failed, 2);
    assert_eq!(report.total_in_store, 2);
    let first = repo.find_by_external_id("a").await.unwrap().unwrap();
    assert_eq!(first.text, "Dragon eggs hatch in fire.");
}

#[tokio::test]
async fn test_missing_file_is_a_source_read_error() {
    let repo = repository().await;
    let pipeline = pipeline(repo.clone(), Arc::new(KeywordProvider::new()), &rag_config());
    let dir = tempfile::tempdir().unwrap();

    let err = pipeline
        .load_all(&JsonFileSource::new(dir.path().join("missing.json")))
        .await
        .unwrap_err();

    assert!(matches!(err, IngestionError::SourceRead(SourceError::Io { .. })));
    assert_eq!(repo.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_malformed_file_is_a_source_read_error() {
    let repo = repository().await;
    let pipeline = pipeline(repo, Arc::new(KeywordProvider::new()), &rag_config());
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{\"id\": \"not-an-array\"}}").unwrap();

    let err = pipeline
        .load_all(&JsonFileSource::new(file.path()))
        .await
        .unwrap_err();

    assert!(matches!(err, IngestionError::SourceRead(SourceError::Parse { .. })));
}

#[tokio::test]
async fn test_loads_json_file_with_legacy_metadata_keys() {
    let repo = repository().await;
    let pipeline = pipeline(repo.clone(), Arc::new(KeywordProvider::new()), &rag_config());
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[
            {{"id": "rl-1", "text": "Dragons roam the overworld.",
              "metadata": {{"modpack": "RLCraft", "mod_name": "Ice and Fire", "mod_version": "2.1"}}}},
            {{"id": "sf-1", "text": "Redstone clocks pulse."}}
        ]"#
    )
    .unwrap();

    let report = pipeline.load_all(&JsonFileSource::new(file.path())).await.unwrap();

    assert_eq!(report.processed, 2);
    let chunk = repo.find_by_external_id("rl-1").await.unwrap().unwrap();
    assert_eq!(chunk.metadata.collection.as_deref(), Some("RLCraft"));
    assert_eq!(chunk.metadata.item_name.as_deref(), Some("Ice and Fire"));
    assert_eq!(chunk.metadata.item_version.as_deref(), Some("2.1"));
}

#[tokio::test]
async fn test_concurrent_trigger_is_rejected() {
    let repo = repository().await;
    let provider = Arc::new(KeywordProvider::with_delay(Duration::from_millis(50)));
    let pipeline = pipeline(repo.clone(), provider, &rag_config());
    let source = VecSource::new(dragon_docs(4));

    let (first, second) = tokio::join!(pipeline.load_all(&source), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        pipeline.load_all(&source).await
    });

    assert_eq!(first.unwrap().processed, 4);
    assert!(matches!(second, Err(IngestionError::AlreadyRunning)));
    assert_eq!(repo.count().await.unwrap(), 4);
}

#[tokio::test]
async fn test_batches_are_separated_by_delay() {
    let repo = repository().await;
    let config = RagConfig {
        batch_size: 5,
        inter_batch_delay_ms: 150,
        ..rag_config()
    };
    let pipeline = pipeline(repo, Arc::new(KeywordProvider::new()), &config);

    let start = Instant::now();
    let report = pipeline
        .load_all(&VecSource::new(dragon_docs(11)))
        .await
        .unwrap();

    assert_eq!(report.processed, 11);
    // Three batches, two pauses.
    assert!(start.elapsed() >= Duration::from_millis(300), "elapsed {:?}", start.elapsed());
}

#[tokio::test]
async fn test_shutdown_before_start_interrupts_without_writes() {
    let repo = repository().await;
    let (tx, rx) = watch::channel(true);
    let pipeline = pipeline(repo.clone(), Arc::new(KeywordProvider::new()), &rag_config())
        .with_shutdown(rx);

    let err = pipeline
        .load_all(&VecSource::new(dragon_docs(3)))
        .await
        .unwrap_err();

    assert!(matches!(err, IngestionError::Interrupted { processed: 0, failed: 0 }));
    assert_eq!(repo.count().await.unwrap(), 0);
    drop(tx);
}

#[tokio::test]
async fn test_shutdown_mid_run_keeps_saved_items() {
    let repo = repository().await;
    let config = RagConfig {
        item_delay_ms: 40,
        ..rag_config()
    };
    let (tx, rx) = watch::channel(false);
    let pipeline = pipeline(repo.clone(), Arc::new(KeywordProvider::new()), &config)
        .with_shutdown(rx);

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let _ = tx.send(true);
    });

    let err = pipeline
        .load_all(&VecSource::new(dragon_docs(50)))
        .await
        .unwrap_err();

    let IngestionError::Interrupted { processed, failed } = err else {
        panic!("expected interruption, got {err:?}");
    };
    assert!(processed >= 1 && processed < 50, "processed {processed}");
    assert_eq!(failed, 0);
    assert_eq!(repo.count().await.unwrap(), processed as u64);
}

#[tokio::test]
async fn test_backfill_embeds_missing_chunks() {
    let repo = repository().await;
    for (id, text) in [
        ("d1", "Dragon scales"),
        ("d2", "Redstone torches"),
        ("d3", "FAIL wheat farm"),
    ] {
        repo.save(&Chunk::new(id, text).unwrap()).await.unwrap();
    }
    let pipeline = pipeline(repo.clone(), Arc::new(KeywordProvider::new()), &rag_config());

    let report = pipeline.backfill_missing(10).await.unwrap();

    assert_eq!(report.processed, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.total_in_store, 3);
    assert_eq!(report.total_with_embedding, 2);
    let remaining = repo.find_without_embedding(10).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].external_id, "d3");
}

#[tokio::test]
async fn test_backfill_respects_limit() {
    let repo = repository().await;
    for i in 0..5 {
        repo.save(&Chunk::new(format!("c{i}"), "Dragon nest").unwrap())
            .await
            .unwrap();
    }
    let pipeline = pipeline(repo.clone(), Arc::new(KeywordProvider::new()), &rag_config());

    let report = pipeline.backfill_missing(2).await.unwrap();

    assert_eq!(report.processed, 2);
    assert_eq!(repo.count_with_embedding().await.unwrap(), 2);
}

#[tokio::test]
async fn test_loading_stats_text() {
    let repo = repository().await;
    let pipeline = pipeline(repo, Arc::new(KeywordProvider::new()), &rag_config());

    assert_eq!(
        pipeline.loading_stats().await.unwrap(),
        "Total chunks: 0, Chunks with embeddings: 0 (0.0%)"
    );

    let mut definitions = dragon_docs(12);
    definitions[6].text = format!("{FAIL_MARKER} entry");
    pipeline.load_all(&VecSource::new(definitions)).await.unwrap();

    assert_eq!(
        pipeline.loading_stats().await.unwrap(),
        "Total chunks: 12, Chunks with embeddings: 11 (91.7%)"
    );
}

#[tokio::test]
async fn test_progress_bar_is_cleared_on_every_exit() {
    let repo = repository().await;
    let dir = tempfile::tempdir().unwrap();

    // Source read error.
    let bar = ProgressBar::hidden();
    let failing = pipeline(repo.clone(), Arc::new(KeywordProvider::new()), &rag_config())
        .with_progress(bar.clone());
    failing
        .load_all(&JsonFileSource::new(dir.path().join("missing.json")))
        .await
        .unwrap_err();
    assert!(bar.is_finished());

    // Interrupted before the first item.
    let bar = ProgressBar::hidden();
    let (_tx, rx) = watch::channel(true);
    let interrupted = pipeline(repo.clone(), Arc::new(KeywordProvider::new()), &rag_config())
        .with_shutdown(rx)
        .with_progress(bar.clone());
    interrupted
        .load_all(&VecSource::new(dragon_docs(2)))
        .await
        .unwrap_err();
    assert!(bar.is_finished());

    // Skipped because the store is no longer empty.
    repo.save(&Chunk::new("seed", "Dragon lore").unwrap())
        .await
        .unwrap();
    let bar = ProgressBar::hidden();
    let skipping = pipeline(repo.clone(), Arc::new(KeywordProvider::new()), &rag_config())
        .with_progress(bar.clone());
    let report = skipping.load_all(&VecSource::new(dragon_docs(2))).await.unwrap();
    assert!(report.skipped);
    assert!(bar.is_finished());

    // Backfill interrupted before the first item.
    let bar = ProgressBar::hidden();
    let (_tx, rx) = watch::channel(true);
    let backfill = pipeline(repo, Arc::new(KeywordProvider::new()), &rag_config())
        .with_shutdown(rx)
        .with_progress(bar.clone());
    backfill.backfill_missing(10).await.unwrap_err();
    assert!(bar.is_finished());
}
