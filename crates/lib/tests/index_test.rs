//! # Embedding Index Tests (in-memory backend)
//!
//! Uses `StubEmbedder` with hand-assigned vectors so the ranking assertions do not
//! depend on any real embedding model.

use agrorag::{
    errors::PromptError,
    ingest::flatten,
    providers::ai::{Embedder, HashingEmbedder},
    types::Document,
    IndexError,
};
use agrorag_test_utils::{memory_index, sample_knowledge_base, StubEmbedder};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;
use tokio::sync::Notify;

const QUERY: &str = "nitrogen for tomato";

fn crop_documents() -> Vec<Document> {
    vec![
        Document::new(0, "tomato - N: 120", "tomato"),
        Document::new(1, "tomato - K: 80", "tomato"),
        Document::new(2, "rice - N: 60", "rice"),
    ]
}

fn crop_embedder() -> StubEmbedder {
    StubEmbedder::new(3)
        .with("tomato - N: 120", vec![1.0, 0.0, 0.0])
        .with("tomato - K: 80", vec![0.8, 0.6, 0.0])
        .with("rice - N: 60", vec![0.0, 0.2, 1.0])
        .with(QUERY, vec![0.9, 0.1, 0.0])
}

#[tokio::test]
async fn test_query_ranks_tomato_documents_above_rice() -> Result<()> {
    let index = memory_index(crop_embedder());
    index.ingest(&crop_documents()).await?;

    let results = index.query(QUERY, 3).await?;
    let texts: Vec<&str> = results.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["tomato - N: 120", "tomato - K: 80", "rice - N: 60"]);
    assert_eq!(results[0].label, "tomato");
    assert!(results[0].distance <= results[1].distance);
    assert!(results[1].distance <= results[2].distance);
    Ok(())
}

#[tokio::test]
async fn test_query_returns_at_most_k() -> Result<()> {
    let index = memory_index(crop_embedder());
    index.ingest(&crop_documents()).await?;

    let results = index.query(QUERY, 2).await?;
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].id, 0);
    assert_eq!(results[1].id, 1);
    Ok(())
}

#[tokio::test]
async fn test_query_with_k_larger_than_index_returns_everything_once() -> Result<()> {
    let index = memory_index(crop_embedder());
    index.ingest(&crop_documents()).await?;

    let results = index.query(QUERY, 10).await?;
    assert_eq!(results.len(), 3);
    let mut ids: Vec<u64> = results.iter().map(|r| r.id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids, vec![0, 1, 2], "no padding and no duplicates");
    Ok(())
}

#[tokio::test]
async fn test_empty_index_returns_empty_result() -> Result<()> {
    let embedder = crop_embedder();
    let index = memory_index(embedder.clone());

    let results = index.query(QUERY, 3).await?;
    assert!(results.is_empty());
    assert_eq!(embedder.call_count(), 0, "no embedding call against an empty index");
    Ok(())
}

#[tokio::test]
async fn test_non_positive_k_is_rejected() -> Result<()> {
    let index = memory_index(crop_embedder());
    index.ingest(&crop_documents()).await?;

    for k in [0, -1] {
        match index.query(QUERY, k).await {
            Err(IndexError::InvalidK(got)) => assert_eq!(got, k),
            other => panic!("expected InvalidK for k={k}, got {other:?}"),
        }
    }
    Ok(())
}

#[tokio::test]
async fn test_document_and_vector_counts_match_after_ingest() -> Result<()> {
    let documents = flatten(&sample_knowledge_base())?;
    let index = memory_index(HashingEmbedder::new(64));
    index.ingest(&documents).await?;

    assert_eq!(index.len().await?, documents.len());
    assert!(!index.is_empty().await?);
    Ok(())
}

#[tokio::test]
async fn test_ingest_is_batched_into_one_embedding_call() -> Result<()> {
    let embedder = crop_embedder();
    let index = memory_index(embedder.clone());
    index.ingest(&crop_documents()).await?;
    assert_eq!(embedder.call_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_reingesting_same_ids_is_rejected_without_duplicates() -> Result<()> {
    let index = memory_index(crop_embedder());
    index.ingest(&crop_documents()).await?;

    let err = index.ingest(&crop_documents()).await.unwrap_err();
    assert!(matches!(err, IndexError::DuplicateId(0)));
    assert_eq!(index.len().await?, 3);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_ids_within_one_batch_are_rejected() -> Result<()> {
    let index = memory_index(crop_embedder());
    let documents = vec![
        Document::new(7, "tomato - N: 120", "tomato"),
        Document::new(7, "tomato - K: 80", "tomato"),
    ];
    let err = index.ingest(&documents).await.unwrap_err();
    assert!(matches!(err, IndexError::DuplicateId(7)));
    assert!(index.is_empty().await?);
    Ok(())
}

#[tokio::test]
async fn test_rebuild_is_idempotent() -> Result<()> {
    let index = memory_index(crop_embedder());
    index.rebuild(&crop_documents()).await?;
    let first = index.query(QUERY, 3).await?;

    index.rebuild(&crop_documents()).await?;
    let second = index.query(QUERY, 3).await?;

    assert_eq!(index.len().await?, 3);
    assert_eq!(first, second);
    Ok(())
}

#[tokio::test]
async fn test_two_indices_built_alike_answer_alike() -> Result<()> {
    let documents = flatten(&sample_knowledge_base())?;
    let a = memory_index(HashingEmbedder::new(128));
    let b = memory_index(HashingEmbedder::new(128));
    a.ingest(&documents).await?;
    b.ingest(&documents).await?;

    let question = "What is the ideal EC for lettuce?";
    let texts_a: Vec<String> = a.query(question, 3).await?.into_iter().map(|r| r.text).collect();
    let texts_b: Vec<String> = b.query(question, 3).await?.into_iter().map(|r| r.text).collect();
    assert_eq!(texts_a, texts_b);
    Ok(())
}

#[tokio::test]
async fn test_equal_distances_keep_insertion_order() -> Result<()> {
    let embedder = StubEmbedder::new(2)
        .with("first", vec![1.0, 0.0])
        .with("second", vec![1.0, 0.0])
        .with("either", vec![1.0, 0.0]);
    let index = memory_index(embedder);
    index
        .ingest(&[Document::new(5, "first", "a"), Document::new(3, "second", "b")])
        .await?;

    let results = index.query("either", 2).await?;
    assert_eq!(results[0].text, "first");
    assert_eq!(results[1].text, "second");
    Ok(())
}

#[tokio::test]
async fn test_query_vector_with_wrong_dimension_is_rejected() -> Result<()> {
    let embedder = crop_embedder().with("short", vec![1.0, 0.0]);
    let index = memory_index(embedder);
    index.ingest(&crop_documents()).await?;

    let err = index.query("short", 1).await.unwrap_err();
    assert!(matches!(
        err,
        IndexError::DimensionMismatch { expected: 3, got: 2 }
    ));
    Ok(())
}

#[tokio::test]
async fn test_concurrent_queries_see_the_same_index() -> Result<()> {
    let index = memory_index(crop_embedder());
    index.ingest(&crop_documents()).await?;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let index = Arc::clone(&index);
            tokio::spawn(async move { index.query(QUERY, 1).await })
        })
        .collect();

    for handle in handles {
        let results = handle.await??;
        assert_eq!(results[0].text, "tomato - N: 120");
    }
    Ok(())
}

/// Maps every text to the same vector. Once armed, batch calls announce themselves
/// and then stall, which holds an ingest open between clearing and inserting.
#[derive(Clone, Debug)]
struct StallingEmbedder {
    armed: Arc<AtomicBool>,
    batch_started: Arc<Notify>,
}

#[async_trait]
impl Embedder for StallingEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, PromptError> {
        if texts.len() > 1 && self.armed.load(Ordering::SeqCst) {
            self.batch_started.notify_one();
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
    }
}

#[tokio::test]
async fn test_query_during_rebuild_sees_a_complete_index() -> Result<()> {
    let embedder = StallingEmbedder {
        armed: Arc::new(AtomicBool::new(false)),
        batch_started: Arc::new(Notify::new()),
    };
    let index = memory_index(embedder.clone());
    index.ingest(&crop_documents()).await?;

    let replacement = vec![
        Document::new(10, "basil - ideal_ph: 5.5-6.5", "basil"),
        Document::new(11, "basil - ideal_ec: 1.0-1.6 mS/cm", "basil"),
    ];
    embedder.armed.store(true, Ordering::SeqCst);
    let rebuild = tokio::spawn({
        let index = Arc::clone(&index);
        async move { index.rebuild(&replacement).await }
    });

    // The store has been cleared and the new batch is still being embedded.
    embedder.batch_started.notified().await;
    let results = index.query("basil", 10).await?;
    rebuild.await??;

    let ids: Vec<u64> = results.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![10, 11], "the query waits for the rebuild to finish");
    assert_eq!(index.len().await?, 2);
    Ok(())
}
