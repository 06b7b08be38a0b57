//! Conversation log store: bounded, embedded snippets with semantic recall.
//!
//! Backed by `conversations.json`, an ordered list (oldest first) of embedded
//! snippets, fully rewritten on every save. Capacity is enforced by FIFO
//! eviction on insertion order. Retrieval is a linear scan over the stored
//! embeddings, deliberate at the target scale of hundreds of records.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::sync::Mutex;

use crate::config::MemoryConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{MemoryError, Result};
use crate::llm::Message;
use crate::persist::Backing;
use crate::similarity::cosine_similarity;
use crate::text::render_turns;

const CONVERSATIONS_FILE: &str = "conversations.json";

/// How many trailing turns go into a raw-turn document.
const RAW_DOCUMENT_TURNS: usize = 5;

/// One embedded conversation snippet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub id: String,
    pub document: String,
    pub embedding: Vec<f32>,
    pub channel_id: String,
    pub timestamp: DateTime<Utc>,
    pub message_count: usize,
}

/// Bounded, file-backed log of embedded conversation snippets.
pub struct ConversationLog {
    backing: Backing,
    section: Mutex<()>,
    max_records: usize,
    snippet_max_chars: usize,
}

impl ConversationLog {
    /// Open the log under `dir` (`conversations.json`), creating the
    /// directory when missing. Capacity and snippet truncation come from
    /// `config`.
    pub async fn open(dir: impl AsRef<Path>, config: &MemoryConfig) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).await?;

        Ok(Self {
            backing: Backing::File(dir.join(CONVERSATIONS_FILE)),
            section: Mutex::new(()),
            max_records: config.max_records,
            snippet_max_chars: config.snippet_max_chars,
        })
    }

    /// Log with in-memory backing and identical semantics, for tests.
    pub fn in_memory(config: &MemoryConfig) -> Self {
        Self {
            backing: Backing::in_memory(),
            section: Mutex::new(()),
            max_records: config.max_records,
            snippet_max_chars: config.snippet_max_chars,
        }
    }

    /// Append one snippet and return its record id.
    ///
    /// The document is the supplied `summary` when present, otherwise the
    /// trailing turns rendered as `"{role}: {content}"` lines. The document
    /// is embedded exactly once; embedding failure aborts the append and
    /// nothing is persisted for this turn.
    pub async fn append(
        &self,
        channel_id: &str,
        turns: &[Message],
        summary: Option<String>,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<String> {
        let document = match summary {
            Some(summary) => summary,
            None => render_turns(turns, RAW_DOCUMENT_TURNS, self.snippet_max_chars),
        };

        let embedding = embedder
            .embed(&document)
            .await
            .map_err(|e| MemoryError::Embedding(e.to_string()))?;

        let timestamp = Utc::now();
        let id = record_id(channel_id, &timestamp);
        let record = ConversationRecord {
            id: id.clone(),
            document,
            embedding,
            channel_id: channel_id.to_string(),
            timestamp,
            message_count: turns.len(),
        };

        let _section = self.section.lock().await;
        let mut records: Vec<ConversationRecord> = self.backing.load_or_default().await;
        records.push(record);
        if records.len() > self.max_records {
            let excess = records.len() - self.max_records;
            records.drain(..excess);
        }
        self.backing.save(&records).await?;

        Ok(id)
    }

    /// Retrieve up to `top_n` stored documents relevant to `query_text`,
    /// most similar first, scoped to `channel_id` when given. Results scoring
    /// at or below `min_score` are dropped. Equal scores keep storage order.
    ///
    /// Failures degrade to an empty result: retrieval is an enhancement and
    /// must never block the conversational path.
    pub async fn query(
        &self,
        channel_id: Option<&str>,
        query_text: &str,
        embedder: &dyn EmbeddingProvider,
        top_n: usize,
        min_score: f32,
    ) -> Vec<String> {
        let records = self.snapshot().await;
        if records.is_empty() {
            return Vec::new();
        }

        let filtered: Vec<&ConversationRecord> = match channel_id {
            Some(channel) => records.iter().filter(|r| r.channel_id == channel).collect(),
            None => records.iter().collect(),
        };
        if filtered.is_empty() {
            return Vec::new();
        }

        let query_embedding = match embedder.embed(query_text).await {
            Ok(embedding) => embedding,
            Err(e) => {
                tracing::warn!("Query embedding failed, returning no memories: {}", e);
                return Vec::new();
            }
        };

        let mut scored: Vec<(f32, &ConversationRecord)> = filtered
            .into_iter()
            .map(|r| (cosine_similarity(&query_embedding, &r.embedding), r))
            .collect();
        // Stable sort: ties keep storage order.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        scored
            .into_iter()
            .take(top_n)
            .filter(|(score, _)| *score > min_score)
            .map(|(_, r)| r.document.clone())
            .collect()
    }

    /// Snapshot of the stored records, oldest first.
    pub async fn records(&self) -> Vec<ConversationRecord> {
        self.snapshot().await
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.snapshot().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn snapshot(&self) -> Vec<ConversationRecord> {
        let _section = self.section.lock().await;
        self.backing.load_or_default().await
    }
}

/// Content+time derived record id: the first 16 hex chars of SHA-256 over
/// `"{channel_id}:{timestamp}"`.
fn record_id(channel_id: &str, timestamp: &DateTime<Utc>) -> String {
    let raw = format!("{}:{}", channel_id, timestamp.to_rfc3339());
    let mut id = hex::encode(Sha256::digest(raw.as_bytes()));
    id.truncate(16);
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::MockEmbedding;

    fn test_config(max_records: usize) -> MemoryConfig {
        MemoryConfig {
            max_records,
            ..MemoryConfig::default()
        }
    }

    async fn append_doc(log: &ConversationLog, channel: &str, doc: &str, embedder: &MockEmbedding) {
        log.append(channel, &[], Some(doc.to_string()), embedder)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_append_returns_hex_id() {
        let log = ConversationLog::in_memory(&test_config(10));
        let embedder = MockEmbedding::new();

        let id = log
            .append("c1", &[Message::user("hi")], None, &embedder)
            .await
            .unwrap();

        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_raw_document_renders_last_five_turns() {
        let log = ConversationLog::in_memory(&test_config(10));
        let embedder = MockEmbedding::new();

        let turns: Vec<Message> = (1..=7).map(|i| Message::user(format!("m{}", i))).collect();
        log.append("c1", &turns, None, &embedder).await.unwrap();

        let records = log.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].document,
            "user: m3\nuser: m4\nuser: m5\nuser: m6\nuser: m7"
        );
        assert_eq!(records[0].message_count, 7);
    }

    #[tokio::test]
    async fn test_raw_document_truncates_contents() {
        let config = MemoryConfig {
            snippet_max_chars: 4,
            ..test_config(10)
        };
        let log = ConversationLog::in_memory(&config);
        let embedder = MockEmbedding::new();

        log.append("c1", &[Message::user("abcdefgh")], None, &embedder)
            .await
            .unwrap();

        assert_eq!(log.records().await[0].document, "user: abcd");
    }

    #[tokio::test]
    async fn test_summary_bypasses_rendering() {
        let log = ConversationLog::in_memory(&test_config(10));
        let embedder = MockEmbedding::new();

        log.append(
            "c1",
            &[Message::user("raw")],
            Some("precomputed summary".to_string()),
            &embedder,
        )
        .await
        .unwrap();

        let records = log.records().await;
        assert_eq!(records[0].document, "precomputed summary");
        assert_eq!(records[0].message_count, 1);
    }

    #[tokio::test]
    async fn test_fifo_eviction_keeps_most_recent() {
        let log = ConversationLog::in_memory(&test_config(3));
        let embedder = MockEmbedding::new();

        for i in 1..=5 {
            append_doc(&log, "c1", &format!("doc{}", i), &embedder).await;
        }

        let docs: Vec<String> = log.records().await.into_iter().map(|r| r.document).collect();
        assert_eq!(docs, vec!["doc3", "doc4", "doc5"]);
    }

    #[tokio::test]
    async fn test_cap_two_append_three() {
        let log = ConversationLog::in_memory(&test_config(2));
        let embedder = MockEmbedding::new();

        append_doc(&log, "c1", "A", &embedder).await;
        append_doc(&log, "c1", "B", &embedder).await;
        append_doc(&log, "c1", "C", &embedder).await;

        let docs: Vec<String> = log.records().await.into_iter().map(|r| r.document).collect();
        assert_eq!(docs, vec!["B", "C"]);
    }

    #[tokio::test]
    async fn test_embed_failure_aborts_append() {
        let log = ConversationLog::in_memory(&test_config(10));
        let embedder = MockEmbedding::failing();

        let result = log
            .append("c1", &[Message::user("hi")], None, &embedder)
            .await;

        assert!(matches!(result, Err(MemoryError::Embedding(_))));
        assert!(log.is_empty().await);
    }

    #[tokio::test]
    async fn test_query_scenario_ranked_and_thresholded() {
        let log = ConversationLog::in_memory(&test_config(10));
        let embedder = MockEmbedding::new()
            .with_vector("first", vec![1.0, 0.0])
            .with_vector("second", vec![0.0, 1.0])
            .with_vector("third", vec![0.9, 0.1])
            .with_vector("query", vec![1.0, 0.0]);

        append_doc(&log, "c1", "first", &embedder).await;
        append_doc(&log, "c1", "second", &embedder).await;
        append_doc(&log, "c1", "third", &embedder).await;

        let results = log.query(Some("c1"), "query", &embedder, 2, 0.5).await;

        assert_eq!(results, vec!["first", "third"]);
    }

    #[tokio::test]
    async fn test_query_never_exceeds_top_n_and_respects_threshold() {
        let log = ConversationLog::in_memory(&test_config(10));
        let embedder = MockEmbedding::new()
            .with_vector("a", vec![1.0, 0.0])
            .with_vector("b", vec![0.8, 0.2])
            .with_vector("c", vec![0.7, 0.3])
            .with_vector("q", vec![1.0, 0.0]);

        for doc in ["a", "b", "c"] {
            append_doc(&log, "c1", doc, &embedder).await;
        }

        let results = log.query(None, "q", &embedder, 2, 0.3).await;
        assert!(results.len() <= 2);

        let query_embedding = embedder.embed("q").await.unwrap();
        for doc in &results {
            let doc_embedding = embedder.embed(doc).await.unwrap();
            assert!(cosine_similarity(&query_embedding, &doc_embedding) > 0.3);
        }
    }

    #[tokio::test]
    async fn test_query_scoped_to_channel() {
        let log = ConversationLog::in_memory(&test_config(10));
        let embedder = MockEmbedding::new()
            .with_vector("in channel", vec![1.0, 0.0])
            .with_vector("other channel", vec![1.0, 0.0])
            .with_vector("q", vec![1.0, 0.0]);

        append_doc(&log, "c1", "in channel", &embedder).await;
        append_doc(&log, "c2", "other channel", &embedder).await;

        let results = log.query(Some("c1"), "q", &embedder, 10, 0.3).await;

        assert_eq!(results, vec!["in channel"]);
    }

    #[tokio::test]
    async fn test_query_without_channel_sees_everything() {
        let log = ConversationLog::in_memory(&test_config(10));
        let embedder = MockEmbedding::new()
            .with_vector("one", vec![1.0, 0.0])
            .with_vector("two", vec![0.9, 0.1])
            .with_vector("q", vec![1.0, 0.0]);

        append_doc(&log, "c1", "one", &embedder).await;
        append_doc(&log, "c2", "two", &embedder).await;

        let results = log.query(None, "q", &embedder, 10, 0.3).await;
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_query_embed_failure_degrades_to_empty() {
        let log = ConversationLog::in_memory(&test_config(10));
        let embedder = MockEmbedding::new().with_vector("doc", vec![1.0, 0.0]);

        append_doc(&log, "c1", "doc", &embedder).await;

        let failing = MockEmbedding::failing();
        let results = log.query(Some("c1"), "q", &failing, 3, 0.3).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_query_on_empty_store_is_empty() {
        let log = ConversationLog::in_memory(&test_config(10));
        let embedder = MockEmbedding::new();

        // No embed call is needed when there is nothing to score.
        let results = log.query(None, "q", &embedder, 3, 0.3).await;
        assert!(results.is_empty());
        assert_eq!(embedder.call_count(), 0);
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = test_config(10);
        let embedder = MockEmbedding::new().with_vector("persisted", vec![1.0, 0.0]);

        {
            let log = ConversationLog::open(temp_dir.path(), &config).await.unwrap();
            append_doc(&log, "c1", "persisted", &embedder).await;
        }

        let reopened = ConversationLog::open(temp_dir.path(), &config).await.unwrap();
        let records = reopened.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].document, "persisted");
        assert_eq!(records[0].embedding, vec![1.0, 0.0]);
    }

    #[tokio::test]
    async fn test_record_ids_distinct_for_distinct_timestamps() {
        let a = record_id("c1", &Utc::now());
        let b = record_id("c1", &(Utc::now() + chrono::Duration::milliseconds(5)));
        assert_ne!(a, b);
    }
}
