//! Diagnosis history collaborator.
//!
//! Entries are keyed `diagnosis_{userId}_{timestampMillis}`, unique per user:
//! a save landing on a millisecond the user already has is moved forward
//! until its key is free. Lookups filter by exact user id, newest first,
//! capped by the caller's limit.

use std::collections::HashSet;
use std::future::Future;

use chrono::{DateTime, TimeDelta, Utc};
use diagnostic_engine::AnswerSet;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::{error::Result, schema::DiagnosisRecord};

/// Format tag stored with every entry.
pub const RECORD_VERSION: &str = "rag_llm_v1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryMetadata {
    pub timestamp: DateTime<Utc>,
    pub processing_time_ms: u64,
    pub rag_used: bool,
    pub sources_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub version: String,
}

/// One stored diagnosis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub user_id: String,
    pub symptoms: Vec<String>,
    pub answers: AnswerSet,
    pub result: DiagnosisRecord,
    pub metadata: HistoryMetadata,
}

impl HistoryEntry {
    pub fn key(&self) -> String {
        history_key(&self.user_id, self.metadata.timestamp)
    }
}

pub fn history_key(user_id: &str, at: DateTime<Utc>) -> String {
    format!("diagnosis_{user_id}_{}", at.timestamp_millis())
}

/// What `history` returns per entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub category: String,
    pub symptoms: Vec<String>,
    pub processing_time_ms: u64,
    pub rag_used: bool,
}

impl From<&HistoryEntry> for HistorySummary {
    fn from(e: &HistoryEntry) -> Self {
        Self {
            id: e.key(),
            timestamp: e.metadata.timestamp,
            category: e.result.category.clone(),
            symptoms: e.symptoms.clone(),
            processing_time_ms: e.metadata.processing_time_ms,
            rag_used: e.metadata.rag_used,
        }
    }
}

/// Persistence seam for diagnosis history.
pub trait HistoryStore: Send + Sync + 'static {
    /// Stores `entry` and returns its key. Keys never repeat for one user.
    fn save(&self, entry: HistoryEntry) -> impl Future<Output = Result<String>> + Send;

    /// Entries of exactly `user_id`, newest first, at most `limit`.
    fn recent(
        &self,
        user_id: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<HistoryEntry>>> + Send;
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    entries: RwLock<Vec<HistoryEntry>>,
}

impl InMemoryHistoryStore {
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl HistoryStore for InMemoryHistoryStore {
    async fn save(&self, mut entry: HistoryEntry) -> Result<String> {
        let mut entries = self.entries.write().await;
        let taken: HashSet<i64> = entries
            .iter()
            .filter(|e| e.user_id == entry.user_id)
            .map(|e| e.metadata.timestamp.timestamp_millis())
            .collect();
        while taken.contains(&entry.metadata.timestamp.timestamp_millis()) {
            entry.metadata.timestamp += TimeDelta::milliseconds(1);
        }

        let key = entry.key();
        entries.push(entry);
        debug!(key = %key, "history saved");
        Ok(key)
    }

    async fn recent(&self, user_id: &str, limit: usize) -> Result<Vec<HistoryEntry>> {
        let entries = self.entries.read().await;
        // Reverse first so equal timestamps list the later insert first.
        let mut out: Vec<HistoryEntry> = entries
            .iter()
            .rev()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.metadata.timestamp.cmp(&a.metadata.timestamp));
        out.truncate(limit);
        Ok(out)
    }
}
