//! User profile store: one evolving natural-language summary per user.
//!
//! Backed by `user_summaries.json`, a map from user id to the summary plus
//! its last write time, fully rewritten on every save. A per-store mutex
//! serializes the load-mutate-save sequence so interleaved turns cannot lose
//! writes.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::persist::Backing;

const USER_SUMMARIES_FILE: &str = "user_summaries.json";

/// Stored profile value: the summary and when it was last written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredProfile {
    pub summary: String,
    pub updated_at: DateTime<Utc>,
}

/// File-backed map from user id to profile summary.
pub struct ProfileStore {
    backing: Backing,
    section: Mutex<()>,
}

impl ProfileStore {
    /// Open the store under `dir` (`user_summaries.json`), creating the
    /// directory when missing. Existing state is picked up as-is; a corrupt
    /// file loads as an empty store.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).await?;

        Ok(Self {
            backing: Backing::File(dir.join(USER_SUMMARIES_FILE)),
            section: Mutex::new(()),
        })
    }

    /// Store with in-memory backing and identical semantics, for tests.
    pub fn in_memory() -> Self {
        Self {
            backing: Backing::in_memory(),
            section: Mutex::new(()),
        }
    }

    /// Current summary for `user_id`, or `None` when the user is unknown.
    /// Never fails: unreadable state reads as an empty store.
    pub async fn get_summary(&self, user_id: &str) -> Option<String> {
        let _section = self.section.lock().await;
        let summaries: HashMap<String, StoredProfile> = self.backing.load_or_default().await;
        summaries.get(user_id).map(|p| p.summary.clone())
    }

    /// Unconditionally overwrite the summary for `user_id`, recording the
    /// write time, and persist the whole store.
    pub async fn set_summary(&self, user_id: &str, summary: impl Into<String>) -> Result<()> {
        let _section = self.section.lock().await;
        let mut summaries: HashMap<String, StoredProfile> = self.backing.load_or_default().await;
        summaries.insert(
            user_id.to_string(),
            StoredProfile {
                summary: summary.into(),
                updated_at: Utc::now(),
            },
        );
        self.backing.save(&summaries).await
    }
}
