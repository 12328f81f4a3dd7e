use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::{fs, sync::RwLock};
use uuid::Uuid;

use crate::{
    composer::{self, MAX_CODE_CHARS, MAX_CONTENT_CHARS, char_len},
    logging::log_reaction,
    models::{CategoryFilter, ConfessionRecord, NewConfession, ReactionKind},
    service::{ConfessionService, ReactionSink, RecordSource, SubmissionError},
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Confessions kept in memory and mirrored to a JSON file after every change.
#[derive(Debug, Default)]
pub struct ConfessionStore {
    path: Option<PathBuf>,
    records: RwLock<Vec<ConfessionRecord>>,
}

impl ConfessionStore {
    /// A store that never touches the disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Loads the store from `path`. A missing file starts an empty store and creates it.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let records = if fs::try_exists(&path).await.unwrap_or(false) {
            let content = fs::read_to_string(&path)
                .await
                .map_err(|source| StoreError::Io {
                    path: path.clone(),
                    source,
                })?;
            serde_json::from_str(&content).map_err(|source| StoreError::Json {
                path: path.clone(),
                source,
            })?
        } else {
            Vec::new()
        };

        let store = Self {
            path: Some(path),
            records: RwLock::new(records),
        };
        store.save(&*store.records.read().await).await?;
        Ok(store)
    }

    async fn save(&self, records: &[ConfessionRecord]) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let content = serde_json::to_string_pretty(records).map_err(|source| StoreError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(path, content).await.map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })
    }

    pub async fn count(&self) -> usize {
        self.records.read().await.len()
    }
}

/// Server-side mirror of the composer rules, plus the upper bounds.
fn check_request(request: &NewConfession) -> Result<(), SubmissionError> {
    composer::validate(&request.content, &request.secret_code)
        .map_err(|e| SubmissionError::new(e.to_string()))?;

    if char_len(request.content.trim()) > MAX_CONTENT_CHARS {
        return Err(SubmissionError::new(
            "Your confession cannot be longer than 1000 characters.",
        ));
    }
    if char_len(request.secret_code.trim()) > MAX_CODE_CHARS {
        return Err(SubmissionError::new(
            "Secret code cannot be longer than 8 digits.",
        ));
    }
    if request.hashtags.is_empty() {
        return Err(SubmissionError::new("At least one hashtag is required."));
    }
    Ok(())
}

#[async_trait]
impl ConfessionService for ConfessionStore {
    async fn submit(&self, request: NewConfession) -> Result<ConfessionRecord, SubmissionError> {
        check_request(&request)?;

        let record = ConfessionRecord {
            id: Uuid::new_v4().to_string(),
            content: request.content,
            category: request.category,
            hashtags: request.hashtags,
            secret_code: request.secret_code,
            created_at: Utc::now(),
            reactions: Default::default(),
        };

        let mut records = self.records.write().await;
        records.push(record.clone());

        if let Err(e) = self.save(&records).await {
            log::error!("Failed to save confession {}: {}", record.id, e);
            records.pop();
            return Err(SubmissionError::without_message());
        }

        Ok(record)
    }
}

#[async_trait]
impl RecordSource for ConfessionStore {
    async fn confessions(&self) -> Vec<ConfessionRecord> {
        self.records.read().await.clone()
    }

    fn categories(&self) -> Vec<String> {
        CategoryFilter::options()
            .map(|c| c.label().to_string())
            .collect()
    }
}

#[async_trait]
impl ReactionSink for ConfessionStore {
    async fn react(&self, confession_id: &str, kind: ReactionKind) {
        let mut records = self.records.write().await;

        let Some(record) = records.iter_mut().find(|r| r.id == confession_id) else {
            log::warn!("Reaction for unknown confession {}", confession_id);
            return;
        };
        *record.reactions.entry(kind).or_insert(0) += 1;
        log_reaction(confession_id, kind);

        if let Err(e) = self.save(&records).await {
            log::error!("Failed to save reaction on {}: {}", confession_id, e);
        }
    }
}
