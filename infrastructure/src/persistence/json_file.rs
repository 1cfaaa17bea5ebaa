//! Durable idea store: one pretty-printed JSON file per record.
//!
//! Writes go to a temporary file in the same directory which is then
//! renamed over the target, so readers never observe a partial record.

use async_trait::async_trait;
use cofounder_application::ports::idea_repository::{
    IdeaPage, IdeaQuery, IdeaRepository, RepositoryError,
};
use cofounder_domain::{IdeaId, IdeaRecord};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct JsonFileIdeaRepository {
    dir: PathBuf,
}

impl JsonFileIdeaRepository {
    /// Open the store at `dir`, creating the directory if needed
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        debug!(dir = %dir.display(), "Opened JSON idea store");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Ids become file names, so anything but `[A-Za-z0-9_-]` is rejected
    fn path_for(&self, id: &IdeaId) -> Option<PathBuf> {
        let valid = !id.as_str().is_empty()
            && id
                .as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        valid.then(|| self.dir.join(format!("{}.json", id.as_str())))
    }

    async fn read_record(path: &Path) -> Result<Option<IdeaRecord>, RepositoryError> {
        match tokio::fs::read(path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map(Some).map_err(|e| {
                RepositoryError::Corrupt {
                    id: path
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    reason: e.to_string(),
                }
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl IdeaRepository for JsonFileIdeaRepository {
    async fn get(&self, id: &IdeaId) -> Result<Option<IdeaRecord>, RepositoryError> {
        match self.path_for(id) {
            Some(path) => Self::read_record(&path).await,
            None => Ok(None),
        }
    }

    async fn save(&self, record: &IdeaRecord) -> Result<(), RepositoryError> {
        let path = self.path_for(&record.id).ok_or_else(|| RepositoryError::Corrupt {
            id: record.id.to_string(),
            reason: "id is not usable as a file name".into(),
        })?;
        let bytes = serde_json::to_vec_pretty(record)?;
        let tmp = self
            .dir
            .join(format!(".{}.{}.tmp", record.id.as_str(), temp_suffix()));
        tokio::fs::write(&tmp, &bytes).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn delete(&self, id: &IdeaId) -> Result<bool, RepositoryError> {
        let Some(path) = self.path_for(id) else {
            return Ok(false);
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, query: &IdeaQuery) -> Result<IdeaPage, RepositoryError> {
        let mut records = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_record = path.extension().is_some_and(|ext| ext == "json")
                && !path
                    .file_name()
                    .is_some_and(|n| n.to_string_lossy().starts_with('.'));
            if !is_record {
                continue;
            }
            match Self::read_record(&path).await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                // One bad file must not hide the rest of the store
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable record"),
            }
        }
        Ok(query.apply(records))
    }
}

/// Unique per write so concurrent saves of one id never share a temp file
fn temp_suffix() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    format!("{}-{}", std::process::id(), COUNTER.fetch_add(1, Ordering::Relaxed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cofounder_domain::{Constraints, IdeaDraft, MarketAnalysis, Topic};

    fn record(title: &str, topic: &str) -> IdeaRecord {
        IdeaRecord::new(
            IdeaDraft::new(title, "desc"),
            Topic::try_new(topic).unwrap(),
            Constraints::new().with("budget", 5000),
            MarketAnalysis::fallback_for(topic),
        )
    }

    #[tokio::test]
    async fn test_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileIdeaRepository::open(dir.path()).await.unwrap();
        let idea = record("FitBot", "fitness");
        repo.save(&idea).await.unwrap();

        // A fresh handle sees the same data
        let reopened = JsonFileIdeaRepository::open(dir.path()).await.unwrap();
        let loaded = reopened.get(&idea.id).await.unwrap().unwrap();
        assert_eq!(loaded.title, idea.title);
        assert_eq!(loaded.version, 1);
        assert_eq!(loaded.constraints, idea.constraints);
        assert_eq!(loaded.market_analysis, idea.market_analysis);
        assert_eq!(loaded.created_at, idea.created_at);
        assert!((loaded.overall_score - idea.overall_score).abs() < 1e-9);
        assert!(dir.path().join(format!("{}.json", idea.id)).exists());
    }

    #[tokio::test]
    async fn test_overwrite_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileIdeaRepository::open(dir.path()).await.unwrap();
        let mut idea = record("FitBot", "fitness");
        repo.save(&idea).await.unwrap();
        idea.title = "FitBot 2".into();
        repo.save(&idea).await.unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![format!("{}.json", idea.id)]);
        assert_eq!(repo.get(&idea.id).await.unwrap().unwrap().title, "FitBot 2");
    }

    #[tokio::test]
    async fn test_delete_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileIdeaRepository::open(dir.path()).await.unwrap();
        let idea = record("FitBot", "fitness");
        repo.save(&idea).await.unwrap();

        assert!(repo.delete(&idea.id).await.unwrap());
        assert!(!repo.delete(&idea.id).await.unwrap());
        assert_eq!(repo.get(&idea.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_path_traversal_ids_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileIdeaRepository::open(dir.path()).await.unwrap();
        assert_eq!(repo.get(&IdeaId::from("../etc/passwd")).await.unwrap(), None);
        assert!(!repo.delete(&IdeaId::from("a/b")).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_skips_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileIdeaRepository::open(dir.path()).await.unwrap();
        repo.save(&record("FitBot", "fitness")).await.unwrap();
        repo.save(&record("ChefAI", "cooking")).await.unwrap();
        std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();

        let page = repo.list(&IdeaQuery::default()).await.unwrap();
        assert_eq!(page.total, 2);

        let filtered = repo
            .list(&IdeaQuery::default().with_topic_filter("cook"))
            .await
            .unwrap();
        assert_eq!(filtered.total, 1);
        assert_eq!(filtered.ideas[0].title, "ChefAI");
    }

    #[tokio::test]
    async fn test_get_corrupt_record_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileIdeaRepository::open(dir.path()).await.unwrap();
        std::fs::write(dir.path().join("bad.json"), "[]").unwrap();
        assert!(matches!(
            repo.get(&IdeaId::from("bad")).await,
            Err(RepositoryError::Corrupt { .. })
        ));
    }
}
