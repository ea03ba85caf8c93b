use crate::error::ServiceResult;
use async_trait::async_trait;
use reel_review_models::{Movie, Review};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to write {collection} collection: {source}")]
    Io {
        collection: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize {collection} collection: {source}")]
    Serialization {
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Duplicate id {id} in {collection} collection")]
    Duplicate { collection: String, id: String },
}

/// A record that can live in a document collection
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    fn document_id(&self) -> String;
}

impl Document for Review {
    fn document_id(&self) -> String {
        self.id.to_string()
    }
}

impl Document for Movie {
    fn document_id(&self) -> String {
        self.tmdb_id.to_string()
    }
}

/// In-place change to one document. Returning an error aborts the update.
pub type Mutation<'a, T> = Box<dyn FnOnce(&mut T) -> ServiceResult<()> + Send + 'a>;

/// Single-collection document storage.
///
/// Every mutation is applied to exactly one document and is either fully
/// persisted or not applied at all.
#[async_trait]
pub trait DocumentStore<T: Document>: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<T>, StoreError>;
    async fn list(&self) -> Result<Vec<T>, StoreError>;
    /// Fails with `Duplicate` if a document with the same id exists
    async fn insert(&self, doc: T) -> Result<T, StoreError>;
    /// Replace the document with the same id, inserting it when absent
    async fn upsert(&self, doc: T) -> Result<T, StoreError>;
    async fn remove(&self, id: &str) -> Result<Option<T>, StoreError>;
    /// Read, change and write back one document under a single lock.
    ///
    /// Returns `None` without inserting when no document has this id.
    async fn update<'a>(&'a self, id: &'a str, change: Mutation<'a, T>) -> ServiceResult<Option<T>>;
}

/// Collection held in memory and, when given a path, mirrored to a JSON file.
///
/// The whole collection is rewritten after each mutation. The in-memory state
/// only changes once the write has succeeded.
pub struct JsonFileStore<T> {
    collection: String,
    path: Option<PathBuf>,
    docs: RwLock<Vec<T>>,
}

impl<T: Document> JsonFileStore<T> {
    pub fn in_memory(collection: &str) -> Self {
        Self {
            collection: collection.to_string(),
            path: None,
            docs: RwLock::new(Vec::new()),
        }
    }

    pub fn open(collection: &str, path: PathBuf) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                collection: collection.to_string(),
                source,
            })?;
        }

        let docs = Self::load(collection, &path);
        Ok(Self {
            collection: collection.to_string(),
            path: Some(path),
            docs: RwLock::new(docs),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn load(collection: &str, path: &Path) -> Vec<T> {
        if !path.exists() {
            debug!("Store {}: no file at {:?}, starting empty", collection, path);
            return Vec::new();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<Vec<T>>(&content) {
                Ok(docs) => {
                    info!("Store {}: loaded {} documents", collection, docs.len());
                    docs
                }
                Err(e) => {
                    let aside = path.with_extension("json.corrupt");
                    warn!(
                        "Store corruption detected for {}: {}. Moving file to {:?} and starting empty.",
                        collection, e, aside
                    );
                    if let Err(mv_err) = std::fs::rename(path, &aside) {
                        warn!("Failed to move corrupted store file: {}", mv_err);
                    }
                    Vec::new()
                }
            },
            Err(e) => {
                warn!("Failed to read store file for {}: {}", collection, e);
                Vec::new()
            }
        }
    }

    async fn persist(&self, docs: &[T]) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = serde_json::to_string_pretty(docs).map_err(|source| StoreError::Serialization {
            collection: self.collection.clone(),
            source,
        })?;

        let tmp = path.with_extension("json.tmp");
        let io_err = |source| StoreError::Io {
            collection: self.collection.clone(),
            source,
        };
        tokio::fs::write(&tmp, json).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, path).await.map_err(io_err)?;
        debug!("Store {}: saved {} documents", self.collection, docs.len());
        Ok(())
    }

    /// Apply `change` to a copy of the collection, persist it, then publish it
    async fn commit<F, R>(&self, change: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, StoreError>,
    {
        let mut docs = self.docs.write().await;
        let mut next = docs.clone();
        let result = change(&mut next)?;
        self.persist(&next).await?;
        *docs = next;
        Ok(result)
    }
}

#[async_trait]
impl<T: Document> DocumentStore<T> for JsonFileStore<T> {
    async fn get(&self, id: &str) -> Result<Option<T>, StoreError> {
        let docs = self.docs.read().await;
        Ok(docs.iter().find(|d| d.document_id() == id).cloned())
    }

    async fn list(&self) -> Result<Vec<T>, StoreError> {
        Ok(self.docs.read().await.clone())
    }

    async fn insert(&self, doc: T) -> Result<T, StoreError> {
        let collection = self.collection.clone();
        self.commit(move |docs| {
            let id = doc.document_id();
            if docs.iter().any(|d| d.document_id() == id) {
                return Err(StoreError::Duplicate { collection, id });
            }
            docs.push(doc.clone());
            Ok(doc)
        })
        .await
    }

    async fn upsert(&self, doc: T) -> Result<T, StoreError> {
        self.commit(move |docs| {
            let id = doc.document_id();
            match docs.iter_mut().find(|d| d.document_id() == id) {
                Some(existing) => *existing = doc.clone(),
                None => docs.push(doc.clone()),
            }
            Ok(doc)
        })
        .await
    }

    async fn remove(&self, id: &str) -> Result<Option<T>, StoreError> {
        self.commit(|docs| {
            let removed = docs
                .iter()
                .position(|d| d.document_id() == id)
                .map(|index| docs.remove(index));
            Ok(removed)
        })
        .await
    }

    async fn update<'a>(&'a self, id: &'a str, change: Mutation<'a, T>) -> ServiceResult<Option<T>> {
        let mut docs = self.docs.write().await;
        let Some(index) = docs.iter().position(|d| d.document_id() == id) else {
            return Ok(None);
        };

        let mut doc = docs[index].clone();
        change(&mut doc)?;

        let mut next = docs.clone();
        next[index] = doc.clone();
        self.persist(&next).await?;
        *docs = next;
        Ok(Some(doc))
    }
}
