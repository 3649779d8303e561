//! Storage abstractions and implementations for definitions and instances
//!
//! The engine depends only on [`Store`]: upsert by id, lookup by id and
//! list-all. Two backends are provided, an in-memory map and a directory of
//! JSON files. Both keep insertion order for `get_all`.

use crate::error::StorageError;
use crate::workflow::{WorkflowDefinition, WorkflowInstance};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Entities that carry a stable identifier
pub trait Identified {
    /// The key the entity is stored under
    fn id(&self) -> &str;
}

/// Keyed storage for one entity type
///
/// Implementations must be safe to share between threads. Writes to distinct
/// keys may happen concurrently; callers serialize writes to the same key.
pub trait Store<T>: Send + Sync {
    /// Insert or overwrite the item under its id
    fn add(&self, item: T) -> StorageResult<()>;

    /// Look up an item by id
    fn get(&self, id: &str) -> StorageResult<Option<T>>;

    /// All items in insertion order
    fn get_all(&self) -> StorageResult<Vec<T>>;

    /// Check if an item exists
    fn contains(&self, id: &str) -> StorageResult<bool> {
        self.get(id).map(|item| item.is_some())
    }
}

/// A stored item tagged with its insertion position
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Sequenced<T> {
    sequence: u64,
    item: T,
}

fn sorted_items<T: Clone>(entries: &DashMap<String, Sequenced<T>>) -> Vec<T> {
    let mut items: Vec<Sequenced<T>> = entries.iter().map(|entry| entry.value().clone()).collect();
    items.sort_by_key(|entry| entry.sequence);
    items.into_iter().map(|entry| entry.item).collect()
}

/// In-memory store
pub struct MemoryStore<T> {
    entries: DashMap<String, Sequenced<T>>,
    next_sequence: AtomicU64,
}

impl<T> MemoryStore<T> {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            next_sequence: AtomicU64::new(0),
        }
    }

    /// Number of stored items
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Store<T> for MemoryStore<T>
where
    T: Identified + Clone + Send + Sync,
{
    fn add(&self, item: T) -> StorageResult<()> {
        match self.entries.entry(item.id().to_string()) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().item = item;
            }
            Entry::Vacant(entry) => {
                let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst);
                entry.insert(Sequenced { sequence, item });
            }
        }
        Ok(())
    }

    fn get(&self, id: &str) -> StorageResult<Option<T>> {
        Ok(self.entries.get(id).map(|entry| entry.item.clone()))
    }

    fn get_all(&self) -> StorageResult<Vec<T>> {
        Ok(sorted_items(&self.entries))
    }
}

/// File system store: one JSON document per item, cached in memory
///
/// Items live at `<base_path>/<id>.json`. The directory is read once when the
/// store is opened; afterwards every write goes to disk before it reaches the
/// cache.
pub struct FileSystemStore<T> {
    base_path: PathBuf,
    cache: DashMap<String, Sequenced<T>>,
    next_sequence: AtomicU64,
}

impl<T> FileSystemStore<T>
where
    T: Identified + Clone + Serialize + DeserializeOwned + Send + Sync,
{
    /// Open (creating if needed) a store rooted at `base_path`
    pub fn open(base_path: impl AsRef<Path>) -> StorageResult<Self> {
        let base_path = base_path.as_ref().to_path_buf();

        if !base_path.exists() {
            std::fs::create_dir_all(&base_path).map_err(|source| StorageError::Io {
                path: base_path.clone(),
                source,
            })?;
        }

        let store = Self {
            base_path,
            cache: DashMap::new(),
            next_sequence: AtomicU64::new(0),
        };

        store.reload_cache()?;

        Ok(store)
    }

    /// Directory the items are stored in
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Reload the cache from disk
    pub fn reload_cache(&self) -> StorageResult<()> {
        self.cache.clear();
        let mut next_sequence = 0;

        for entry in walkdir::WalkDir::new(&self.base_path).max_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping entry in {}: {}", self.base_path.display(), e);
                    continue;
                }
            };
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let content = std::fs::read_to_string(path).map_err(|source| StorageError::Io {
                path: path.to_path_buf(),
                source,
            })?;

            match serde_json::from_str::<Sequenced<T>>(&content) {
                Ok(stored) => {
                    next_sequence = next_sequence.max(stored.sequence + 1);
                    self.cache.insert(stored.item.id().to_string(), stored);
                }
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry {}: {}", path.display(), e);
                }
            }
        }

        self.next_sequence.store(next_sequence, Ordering::SeqCst);
        tracing::debug!(
            "Loaded {} entries from {}",
            self.cache.len(),
            self.base_path.display()
        );
        Ok(())
    }

    fn item_path(&self, id: &str) -> PathBuf {
        self.base_path.join(format!("{id}.json"))
    }

    fn write_item(&self, stored: &Sequenced<T>) -> StorageResult<()> {
        let id = stored.item.id();
        let path = self.item_path(id);
        let content =
            serde_json::to_string_pretty(stored).map_err(|source| StorageError::Serialization {
                path: path.clone(),
                source,
            })?;

        // Replace the file in one step so readers never see a partial document
        let temp_path = self.base_path.join(format!(".{id}.json.tmp"));
        std::fs::write(&temp_path, content).map_err(|source| StorageError::Io {
            path: temp_path.clone(),
            source,
        })?;
        std::fs::rename(&temp_path, &path).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;

        Ok(())
    }
}

/// Reject ids that cannot be used as a single file name
fn validate_key(id: &str) -> StorageResult<()> {
    let reason = if id.trim().is_empty() {
        Some("id cannot be empty")
    } else if id.starts_with('.') {
        Some("id cannot start with '.'")
    } else if id.contains(['/', '\\', '\0']) {
        Some("id cannot contain path separators")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(StorageError::InvalidKey {
            key: id.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

impl<T> Store<T> for FileSystemStore<T>
where
    T: Identified + Clone + Serialize + DeserializeOwned + Send + Sync,
{
    fn add(&self, item: T) -> StorageResult<()> {
        validate_key(item.id())?;

        let key = item.id().to_string();
        let sequence = match self.cache.get(&key) {
            Some(existing) => existing.sequence,
            None => self.next_sequence.fetch_add(1, Ordering::SeqCst),
        };

        let stored = Sequenced { sequence, item };
        self.write_item(&stored)?;
        self.cache.insert(key, stored);
        Ok(())
    }

    fn get(&self, id: &str) -> StorageResult<Option<T>> {
        Ok(self.cache.get(id).map(|entry| entry.item.clone()))
    }

    fn get_all(&self) -> StorageResult<Vec<T>> {
        Ok(sorted_items(&self.cache))
    }
}

/// The pair of stores the workflow engine works against
#[derive(Clone)]
pub struct WorkflowStores {
    /// Definitions keyed by definition id
    pub definitions: Arc<dyn Store<WorkflowDefinition>>,
    /// Instances keyed by instance id
    pub instances: Arc<dyn Store<WorkflowInstance>>,
}

impl WorkflowStores {
    /// Create with the given backends
    pub fn new(
        definitions: Arc<dyn Store<WorkflowDefinition>>,
        instances: Arc<dyn Store<WorkflowInstance>>,
    ) -> Self {
        Self {
            definitions,
            instances,
        }
    }

    /// Create with memory backends
    pub fn memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()))
    }

    /// Create with file system backends under `data_dir`
    pub fn file_system(data_dir: impl AsRef<Path>) -> StorageResult<Self> {
        let data_dir = data_dir.as_ref();
        Ok(Self::new(
            Arc::new(FileSystemStore::open(data_dir.join("definitions"))?),
            Arc::new(FileSystemStore::open(data_dir.join("instances"))?),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::test_helpers::*;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: String,
        body: String,
    }

    impl Identified for Note {
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn note(id: &str, body: &str) -> Note {
        Note {
            id: id.to_string(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_memory_store_add_and_get() {
        let store = MemoryStore::new();
        store.add(note("a", "first")).unwrap();

        assert_eq!(store.get("a").unwrap(), Some(note("a", "first")));
        assert_eq!(store.get("missing").unwrap(), None);
        assert!(store.contains("a").unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_memory_store_keeps_insertion_order() {
        let store = MemoryStore::new();
        for id in ["c", "a", "b"] {
            store.add(note(id, id)).unwrap();
        }

        let ids: Vec<String> = store.get_all().unwrap().into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_memory_store_overwrite_keeps_position() {
        let store = MemoryStore::new();
        store.add(note("a", "old")).unwrap();
        store.add(note("b", "b")).unwrap();
        store.add(note("a", "new")).unwrap();

        let all = store.get_all().unwrap();
        assert_eq!(all, vec![note("a", "new"), note("b", "b")]);
    }

    #[test]
    fn test_file_system_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSystemStore::open(temp_dir.path()).unwrap();

        store.add(note("a", "first")).unwrap();
        store.add(note("b", "second")).unwrap();

        assert!(temp_dir.path().join("a.json").exists());
        assert_eq!(store.get("b").unwrap(), Some(note("b", "second")));
    }

    #[test]
    fn test_file_system_store_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        {
            let store = FileSystemStore::open(temp_dir.path()).unwrap();
            for id in ["z", "y", "x"] {
                store.add(note(id, id)).unwrap();
            }
            store.add(note("z", "updated")).unwrap();
        }

        let reopened: FileSystemStore<Note> = FileSystemStore::open(temp_dir.path()).unwrap();
        let all = reopened.get_all().unwrap();

        assert_eq!(all, vec![note("z", "updated"), note("y", "y"), note("x", "x")]);

        reopened.add(note("w", "w")).unwrap();
        assert_eq!(reopened.get_all().unwrap().last(), Some(&note("w", "w")));
    }

    #[test]
    fn test_file_system_store_skips_corrupt_files() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("broken.json"), "{ not json").unwrap();

        let store: FileSystemStore<Note> = FileSystemStore::open(temp_dir.path()).unwrap();
        assert!(store.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_reload_skips_unwalkable_directory() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("notes");
        let store = FileSystemStore::open(&base).unwrap();
        store.add(note("a", "first")).unwrap();

        std::fs::remove_dir_all(&base).unwrap();

        store.reload_cache().unwrap();
        assert!(store.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_file_system_store_rejects_unsafe_ids() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSystemStore::open(temp_dir.path()).unwrap();

        for id in ["", "../escape", "a/b", ".hidden"] {
            let result = store.add(note(id, "x"));
            assert!(
                matches!(result, Err(StorageError::InvalidKey { .. })),
                "id {id:?} should be rejected"
            );
        }
        assert!(store.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_workflow_stores_file_system_layout() {
        let temp_dir = TempDir::new().unwrap();
        let stores = WorkflowStores::file_system(temp_dir.path()).unwrap();

        stores
            .definitions
            .add(create_two_state_definition("orders"))
            .unwrap();

        assert!(temp_dir.path().join("definitions").join("orders.json").exists());
        assert!(temp_dir.path().join("instances").is_dir());
    }

    #[test]
    fn test_memory_store_concurrent_writes_to_distinct_keys() {
        let store = Arc::new(MemoryStore::<Note>::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for j in 0..50 {
                        store.add(note(&format!("{i}-{j}"), "x")).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.get_all().unwrap().len(), 400);
    }
}
