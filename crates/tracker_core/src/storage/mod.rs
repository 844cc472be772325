use crate::error::AppError;
use crate::model::Task;

pub mod json_store;
pub mod memory;

pub use json_store::FileStore;
pub use memory::MemoryStore;

/// Single key holding the whole task collection.
pub const STORAGE_KEY: &str = "task-management-app-tasks";
const EPHEMERAL_ENV_VAR: &str = "TRACKER_EPHEMERAL";

/// String key-value storage the task collection is persisted into.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    fn set(&self, key: &str, value: &str) -> Result<(), AppError>;

    fn remove(&self, key: &str) -> Result<(), AppError>;
}

pub fn store_from_env() -> Result<Box<dyn KeyValueStore>, AppError> {
    if std::env::var(EPHEMERAL_ENV_VAR).is_ok() {
        return Ok(Box::new(MemoryStore::default()));
    }

    let dir = json_store::store_dir()?;
    Ok(Box::new(FileStore::new(dir)))
}

/// Loads and saves the collection as a flat JSON list under
/// [`STORAGE_KEY`]. Failures are logged and never reach the caller.
pub struct TaskGateway {
    store: Box<dyn KeyValueStore>,
}

impl TaskGateway {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stored tasks, or an empty list when nothing is stored or the payload
    /// cannot be read.
    pub fn load(&self) -> Vec<Task> {
        match self.try_load() {
            Ok(tasks) => {
                tracing::debug!("loaded {} tasks", tasks.len());
                tasks
            }
            Err(err) => {
                tracing::error!("Error loading tasks from storage: {}", err);
                Vec::new()
            }
        }
    }

    pub fn try_load(&self) -> Result<Vec<Task>, AppError> {
        match self.store.get(STORAGE_KEY)? {
            Some(content) if !content.trim().is_empty() => Ok(serde_json::from_str(&content)?),
            _ => Ok(Vec::new()),
        }
    }

    pub fn save(&self, tasks: &[Task]) {
        if let Err(err) = self.try_save(tasks) {
            tracing::error!("Error saving tasks to storage: {}", err);
        }
    }

    pub fn try_save(&self, tasks: &[Task]) -> Result<(), AppError> {
        let content = serde_json::to_string(tasks)?;
        self.store.set(STORAGE_KEY, &content)
    }

    pub fn clear(&self) {
        if let Err(err) = self.store.remove(STORAGE_KEY) {
            tracing::warn!("Error clearing stored tasks: {}", err);
        }
    }
}
