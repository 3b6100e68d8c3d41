use crate::domain::model::{SortMode, SORT_PREFERENCE_KEY};
use crate::utils::error::{MoviesError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    preferences: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
struct Inner {
    path: Option<PathBuf>,
    values: Mutex<BTreeMap<String, String>>,
    listeners: Mutex<HashMap<u64, mpsc::UnboundedSender<String>>>,
    next_listener_id: AtomicU64,
}

/// Persisted string preferences with change notifications.
///
/// Cloning is cheap; clones share the same values and listeners.
#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    inner: Arc<Inner>,
}

impl SettingsStore {
    /// 不寫檔的設定，測試用
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// 從 TOML 檔載入設定，檔案不存在時以空設定開始
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let file = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            toml::from_str::<SettingsFile>(&content).map_err(|e| MoviesError::SettingsError {
                message: format!("{}: {}", path.display(), e),
            })?
        } else {
            tracing::debug!("Settings file {} not found, using defaults", path.display());
            SettingsFile::default()
        };

        Ok(Self {
            inner: Arc::new(Inner {
                path: Some(path),
                values: Mutex::new(file.preferences),
                ..Inner::default()
            }),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.inner.path.as_deref()
    }

    pub fn get_string(&self, key: &str, default: &str) -> String {
        lock(&self.inner.values)
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    /// 寫入並持久化；值有變動時才通知訂閱者
    pub fn set_string(&self, key: &str, value: &str) -> Result<()> {
        // 先寫檔成功才更新記憶體，寫檔失敗時下次重試仍視為變更
        let changed = {
            let mut values = lock(&self.inner.values);
            let changed = values.get(key).map(String::as_str) != Some(value);
            if changed {
                let mut updated = values.clone();
                updated.insert(key.to_string(), value.to_string());
                self.persist(&updated)?;
                *values = updated;
            }
            changed
        };

        if changed {
            tracing::debug!("Preference {} set to {}", key, value);
            self.notify(key);
        }
        Ok(())
    }

    pub fn sort_mode(&self) -> SortMode {
        let raw = self.get_string(SORT_PREFERENCE_KEY, SortMode::default().segment());
        SortMode::from_segment(&raw).unwrap_or_else(|| {
            tracing::warn!("Unknown sort preference '{}', falling back to popular", raw);
            SortMode::default()
        })
    }

    pub fn set_sort_mode(&self, sort: SortMode) -> Result<()> {
        self.set_string(SORT_PREFERENCE_KEY, sort.segment())
    }

    /// Registers a change listener that lives as long as the returned handle.
    pub fn subscribe(&self) -> PreferenceSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.inner.listeners).insert(id, tx);

        PreferenceSubscription {
            id,
            store: Arc::clone(&self.inner),
            rx,
        }
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.inner.listeners).len()
    }

    fn notify(&self, key: &str) {
        let mut listeners = lock(&self.inner.listeners);
        listeners.retain(|_, tx| tx.send(key.to_string()).is_ok());
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<()> {
        let Some(path) = &self.inner.path else {
            return Ok(());
        };

        let file = SettingsFile {
            preferences: values.clone(),
        };
        let content = toml::to_string(&file)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Scoped preference listener. Dropping it unregisters it from the store.
#[derive(Debug)]
pub struct PreferenceSubscription {
    id: u64,
    store: Arc<Inner>,
    rx: mpsc::UnboundedReceiver<String>,
}

impl PreferenceSubscription {
    /// Waits for the next changed key.
    pub async fn changed(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    pub fn try_changed(&mut self) -> Option<String> {
        self.rx.try_recv().ok()
    }
}

impl Drop for PreferenceSubscription {
    fn drop(&mut self) {
        lock(&self.store.listeners).remove(&self.id);
    }
}

// 鎖中毒時仍沿用內部資料，設定值不會因此失效
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
