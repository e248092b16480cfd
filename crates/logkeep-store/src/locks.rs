//! Per-path lock registry

use logkeep_core::MAX_LOCK_ENTRIES;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// Mutual-exclusion handle for one file path
pub type PathLock = Arc<Mutex<()>>;

struct LockEntry {
    lock: PathLock,
    last_used: u64,
}

#[derive(Default)]
struct RegistryState {
    entries: HashMap<PathBuf, LockEntry>,
    /// Monotonic use counter driving LRU order
    tick: u64,
}

/// Maps absolute file paths to locks, bounded with LRU eviction.
///
/// Only entries nobody else references are evicted, so a path can never end
/// up with two live locks. If every entry is in use the table grows past its
/// cap until handles are released.
pub struct LockRegistry {
    state: Mutex<RegistryState>,
    capacity: usize,
}

impl Default for LockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::with_capacity(MAX_LOCK_ENTRIES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
            capacity: capacity.max(1),
        }
    }

    /// Get the lock for `path`, creating it if needed. The same path always
    /// yields the same handle while anyone holds it.
    pub fn acquire(&self, path: &Path) -> PathLock {
        let key = absolute_path(path);
        let mut guard = self.state.lock();
        let state = &mut *guard;
        state.tick += 1;
        let tick = state.tick;

        let lock = match state.entries.get_mut(&key) {
            Some(entry) => {
                entry.last_used = tick;
                Arc::clone(&entry.lock)
            }
            None => {
                let lock = PathLock::default();
                state.entries.insert(
                    key,
                    LockEntry {
                        lock: Arc::clone(&lock),
                        last_used: tick,
                    },
                );
                lock
            }
        };

        if state.entries.len() > self.capacity {
            state.evict_unused(self.capacity);
        }
        lock
    }

    /// Run `body` while holding the lock for `path`
    pub fn with_lock<T>(&self, path: &Path, body: impl FnOnce() -> T) -> T {
        let lock = self.acquire(path);
        let _guard = lock.lock();
        body()
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RegistryState {
    fn evict_unused(&mut self, capacity: usize) {
        while self.entries.len() > capacity {
            // Strong count 1 means only the registry holds it: no caller can be inside
            let victim = self
                .entries
                .iter()
                .filter(|(_, entry)| Arc::strong_count(&entry.lock) == 1)
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(path, _)| path.clone());

            match victim {
                Some(path) => {
                    self.entries.remove(&path);
                }
                None => {
                    warn!(
                        "Lock registry over capacity ({} > {}), all locks in use",
                        self.entries.len(),
                        capacity
                    );
                    break;
                }
            }
        }
    }
}

fn absolute_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
