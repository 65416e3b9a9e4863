//! Round-robin API key pool

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Keys of one provider, handed out round-robin
///
/// Clones share the rotation cursor.
#[derive(Debug, Clone, Default)]
pub struct ApiKeyPool {
    keys: Arc<Vec<String>>,
    cursor: Arc<AtomicUsize>,
}

impl ApiKeyPool {
    /// Build a pool, dropping blank keys
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys = keys
            .into_iter()
            .map(|key| {
                let key: String = key.into();
                key.trim().to_string()
            })
            .filter(|k| !k.is_empty())
            .collect();

        Self {
            keys: Arc::new(keys),
            cursor: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Next key in rotation, `None` when the pool is empty
    pub fn next_key(&self) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.keys.len();
        self.keys.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
