//! Spelling suggestions from an external dictionary.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::DictionaryError;

/// Source of spelling suggestions for a word.
#[async_trait]
pub trait Dictionary: Send + Sync {
    async fn suggestions(&self, word: &str) -> Result<Vec<String>, DictionaryError>;
}

/// A dictionary that never has suggestions.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDictionary;

#[async_trait]
impl Dictionary for NullDictionary {
    async fn suggestions(&self, _word: &str) -> Result<Vec<String>, DictionaryError> {
        Ok(Vec::new())
    }
}

/// Caches dictionary results per word for the lifetime of the cache.
///
/// Entries are never evicted. Failed lookups are not cached.
pub struct SpellingCache {
    dictionary: Arc<dyn Dictionary>,
    entries: Mutex<HashMap<String, Vec<String>>>,
}

impl SpellingCache {
    pub fn new(dictionary: Arc<dyn Dictionary>) -> Self {
        Self {
            dictionary,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Suggestions for `word`, asking the dictionary at most once per word.
    pub async fn suggestions(&self, word: &str) -> Result<Vec<String>, DictionaryError> {
        let cached = self.entries.lock().get(word).cloned();
        if let Some(cached) = cached {
            return Ok(cached);
        }

        debug!("Looking up spelling suggestions for '{}'", word);
        let suggestions = self.dictionary.suggestions(word).await?;
        self.entries
            .lock()
            .insert(word.to_string(), suggestions.clone());
        Ok(suggestions)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.entries.lock().contains_key(word)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for SpellingCache {
    fn default() -> Self {
        Self::new(Arc::new(NullDictionary))
    }
}

impl std::fmt::Debug for SpellingCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpellingCache")
            .field("entries", &self.len())
            .finish()
    }
}
