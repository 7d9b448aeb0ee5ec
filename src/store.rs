//! Storage collaborator for persisted news items.
//!
//! The pipeline needs three operations from storage: an existence check by
//! link, an insert, and a newest-first listing for the serving side. The
//! insert is insert-if-absent: it is the authoritative deduplication guard,
//! so two concurrent workers racing on the same link can never both store it.

use crate::models::Candidate;
use crate::utils::BoxError;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Trait for the persisted item store.
pub trait NewsStore {
    /// Whether an item with this link is already stored.
    async fn exists_by_link(&self, link: &str) -> Result<bool, BoxError>;

    /// Store `item` unless its link is already present.
    ///
    /// # Returns
    ///
    /// `true` if the item was inserted, `false` if the link already existed.
    async fn save(&self, item: Candidate) -> Result<bool, BoxError>;

    /// Every stored item, newest publish time first. Items without a publish
    /// time sort last.
    async fn find_all_newest_first(&self) -> Result<Vec<Candidate>, BoxError>;
}

/// In-process [`NewsStore`] keyed by link.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RwLock<HashMap<String, Candidate>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with previously persisted items. Later duplicates of a
    /// link are ignored.
    pub fn from_items(items: Vec<Candidate>) -> Self {
        let mut map = HashMap::with_capacity(items.len());
        for item in items {
            map.entry(item.link.clone()).or_insert(item);
        }
        Self {
            items: RwLock::new(map),
        }
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }
}

impl NewsStore for MemoryStore {
    async fn exists_by_link(&self, link: &str) -> Result<bool, BoxError> {
        Ok(self.items.read().await.contains_key(link))
    }

    async fn save(&self, item: Candidate) -> Result<bool, BoxError> {
        let mut items = self.items.write().await;
        if items.contains_key(&item.link) {
            debug!(link = %item.link, "Link already stored; not inserting");
            return Ok(false);
        }
        items.insert(item.link.clone(), item);
        Ok(true)
    }

    async fn find_all_newest_first(&self) -> Result<Vec<Candidate>, BoxError> {
        let mut all: Vec<Candidate> = self.items.read().await.values().cloned().collect();
        all.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then_with(|| a.link.cmp(&b.link))
        });
        Ok(all)
    }
}
