//! Default in-memory `CharacterStore`.
//!
//! Persistence is explicitly out of scope for this crate (see `character_selection`'s
//! own doc comment): a deployment backed by a document store or SQL database supplies
//! its own `CharacterStore` impl. This one exists so the server has something to
//! construct out of the box, and so integration tests don't need a real database.

use super::character_selection::{CharacterLoadout, CharacterRecord, CharacterStore};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// `CharacterStore` backed by a `DashMap`, with no disk persistence. Characters
/// created against this store do not survive a server restart.
#[derive(Debug, Default)]
pub struct InMemoryCharacterStore {
    records: DashMap<String, CharacterRecord>,
    next_id: AtomicU64,
}

impl InMemoryCharacterStore {
    pub fn new() -> Self {
        Self { records: DashMap::new(), next_id: AtomicU64::new(1) }
    }
}

#[async_trait::async_trait]
impl CharacterStore for InMemoryCharacterStore {
    async fn list_for_account(&self, account_id: &str) -> Vec<CharacterRecord> {
        self.records.iter().filter(|r| r.account_id == account_id).map(|r| r.clone()).collect()
    }

    async fn create(&self, account_id: &str, name: &str, avatar: Option<String>) -> CharacterRecord {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        let record = CharacterRecord {
            character_id: format!("char-{n}"),
            account_id: account_id.to_string(),
            name: name.to_string(),
            avatar,
            saved_position: None,
        };
        self.records.insert(record.character_id.clone(), record.clone());
        record
    }

    async fn get(&self, character_id: &str, account_id: &str, is_agent: bool) -> Option<CharacterRecord> {
        let record = self.records.get(character_id)?;
        if is_agent || record.account_id == account_id {
            Some(record.clone())
        } else {
            None
        }
    }

    async fn load_loadout(&self, _character_id: &str) -> CharacterLoadout {
        CharacterLoadout::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn created_character_is_scoped_to_its_account() {
        let store = InMemoryCharacterStore::new();
        let record = store.create("acct1", "Hero", None).await;
        assert!(store.get(&record.character_id, "acct2", false).await.is_none());
        assert!(store.get(&record.character_id, "acct1", false).await.is_some());
    }

    #[tokio::test]
    async fn agent_lookup_bypasses_ownership_check() {
        let store = InMemoryCharacterStore::new();
        let record = store.create("acct1", "Hero", None).await;
        assert!(store.get(&record.character_id, "someone_else", true).await.is_some());
    }

    #[tokio::test]
    async fn list_for_account_excludes_other_accounts() {
        let store = InMemoryCharacterStore::new();
        store.create("acct1", "Hero", None).await;
        store.create("acct2", "Villain", None).await;
        assert_eq!(store.list_for_account("acct1").await.len(), 1);
    }
}
