//! The session store: durable, concurrency-protected per-(user, problem)
//! state. Mutations for a single key are strictly serialized and flushed to
//! disk inside the critical section; two different keys never block each
//! other (§5).

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Mutex;

use crate::model::Session;

/// A process-wide, durable session store keyed by `user_id ⊕ "_" ⊕ problem_id`.
///
/// Key-scoped mutual exclusion is provided by a per-key `tokio::sync::Mutex`
/// stored behind an outer registry lock; the outer lock is only ever held
/// long enough to look up or insert that per-key handle, so unrelated keys
/// never serialize behind each other.
pub struct SessionStore {
    path: PathBuf,
    registry: Mutex<HashMap<String, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    /// Loads the store from `path` if it exists, otherwise starts empty.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut registry = HashMap::new();
        if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read session store: {}", path.display()))?;
            if !content.trim().is_empty() {
                let loaded: HashMap<String, Session> = serde_json::from_str(&content)
                    .with_context(|| format!("corrupt session store: {}", path.display()))?;
                for (key, session) in loaded {
                    registry.insert(key, Arc::new(Mutex::new(session)));
                }
            }
        }
        Ok(Self {
            path,
            registry: Mutex::new(registry),
        })
    }

    async fn key_lock(&self, key: &str) -> Arc<Mutex<Session>> {
        let mut registry = self.registry.lock().await;
        registry
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Session::default())))
            .clone()
    }

    /// Reads a snapshot of the session for `key`, or the default (new
    /// session) if none exists yet. Does not create an entry.
    pub async fn get(&self, key: &str) -> Session {
        let handle = self.key_lock(key).await;
        let guard = handle.lock().await;
        guard.clone()
    }

    /// Applies `mutate` to the session for `key` under that key's exclusive
    /// lock, flushes the whole store to disk, and returns the updated
    /// session.
    ///
    /// Flushing the whole store (rather than just one key) matches the
    /// original's "rewrite sessions.json on every mutation" persistence
    /// model. The per-key lock is released before `flush()` runs, since
    /// `flush()` re-locks every key (including this one) to take its
    /// snapshot — holding `guard` across that call would deadlock against
    /// `tokio::sync::Mutex`'s non-reentrancy.
    pub async fn mutate<F>(&self, key: &str, mutate: F) -> Result<Session>
    where
        F: FnOnce(&mut Session),
    {
        let handle = self.key_lock(key).await;
        let snapshot = {
            let mut guard = handle.lock().await;
            mutate(&mut guard);
            guard.clone()
        };
        self.flush().await?;
        Ok(snapshot)
    }

    async fn flush(&self) -> Result<()> {
        let registry = self.registry.lock().await;
        let mut snapshot = HashMap::with_capacity(registry.len());
        for (key, handle) in registry.iter() {
            snapshot.insert(key.clone(), handle.lock().await.clone());
        }
        drop(registry);
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write session store: {}", self.path.display()))?;
        Ok(())
    }

    /// Persists `code` as the draft for `key` without touching `last_error`
    /// or `attempt` (invariant C: only the save operation writes `draft_code`).
    pub async fn save_draft(&self, key: &str, code: String) -> Result<()> {
        self.mutate(key, |session| {
            session.draft_code = Some(code);
        })
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TestOutcome;

    #[tokio::test]
    async fn fresh_store_returns_default_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::load(dir.path().join("sessions.json")).unwrap();
        let session = store.get("alice_two-sum").await;
        assert_eq!(session.attempt, 0);
        assert!(session.last_error.is_none());
    }

    #[tokio::test]
    async fn mutate_flushes_to_disk_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.json");
        let store = SessionStore::load(&path).unwrap();

        store
            .mutate("alice_two-sum", |s| {
                s.attempt = 1;
                s.last_error = Some(TestOutcome::LogicError);
            })
            .await
            .unwrap();

        assert!(path.exists());
        let reloaded = SessionStore::load(&path).unwrap();
        let session = reloaded.get("alice_two-sum").await;
        assert_eq!(session.attempt, 1);
        assert_eq!(session.last_error, Some(TestOutcome::LogicError));
    }

    #[tokio::test]
    async fn save_draft_does_not_touch_attempt_or_last_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::load(dir.path().join("sessions.json")).unwrap();
        store
            .mutate("bob_fizzbuzz", |s| {
                s.attempt = 2;
                s.last_error = Some(TestOutcome::RuntimeError);
            })
            .await
            .unwrap();

        store
            .save_draft("bob_fizzbuzz", "print('draft')".to_string())
            .await
            .unwrap();

        let session = store.get("bob_fizzbuzz").await;
        assert_eq!(session.attempt, 2);
        assert_eq!(session.last_error, Some(TestOutcome::RuntimeError));
        assert_eq!(session.draft_code.as_deref(), Some("print('draft')"));
    }

    #[tokio::test]
    async fn independent_keys_do_not_block_each_other() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(SessionStore::load(dir.path().join("sessions.json")).unwrap());

        let a = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .mutate("alice_p1", |s| s.attempt = 1)
                    .await
                    .unwrap();
            })
        };
        let b = {
            let store = store.clone();
            tokio::spawn(async move {
                store.mutate("bob_p1", |s| s.attempt = 1).await.unwrap();
            })
        };
        a.await.unwrap();
        b.await.unwrap();

        assert_eq!(store.get("alice_p1").await.attempt, 1);
        assert_eq!(store.get("bob_p1").await.attempt, 1);
    }
}
