//! Durable credential storage.
//!
//! The session credential is persisted as two independent key-value
//! entries under the cache directory: the raw bearer token and the
//! serialized user record. The two writes are not atomic; the session
//! manager treats a partial pair as no session and clears the stray
//! entry on the next hydration.

use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::fs;
use tracing::debug;

/// Storage key for the raw bearer token.
pub const KEY_TOKEN: &str = "authToken";

/// Storage key for the serialized user record.
pub const KEY_USER: &str = "user";

/// File-per-key asynchronous key-value store.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    dir: PathBuf,
}

impl CredentialStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    /// Read the value stored under `key`, or None if the entry is absent.
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.entry_path(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read credential entry {key}")),
        }
    }

    /// Write `value` under `key`, creating the store directory if needed.
    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .await
            .context("Failed to create credential store directory")?;
        fs::write(self.entry_path(key), value)
            .await
            .with_context(|| format!("Failed to write credential entry {key}"))
    }

    /// Remove every listed entry. Absent entries are not an error; all
    /// keys are attempted even if one fails, and the first failure is
    /// the one reported.
    pub async fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let mut first_err = None;
        for key in keys.iter().copied() {
            match fs::remove_file(self.entry_path(key)).await {
                Ok(()) => debug!(key, "removed credential entry"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    if first_err.is_none() {
                        first_err = Some(anyhow::Error::new(e).context(format!(
                            "Failed to remove credential entry {key}"
                        )));
                    }
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (TempDir, CredentialStore) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = CredentialStore::new(dir.path().join("credentials"));
        (dir, store)
    }

    #[tokio::test]
    async fn test_set_then_get_roundtrip() {
        let (_dir, store) = test_store();
        store.set(KEY_TOKEN, "tok-123").await.expect("set failed");
        let value = store.get(KEY_TOKEN).await.expect("get failed");
        assert_eq!(value.as_deref(), Some("tok-123"));
    }

    #[tokio::test]
    async fn test_get_absent_key_is_none() {
        let (_dir, store) = test_store();
        let value = store.get(KEY_USER).await.expect("get failed");
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_set_overwrites_previous_value() {
        let (_dir, store) = test_store();
        store.set(KEY_TOKEN, "old").await.expect("set failed");
        store.set(KEY_TOKEN, "new").await.expect("set failed");
        let value = store.get(KEY_TOKEN).await.expect("get failed");
        assert_eq!(value.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_remove_many_clears_entries() {
        let (_dir, store) = test_store();
        store.set(KEY_TOKEN, "tok").await.expect("set failed");
        store.set(KEY_USER, "{}").await.expect("set failed");
        store
            .remove_many(&[KEY_TOKEN, KEY_USER])
            .await
            .expect("remove failed");
        assert_eq!(store.get(KEY_TOKEN).await.expect("get failed"), None);
        assert_eq!(store.get(KEY_USER).await.expect("get failed"), None);
    }

    #[tokio::test]
    async fn test_remove_many_ignores_absent_entries() {
        let (_dir, store) = test_store();
        store.set(KEY_TOKEN, "tok").await.expect("set failed");
        // KEY_USER was never written; removal must still succeed.
        store
            .remove_many(&[KEY_TOKEN, KEY_USER])
            .await
            .expect("remove failed");
        assert_eq!(store.get(KEY_TOKEN).await.expect("get failed"), None);
    }
}
