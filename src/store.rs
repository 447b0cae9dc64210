use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed store file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub character_name: String,
    #[serde(default)]
    pub protected_days: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tribe_name: Option<String>,
}

impl PlayerRecord {
    pub fn new(character_name: impl Into<String>) -> Self {
        Self {
            character_name: character_name.into(),
            protected_days: Vec::new(),
            tribe_name: None,
        }
    }

    pub fn is_protected(&self) -> bool {
        !self.protected_days.is_empty()
    }

    /// Tribe name when present, character name otherwise.
    pub fn display_name(&self) -> &str {
        self.tribe_name.as_deref().unwrap_or(&self.character_name)
    }
}

/// Location of the published roster message in one guild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterRef {
    pub channel_id: u64,
    pub message_id: u64,
}

#[derive(Debug, PartialEq, Eq)]
pub enum RegisterOutcome {
    Created,
    AlreadyRegistered,
}

struct StoreInner {
    players: BTreeMap<String, PlayerRecord>,
    roster_refs: BTreeMap<String, RosterRef>,
    last_cleared: Option<NaiveDate>,
    data_path: PathBuf,
    refs_path: PathBuf,
}

/// Player records plus per-guild roster message references, backed by two
/// JSON files that are rewritten wholesale after every mutation.
#[derive(Clone)]
pub struct PlayerStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl PlayerStore {
    pub fn open(
        data_path: impl AsRef<Path>,
        refs_path: impl AsRef<Path>,
    ) -> Result<Self, StoreError> {
        let data_path = data_path.as_ref().to_path_buf();
        let refs_path = refs_path.as_ref().to_path_buf();
        for path in [&data_path, &refs_path] {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                        path: parent.to_path_buf(),
                        source,
                    })?;
                }
            }
        }

        let players = load_json(&data_path)?;
        let roster_refs = load_json(&refs_path)?;

        Ok(Self {
            inner: Arc::new(Mutex::new(StoreInner {
                players,
                roster_refs,
                last_cleared: None,
                data_path,
                refs_path,
            })),
        })
    }

    // --- Player records ---

    pub fn register(
        &self,
        user_id: &str,
        character_name: &str,
    ) -> Result<RegisterOutcome, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.players.contains_key(user_id) {
            return Ok(RegisterOutcome::AlreadyRegistered);
        }
        inner
            .players
            .insert(user_id.to_string(), PlayerRecord::new(character_name));
        inner.persist_players()?;
        Ok(RegisterOutcome::Created)
    }

    pub fn get(&self, user_id: &str) -> Option<PlayerRecord> {
        self.inner.lock().unwrap().players.get(user_id).cloned()
    }

    /// Marks the user protected for exactly the given day. Returns false when
    /// the user is not registered.
    pub fn protect(&self, user_id: &str, day: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(record) = inner.players.get_mut(user_id) else {
            return Ok(false);
        };
        record.protected_days = vec![day.to_string()];
        inner.persist_players()?;
        Ok(true)
    }

    pub fn unprotect(&self, user_id: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(record) = inner.players.get_mut(user_id) else {
            return Ok(false);
        };
        record.protected_days.clear();
        inner.persist_players()?;
        Ok(true)
    }

    /// Removes the record entirely, returning it when it existed.
    pub fn unregister(&self, user_id: &str) -> Result<Option<PlayerRecord>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let removed = inner.players.remove(user_id);
        if removed.is_some() {
            inner.persist_players()?;
        }
        Ok(removed)
    }

    /// All records with a non-empty protection list, keyed by user id.
    pub fn protected_players(&self) -> Vec<(String, PlayerRecord)> {
        let inner = self.inner.lock().unwrap();
        inner
            .players
            .iter()
            .filter(|(_, record)| record.is_protected())
            .map(|(id, record)| (id.clone(), record.clone()))
            .collect()
    }

    /// Empties every protection list the first time it is called on a given
    /// UTC date. Later calls on the same date are no-ops.
    pub fn clear_protection_if_new_day(&self, today: NaiveDate) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.last_cleared == Some(today) {
            return Ok(false);
        }
        for record in inner.players.values_mut() {
            record.protected_days.clear();
        }
        inner.last_cleared = Some(today);
        inner.persist_players()?;
        Ok(true)
    }

    // --- Roster message references ---

    pub fn roster_ref(&self, guild_id: u64) -> Option<RosterRef> {
        self.inner
            .lock()
            .unwrap()
            .roster_refs
            .get(&guild_id.to_string())
            .copied()
    }

    pub fn set_roster_ref(&self, guild_id: u64, roster_ref: RosterRef) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.roster_refs.insert(guild_id.to_string(), roster_ref);
        inner.persist_refs()
    }
}

impl StoreInner {
    fn persist_players(&self) -> Result<(), StoreError> {
        write_json(&self.data_path, &self.players)?;
        debug!("Store: saved {} player record(s)", self.players.len());
        Ok(())
    }

    fn persist_refs(&self) -> Result<(), StoreError> {
        write_json(&self.refs_path, &self.roster_refs)
    }
}

/// Today's day name in UTC, e.g. "Monday".
pub fn current_day_name() -> String {
    Utc::now().format("%A").to_string()
}

fn load_json<T>(path: &Path) -> Result<T, StoreError>
where
    T: serde::de::DeserializeOwned + Default,
{
    if !path.exists() {
        return Ok(T::default());
    }
    let raw = fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| StoreError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let raw = serde_json::to_string_pretty(value).map_err(|source| StoreError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, raw).map_err(|source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("raidward-{}-{}", tag, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn scratch_store(tag: &str) -> PlayerStore {
        let dir = scratch_dir(tag);
        PlayerStore::open(dir.join("players.json"), dir.join("refs.json")).unwrap()
    }

    #[test]
    fn test_register_is_idempotent_per_user() {
        let store = scratch_store("register");

        assert_eq!(
            store.register("1", "Conan").unwrap(),
            RegisterOutcome::Created
        );
        assert_eq!(
            store.register("1", "Sonja").unwrap(),
            RegisterOutcome::AlreadyRegistered
        );

        // The first registration must survive the rejected attempt
        assert_eq!(store.get("1").unwrap().character_name, "Conan");
    }

    #[test]
    fn test_protect_then_unprotect_clears_days() {
        let store = scratch_store("protect");
        store.register("1", "Conan").unwrap();

        assert!(store.protect("1", "Monday").unwrap());
        assert_eq!(store.get("1").unwrap().protected_days, vec!["Monday"]);

        assert!(store.unprotect("1").unwrap());
        assert!(store.get("1").unwrap().protected_days.is_empty());
    }

    #[test]
    fn test_protect_requires_registration() {
        let store = scratch_store("unregistered");
        assert!(!store.protect("404", "Monday").unwrap());
        assert!(!store.unprotect("404").unwrap());
        assert!(store.unregister("404").unwrap().is_none());
    }

    #[test]
    fn test_daily_clear_runs_once_per_date() {
        let store = scratch_store("daily-clear");
        store.register("1", "Conan").unwrap();
        store.protect("1", "Monday").unwrap();

        let monday = NaiveDate::from_ymd_opt(2026, 8, 3).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2026, 8, 4).unwrap();

        assert!(store.clear_protection_if_new_day(monday).unwrap());
        assert!(store.get("1").unwrap().protected_days.is_empty());

        // Re-protecting on the same date must survive further checks that day
        store.protect("1", "Monday").unwrap();
        assert!(!store.clear_protection_if_new_day(monday).unwrap());
        assert!(!store.clear_protection_if_new_day(monday).unwrap());
        assert_eq!(store.get("1").unwrap().protected_days, vec!["Monday"]);

        // The next date clears again, exactly once
        assert!(store.clear_protection_if_new_day(tuesday).unwrap());
        assert!(store.get("1").unwrap().protected_days.is_empty());
        assert!(!store.clear_protection_if_new_day(tuesday).unwrap());
    }

    #[test]
    fn test_unregister_removes_record() {
        let store = scratch_store("unregister");
        store.register("1", "Conan").unwrap();
        store.protect("1", "Monday").unwrap();

        let removed = store.unregister("1").unwrap().unwrap();
        assert_eq!(removed.character_name, "Conan");
        assert!(store.get("1").is_none());
        assert!(store.protected_players().is_empty());
    }

    #[test]
    fn test_protected_players_filters_unprotected() {
        let store = scratch_store("filter");
        store.register("1", "Alpha").unwrap();
        store.register("2", "Bravo").unwrap();
        store.protect("1", "Monday").unwrap();

        let protected = store.protected_players();
        assert_eq!(protected.len(), 1);
        assert_eq!(protected[0].0, "1");
        assert_eq!(protected[0].1.character_name, "Alpha");
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = scratch_dir("reload");
        let data = dir.join("players.json");
        let refs = dir.join("refs.json");

        {
            let store = PlayerStore::open(&data, &refs).unwrap();
            store.register("1", "Conan").unwrap();
            store.protect("1", "Monday").unwrap();
            store
                .set_roster_ref(
                    99,
                    RosterRef {
                        channel_id: 10,
                        message_id: 20,
                    },
                )
                .unwrap();
        }

        let reopened = PlayerStore::open(&data, &refs).unwrap();
        let record = reopened.get("1").unwrap();
        assert_eq!(record.character_name, "Conan");
        assert_eq!(record.protected_days, vec!["Monday"]);
        assert_eq!(
            reopened.roster_ref(99),
            Some(RosterRef {
                channel_id: 10,
                message_id: 20,
            })
        );
        assert_eq!(reopened.roster_ref(100), None);
    }

    #[test]
    fn test_malformed_store_file_is_rejected() {
        let dir = scratch_dir("malformed");
        let data = dir.join("players.json");
        fs::write(&data, "not json {").unwrap();

        let result = PlayerStore::open(&data, dir.join("refs.json"));
        assert!(matches!(result, Err(StoreError::Malformed { .. })));
    }

    #[test]
    fn test_display_name_prefers_tribe() {
        let mut record = PlayerRecord::new("Conan");
        assert_eq!(record.display_name(), "Conan");
        record.tribe_name = Some("Cimmeria".to_string());
        assert_eq!(record.display_name(), "Cimmeria");
    }
}
