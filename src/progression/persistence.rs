//! Storage for `PlayerProgress`.
//!
//! The on-disk format is checksummed binary:
//! - Version magic (8 bytes)
//! - Data length (4 bytes)
//! - bincode-serialized progress (variable length)
//! - SHA256 checksum over all of the above (32 bytes)

use super::types::PlayerProgress;
use crate::core::constants::SAVE_VERSION_MAGIC;
use directories::ProjectDirs;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save file I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("progress could not be encoded: {0}")]
    Encode(#[from] bincode::Error),
    #[error("save file is corrupt: {0}")]
    Corrupt(String),
    #[error("invalid save version: expected 0x{expected:016X}, got 0x{found:016X}")]
    VersionMismatch { expected: u64, found: u64 },
}

/// Where the progression ledger keeps its record between sessions.
pub trait ProgressStore {
    /// Returns `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<PlayerProgress>, SaveError>;
    fn save(&mut self, progress: &PlayerProgress) -> Result<(), SaveError>;
}

/// Checksummed save file in the platform config directory.
pub struct FileProgressStore {
    save_path: PathBuf,
}

impl FileProgressStore {
    /// Uses `<config dir>/skirmish/progress.dat`, creating the directory if needed.
    pub fn new() -> Result<Self, SaveError> {
        let project_dirs = ProjectDirs::from("", "", "skirmish").ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "Could not determine config directory",
            )
        })?;

        let config_dir = project_dirs.config_dir();
        fs::create_dir_all(config_dir)?;

        Ok(Self {
            save_path: config_dir.join("progress.dat"),
        })
    }

    pub fn with_path(save_path: impl Into<PathBuf>) -> Self {
        Self {
            save_path: save_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.save_path
    }

    pub fn save_exists(&self) -> bool {
        self.save_path.exists()
    }
}

impl ProgressStore for FileProgressStore {
    fn load(&self) -> Result<Option<PlayerProgress>, SaveError> {
        let mut file = match fs::File::open(&self.save_path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut version_bytes = [0u8; 8];
        file.read_exact(&mut version_bytes)?;
        let version = u64::from_le_bytes(version_bytes);
        if version != SAVE_VERSION_MAGIC {
            return Err(SaveError::VersionMismatch {
                expected: SAVE_VERSION_MAGIC,
                found: version,
            });
        }

        let mut length_bytes = [0u8; 4];
        file.read_exact(&mut length_bytes)?;
        let data_len = u32::from_le_bytes(length_bytes) as u64;

        let file_len = file.metadata()?.len();
        if data_len + 8 + 4 + 32 != file_len {
            return Err(SaveError::Corrupt(format!(
                "length field {} does not match file size {}",
                data_len, file_len
            )));
        }

        let mut data = vec![0u8; data_len as usize];
        file.read_exact(&mut data)?;

        let mut stored_checksum = [0u8; 32];
        file.read_exact(&mut stored_checksum)?;

        let mut hasher = Sha256::new();
        hasher.update(version_bytes);
        hasher.update(length_bytes);
        hasher.update(&data);
        let computed_checksum = hasher.finalize();

        if stored_checksum != computed_checksum.as_slice() {
            return Err(SaveError::Corrupt(
                "checksum verification failed".to_string(),
            ));
        }

        Ok(Some(bincode::deserialize(&data)?))
    }

    fn save(&mut self, progress: &PlayerProgress) -> Result<(), SaveError> {
        let data = bincode::serialize(progress)?;
        let data_len = u32::try_from(data.len())
            .map_err(|_| SaveError::Corrupt("progress record too large".to_string()))?;

        let mut hasher = Sha256::new();
        hasher.update(SAVE_VERSION_MAGIC.to_le_bytes());
        hasher.update(data_len.to_le_bytes());
        hasher.update(&data);
        let checksum = hasher.finalize();

        let mut file = fs::File::create(&self.save_path)?;
        file.write_all(&SAVE_VERSION_MAGIC.to_le_bytes())?;
        file.write_all(&data_len.to_le_bytes())?;
        file.write_all(&data)?;
        file.write_all(&checksum)?;

        Ok(())
    }
}

/// In-process store. Keeps the last saved record and a save counter.
#[derive(Debug, Clone, Default)]
pub struct MemoryProgressStore {
    saved: Option<PlayerProgress>,
    save_count: usize,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_progress(progress: PlayerProgress) -> Self {
        Self {
            saved: Some(progress),
            save_count: 0,
        }
    }

    pub fn save_count(&self) -> usize {
        self.save_count
    }
}

impl ProgressStore for MemoryProgressStore {
    fn load(&self) -> Result<Option<PlayerProgress>, SaveError> {
        Ok(self.saved.clone())
    }

    fn save(&mut self, progress: &PlayerProgress) -> Result<(), SaveError> {
        self.saved = Some(progress.clone());
        self.save_count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::GearSlot;
    use crate::progression::types::{Loadout, MetaUpgrade, MetaUpgradeType, RunStats};

    fn temp_store() -> FileProgressStore {
        let name = format!("skirmish-test-{}.dat", uuid::Uuid::new_v4());
        FileProgressStore::with_path(std::env::temp_dir().join(name))
    }

    fn sample_progress() -> PlayerProgress {
        let mut progress = PlayerProgress::new(
            [MetaUpgrade {
                id: "damage_boost".to_string(),
                name: "Damage Boost".to_string(),
                upgrade_type: MetaUpgradeType::Damage,
                value: 0.05,
                cost: 150,
                level: 1,
                max_level: 10,
            }],
            ["fireball".to_string()],
        );
        progress.total_runs = 3;
        progress.resources = 420;
        let mut best = RunStats::new("best".to_string(), 1_700_000_000, 1.2);
        best.experience_gained = 90;
        progress.best_run = Some(best);
        progress.loadout = Some(Loadout {
            skills: vec![Some("fireball".to_string()), None],
            passives: vec![None, Some("fury".to_string())],
            gear: vec![(GearSlot::Head, Some("warrior_helm".to_string()))],
            passive_levels: [("fury".to_string(), 2)].into_iter().collect(),
        });
        progress
    }

    #[test]
    fn test_file_store_round_trip() {
        let mut store = temp_store();
        let progress = sample_progress();

        store.save(&progress).expect("save should succeed");
        assert!(store.save_exists());

        let loaded = store.load().expect("load should succeed");
        assert_eq!(loaded, Some(progress));

        fs::remove_file(store.path()).ok();
    }

    #[test]
    fn test_load_missing_is_none() {
        let store = temp_store();
        assert!(!store.save_exists());
        assert!(store.load().expect("missing file is not an error").is_none());
    }

    #[test]
    fn test_tampered_payload_fails_checksum() {
        let mut store = temp_store();
        store.save(&sample_progress()).unwrap();

        let mut bytes = fs::read(store.path()).unwrap();
        bytes[14] ^= 0xFF;
        fs::write(store.path(), &bytes).unwrap();

        assert!(matches!(store.load(), Err(SaveError::Corrupt(_))));
        fs::remove_file(store.path()).ok();
    }

    #[test]
    fn test_wrong_magic_is_version_mismatch() {
        let mut store = temp_store();
        store.save(&sample_progress()).unwrap();

        let mut bytes = fs::read(store.path()).unwrap();
        bytes[0] ^= 0x01;
        fs::write(store.path(), &bytes).unwrap();

        assert!(matches!(
            store.load(),
            Err(SaveError::VersionMismatch { .. })
        ));
        fs::remove_file(store.path()).ok();
    }

    #[test]
    fn test_truncated_file_is_corrupt() {
        let mut store = temp_store();
        store.save(&sample_progress()).unwrap();

        let bytes = fs::read(store.path()).unwrap();
        fs::write(store.path(), &bytes[..bytes.len() - 5]).unwrap();

        assert!(matches!(store.load(), Err(SaveError::Corrupt(_))));
        fs::remove_file(store.path()).ok();
    }

    #[test]
    fn test_memory_store_counts_saves() {
        let mut store = MemoryProgressStore::new();
        assert!(store.load().unwrap().is_none());
        store.save(&sample_progress()).unwrap();
        store.save(&sample_progress()).unwrap();
        assert_eq!(store.save_count(), 2);
        assert_eq!(store.load().unwrap(), Some(sample_progress()));
    }
}
