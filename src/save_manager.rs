use crate::core::constants::{SAVE_FILE_NAME, SAVE_FORMAT_VERSION, SAVE_VERSION_MAGIC};
use crate::core::error::{GameError, GameResult};
use crate::core::game_state::{Player, Progression};
use crate::map::types::MapSnapshot;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Everything persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    pub version: u32,
    /// Identifies one playthrough across saves
    pub run_id: Uuid,
    /// Unix timestamp (seconds)
    pub saved_at: i64,
    pub player: Player,
    pub progression: Progression,
    /// Node statuses of the world being played
    pub map: Option<MapSnapshot>,
}

impl SaveData {
    pub fn new(
        run_id: Uuid,
        player: Player,
        progression: Progression,
        map: Option<MapSnapshot>,
    ) -> Self {
        Self {
            version: SAVE_FORMAT_VERSION,
            run_id,
            saved_at: chrono::Utc::now().timestamp(),
            player,
            progression,
            map,
        }
    }
}

/// Manages saving and loading with a checksummed binary format
#[derive(Debug, Clone)]
pub struct SaveManager {
    save_path: PathBuf,
}

impl SaveManager {
    /// Creates a SaveManager in the platform config directory.
    pub fn new() -> GameResult<Self> {
        let project_dirs =
            ProjectDirs::from("", "", "knight-quiz").ok_or(GameError::NoSaveDirectory)?;
        Self::with_dir(project_dirs.config_dir())
    }

    /// Creates a SaveManager that keeps its file in `dir`.
    pub fn with_dir(dir: impl AsRef<Path>) -> GameResult<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        Ok(Self {
            save_path: dir.join(SAVE_FILE_NAME),
        })
    }

    /// Uses `save_dir` when given, the platform directory otherwise.
    pub fn from_override(save_dir: Option<&Path>) -> GameResult<Self> {
        match save_dir {
            Some(dir) => Self::with_dir(dir),
            None => Self::new(),
        }
    }

    pub fn save_path(&self) -> &Path {
        &self.save_path
    }

    /// Directory holding the save file
    pub fn dir(&self) -> &Path {
        self.save_path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Saves to disk with checksum verification
    ///
    /// File format:
    /// - Version magic (8 bytes)
    /// - Data length (4 bytes)
    /// - Serialized save data (variable length)
    /// - SHA256 checksum (32 bytes)
    pub fn save(&self, data: &SaveData) -> GameResult<()> {
        let payload = bincode::serialize(data)?;
        let data_len = payload.len() as u32;

        let mut hasher = Sha256::new();
        hasher.update(SAVE_VERSION_MAGIC.to_le_bytes());
        hasher.update(data_len.to_le_bytes());
        hasher.update(&payload);
        let checksum = hasher.finalize();

        let mut file = fs::File::create(&self.save_path)?;
        file.write_all(&SAVE_VERSION_MAGIC.to_le_bytes())?;
        file.write_all(&data_len.to_le_bytes())?;
        file.write_all(&payload)?;
        file.write_all(&checksum)?;

        tracing::debug!("Saved run {} to {}", data.run_id, self.save_path.display());
        Ok(())
    }

    /// Loads save data from disk with checksum verification
    ///
    /// Returns an error if:
    /// - The file doesn't exist
    /// - The version magic or format version is wrong
    /// - The checksum verification fails
    /// - The data cannot be deserialized
    pub fn load(&self) -> GameResult<SaveData> {
        let mut file = fs::File::open(&self.save_path)?;

        let mut version_bytes = [0u8; 8];
        file.read_exact(&mut version_bytes)?;
        let version = u64::from_le_bytes(version_bytes);

        if version != SAVE_VERSION_MAGIC {
            return Err(GameError::InvalidSaveVersion {
                expected: SAVE_VERSION_MAGIC,
                found: version,
            });
        }

        let mut length_bytes = [0u8; 4];
        file.read_exact(&mut length_bytes)?;
        let data_len = u32::from_le_bytes(length_bytes);

        let mut payload = vec![0u8; data_len as usize];
        file.read_exact(&mut payload)?;

        let mut stored_checksum = [0u8; 32];
        file.read_exact(&mut stored_checksum)?;

        let mut hasher = Sha256::new();
        hasher.update(version_bytes);
        hasher.update(length_bytes);
        hasher.update(&payload);
        let computed_checksum = hasher.finalize();

        if stored_checksum != computed_checksum.as_slice() {
            return Err(GameError::ChecksumMismatch);
        }

        let data: SaveData = bincode::deserialize(&payload)?;
        if data.version != SAVE_FORMAT_VERSION {
            return Err(GameError::InvalidSaveVersion {
                expected: SAVE_FORMAT_VERSION as u64,
                found: data.version as u64,
            });
        }

        Ok(data)
    }

    /// Checks if a save file exists
    pub fn save_exists(&self) -> bool {
        self.save_path.exists()
    }

    /// Deletes the save file, if any.
    pub fn clear(&self) -> GameResult<()> {
        if self.save_exists() {
            fs::remove_file(&self.save_path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::types::{Item, NodeStatus};
    use std::collections::BTreeMap;

    fn temp_manager() -> SaveManager {
        let dir = std::env::temp_dir().join(format!("knight-quiz-test-{}", Uuid::new_v4()));
        SaveManager::with_dir(dir).expect("Failed to create SaveManager")
    }

    fn sample_data() -> SaveData {
        let mut player = Player::new();
        player.take_damage(1);
        player.add_item(Item::small_potion());
        player.move_to(1);
        player.unlocked_lessons.insert("java_basics".to_string());

        let mut progression = Progression {
            current_world_id: "world_1".to_string(),
            ..Progression::default()
        };
        progression.unlock_world("world_1");
        progression.record_stage(1);

        let mut statuses = BTreeMap::new();
        statuses.insert(0, NodeStatus::Completed);
        statuses.insert(1, NodeStatus::Completed);
        statuses.insert(2, NodeStatus::Available);

        SaveData::new(
            Uuid::new_v4(),
            player,
            progression,
            Some(MapSnapshot {
                world_id: "world_1".to_string(),
                statuses,
            }),
        )
    }

    #[test]
    fn test_save_and_load() {
        let manager = temp_manager();
        let original = sample_data();

        manager.save(&original).expect("Failed to save");
        assert!(manager.save_exists());

        let loaded = manager.load().expect("Failed to load");
        assert_eq!(loaded, original);

        manager.clear().expect("Failed to clear");
        assert!(!manager.save_exists());
    }

    #[test]
    fn test_load_nonexistent() {
        let manager = temp_manager();
        let result = manager.load();
        assert!(matches!(result, Err(GameError::Io(ref e)) if e.kind() == std::io::ErrorKind::NotFound));
    }

    #[test]
    fn test_clear_without_file_is_ok() {
        assert!(temp_manager().clear().is_ok());
    }

    #[test]
    fn test_corrupted_payload_fails_checksum() {
        let manager = temp_manager();
        manager.save(&sample_data()).unwrap();

        let mut bytes = fs::read(manager.save_path()).unwrap();
        bytes[14] ^= 0xFF;
        fs::write(manager.save_path(), bytes).unwrap();

        assert!(matches!(manager.load(), Err(GameError::ChecksumMismatch)));
        manager.clear().unwrap();
    }

    #[test]
    fn test_wrong_magic_is_rejected() {
        let manager = temp_manager();
        manager.save(&sample_data()).unwrap();

        let mut bytes = fs::read(manager.save_path()).unwrap();
        bytes[0] ^= 0x01;
        fs::write(manager.save_path(), bytes).unwrap();

        assert!(matches!(
            manager.load(),
            Err(GameError::InvalidSaveVersion { .. })
        ));
        manager.clear().unwrap();
    }

    #[test]
    fn test_truncated_file_fails() {
        let manager = temp_manager();
        manager.save(&sample_data()).unwrap();

        let bytes = fs::read(manager.save_path()).unwrap();
        fs::write(manager.save_path(), &bytes[..bytes.len() - 10]).unwrap();

        assert!(manager.load().is_err());
        manager.clear().unwrap();
    }
}
