//! Factory persistence layer
//!
//! Provides save/load functionality for the wallet factory state:
//! every deployed wallet, its ledger and event journal, and the
//! deployment records.

use crate::factory::WalletFactory;
use std::fs;
use std::io::{self, BufReader, BufWriter};
use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: std::path::PathBuf,
    pub factory_file: String,
    pub backup_enabled: bool,
    pub max_backups: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: std::path::PathBuf::from(".crawlpay_data"),
            factory_file: "factory.json".to_string(),
            backup_enabled: true,
            max_backups: 5,
        }
    }
}

/// Factory storage manager
pub struct Storage {
    config: StorageConfig,
}

impl Storage {
    /// Create a new storage manager
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(&config.data_dir)?;
        Ok(Self { config })
    }

    /// Create with default configuration
    pub fn with_defaults() -> Result<Self, StorageError> {
        Self::new(StorageConfig::default())
    }

    /// Get the factory file path
    fn factory_path(&self) -> std::path::PathBuf {
        self.config.data_dir.join(&self.config.factory_file)
    }

    /// Get a backup file path
    fn backup_path(&self, index: usize) -> std::path::PathBuf {
        self.config
            .data_dir
            .join(format!("{}.backup.{}", self.config.factory_file, index))
    }

    /// Save the factory state to disk
    pub fn save(&self, factory: &WalletFactory) -> Result<(), StorageError> {
        let path = self.factory_path();

        // Create backup if enabled
        if self.config.backup_enabled && path.exists() {
            self.rotate_backups()?;
            fs::copy(&path, self.backup_path(0))?;
        }

        // Write to temporary file first
        let temp_path = self.config.data_dir.join("factory.tmp");
        let file = fs::File::create(&temp_path)?;
        let writer = BufWriter::new(file);

        serde_json::to_writer_pretty(writer, factory)?;

        // Atomic rename
        fs::rename(&temp_path, &path)?;

        Ok(())
    }

    /// Load the factory state from disk
    pub fn load(&self) -> Result<WalletFactory, StorageError> {
        let path = self.factory_path();

        if !path.exists() {
            return Err(StorageError::InvalidData(
                "Factory file not found".to_string(),
            ));
        }

        let file = fs::File::open(&path)?;
        let reader = BufReader::new(file);

        let factory: WalletFactory = serde_json::from_reader(reader)?;
        Ok(factory)
    }

    /// Check if a saved factory exists
    pub fn exists(&self) -> bool {
        self.factory_path().exists()
    }

    /// Delete the saved factory state
    pub fn delete(&self) -> Result<(), StorageError> {
        let path = self.factory_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Rotate backup files
    fn rotate_backups(&self) -> Result<(), StorageError> {
        // Delete oldest backup
        let oldest = self.backup_path(self.config.max_backups - 1);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }

        // Shift existing backups
        for i in (0..self.config.max_backups - 1).rev() {
            let current = self.backup_path(i);
            if current.exists() {
                let next = self.backup_path(i + 1);
                fs::rename(&current, &next)?;
            }
        }

        Ok(())
    }

    /// Restore from a backup
    pub fn restore_backup(&self, backup_index: usize) -> Result<WalletFactory, StorageError> {
        let path = self.backup_path(backup_index);

        if !path.exists() {
            return Err(StorageError::InvalidData(format!(
                "Backup {} not found",
                backup_index
            )));
        }

        let file = fs::File::open(&path)?;
        let reader = BufReader::new(file);

        let factory: WalletFactory = serde_json::from_reader(reader)?;
        Ok(factory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::{CallOutcome, CallTarget, OwnerSpec};
    use tempfile::TempDir;

    struct Accepting;
    impl CallTarget for Accepting {
        fn call(&mut self, _to: &str, _value: u64, _payload: &[u8]) -> CallOutcome {
            CallOutcome::ok(Vec::new())
        }
    }

    fn storage_in(dir: &TempDir) -> Storage {
        Storage::new(StorageConfig {
            data_dir: dir.path().to_path_buf(),
            ..Default::default()
        })
        .unwrap()
    }

    fn populated_factory() -> WalletFactory {
        let mut factory = WalletFactory::new();
        let owners = vec![
            OwnerSpec::new("alice"),
            OwnerSpec::new("bob"),
            OwnerSpec::new("carol"),
        ];
        let address = factory.deploy(&owners, 2, "salt", 0, vec![]).unwrap();

        let mut target = Accepting;
        let wallet = factory.wallet_mut(&address).unwrap();
        let id = wallet
            .submit("alice", "payee", 10, vec![], "settlement", false, &mut target)
            .unwrap();
        wallet.confirm("bob", id, &mut target).unwrap();
        factory
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);

        let factory = populated_factory();
        let address = factory.list_deployed()[0].to_string();
        storage.save(&factory).unwrap();
        assert!(storage.exists());

        let loaded = storage.load().unwrap();
        assert_eq!(loaded.wallet_count(), 1);
        assert!(loaded.verify(&address));

        let wallet = loaded.wallet(&address).unwrap();
        assert_eq!(wallet.get_owners(), vec!["alice", "bob", "carol"]);
        assert_eq!(wallet.transaction_count(), 1);
        assert!(wallet.get_transaction(0).unwrap().executed);
        assert_eq!(wallet.events().len(), 4);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);
        assert!(!storage.exists());
        assert!(matches!(storage.load(), Err(StorageError::InvalidData(_))));
    }

    #[test]
    fn test_backup_rotation_and_restore() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);

        let empty = WalletFactory::new();
        storage.save(&empty).unwrap();

        let populated = populated_factory();
        storage.save(&populated).unwrap();

        // The first save is now backup 0
        let restored = storage.restore_backup(0).unwrap();
        assert_eq!(restored.wallet_count(), 0);

        let current = storage.load().unwrap();
        assert_eq!(current.wallet_count(), 1);
    }

    #[test]
    fn test_delete() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);
        storage.save(&WalletFactory::new()).unwrap();
        storage.delete().unwrap();
        assert!(!storage.exists());
    }
}
