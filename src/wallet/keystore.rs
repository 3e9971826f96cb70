//! Custody of the sniper wallet secret key
//!
//! The public record lives in local storage; the secret lives only behind a
//! [`Keystore`]. The file keystore writes the Solana CLI byte-array format and
//! refuses to read files other users can access.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use solana_sdk::{
    hash::Hash,
    pubkey::Pubkey,
    signature::Keypair,
    signer::Signer,
    transaction::Transaction,
};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Holds secret keys and signs on their behalf
pub trait Keystore: Send + Sync {
    /// Take custody of a keypair
    fn store(&self, keypair: &Keypair) -> Result<()>;

    /// Sign `transaction` with the key for `owner`
    fn sign(&self, owner: &Pubkey, transaction: &mut Transaction, blockhash: Hash) -> Result<()>;

    fn contains(&self, owner: &Pubkey) -> bool;
}

/// Single-key keystore backed by a keypair file
pub struct FileKeystore {
    path: PathBuf,
    cached: Mutex<Option<Keypair>>,
}

impl FileKeystore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: Mutex::new(None),
        }
    }

    fn with_keypair<T>(&self, f: impl FnOnce(&Keypair) -> Result<T>) -> Result<T> {
        let mut cached = self.cached.lock().unwrap_or_else(|e| e.into_inner());
        if cached.is_none() {
            *cached = Some(read_keypair(&self.path)?);
        }
        match cached.as_ref() {
            Some(keypair) => f(keypair),
            None => Err(Error::InvalidKeypair("Keystore is empty".into())),
        }
    }

    /// Move an existing keypair file aside so a new key never destroys an old one
    fn backup_existing(&self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }

        let backup = self
            .path
            .with_extension(format!("{}.bak", Utc::now().format("%Y%m%d%H%M%S")));
        std::fs::rename(&self.path, &backup)?;
        warn!(
            "Existing keystore moved to {} before storing a new key",
            backup.display()
        );
        Ok(())
    }
}

impl Keystore for FileKeystore {
    fn store(&self, keypair: &Keypair) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.backup_existing()?;

        let json = serde_json::to_string(&keypair.to_bytes().to_vec())?;
        std::fs::write(&self.path, json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        *self.cached.lock().unwrap_or_else(|e| e.into_inner()) = Some(keypair.insecure_clone());

        info!(
            "Stored sniper keypair {} in {}",
            keypair.pubkey(),
            self.path.display()
        );
        Ok(())
    }

    fn sign(&self, owner: &Pubkey, transaction: &mut Transaction, blockhash: Hash) -> Result<()> {
        self.with_keypair(|keypair| {
            if keypair.pubkey() != *owner {
                return Err(Error::Signing(format!(
                    "Keystore does not hold the key for {}",
                    owner
                )));
            }
            transaction
                .try_sign(&[keypair], blockhash)
                .map_err(|e| Error::Signing(e.to_string()))
        })
    }

    fn contains(&self, owner: &Pubkey) -> bool {
        self.with_keypair(|keypair| Ok(keypair.pubkey() == *owner))
            .unwrap_or(false)
    }
}

/// Keystore that never touches disk
#[derive(Default)]
pub struct MemoryKeystore {
    keys: Mutex<HashMap<Pubkey, Keypair>>,
}

impl MemoryKeystore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Keystore for MemoryKeystore {
    fn store(&self, keypair: &Keypair) -> Result<()> {
        let mut keys = self.keys.lock().unwrap_or_else(|e| e.into_inner());
        keys.insert(keypair.pubkey(), keypair.insecure_clone());
        Ok(())
    }

    fn sign(&self, owner: &Pubkey, transaction: &mut Transaction, blockhash: Hash) -> Result<()> {
        let keys = self.keys.lock().unwrap_or_else(|e| e.into_inner());
        let keypair = keys
            .get(owner)
            .ok_or_else(|| Error::Signing(format!("No key held for {}", owner)))?;
        transaction
            .try_sign(&[keypair], blockhash)
            .map_err(|e| Error::Signing(e.to_string()))
    }

    fn contains(&self, owner: &Pubkey) -> bool {
        self.keys
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(owner)
    }
}

/// Read a Solana CLI keypair file, rejecting group/world-readable files
pub fn read_keypair(path: &Path) -> Result<Keypair> {
    debug!("Loading keypair from: {:?}", path);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(metadata) = std::fs::metadata(path) {
            let mode = metadata.permissions().mode();
            if mode & 0o077 != 0 {
                return Err(Error::InsecureKeypair(format!(
                    "Keypair {} has insecure permissions {:o}. Run 'chmod 600 {}'",
                    path.display(),
                    mode & 0o777,
                    path.display()
                )));
            }
        }
    }

    let keypair_bytes = std::fs::read(path).map_err(|e| {
        Error::InvalidKeypair(format!("Failed to read {}: {}", path.display(), e))
    })?;

    let keypair_json: Vec<u8> = serde_json::from_slice(&keypair_bytes).map_err(|e| {
        Error::InvalidKeypair(format!("Failed to parse {}: {}", path.display(), e))
    })?;

    Keypair::from_bytes(&keypair_json)
        .map_err(|e| Error::InvalidKeypair(format!("Invalid keypair bytes: {}", e)))
}
