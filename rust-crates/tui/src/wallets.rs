use crate::errors::{
    ClientError,
    ClientResult,
};
use color_eyre::eyre::{
    Result,
    WrapErr,
    eyre,
};
use eth_keystore::decrypt_key;
use fuels::{
    crypto::SecretKey,
    prelude::{
        derivation::DEFAULT_DERIVATION_PATH,
        private_key::PrivateKeySigner,
    },
};
use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
    time::SystemTime,
};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WalletDescriptor {
    pub name: String,
    pub path: PathBuf,
}

impl WalletDescriptor {
    pub fn new(name: impl Into<String>, path: PathBuf) -> Self {
        Self {
            name: name.into(),
            path,
        }
    }

    /// Modification time of the keystore file, `None` once it is gone.
    pub fn stamp(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).and_then(|m| m.modified()).ok()
    }
}

pub fn default_wallet_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").wrap_err("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".fuel").join("wallets"))
}

pub fn resolve_wallet_dir(dir: Option<&str>) -> Result<PathBuf> {
    match dir {
        Some(raw) => {
            let expanded = shellexpand::tilde(raw);
            Ok(PathBuf::from(expanded.into_owned()))
        }
        None => default_wallet_dir(),
    }
}

pub fn list_wallets(dir: &Path) -> Result<Vec<WalletDescriptor>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut wallets = Vec::new();
    for entry in fs::read_dir(dir).wrap_err("Failed to read wallet directory")? {
        let entry = entry.wrap_err("Failed to read wallet entry")?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|ext| ext.to_str()) != Some("wallet") {
            continue;
        }
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| eyre!("Invalid wallet filename {:?}", path))?
            .to_owned();
        wallets.push(WalletDescriptor::new(name, path));
    }
    wallets.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(wallets)
}

/// Picks the named wallet, or the first one alphabetically when no name is
/// given. `None` means there is nothing to connect with.
pub fn discover_wallet(
    dir: &Path,
    name: Option<&str>,
) -> Result<Option<WalletDescriptor>> {
    let wallets = list_wallets(dir)?;
    let found = match name {
        Some(name) => wallets.into_iter().find(|w| w.name == name),
        None => wallets.into_iter().next(),
    };
    Ok(found)
}

pub fn unlock_signer(
    descriptor: &WalletDescriptor,
    password: &str,
) -> ClientResult<PrivateKeySigner> {
    if !descriptor.path.exists() {
        let dir = descriptor
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        return Err(ClientError::WalletMissing { dir });
    }

    let secret = decrypt_key(&descriptor.path, password.as_bytes()).map_err(|_| {
        ClientError::failure(format!("Invalid password for wallet '{}'", descriptor.name))
    })?;

    if let Ok(secret_key) = SecretKey::try_from(secret.as_slice()) {
        return Ok(PrivateKeySigner::new(secret_key));
    }

    if let Ok(mnemonic) = std::str::from_utf8(&secret) {
        let word_count = mnemonic.split_whitespace().count();
        if word_count >= 12 {
            let private_key = SecretKey::new_from_mnemonic_phrase_with_path(
                mnemonic,
                DEFAULT_DERIVATION_PATH,
            )
            .map_err(|e| {
                ClientError::failure(format!(
                    "Wallet '{}' holds an unusable mnemonic: {e:?}",
                    descriptor.name
                ))
            })?;
            return Ok(PrivateKeySigner::new(private_key));
        }
    }

    Err(ClientError::failure(format!(
        "Wallet '{}' contained unsupported key material",
        descriptor.name
    )))
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use tempdir::TempDir;

    fn touch(dir: &Path, file: &str) {
        fs::write(dir.join(file), b"{}").unwrap();
    }

    #[test]
    fn list_wallets__returns_only_wallet_files_sorted_by_name() {
        // given
        let tmp = TempDir::new("rps-wallets").unwrap();
        touch(tmp.path(), "zed.wallet");
        touch(tmp.path(), "alice.wallet");
        touch(tmp.path(), "notes.txt");
        fs::create_dir(tmp.path().join("nested.wallet")).unwrap();

        // when
        let wallets = list_wallets(tmp.path()).unwrap();

        // then
        let names: Vec<&str> = wallets.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["alice", "zed"]);
    }

    #[test]
    fn list_wallets__missing_directory_is_empty() {
        let tmp = TempDir::new("rps-wallets").unwrap();
        let wallets = list_wallets(&tmp.path().join("absent")).unwrap();
        assert!(wallets.is_empty());
    }

    #[test]
    fn discover_wallet__selects_named_or_first_wallet() {
        // given
        let tmp = TempDir::new("rps-wallets").unwrap();
        touch(tmp.path(), "bob.wallet");
        touch(tmp.path(), "alice.wallet");

        // when
        let named = discover_wallet(tmp.path(), Some("bob")).unwrap();
        let first = discover_wallet(tmp.path(), None).unwrap();
        let unknown = discover_wallet(tmp.path(), Some("carol")).unwrap();

        // then
        assert_eq!(named.map(|w| w.name), Some("bob".to_string()));
        assert_eq!(first.map(|w| w.name), Some("alice".to_string()));
        assert!(unknown.is_none());
    }

    #[test]
    fn unlock_signer__removed_keystore_reports_missing_wallet() {
        // given
        let tmp = TempDir::new("rps-wallets").unwrap();
        let descriptor =
            WalletDescriptor::new("ghost", tmp.path().join("ghost.wallet"));

        // when
        let err = unlock_signer(&descriptor, "pw").unwrap_err();

        // then
        assert_eq!(
            err,
            ClientError::WalletMissing {
                dir: tmp.path().to_path_buf()
            }
        );
    }

    #[test]
    fn unlock_signer__garbage_keystore_is_a_generic_failure() {
        // given
        let tmp = TempDir::new("rps-wallets").unwrap();
        touch(tmp.path(), "broken.wallet");
        let descriptor =
            WalletDescriptor::new("broken", tmp.path().join("broken.wallet"));

        // when
        let err = unlock_signer(&descriptor, "pw").unwrap_err();

        // then
        assert_ne!(err, ClientError::Declined);
        assert_eq!(
            err.clearest_message().as_deref(),
            Some("Invalid password for wallet 'broken'")
        );
    }

    #[test]
    fn stamp__tracks_file_presence() {
        let tmp = TempDir::new("rps-wallets").unwrap();
        let descriptor =
            WalletDescriptor::new("alice", tmp.path().join("alice.wallet"));
        assert!(descriptor.stamp().is_none());
        touch(tmp.path(), "alice.wallet");
        assert!(descriptor.stamp().is_some());
    }
}
