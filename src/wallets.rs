use crate::{
    account::Account,
    authorizations::{
        AuthorizationRecord,
        AuthorizationStore,
    },
    error::WalletError,
};
use async_trait::async_trait;
use color_eyre::eyre::{
    Result,
    WrapErr,
    eyre,
};
use eth_keystore::decrypt_key;
use fuels::{
    crypto::{
        PublicKey,
        SecretKey,
    },
    prelude::derivation::DEFAULT_DERIVATION_PATH,
    types::Address,
};
use rpassword::prompt_password;
use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
    sync::Arc,
};
use tracing::{
    debug,
    info,
    warn,
};

/// Source of authorized accounts. Implementations must return the same
/// answer for repeated calls while the underlying wallet is unchanged.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Accounts already authorized for this game. Never prompts.
    async fn discover_accounts(&self) -> Result<Vec<Account>, WalletError>;

    /// Asks the user to authorize an account.
    async fn request_connection(&self) -> Result<Account, WalletError>;
}

#[derive(Clone, Debug)]
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
}

pub fn default_wallet_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").wrap_err("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".fuel").join("wallets"))
}

pub fn resolve_wallet_dir(dir: Option<&str>) -> Result<PathBuf> {
    match dir {
        Some(raw) => Ok(expand_path(raw)),
        None => default_wallet_dir(),
    }
}

pub fn expand_path(raw: &str) -> PathBuf {
    let expanded = shellexpand::tilde(raw);
    PathBuf::from(expanded.into_owned())
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

/// Decrypts a keystore and returns the secret key it holds. Accepts raw
/// 32-byte keys and mnemonic phrases.
pub fn unlock_secret(descriptor: &WalletDescriptor, password: &str) -> Result<SecretKey> {
    let secret = decrypt_key(&descriptor.path, password.as_bytes())
        .map_err(|_| eyre!("Invalid password for wallet '{}'", descriptor.name))?;

    if let Ok(secret_key) = SecretKey::try_from(secret.as_slice()) {
        return Ok(secret_key);
    }

    if let Ok(mnemonic) = std::str::from_utf8(&secret) {
        let word_count = mnemonic.split_whitespace().count();
        if word_count >= 12 {
            let secret_key = SecretKey::new_from_mnemonic_phrase_with_path(
                mnemonic,
                DEFAULT_DERIVATION_PATH,
            )?;
            return Ok(secret_key);
        }
    }

    Err(eyre!(
        "Wallet '{}' contained unsupported key material",
        descriptor.name
    ))
}

pub fn address_of(secret: &SecretKey) -> Address {
    let public = PublicKey::from(secret);
    Address::from(*public.hash())
}

/// Reads a password for the named wallet. The terminal UI swaps in a prompt
/// that suspends the alternate screen first.
pub trait PasswordPrompt: Send + Sync {
    fn prompt(&self, wallet: &str) -> std::io::Result<String>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TerminalPrompt;

impl PasswordPrompt for TerminalPrompt {
    fn prompt(&self, wallet: &str) -> std::io::Result<String> {
        prompt_password(format!("Enter password for wallet '{wallet}': "))
    }
}

/// forc-wallet keystore directory acting as the player's wallet.
#[derive(Clone)]
pub struct KeystoreWallet {
    dir: PathBuf,
    preferred: Option<String>,
    store: AuthorizationStore,
    prompt: Arc<dyn PasswordPrompt>,
}

impl KeystoreWallet {
    pub fn new(
        dir: PathBuf,
        preferred: Option<String>,
        store: AuthorizationStore,
        prompt: Arc<dyn PasswordPrompt>,
    ) -> Self {
        Self {
            dir,
            preferred,
            store,
            prompt,
        }
    }

    fn installed(&self) -> Result<Vec<WalletDescriptor>, WalletError> {
        let wallets = list_wallets(&self.dir).map_err(|err| {
            warn!(error = %err, dir = %self.dir.display(), "unable to read wallet directory");
            WalletError::Unavailable
        })?;
        if wallets.is_empty() {
            return Err(WalletError::Unavailable);
        }
        Ok(wallets)
    }

    fn choose(&self, wallets: Vec<WalletDescriptor>) -> Result<WalletDescriptor, WalletError> {
        match self.preferred.as_deref() {
            Some(name) => wallets.into_iter().find(|w| w.name == name).ok_or_else(|| {
                WalletError::rejected(format!(
                    "wallet '{name}' not found in {}",
                    self.dir.display()
                ))
            }),
            None => wallets.into_iter().next().ok_or(WalletError::Unavailable),
        }
    }
}

#[async_trait]
impl WalletProvider for KeystoreWallet {
    async fn discover_accounts(&self) -> Result<Vec<Account>, WalletError> {
        let installed = self.installed()?;
        let records = match self.store.load() {
            Ok(records) => records,
            Err(err) => {
                warn!(error = %err, path = %self.store.path().display(), "ignoring unreadable authorizations");
                Vec::new()
            }
        };

        let mut ordered: Vec<&AuthorizationRecord> = records
            .iter()
            .filter(|record| installed.iter().any(|w| w.name == record.wallet))
            .collect();
        if let Some(preferred) = self.preferred.as_deref() {
            ordered.sort_by_key(|record| record.wallet != preferred);
        }

        let mut accounts: Vec<Account> = Vec::with_capacity(ordered.len());
        for record in ordered {
            if !accounts.contains(&record.address) {
                accounts.push(record.address.clone());
            }
        }
        debug!(count = accounts.len(), "discovered authorized accounts");
        Ok(accounts)
    }

    async fn request_connection(&self) -> Result<Account, WalletError> {
        let descriptor = self.choose(self.installed()?)?;
        let prompt = Arc::clone(&self.prompt);
        let store = self.store.clone();
        // password entry and scrypt decryption both block
        tokio::task::spawn_blocking(move || connect_blocking(&descriptor, prompt.as_ref(), &store))
            .await
            .map_err(|err| WalletError::rejected(format!("wallet unlock failed: {err}")))?
    }
}

fn connect_blocking(
    descriptor: &WalletDescriptor,
    prompt: &dyn PasswordPrompt,
    store: &AuthorizationStore,
) -> Result<Account, WalletError> {
    let password = prompt
        .prompt(&descriptor.name)
        .map_err(|err| WalletError::rejected(format!("password prompt failed: {err}")))?;
    if password.is_empty() {
        return Err(WalletError::rejected("authorization cancelled"));
    }

    let secret = unlock_secret(descriptor, &password)
        .map_err(|err| WalletError::rejected(err.to_string()))?;
    let account = Account::from(address_of(&secret));

    if let Err(err) =
        store.authorize(AuthorizationRecord::now(descriptor.name.clone(), account.clone()))
    {
        warn!(error = %err, "failed to remember authorization");
    }
    info!(wallet = %descriptor.name, %account, "wallet connected");
    Ok(account)
}
