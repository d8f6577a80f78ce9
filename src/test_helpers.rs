use crate::{
    account::Account,
    character::RawCharacterRecord,
    contract::ContractReader,
    error::{
        ReadError,
        WalletError,
    },
    wallets::WalletProvider,
};
use async_trait::async_trait;
use std::{
    collections::{
        HashMap,
        VecDeque,
    },
    sync::{
        Mutex,
        atomic::{
            AtomicUsize,
            Ordering,
        },
    },
};
use tokio::sync::oneshot;

/// Deterministic account built from a repeated byte.
pub fn account(byte: u8) -> Account {
    Account::from(fuels::types::Address::from([byte; 32]))
}

pub fn character_record(name: &str) -> RawCharacterRecord {
    RawCharacterRecord {
        character_index: 1,
        name: name.to_string(),
        image_uri: format!("ipfs://{}", name.to_lowercase()),
        hp: 100,
        max_hp: 100,
        attack_damage: 20,
    }
}

#[derive(Default)]
struct WalletScript {
    authorized: Vec<Account>,
    connections: VecDeque<Result<Account, WalletError>>,
    discovery_gate: Option<oneshot::Receiver<()>>,
    connection_gate: Option<oneshot::Receiver<()>>,
}

/// In-memory wallet. Discovery returns the authorized accounts; connection
/// returns scripted answers first, then the first authorized account.
pub struct FakeWallet {
    present: bool,
    script: Mutex<WalletScript>,
    discover_calls: AtomicUsize,
    connect_calls: AtomicUsize,
}

impl FakeWallet {
    pub fn absent() -> Self {
        Self {
            present: false,
            script: Mutex::new(WalletScript::default()),
            discover_calls: AtomicUsize::new(0),
            connect_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_accounts(authorized: Vec<Account>) -> Self {
        Self {
            present: true,
            script: Mutex::new(WalletScript {
                authorized,
                ..WalletScript::default()
            }),
            discover_calls: AtomicUsize::new(0),
            connect_calls: AtomicUsize::new(0),
        }
    }

    pub fn script_connection(&self, result: Result<Account, WalletError>) {
        self.script.lock().unwrap().connections.push_back(result);
    }

    /// The next discovery waits until the returned sender fires or drops.
    pub fn hold_discovery(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.script.lock().unwrap().discovery_gate = Some(rx);
        tx
    }

    pub fn hold_connection(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.script.lock().unwrap().connection_gate = Some(rx);
        tx
    }

    pub fn discover_calls(&self) -> usize {
        self.discover_calls.load(Ordering::SeqCst)
    }

    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletProvider for FakeWallet {
    async fn discover_accounts(&self) -> Result<Vec<Account>, WalletError> {
        self.discover_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.script.lock().unwrap().discovery_gate.take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if !self.present {
            return Err(WalletError::Unavailable);
        }
        Ok(self.script.lock().unwrap().authorized.clone())
    }

    async fn request_connection(&self) -> Result<Account, WalletError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.script.lock().unwrap().connection_gate.take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if !self.present {
            return Err(WalletError::Unavailable);
        }
        let mut script = self.script.lock().unwrap();
        if let Some(result) = script.connections.pop_front() {
            return result;
        }
        script
            .authorized
            .first()
            .cloned()
            .ok_or_else(|| WalletError::rejected("user declined"))
    }
}

#[derive(Default)]
struct ContractScript {
    records: HashMap<Account, RawCharacterRecord>,
    failures: HashMap<Account, ReadError>,
    gates: HashMap<Account, oneshot::Receiver<()>>,
}

/// Contract double answering per account. Unknown accounts own nothing.
#[derive(Default)]
pub struct ScriptedContract {
    script: Mutex<ContractScript>,
    calls: AtomicUsize,
}

impl ScriptedContract {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_record(&self, account: &Account, record: RawCharacterRecord) {
        self.script
            .lock()
            .unwrap()
            .records
            .insert(account.clone(), record);
    }

    pub fn fail_for(&self, account: &Account, error: ReadError) {
        self.script
            .lock()
            .unwrap()
            .failures
            .insert(account.clone(), error);
    }

    /// The next read for `account` waits until the returned sender fires or
    /// drops.
    pub fn hold(&self, account: &Account) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.script
            .lock()
            .unwrap()
            .gates
            .insert(account.clone(), rx);
        tx
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContractReader for ScriptedContract {
    async fn fetch_owned_character(
        &self,
        account: &Account,
    ) -> Result<RawCharacterRecord, ReadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.script.lock().unwrap().gates.remove(account);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        let script = self.script.lock().unwrap();
        if let Some(error) = script.failures.get(account) {
            return Err(error.clone());
        }
        Ok(script.records.get(account).cloned().unwrap_or_default())
    }
}
