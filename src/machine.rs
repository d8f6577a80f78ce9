//! Connection and character resolution state.
//!
//! [`AppStateMachine`] is a reducer: it consumes [`MachineEvent`]s and answers
//! with the [`Effect`]s the caller must run. It never awaits anything itself,
//! which keeps every ordering question inside `handle`. The
//! [`crate::session::Session`] driver runs the effects and feeds their results
//! back in as events.
//!
//! Character reads carry a [`ReadTicket`]. A result is applied only while its
//! ticket is still the outstanding one; anything older lost the race to an
//! account change and is dropped.

use crate::{
    account::Account,
    character::{
        self,
        CharacterNft,
        RawCharacterRecord,
    },
    error::{
        ReadError,
        WalletError,
    },
    surface::UiSurface,
};
use tracing::{
    debug,
    info,
    warn,
};

pub const NO_WALLET_ALERT: &str =
    "No wallet found. Create one with forc-wallet to get started!";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    ConnectPrompt,
    Resolving,
    Ready,
}

/// Identifies one character read: the account it was issued for and the
/// account generation at the time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadTicket {
    pub account: Account,
    pub generation: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MachineEvent {
    Startup,
    ConnectRequested,
    AccountsDiscovered(Result<Vec<Account>, WalletError>),
    ConnectionResolved(Result<Account, WalletError>),
    CharacterFetched {
        ticket: ReadTicket,
        result: Result<RawCharacterRecord, ReadError>,
    },
    /// The character-selection screen minted a character for the account.
    CharacterMinted(CharacterNft),
    AlertDismissed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    DiscoverAccounts,
    RequestConnection,
    FetchCharacter(ReadTicket),
    Alert(String),
}

/// Read-only snapshot handed to the renderer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct View {
    pub surface: UiSurface,
    pub phase: Phase,
    pub account: Option<Account>,
    pub character: Option<CharacterNft>,
    pub alert: Option<String>,
}

#[derive(Debug, Default)]
pub struct AppStateMachine {
    started: bool,
    loading: bool,
    discovery_pending: bool,
    connect_pending: bool,
    account: Option<Account>,
    character: Option<CharacterNft>,
    generation: u64,
    outstanding_read: Option<ReadTicket>,
    alert: Option<String>,
}

impl AppStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, event: MachineEvent) -> Vec<Effect> {
        match event {
            MachineEvent::Startup => self.on_startup(),
            MachineEvent::ConnectRequested => self.on_connect_requested(),
            MachineEvent::AccountsDiscovered(result) => self.on_accounts_discovered(result),
            MachineEvent::ConnectionResolved(result) => self.on_connection_resolved(result),
            MachineEvent::CharacterFetched { ticket, result } => {
                self.on_character_fetched(ticket, result)
            }
            MachineEvent::CharacterMinted(character) => self.on_character_minted(character),
            MachineEvent::AlertDismissed => {
                self.alert = None;
                Vec::new()
            }
        }
    }

    pub fn phase(&self) -> Phase {
        if !self.started {
            return Phase::Idle;
        }
        if self.discovery_pending {
            return Phase::Loading;
        }
        match (&self.account, &self.outstanding_read) {
            (None, _) => Phase::ConnectPrompt,
            (Some(_), Some(_)) => Phase::Resolving,
            (Some(_), None) => Phase::Ready,
        }
    }

    pub fn surface(&self) -> UiSurface {
        UiSurface::derive(
            self.loading,
            self.account.is_some(),
            self.character.is_some(),
        )
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    pub fn character(&self) -> Option<&CharacterNft> {
        self.character.as_ref()
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn view(&self) -> View {
        View {
            surface: self.surface(),
            phase: self.phase(),
            account: self.account.clone(),
            character: self.character.clone(),
            alert: self.alert.clone(),
        }
    }

    fn on_startup(&mut self) -> Vec<Effect> {
        if self.discovery_pending {
            debug!("discovery already in flight; coalescing startup");
            return Vec::new();
        }
        self.alert = None;
        self.started = true;
        self.loading = true;
        self.discovery_pending = true;
        vec![Effect::DiscoverAccounts]
    }

    fn on_connect_requested(&mut self) -> Vec<Effect> {
        if let Some(account) = &self.account {
            debug!(%account, "connect requested with an account already set");
            return Vec::new();
        }
        if self.connect_pending {
            debug!("connection request already in flight");
            return Vec::new();
        }
        self.started = true;
        self.connect_pending = true;
        vec![Effect::RequestConnection]
    }

    fn on_accounts_discovered(
        &mut self,
        result: Result<Vec<Account>, WalletError>,
    ) -> Vec<Effect> {
        self.discovery_pending = false;
        self.loading = false;
        match result {
            Ok(accounts) => match accounts.into_iter().next() {
                Some(account) => {
                    info!(%account, "found an authorized account");
                    self.set_account(account)
                }
                None => {
                    info!("no authorized account found");
                    Vec::new()
                }
            },
            Err(WalletError::Unavailable) => {
                info!("no wallet detected; waiting for an explicit connect");
                Vec::new()
            }
            Err(err) => {
                warn!(error = %err, "account discovery failed");
                Vec::new()
            }
        }
    }

    fn on_connection_resolved(&mut self, result: Result<Account, WalletError>) -> Vec<Effect> {
        self.connect_pending = false;
        match result {
            Ok(account) => {
                info!(%account, "connected");
                self.set_account(account)
            }
            Err(WalletError::Unavailable) => {
                warn!("connect requested without a wallet");
                self.alert = Some(NO_WALLET_ALERT.to_string());
                vec![Effect::Alert(NO_WALLET_ALERT.to_string())]
            }
            Err(err) => {
                info!(error = %err, "connection not authorized");
                Vec::new()
            }
        }
    }

    fn set_account(&mut self, account: Account) -> Vec<Effect> {
        if self.account.as_ref() == Some(&account) {
            debug!(%account, "account unchanged");
            return Vec::new();
        }
        self.generation += 1;
        self.character = None;
        let ticket = ReadTicket {
            account: account.clone(),
            generation: self.generation,
        };
        self.account = Some(account);
        self.outstanding_read = Some(ticket.clone());
        vec![Effect::FetchCharacter(ticket)]
    }

    fn on_character_fetched(
        &mut self,
        ticket: ReadTicket,
        result: Result<RawCharacterRecord, ReadError>,
    ) -> Vec<Effect> {
        if self.outstanding_read.as_ref() != Some(&ticket) {
            info!(
                account = %ticket.account,
                generation = ticket.generation,
                "discarding stale character read"
            );
            return Vec::new();
        }
        self.outstanding_read = None;
        match result {
            Ok(raw) => match character::resolve(&raw) {
                Some(found) => {
                    info!(account = %ticket.account, name = %found.name, "user has character NFT");
                    self.character = Some(found);
                }
                None => info!(account = %ticket.account, "no character NFT"),
            },
            Err(err) => warn!(account = %ticket.account, error = %err, "character lookup failed"),
        }
        Vec::new()
    }

    fn on_character_minted(&mut self, minted: CharacterNft) -> Vec<Effect> {
        match &self.account {
            Some(account) => {
                info!(%account, name = %minted.name, "character minted");
                self.character = Some(minted);
            }
            None => warn!(name = %minted.name, "ignoring minted character without an account"),
        }
        Vec::new()
    }
}
