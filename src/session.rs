use crate::{
    character::CharacterNft,
    contract::ContractReader,
    machine::{
        AppStateMachine,
        Effect,
        MachineEvent,
        View,
    },
    wallets::WalletProvider,
};
use futures::{
    FutureExt,
    StreamExt,
    future::BoxFuture,
    stream::FuturesUnordered,
};
use std::{
    collections::VecDeque,
    sync::Arc,
};
use tracing::debug;

/// Runs the effects the [`AppStateMachine`] asks for and feeds their results
/// back as events.
///
/// The session never spawns: in-flight calls live in a [`FuturesUnordered`]
/// that only makes progress while [`Session::next_event`] is being awaited,
/// so the owner decides when wallet and contract answers are applied.
pub struct Session<W: ?Sized, C: ?Sized> {
    machine: AppStateMachine,
    wallet: Arc<W>,
    contract: Arc<C>,
    in_flight: FuturesUnordered<BoxFuture<'static, MachineEvent>>,
    alerts: VecDeque<String>,
}

impl<W, C> Session<W, C>
where
    W: WalletProvider + ?Sized + 'static,
    C: ContractReader + ?Sized + 'static,
{
    pub fn new(wallet: Arc<W>, contract: Arc<C>) -> Self {
        Self {
            machine: AppStateMachine::new(),
            wallet,
            contract,
            in_flight: FuturesUnordered::new(),
            alerts: VecDeque::new(),
        }
    }

    pub fn start(&mut self) {
        self.dispatch(MachineEvent::Startup);
    }

    pub fn connect(&mut self) {
        self.dispatch(MachineEvent::ConnectRequested);
    }

    pub fn mint(&mut self, character: CharacterNft) {
        self.dispatch(MachineEvent::CharacterMinted(character));
    }

    pub fn dismiss_alert(&mut self) {
        self.dispatch(MachineEvent::AlertDismissed);
    }

    pub fn dispatch(&mut self, event: MachineEvent) {
        for effect in self.machine.handle(event) {
            self.run(effect);
        }
    }

    fn run(&mut self, effect: Effect) {
        debug!(?effect, "running effect");
        match effect {
            Effect::DiscoverAccounts => {
                let wallet = Arc::clone(&self.wallet);
                self.in_flight.push(
                    async move {
                        MachineEvent::AccountsDiscovered(wallet.discover_accounts().await)
                    }
                    .boxed(),
                );
            }
            Effect::RequestConnection => {
                let wallet = Arc::clone(&self.wallet);
                self.in_flight.push(
                    async move {
                        MachineEvent::ConnectionResolved(wallet.request_connection().await)
                    }
                    .boxed(),
                );
            }
            Effect::FetchCharacter(ticket) => {
                let contract = Arc::clone(&self.contract);
                self.in_flight.push(
                    async move {
                        let result = contract.fetch_owned_character(&ticket.account).await;
                        MachineEvent::CharacterFetched { ticket, result }
                    }
                    .boxed(),
                );
            }
            Effect::Alert(message) => self.alerts.push_back(message),
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Waits for the next wallet or contract answer, applies it and returns
    /// it. `None` once nothing is in flight.
    ///
    /// Cancel safe: nothing is lost if the returned future is dropped before
    /// it completes.
    pub async fn next_event(&mut self) -> Option<MachineEvent> {
        let event = self.in_flight.next().await?;
        self.dispatch(event.clone());
        Some(event)
    }

    pub async fn run_until_idle(&mut self) {
        while self.next_event().await.is_some() {}
    }

    pub fn take_alerts(&mut self) -> Vec<String> {
        self.alerts.drain(..).collect()
    }

    pub fn view(&self) -> View {
        self.machine.view()
    }

    pub fn machine(&self) -> &AppStateMachine {
        &self.machine
    }
}
