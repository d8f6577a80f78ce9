use crate::ui;
use color_eyre::eyre::{
    Result,
    WrapErr,
};
use fuels::prelude::{
    ContractId,
    Provider,
};
use monster_arena::{
    authorizations::AuthorizationStore,
    config::{
        AppConfig,
        ContractSource,
        NetworkTarget,
        WalletConfig,
    },
    contract::FuelContractReader,
    deployment::{
        DEPLOYMENTS_ROOT,
        DeploymentStore,
    },
    machine::MachineEvent,
    session::Session,
    wallets::{
        KeystoreWallet,
        PasswordPrompt,
        TerminalPrompt,
    },
};
use std::sync::Arc;
use tracing::{
    info,
    warn,
};

type GameSession = Session<KeystoreWallet, FuelContractReader>;

/// Hands the terminal over to rpassword for the length of one prompt.
struct SuspendingPrompt {
    gate: ui::InputGate,
}

impl PasswordPrompt for SuspendingPrompt {
    fn prompt(&self, wallet: &str) -> std::io::Result<String> {
        let _paused = self.gate.pause();
        ui::suspend()?;
        let password = TerminalPrompt.prompt(wallet);
        ui::resume()?;
        password
    }
}

fn network_label(network: &NetworkTarget) -> String {
    match network {
        NetworkTarget::Devnet { url } => format!("Devnet {url}"),
        NetworkTarget::Testnet { url } => format!("Testnet {url}"),
        NetworkTarget::LocalNode { url } => format!("Local {url}"),
    }
}

fn resolve_contract_id(config: &AppConfig) -> Result<ContractId> {
    match &config.contract {
        ContractSource::Explicit(id) => Ok(*id),
        ContractSource::LatestDeployment => {
            DeploymentStore::open(DEPLOYMENTS_ROOT, config.network.env()).latest_contract_id()
        }
    }
}

pub async fn run_app(config: AppConfig) -> Result<()> {
    let provider = Provider::connect(config.network.url())
        .await
        .wrap_err_with(|| format!("Failed to connect to {}", config.network.url()))?;
    let contract_id = resolve_contract_id(&config)?;
    info!(contract = %contract_id, "using game contract");

    let gate = ui::InputGate::default();
    let WalletConfig::ForcKeystore {
        preferred,
        dir,
        authorizations,
    } = config.wallet.clone();
    let wallet = KeystoreWallet::new(
        dir,
        preferred,
        AuthorizationStore::new(authorizations),
        Arc::new(SuspendingPrompt { gate: gate.clone() }),
    );
    let reader = FuelContractReader::new(provider, contract_id);
    let mut session = Session::new(Arc::new(wallet), Arc::new(reader));

    let mut ui_state = ui::UiState::new(network_label(&config.network), gate.clone());
    let mut input_events = ui::input_event_stream(gate);

    info!("Starting UI");
    ui::terminal_enter(&mut ui_state)?;
    let res = run_loop(&mut session, &mut ui_state, &mut input_events).await;
    ui::terminal_exit()?;
    res
}

async fn run_loop(
    session: &mut GameSession,
    ui_state: &mut ui::UiState,
    input_events: &mut ui::InputEventReceiver,
) -> Result<()> {
    session.start();
    ui::draw(ui_state, &session.view()).wrap_err("initial draw failed")?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
            raw_ev = ui::next_raw_event(input_events) => {
                let event = raw_ev?;
                let view = session.view();
                let Some(ev) = ui::interpret_event(ui_state, &view, event) else {
                    continue;
                };
                match ev {
                    ui::UserEvent::Quit => break,
                    ui::UserEvent::Connect => session.connect(),
                    ui::UserEvent::DismissAlert => session.dismiss_alert(),
                    ui::UserEvent::Redraw => {}
                }
            }
            Some(event) = session.next_event(), if session.has_pending() => {
                // the password prompt may have scribbled over the screen
                if matches!(event, MachineEvent::ConnectionResolved(_)) {
                    ui::terminal_clear(ui_state)?;
                }
                for alert in session.take_alerts() {
                    warn!(%alert, "alert raised");
                }
            }
        }
        ui::draw(ui_state, &session.view()).wrap_err("draw failed")?;
    }
    Ok(())
}
