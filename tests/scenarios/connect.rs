use super::session_with;
use monster_arena::{
    character::transform,
    error::WalletError,
    machine::{
        MachineEvent,
        NO_WALLET_ALERT,
    },
    surface::UiSurface,
    test_helpers::{
        FakeWallet,
        ScriptedContract,
        account,
        character_record,
    },
};

#[tokio::test]
async fn connect__without_wallet_raises_alert_and_stays_on_prompt() {
    // given
    let (mut session, _, _) = session_with(FakeWallet::absent(), ScriptedContract::new());
    session.start();
    session.run_until_idle().await;

    // when
    session.connect();
    session.run_until_idle().await;

    // then
    assert_eq!(session.take_alerts(), vec![NO_WALLET_ALERT.to_string()]);
    let view = session.view();
    assert_eq!(view.surface, UiSurface::ConnectPrompt);
    assert_eq!(view.alert.as_deref(), Some(NO_WALLET_ALERT));
}

#[tokio::test]
async fn connect__authorized_account_resolves_character() {
    // given
    let contract = ScriptedContract::new();
    contract.set_record(&account(7), character_record("Squirtle"));
    let wallet = FakeWallet::with_accounts(vec![]);
    wallet.script_connection(Ok(account(7)));
    let (mut session, _, _) = session_with(wallet, contract);
    session.start();
    session.run_until_idle().await;
    assert_eq!(session.view().surface, UiSurface::ConnectPrompt);

    // when
    session.connect();
    session.run_until_idle().await;

    // then
    let view = session.view();
    assert_eq!(view.account, Some(account(7)));
    assert_eq!(view.surface, UiSurface::Arena);
}

#[tokio::test]
async fn connect__rejection_leaves_state_untouched() {
    // given
    let wallet = FakeWallet::with_accounts(vec![]);
    wallet.script_connection(Err(WalletError::rejected("user declined")));
    let (mut session, _, contract) = session_with(wallet, ScriptedContract::new());
    session.start();
    session.run_until_idle().await;
    let before = session.view();

    // when
    session.connect();
    session.run_until_idle().await;

    // then
    assert_eq!(session.view(), before);
    assert!(session.take_alerts().is_empty());
    assert_eq!(contract.calls(), 0);
}

#[tokio::test]
async fn connect__duplicate_requests_while_pending_are_coalesced() {
    // given
    let wallet = FakeWallet::with_accounts(vec![]);
    wallet.script_connection(Ok(account(2)));
    let release = wallet.hold_connection();
    let (mut session, wallet, contract) = session_with(wallet, ScriptedContract::new());
    session.start();
    session.run_until_idle().await;

    // when
    session.connect();
    session.connect();
    session.connect();
    release.send(()).unwrap();
    session.run_until_idle().await;

    // then
    assert_eq!(wallet.connect_calls(), 1);
    assert_eq!(contract.calls(), 1);
    assert_eq!(session.view().account, Some(account(2)));
}

#[tokio::test]
async fn mint__moves_character_select_to_arena_without_rediscovery() {
    // given
    let (mut session, wallet, contract) = session_with(
        FakeWallet::with_accounts(vec![account(3)]),
        ScriptedContract::new(),
    );
    session.start();
    session.run_until_idle().await;
    assert_eq!(session.view().surface, UiSurface::CharacterSelect);

    // when
    session.mint(transform(&character_record("Pikachu")));

    // then
    assert_eq!(session.view().surface, UiSurface::Arena);
    assert!(!session.has_pending());
    assert_eq!(wallet.discover_calls(), 1);
    assert_eq!(contract.calls(), 1);
}

#[tokio::test]
async fn next_event__reports_each_applied_answer() {
    let (mut session, _, _) = session_with(FakeWallet::absent(), ScriptedContract::new());

    session.connect();
    let event = session.next_event().await;

    assert_eq!(
        event,
        Some(MachineEvent::ConnectionResolved(Err(WalletError::Unavailable)))
    );
    assert_eq!(session.next_event().await, None);
}
