use super::session_with;
use monster_arena::{
    error::ReadError,
    machine::Phase,
    surface::UiSurface,
    test_helpers::{
        FakeWallet,
        ScriptedContract,
        account,
        character_record,
    },
};

#[tokio::test]
async fn startup__without_wallet_shows_connect_prompt_silently() {
    // given
    let (mut session, _, contract) = session_with(FakeWallet::absent(), ScriptedContract::new());

    // when
    session.start();
    session.run_until_idle().await;

    // then
    let view = session.view();
    assert_eq!(view.surface, UiSurface::ConnectPrompt);
    assert_eq!(view.phase, Phase::ConnectPrompt);
    assert_eq!(view.alert, None);
    assert!(session.take_alerts().is_empty());
    assert_eq!(contract.calls(), 0);
}

#[tokio::test]
async fn startup__shows_loading_until_discovery_answers() {
    // given
    let wallet = FakeWallet::with_accounts(vec![account(1)]);
    let release = wallet.hold_discovery();
    let (mut session, _, _) = session_with(wallet, ScriptedContract::new());

    // when
    session.start();

    // then
    assert_eq!(session.view().surface, UiSurface::Loading);
    release.send(()).unwrap();
    session.run_until_idle().await;
    assert!(!session.machine().is_loading());
    assert_eq!(session.view().surface, UiSurface::CharacterSelect);
}

#[tokio::test]
async fn startup__account_without_character_shows_character_select() {
    // given
    let contract = ScriptedContract::new();
    contract.set_record(&account(1), character_record(""));
    let (mut session, _, _) =
        session_with(FakeWallet::with_accounts(vec![account(1)]), contract);

    // when
    session.start();
    session.run_until_idle().await;

    // then
    let view = session.view();
    assert_eq!(view.surface, UiSurface::CharacterSelect);
    assert_eq!(view.account, Some(account(1)));
    assert_eq!(view.character, None);
}

#[tokio::test]
async fn startup__account_with_character_enters_arena() {
    // given
    let contract = ScriptedContract::new();
    contract.set_record(&account(1), character_record("Bulbasaur"));
    let (mut session, _, _) =
        session_with(FakeWallet::with_accounts(vec![account(1)]), contract);

    // when
    session.start();
    session.run_until_idle().await;

    // then
    let view = session.view();
    assert_eq!(view.surface, UiSurface::Arena);
    let character = view.character.unwrap();
    assert_eq!(character.name, "Bulbasaur");
    assert_eq!(character.hp, 100);
    assert_eq!(character.max_hp, 100);
    assert_eq!(character.attack_damage, 20);
}

#[tokio::test]
async fn startup__failed_read_falls_back_to_character_select() {
    let contract = ScriptedContract::new();
    contract.fail_for(&account(1), ReadError::new("connection refused"));
    let (mut session, _, _) =
        session_with(FakeWallet::with_accounts(vec![account(1)]), contract);

    session.start();
    session.run_until_idle().await;

    assert_eq!(session.view().surface, UiSurface::CharacterSelect);
    assert_eq!(session.view().phase, Phase::Ready);
}

#[tokio::test]
async fn startup__repeated_discovery_is_idempotent() {
    // given
    let contract = ScriptedContract::new();
    contract.set_record(&account(1), character_record("Bulbasaur"));
    let (mut session, wallet, contract) =
        session_with(FakeWallet::with_accounts(vec![account(1)]), contract);
    session.start();
    session.run_until_idle().await;
    let first = session.view();

    // when
    session.start();
    session.run_until_idle().await;

    // then
    assert_eq!(session.view(), first);
    assert_eq!(wallet.discover_calls(), 2);
    assert_eq!(contract.calls(), 1);
}

#[tokio::test]
async fn startup__while_discovery_pending_is_coalesced() {
    let wallet = FakeWallet::with_accounts(vec![]);
    let release = wallet.hold_discovery();
    let (mut session, wallet, _) = session_with(wallet, ScriptedContract::new());

    session.start();
    session.start();
    drop(release);
    session.run_until_idle().await;

    assert_eq!(wallet.discover_calls(), 1);
    assert_eq!(session.view().surface, UiSurface::ConnectPrompt);
}
