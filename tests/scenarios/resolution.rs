use super::session_with;
use monster_arena::{
    machine::{
        MachineEvent,
        Phase,
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
async fn resolution__late_read_for_previous_account_is_discarded() {
    // given: discovery is slow, the user connects B meanwhile and B's read hangs
    let a = account(0xA);
    let b = account(0xB);
    let wallet = FakeWallet::with_accounts(vec![a.clone()]);
    wallet.script_connection(Ok(b.clone()));
    let release_discovery = wallet.hold_discovery();
    let contract = ScriptedContract::new();
    contract.set_record(&b, character_record("Charmander"));
    let release_b = contract.hold(&b);
    let (mut session, _, contract) = session_with(wallet, contract);

    session.start();
    session.connect();
    let connected = session.next_event().await;
    assert!(matches!(connected, Some(MachineEvent::ConnectionResolved(Ok(_)))));
    assert_eq!(session.view().phase, Phase::Loading);

    // when: discovery lands on A, A's read finishes, then B's read is released
    release_discovery.send(()).unwrap();
    let discovered = session.next_event().await;
    assert!(matches!(discovered, Some(MachineEvent::AccountsDiscovered(Ok(_)))));
    let fetched_a = session.next_event().await;
    assert!(matches!(
        fetched_a,
        Some(MachineEvent::CharacterFetched { ref ticket, .. }) if ticket.account == a
    ));
    release_b.send(()).unwrap();
    session.run_until_idle().await;

    // then
    let view = session.view();
    assert_eq!(view.account, Some(a));
    assert_eq!(view.character, None);
    assert_eq!(view.surface, UiSurface::CharacterSelect);
    assert_eq!(view.phase, Phase::Ready);
    assert_eq!(contract.calls(), 2);
}

#[tokio::test]
async fn resolution__switching_account_clears_previous_character() {
    // given
    let a = account(1);
    let b = account(2);
    let contract = ScriptedContract::new();
    contract.set_record(&a, character_record("Bulbasaur"));
    let (mut session, _, contract) =
        session_with(FakeWallet::with_accounts(vec![a.clone()]), contract);
    session.start();
    session.run_until_idle().await;
    assert_eq!(session.view().surface, UiSurface::Arena);

    // when
    let release_b = contract.hold(&b);
    session.dispatch(MachineEvent::AccountsDiscovered(Ok(vec![b.clone()])));

    // then
    let view = session.view();
    assert_eq!(view.account, Some(b));
    assert_eq!(view.character, None);
    assert_eq!(view.phase, Phase::Resolving);
    assert_eq!(view.surface, UiSurface::CharacterSelect);

    drop(release_b);
    session.run_until_idle().await;
    assert_eq!(session.view().phase, Phase::Ready);
}
