use monster_arena::{
    session::Session,
    test_helpers::{
        FakeWallet,
        ScriptedContract,
    },
};
use std::sync::Arc;

mod connect;
mod resolution;
mod startup;

pub type TestSession = Session<FakeWallet, ScriptedContract>;

pub fn session_with(
    wallet: FakeWallet,
    contract: ScriptedContract,
) -> (TestSession, Arc<FakeWallet>, Arc<ScriptedContract>) {
    let wallet = Arc::new(wallet);
    let contract = Arc::new(contract);
    let session = Session::new(Arc::clone(&wallet), Arc::clone(&contract));
    (session, wallet, contract)
}
