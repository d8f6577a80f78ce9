pub mod account;
pub mod authorizations;
pub mod character;
pub mod config;
pub mod contract;
pub mod deployment;
pub mod error;
pub mod machine;
pub mod session;
pub mod surface;
pub mod wallets;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub mod game_types {
    use fuels::macros::abigen;

    abigen!(Contract(
        name = "MonsterArena",
        abi = "abi/monster-arena-abi.json"
    ));
}
