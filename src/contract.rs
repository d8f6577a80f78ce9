use crate::{
    account::Account,
    character::RawCharacterRecord,
    error::ReadError,
    game_types::MonsterArena,
};
use async_trait::async_trait;
use fuels::{
    accounts::signers::fake::FakeSigner,
    prelude::{
        ContractId,
        Execution,
        Provider,
        Wallet,
    },
    types::Address,
};
use tracing::debug;

/// Read access to the deployed game contract.
#[async_trait]
pub trait ContractReader: Send + Sync {
    /// The character record owned by `account`. An empty name means none.
    async fn fetch_owned_character(
        &self,
        account: &Account,
    ) -> Result<RawCharacterRecord, ReadError>;
}

#[derive(Clone, Debug)]
pub struct FuelContractReader {
    provider: Provider,
    contract_id: ContractId,
}

impl FuelContractReader {
    pub fn new(provider: Provider, contract_id: ContractId) -> Self {
        Self {
            provider,
            contract_id,
        }
    }
}

#[async_trait]
impl ContractReader for FuelContractReader {
    async fn fetch_owned_character(
        &self,
        account: &Account,
    ) -> Result<RawCharacterRecord, ReadError> {
        debug!(%account, contract = %self.contract_id, "checking for character NFT");
        // state_read_only skips signature checks, so the caller can be impersonated
        let caller = Wallet::new(
            FakeSigner::new(Address::from(account)),
            self.provider.clone(),
        );
        let instance = MonsterArena::new(self.contract_id, caller);
        let attributes = instance
            .methods()
            .check_if_user_has_nft()
            .simulate(Execution::state_read_only())
            .await
            .map_err(|e| ReadError::new(e.to_string()))?
            .value;
        Ok(RawCharacterRecord::from(attributes))
    }
}
