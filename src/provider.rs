//! Read-only RPC providers and contract handles

use alloy::primitives::{Address, U256};
use alloy::providers::fillers::{
    BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller,
};
use alloy::providers::{Identity, Provider, ProviderBuilder, RootProvider};
use tracing::{debug, error, info};

use crate::contract::{ZeroSumArena, ZeroSumArenaInstance};
use crate::error::Result;
use crate::network::Network;

/// Provider type with the recommended fillers
pub type ReadProvider = FillProvider<
    JoinFill<Identity, JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>>,
    RootProvider,
>;

/// Build a provider for the network selected by `chain_id`.
///
/// `None` and unknown chain ids fall back to the testnet.
pub async fn get_provider(chain_id: Option<u64>) -> Result<ReadProvider> {
    let network = Network::from_chain_id(chain_id);
    debug!("Selected network {} for chain id {:?}", network, chain_id);
    get_provider_with_url(network.rpc_url()).await
}

/// Build a provider for an explicit http(s) or ws(s) endpoint
pub async fn get_provider_with_url(rpc_url: &str) -> Result<ReadProvider> {
    match ProviderBuilder::new().connect(rpc_url).await {
        Ok(provider) => {
            info!("Connected to RPC endpoint: {}", rpc_url);
            Ok(provider)
        }
        Err(e) => {
            error!("Failed to connect to RPC endpoint {}: {}", rpc_url, e);
            Err(e.into())
        }
    }
}

/// Contract handle bound to the provider selected by `chain_id`
pub async fn get_contract(
    address: Address,
    chain_id: Option<u64>,
) -> Result<ZeroSumArenaInstance<ReadProvider>> {
    let provider = get_provider(chain_id).await.inspect_err(|e| {
        error!("Failed to create contract handle for {}: {}", address, e);
    })?;
    info!("Contract handle created for {}", address);
    Ok(ZeroSumArena::new(address, provider))
}

/// View calls on the arena contract
pub struct ArenaReader<P> {
    contract: ZeroSumArenaInstance<P>,
}

impl<P: Provider> ArenaReader<P> {
    pub fn new(address: Address, provider: P) -> Self {
        Self {
            contract: ZeroSumArena::new(address, provider),
        }
    }

    pub fn address(&self) -> Address {
        *self.contract.address()
    }

    /// Number of games created so far
    pub async fn game_counter(&self) -> Result<U256> {
        Ok(self.contract.gameCounter().call().await?)
    }

    pub async fn players(&self, game_id: U256) -> Result<Vec<Address>> {
        Ok(self.contract.getPlayers(game_id).call().await?)
    }

    pub async fn is_game_active(&self, game_id: U256) -> Result<bool> {
        Ok(self.contract.isGameActive(game_id).call().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, Bytes};
    use alloy::sol_types::SolValue;
    use alloy::transports::mock::Asserter;

    const ARENA: Address = address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");

    #[tokio::test]
    async fn test_get_provider_without_chain_id() {
        let provider = get_provider(None).await;
        assert!(provider.is_ok());
    }

    #[tokio::test]
    async fn test_get_contract_binds_address() {
        let contract = get_contract(ARENA, Some(8453)).await.unwrap();
        assert_eq!(*contract.address(), ARENA);
    }

    #[tokio::test]
    async fn test_reader_address() {
        let provider = get_provider_with_url("http://localhost:8545").await.unwrap();
        let reader = ArenaReader::new(ARENA, provider);
        assert_eq!(reader.address(), ARENA);
    }

    #[tokio::test]
    async fn test_reader_decodes_view_results() {
        let asserter = Asserter::new();
        let reader = ArenaReader::new(ARENA, ProviderBuilder::new().connect_mocked_client(asserter.clone()));

        asserter.push_success(&Bytes::from(U256::from(5).abi_encode()));
        assert_eq!(reader.game_counter().await.unwrap(), U256::from(5));

        let players = vec![
            address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8"),
            address!("0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC"),
        ];
        asserter.push_success(&Bytes::from(players.abi_encode()));
        assert_eq!(reader.players(U256::from(2)).await.unwrap(), players);

        asserter.push_success(&Bytes::from(true.abi_encode()));
        assert!(reader.is_game_active(U256::from(2)).await.unwrap());
    }

    #[tokio::test]
    async fn test_reader_surfaces_reverts() {
        let asserter = Asserter::new();
        let reader = ArenaReader::new(ARENA, ProviderBuilder::new().connect_mocked_client(asserter.clone()));

        asserter.push_failure_msg("execution reverted");
        assert!(reader.is_game_active(U256::from(99)).await.is_err());
    }
}
