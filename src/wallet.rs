//! Write-capable wallet client for the arena contract

use alloy::{
    hex,
    network::EthereumWallet,
    primitives::{Address, TxHash, U256},
    rpc::types::TransactionRequest,
    providers::{
        fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller, WalletFiller},
        Identity, PendingTransactionBuilder, Provider, ProviderBuilder, RootProvider,
    },
    signers::{local::PrivateKeySigner, Signer},
};
use tracing::{error, info};

use crate::contract::{ZeroSumArena, ZeroSumArenaInstance};
use crate::error::{ArenaError, Result};
use crate::network::Network;

// Type alias to avoid complex type
pub type WalletProvider = FillProvider<
    JoinFill<
        JoinFill<Identity, JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>>,
        WalletFiller<EthereumWallet>,
    >,
    RootProvider,
>;

/// Signs and submits arena transactions on behalf of one account
pub struct WalletClient<P = WalletProvider> {
    provider: P,
    signer: PrivateKeySigner,
    network: Network,
}

/// Build a wallet client for the network selected by `chain_id`
pub async fn get_wallet_client(private_key: Option<&str>, chain_id: Option<u64>) -> Result<WalletClient> {
    let network = Network::from_chain_id(chain_id);
    get_wallet_client_with_url(private_key, network, network.rpc_url()).await
}

/// Build a wallet client against an explicit endpoint of `network`
pub async fn get_wallet_client_with_url(
    private_key: Option<&str>,
    network: Network,
    rpc_url: &str,
) -> Result<WalletClient> {
    let Some(private_key) = private_key else {
        error!("Wallet client requested but no private key is configured");
        return Err(ArenaError::MissingSigner);
    };
    let signer = parse_signer(private_key, network.chain_id()).inspect_err(|e| {
        error!("Failed to create wallet signer: {}", e);
    })?;

    let wallet = EthereumWallet::from(signer.clone());
    let provider = match ProviderBuilder::new().wallet(wallet).connect(rpc_url).await {
        Ok(provider) => provider,
        Err(e) => {
            error!("Failed to connect wallet client to {}: {}", rpc_url, e);
            return Err(e.into());
        }
    };

    info!("Wallet client ready for {} on {}", signer.address(), network);
    Ok(WalletClient::new(provider, signer, network))
}

fn parse_signer(private_key: &str, chain_id: u64) -> Result<PrivateKeySigner> {
    let key_bytes = hex::decode(private_key.trim().trim_start_matches("0x"))
        .map_err(|e| ArenaError::InvalidPrivateKey(e.to_string()))?;
    let signer = PrivateKeySigner::from_slice(&key_bytes)
        .map_err(|e| ArenaError::InvalidPrivateKey(e.to_string()))?;
    Ok(signer.with_chain_id(Some(chain_id)))
}

impl<P: Provider> WalletClient<P> {
    /// Wrap an already connected provider that signs for `signer`
    pub fn new(provider: P, signer: PrivateKeySigner, network: Network) -> Self {
        Self { provider, signer, network }
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Contract handle that sends through this wallet
    pub fn contract(&self, arena: Address) -> ZeroSumArenaInstance<&P> {
        ZeroSumArena::new(arena, &self.provider)
    }

    /// `createGame` call paying the creator's entry fee
    pub fn create_game_request(&self, arena: Address, entry_fee: U256, max_players: U256) -> TransactionRequest {
        self.contract(arena)
            .createGame(entry_fee, max_players)
            .value(entry_fee)
            .into_transaction_request()
    }

    pub fn join_game_request(&self, arena: Address, game_id: U256, entry_fee: U256) -> TransactionRequest {
        self.contract(arena).joinGame(game_id).value(entry_fee).into_transaction_request()
    }

    /// Create a game, paying the creator's entry fee
    pub async fn create_game(&self, arena: Address, entry_fee: U256, max_players: U256) -> Result<TxHash> {
        info!("WalletClient: Creating game with entry fee {} and {} max players", entry_fee, max_players);
        self.submit("createGame", self.create_game_request(arena, entry_fee, max_players))
            .await
    }

    pub async fn join_game(&self, arena: Address, game_id: U256, entry_fee: U256) -> Result<TxHash> {
        info!("WalletClient: Joining game #{} with entry fee {}", game_id, entry_fee);
        self.submit("joinGame", self.join_game_request(arena, game_id, entry_fee)).await
    }

    pub async fn make_move(&self, arena: Address, game_id: U256, move_value: U256) -> Result<TxHash> {
        info!("WalletClient: Making move {} in game #{}", move_value, game_id);
        let request = self.contract(arena).makeMove(game_id, move_value).into_transaction_request();
        self.submit("makeMove", request).await
    }

    pub async fn cancel_game(&self, arena: Address, game_id: U256) -> Result<TxHash> {
        info!("WalletClient: Cancelling game #{}", game_id);
        let request = self.contract(arena).cancelGame(game_id).into_transaction_request();
        self.submit("cancelGame", request).await
    }

    pub async fn claim_prize(&self, arena: Address, game_id: U256) -> Result<TxHash> {
        info!("WalletClient: Claiming prize of game #{}", game_id);
        let request = self.contract(arena).claimPrize(game_id).into_transaction_request();
        self.submit("claimPrize", request).await
    }

    async fn submit(&self, method: &str, request: TransactionRequest) -> Result<TxHash> {
        let pending_tx = self.provider.send_transaction(request).await.inspect_err(|e| {
            error!("WalletClient: {} failed: {}", method, e);
        })?;
        let tx_hash = *pending_tx.tx_hash();

        info!("WalletClient: {} submitted with tx hash: {:?}", method, tx_hash);
        Ok(tx_hash)
    }

    /// Block until the transaction is mined; returns the block it landed in
    pub async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<Option<u64>> {
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), tx_hash)
            .get_receipt()
            .await?;
        Ok(receipt.block_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, TxKind, B256};
    use alloy::sol_types::SolCall;
    use alloy::transports::mock::Asserter;

    const ARENA: Address = address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");

    const TEST_KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    #[tokio::test]
    async fn test_missing_private_key() {
        let result = get_wallet_client(None, None).await;
        assert!(matches!(result, Err(ArenaError::MissingSigner)));
    }

    #[tokio::test]
    async fn test_invalid_private_key() {
        let result = get_wallet_client(Some("0xnot-a-key"), None).await;
        assert!(matches!(result, Err(ArenaError::InvalidPrivateKey(_))));
    }

    #[tokio::test]
    async fn test_wallet_client_bound_to_selected_network() {
        let client = get_wallet_client(Some(TEST_KEY), Some(8453)).await.unwrap();
        assert_eq!(client.network(), Network::BaseMainnet);
        assert_ne!(client.address(), Address::ZERO);

        let testnet = get_wallet_client(Some(TEST_KEY), Some(1)).await.unwrap();
        assert_eq!(testnet.network(), Network::BaseSepolia);
        assert_eq!(testnet.address(), client.address());
    }

    #[test]
    fn test_signer_accepts_key_without_prefix() {
        let with_prefix = parse_signer(TEST_KEY, 84532).unwrap();
        let without_prefix = parse_signer(TEST_KEY.trim_start_matches("0x"), 84532).unwrap();
        assert_eq!(with_prefix.address(), without_prefix.address());
        assert_eq!(with_prefix.chain_id(), Some(84532));
    }

    fn mocked_client(asserter: Asserter) -> WalletClient<impl Provider> {
        let signer = parse_signer(TEST_KEY, 84532).unwrap();
        let provider = ProviderBuilder::new().disable_recommended_fillers().connect_mocked_client(asserter);
        WalletClient::new(provider, signer, Network::BaseSepolia)
    }

    #[test]
    fn test_create_game_pays_entry_fee() {
        let client = mocked_client(Asserter::new());
        let fee = U256::from(1_000_000_000_000_000u64);

        let request = client.create_game_request(ARENA, fee, U256::from(4));
        assert_eq!(request.value, Some(fee));
        assert_eq!(request.to, Some(TxKind::Call(ARENA)));

        let call = ZeroSumArena::createGameCall::abi_decode(request.input.input().unwrap()).unwrap();
        assert_eq!(call.entryFee, fee);
        assert_eq!(call.maxPlayers, U256::from(4));
    }

    #[test]
    fn test_join_game_pays_entry_fee() {
        let client = mocked_client(Asserter::new());
        let fee = U256::from(250);

        let request = client.join_game_request(ARENA, U256::from(9), fee);
        assert_eq!(request.value, Some(fee));

        let call = ZeroSumArena::joinGameCall::abi_decode(request.input.input().unwrap()).unwrap();
        assert_eq!(call.gameId, U256::from(9));
    }

    #[tokio::test]
    async fn test_write_helpers_return_submitted_hash() {
        let asserter = Asserter::new();
        let client = mocked_client(asserter.clone());

        let created = B256::repeat_byte(0x11);
        asserter.push_success(&created);
        assert_eq!(client.create_game(ARENA, U256::from(100), U256::from(2)).await.unwrap(), created);

        let joined = B256::repeat_byte(0x22);
        asserter.push_success(&joined);
        assert_eq!(client.join_game(ARENA, U256::from(1), U256::from(100)).await.unwrap(), joined);

        let moved = B256::repeat_byte(0x33);
        asserter.push_success(&moved);
        assert_eq!(client.make_move(ARENA, U256::from(1), U256::from(7)).await.unwrap(), moved);
    }

    #[tokio::test]
    async fn test_rejected_transaction_is_an_rpc_error() {
        let asserter = Asserter::new();
        let client = mocked_client(asserter.clone());

        asserter.push_failure_msg("insufficient funds");
        let result = client.claim_prize(ARENA, U256::from(1)).await;
        assert!(matches!(result, Err(ArenaError::Rpc(_))));
    }
}
