//! ZeroSum Arena contract bindings

use alloy::sol;

// Define the contract interface using sol! macro
sol! {
    /// @title ZeroSumArena
    /// @notice Multiplayer zero-sum games with on-chain entry fees and prizes
    #[sol(rpc)]
    contract ZeroSumArena {
        // Events
        event GameCreated(
            uint256 indexed gameId,
            address indexed creator,
            uint256 entryFee,
            uint256 maxPlayers
        );

        event PlayerJoined(
            uint256 indexed gameId,
            address indexed player,
            uint256 playerCount
        );

        event MoveMade(
            uint256 indexed gameId,
            address indexed player,
            uint256 moveValue
        );

        event GameFinished(
            uint256 indexed gameId,
            address indexed winner,
            uint256 prize
        );

        event GameCancelled(
            uint256 indexed gameId,
            string reason
        );

        event PrizeClaimed(
            uint256 indexed gameId,
            address indexed player,
            uint256 amount
        );

        // Game lifecycle
        function createGame(uint256 entryFee, uint256 maxPlayers) external payable returns (uint256 gameId);

        function joinGame(uint256 gameId) external payable;

        function makeMove(uint256 gameId, uint256 moveValue) external;

        function cancelGame(uint256 gameId) external;

        function claimPrize(uint256 gameId) external;

        // Views
        function gameCounter() external view returns (uint256);

        function getPlayers(uint256 gameId) external view returns (address[] memory);

        function isGameActive(uint256 gameId) external view returns (bool);
    }
}

pub use ZeroSumArena::{ZeroSumArenaEvents, ZeroSumArenaInstance};
