use alloy::primitives::{TxHash, U256};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use zerosum_arena::config::AppCfg;
use zerosum_arena::{
    fetch_historical_events, get_provider_with_url, get_wallet_client_with_url, ArenaReader, EventWatcher,
    LogRange, Network, WalletClient,
};

#[derive(Parser, Debug)]
#[command(name = "zerosum-arena")]
#[command(about = "Watch, replay and play ZeroSum Arena games on Base", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "ZEROSUM_CONFIG")]
    config: Option<String>,

    /// Wait for the transaction receipt after sending
    #[arg(long, global = true)]
    wait: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the network selected for a chain id
    Network {
        #[arg(long)]
        chain_id: Option<u64>,
    },
    /// Follow live contract events until Ctrl-C
    Watch {
        #[arg(long)]
        game_id: Option<u64>,
        /// Disable notifications
        #[arg(short, long)]
        quiet: bool,
    },
    /// Print past events as JSON lines
    History {
        #[arg(long)]
        from_block: u64,
        #[arg(long)]
        to_block: Option<u64>,
        #[arg(long)]
        game_id: Option<u64>,
    },
    /// Show the players of a game and whether it is active
    Status {
        #[arg(long)]
        game_id: u64,
    },
    CreateGame {
        /// Entry fee in wei
        #[arg(long)]
        entry_fee: U256,
        #[arg(long)]
        max_players: u64,
    },
    Join {
        #[arg(long)]
        game_id: u64,
        /// Entry fee in wei
        #[arg(long)]
        entry_fee: U256,
    },
    Move {
        #[arg(long)]
        game_id: u64,
        #[arg(long)]
        value: U256,
    },
    Cancel {
        #[arg(long)]
        game_id: u64,
    },
    Claim {
        #[arg(long)]
        game_id: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Network { chain_id } => {
            init_tracing("info");
            let network = Network::from_chain_id(chain_id);
            println!("{} {}", network, network.rpc_url());
            Ok(())
        }
        command => run(cli.config.as_deref(), cli.wait, command).await,
    }
}

async fn run(config_path: Option<&str>, wait: bool, command: Command) -> Result<()> {
    let cfg = AppCfg::load(config_path).context("failed to load configuration")?;
    init_tracing(&cfg.logging.level);
    info!("Configuration loaded, network: {}", cfg.network());

    let arena = cfg.contract_address()?;

    match command {
        Command::Watch { game_id, quiet } => {
            let mut options = cfg.watch_options()?;
            if let Some(game_id) = game_id {
                options.game_id = Some(U256::from(game_id));
            }
            if quiet {
                options.show_notifications = false;
            }

            let provider = get_provider_with_url(&cfg.subscription_url()?).await?;
            let handle = EventWatcher::new(provider, arena)
                .with_options(options)
                .on_event(|event| match serde_json::to_string(event) {
                    Ok(line) => println!("{}", line),
                    Err(e) => warn!("Failed to serialize event: {}", e),
                })
                .watch()
                .await?;

            info!("Watching {} with {} subscriptions, press Ctrl-C to stop", arena, handle.subscription_count());
            tokio::signal::ctrl_c().await?;
            info!("Shutting down");
            handle.stop();
        }
        Command::History { from_block, to_block, game_id } => {
            let provider = get_provider_with_url(&cfg.rpc_url()).await?;
            let events = fetch_historical_events(
                &provider,
                arena,
                game_id.map(U256::from),
                LogRange::new(from_block, to_block),
            )
            .await?;
            for event in &events {
                println!("{}", serde_json::to_string(event)?);
            }
        }
        Command::Status { game_id } => {
            let provider = get_provider_with_url(&cfg.rpc_url()).await?;
            let reader = ArenaReader::new(arena, provider);
            let game_id = U256::from(game_id);

            println!("games created: {}", reader.game_counter().await?);
            println!("game #{} active: {}", game_id, reader.is_game_active(game_id).await?);
            for player in reader.players(game_id).await? {
                println!("  player {}", player);
            }
        }
        command => {
            let wallet = get_wallet_client_with_url(cfg.wallet.private_key.as_deref(), cfg.network(), &cfg.rpc_url())
                .await?;
            let tx_hash = send(&wallet, arena, command).await?;
            println!("{}", tx_hash);

            if wait {
                let block = wallet.wait_for_receipt(tx_hash).await?;
                println!("mined in block {:?}", block);
            }
        }
    }

    Ok(())
}

async fn send(wallet: &WalletClient, arena: alloy::primitives::Address, command: Command) -> Result<TxHash> {
    let tx_hash = match command {
        Command::CreateGame { entry_fee, max_players } => {
            wallet.create_game(arena, entry_fee, U256::from(max_players)).await?
        }
        Command::Join { game_id, entry_fee } => wallet.join_game(arena, U256::from(game_id), entry_fee).await?,
        Command::Move { game_id, value } => wallet.make_move(arena, U256::from(game_id), value).await?,
        Command::Cancel { game_id } => wallet.cancel_game(arena, U256::from(game_id)).await?,
        Command::Claim { game_id } => wallet.claim_prize(arena, U256::from(game_id)).await?,
        other => anyhow::bail!("{:?} does not send a transaction", other),
    };
    Ok(tx_hash)
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).compact().init();
}
