//! CLI definition for the prover-helper binary.

use std::{path::PathBuf, sync::Arc, time::Duration};

use alloy_primitives::{Address, B256, U256};
use clap::{Parser, Subcommand, ValueEnum};
use prover_helper::{
    AssertionLinkConfig, AssertionLinkHelper, BufferLinkConfig, BufferLinkHelper, ConfigError,
    ContractArtifact, ContractProvenanceVerifier, DEFAULT_ASSERTION_SCAN_START_BLOCK,
    DEFAULT_BLOCK_HASH_MAPPING_SLOT, DEFAULT_BUFFER_ADDRESS, LogScanConfig, ProverHelper,
    ProverHelperConfig, RetryConfig, provenance::abi_value_to_json, rpc::ChainClient,
};
use serde_json::{Value, json};
use tracing::info;
use url::Url;

use crate::{logging::LogArgs, styles::CliStyles};

/// Prover helper - builds inputs for cross-chain block hash provers.
#[derive(Debug, Clone, Parser)]
#[command(name = "prover-helper")]
#[command(version, about, long_about = None)]
#[command(styles = CliStyles::init())]
pub(crate) struct Cli {
    /// Chain endpoint arguments.
    #[command(flatten)]
    pub rpc: RpcArgs,

    /// Event scan arguments.
    #[command(flatten)]
    pub scan: ScanArgs,

    /// Logging configuration arguments.
    #[command(flatten)]
    pub logging: LogArgs,

    /// The command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Home and target chain endpoints.
#[derive(Debug, Clone, Parser)]
#[command(next_help_heading = "Chains")]
pub(crate) struct RpcArgs {
    /// URL of the home chain RPC endpoint (the chain the prover runs on).
    #[arg(
        long = "home-rpc",
        env = "PROVER_HELPER_HOME_RPC",
        value_parser = parse_url,
        global = true
    )]
    pub home_rpc: Option<Url>,

    /// URL of the target chain RPC endpoint (the chain being proven).
    #[arg(
        long = "target-rpc",
        env = "PROVER_HELPER_TARGET_RPC",
        value_parser = parse_url,
        global = true
    )]
    pub target_rpc: Option<Url>,

    /// RPC request timeout (e.g., "30s", "1m").
    #[arg(
        long = "rpc-timeout",
        env = "PROVER_HELPER_RPC_TIMEOUT",
        default_value = "30s",
        value_parser = parse_duration,
        global = true
    )]
    pub rpc_timeout: Duration,

    /// Maximum number of retry attempts for RPC operations.
    #[arg(
        long = "rpc-max-retries",
        env = "PROVER_HELPER_RPC_MAX_RETRIES",
        default_value = "3",
        global = true
    )]
    pub rpc_max_retries: u32,

    /// Initial delay for exponential backoff (e.g., "100ms", "1s").
    #[arg(
        long = "rpc-retry-initial-delay",
        env = "PROVER_HELPER_RPC_RETRY_INITIAL_DELAY",
        default_value = "100ms",
        value_parser = parse_duration,
        global = true
    )]
    pub rpc_retry_initial_delay: Duration,

    /// Maximum delay between retry attempts (e.g., "10s", "1m").
    #[arg(
        long = "rpc-retry-max-delay",
        env = "PROVER_HELPER_RPC_RETRY_MAX_DELAY",
        default_value = "10s",
        value_parser = parse_duration,
        global = true
    )]
    pub rpc_retry_max_delay: Duration,
}

/// Log scan tuning.
#[derive(Debug, Clone, Parser)]
#[command(next_help_heading = "Event scan")]
pub(crate) struct ScanArgs {
    /// First block scanned for events.
    #[arg(
        long = "scan-start-block",
        env = "PROVER_HELPER_SCAN_START_BLOCK",
        default_value_t = DEFAULT_ASSERTION_SCAN_START_BLOCK,
        global = true
    )]
    pub start_block: u64,

    /// Blocks covered by one `eth_getLogs` request.
    #[arg(
        long = "log-chunk-size",
        env = "PROVER_HELPER_LOG_CHUNK_SIZE",
        default_value = "10000",
        global = true
    )]
    pub chunk_size: u64,

    /// Maximum `eth_getLogs` requests in flight.
    #[arg(
        long = "log-scan-concurrency",
        env = "PROVER_HELPER_LOG_SCAN_CONCURRENCY",
        default_value = "4",
        global = true
    )]
    pub concurrency: usize,
}

/// Top-level commands.
#[derive(Debug, Clone, Subcommand)]
pub(crate) enum Command {
    /// Parent-to-child prover: links through confirmed rollup assertions.
    AssertionLink {
        /// Address of the prover contract on the home chain.
        #[arg(long, value_parser = parse_address)]
        prover: Address,

        /// Input to build.
        #[command(subcommand)]
        op: InputOp,
    },

    /// Child-to-parent prover: links through the block hash buffer.
    BufferLink {
        /// Address of the block hash buffer on the home chain.
        #[arg(long, value_parser = parse_address, default_value_t = DEFAULT_BUFFER_ADDRESS)]
        buffer: Address,

        /// Storage slot of the buffer's block hash mapping.
        #[arg(
            long,
            value_parser = parse_u256,
            default_value_t = U256::from(DEFAULT_BLOCK_HASH_MAPPING_SLOT)
        )]
        mapping_slot: U256,

        /// Input to build.
        #[command(subcommand)]
        op: InputOp,
    },

    /// Finds the block a contract was created in.
    FindCreationBlock {
        /// Contract address.
        #[arg(long, value_parser = parse_address)]
        address: Address,

        /// Highest block to search (defaults to the chain head).
        #[arg(long)]
        upper_bound: Option<u64>,

        /// Chain to search.
        #[arg(long, value_enum, default_value = "home")]
        chain: Chain,
    },

    /// Verifies a prover pointer, its history and its current prover on the home chain.
    VerifyPointer {
        /// Pointer contract address.
        #[arg(long, value_parser = parse_address)]
        pointer: Address,

        /// Compiled artifact of the pointer contract.
        #[arg(long)]
        pointer_artifact: PathBuf,

        /// Compiled artifact of the current prover contract.
        #[arg(long)]
        prover_artifact: PathBuf,
    },
}

/// Inputs a prover helper can build.
#[derive(Debug, Clone, Subcommand)]
pub(crate) enum InputOp {
    /// Input for `getTargetBlockHash`, resolved at the home chain head.
    GetTargetBlockHash,

    /// Input for `verifyTargetBlockHash` as of a home block.
    VerifyTargetBlockHash {
        /// Home block hash to prove from.
        #[arg(long, value_parser = parse_b256)]
        home_block_hash: B256,
    },

    /// Input for `verifyStorageSlot` in a target block.
    VerifyStorageSlot {
        /// Target block hash.
        #[arg(long, value_parser = parse_b256)]
        target_block_hash: B256,

        /// Account whose storage is proven.
        #[arg(long, value_parser = parse_address)]
        account: Address,

        /// Storage slot.
        #[arg(long, value_parser = parse_u256)]
        slot: U256,
    },

    /// Resolves the newest provable target block as of a home block.
    Resolve {
        /// Home block number to observe from.
        #[arg(long)]
        observation_block: u64,
    },
}

/// Chain selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Chain {
    /// The home chain.
    Home,
    /// The target chain.
    Target,
}

impl TryFrom<&Cli> for ProverHelperConfig {
    type Error = ConfigError;

    fn try_from(cli: &Cli) -> Result<Self, Self::Error> {
        let retry = RetryConfig {
            max_attempts: cli.rpc.rpc_max_retries,
            initial_delay: cli.rpc.rpc_retry_initial_delay,
            max_delay: cli.rpc.rpc_retry_max_delay,
        };
        Ok(Self::new(cli.rpc.home_rpc.clone(), cli.rpc.target_rpc.clone())?
            .with_rpc_timeout(cli.rpc.rpc_timeout)?
            .with_retry(retry))
    }
}

impl ScanArgs {
    fn to_config(&self) -> Result<LogScanConfig, ConfigError> {
        let config = LogScanConfig {
            start_block: self.start_block,
            chunk_size: self.chunk_size,
            concurrency: self.concurrency,
        };
        config.validate()?;
        Ok(config)
    }
}

impl Cli {
    /// Runs the selected command and prints its JSON result.
    pub(crate) async fn run(self) -> eyre::Result<()> {
        let config = ProverHelperConfig::try_from(&self)?;
        let log_scan = self.scan.to_config()?;
        let (home, target) = config.connect()?;
        info!(home = %config.home_rpc, target = %config.target_rpc, "Connected to chains");

        let output = match self.command {
            Command::AssertionLink { prover, op } => {
                let config = AssertionLinkConfig { prover, log_scan };
                let helper = AssertionLinkHelper::new(home, target, config)?;
                run_input_op(&helper, op).await?
            }
            Command::BufferLink { buffer, mapping_slot, op } => {
                let config = BufferLinkConfig { buffer, block_hash_mapping_slot: mapping_slot };
                let helper = BufferLinkHelper::new(home, target, config)?;
                run_input_op(&helper, op).await?
            }
            Command::FindCreationBlock { address, upper_bound, chain } => {
                let client: Arc<dyn ChainClient> = match chain {
                    Chain::Home => home,
                    Chain::Target => target,
                };
                let verifier = ContractProvenanceVerifier::new(client, log_scan)?;
                let creation_block = verifier.find_creation_block(address, upper_bound).await?;
                json!({ "address": address, "creationBlock": creation_block })
            }
            Command::VerifyPointer { pointer, pointer_artifact, prover_artifact } => {
                let pointer_artifact = read_artifact(&pointer_artifact)?;
                let prover_artifact = read_artifact(&prover_artifact)?;
                let verifier = ContractProvenanceVerifier::new(home, log_scan)?;
                let verified = verifier
                    .verify_pointer_chain(pointer, &pointer_artifact, &prover_artifact)
                    .await?;
                let constructor_args: Vec<_> =
                    verified.prover_constructor_args.iter().map(abi_value_to_json).collect();
                json!({
                    "pointer": verified.pointer,
                    "owner": verified.owner,
                    "currentProver": verified.current_prover,
                    "proverConstructorArgs": constructor_args,
                    "history": verified.history,
                })
            }
        };

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}

async fn run_input_op(helper: &dyn ProverHelper, op: InputOp) -> eyre::Result<Value> {
    Ok(match op {
        InputOp::GetTargetBlockHash => {
            serde_json::to_value(helper.build_get_target_block_hash_input().await?)?
        }
        InputOp::VerifyTargetBlockHash { home_block_hash } => serde_json::to_value(
            helper.build_verify_target_block_hash_input(home_block_hash).await?,
        )?,
        InputOp::VerifyStorageSlot { target_block_hash, account, slot } => serde_json::to_value(
            helper.build_verify_storage_slot_input(target_block_hash, account, slot).await?,
        )?,
        InputOp::Resolve { observation_block } => {
            let resolved = helper.resolve_provable_target(observation_block).await?;
            json!({
                "observationBlock": observation_block,
                "targetBlockHash": resolved.target_block_hash,
                "linkDatum": resolved.link_datum,
            })
        }
    })
}

fn read_artifact(path: &PathBuf) -> eyre::Result<ContractArtifact> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read artifact {}: {e}", path.display()))?;
    Ok(ContractArtifact::from_json(&json)?)
}

/// Parse a duration string like "12s", "5m", "1h".
fn parse_duration(s: &str) -> Result<Duration, humantime::DurationError> {
    humantime::parse_duration(s)
}

/// Parse a URL string.
fn parse_url(s: &str) -> Result<Url, url::ParseError> {
    Url::parse(s)
}

/// Parse an Ethereum address from hex string.
fn parse_address(s: &str) -> Result<Address, alloy_primitives::hex::FromHexError> {
    s.parse()
}

/// Parse a 32-byte hash from hex string (0x-prefixed).
fn parse_b256(s: &str) -> Result<B256, alloy_primitives::hex::FromHexError> {
    s.parse()
}

/// Parse a decimal or 0x-prefixed hex integer.
fn parse_u256(s: &str) -> Result<U256, String> {
    s.parse::<U256>().map_err(|e| e.to_string())
}
