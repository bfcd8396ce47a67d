use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use merkroot_core::{available_algorithms, derive_root_with, verify_root, DeriveConfig, Level, ProcessType};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Process { PassThrough, DupeAppend, BinaryTree }

impl From<Process> for ProcessType {
    fn from(p: Process) -> Self {
        match p {
            Process::PassThrough => ProcessType::PassThrough,
            Process::DupeAppend => ProcessType::DupeAppend,
            Process::BinaryTree => ProcessType::BinaryTree,
        }
    }
}

#[derive(Parser)]
#[command(name="merkroot", version, about="Merkle root derivation")]
struct Cli { #[command(subcommand)] cmd: Cmd }

#[derive(Args)]
struct TreeArgs {
    #[arg(long, short, default_value = "SHA256")]
    algorithm: String,
    #[arg(long, short, value_enum, default_value_t = Process::DupeAppend)]
    process: Process,
    /// Hash every leaf once before building the tree
    #[arg(long, default_value_t = false)] initial_hash: bool,
    /// Treat leaves as raw UTF-8 text instead of hex
    #[arg(long, default_value_t = false)] raw: bool,
    /// Overrides MERKROOT_DEADLINE_MS
    #[arg(long)] deadline_ms: Option<u64>,
    /// Read leaves from a file, one per line
    #[arg(long)] file: Option<PathBuf>,
    leaves: Vec<String>,
}

#[derive(Subcommand)]
enum Cmd {
    /// List supported hash algorithms as JSON
    Algorithms,
    /// Print the hex root of the given leaves
    Root(TreeArgs),
    /// Check leaves against an expected hex root
    Verify {
        #[arg(long)] expected: String,
        #[command(flatten)] tree: TreeArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Algorithms => println!("{}", available_algorithms()?),
        Cmd::Root(tree) => {
            let (cfg, leaves) = prepare(&tree)?;
            let root = derive_root_with(&cfg, leaves, &tree.algorithm, ProcessType::from(tree.process) as i64, tree.initial_hash).await?;
            println!("{}", hex::encode(root));
        }
        Cmd::Verify { expected, tree } => {
            let expected = hex::decode(expected.trim()).context("decode --expected")?;
            let (cfg, leaves) = prepare(&tree)?;
            let root = verify_root(&cfg, &expected, leaves, &tree.algorithm, ProcessType::from(tree.process) as i64, tree.initial_hash).await?;
            eprintln!("Merkle=OK {}", hex::encode(root));
        }
    }
    Ok(())
}

fn prepare(tree: &TreeArgs) -> Result<(DeriveConfig, Level)> {
    let mut cfg = DeriveConfig::from_env()?;
    if let Some(ms) = tree.deadline_ms { cfg.deadline = Duration::from_millis(ms); }
    cfg.validate()?;

    let mut inputs: Vec<String> = tree.leaves.clone();
    if let Some(path) = &tree.file {
        let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        inputs.extend(text.lines().map(str::trim).filter(|l| !l.is_empty()).map(String::from));
    }
    let leaves = inputs.iter().map(|s| parse_leaf(s, tree.raw)).collect::<Result<Level>>()?;
    tracing::debug!(leaves = leaves.len(), deadline = ?cfg.deadline, "parsed input");
    Ok((cfg, leaves))
}

fn parse_leaf(s: &str, raw: bool) -> Result<Vec<u8>> {
    if raw { return Ok(s.as_bytes().to_vec()); }
    let digits = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(digits).map_err(|e| anyhow!("bad hex leaf {:?}: {}", s, e))
}
