//! Root derivation entry points.

use crate::algorithm::{HashAlgorithm, NodeHasher};
use crate::config::DeriveConfig;
use crate::error::{MerkleError, Result, ValidationErrors, ValidationIssue};
use crate::reduce::{Level, ProcessType};
use crate::supervisor::run_with_deadline;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, info};

/// State for a single root derivation: the leaves, the hasher and the strategy.
pub struct Session {
    leaves: Level,
    hasher: Arc<dyn NodeHasher>,
    process: ProcessType,
    initial_hash: bool,
}

impl Session {
    pub fn new(
        leaves: Level,
        hasher: Arc<dyn NodeHasher>,
        process: ProcessType,
        initial_hash: bool,
    ) -> Result<Self> {
        if leaves.is_empty() {
            let mut errs = ValidationErrors::new();
            errs.push(ValidationIssue::EmptyInput);
            return Err(MerkleError::Invalid(errs));
        }
        Ok(Self { leaves, hasher, process, initial_hash })
    }

    pub fn algorithm_name(&self) -> &str {
        self.hasher.name()
    }

    pub fn process(&self) -> ProcessType {
        self.process
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Hash the leaves (if requested), then reduce them on a worker bounded by `cfg.deadline`.
    ///
    /// Only the reduction counts against the deadline; leaf hashing always runs to completion.
    pub async fn run(self, cfg: &DeriveConfig) -> Result<Vec<u8>> {
        let Session { mut leaves, hasher, process, initial_hash } = self;
        debug!(
            algorithm = hasher.name(),
            process = process.label(),
            leaves = leaves.len(),
            initial_hash,
            "starting root derivation"
        );
        if initial_hash {
            let threshold = cfg.parallel_threshold;
            let leaf_hasher = hasher.clone();
            leaves = tokio::task::spawn_blocking(move || {
                preprocess(&mut leaves, leaf_hasher.as_ref(), threshold);
                leaves
            })
            .await
            .map_err(|_| MerkleError::WorkerLost)?;
        }
        let root = run_with_deadline(process.label(), cfg.deadline, move || {
            process.reduce(leaves, hasher.as_ref())
        })
        .await?;
        info!(process = process.label(), root = %hex::encode(&root), "derived merkle root");
        Ok(root)
    }
}

/// Replace every leaf with its hash, once. Large inputs are hashed on the rayon pool.
pub fn preprocess(leaves: &mut Level, hasher: &dyn NodeHasher, parallel_threshold: usize) {
    if leaves.len() >= parallel_threshold {
        leaves.par_iter_mut().for_each(|leaf| *leaf = hasher.digest(leaf));
    } else {
        for leaf in leaves.iter_mut() {
            *leaf = hasher.digest(leaf);
        }
    }
}

/// Check every argument, collecting all problems before giving up.
pub fn validate(
    leaves: &[Vec<u8>],
    algorithm: &str,
    process_type: i64,
) -> Result<(HashAlgorithm, ProcessType)> {
    let mut errs = ValidationErrors::new();
    if leaves.is_empty() {
        errs.push(ValidationIssue::EmptyInput);
    }
    let alg = HashAlgorithm::lookup(algorithm);
    if alg.is_none() {
        errs.push(ValidationIssue::UnknownAlgorithm(algorithm.to_uppercase()));
    }
    let process = ProcessType::try_from(process_type).ok();
    if process.is_none() {
        errs.push(ValidationIssue::InvalidProcessType(process_type));
    }
    match (alg, process) {
        (Some(alg), Some(process)) if errs.is_empty() => Ok((alg, process)),
        _ => Err(MerkleError::Invalid(errs)),
    }
}

/// Derive the Merkle root of `leaves` with the default configuration.
///
/// `process_type` is 0 (pass-through), 1 (duplicate-and-append) or 2 (binary tree).
/// With `initial_hash` each leaf is hashed once before the tree is built.
pub async fn derive_root(
    leaves: Level,
    algorithm: &str,
    process_type: i64,
    initial_hash: bool,
) -> Result<Vec<u8>> {
    derive_root_with(&DeriveConfig::default(), leaves, algorithm, process_type, initial_hash).await
}

pub async fn derive_root_with(
    cfg: &DeriveConfig,
    leaves: Level,
    algorithm: &str,
    process_type: i64,
    initial_hash: bool,
) -> Result<Vec<u8>> {
    let (alg, process) = validate(&leaves, algorithm, process_type)?;
    Session::new(leaves, Arc::new(alg), process, initial_hash)?.run(cfg).await
}

/// Blocking form of [`derive_root_with`] for callers without a tokio runtime.
///
/// Must not be called from inside a runtime.
pub fn derive_root_blocking(
    cfg: &DeriveConfig,
    leaves: Level,
    algorithm: &str,
    process_type: i64,
    initial_hash: bool,
) -> Result<Vec<u8>> {
    let rt = tokio::runtime::Builder::new_current_thread().enable_time().build()?;
    rt.block_on(derive_root_with(cfg, leaves, algorithm, process_type, initial_hash))
}
