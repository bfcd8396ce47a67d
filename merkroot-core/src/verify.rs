use crate::config::DeriveConfig;
use crate::derive::derive_root_with;
use crate::error::{MerkleError, Result};
use crate::reduce::Level;

/// Recompute the root of `leaves` and compare it with `expected`.
///
/// Returns the recomputed root on a match and `ProofMismatch` otherwise.
pub async fn verify_root(
    cfg: &DeriveConfig,
    expected: &[u8],
    leaves: Level,
    algorithm: &str,
    process_type: i64,
    initial_hash: bool,
) -> Result<Vec<u8>> {
    let actual = derive_root_with(cfg, leaves, algorithm, process_type, initial_hash).await?;
    if actual != expected {
        return Err(MerkleError::ProofMismatch {
            expected: hex::encode(expected),
            actual: hex::encode(&actual),
        });
    }
    Ok(actual)
}
