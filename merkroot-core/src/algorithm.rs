//! Built-in hash algorithms and the name registry used to select them.
//!
//! Names are matched case-insensitively. Besides the canonical names returned
//! by [`list`], a handful of legacy spellings (`SHA256SUM256` and friends) are
//! accepted so older callers keep resolving to the same digest.

use crate::error::{MerkleError, Result, ValidationErrors, ValidationIssue};
use serde::Serialize;
use sha2::Digest;
use std::fmt;
use std::str::FromStr;

/// A pure bytes -> bytes function used to hash leaves and combine siblings.
///
/// Implementations must be deterministic and free of side effects: a timed-out
/// reduction is abandoned rather than stopped, so it may keep calling the
/// hasher after the caller has moved on.
pub trait NodeHasher: Send + Sync {
    fn digest(&self, data: &[u8]) -> Vec<u8>;

    /// Name reported in logs and by `Session::algorithm_name`.
    fn name(&self) -> &str {
        "CUSTOM"
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// Identity: returns its input unchanged.
    Nop,
    Md5,
    Sha1,
    Sha256,
    Sha512,
    /// SHA-512 truncated to 256 bits (FIPS 180-4 SHA-512/256).
    Sha512_256,
    Sha3_256,
    Blake3,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 8] = [
        HashAlgorithm::Nop,
        HashAlgorithm::Md5,
        HashAlgorithm::Sha1,
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha512,
        HashAlgorithm::Sha512_256,
        HashAlgorithm::Sha3_256,
        HashAlgorithm::Blake3,
    ];

    /// Canonical registry name.
    pub fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Nop => "NOP",
            HashAlgorithm::Md5 => "MD5",
            HashAlgorithm::Sha1 => "SHA1",
            HashAlgorithm::Sha256 => "SHA256",
            HashAlgorithm::Sha512 => "SHA512",
            HashAlgorithm::Sha512_256 => "SHA512-256",
            HashAlgorithm::Sha3_256 => "SHA3-256",
            HashAlgorithm::Blake3 => "BLAKE3",
        }
    }

    /// Digest length in bytes; `None` for `Nop`, whose output is as long as its input.
    pub fn output_len(self) -> Option<usize> {
        match self {
            HashAlgorithm::Nop => None,
            HashAlgorithm::Md5 => Some(16),
            HashAlgorithm::Sha1 => Some(20),
            HashAlgorithm::Sha256 | HashAlgorithm::Sha512_256 => Some(32),
            HashAlgorithm::Sha3_256 | HashAlgorithm::Blake3 => Some(32),
            HashAlgorithm::Sha512 => Some(64),
        }
    }

    /// Resolve a registry name, ignoring case.
    pub fn lookup(name: &str) -> Option<HashAlgorithm> {
        let upper = name.to_uppercase();
        let found = match upper.as_str() {
            "NOP" | "IDENTITY" => HashAlgorithm::Nop,
            "MD5" => HashAlgorithm::Md5,
            "SHA1" => HashAlgorithm::Sha1,
            "SHA256" | "SHA256SUM256" => HashAlgorithm::Sha256,
            "SHA512" | "SHA512SUM512" => HashAlgorithm::Sha512,
            "SHA512-256" | "SHA512SUM256" => HashAlgorithm::Sha512_256,
            "SHA3-256" | "SHA3SUM256" => HashAlgorithm::Sha3_256,
            "BLAKE3" => HashAlgorithm::Blake3,
            _ => return None,
        };
        Some(found)
    }

    pub fn hash(self, data: &[u8]) -> Vec<u8> {
        match self {
            HashAlgorithm::Nop => data.to_vec(),
            HashAlgorithm::Md5 => md5::Md5::digest(data).to_vec(),
            HashAlgorithm::Sha1 => sha1::Sha1::digest(data).to_vec(),
            HashAlgorithm::Sha256 => sha2::Sha256::digest(data).to_vec(),
            HashAlgorithm::Sha512 => sha2::Sha512::digest(data).to_vec(),
            HashAlgorithm::Sha512_256 => sha2::Sha512_256::digest(data).to_vec(),
            HashAlgorithm::Sha3_256 => sha3::Sha3_256::digest(data).to_vec(),
            HashAlgorithm::Blake3 => blake3::hash(data).as_bytes().to_vec(),
        }
    }
}

impl NodeHasher for HashAlgorithm {
    fn digest(&self, data: &[u8]) -> Vec<u8> {
        HashAlgorithm::hash(*self, data)
    }

    fn name(&self) -> &str {
        HashAlgorithm::name(*self)
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(HashAlgorithm::name(*self))
    }
}

impl FromStr for HashAlgorithm {
    type Err = MerkleError;

    fn from_str(s: &str) -> Result<Self> {
        HashAlgorithm::lookup(s).ok_or_else(|| {
            let mut errs = ValidationErrors::new();
            errs.push(ValidationIssue::UnknownAlgorithm(s.to_uppercase()));
            MerkleError::Invalid(errs)
        })
    }
}

/// Canonical algorithm names in ascending order.
pub fn list() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = HashAlgorithm::ALL.into_iter().map(HashAlgorithm::name).collect();
    names.sort_unstable();
    names
}

#[derive(Serialize, Debug, Clone)]
pub struct AlgorithmList {
    pub algorithms: Vec<&'static str>,
}

/// JSON object `{"algorithms": [...]}` listing every registered name, sorted.
pub fn available_algorithms() -> Result<String> {
    let listing = AlgorithmList { algorithms: list() };
    Ok(serde_json::to_string(&listing)?)
}
