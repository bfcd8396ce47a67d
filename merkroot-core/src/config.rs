use crate::error::{MerkleError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_DEADLINE_MS: u64 = 100;
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1024;

pub const ENV_DEADLINE_MS: &str = "MERKROOT_DEADLINE_MS";
pub const ENV_PARALLEL_THRESHOLD: &str = "MERKROOT_PARALLEL_THRESHOLD";

/// Tunables for one root derivation call.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct DeriveConfig {
    /// How long the caller waits for the reduction worker.
    #[serde(rename = "deadline_ms", with = "millis")]
    pub deadline: Duration,
    /// Leaf count from which initial leaf hashing is spread over the rayon pool.
    pub parallel_threshold: usize,
}

impl Default for DeriveConfig {
    fn default() -> Self {
        Self {
            deadline: Duration::from_millis(DEFAULT_DEADLINE_MS),
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl DeriveConfig {
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Defaults overlaid with `MERKROOT_DEADLINE_MS` / `MERKROOT_PARALLEL_THRESHOLD`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut cfg = Self::default();
        if let Some(v) = get(ENV_DEADLINE_MS) {
            let ms: u64 = v
                .trim()
                .parse()
                .map_err(|_| MerkleError::Config(format!("{ENV_DEADLINE_MS}: bad value {v:?}")))?;
            cfg.deadline = Duration::from_millis(ms);
        }
        if let Some(v) = get(ENV_PARALLEL_THRESHOLD) {
            cfg.parallel_threshold = v.trim().parse().map_err(|_| {
                MerkleError::Config(format!("{ENV_PARALLEL_THRESHOLD}: bad value {v:?}"))
            })?;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.deadline.is_zero() {
            return Err(MerkleError::Config("deadline must be greater than zero".into()));
        }
        Ok(())
    }
}

mod millis {
    use serde::{ser, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        let ms = u64::try_from(d.as_millis()).map_err(<S::Error as ser::Error>::custom)?;
        s.serialize_u64(ms)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
