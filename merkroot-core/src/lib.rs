pub mod algorithm;
pub mod config;
pub mod derive;
pub mod error;
pub mod reduce;
pub mod supervisor;
pub mod verify;

pub use algorithm::{available_algorithms, HashAlgorithm, NodeHasher};
pub use config::DeriveConfig;
pub use derive::{derive_root, derive_root_blocking, derive_root_with, Session};
pub use error::{MerkleError, Result, ValidationErrors, ValidationIssue};
pub use reduce::{Level, ProcessType};
pub use verify::verify_root;
