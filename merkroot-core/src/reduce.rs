//! Level reduction strategies.
//!
//! Each round builds the parent level as a fresh vector; a level is never
//! patched in place. All three strategies share [`combine`] and [`pair_round`].

use crate::algorithm::NodeHasher;
use crate::error::{MerkleError, Result, ValidationErrors, ValidationIssue};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::trace;

/// One depth of the tree, ordered left to right.
pub type Level = Vec<Vec<u8>>;

/// How an unpaired trailing node is handled while collapsing a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProcessType {
    /// Carry the unpaired node up unchanged.
    PassThrough = 0,
    /// Duplicate the last node so every node has a partner.
    DupeAppend = 1,
    /// Align to the next power of two first, then reduce a perfect tree.
    BinaryTree = 2,
}

impl ProcessType {
    pub const ALL: [ProcessType; 3] =
        [ProcessType::PassThrough, ProcessType::DupeAppend, ProcessType::BinaryTree];

    /// Short label used in log fields.
    pub fn label(self) -> &'static str {
        match self {
            ProcessType::PassThrough => "PAS-THRU",
            ProcessType::DupeAppend => "DUP-APND",
            ProcessType::BinaryTree => "BIN-TREE",
        }
    }

    /// Collapse `level` to its root.
    pub fn reduce(self, level: Level, hasher: &dyn NodeHasher) -> Result<Vec<u8>> {
        if level.is_empty() {
            let mut errs = ValidationErrors::new();
            errs.push(ValidationIssue::EmptyInput);
            return Err(MerkleError::Invalid(errs));
        }
        let root = match self {
            ProcessType::PassThrough => pass_through(level, hasher),
            ProcessType::DupeAppend => dupe_append(level, hasher),
            ProcessType::BinaryTree => binary_tree(level, hasher),
        };
        Ok(root)
    }
}

impl fmt::Display for ProcessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProcessType::PassThrough => "pass-through",
            ProcessType::DupeAppend => "dupe-append",
            ProcessType::BinaryTree => "binary-tree",
        };
        f.write_str(s)
    }
}

fn invalid_process(issue: ValidationIssue) -> MerkleError {
    let mut errs = ValidationErrors::new();
    errs.push(issue);
    MerkleError::Invalid(errs)
}

impl TryFrom<i64> for ProcessType {
    type Error = MerkleError;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            0 => Ok(ProcessType::PassThrough),
            1 => Ok(ProcessType::DupeAppend),
            2 => Ok(ProcessType::BinaryTree),
            other => Err(invalid_process(ValidationIssue::InvalidProcessType(other))),
        }
    }
}

impl FromStr for ProcessType {
    type Err = MerkleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pass-through" | "passthrough" | "pas-thru" | "0" => Ok(ProcessType::PassThrough),
            "dupe-append" | "dupeappend" | "dup-apnd" | "1" => Ok(ProcessType::DupeAppend),
            "binary-tree" | "binarytree" | "bin-tree" | "2" => Ok(ProcessType::BinaryTree),
            _ => match s.trim().parse::<i64>() {
                Ok(value) => Err(invalid_process(ValidationIssue::InvalidProcessType(value))),
                Err(_) => Err(invalid_process(ValidationIssue::UnknownProcessName(s.to_string()))),
            },
        }
    }
}

/// hash(left ++ right): the two inputs are concatenated and hashed once.
pub fn combine(hasher: &dyn NodeHasher, left: &[u8], right: &[u8]) -> Vec<u8> {
    let mut cat = Vec::with_capacity(left.len() + right.len());
    cat.extend_from_slice(left);
    cat.extend_from_slice(right);
    hasher.digest(&cat)
}

/// Combine neighbours pairwise. A trailing node without a partner is carried
/// into the result unchanged.
pub fn pair_round(level: Level, hasher: &dyn NodeHasher) -> Level {
    let mut next = Vec::with_capacity(level.len().div_ceil(2));
    let mut nodes = level.into_iter();
    while let Some(left) = nodes.next() {
        match nodes.next() {
            Some(right) => next.push(combine(hasher, &left, &right)),
            None => next.push(left),
        }
    }
    next
}

/// Number of leading nodes left untouched by the binary-tree alignment round:
/// `next_power_of_two(n) - n`.
pub fn alignment_start(n: usize) -> usize {
    // integer bit-length arithmetic, exact at powers of two
    n.next_power_of_two() - n
}

fn pass_through(mut level: Level, hasher: &dyn NodeHasher) -> Vec<u8> {
    while level.len() > 1 {
        trace!(process = "PAS-THRU", width = level.len(), "reducing level");
        level = pair_round(level, hasher);
    }
    level.swap_remove(0)
}

fn dupe_append(mut level: Level, hasher: &dyn NodeHasher) -> Vec<u8> {
    // at least one round, so a single leaf becomes hash(leaf ++ leaf)
    loop {
        if level.len() % 2 == 1 {
            let last = level[level.len() - 1].clone();
            level.push(last);
        }
        trace!(process = "DUP-APND", width = level.len(), "reducing level");
        level = pair_round(level, hasher);
        if level.len() == 1 {
            break;
        }
    }
    level.swap_remove(0)
}

fn binary_tree(mut level: Level, hasher: &dyn NodeHasher) -> Vec<u8> {
    if level.len() == 1 {
        let leaf = &level[0];
        return combine(hasher, leaf, leaf);
    }

    let start = alignment_start(level.len());
    trace!(process = "BIN-TREE", width = level.len(), start, "aligning level");
    let tail = level.split_off(start);
    level.extend(pair_round(tail, hasher));
    debug_assert!(level.len().is_power_of_two());

    while level.len() > 1 {
        trace!(process = "BIN-TREE", width = level.len(), "reducing level");
        level = pair_round(level, hasher);
    }
    level.swap_remove(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::HashAlgorithm;

    /// Concatenates instead of hashing, so the tree shape is visible in the output.
    struct Concat;

    impl NodeHasher for Concat {
        fn digest(&self, data: &[u8]) -> Vec<u8> {
            let mut out = vec![b'('];
            out.extend_from_slice(data);
            out.push(b')');
            out
        }
    }

    fn letters(s: &str) -> Level {
        s.bytes().map(|b| vec![b]).collect()
    }

    fn shape(p: ProcessType, s: &str) -> String {
        String::from_utf8(p.reduce(letters(s), &Concat).unwrap()).unwrap()
    }

    #[test]
    fn alignment_start_at_boundaries() {
        assert_eq!(alignment_start(1), 0);
        assert_eq!(alignment_start(2), 0);
        assert_eq!(alignment_start(3), 1);
        assert_eq!(alignment_start(4), 0);
        assert_eq!(alignment_start(5), 3);
        assert_eq!(alignment_start(8), 0);
        assert_eq!(alignment_start(9), 7);
        assert_eq!(alignment_start(1 << 20), 0);
        assert_eq!(alignment_start((1 << 20) + 1), (1 << 20) - 1);
    }

    #[test]
    fn pass_through_carries_trailing_node() {
        assert_eq!(shape(ProcessType::PassThrough, "abcde"), "(((ab)(cd))e)");
        assert_eq!(shape(ProcessType::PassThrough, "abc"), "((ab)c)");
        assert_eq!(shape(ProcessType::PassThrough, "a"), "a");
    }

    #[test]
    fn dupe_append_duplicates_last_node() {
        assert_eq!(shape(ProcessType::DupeAppend, "abc"), "((ab)(cc))");
        assert_eq!(shape(ProcessType::DupeAppend, "abcde"), "(((ab)(cd))((ee)(ee)))");
        assert_eq!(shape(ProcessType::DupeAppend, "a"), "(aa)");
    }

    #[test]
    fn binary_tree_aligns_before_reducing() {
        assert_eq!(shape(ProcessType::BinaryTree, "abc"), "(a(bc))");
        assert_eq!(shape(ProcessType::BinaryTree, "abcde"), "((ab)(c(de)))");
        assert_eq!(shape(ProcessType::BinaryTree, "abcdef"), "((ab)((cd)(ef)))");
        assert_eq!(shape(ProcessType::BinaryTree, "a"), "(aa)");
    }

    #[test]
    fn power_of_two_levels_agree() {
        for s in ["ab", "abcd", "abcdefgh"] {
            let pt = shape(ProcessType::PassThrough, s);
            assert_eq!(pt, shape(ProcessType::DupeAppend, s));
            assert_eq!(pt, shape(ProcessType::BinaryTree, s));
        }
    }

    #[test]
    fn empty_level_is_rejected() {
        let err = ProcessType::PassThrough.reduce(vec![], &HashAlgorithm::Sha256).unwrap_err();
        assert!(err.validation().unwrap().has_empty_input());
    }

    #[test]
    fn process_type_parsing() {
        assert_eq!(ProcessType::try_from(2).unwrap(), ProcessType::BinaryTree);
        assert!(ProcessType::try_from(99).unwrap_err().validation().unwrap().has_invalid_process_type());
        assert_eq!("DUP-APND".parse::<ProcessType>().unwrap(), ProcessType::DupeAppend);
        assert_eq!("pass-through".parse::<ProcessType>().unwrap(), ProcessType::PassThrough);
    }

    #[test]
    fn unparseable_process_names_are_reported_verbatim() {
        let err = "sideways".parse::<ProcessType>().unwrap_err();
        let v = err.validation().unwrap();
        assert_eq!(v.issues(), &[ValidationIssue::UnknownProcessName("sideways".into())]);
        assert!(v.has_invalid_process_type());
        assert!(err.to_string().contains("\"sideways\""));

        let err = "99".parse::<ProcessType>().unwrap_err();
        assert_eq!(err.validation().unwrap().issues(), &[ValidationIssue::InvalidProcessType(99)]);
    }

    #[test]
    fn process_type_serde_uses_kebab_case() {
        for p in ProcessType::ALL {
            let json = serde_json::to_string(&p).unwrap();
            assert_eq!(json, format!("\"{p}\""));
            let back: ProcessType = serde_json::from_str(&json).unwrap();
            assert_eq!(back, p);
        }
        assert!(serde_json::from_str::<ProcessType>("\"sideways\"").is_err());
    }
}
