use merkroot_core::{derive_root_blocking, DeriveConfig, HashAlgorithm, Level, ProcessType};
use proptest::prelude::*;
use std::time::Duration;

fn cfg() -> DeriveConfig {
    DeriveConfig::default().with_deadline(Duration::from_secs(30))
}

fn leaves_strategy(max: usize) -> impl Strategy<Value = Level> {
    prop::collection::vec(prop::collection::vec(any::<u8>(), 1..48), 1..max)
}

fn process_strategy() -> impl Strategy<Value = ProcessType> {
    prop::sample::select(ProcessType::ALL.to_vec())
}

fn algorithm_strategy() -> impl Strategy<Value = HashAlgorithm> {
    prop::sample::select(
        HashAlgorithm::ALL.iter().copied().filter(|a| a.output_len().is_some()).collect::<Vec<_>>(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn root_has_digest_length(
        leaves in leaves_strategy(70),
        alg in algorithm_strategy(),
        process in process_strategy(),
    ) {
        let root = derive_root_blocking(&cfg(), leaves, alg.name(), process as i64, true).unwrap();
        prop_assert_eq!(Some(root.len()), alg.output_len());
    }

    #[test]
    fn derivation_is_deterministic(
        leaves in leaves_strategy(40),
        process in process_strategy(),
        initial in any::<bool>(),
    ) {
        let a = derive_root_blocking(&cfg(), leaves.clone(), "SHA512", process as i64, initial).unwrap();
        let b = derive_root_blocking(&cfg(), leaves, "sha512", process as i64, initial).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn power_of_two_counts_agree(exp in 1u32..7, seed in any::<u8>()) {
        let n = 1usize << exp;
        let leaves: Level = (0..n).map(|i| HashAlgorithm::Sha256.hash(&[seed, i as u8])).collect();
        let roots: Vec<Vec<u8>> = ProcessType::ALL
            .iter()
            .map(|p| derive_root_blocking(&cfg(), leaves.clone(), "SHA256", *p as i64, false).unwrap())
            .collect();
        prop_assert_eq!(&roots[0], &roots[1]);
        prop_assert_eq!(&roots[1], &roots[2]);
    }

    #[test]
    fn leaf_order_matters(leaves in leaves_strategy(20), process in process_strategy()) {
        prop_assume!(leaves.len() >= 2 && leaves[0] != leaves[1]);
        let mut swapped = leaves.clone();
        swapped.swap(0, 1);
        let a = derive_root_blocking(&cfg(), leaves, "BLAKE3", process as i64, true).unwrap();
        let b = derive_root_blocking(&cfg(), swapped, "BLAKE3", process as i64, true).unwrap();
        prop_assert_ne!(a, b);
    }
}

#[test]
fn non_power_of_two_counts_diverge() {
    for n in [3usize, 5, 6, 7, 9, 12] {
        let leaves: Level = (0..n).map(|i| HashAlgorithm::Sha256.hash(&[i as u8])).collect();
        let pt = derive_root_blocking(&cfg(), leaves.clone(), "SHA256", 0, false).unwrap();
        let da = derive_root_blocking(&cfg(), leaves.clone(), "SHA256", 1, false).unwrap();
        let bt = derive_root_blocking(&cfg(), leaves, "SHA256", 2, false).unwrap();
        assert_ne!(pt, da, "n={n}");
        assert_ne!(da, bt, "n={n}");
        assert_ne!(pt, bt, "n={n}");
    }
}
