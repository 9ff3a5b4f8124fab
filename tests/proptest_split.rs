use std::collections::BTreeSet;

use circlegen::split::{split, validation_count, SplitPolicy};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

mod proptest_helpers;

fn arb_ratio() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.0), Just(0.2), Just(0.5), Just(1.0), 0.0f64..=1.0]
}

fn arb_policy() -> impl Strategy<Value = SplitPolicy> {
    prop_oneof![Just(SplitPolicy::Sorted), Just(SplitPolicy::Shuffled)]
}

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn split_partitions_the_input(
        ids in proptest_helpers::arb_image_names(40),
        ratio in arb_ratio(),
        policy in arb_policy(),
        seed in any::<u64>(),
    ) {
        let result = split(&ids, ratio, policy, &mut StdRng::seed_from_u64(seed)).expect("split");

        prop_assert_eq!(result.len(), ids.len());
        prop_assert_eq!(result.val.len(), validation_count(ids.len(), ratio));

        let train: BTreeSet<_> = result.train.iter().collect();
        let val: BTreeSet<_> = result.val.iter().collect();
        prop_assert!(train.is_disjoint(&val));

        let all: BTreeSet<_> = ids.iter().collect();
        let union: BTreeSet<_> = train.union(&val).copied().collect();
        prop_assert_eq!(union, all);

        prop_assert!(proptest_helpers::name_counts(&result.train).values().all(|&n| n == 1));
    }

    #[test]
    fn duplicated_input_splits_like_deduplicated(
        ids in proptest_helpers::arb_image_names(20),
        ratio in arb_ratio(),
        seed in any::<u64>(),
    ) {
        let doubled: Vec<_> = ids.iter().chain(ids.iter()).cloned().collect();
        let a = split(&ids, ratio, SplitPolicy::Shuffled, &mut StdRng::seed_from_u64(seed)).expect("split");
        let b = split(&doubled, ratio, SplitPolicy::Shuffled, &mut StdRng::seed_from_u64(seed)).expect("split");
        prop_assert_eq!(a, b);
    }

    #[test]
    fn sorted_policy_ignores_the_seed(
        ids in proptest_helpers::arb_image_names(20),
        ratio in arb_ratio(),
        seed_a in any::<u64>(),
        seed_b in any::<u64>(),
    ) {
        let a = split(&ids, ratio, SplitPolicy::Sorted, &mut StdRng::seed_from_u64(seed_a)).expect("split");
        let b = split(&ids, ratio, SplitPolicy::Sorted, &mut StdRng::seed_from_u64(seed_b)).expect("split");
        prop_assert_eq!(a, b);
    }
}
