use circlegen::feature::{decode, encode};
use proptest::prelude::*;

mod proptest_helpers;

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn encode_then_decode_preserves_every_entry(map in proptest_helpers::arb_feature_map(8)) {
        let bytes = encode(&map);
        let decoded = decode(&bytes).expect("decode encoded map");
        prop_assert_eq!(decoded, map);
    }

    #[test]
    fn encoding_is_deterministic(map in proptest_helpers::arb_feature_map(8)) {
        prop_assert_eq!(encode(&map), encode(&map.clone()));
    }

    #[test]
    fn decode_never_panics_on_arbitrary_bytes(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = decode(&bytes);
    }
}
