use circlegen::geometry::{generate, GeneratorConfig};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

mod proptest_helpers;

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn placed_circles_fit_and_keep_their_margin(
        seed in any::<u64>(),
        width in 20u32..200,
        height in 20u32..200,
        target in 0usize..15,
        margin in 0u8..4,
    ) {
        let config = GeneratorConfig {
            margin: f32::from(margin),
            max_attempts: 200,
            ..Default::default()
        };
        let placement = generate(width, height, target, &config, &mut StdRng::seed_from_u64(seed));
        let (min_r, max_r) = config.radius_range(width, height).expect("radius range");

        prop_assert!(placement.circles.len() <= target);
        for circle in &placement.circles {
            prop_assert!(circle.r >= min_r as f32 && circle.r <= max_r as f32);
            prop_assert!(circle.x - circle.r >= 0.0 && circle.x + circle.r <= width as f32);
            prop_assert!(circle.y - circle.r >= 0.0 && circle.y + circle.r <= height as f32);
        }
        for (i, a) in placement.circles.iter().enumerate() {
            for b in &placement.circles[i + 1..] {
                prop_assert!(!a.collides_with(b, config.margin), "{:?} vs {:?}", a, b);
            }
        }
        let res = proptest_helpers::assert_disjoint(&placement.circles);
        prop_assert!(res.is_ok(), "{}", res.unwrap_err());
    }

    #[test]
    fn same_seed_same_circles(seed in any::<u64>(), target in 0usize..10) {
        let config = GeneratorConfig::default();
        let a = generate(96, 64, target, &config, &mut StdRng::seed_from_u64(seed));
        let b = generate(96, 64, target, &config, &mut StdRng::seed_from_u64(seed));
        prop_assert_eq!(a, b);
    }
}
