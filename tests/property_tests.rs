//! Property-based tests for landmark components.
//!
//! These tests verify invariants that should hold regardless of input:
//! - Posting lists enumerate exactly the positions of each symbol
//! - Shifted intersection equals set intersection
//! - The accumulator's covering radius never grows
//! - Stored signatures equal freshly computed ones
//! - Both candidate policies agree on full-signature matches

use proptest::prelude::*;

mod sequence_props {
    use super::*;
    use landmark::succinct::{EliasFanoSeq, PackedSeq, SeqEncoding};

    fn check_postings<S: SeqEncoding>(symbols: &[u32], sigma: u32) -> Result<(), TestCaseError> {
        let seq = S::encode(symbols, sigma).expect("encode");
        prop_assert_eq!(seq.len(), symbols.len());
        let mut total = 0;
        for s in 0..sigma {
            let positions: Vec<usize> = seq.postings(s).iter().collect();
            total += positions.len();
            prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
            for &p in &positions {
                prop_assert_eq!(seq.access(p), s);
            }
            let expected = symbols.iter().filter(|&&x| x == s).count();
            prop_assert_eq!(positions.len(), expected);
        }
        prop_assert_eq!(total, symbols.len());
        Ok(())
    }

    prop_compose! {
        fn arb_symbols()(sigma in 1u32..40)(
            symbols in prop::collection::vec(0..sigma, 0..600),
            sigma in Just(sigma),
        ) -> (Vec<u32>, u32) {
            (symbols, sigma)
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn elias_fano_postings_are_exact((symbols, sigma) in arb_symbols()) {
            check_postings::<EliasFanoSeq>(&symbols, sigma)?;
        }

        #[test]
        fn packed_postings_are_exact((symbols, sigma) in arb_symbols()) {
            check_postings::<PackedSeq>(&symbols, sigma)?;
        }
    }
}

mod intersection_props {
    use super::*;
    use landmark::intersect::{intersect, Shifted};
    use std::collections::BTreeSet;

    fn sorted(values: Vec<u64>) -> Vec<u64> {
        values.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn intersection_matches_set_semantics(
            a in prop::collection::vec(0u64..2000, 0..300),
            b in prop::collection::vec(0u64..2000, 0..300),
        ) {
            let a = sorted(a);
            let b = sorted(b);
            let expected: Vec<u64> = a.iter().copied().filter(|x| b.contains(x)).collect();
            prop_assert_eq!(intersect(&a, &b), expected);
        }

        #[test]
        fn shifted_intersection_aligns(
            a in prop::collection::vec(0u64..500, 0..200),
            b in prop::collection::vec(0u64..500, 0..200),
            shift in 0u64..10,
        ) {
            let a = sorted(a);
            let b = sorted(b);
            let expected: Vec<u64> = a
                .iter()
                .copied()
                .filter(|x| b.contains(&(x + shift)))
                .collect();
            prop_assert_eq!(intersect(&a, &Shifted::new(&b, shift)), expected);
        }
    }
}

mod accumulator_props {
    use super::*;
    use landmark::TopK;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn covering_radius_never_grows(
            k in 1usize..20,
            ties in any::<bool>(),
            distances in prop::collection::vec(0u8..50, 0..200),
        ) {
            let mut acc = if ties { TopK::with_ties(k) } else { TopK::new(k) };
            let mut prev = acc.covering_radius();
            for (id, d) in distances.iter().enumerate() {
                acc.push(id as u32, f32::from(*d));
                let radius = acc.covering_radius();
                prop_assert!(radius <= prev);
                prev = radius;

                let kept: Vec<f32> = acc.iter().map(|n| n.distance).collect();
                prop_assert!(kept.windows(2).all(|w| w[0] <= w[1]));
                if ties {
                    // Excess entries are exact ties with the k-th.
                    if acc.len() > k {
                        prop_assert!(kept[k..].iter().all(|&x| x == kept[k - 1]));
                    }
                } else {
                    prop_assert!(acc.len() <= k);
                }
            }
        }
    }
}

mod knr_props {
    use super::*;
    use landmark::knr::{KnrIndex, KnrParams, LinearScan};
    use landmark::{MetricDataset, MetricIndex, VectorDataset};
    use std::collections::BTreeSet;

    prop_compose! {
        fn arb_index()(
            values in prop::collection::vec(-100.0f32..100.0, 1..120),
            landmark_count in 1usize..12,
            k in 1usize..5,
        ) -> KnrIndex<VectorDataset> {
            let base = VectorDataset::from_scalars(&values).expect("scalars");
            let ids: Vec<u32> = (0..landmark_count.min(values.len()) as u32).collect();
            let landmarks = base.subset(&ids);
            let params = KnrParams {
                k: k.min(ids.len()),
                ..KnrParams::default()
            };
            KnrIndex::build(base, LinearScan::new(landmarks), params).expect("build")
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn stored_signature_roundtrips(index in arb_index()) {
            for id in 0..index.dataset().len() as u32 {
                let fresh = index.signature(index.dataset().get(id));
                prop_assert_eq!(index.stored_signature(id), fresh);
            }
        }

        #[test]
        fn policies_agree_on_exact_matches(index in arb_index(), pick in any::<prop::sample::Index>()) {
            let n = index.dataset().len();
            let id = pick.index(n) as u32;
            let qseq = index.stored_signature(id);
            let k = index.params().k as f32;

            let small: BTreeSet<u32> = index
                .candidates_small(&qseq, n)
                .iter()
                .filter(|c| c.distance == -k)
                .map(|c| c.id)
                .collect();
            let large: BTreeSet<u32> = index.candidates_large(&qseq, 0).ids().into_iter().collect();
            prop_assert!(large.contains(&id));
            prop_assert_eq!(large, small);
        }
    }
}
