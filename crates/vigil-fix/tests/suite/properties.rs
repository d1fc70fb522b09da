use proptest::prelude::*;
use vigil_core::{TextRange, TextSize};
use vigil_fix::{apply_fixes, SuggestedFix};

const PROPTEST_CASES: u32 = 256;

fn source_and_cuts() -> impl Strategy<Value = (String, Vec<usize>)> {
    "[a-z ;\n]{0,40}".prop_flat_map(|source| {
        let len = source.len();
        (Just(source), prop::collection::vec(0..=len, 0..10))
    })
}

/// Pairs up sorted, distinct cut points into non-empty, non-touching ranges.
fn disjoint_ranges(cuts: &[usize]) -> Vec<TextRange> {
    let mut cuts = cuts.to_vec();
    cuts.sort_unstable();
    cuts.dedup();
    cuts.chunks_exact(2)
        .map(|pair| TextRange::new(TextSize::from(pair[0] as u32), TextSize::from(pair[1] as u32)))
        .collect()
}

fn any_range(len: usize) -> impl Strategy<Value = TextRange> {
    (0..=len, 0..=len).prop_map(|(a, b)| {
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        TextRange::new(TextSize::from(start as u32), TextSize::from(end as u32))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(PROPTEST_CASES))]

    #[test]
    fn replacing_ranges_with_their_own_text_is_a_no_op((source, cuts) in source_and_cuts()) {
        let mut builder = SuggestedFix::builder();
        for range in disjoint_ranges(&cuts) {
            builder.replace_range(range, &source[range]);
        }
        let fix = builder.build().unwrap();
        prop_assert_eq!(fix.apply(&source).unwrap(), source);
    }

    #[test]
    fn disjoint_fixes_apply_deterministically_in_any_order((source, cuts) in source_and_cuts()) {
        let fixes: Vec<SuggestedFix> = disjoint_ranges(&cuts)
            .into_iter()
            .enumerate()
            .map(|(i, range)| {
                SuggestedFix::builder()
                    .replace_range(range, format!("<{i}>"))
                    .build()
                    .unwrap()
            })
            .collect();

        let first = apply_fixes(&source, &fixes);
        let second = apply_fixes(&source, &fixes);
        let reversed = apply_fixes(&source, fixes.iter().rev());
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&first.text, &reversed.text);
        prop_assert_eq!(first.applied.len(), fixes.len());
    }

    #[test]
    fn every_fix_is_accounted_for(
        (source, ranges) in "[a-z]{0,30}".prop_flat_map(|source| {
            let len = source.len();
            (Just(source), prop::collection::vec(any_range(len), 0..6))
        })
    ) {
        let fixes: Vec<SuggestedFix> = ranges
            .iter()
            .map(|range| {
                SuggestedFix::builder()
                    .replace_range(*range, "#")
                    .build()
                    .unwrap()
            })
            .collect();
        let result = apply_fixes(&source, &fixes);
        for index in 0..fixes.len() {
            let rejected = result.conflicts.iter().any(|c| c.fix == index);
            prop_assert!(result.is_applied(index) != rejected);
        }
        for pair in result.applied.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
    }
}
