//! Algebraic properties of usage merging.

use toolchat::types::{combine_usage, Usage};

fn samples() -> Vec<Option<Usage>> {
    let mut out = vec![None, Some(Usage::default())];
    for (i, o, r, c) in [(1, 2, 0, 0), (100, 50, 20, 10), (7, 0, 3, 9), (u32::MAX as u64, 1, 1, 1)] {
        out.push(Some(Usage {
            input_tokens: i,
            output_tokens: o,
            total_tokens: i + o,
            cache_read_tokens: r,
            cache_creation_tokens: c,
        }));
    }
    out
}

#[test]
fn merge_is_associative() {
    for a in samples() {
        for b in samples() {
            for c in samples() {
                assert_eq!(
                    combine_usage(combine_usage(a, b), c),
                    combine_usage(a, combine_usage(b, c)),
                    "a={a:?} b={b:?} c={c:?}"
                );
            }
        }
    }
}

#[test]
fn merge_is_commutative() {
    for a in samples() {
        for b in samples() {
            assert_eq!(combine_usage(a, b), combine_usage(b, a), "a={a:?} b={b:?}");
        }
    }
}

#[test]
fn absence_is_the_identity() {
    for a in samples() {
        assert_eq!(combine_usage(a, None), a);
        assert_eq!(combine_usage(None, a), a);
    }
}

#[test]
fn folding_rounds_sums_totals() {
    let rounds = [
        Some(Usage { input_tokens: 50, output_tokens: 25, total_tokens: 75, ..Default::default() }),
        None,
        Some(Usage { input_tokens: 100, output_tokens: 50, total_tokens: 150, ..Default::default() }),
    ];
    let total = rounds.into_iter().fold(None, combine_usage).unwrap();
    assert_eq!(total.total_tokens, 225);
    assert_eq!(total.input_tokens, 150);
}
