//! Property tests for the verdict fold.

use proptest::prelude::*;

use veritag_types::{CheckOutcome, EvidenceResult, RiskLevel};
use veritag_verification::aggregate;

fn results(pass: usize, fail: usize, warn: usize, indeterminate: usize) -> Vec<EvidenceResult> {
    let mut out = Vec::new();
    out.extend((0..pass).map(|i| EvidenceResult::pass(format!("p{i}"), "consistent")));
    out.extend((0..fail).map(|i| EvidenceResult::proven_absent(format!("f{i}"), "absent")));
    out.extend((0..warn).map(|i| EvidenceResult::warning(format!("w{i}"), "odd")));
    out.extend(
        (0..indeterminate).map(|i| EvidenceResult::unavailable(format!("i{i}"), "down")),
    );
    out
}

fn arb_result() -> impl Strategy<Value = EvidenceResult> {
    prop_oneof![
        Just(EvidenceResult::pass("a", "ok")),
        Just(EvidenceResult::proven_absent("b", "absent")),
        Just(EvidenceResult::warning("c", "odd")),
        Just(EvidenceResult::unavailable("d", "down")),
        Just(EvidenceResult::malformed("e", "bad shape")),
    ]
}

proptest! {
    #[test]
    fn one_reason_per_result(list in prop::collection::vec(arb_result(), 1..20)) {
        let verdict = aggregate(&list).unwrap();
        prop_assert_eq!(verdict.reasons().len(), list.len());
        prop_assert!((0.0..=1.0).contains(&verdict.confidence()));
    }

    #[test]
    fn decisive_mismatch_always_wins(
        list in prop::collection::vec(arb_result(), 0..20),
        at in 0usize..20,
    ) {
        let mut list = list;
        let at = at.min(list.len());
        list.insert(at, EvidenceResult::decisive_mismatch("qr_match", "QR code mismatch"));
        let verdict = aggregate(&list).unwrap();
        prop_assert!(!verdict.is_authentic());
        prop_assert_eq!(verdict.confidence(), 0.0);
        prop_assert_eq!(verdict.risk_level(), RiskLevel::High);
        prop_assert_eq!(verdict.reasons()[0].as_str(), "QR code mismatch");
    }

    #[test]
    fn all_indeterminate_is_never_authentic(n in 0usize..15) {
        let verdict = aggregate(&results(0, 0, 0, n)).unwrap();
        prop_assert!(verdict.indeterminate());
        prop_assert!(!verdict.is_authentic());
    }

    #[test]
    fn extra_fail_never_raises_confidence(
        pass in 0usize..10, fail in 0usize..10, warn in 0usize..10, ind in 0usize..5,
    ) {
        prop_assume!(pass + fail + warn > 0);
        let before = aggregate(&results(pass, fail, warn, ind)).unwrap();
        let after = aggregate(&results(pass, fail + 1, warn, ind)).unwrap();
        prop_assert!(after.confidence() <= before.confidence() + 1e-12);
    }

    #[test]
    fn extra_warn_never_raises_confidence_without_fails(
        pass in 0usize..10, warn in 0usize..10, ind in 0usize..5,
    ) {
        prop_assume!(pass + warn > 0);
        let before = aggregate(&results(pass, 0, warn, ind)).unwrap();
        let after = aggregate(&results(pass, 0, warn + 1, ind)).unwrap();
        prop_assert!(after.confidence() <= before.confidence() + 1e-12);
    }

    #[test]
    fn hardening_a_warn_into_a_fail_never_raises_confidence(
        pass in 0usize..10, fail in 0usize..10, warn in 1usize..10, ind in 0usize..5,
    ) {
        let before = aggregate(&results(pass, fail, warn, ind)).unwrap();
        let after = aggregate(&results(pass, fail + 1, warn - 1, ind)).unwrap();
        prop_assert!(after.confidence() <= before.confidence() + 1e-12);
    }

    #[test]
    fn aggregation_is_deterministic(list in prop::collection::vec(arb_result(), 0..20)) {
        prop_assert_eq!(aggregate(&list).unwrap(), aggregate(&list).unwrap());
    }

    #[test]
    fn authentic_iff_confidence_at_least_half(list in prop::collection::vec(arb_result(), 1..20)) {
        let verdict = aggregate(&list).unwrap();
        if !verdict.indeterminate() {
            prop_assert_eq!(verdict.is_authentic(), verdict.confidence() >= 0.5);
        }
        let fails = list.iter().filter(|r| r.outcome() == CheckOutcome::Fail).count();
        if fails == 0 && !verdict.indeterminate() {
            prop_assert!(verdict.is_authentic());
        }
    }
}
